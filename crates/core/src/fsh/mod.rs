//! FSH composition processing.
//!
//! A document goes through two phases. [`TaggedDocument::tag`] rewrites every
//! narrative with the tree tagger, renames the instance and stamps the
//! processed category; it also yields the plain-language candidates. Once
//! those have been explained, [`TaggedDocument::finish`] writes the extension
//! block and appends the patched bundle instances. The split lets callers run
//! the (possibly remote) explanation step in between.

mod bundle;
mod instance;
mod narrative;

pub use bundle::{BUNDLE_TRAILER_HEADER, bundle_trailer, patch_bundles};
pub use instance::{DEFAULT_SUFFIX, PROCESSED_CATEGORY, insert_extension_block, rename_instance, stamp_category};
pub use narrative::{detect_language, narrative_blocks, replace_narratives};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extension::{ExtensionWriter, tallied_concepts};
use crate::plain_language::{Explanation, PlainLanguageCandidate, pair_explanations};
use crate::tagger::{TagOptions, TagSession, TreeTagger};
use crate::tally::MatchTally;
use crate::vocabulary::{ConceptTag, Vocabulary};

/// Settings for one document run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentOptions {
	pub tag: TagOptions,
	/// Appended to the composition and bundle instance names.
	pub suffix: String,
}

impl Default for DocumentOptions {
	fn default() -> Self {
		Self {
			tag: TagOptions::default(),
			suffix: DEFAULT_SUFFIX.to_string(),
		}
	}
}

/// A composition whose narratives have been tagged.
#[derive(Debug, Clone)]
pub struct TaggedDocument {
	body: String,
	language: String,
	original_name: Option<String>,
	suffix: String,
	tally: MatchTally,
	candidates: Vec<PlainLanguageCandidate>,
	concepts: Vec<ConceptTag>,
}

impl TaggedDocument {
	/// Tags every narrative of `source`. Fails when the document declares no
	/// language or one the vocabulary has no partition for.
	pub fn tag(source: &str, vocabulary: &Vocabulary, options: &DocumentOptions) -> Result<Self> {
		let language = detect_language(source)?;
		let keywords = vocabulary.require(&language)?;

		let tagger = TreeTagger::new(keywords, options.tag);
		let mut session = TagSession::new();
		let mut narratives = 0usize;
		let body = replace_narratives(source, |html| {
			narratives += 1;
			tagger.tag_html(html, &mut session)
		});
		let (body, original_name) = rename_instance(&body, &options.suffix);
		let body = stamp_category(&body, PROCESSED_CATEGORY);

		let (tally, candidates) = session.into_parts();
		let concepts = tallied_concepts(&tally, keywords);
		debug!(
			target = "epi_tag",
			language = %language,
			narratives,
			matches = tally.total(),
			candidates = candidates.len(),
			"tagged document"
		);

		Ok(Self {
			body,
			language,
			original_name,
			suffix: options.suffix.clone(),
			tally,
			candidates,
			concepts,
		})
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	/// Instance name before renaming.
	pub fn original_name(&self) -> Option<&str> {
		self.original_name.as_deref()
	}

	pub fn tally(&self) -> &MatchTally {
		&self.tally
	}

	pub fn candidates(&self) -> &[PlainLanguageCandidate] {
		&self.candidates
	}

	pub fn concepts(&self) -> &[ConceptTag] {
		&self.concepts
	}

	/// The rewritten composition without extensions.
	pub fn body(&self) -> &str {
		&self.body
	}

	/// Pairs explanation responses with the candidates, in order.
	pub fn explain(&self, responses: Vec<String>) -> Result<Vec<Explanation>> {
		pair_explanations(&self.candidates, responses)
	}

	/// Renders the final document, or `None` when there is nothing to link:
	/// such documents are not worth writing.
	pub fn finish(&self, explanations: &[Explanation], bundle: Option<&str>) -> Option<String> {
		let mut writer = ExtensionWriter::new();
		for concept in &self.concepts {
			writer.html_element_link(concept);
		}
		for explanation in explanations {
			writer.additional_information(explanation);
		}
		let Some(block) = writer.render() else {
			warn!(target = "epi_tag", instance = ?self.original_name, "no extensions found");
			return None;
		};

		let mut out = insert_extension_block(&self.body, &block);
		match (bundle, self.original_name.as_deref()) {
			(Some(bundle), Some(name)) => {
				let blocks = patch_bundles(bundle, name, &self.suffix);
				if blocks.is_empty() {
					warn!(target = "epi_tag", composition = name, "no bundle references the composition");
				}
				if let Some(trailer) = bundle_trailer(&blocks) {
					out.push_str(&trailer);
				}
			}
			(Some(_), None) => warn!(target = "epi_tag", "document has no instance name; bundles not patched"),
			(None, _) => {}
		}

		info!(
			target = "epi_tag",
			extensions = writer.len(),
			explanations = explanations.len(),
			"document processed"
		);
		Some(out)
	}
}

/// Runs the whole pipeline with a synchronous explanation step. `explain` is
/// only called when there are candidates; it receives the document language.
pub fn process_document<F>(source: &str, vocabulary: &Vocabulary, options: &DocumentOptions, bundle: Option<&str>, explain: F) -> Result<Option<String>>
where
	F: FnOnce(&str, &[PlainLanguageCandidate]) -> Result<Vec<String>>,
{
	let document = TaggedDocument::tag(source, vocabulary, options)?;
	let explanations = if document.candidates().is_empty() {
		Vec::new()
	} else {
		let responses = explain(document.language(), document.candidates())?;
		document.explain(responses)?
	};
	Ok(document.finish(&explanations, bundle))
}
