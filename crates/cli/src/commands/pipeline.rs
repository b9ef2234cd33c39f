use std::path::Path;

use epi_tag::{ConceptTag, DocumentOptions, Explanation, MatchTally, TaggedDocument, Vocabulary};
use tracing::debug;

use crate::config::TaggerConfig;
use crate::error::{CliError, Result};
use crate::explain::{Explainer, build_explainer};

/// Everything needed to process documents: the vocabulary, the per-document
/// options and the explanation service. Built once per command.
pub struct Pipeline {
	vocabulary: Vocabulary,
	options: DocumentOptions,
	explainer: Box<dyn Explainer>,
}

/// What processing one document produced.
#[derive(Debug)]
pub struct DocumentOutcome {
	/// The processed composition, `None` when nothing was tagged.
	pub output: Option<String>,
	pub language: String,
	pub instance: Option<String>,
	pub tally: MatchTally,
	pub concepts: Vec<ConceptTag>,
	pub explanations: Vec<Explanation>,
}

impl Pipeline {
	pub fn from_config(config: &TaggerConfig) -> Result<Self> {
		let vocabulary = load_vocabulary(config.keywords_path()?)?;
		Ok(Self::new(vocabulary, config.document_options(), build_explainer(&config.explainer)?))
	}

	pub fn new(vocabulary: Vocabulary, options: DocumentOptions, explainer: Box<dyn Explainer>) -> Self {
		Self {
			vocabulary,
			options,
			explainer,
		}
	}

	pub async fn process(&self, source: &str, bundle: Option<&str>) -> Result<DocumentOutcome> {
		let document = TaggedDocument::tag(source, &self.vocabulary, &self.options)?;

		let explanations = if document.candidates().is_empty() {
			Vec::new()
		} else {
			debug!(
				target = "epi_tag",
				explainer = self.explainer.name(),
				candidates = document.candidates().len(),
				"explaining difficult texts"
			);
			let responses = self.explainer.explain(document.language(), document.candidates()).await?;
			document.explain(responses)?
		};

		Ok(DocumentOutcome {
			output: document.finish(&explanations, bundle),
			language: document.language().to_string(),
			instance: document.original_name().map(str::to_string),
			tally: document.tally().clone(),
			concepts: document.concepts().to_vec(),
			explanations,
		})
	}
}

/// Loads a keyword table, naming the file on I/O errors.
pub(super) fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
	Vocabulary::load(path).map_err(|err| match err {
		epi_tag::Error::Io(source) => CliError::file(path, source),
		other => CliError::Tagging(other),
	})
}
