//! Deepest-match tagging of narrative fragments.
//!
//! Candidate elements (`li`, `p`, `span`, `div`) are visited in reverse
//! document order, so every descendant is seen before its ancestors. An
//! element is skipped outright once anything below it carries a vocabulary
//! class; otherwise its stripped text is matched against the vocabulary and,
//! optionally, the difficulty classifier. Every match bumps the tally and adds
//! its class to the element.
//!
//! The fragment arena is stored in pre-order, so a single reverse sweep that
//! pushes a "tagged below" flag up to each parent decides suppression in time
//! linear in the node count.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::fragment::{Fragment, NodeId};
use crate::plain_language::PlainLanguageCandidate;
use crate::readability::{DifficultyConfig, FleschReadingEase, ReadabilityScorer};
use crate::tally::MatchTally;
use crate::vocabulary::LanguageVocabulary;

/// Elements considered for tagging.
pub const CANDIDATE_TAGS: [&str; 4] = ["li", "p", "span", "div"];

/// Class added to difficult elements.
pub const DIFFICULT_CLASS: &str = "difficult";
/// Tally key for difficulty matches.
pub const DIFFICULT_KEY: &str = "difficult_text";
/// Tally key for plain-language candidates.
pub const PLAIN_LANGUAGE_KEY: &str = "plain-language";
/// Prefix of the sequential plain-language class/identifier.
pub const PLAIN_LANGUAGE_PREFIX: &str = "plain-language-";

/// Per-run switches for the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagOptions {
	pub difficulty: DifficultyConfig,
	/// Queue difficult texts as plain-language candidates.
	pub plain_language: bool,
}

/// State carried across the fragments of one document: the tally, the
/// plain-language candidates and the next candidate number.
///
/// Independent documents must use independent sessions; merge tallies
/// afterwards with [`MatchTally::merge`].
#[derive(Debug, Clone, Default)]
pub struct TagSession {
	tally: MatchTally,
	candidates: Vec<PlainLanguageCandidate>,
	next_candidate: usize,
}

impl TagSession {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn tally(&self) -> &MatchTally {
		&self.tally
	}

	pub fn candidates(&self) -> &[PlainLanguageCandidate] {
		&self.candidates
	}

	pub fn into_parts(self) -> (MatchTally, Vec<PlainLanguageCandidate>) {
		(self.tally, self.candidates)
	}

	fn allocate_candidate(&mut self, text: &str) -> String {
		self.next_candidate += 1;
		let id = format!("{PLAIN_LANGUAGE_PREFIX}{}", self.next_candidate);
		self.candidates.push(PlainLanguageCandidate {
			id: id.clone(),
			text: text.to_string(),
		});
		id
	}
}

/// What one call to [`TreeTagger::tag_fragment`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FragmentReport {
	pub visited: usize,
	pub suppressed: usize,
	pub tagged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Match {
	key: String,
	class: String,
}

/// Result of the one-shot [`tag`] helper.
#[derive(Debug, Clone)]
pub struct TagOutput {
	pub html: String,
	pub tally: MatchTally,
	pub candidates: Vec<PlainLanguageCandidate>,
}

pub struct TreeTagger<'v, S = FleschReadingEase> {
	vocabulary: &'v LanguageVocabulary,
	recognized: HashSet<&'v str>,
	scorer: S,
	options: TagOptions,
}

impl<'v> TreeTagger<'v, FleschReadingEase> {
	pub fn new(vocabulary: &'v LanguageVocabulary, options: TagOptions) -> Self {
		Self::with_scorer(vocabulary, options, FleschReadingEase)
	}
}

impl<'v, S: ReadabilityScorer> TreeTagger<'v, S> {
	pub fn with_scorer(vocabulary: &'v LanguageVocabulary, options: TagOptions, scorer: S) -> Self {
		Self {
			vocabulary,
			recognized: vocabulary.recognized_classes(),
			scorer,
			options,
		}
	}

	/// Tags `fragment` in place, recording matches into `session`.
	pub fn tag_fragment(&self, fragment: &mut Fragment, session: &mut TagSession) -> FragmentReport {
		let mut report = FragmentReport::default();
		let mut tagged_below = vec![false; fragment.len()];

		for id in fragment.ids().rev() {
			let Some(element) = fragment.element(id) else {
				continue;
			};
			let candidate = CANDIDATE_TAGS.iter().any(|t| *t == element.name());

			if candidate {
				report.visited += 1;
				if tagged_below[id.index()] {
					report.suppressed += 1;
					trace!(target = "epi_tag", node = id.index(), "suppressed by tagged descendant");
				} else {
					let text = fragment.stripped_text(id);
					let matches = self.classify(&text, session);
					if !matches.is_empty() {
						report.tagged += 1;
					}
					for m in &matches {
						session.tally.record(&m.key);
						fragment.add_class(id, &m.class);
					}
				}
			}

			self.propagate(fragment, id, &mut tagged_below);
		}

		debug!(
			target = "epi_tag",
			visited = report.visited,
			suppressed = report.suppressed,
			tagged = report.tagged,
			"tagged fragment"
		);
		report
	}

	/// Parses, tags and re-serializes one fragment.
	pub fn tag_html(&self, html: &str, session: &mut TagSession) -> String {
		let mut fragment = Fragment::parse(html);
		self.tag_fragment(&mut fragment, session);
		fragment.serialize()
	}

	fn propagate(&self, fragment: &Fragment, id: NodeId, tagged_below: &mut [bool]) {
		let Some(parent) = fragment.parent(id) else {
			return;
		};
		let carries = fragment.element(id).is_some_and(|el| el.classes().any(|c| self.recognized.contains(c)));
		if carries || tagged_below[id.index()] {
			tagged_below[parent.index()] = true;
		}
	}

	fn classify(&self, text: &str, session: &mut TagSession) -> Vec<Match> {
		if text.is_empty() {
			return Vec::new();
		}

		let mut matches: Vec<Match> = self
			.vocabulary
			.find_matches(text)
			.into_iter()
			.map(|m| Match {
				key: m.keyword.to_string(),
				class: m.class.to_string(),
			})
			.collect();

		if self.options.difficulty.is_difficult(text, &self.scorer) {
			matches.push(Match {
				key: DIFFICULT_KEY.to_string(),
				class: DIFFICULT_CLASS.to_string(),
			});
			if self.options.plain_language {
				let id = session.allocate_candidate(text);
				matches.push(Match {
					key: PLAIN_LANGUAGE_KEY.to_string(),
					class: id,
				});
			}
		}

		matches
	}
}

/// Tags a single fragment with a fresh session.
pub fn tag(html: &str, vocabulary: &LanguageVocabulary, options: TagOptions) -> TagOutput {
	let tagger = TreeTagger::new(vocabulary, options);
	let mut session = TagSession::new();
	let html = tagger.tag_html(html, &mut session);
	let (tally, candidates) = session.into_parts();
	TagOutput { html, tally, candidates }
}


#[cfg(test)]
mod proptests {
	use proptest::prelude::*;

	use super::*;
	use crate::vocabulary::ConceptTag;

	const WORDS: [&str; 5] = ["rash", "fever", "none", "diabetes", "plain"];

	#[derive(Debug, Clone)]
	enum Tree {
		Text(usize),
		Element(usize, Vec<Tree>),
	}

	fn tree() -> impl Strategy<Value = Tree> {
		let leaf = (0..WORDS.len()).prop_map(Tree::Text);
		leaf.prop_recursive(4, 32, 4, |inner| ((0..CANDIDATE_TAGS.len() + 1), prop::collection::vec(inner, 0..4)).prop_map(|(t, c)| Tree::Element(t, c)))
	}

	fn render(tree: &Tree, out: &mut String) {
		match tree {
			Tree::Text(w) => {
				out.push(' ');
				out.push_str(WORDS[*w]);
			}
			Tree::Element(t, children) => {
				let name = CANDIDATE_TAGS.get(*t).copied().unwrap_or("b");
				out.push_str(&format!("<{name}>"));
				for child in children {
					render(child, out);
				}
				out.push_str(&format!("</{name}>"));
			}
		}
	}

	fn vocab() -> LanguageVocabulary {
		let mut vocab = LanguageVocabulary::new();
		for word in ["rash", "fever", "diabetes"] {
			vocab.insert(
				word,
				ConceptTag {
					class: word.to_string(),
					code: "X".to_string(),
					system: "local".to_string(),
					display: word.to_string(),
				},
			);
		}
		vocab
	}

	fn options() -> TagOptions {
		TagOptions {
			difficulty: DifficultyConfig::disabled(),
			plain_language: false,
		}
	}

	proptest! {
		/// No tagged element has a tagged ancestor.
		#[test]
		fn tagged_elements_never_nest(t in tree()) {
			let mut html = String::new();
			render(&t, &mut html);
			let vocab = vocab();
			let tagger = TreeTagger::new(&vocab, options());
			let mut fragment = Fragment::parse(html);
			tagger.tag_fragment(&mut fragment, &mut TagSession::new());

			let tagged: Vec<NodeId> = fragment.elements().filter(|(_, el)| !el.added_classes().is_empty()).map(|(id, _)| id).collect();
			for id in &tagged {
				let mut ancestor = fragment.parent(*id);
				while let Some(a) = ancestor {
					prop_assert!(!tagged.contains(&a));
					ancestor = fragment.parent(a);
				}
			}
		}

		/// Tally totals equal the class additions made, whatever order siblings come in.
		#[test]
		fn tally_matches_tagged_classes(t in tree()) {
			let mut html = String::new();
			render(&t, &mut html);
			let vocab = vocab();
			let tagger = TreeTagger::new(&vocab, options());
			let mut fragment = Fragment::parse(html);
			let mut session = TagSession::new();
			tagger.tag_fragment(&mut fragment, &mut session);

			let added: usize = fragment.elements().map(|(_, el)| el.added_classes().len()).sum();
			prop_assert_eq!(session.tally().total(), added as u64);
		}

		/// Without any match the output is the input.
		#[test]
		fn serialization_is_lossless_without_matches(t in tree()) {
			let mut html = String::new();
			render(&t, &mut html);
			let empty = LanguageVocabulary::new();
			let out = tag(&html, &empty, options());
			prop_assert_eq!(out.html, html);
		}
	}
}
