//! Language-partitioned keyword vocabulary.

mod table;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Controlled-vocabulary concept a keyword maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptTag {
	/// Class token written onto matching elements.
	pub class: String,
	pub code: String,
	pub system: String,
	pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
	pub keyword: String,
	keyword_lower: String,
	pub concept: ConceptTag,
}

/// A keyword found in a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
	pub keyword: &'a str,
	pub class: &'a str,
}

/// Keywords for one language, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LanguageVocabulary {
	entries: Vec<VocabularyEntry>,
	index: HashMap<String, usize>,
}

impl LanguageVocabulary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces the concept for `keyword`. A replaced keyword keeps
	/// its original position.
	pub fn insert(&mut self, keyword: impl Into<String>, concept: ConceptTag) {
		let keyword = keyword.into();
		if let Some(&i) = self.index.get(&keyword) {
			self.entries[i].concept = concept;
			return;
		}
		self.index.insert(keyword.clone(), self.entries.len());
		self.entries.push(VocabularyEntry {
			keyword_lower: keyword.to_lowercase(),
			keyword,
			concept,
		});
	}

	pub fn get(&self, keyword: &str) -> Option<&ConceptTag> {
		self.index.get(keyword).map(|&i| &self.entries[i].concept)
	}

	pub fn entries(&self) -> &[VocabularyEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Class tokens that mark an element as already tagged.
	pub fn recognized_classes(&self) -> HashSet<&str> {
		self.entries.iter().map(|e| e.concept.class.as_str()).collect()
	}

	/// Every entry whose keyword occurs in `text`, case-insensitively, as a
	/// plain substring. Overlapping keywords all match.
	pub fn find_matches(&self, text: &str) -> Vec<KeywordMatch<'_>> {
		if text.is_empty() {
			return Vec::new();
		}
		let lower = text.to_lowercase();
		self.entries
			.iter()
			.filter(|e| !e.keyword_lower.is_empty() && lower.contains(&e.keyword_lower))
			.map(|e| KeywordMatch {
				keyword: &e.keyword,
				class: &e.concept.class,
			})
			.collect()
	}
}

/// All language partitions, keyed by ISO 639-1 code.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
	languages: BTreeMap<String, LanguageVocabulary>,
}

impl Vocabulary {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, language: &str, keyword: impl Into<String>, concept: ConceptTag) {
		self.languages.entry(language.to_ascii_lowercase()).or_default().insert(keyword, concept);
	}

	pub fn language(&self, language: &str) -> Option<&LanguageVocabulary> {
		self.languages.get(&language.to_ascii_lowercase())
	}

	/// Like [`Vocabulary::language`], but a missing partition is a fatal
	/// configuration error.
	pub fn require(&self, language: &str) -> Result<&LanguageVocabulary> {
		self.language(language).ok_or_else(|| Error::UnsupportedLanguage {
			language: language.to_string(),
			available: self.languages.keys().cloned().collect::<Vec<_>>().join(", "),
		})
	}

	pub fn languages(&self) -> impl Iterator<Item = (&str, &LanguageVocabulary)> {
		self.languages.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn is_empty(&self) -> bool {
		self.languages.values().all(LanguageVocabulary::is_empty)
	}

	/// Parses a semicolon-delimited keyword table (`class;code;system;display;keyword_<lang>...`).
	pub fn from_table(content: &str) -> Result<Self> {
		table::parse(content)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		let vocabulary = Self::from_table(&content)?;
		tracing::debug!(
			target = "epi_tag",
			path = %path.display(),
			languages = vocabulary.languages.len(),
			"loaded vocabulary"
		);
		Ok(vocabulary)
	}
}
