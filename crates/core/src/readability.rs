//! Readability scoring and the difficulty classifier built on it.

use serde::{Deserialize, Serialize};

/// Scores a piece of text; lower means harder to read. `None` means the text
/// could not be scored, which callers treat as "not difficult".
pub trait ReadabilityScorer {
	fn score(&self, text: &str) -> Option<f64>;
}

impl<F> ReadabilityScorer for F
where
	F: Fn(&str) -> Option<f64>,
{
	fn score(&self, text: &str) -> Option<f64> {
		self(text)
	}
}

/// Flesch reading ease:
/// `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`.
///
/// Syllables are approximated by counting vowel groups, which is good enough
/// for the Latin-script languages ePIs ship in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleschReadingEase;

impl ReadabilityScorer for FleschReadingEase {
	fn score(&self, text: &str) -> Option<f64> {
		let words: Vec<&str> = text
			.split_whitespace()
			.map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
			.filter(|w| w.chars().any(char::is_alphabetic))
			.collect();
		if words.is_empty() {
			return None;
		}

		let sentences = count_sentences(text).max(1) as f64;
		let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
		let word_count = words.len() as f64;

		Some(206.835 - 1.015 * (word_count / sentences) - 84.6 * (syllables as f64 / word_count))
	}
}

fn count_sentences(text: &str) -> usize {
	let mut count = 0;
	let mut in_terminator = false;
	for c in text.chars() {
		let terminator = matches!(c, '.' | '!' | '?' | ';' | '\u{2026}');
		if terminator && !in_terminator {
			count += 1;
		}
		in_terminator = terminator;
	}
	// Trailing text without a terminator still forms a sentence.
	let ends_open = text.trim_end().chars().last().is_some_and(|c| !matches!(c, '.' | '!' | '?' | ';' | '\u{2026}'));
	count + usize::from(ends_open)
}

fn is_vowel(c: char) -> bool {
	matches!(
		c,
		'a' | 'e' | 'i' | 'o' | 'u' | 'y' | 'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' | 'æ' | 'é' | 'è' | 'ê' | 'ë' | 'í' | 'ì' | 'î' | 'ï' | 'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' | 'ú' | 'ù' | 'û' | 'ü'
	)
}

pub(crate) fn count_syllables(word: &str) -> usize {
	let lower: Vec<char> = word.to_lowercase().chars().filter(|c| c.is_alphabetic()).collect();
	let mut groups = 0;
	let mut previous_vowel = false;
	for &c in &lower {
		let vowel = is_vowel(c);
		if vowel && !previous_vowel {
			groups += 1;
		}
		previous_vowel = vowel;
	}
	if groups > 1 && lower.ends_with(&['e']) && !lower.ends_with(&['l', 'e']) {
		groups -= 1;
	}
	groups.max(1)
}

/// Thresholds for marking text as difficult.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DifficultyConfig {
	pub enabled: bool,
	/// Scores strictly below this are difficult.
	pub score_threshold: f64,
	/// Texts must be strictly longer than this many characters.
	pub min_length: usize,
}

impl Default for DifficultyConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			score_threshold: 20.0,
			min_length: 100,
		}
	}
}

impl DifficultyConfig {
	pub fn disabled() -> Self {
		Self {
			enabled: false,
			..Self::default()
		}
	}

	/// Empty and short texts are rejected before the scorer is consulted.
	pub fn is_difficult(&self, text: &str, scorer: &dyn ReadabilityScorer) -> bool {
		if !self.enabled || text.is_empty() || text.chars().count() <= self.min_length {
			return false;
		}
		scorer.score(text).is_some_and(|score| score < self.score_threshold)
	}
}
