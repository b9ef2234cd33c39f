//! Plain-language candidates and the batch contract with the explanation
//! service: one request per document, responses paired back by position.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A difficult text queued for simplification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainLanguageCandidate {
	/// Class token / identifier, `plain-language-N`.
	pub id: String,
	pub text: String,
}

/// A simplified text paired with the candidate it explains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
	pub id: String,
	pub text: String,
}

/// Separator between items in a batched prompt and its response.
pub const BATCH_DELIMITER: char = '|';

/// Pairs responses with candidates one-to-one. A count mismatch is an error;
/// no partial pairing is attempted.
pub fn pair_explanations(candidates: &[PlainLanguageCandidate], responses: Vec<String>) -> Result<Vec<Explanation>> {
	if candidates.len() != responses.len() {
		return Err(Error::ExplanationCountMismatch {
			expected: candidates.len(),
			actual: responses.len(),
		});
	}

	Ok(candidates
		.iter()
		.zip(responses)
		.map(|(candidate, text)| Explanation {
			id: candidate.id.clone(),
			text,
		})
		.collect())
}

/// Joins candidate texts into a single `|`-delimited batch. Delimiters inside
/// a text are replaced so the response can be split back reliably.
pub fn join_batch(candidates: &[PlainLanguageCandidate]) -> String {
	candidates
		.iter()
		.map(|c| c.text.replace(BATCH_DELIMITER, "/"))
		.collect::<Vec<_>>()
		.join(&BATCH_DELIMITER.to_string())
}

/// Splits a `|`-delimited response, trimming items and dropping empty ones.
pub fn split_batch(response: &str) -> Vec<String> {
	response
		.split(BATCH_DELIMITER)
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

/// English name of an ISO 639-1 language code, as used in prompts.
pub fn language_name(code: &str) -> Option<&'static str> {
	let name = match code.to_ascii_lowercase().as_str() {
		"es" => "Spanish",
		"en" => "English",
		"de" => "German",
		"fr" => "French",
		"it" => "Italian",
		"pt" => "Portuguese",
		"nl" => "Dutch",
		"pl" => "Polish",
		"ru" => "Russian",
		"tr" => "Turkish",
		"ar" => "Arabic",
		"zh" => "Chinese",
		"ja" => "Japanese",
		"ko" => "Korean",
		"vi" => "Vietnamese",
		"th" => "Thai",
		"el" => "Greek",
		"cs" => "Czech",
		"hu" => "Hungarian",
		"ro" => "Romanian",
		"sv" => "Swedish",
		"fi" => "Finnish",
		"da" => "Danish",
		"no" => "Norwegian",
		"is" => "Icelandic",
		"et" => "Estonian",
		"lv" => "Latvian",
		"lt" => "Lithuanian",
		"mt" => "Maltese",
		"hr" => "Croatian",
		"sk" => "Slovak",
		"sl" => "Slovenian",
		"bg" => "Bulgarian",
		"cy" => "Welsh",
		"ga" => "Irish",
		"gd" => "Gaelic",
		"eu" => "Basque",
		"ca" => "Catalan",
		"gl" => "Galician",
		_ => return None,
	};
	Some(name)
}

/// System message for chat-style explanation models.
pub fn system_prompt(language: &str) -> String {
	format!(
		"You are an assistant specialized in simplifying technical health information. \
		 Read complex medical sentences separated by a '|' character and rewrite each of them in simple language. \
		 Keep the structure: answer with the simplified sentences in the same order, separated by '|'. \
		 You must answer in {language}."
	)
}

/// User prompt carrying the batched texts.
pub fn user_prompt(candidates: &[PlainLanguageCandidate]) -> String {
	format!(
		"Please simplify the following technical health information into plain language suitable for a patient with no health literacy. \
		 Each piece of information is separated by '|'. Provide the simplified explanation for each piece of information in the same order, \
		 using the same delimiter '|'. Ensure the explanations are clear, concise, and easy to understand.\n\nOriginal: {}\nAnswer:",
		join_batch(candidates)
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidates(texts: &[&str]) -> Vec<PlainLanguageCandidate> {
		texts
			.iter()
			.enumerate()
			.map(|(i, t)| PlainLanguageCandidate {
				id: format!("pl-{}", i + 1),
				text: t.to_string(),
			})
			.collect()
	}

	#[test]
	fn pairs_positionally() {
		let paired = pair_explanations(&candidates(&["A", "B", "C"]), vec!["a".into(), "b".into(), "c".into()]).expect("counts match");
		let pairs: Vec<_> = paired.iter().map(|e| (e.id.as_str(), e.text.as_str())).collect();
		assert_eq!(pairs, vec![("pl-1", "a"), ("pl-2", "b"), ("pl-3", "c")]);
	}

	#[test]
	fn count_mismatch_is_fatal() {
		let err = pair_explanations(&candidates(&["A", "B", "C"]), vec!["a".into(), "b".into()]).expect_err("two responses for three inputs");
		assert!(matches!(err, Error::ExplanationCountMismatch { expected: 3, actual: 2 }));
	}

	#[test]
	fn empty_batch_pairs_to_nothing() {
		assert!(pair_explanations(&[], Vec::new()).expect("empty batch").is_empty());
	}

	#[test]
	fn batch_delimiters_survive_round_trip() {
		let batch = join_batch(&candidates(&["take 1|2 tablets", "avoid alcohol"]));
		assert_eq!(batch, "take 1/2 tablets|avoid alcohol");
		assert_eq!(split_batch(" one | two ||three "), vec!["one", "two", "three"]);
	}

	#[test]
	fn language_names_resolve() {
		assert_eq!(language_name("PT"), Some("Portuguese"));
		assert_eq!(language_name("xx"), None);
	}
}
