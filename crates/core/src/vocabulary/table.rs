//! Semicolon-delimited keyword table.
//!
//! The header names `class`, `code`, `system` and `display` plus one
//! `keyword_<lang>` column per language. Each row defines one concept and the
//! keyword that triggers it in each language; empty keyword cells are skipped.

use crate::error::{Error, Result};
use crate::vocabulary::{ConceptTag, Vocabulary};

const DELIMITER: char = ';';
const KEYWORD_PREFIX: &str = "keyword_";
const REQUIRED: [&str; 4] = ["class", "code", "system", "display"];

pub(super) fn parse(content: &str) -> Result<Vocabulary> {
	let content = content.strip_prefix('\u{feff}').unwrap_or(content);
	let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

	let Some((_, header)) = lines.next() else {
		return Ok(Vocabulary::new());
	};
	let header: Vec<String> = split_record(header).into_iter().map(|h| h.trim().to_string()).collect();

	let column = |name: &str| -> Result<usize> {
		header.iter().position(|h| h == name).ok_or_else(|| Error::VocabularyFormat {
			line: 1,
			message: format!("missing `{name}` column"),
		})
	};
	let [class, code, system, display] = [column(REQUIRED[0])?, column(REQUIRED[1])?, column(REQUIRED[2])?, column(REQUIRED[3])?];

	let keyword_columns: Vec<(usize, String)> = header
		.iter()
		.enumerate()
		.filter_map(|(i, h)| {
			let lang = h.strip_prefix(KEYWORD_PREFIX)?.split('_').next()?;
			(!lang.is_empty()).then(|| (i, lang.to_ascii_lowercase()))
		})
		.collect();
	if keyword_columns.is_empty() {
		return Err(Error::VocabularyFormat {
			line: 1,
			message: "no `keyword_<lang>` columns".to_string(),
		});
	}

	let mut vocabulary = Vocabulary::new();
	for (index, line) in lines {
		let cells = split_record(line);
		let cell = |i: usize| cells.get(i).map(|c| c.trim()).unwrap_or_default();

		let concept = ConceptTag {
			class: cell(class).to_string(),
			code: cell(code).to_string(),
			system: cell(system).to_string(),
			display: cell(display).to_string(),
		};
		if concept.class.is_empty() {
			return Err(Error::VocabularyFormat {
				line: index + 1,
				message: "empty `class` cell".to_string(),
			});
		}

		for (i, lang) in &keyword_columns {
			let keyword = cell(*i);
			if !keyword.is_empty() {
				vocabulary.insert(lang, keyword, concept.clone());
			}
		}
	}

	Ok(vocabulary)
}

/// Splits one record on `;`. A cell wrapped in double quotes may contain the
/// delimiter; `""` inside a quoted cell is a literal quote.
fn split_record(line: &str) -> Vec<String> {
	let mut cells = Vec::new();
	let mut current = String::new();
	let mut in_quotes = false;
	let mut chars = line.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'"' if in_quotes && chars.peek() == Some(&'"') => {
				current.push('"');
				chars.next();
			}
			'"' if in_quotes => in_quotes = false,
			'"' if current.trim().is_empty() => {
				current.clear();
				in_quotes = true;
			}
			c if c == DELIMITER && !in_quotes => cells.push(std::mem::take(&mut current)),
			c => current.push(c),
		}
	}
	cells.push(current);
	cells
}
