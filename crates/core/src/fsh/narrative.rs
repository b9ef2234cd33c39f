use std::ops::Range;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{Error, Result};

static LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\*[ \t]*language[ \t]*=[ \t]*#(\w{2})[ \t]*\r?$").expect("LANGUAGE_RE should compile"));

static NARRATIVE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(?ms)^[ \t]*\*[ \t][^\n]*?text\.div\s*=\s*"""(.*?)""""#).expect("NARRATIVE_RE should compile"));

/// The document language from its first `* language = #xx` line, lowercased.
pub fn detect_language(doc: &str) -> Result<String> {
	LANGUAGE_RE
		.captures(doc)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_ascii_lowercase())
		.ok_or(Error::MissingLanguage)
}

/// Byte ranges of every `text.div` payload, between the triple quotes.
pub fn narrative_blocks(doc: &str) -> Vec<Range<usize>> {
	NARRATIVE_RE
		.captures_iter(doc)
		.filter_map(|caps| caps.get(1))
		.map(|m| m.range())
		.collect()
}

/// Rewrites every narrative payload through `rewrite`, which receives the
/// trimmed HTML. The result goes back on its own lines between the quotes.
pub fn replace_narratives(doc: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
	let mut out = String::with_capacity(doc.len());
	let mut last = 0;
	for span in narrative_blocks(doc) {
		out.push_str(&doc[last..span.start]);
		out.push('\n');
		out.push_str(&rewrite(doc[span.clone()].trim()));
		out.push('\n');
		last = span.end;
	}
	out.push_str(&doc[last..]);
	out
}
