//! Header-level rewrites of a composition document.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::warn;

static INSTANCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^Instance:[ \t]*(\S+)").expect("INSTANCE_RE should compile"));
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\* category[^\n]*?(\r?)$").expect("CATEGORY_RE should compile"));
static INSTANCE_OF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^InstanceOf:[^\r\n]*").expect("INSTANCE_OF_RE should compile"));
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\* section\[\+\]").expect("SECTION_RE should compile"));

/// Category stamped onto processed compositions.
pub const PROCESSED_CATEGORY: &str = "* category = epicategory-cs#P \"Processed\"";

/// Suffix appended to processed instance names.
pub const DEFAULT_SUFFIX: &str = "-pproc";

/// Appends `suffix` to the name on the first `Instance:` line. Returns the
/// rewritten document and the original name, if there was one.
pub fn rename_instance(doc: &str, suffix: &str) -> (String, Option<String>) {
	let Some(name) = INSTANCE_RE.captures(doc).and_then(|caps| caps.get(1)) else {
		return (doc.to_string(), None);
	};
	let original = name.as_str().to_string();
	let renamed = format!("{}{original}{suffix}{}", &doc[..name.start()], &doc[name.end()..]);
	(renamed, Some(original))
}

/// Replaces every `* category` line with `line`, or inserts `line` after the
/// first `InstanceOf:` line when there is none.
pub fn stamp_category(doc: &str, line: &str) -> String {
	if CATEGORY_RE.is_match(doc) {
		return CATEGORY_RE
			.replace_all(doc, |caps: &regex_lite::Captures<'_>| format!("{line}{}", &caps[1]))
			.into_owned();
	}
	match INSTANCE_OF_RE.find(doc) {
		Some(m) => format!("{}\n{line}{}", &doc[..m.end()], &doc[m.end()..]),
		None => {
			warn!(target = "epi_tag", "no InstanceOf line; category not stamped");
			doc.to_string()
		}
	}
}

/// Inserts `block` before the first `* section[+]` line, or appends it.
pub fn insert_extension_block(doc: &str, block: &str) -> String {
	match SECTION_RE.find(doc) {
		Some(m) => format!("{}{block}{}", &doc[..m.start()], &doc[m.start()..]),
		None => {
			warn!(target = "epi_tag", "no `* section[+]` line; appending extension block");
			format!("{doc}{block}")
		}
	}
}
