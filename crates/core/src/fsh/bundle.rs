use std::sync::LazyLock;

use regex_lite::Regex;

static INSTANCE_START_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^Instance:\s+(\S+)").expect("INSTANCE_START_RE should compile"));

/// Header written above the patched bundle instances.
pub const BUNDLE_TRAILER_HEADER: &str = "// Referenced and patched Bundle Instances";

/// Splits a bundle file at each `Instance:` line. Text before the first
/// instance forms its own block.
fn split_instances(doc: &str) -> Vec<&str> {
	let mut starts: Vec<usize> = INSTANCE_START_RE.find_iter(doc).map(|m| m.start()).collect();
	if starts.first() != Some(&0) {
		starts.insert(0, 0);
	}
	starts
		.iter()
		.enumerate()
		.map(|(i, &start)| &doc[start..starts.get(i + 1).copied().unwrap_or(doc.len())])
		.collect()
}

fn is_bundle(block: &str) -> bool {
	block.contains("InstanceOf: Bundle") || block.contains("InstanceOf: BundleUvEpi")
}

/// Bundle instances that mention `composition_id`, renamed with `suffix` and
/// pointed at the renamed composition. Each block is trimmed.
pub fn patch_bundles(bundle_doc: &str, composition_id: &str, suffix: &str) -> Vec<String> {
	split_instances(bundle_doc)
		.into_iter()
		.filter(|block| !block.trim().is_empty() && is_bundle(block) && block.contains(composition_id))
		.filter_map(|block| {
			let caps = INSTANCE_START_RE.captures(block)?;
			let (whole, name) = (caps.get(0)?, caps.get(1)?);
			if whole.start() != 0 {
				return None;
			}
			let original = name.as_str();
			let renamed = format!("// originally: {original}\nInstance: {original}{suffix}{}", &block[whole.end()..]);
			let patched = renamed
				.replace(&format!("= {composition_id}"), &format!("= {composition_id}{suffix}"))
				.replace(&format!("/Composition/{composition_id}"), &format!("/Composition/{composition_id}{suffix}"));
			Some(patched.trim().to_string())
		})
		.collect()
}

/// Trailer appended after the composition, or `None` with no patched blocks.
pub fn bundle_trailer(blocks: &[String]) -> Option<String> {
	if blocks.is_empty() {
		return None;
	}
	Some(format!("\n\n{BUNDLE_TRAILER_HEADER}\n{}", blocks.join("\n\n")))
}
