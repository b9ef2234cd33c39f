//! Character reference decoding for narrative text.

/// Decode the named references that show up in ePI narratives plus numeric
/// (`&#NN;` / `&#xHH;`) references. Unknown references are left untouched.
pub(crate) fn decode_entities(s: &str) -> String {
	if !s.contains('&') {
		return s.to_string();
	}

	let mut out = String::with_capacity(s.len());
	let mut rest = s;
	while let Some(amp) = rest.find('&') {
		out.push_str(&rest[..amp]);
		let after = &rest[amp..];
		match after.find(';').filter(|&end| end <= 12) {
			Some(end) => match decode_reference(&after[1..end]) {
				Some(ch) => {
					out.push(ch);
					rest = &after[end + 1..];
				}
				None => {
					out.push('&');
					rest = &after[1..];
				}
			},
			None => {
				out.push('&');
				rest = &after[1..];
			}
		}
	}
	out.push_str(rest);
	out
}

fn decode_reference(name: &str) -> Option<char> {
	if let Some(num) = name.strip_prefix('#') {
		let code = match num.strip_prefix(['x', 'X']) {
			Some(hex) => u32::from_str_radix(hex, 16).ok()?,
			None => num.parse::<u32>().ok()?,
		};
		return char::from_u32(code);
	}

	let ch = match name {
		"amp" => '&',
		"lt" => '<',
		"gt" => '>',
		"quot" => '"',
		"apos" => '\'',
		"nbsp" => '\u{a0}',
		"shy" => '\u{ad}',
		"ndash" => '\u{2013}',
		"mdash" => '\u{2014}',
		"hellip" => '\u{2026}',
		"deg" => '\u{b0}',
		"micro" => '\u{b5}',
		"middot" => '\u{b7}',
		"plusmn" => '\u{b1}',
		"le" => '\u{2264}',
		"ge" => '\u{2265}',
		"reg" => '\u{ae}',
		"copy" => '\u{a9}',
		"trade" => '\u{2122}',
		_ => return None,
	};
	Some(ch)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_known_entities() {
		assert_eq!(decode_entities("&amp;"), "&");
		assert_eq!(decode_entities("&lt;p&gt;"), "<p>");
		assert_eq!(decode_entities("5&nbsp;mg"), "5\u{a0}mg");
	}

	#[test]
	fn decodes_numeric_references() {
		assert_eq!(decode_entities("&#233;t&#xE9;"), "été");
	}

	#[test]
	fn leaves_unknown_and_bare_ampersands() {
		assert_eq!(decode_entities("R&D &bogus; a & b"), "R&D &bogus; a & b");
	}
}
