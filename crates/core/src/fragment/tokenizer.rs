//! Span-preserving tokenizer for narrative XHTML fragments.
//!
//! Every token records the byte range it was read from so the fragment can be
//! written back verbatim. Only what the tagger needs is interpreted: tag names,
//! the `class` attribute, void/self-closing elements and raw text elements.
//! Anything else (comments, doctype, processing instructions, CDATA) is kept
//! as opaque markup.
//!
//! Tag and attribute names are restricted to ASCII `[A-Za-z0-9:_-]`. Slice
//! endpoints are only ever taken at ASCII structural bytes, so they stay on
//! UTF-8 boundaries.

use std::ops::Range;

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &str = "-->";
const CDATA_START: &[u8] = b"<![CDATA[";
const CDATA_END: &str = "]]>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
	Text,
	/// Contents of `script`/`style`; never part of derived text.
	RawText,
	StartTag(StartTag),
	EndTag { name: String },
	Markup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
	pub(crate) kind: TokenKind,
	pub(crate) span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartTag {
	pub(crate) name: String,
	pub(crate) class_attr: Option<ClassAttr>,
	pub(crate) self_closing: bool,
	/// Offset where a new attribute can be written (just past the last attribute).
	pub(crate) insert_at: usize,
}

/// Location of an existing `class` attribute value inside the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassAttr {
	/// Value bytes, excluding any quotes.
	pub(crate) value: Range<usize>,
	pub(crate) form: AttrForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrForm {
	Quoted(u8),
	Unquoted,
	/// `class` with no `=value` at all.
	Bare,
}

pub(crate) fn is_void_element(name: &str) -> bool {
	matches!(
		name,
		"area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "param" | "source" | "track" | "wbr"
	)
}

fn is_raw_text_element(name: &str) -> bool {
	matches!(name, "script" | "style")
}

fn is_name_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
	haystack.len() >= start + needle.len() && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

pub(crate) fn tokenize(input: &str) -> Vec<Token> {
	let bytes = input.as_bytes();
	let len = bytes.len();
	let mut out: Vec<Token> = Vec::new();
	let mut text_start: Option<usize> = None;
	let mut i = 0;

	let flush_text = |out: &mut Vec<Token>, text_start: &mut Option<usize>, end: usize| {
		if let Some(start) = text_start.take() {
			if start < end {
				out.push(Token { kind: TokenKind::Text, span: start..end });
			}
		}
	};

	while i < len {
		if bytes[i] != b'<' || !opens_markup(bytes, i) {
			text_start.get_or_insert(i);
			i += 1;
			continue;
		}
		flush_text(&mut out, &mut text_start, i);

		if starts_with_ignore_ascii_case_at(bytes, i, COMMENT_START) {
			let end = find_from(input, i + COMMENT_START.len(), COMMENT_END).unwrap_or(len);
			out.push(Token { kind: TokenKind::Markup, span: i..end });
			i = end;
			continue;
		}
		if starts_with_ignore_ascii_case_at(bytes, i, CDATA_START) {
			let end = find_from(input, i + CDATA_START.len(), CDATA_END).unwrap_or(len);
			out.push(Token { kind: TokenKind::Markup, span: i..end });
			i = end;
			continue;
		}
		if bytes[i + 1] == b'!' || bytes[i + 1] == b'?' {
			let end = find_from(input, i + 2, ">").unwrap_or(len);
			out.push(Token { kind: TokenKind::Markup, span: i..end });
			i = end;
			continue;
		}

		if bytes[i + 1] == b'/' {
			let name_start = i + 2;
			let mut j = name_start;
			while j < len && is_name_byte(bytes[j]) {
				j += 1;
			}
			let name = input[name_start..j].to_ascii_lowercase();
			let end = find_from(input, j, ">").unwrap_or(len);
			out.push(Token { kind: TokenKind::EndTag { name }, span: i..end });
			i = end;
			continue;
		}

		match read_start_tag(input, i) {
			Some((tag, end)) => {
				let raw = !tag.self_closing && is_raw_text_element(&tag.name);
				let name = tag.name.clone();
				out.push(Token { kind: TokenKind::StartTag(tag), span: i..end });
				i = end;
				if raw {
					let close = find_raw_text_close(bytes, i, &name).unwrap_or(len);
					if close > i {
						out.push(Token { kind: TokenKind::RawText, span: i..close });
					}
					i = close;
				}
			}
			None => {
				// Unterminated start tag: keep the remainder opaque.
				out.push(Token { kind: TokenKind::Markup, span: i..len });
				i = len;
			}
		}
	}
	flush_text(&mut out, &mut text_start, len);

	out
}

/// `<` only opens markup when followed by a name, `/`, `!` or `?`.
fn opens_markup(bytes: &[u8], i: usize) -> bool {
	match bytes.get(i + 1) {
		Some(b) => b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'),
		None => false,
	}
}

/// Returns the offset just past `needle` when it occurs at or after `from`.
fn find_from(input: &str, from: usize, needle: &str) -> Option<usize> {
	input[from..].find(needle).map(|pos| from + pos + needle.len())
}

fn find_raw_text_close(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
	let mut i = from;
	while i + 2 + name.len() <= bytes.len() {
		if bytes[i] == b'<' && bytes[i + 1] == b'/' && starts_with_ignore_ascii_case_at(bytes, i + 2, name.as_bytes()) {
			return Some(i);
		}
		i += 1;
	}
	None
}

/// Reads a start tag beginning at `start` (which holds `<`). Returns the tag
/// and the offset just past its closing `>`.
fn read_start_tag(input: &str, start: usize) -> Option<(StartTag, usize)> {
	let bytes = input.as_bytes();
	let len = bytes.len();
	let mut j = start + 1;
	while j < len && is_name_byte(bytes[j]) {
		j += 1;
	}
	let name = input[start + 1..j].to_ascii_lowercase();
	let mut class_attr = None;
	let mut insert_at = j;

	loop {
		while j < len && bytes[j].is_ascii_whitespace() {
			j += 1;
		}
		if j >= len {
			return None;
		}
		match bytes[j] {
			b'>' => {
				return Some((
					StartTag {
						name,
						class_attr,
						self_closing: false,
						insert_at,
					},
					j + 1,
				));
			}
			b'/' if bytes.get(j + 1) == Some(&b'>') => {
				return Some((
					StartTag {
						name,
						class_attr,
						self_closing: true,
						insert_at,
					},
					j + 2,
				));
			}
			b'/' => {
				j += 1;
				continue;
			}
			_ => {}
		}

		let attr_start = j;
		while j < len && !bytes[j].is_ascii_whitespace() && !matches!(bytes[j], b'=' | b'>' | b'/') {
			j += 1;
		}
		let attr_name = &input[attr_start..j];

		let mut k = j;
		while k < len && bytes[k].is_ascii_whitespace() {
			k += 1;
		}
		let (value, form) = if k < len && bytes[k] == b'=' {
			k += 1;
			while k < len && bytes[k].is_ascii_whitespace() {
				k += 1;
			}
			if k >= len {
				return None;
			}
			if bytes[k] == b'"' || bytes[k] == b'\'' {
				let quote = bytes[k];
				let value_start = k + 1;
				let value_end = bytes[value_start..].iter().position(|&b| b == quote).map(|p| value_start + p)?;
				j = value_end + 1;
				(value_start..value_end, AttrForm::Quoted(quote))
			} else {
				let value_start = k;
				while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
					// `/>` closes the tag even right after an unquoted value.
					if bytes[k] == b'/' && bytes.get(k + 1) == Some(&b'>') {
						break;
					}
					k += 1;
				}
				j = k;
				(value_start..k, AttrForm::Unquoted)
			}
		} else {
			(j..j, AttrForm::Bare)
		};

		insert_at = j;
		if class_attr.is_none() && attr_name.eq_ignore_ascii_case("class") {
			class_attr = Some(ClassAttr { value, form });
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(input: &str) -> Vec<TokenKind> {
		tokenize(input).into_iter().map(|t| t.kind).collect()
	}

	#[test]
	fn spans_cover_the_whole_input() {
		let input = "<div xmlns=\"http://www.w3.org/1999/xhtml\"><!-- note --><p>Take <b>two</b> tablets</p><br/></div>";
		let tokens = tokenize(input);
		let mut cursor = 0;
		for token in &tokens {
			assert_eq!(token.span.start, cursor, "gap before {token:?}");
			cursor = token.span.end;
		}
		assert_eq!(cursor, input.len());
	}

	#[test]
	fn reads_class_attribute_forms() {
		let input = "<p class=\"a b\"><span class=c><li class>";
		let tokens = tokenize(input);
		let classes: Vec<_> = tokens
			.iter()
			.filter_map(|t| match &t.kind {
				TokenKind::StartTag(tag) => tag.class_attr.clone(),
				_ => None,
			})
			.collect();

		assert_eq!(&input[classes[0].value.clone()], "a b");
		assert_eq!(classes[0].form, AttrForm::Quoted(b'"'));
		assert_eq!(&input[classes[1].value.clone()], "c");
		assert_eq!(classes[1].form, AttrForm::Unquoted);
		assert_eq!(classes[2].form, AttrForm::Bare);
	}

	#[test]
	fn insert_point_sits_before_self_closing_slash() {
		let input = "<span id='x' />";
		let tokens = tokenize(input);
		let TokenKind::StartTag(tag) = &tokens[0].kind else {
			panic!("expected start tag");
		};
		assert!(tag.self_closing);
		assert_eq!(&input[..tag.insert_at], "<span id='x'");
	}

	#[test]
	fn unquoted_value_stops_before_self_closing_slash() {
		let input = "<span class=a/><p>b</p>";
		let tokens = tokenize(input);
		let TokenKind::StartTag(tag) = &tokens[0].kind else {
			panic!("expected start tag");
		};
		assert!(tag.self_closing);
		assert_eq!(tokens[0].span, 0..15);
		let class = tag.class_attr.clone().expect("class attribute");
		assert_eq!(&input[class.value], "a");
		assert_eq!(class.form, AttrForm::Unquoted);
	}

	#[test]
	fn unquoted_value_keeps_inner_slashes() {
		let input = "<a href=x/y/z>";
		let TokenKind::StartTag(tag) = &tokenize(input)[0].kind else {
			panic!("expected start tag");
		};
		assert!(!tag.self_closing);
		assert_eq!(tag.insert_at, input.len() - 1);
	}

	#[test]
	fn script_content_is_raw_text() {
		assert_eq!(
			kinds("<script>if (a < b) {}</script>"),
			vec![
				TokenKind::StartTag(StartTag {
					name: "script".into(),
					class_attr: None,
					self_closing: false,
					insert_at: 7,
				}),
				TokenKind::RawText,
				TokenKind::EndTag { name: "script".into() },
			]
		);
	}

	#[test]
	fn lone_angle_bracket_is_text() {
		assert_eq!(kinds("dose < 5 mg"), vec![TokenKind::Text]);
	}

	#[test]
	fn unterminated_tag_is_opaque() {
		assert_eq!(kinds("ok <p class=\"x"), vec![TokenKind::Text, TokenKind::Markup]);
	}
}
