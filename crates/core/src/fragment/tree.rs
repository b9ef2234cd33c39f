//! Arena-backed fragment tree with span-preserving serialization.

use std::ops::Range;

use crate::fragment::entities::decode_entities;
use crate::fragment::tokenizer::{AttrForm, ClassAttr, Token, TokenKind, is_void_element, tokenize};

/// Index of a node inside a [`Fragment`]. Nodes are stored in document
/// pre-order, so every descendant of a node has a larger id than the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	pub const ROOT: NodeId = NodeId(0);

	pub fn index(self) -> usize {
		self.0
	}
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
	Root,
	Element(Element),
	Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
	pub(crate) parent: Option<NodeId>,
	/// One past the last descendant id.
	pub(crate) subtree_end: usize,
	pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Element {
	name: String,
	class_attr: Option<ClassAttr>,
	insert_at: usize,
	classes: Vec<String>,
	added: Vec<String>,
}

impl Element {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Class tokens in render order: source tokens first, then added ones.
	pub fn classes(&self) -> impl Iterator<Item = &str> {
		self.classes.iter().chain(self.added.iter()).map(String::as_str)
	}

	pub fn has_class(&self, class: &str) -> bool {
		self.classes().any(|c| c == class)
	}

	/// Classes added since the fragment was parsed.
	pub fn added_classes(&self) -> &[String] {
		&self.added
	}
}

/// A parsed narrative fragment. Owns its source text; tagging only ever adds
/// class tokens, and [`Fragment::serialize`] rewrites nothing but the start
/// tags of elements that gained classes.
#[derive(Debug, Clone)]
pub struct Fragment {
	source: String,
	nodes: Vec<Node>,
}

impl Fragment {
	pub fn parse(source: impl Into<String>) -> Self {
		let source = source.into();
		let tokens = tokenize(&source);
		let nodes = build_tree(&source, &tokens);
		Self { source, nodes }
	}

	/// Node count, the root included.
	pub(crate) fn len(&self) -> usize {
		self.nodes.len()
	}

	/// All node ids in document pre-order (root first).
	pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + use<> {
		(0..self.nodes.len()).map(NodeId)
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.nodes.get(id.0).and_then(|n| n.parent)
	}

	pub fn element(&self, id: NodeId) -> Option<&Element> {
		match &self.nodes.get(id.0)?.kind {
			NodeKind::Element(el) => Some(el),
			_ => None,
		}
	}

	/// Element ids in pre-order.
	pub fn elements(&self) -> impl DoubleEndedIterator<Item = (NodeId, &Element)> {
		self.nodes.iter().enumerate().filter_map(|(i, n)| match &n.kind {
			NodeKind::Element(el) => Some((NodeId(i), el)),
			_ => None,
		})
	}

	/// Strict descendants of `id`, in pre-order.
	pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + use<> {
		let end = self.nodes.get(id.0).map_or(id.0 + 1, |n| n.subtree_end);
		(id.0 + 1..end).map(NodeId)
	}

	/// Text of every descendant text node, each trimmed, empty pieces dropped,
	/// joined without a separator.
	pub fn stripped_text(&self, id: NodeId) -> String {
		let mut out = String::new();
		for child in self.descendants(id) {
			if let NodeKind::Text(text) = &self.nodes[child.0].kind {
				out.push_str(text.trim());
			}
		}
		out
	}

	/// Adds `class` to the element unless it already carries it. Returns
	/// whether the class set changed.
	pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
		let Some(Node {
			kind: NodeKind::Element(el),
			..
		}) = self.nodes.get_mut(id.0)
		else {
			return false;
		};
		if class.is_empty() || el.has_class(class) {
			return false;
		}
		el.added.push(class.to_string());
		true
	}

	/// Writes the fragment back out. Output is byte-identical to the source
	/// when no classes were added.
	pub fn serialize(&self) -> String {
		let mut out = String::with_capacity(self.source.len() + 64);
		let mut cursor = 0;
		for (_, el) in self.elements() {
			if el.added.is_empty() {
				continue;
			}
			let (range, replacement) = class_edit(&self.source, el);
			out.push_str(&self.source[cursor..range.start]);
			out.push_str(&replacement);
			cursor = range.end;
		}
		out.push_str(&self.source[cursor..]);
		out
	}
}

fn class_edit(source: &str, el: &Element) -> (Range<usize>, String) {
	let added = el.added.join(" ");
	match &el.class_attr {
		Some(ClassAttr { value, form }) => {
			let original = source[value.clone()].trim_end();
			let joined = if original.trim().is_empty() { added } else { format!("{original} {added}") };
			match form {
				AttrForm::Quoted(_) => (value.clone(), joined),
				AttrForm::Unquoted => (value.clone(), format!("\"{joined}\"")),
				AttrForm::Bare => (value.clone(), format!("=\"{joined}\"")),
			}
		}
		None => (el.insert_at..el.insert_at, format!(" class=\"{added}\"")),
	}
}

fn build_tree(source: &str, tokens: &[Token]) -> Vec<Node> {
	let mut nodes = vec![Node {
		parent: None,
		subtree_end: 1,
		kind: NodeKind::Root,
	}];
	let mut open: Vec<usize> = Vec::new();

	for token in tokens {
		let parent = NodeId(open.last().copied().unwrap_or(0));
		match &token.kind {
			TokenKind::Text => {
				nodes.push(Node {
					parent: Some(parent),
					subtree_end: 0,
					kind: NodeKind::Text(decode_entities(&source[token.span.clone()])),
				});
			}
			TokenKind::StartTag(tag) => {
				let classes = match &tag.class_attr {
					Some(attr) => decode_entities(&source[attr.value.clone()]).split_whitespace().map(str::to_string).collect(),
					None => Vec::new(),
				};
				let index = nodes.len();
				nodes.push(Node {
					parent: Some(parent),
					subtree_end: 0,
					kind: NodeKind::Element(Element {
						name: tag.name.clone(),
						class_attr: tag.class_attr.clone(),
						insert_at: tag.insert_at,
						classes,
						added: Vec::new(),
					}),
				});
				if !tag.self_closing && !is_void_element(&tag.name) {
					open.push(index);
				}
			}
			TokenKind::EndTag { name } => {
				let matching = open.iter().rposition(|&i| matches!(&nodes[i].kind, NodeKind::Element(el) if el.name == *name));
				if let Some(pos) = matching {
					open.truncate(pos);
				}
			}
			TokenKind::RawText | TokenKind::Markup => {}
		}
	}

	for i in (0..nodes.len()).rev() {
		if nodes[i].subtree_end < i + 1 {
			nodes[i].subtree_end = i + 1;
		}
		if let Some(parent) = nodes[i].parent {
			let end = nodes[i].subtree_end;
			if nodes[parent.0].subtree_end < end {
				nodes[parent.0].subtree_end = end;
			}
		}
	}

	nodes
}
