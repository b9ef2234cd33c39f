//! Narrative XHTML fragments.
//!
//! A deliberately small parser: it builds just enough of a tree to answer
//! "which elements contain which text" and to add class tokens, and it keeps
//! the original bytes so unchanged markup is written back untouched.

mod entities;
mod tokenizer;
mod tree;

pub use tree::{Element, Fragment, NodeId};
