//! Concept tagging for electronic product information (ePI) narratives.
//!
//! The [`tagger`] walks an HTML fragment and adds vocabulary classes to the
//! deepest elements whose text mentions a keyword, optionally marking
//! hard-to-read text for plain-language explanation. [`fsh`] applies it to
//! every narrative of a FHIR Shorthand composition and emits the matching
//! extensions.

pub mod error;
pub mod extension;
pub mod fragment;
pub mod fsh;
pub mod plain_language;
pub mod readability;
pub mod tagger;
pub mod tally;
pub mod vocabulary;

pub use error::{Error, Result};
pub use fragment::{Element, Fragment, NodeId};
pub use fsh::{DocumentOptions, TaggedDocument, process_document};
pub use plain_language::{Explanation, PlainLanguageCandidate};
pub use readability::{DifficultyConfig, FleschReadingEase, ReadabilityScorer};
pub use tagger::{TagOptions, TagOutput, TagSession, TreeTagger, tag};
pub use tally::MatchTally;
pub use vocabulary::{ConceptTag, LanguageVocabulary, Vocabulary};
