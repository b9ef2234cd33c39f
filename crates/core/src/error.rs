use thiserror::Error;

/// Errors that abort processing of a document. Per-element classification
/// problems never surface here; they simply produce no match.
#[derive(Debug, Error)]
pub enum Error {
	#[error("document declares no language (expected a `* language = #xx` line)")]
	MissingLanguage,

	#[error("unsupported document language `{language}` (vocabulary has: {available})")]
	UnsupportedLanguage { language: String, available: String },

	#[error("explanation service returned {actual} responses for {expected} inputs")]
	ExplanationCountMismatch { expected: usize, actual: usize },

	#[error("vocabulary table line {line}: {message}")]
	VocabularyFormat { line: usize, message: String },

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
