use std::path::PathBuf;

use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Tagging(#[from] epi_tag::Error),

	#[error("invalid configuration in {}: {message}", path.display())]
	Config { path: PathBuf, message: String },

	#[error("no keyword table configured (pass --keywords or set `keywords` in the config file)")]
	NoKeywords,

	#[error("explanation service failed: {0}")]
	Explainer(String),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("{}: {source}", path.display())]
	File {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		CliError::File { path: path.into(), source }
	}

	/// Stable code reported in the result envelope.
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Tagging(err) => match err {
				epi_tag::Error::MissingLanguage => ErrorCode::MissingLanguage,
				epi_tag::Error::UnsupportedLanguage { .. } => ErrorCode::UnsupportedLanguage,
				epi_tag::Error::ExplanationCountMismatch { .. } => ErrorCode::ExplanationMismatch,
				epi_tag::Error::VocabularyFormat { .. } => ErrorCode::VocabularyInvalid,
				epi_tag::Error::Io(_) => ErrorCode::IoError,
			},
			CliError::Config { .. } | CliError::NoKeywords => ErrorCode::ConfigInvalid,
			CliError::Explainer(_) | CliError::Http(_) => ErrorCode::ExplainerFailed,
			CliError::File { .. } => ErrorCode::IoError,
			CliError::Anyhow(err) if err.root_cause().downcast_ref::<std::io::Error>().is_some() => ErrorCode::IoError,
			CliError::Anyhow(_) => ErrorCode::InternalError,
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
