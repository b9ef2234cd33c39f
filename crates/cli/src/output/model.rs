use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope returned by all commands.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inputs: Option<CommandInputs>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<u64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub diagnostics: Vec<Diagnostic>,
}

/// Inputs used for a command execution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommandInputs {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub destination: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bundle: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub root: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keywords: Option<PathBuf>,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
}

/// Standardized error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	MissingLanguage,
	UnsupportedLanguage,
	ExplanationMismatch,
	ExplainerFailed,
	VocabularyInvalid,
	ConfigInvalid,
	IoError,
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::MissingLanguage => write!(f, "MISSING_LANGUAGE"),
			ErrorCode::UnsupportedLanguage => write!(f, "UNSUPPORTED_LANGUAGE"),
			ErrorCode::ExplanationMismatch => write!(f, "EXPLANATION_MISMATCH"),
			ErrorCode::ExplainerFailed => write!(f, "EXPLAINER_FAILED"),
			ErrorCode::VocabularyInvalid => write!(f, "VOCABULARY_INVALID"),
			ErrorCode::ConfigInvalid => write!(f, "CONFIG_INVALID"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

/// Diagnostic message attached to a command result.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	pub level: DiagnosticLevel,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Info,
	Warning,
	Error,
}
