use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandInputs, CommandResult, Diagnostic, DiagnosticLevel, ErrorCode, SCHEMA_VERSION};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	inputs: Option<CommandInputs>,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	diagnostics: Vec<Diagnostic>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			inputs: None,
			data: None,
			error: None,
			start_time: Instant::now(),
			diagnostics: Vec::new(),
		}
	}

	/// Measures the duration from `start` instead of from construction.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn inputs(mut self, inputs: CommandInputs) -> Self {
		self.inputs = Some(inputs);
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn diagnostic(mut self, level: DiagnosticLevel, message: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: None,
		});
		self
	}

	pub fn diagnostic_with_source(mut self, level: DiagnosticLevel, message: impl Into<String>, source: impl Into<String>) -> Self {
		self.diagnostics.push(Diagnostic {
			level,
			message: message.into(),
			source: Some(source.into()),
		});
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();

		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			inputs: self.inputs,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
			diagnostics: self.diagnostics,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			print_result_text(result);
		}
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		let _ = writeln!(stdout, "{} {}", "ok".green().bold(), result.command);
		if let Some(ref data) = result.data {
			if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(data) {
				for (key, value) in fields {
					let _ = writeln!(stdout, "  {}: {}", key.cyan(), render_value(&value));
				}
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "{} [{}]: {}", "error".red().bold(), error.code, error.message);
	}

	for diag in &result.diagnostics {
		let prefix = match diag.level {
			DiagnosticLevel::Info => "info".normal(),
			DiagnosticLevel::Warning => "warning".yellow(),
			DiagnosticLevel::Error => "error".red(),
		};
		if let Some(ref source) = diag.source {
			let _ = writeln!(stdout, "[{prefix}:{source}] {}", diag.message);
		} else {
			let _ = writeln!(stdout, "[{prefix}] {}", diag.message);
		}
	}

	if let Some(duration_ms) = result.duration_ms {
		let _ = writeln!(stdout, "Completed in {duration_ms}ms");
	}
}

fn render_value(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn result_with_data_is_ok() {
		let result = ResultBuilder::new("vocab").data(3u32).build();
		assert!(result.ok);
		assert_eq!(result.schema_version, Some(SCHEMA_VERSION));
		assert!(result.duration_ms.is_some());
	}

	#[test]
	fn error_overrides_data() {
		let result = ResultBuilder::new("tag").data(1u32).error(ErrorCode::MissingLanguage, "no language").build();
		assert!(!result.ok);

		let json = serde_json::to_value(&result).expect("serializes");
		assert_eq!(json["error"]["code"], "MISSING_LANGUAGE");
		assert_eq!(json["command"], "tag");
		assert!(json.get("diagnostics").is_none());
	}

	#[test]
	fn diagnostics_keep_their_source() {
		let result = ResultBuilder::<()>::new("batch")
			.diagnostic_with_source(DiagnosticLevel::Warning, "skipped", "composition-en-1.fsh")
			.build();
		let json = serde_json::to_value(&result).expect("serializes");
		assert_eq!(json["diagnostics"][0]["level"], "warning");
		assert_eq!(json["diagnostics"][0]["source"], "composition-en-1.fsh");
	}
}
