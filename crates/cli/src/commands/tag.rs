use std::path::{Path, PathBuf};

use epi_tag::MatchTally;
use serde::Serialize;
use tracing::{info, warn};

use super::pipeline::Pipeline;
use crate::config::TaggerConfig;
use crate::error::{CliError, Result};
use crate::output::{CommandInputs, DiagnosticLevel, OutputFormat, ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagReport {
	pub language: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub instance: Option<String>,
	pub written: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub destination: Option<PathBuf>,
	pub tally: MatchTally,
	pub concepts: usize,
	pub explanations: usize,
}

pub async fn execute(source: &Path, destination: &Path, bundle: &Path, config: &TaggerConfig, format: OutputFormat) -> Result<()> {
	info!(target = "epi_tag", source = %source.display(), destination = %destination.display(), "tag composition");

	let pipeline = Pipeline::from_config(config)?;
	let composition = std::fs::read_to_string(source).map_err(|e| CliError::file(source, e))?;
	let bundle_doc = std::fs::read_to_string(bundle).map_err(|e| CliError::file(bundle, e))?;

	let outcome = pipeline.process(&composition, Some(&bundle_doc)).await?;
	let written = match &outcome.output {
		Some(out) => {
			write_output(destination, out)?;
			true
		}
		None => {
			warn!(target = "epi_tag", source = %source.display(), "no extensions found; nothing written");
			false
		}
	};

	let mut builder = ResultBuilder::new("tag")
		.inputs(CommandInputs {
			source: Some(source.to_path_buf()),
			destination: Some(destination.to_path_buf()),
			bundle: Some(bundle.to_path_buf()),
			keywords: config.keywords.clone(),
			..Default::default()
		})
		.data(TagReport {
			language: outcome.language,
			instance: outcome.instance,
			written,
			destination: written.then(|| destination.to_path_buf()),
			tally: outcome.tally,
			concepts: outcome.concepts.len(),
			explanations: outcome.explanations.len(),
		});
	if !written {
		builder = builder.diagnostic(DiagnosticLevel::Warning, "no extensions found; nothing written");
	}
	print_result(&builder.build(), format);
	Ok(())
}

/// Writes `content` to `path`, creating missing parent directories.
pub(super) fn write_output(path: &Path, content: &str) -> Result<()> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent).map_err(|e| CliError::file(parent, e))?;
	}
	std::fs::write(path, content).map_err(|e| CliError::file(path, e))
}
