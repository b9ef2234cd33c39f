use std::path::{Path, PathBuf};

use anyhow::Context;
use epi_tag::MatchTally;
use serde::Serialize;
use tracing::{info, warn};

use super::pipeline::Pipeline;
use super::tag::write_output;
use crate::config::TaggerConfig;
use crate::error::{CliError, Result};
use crate::output::{CommandInputs, DiagnosticLevel, ErrorCode, OutputFormat, ResultBuilder, print_result};

const COMPOSITION_PREFIX: &str = "composition-";
const BUNDLE_FILE: &str = "Bundle.fsh";

/// A composition found below the batch root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Job {
	source: PathBuf,
	bundle: PathBuf,
	destination: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
	pub documents: Vec<BatchDocument>,
	pub failures: Vec<BatchFailure>,
	pub written: usize,
	/// Per-key sum over every processed document.
	pub tally: MatchTally,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDocument {
	pub source: PathBuf,
	pub destination: PathBuf,
	pub language: String,
	pub written: bool,
	pub matches: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
	pub source: PathBuf,
	pub code: ErrorCode,
	pub message: String,
}

/// `composition-<lang>-...-<id>.fsh` → `pproc_<lang>_<id>.fsh`.
fn output_name(file_name: &str) -> Option<String> {
	let stem = file_name.strip_prefix(COMPOSITION_PREFIX)?.strip_suffix(".fsh")?;
	let language = stem.split('-').next().filter(|l| !l.is_empty())?;
	let id = stem.rsplit('-').next().filter(|id| !id.is_empty())?;
	Some(format!("pproc_{language}_{id}.fsh"))
}

/// Compositions below `root`, depth first, sorted by path.
fn collect_jobs(root: &Path, target: &Path) -> Result<Vec<Job>> {
	let mut jobs = Vec::new();
	let mut pending = vec![root.to_path_buf()];
	while let Some(dir) = pending.pop() {
		for entry in std::fs::read_dir(&dir).map_err(|e| CliError::file(&dir, e))? {
			let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
			let path = entry.path();
			let file_type = entry.file_type().with_context(|| format!("failed to stat {}", path.display()))?;
			if file_type.is_dir() {
				pending.push(path);
				continue;
			}
			let Some(name) = entry.file_name().to_str().and_then(output_name) else {
				continue;
			};
			jobs.push(Job {
				bundle: dir.join(BUNDLE_FILE),
				destination: target.join(name),
				source: path,
			});
		}
	}
	jobs.sort_by(|a, b| a.source.cmp(&b.source));
	Ok(jobs)
}

pub async fn execute(root: &Path, target: &Path, config: &TaggerConfig, format: OutputFormat) -> Result<()> {
	let pipeline = Pipeline::from_config(config)?;
	let jobs = collect_jobs(root, target)?;
	info!(target = "epi_tag", root = %root.display(), compositions = jobs.len(), "batch");

	let mut builder = ResultBuilder::new("batch").inputs(CommandInputs {
		root: Some(root.to_path_buf()),
		target: Some(target.to_path_buf()),
		keywords: config.keywords.clone(),
		..Default::default()
	});
	let mut report = BatchReport {
		documents: Vec::new(),
		failures: Vec::new(),
		written: 0,
		tally: MatchTally::new(),
	};

	for job in jobs {
		match run_job(&pipeline, &job).await {
			Ok(document) => {
				if document.written {
					report.written += 1;
				} else {
					builder = builder.diagnostic_with_source(DiagnosticLevel::Warning, "no extensions found; nothing written", job.source.display().to_string());
				}
				report.tally.merge(&document.tally);
				report.documents.push(BatchDocument {
					source: job.source,
					destination: job.destination,
					language: document.language,
					written: document.written,
					matches: document.tally.total(),
				});
			}
			Err(err) => {
				warn!(target = "epi_tag", source = %job.source.display(), error = %err, "composition failed");
				builder = builder.diagnostic_with_source(DiagnosticLevel::Error, err.to_string(), job.source.display().to_string());
				report.failures.push(BatchFailure {
					source: job.source,
					code: err.code(),
					message: err.to_string(),
				});
			}
		}
	}

	print_result(&builder.data(report).build(), format);
	Ok(())
}

struct JobOutcome {
	language: String,
	written: bool,
	tally: MatchTally,
}

async fn run_job(pipeline: &Pipeline, job: &Job) -> Result<JobOutcome> {
	let composition = std::fs::read_to_string(&job.source).map_err(|e| CliError::file(&job.source, e))?;
	let bundle = match std::fs::read_to_string(&job.bundle) {
		Ok(bundle) => Some(bundle),
		Err(err) => {
			warn!(target = "epi_tag", bundle = %job.bundle.display(), error = %err, "bundle unreadable; skipping bundle patching");
			None
		}
	};

	let outcome = pipeline.process(&composition, bundle.as_deref()).await?;
	let written = match &outcome.output {
		Some(out) => {
			write_output(&job.destination, out)?;
			true
		}
		None => false,
	};
	Ok(JobOutcome {
		language: outcome.language,
		written,
		tally: outcome.tally,
	})
}
