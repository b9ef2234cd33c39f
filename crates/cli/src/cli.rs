use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "epi-tag")]
#[command(about = "Tag ePI narratives in FHIR Shorthand compositions with vocabulary concepts")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short, long, global = true, value_enum, default_value = "text")]
	pub format: OutputFormat,

	/// JSON configuration file (defaults to ~/.config/epi-tag/config.json when present)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Tag one composition and write the processed copy
	Tag {
		/// Composition FSH file
		source: PathBuf,
		/// Where to write the processed composition
		destination: PathBuf,
		/// Bundle FSH file whose instances reference the composition
		bundle: PathBuf,
		#[command(flatten)]
		tagging: TaggingArgs,
	},

	/// Tag every `composition-<lang>-<id>.fsh` below a directory
	Batch {
		/// Directory searched recursively for compositions
		root: PathBuf,
		/// Directory receiving `pproc_<lang>_<id>.fsh` files
		target: PathBuf,
		#[command(flatten)]
		tagging: TaggingArgs,
	},

	/// Show the languages and entry counts of a keyword table
	Vocab {
		/// Semicolon-delimited keyword table
		keywords: PathBuf,
	},
}

impl Commands {
	/// Name used in result envelopes.
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Tag { .. } => "tag",
			Commands::Batch { .. } => "batch",
			Commands::Vocab { .. } => "vocab",
		}
	}
}

/// Options shared by the tagging commands. Unset values fall back to the
/// configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct TaggingArgs {
	/// Keyword table (semicolon-delimited)
	#[arg(long, value_name = "FILE")]
	pub keywords: Option<PathBuf>,

	/// Collect difficult texts and attach plain-language explanations
	#[arg(long)]
	pub plain_language: bool,

	/// Service producing the plain-language explanations
	#[arg(long, value_enum)]
	pub explainer: Option<ExplainerKind>,

	/// Skip readability scoring entirely
	#[arg(long)]
	pub no_difficulty: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainerKind {
	/// Use the difficult text itself as its explanation
	#[default]
	Echo,
	/// Ask an Ollama chat model
	Ollama,
}

impl std::fmt::Display for ExplainerKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ExplainerKind::Echo => write!(f, "echo"),
			ExplainerKind::Ollama => write!(f, "ollama"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_tag_with_flags() {
		let cli = Cli::try_parse_from([
			"epi-tag",
			"-vv",
			"--format",
			"json",
			"tag",
			"composition-en-1.fsh",
			"out.fsh",
			"Bundle.fsh",
			"--keywords",
			"kw.csv",
			"--plain-language",
			"--explainer",
			"ollama",
		])
		.expect("valid arguments");

		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.format, OutputFormat::Json);
		let Commands::Tag { source, tagging, .. } = cli.command else {
			panic!("expected tag command");
		};
		assert_eq!(source, PathBuf::from("composition-en-1.fsh"));
		assert_eq!(tagging.keywords, Some(PathBuf::from("kw.csv")));
		assert!(tagging.plain_language);
		assert_eq!(tagging.explainer, Some(ExplainerKind::Ollama));
		assert!(!tagging.no_difficulty);
	}

	#[test]
	fn global_flags_follow_subcommand() {
		let cli = Cli::try_parse_from(["epi-tag", "vocab", "kw.csv", "-f", "json", "--config", "c.json"]).expect("valid arguments");
		assert_eq!(cli.format, OutputFormat::Json);
		assert_eq!(cli.config, Some(PathBuf::from("c.json")));
		assert_eq!(cli.command.name(), "vocab");
	}

	#[test]
	fn tag_requires_three_paths() {
		assert!(Cli::try_parse_from(["epi-tag", "tag", "a.fsh", "b.fsh"]).is_err());
	}
}
