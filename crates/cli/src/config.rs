//! Layered tagger configuration: compiled-in defaults, then an optional JSON
//! file, then environment variables, then command line flags.

use std::path::{Path, PathBuf};

use epi_tag::{DifficultyConfig, DocumentOptions, TagOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{ExplainerKind, TaggingArgs};
use crate::error::{CliError, Result};

const DEFAULTS: &str = include_str!("defaults.json");

/// Environment variables overriding the explanation model endpoint, in
/// priority order.
pub const MODEL_URL_VARS: [&str; 2] = ["EPI_TAG_MODEL_URL", "MODEL_URL"];
pub const MODEL_VAR: &str = "EPI_TAG_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggerConfig {
	/// Keyword table used when `--keywords` is not given.
	pub keywords: Option<PathBuf>,
	pub difficulty: DifficultyConfig,
	pub plain_language: bool,
	pub suffix: String,
	pub explainer: ExplainerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainerConfig {
	pub kind: ExplainerKind,
	/// Base URL of the Ollama server.
	pub model_url: String,
	pub model: String,
	pub keep_alive: Option<String>,
	pub timeout_secs: u64,
}

impl TaggerConfig {
	/// Defaults, overlaid with `path` or the per-user config file when it
	/// exists, then with the environment.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let user_file = match path {
			Some(path) => Some(path.to_path_buf()),
			None => default_config_path().filter(|p| p.is_file()),
		};
		let overlay = match &user_file {
			Some(path) => Some((path.as_path(), std::fs::read_to_string(path).map_err(|e| CliError::file(path, e))?)),
			None => None,
		};

		let mut config = Self::from_layers(overlay.as_ref().map(|(p, s)| (*p, s.as_str())))?;
		config.apply_env(|name| std::env::var(name).ok());
		debug!(target = "epi_tag", file = ?user_file, explainer = %config.explainer.kind, "loaded configuration");
		Ok(config)
	}

	/// Defaults merged with an optional JSON overlay. Objects merge key by
	/// key; any other overlay value replaces the default.
	pub fn from_layers(overlay: Option<(&Path, &str)>) -> Result<Self> {
		let mut value: serde_json::Value = serde_json::from_str(DEFAULTS).map_err(|e| CliError::Config {
			path: PathBuf::from("defaults.json"),
			message: e.to_string(),
		})?;

		let mut source = PathBuf::from("defaults.json");
		if let Some((path, content)) = overlay {
			let layer: serde_json::Value = serde_json::from_str(content).map_err(|e| CliError::Config {
				path: path.to_path_buf(),
				message: e.to_string(),
			})?;
			merge(&mut value, layer);
			source = path.to_path_buf();
		}

		serde_json::from_value(value).map_err(|e| CliError::Config {
			path: source,
			message: e.to_string(),
		})
	}

	pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
		if let Some(url) = MODEL_URL_VARS.iter().find_map(|name| lookup(name).filter(|v| !v.is_empty())) {
			self.explainer.model_url = url;
		}
		if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.is_empty()) {
			self.explainer.model = model;
		}
	}

	pub fn apply_args(&mut self, args: &TaggingArgs) {
		if let Some(keywords) = &args.keywords {
			self.keywords = Some(keywords.clone());
		}
		if args.plain_language {
			self.plain_language = true;
		}
		if let Some(kind) = args.explainer {
			self.explainer.kind = kind;
		}
		if args.no_difficulty {
			self.difficulty.enabled = false;
		}
	}

	pub fn keywords_path(&self) -> Result<&Path> {
		self.keywords.as_deref().ok_or(CliError::NoKeywords)
	}

	pub fn document_options(&self) -> DocumentOptions {
		DocumentOptions {
			tag: TagOptions {
				difficulty: self.difficulty,
				plain_language: self.plain_language,
			},
			suffix: self.suffix.clone(),
		}
	}
}

fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("epi-tag").join("config.json"))
}

fn merge(base: &mut serde_json::Value, overlay: serde_json::Value) {
	match (base, overlay) {
		(serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
			for (key, value) in overlay {
				match base.get_mut(&key) {
					Some(existing) => merge(existing, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, overlay) => *base = overlay,
	}
}
