//! Plain-language explanation services.
//!
//! An explainer receives every candidate of one document in a single call and
//! answers with one text per candidate, in the same order. Pairing and the
//! count check happen in the caller.

mod echo;
mod ollama;

use async_trait::async_trait;
use epi_tag::PlainLanguageCandidate;

pub use echo::EchoExplainer;
pub use ollama::OllamaExplainer;

use crate::cli::ExplainerKind;
use crate::config::ExplainerConfig;
use crate::error::Result;

#[async_trait]
pub trait Explainer: Send + Sync {
	fn name(&self) -> &'static str;

	/// One response per candidate, in order. `language` is an ISO 639-1 code.
	async fn explain(&self, language: &str, candidates: &[PlainLanguageCandidate]) -> Result<Vec<String>>;
}

pub fn build_explainer(config: &ExplainerConfig) -> Result<Box<dyn Explainer>> {
	Ok(match config.kind {
		ExplainerKind::Echo => Box::new(EchoExplainer),
		ExplainerKind::Ollama => Box::new(OllamaExplainer::new(config)?),
	})
}
