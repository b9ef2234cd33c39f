use async_trait::async_trait;
use epi_tag::PlainLanguageCandidate;

use super::Explainer;
use crate::error::Result;

/// Uses each difficult text as its own explanation. Useful offline, and keeps
/// the extension layout identical to a real run.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoExplainer;

#[async_trait]
impl Explainer for EchoExplainer {
	fn name(&self) -> &'static str {
		"echo"
	}

	async fn explain(&self, _language: &str, candidates: &[PlainLanguageCandidate]) -> Result<Vec<String>> {
		Ok(candidates.iter().map(|c| c.text.clone()).collect())
	}
}
