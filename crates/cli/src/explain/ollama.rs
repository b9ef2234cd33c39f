use std::time::Duration;

use async_trait::async_trait;
use epi_tag::PlainLanguageCandidate;
use epi_tag::plain_language::{language_name, split_batch, system_prompt, user_prompt};
use epi_tag_protocol::{CHAT_PATH, ChatMessage, ChatRequest, ChatResponse};
use tracing::{debug, info};
use url::Url;

use super::Explainer;
use crate::config::ExplainerConfig;
use crate::error::{CliError, Result};

/// Asks an Ollama chat model to simplify the whole batch in one request.
pub struct OllamaExplainer {
	client: reqwest::Client,
	endpoint: Url,
	model: String,
	keep_alive: Option<String>,
}

impl OllamaExplainer {
	pub fn new(config: &ExplainerConfig) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_secs))
			.build()
			.map_err(|e| CliError::Explainer(format!("failed to create HTTP client: {e}")))?;
		Ok(Self {
			client,
			endpoint: chat_endpoint(&config.model_url)?,
			model: config.model.clone(),
			keep_alive: config.keep_alive.clone(),
		})
	}

	fn request(&self, language: &str, candidates: &[PlainLanguageCandidate]) -> Result<ChatRequest> {
		let name = language_name(language).ok_or_else(|| CliError::Explainer(format!("no language name for `{language}`")))?;
		let request = ChatRequest::new(&self.model, vec![ChatMessage::system(system_prompt(name)), ChatMessage::user(user_prompt(candidates))]);
		Ok(match &self.keep_alive {
			Some(keep_alive) => request.keep_alive(keep_alive),
			None => request,
		})
	}
}

/// `base` with the chat path appended, keeping any path prefix.
fn chat_endpoint(base: &str) -> Result<Url> {
	let mut base = Url::parse(base).map_err(|e| CliError::Explainer(format!("invalid model URL `{base}`: {e}")))?;
	if !base.path().ends_with('/') {
		let path = format!("{}/", base.path());
		base.set_path(&path);
	}
	base.join(CHAT_PATH).map_err(|e| CliError::Explainer(format!("invalid model URL: {e}")))
}

#[async_trait]
impl Explainer for OllamaExplainer {
	fn name(&self) -> &'static str {
		"ollama"
	}

	async fn explain(&self, language: &str, candidates: &[PlainLanguageCandidate]) -> Result<Vec<String>> {
		if candidates.is_empty() {
			return Ok(Vec::new());
		}
		let request = self.request(language, candidates)?;
		info!(target = "epi_tag", endpoint = %self.endpoint, model = %self.model, candidates = candidates.len(), "requesting explanations");

		let response = self.client.post(self.endpoint.clone()).json(&request).send().await?;
		if !response.status().is_success() {
			return Err(CliError::Explainer(format!("unexpected status {}", response.status())));
		}
		let reply: ChatResponse = response.json().await?;
		debug!(target = "epi_tag", reply = %reply.message.content, "model reply");
		Ok(split_batch(&reply.message.content))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(url: &str) -> ExplainerConfig {
		ExplainerConfig {
			kind: crate::cli::ExplainerKind::Ollama,
			model_url: url.to_string(),
			model: "llama3".to_string(),
			keep_alive: Some("-1m".to_string()),
			timeout_secs: 5,
		}
	}

	#[test]
	fn endpoint_keeps_path_prefix() {
		assert_eq!(chat_endpoint("http://localhost:11434").expect("valid").as_str(), "http://localhost:11434/api/chat");
		assert_eq!(chat_endpoint("https://gpu.example.org/ollama").expect("valid").as_str(), "https://gpu.example.org/ollama/api/chat");
	}

	#[test]
	fn invalid_url_is_an_explainer_error() {
		assert!(matches!(chat_endpoint("not a url"), Err(CliError::Explainer(_))));
	}

	#[test]
	fn request_carries_language_and_batch() {
		let explainer = OllamaExplainer::new(&config("http://localhost:11434")).expect("client builds");
		let candidates = vec![
			PlainLanguageCandidate {
				id: "plain-language-1".to_string(),
				text: "hepatic impairment".to_string(),
			},
			PlainLanguageCandidate {
				id: "plain-language-2".to_string(),
				text: "renal clearance".to_string(),
			},
		];
		let request = explainer.request("da", &candidates).expect("known language");

		assert_eq!(request.model, "llama3");
		assert_eq!(request.keep_alive.as_deref(), Some("-1m"));
		assert!(!request.stream);
		assert!(request.messages[0].content.contains("You must answer in Danish."));
		assert!(request.messages[1].content.contains("Original: hepatic impairment|renal clearance\nAnswer:"));
	}

	#[test]
	fn unknown_language_is_rejected() {
		let explainer = OllamaExplainer::new(&config("http://localhost:11434")).expect("client builds");
		assert!(matches!(explainer.request("xx", &[]), Err(CliError::Explainer(_))));
	}
}
