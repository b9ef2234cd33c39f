use serde::{Deserialize, Serialize};

/// Path of the chat endpoint, relative to the service base URL.
pub const CHAT_PATH: &str = "api/chat";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
}

impl ChatMessage {
	pub fn system(content: impl Into<String>) -> Self {
		Self {
			role: Role::System,
			content: content.into(),
		}
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self {
			role: Role::User,
			content: content.into(),
		}
	}
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
	pub model: String,
	pub messages: Vec<ChatMessage>,
	pub stream: bool,
	/// How long the model stays loaded after the request, e.g. `"-1m"`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keep_alive: Option<String>,
	/// Model parameters such as `temperature`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub options: Option<serde_json::Value>,
}

impl ChatRequest {
	pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
		Self {
			model: model.into(),
			messages,
			stream: false,
			keep_alive: None,
			options: None,
		}
	}

	pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
		self.keep_alive = Some(keep_alive.into());
		self
	}
}

/// Non-streamed reply to a [`ChatRequest`]. Fields the client does not use
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	#[serde(default)]
	pub model: String,
	pub message: ChatMessage,
	#[serde(default)]
	pub done: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_serializes_in_wire_shape() {
		let request = ChatRequest::new("llama3", vec![ChatMessage::system("be brief"), ChatMessage::user("a|b")]).keep_alive("-1m");
		let value = serde_json::to_value(&request).expect("serializes");
		assert_eq!(
			value,
			serde_json::json!({
				"model": "llama3",
				"messages": [
					{"role": "system", "content": "be brief"},
					{"role": "user", "content": "a|b"}
				],
				"stream": false,
				"keep_alive": "-1m"
			})
		);
	}

	#[test]
	fn response_ignores_extra_fields() {
		let body = r#"{"model":"llama3","created_at":"2024-05-01T10:00:00Z","message":{"role":"assistant","content":"x | y"},"done":true,"total_duration":12}"#;
		let response: ChatResponse = serde_json::from_str(body).expect("parses");
		assert_eq!(response.message.role, Role::Assistant);
		assert_eq!(response.message.content, "x | y");
		assert!(response.done);
	}
}
