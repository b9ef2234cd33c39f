//! Wire types for the plain-language explanation service.
//!
//! The service speaks the Ollama chat API: one request carries the system
//! and user messages, one non-streamed response carries the model's reply.
//! Types here are pure data and change only when the wire format does.

pub mod chat;

pub use chat::*;
