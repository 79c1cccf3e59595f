//! Decision oracle client
//!
//! Renders the policy prompt, calls an OpenAI-compatible chat-completions
//! endpoint, and turns the free-text answer into a validated decision.

pub mod client;
pub mod prompt;
pub mod types;

pub use client::OracleClient;
pub use prompt::PromptRenderer;
pub use types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse};
