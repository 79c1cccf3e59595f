/// Request and response types for the chat-completions endpoint
use serde::{Deserialize, Serialize};

/// Body of the chat-completions request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,

    /// Conversation; the oracle receives a single user message
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Request carrying one user message.
    pub fn user(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(content.into()),
            }],
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author
    pub role: String,

    /// Text content; providers may send `null` for tool-only turns
    #[serde(default)]
    pub content: Option<String>,
}

/// Response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Completion candidates
    pub choices: Vec<ChatChoice>,
}

/// One completion candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Generated message
    pub message: ChatMessage,
}
