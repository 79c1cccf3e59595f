use regex::Regex;
use std::sync::LazyLock;

static API_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // OpenRouter (sk-or-v1-...), Anthropic (sk-ant-...) and OpenAI-style keys
    Regex::new(r"sk-[a-zA-Z0-9][a-zA-Z0-9_-]{19,}").expect("api key pattern is valid")
});

static BEARER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Bearer\s+[a-zA-Z0-9_\-\.]+").expect("bearer pattern is valid")
});

static TOKEN_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*)["']?[a-zA-Z0-9_\-\.]{8,}["']?"#)
        .expect("token field pattern is valid")
});

/// Redacts credentials from text that is about to be logged.
///
/// Upstream error bodies and URLs can echo the bearer token back; anything
/// originating outside the process passes through here before it reaches a
/// log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    /// Create a scrubber.
    pub const fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = BEARER_PATTERN.replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = API_KEY_PATTERN.replace_all(&scrubbed, "[API_KEY_REDACTED]");
        TOKEN_FIELD_PATTERN
            .replace_all(&scrubbed, "${1}[REDACTED]")
            .into_owned()
    }
}
