use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::prompt::PromptRenderer;
use super::types::{ChatRequest, ChatResponse};
use crate::domain::errors::{OracleError, OracleParseError};
use crate::domain::models::{Decision, Observation, OracleConfig};
use crate::domain::ports::DecisionOracle;
use crate::infrastructure::http::{classify, excerpt};
use crate::infrastructure::logging::SecretScrubber;
use crate::services::decision_parser::parse_decision;

/// Decision oracle backed by an OpenAI-compatible chat-completions endpoint
///
/// One bounded request per decision, no retries: a late decision is worth
/// less than the fallback `HOLD`.
pub struct OracleClient {
    /// Shared HTTP client with connection pooling
    http_client: ReqwestClient,

    /// Chat-completions URL
    endpoint: String,

    /// Model identifier
    model: String,

    /// Bearer token, injected from configuration
    api_key: Option<String>,

    /// Per-request deadline
    timeout: Duration,

    /// Policy prompt renderer
    prompt: PromptRenderer,

    scrubber: SecretScrubber,
}

impl OracleClient {
    /// Create a client from the oracle configuration.
    pub fn new(http_client: ReqwestClient, config: &OracleConfig, prompt: PromptRenderer) -> Self {
        if config.api_key.is_none() {
            warn!(
                endpoint = %config.endpoint,
                "No oracle API key configured; requests will be sent unauthenticated"
            );
        }

        Self {
            http_client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
            prompt,
            scrubber: SecretScrubber::new(),
        }
    }

    /// Ask the oracle once, surfacing every failure as an [`OracleError`].
    pub async fn request_decision(
        &self,
        observation: &Observation,
        coherence: f64,
    ) -> Result<Decision, OracleError> {
        let content = self.prompt.render(observation, coherence)?;
        let request = ChatRequest::user(&self.model, content);

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .timeout(self.timeout);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| classify(&err, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| classify(&err, self.timeout))?;

        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let envelope: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| OracleParseError::MalformedEnvelope(err.to_string()))?;
        let choice = envelope
            .choices
            .into_iter()
            .next()
            .ok_or(OracleParseError::EmptyChoices)?;
        let text = choice
            .message
            .content
            .ok_or_else(|| OracleParseError::MalformedEnvelope("message has no content".to_string()))?;

        Ok(parse_decision(&text)?)
    }
}

#[async_trait]
impl DecisionOracle for OracleClient {
    #[instrument(skip_all, fields(coherence = coherence))]
    async fn decide(&self, observation: &Observation, coherence: f64) -> Decision {
        match self.request_decision(observation, coherence).await {
            Ok(decision) => {
                info!(
                    action = %decision.action,
                    reason = %decision.reason,
                    confidence = decision.confidence,
                    "Oracle decision received"
                );
                decision
            }
            Err(err) => {
                let cause = err.cause();
                warn!(
                    cause = cause.tag(),
                    error = %self.scrubber.scrub_message(&err.to_string()),
                    "Oracle call failed, falling back to HOLD"
                );
                Decision::fallback(cause)
            }
        }
    }
}
