//! Common test utilities for integration tests
//!
//! Shared fixtures for mocking the oracle, the price source, and backend
//! services with wiremock.

#![allow(dead_code)]

use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use qbtc_supervisor::domain::models::{Config, OracleConfig, ServiceEndpoint};

/// Chat-completions envelope carrying `content` as the assistant message.
pub fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-test",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

/// Oracle configuration pointing at a mock server.
pub fn oracle_config(base_uri: &str) -> OracleConfig {
    OracleConfig {
        endpoint: format!("{base_uri}/api/v1/chat/completions"),
        api_key: Some("test-oracle-key".to_string()),
        timeout_ms: 500,
        ..OracleConfig::default()
    }
}

/// Configuration whose every collaborator lives on the mock server at `base_uri`.
pub fn mocked_config(base_uri: &str, service_names: &[&str]) -> Config {
    let mut config = Config::default();
    config.services = service_names
        .iter()
        .map(|name| ServiceEndpoint::new(*name, format!("{base_uri}/{name}")))
        .collect();
    config.probe.timeout_ms = 500;
    config.market.url = format!("{base_uri}/api/v3/ticker/price");
    config.market.timeout_ms = 500;
    config.oracle = oracle_config(base_uri);
    config.trading.url = format!("{base_uri}/execute-trade");
    config.trading.timeout_ms = 500;
    config.balance.fixed = Some(5000.0);
    config.status.host = "127.0.0.1".to_string();
    config.status.port = 0;
    config.control_loop.interval_ms = 50;
    config
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses.
pub async fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// In-memory sink for JSON log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Every captured line parsed as JSON.
    pub fn events(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Captured events whose message is `message`.
    pub fn with_message(&self, message: &str) -> Vec<serde_json::Value> {
        self.events()
            .into_iter()
            .filter(|event| event["fields"]["message"] == message)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's logs into a [`CapturedLogs`] until the guard drops.
///
/// Only valid with the current-thread runtime `#[tokio::test]` uses by default.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
