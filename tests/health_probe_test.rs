use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use qbtc_supervisor::domain::models::{ServiceEndpoint, ServiceHealth};
use qbtc_supervisor::domain::ports::HealthProbe;
use qbtc_supervisor::infrastructure::http::{build_client, HttpHealthProbe};

fn probe(timeout_ms: u64) -> HttpHealthProbe {
    HttpHealthProbe::new(build_client().unwrap(), Duration::from_millis(timeout_ms))
}

#[tokio::test]
async fn test_ok_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let service = ServiceEndpoint::new("leonardo", format!("{}/", server.uri()));
    assert_eq!(probe(1000).ping(&service).await, ServiceHealth::Ok);
}

#[tokio::test]
async fn test_fail_on_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = ServiceEndpoint::new("risk", server.uri());
    assert_eq!(probe(1000).ping(&service).await, ServiceHealth::Fail);
}

#[tokio::test]
async fn test_timeout_when_deadline_elapses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let service = ServiceEndpoint::new("quantum", server.uri());
    assert_eq!(probe(200).ping(&service).await, ServiceHealth::Timeout);
}

#[tokio::test]
async fn test_fail_on_connection_refused() {
    let service = ServiceEndpoint::new("admin", "http://127.0.0.1:1");
    assert_eq!(probe(1000).ping(&service).await, ServiceHealth::Fail);
}

#[tokio::test]
async fn test_unresolvable_host_never_raises() {
    let service = ServiceEndpoint::new("trading", "http://qbtc-does-not-exist.invalid:14201");
    let health = probe(1000).ping(&service).await;
    assert!(matches!(health, ServiceHealth::Fail | ServiceHealth::Timeout));
}
