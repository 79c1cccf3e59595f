//! Inbound adapters exposing the supervisor to external systems.

pub mod status_http;

pub use status_http::{HealthResponse, StatusHttpServer};
