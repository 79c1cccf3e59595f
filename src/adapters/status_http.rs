//! Status HTTP server.
//!
//! Serves `/health` (JSON) and `/metrics` (text exposition) from the last
//! published [`LoopState`] snapshot. Handlers never wait on a running cycle.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use sysinfo::{Pid, System};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::domain::models::{Decision, LoopState, StabilityConfig, StatusConfig};

/// Reported when coherence is above the alive threshold.
pub const STATUS_ALIVE: &str = "VIVO";

/// Reported otherwise.
pub const STATUS_WEAK: &str = "DÉBIL";

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    /// `VIVO` or `DÉBIL`.
    pub estado: &'static str,
    /// Current coherence.
    pub coherencia: f64,
    /// Most recent decision, `null` before the first cycle.
    #[serde(rename = "decisión")]
    pub decision: Option<Decision>,
    /// Completed cycles.
    pub ciclos: u64,
    /// Seconds since the loop started.
    pub uptime: f64,
}

impl HealthResponse {
    fn from_state(state: &LoopState, stability: &StabilityConfig) -> Self {
        Self {
            estado: if stability.is_alive(state.coherence) {
                STATUS_ALIVE
            } else {
                STATUS_WEAK
            },
            coherencia: state.coherence,
            decision: state.last_decision.clone(),
            ciclos: state.cycle_count,
            uptime: state.uptime_seconds(),
        }
    }
}

/// Resident memory of the current process.
struct MemorySampler {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl MemorySampler {
    fn new() -> Self {
        Self {
            pid: sysinfo::get_current_pid().ok(),
            system: Mutex::new(System::new()),
        }
    }

    /// Bytes of resident memory, or 0 when it cannot be read.
    fn resident_bytes(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        let Ok(mut system) = self.system.lock() else {
            return 0;
        };
        if !system.refresh_process(pid) {
            return 0;
        }
        system.process(pid).map_or(0, sysinfo::Process::memory)
    }
}

/// Shared state for the status server.
pub struct StatusState {
    snapshots: watch::Receiver<LoopState>,
    stability: StabilityConfig,
    memory: MemorySampler,
}

/// Read-only HTTP view of the control loop.
pub struct StatusHttpServer {
    state: Arc<StatusState>,
}

impl StatusHttpServer {
    /// Create a server answering from `snapshots`.
    pub fn new(snapshots: watch::Receiver<LoopState>, stability: StabilityConfig) -> Self {
        Self {
            state: Arc::new(StatusState {
                snapshots,
                stability,
                memory: MemorySampler::new(),
            }),
        }
    }

    /// Build the router with all endpoints.
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .with_state(Arc::clone(&self.state))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address. Failure here is fatal at bootstrap.
    pub async fn bind(config: &StatusConfig) -> Result<TcpListener> {
        let addr = format!("{}:{}", config.host, config.port);
        TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind status server on {addr}"))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        let router = self.build_router();

        info!(addr = ?addr, "Status HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Status HTTP server failed")?;

        info!("Status HTTP server stopped");
        Ok(())
    }
}

// Handler functions

async fn health(State(state): State<Arc<StatusState>>) -> Json<HealthResponse> {
    let snapshot = state.snapshots.borrow().clone();
    Json(HealthResponse::from_state(&snapshot, &state.stability))
}

async fn metrics(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    let snapshot = state.snapshots.borrow().clone();
    let body = render_metrics(&snapshot, state.memory.resident_bytes());
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

/// Text exposition of the loop metrics.
pub fn render_metrics(state: &LoopState, memory_bytes: u64) -> String {
    let mut body = String::from("# MetaConsciencia Metrics\n");
    let _ = writeln!(body, "qbtc_coherencia {}", state.coherence);
    let _ = writeln!(body, "qbtc_ciclos_total {}", state.cycle_count);
    let _ = writeln!(body, "qbtc_uptime_seconds {}", state.uptime_seconds());
    let _ = writeln!(body, "qbtc_memory_usage {memory_bytes}");
    body
}
