//! Process bootstrap.
//!
//! Wires the HTTP collaborators into a [`ControlLoop`], binds the status
//! server, and runs both as tasks on the current runtime until stopped.

use anyhow::{anyhow, Context, Result};
use reqwest::Client as ReqwestClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::control_loop::ControlLoop;
use crate::adapters::StatusHttpServer;
use crate::domain::models::{Config, LoopState};
use crate::infrastructure::http::{
    build_client, HttpHealthProbe, HttpPriceFetcher, HttpTradeExecutor,
};
use crate::infrastructure::oracle::{OracleClient, PromptRenderer};
use crate::services::{
    ActionDispatcher, ObservationCollector, StabilityEvolver, SyntheticBalance, TradeDefaults,
};

/// Observation collector over the configured services and market endpoint.
pub fn build_collector(config: &Config, http_client: &ReqwestClient) -> ObservationCollector {
    ObservationCollector::new(
        Arc::new(HttpHealthProbe::new(http_client.clone(), config.probe.timeout())),
        Arc::new(HttpPriceFetcher::new(http_client.clone(), &config.market)),
        config.services.clone(),
        SyntheticBalance::from(&config.balance),
    )
}

/// Control loop backed by the real HTTP collaborators.
pub fn build_control_loop(config: &Config) -> Result<ControlLoop> {
    let http_client = build_client()?;
    let collector = Arc::new(build_collector(config, &http_client));

    let prompt = PromptRenderer::load(config.oracle.prompt_template_path.as_deref())
        .context("Failed to load policy prompt")?;
    let oracle = OracleClient::new(http_client.clone(), &config.oracle, prompt);

    let dispatcher = ActionDispatcher::new(
        Arc::new(HttpTradeExecutor::new(http_client, &config.trading)),
        Arc::clone(&collector),
        TradeDefaults::from(&config.trading),
    );

    Ok(ControlLoop::new(
        collector,
        Arc::new(oracle),
        Arc::new(dispatcher),
        StabilityEvolver::new(config.stability.clone()),
        &config.control_loop,
    ))
}

/// Running supervisor: the control loop task plus the status server task.
pub struct SupervisorHandle {
    cancel: CancellationToken,
    finished: CancellationToken,
    local_addr: SocketAddr,
    snapshots: watch::Receiver<LoopState>,
    loop_task: Option<JoinHandle<LoopState>>,
    server_task: Option<JoinHandle<Result<()>>>,
    final_state: Option<LoopState>,
}

impl SupervisorHandle {
    /// Address the status server is listening on.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Latest published loop state.
    pub fn snapshot(&self) -> LoopState {
        self.snapshots.borrow().clone()
    }

    /// Resolves once the loop has ended, by itself or through [`Self::stop`].
    ///
    /// The status server keeps answering until [`Self::stop`] is called.
    pub async fn stopped(&self) {
        self.finished.cancelled().await;
    }

    /// Stop the loop and the status server, returning the final state.
    ///
    /// Calling this again returns the same state without side effects.
    ///
    /// # Errors
    /// Returns an error if the loop task panicked outside the cycle guard.
    pub async fn stop(&mut self) -> Result<LoopState> {
        if let Some(state) = &self.final_state {
            return Ok(state.clone());
        }

        self.cancel.cancel();

        let loop_result = match self.loop_task.take() {
            Some(task) => task.await.context("Control loop task failed"),
            None => Err(anyhow!("Control loop task already failed")),
        };

        if let Some(task) = self.server_task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "Status server exited with error"),
                Err(err) => warn!(error = %err, "Status server task failed"),
            }
        }

        let state = loop_result?;
        info!(
            cycles = state.cycle_count,
            failed_cycles = state.failed_cycles,
            coherence = state.coherence,
            uptime_seconds = state.uptime_seconds(),
            "Supervisor stopped"
        );

        self.final_state = Some(state.clone());
        Ok(state)
    }
}

/// Bootstrap entry points.
pub struct Supervisor;

impl Supervisor {
    /// Build everything from `config` and start it.
    ///
    /// # Errors
    /// Fails if the prompt template cannot be loaded, the HTTP client cannot
    /// be built, or the status server cannot bind.
    pub async fn start(config: &Config) -> Result<SupervisorHandle> {
        let control_loop = build_control_loop(config)?;
        Self::start_with(control_loop, config).await
    }

    /// Start an already-built loop alongside the status server.
    ///
    /// # Errors
    /// Fails if the status server cannot bind.
    pub async fn start_with(control_loop: ControlLoop, config: &Config) -> Result<SupervisorHandle> {
        let listener = StatusHttpServer::bind(&config.status).await?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read status server address")?;

        let snapshots = control_loop.subscribe();
        let cancel = CancellationToken::new();

        let server = StatusHttpServer::new(snapshots.clone(), config.stability.clone());
        let server_task = tokio::spawn(
            server.serve_with_shutdown(listener, cancel.clone().cancelled_owned()),
        );

        let finished = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let loop_finished = finished.clone();
        let loop_task = tokio::spawn(async move {
            // Stopping by cycle limit or by panic still releases `stopped()`.
            let _guard = loop_finished.drop_guard();
            control_loop.run(loop_cancel).await
        });

        info!(status_addr = %local_addr, "Supervisor started");

        Ok(SupervisorHandle {
            cancel,
            finished,
            local_addr,
            snapshots,
            loop_task: Some(loop_task),
            server_task: Some(server_task),
            final_state: None,
        })
    }
}
