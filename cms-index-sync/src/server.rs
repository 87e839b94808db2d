//! HTTP trigger surface and in-process schedule.
//!
//! - `POST /webhook` performs one full sync and answers with the JSON outcome
//!   (`200` on success, `500` when the run itself failed).
//! - Every other request gets a short plain-text banner.
//! - With a configured interval a background task performs a run on every tick.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use cms_index_sync_core::config::SyncConfig;
use cms_index_sync_core::contract::{ContentSource, SearchIndex};
use cms_index_sync_core::observer::TracingObserver;
use cms_index_sync_core::trigger::{perform_sync, SyncOutcome};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::algolia::AlgoliaClient;
use crate::load_config::CliConfig;
use crate::webflow::WebflowClient;

pub const BANNER: &str =
    "Webflow to Algolia sync worker.\n\nPOST to /webhook to trigger sync manually.";

/// Shared state for handlers and the scheduler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SyncConfig>,
    pub source: Arc<dyn ContentSource>,
    pub index: Arc<dyn SearchIndex>,
}

impl AppState {
    pub fn new(
        config: SyncConfig,
        source: Arc<dyn ContentSource>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            index,
        }
    }

    /// Build the state with the real Webflow and Algolia clients.
    pub fn from_config(config: &CliConfig) -> anyhow::Result<Self> {
        let source = WebflowClient::new(config.webflow.clone())?;
        let index = AlgoliaClient::new(config.algolia.clone())?;
        Ok(Self::new(config.sync.clone(), Arc::new(source), Arc::new(index)))
    }

    pub async fn run_once(&self) -> SyncOutcome {
        perform_sync(
            &self.config,
            self.source.as_ref(),
            self.index.as_ref(),
            &TracingObserver,
        )
        .await
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook).fallback(handle_banner))
        .fallback(handle_banner)
        .with_state(state)
}

async fn handle_webhook(State(state): State<AppState>) -> Response {
    tracing::info!("Webhook triggered sync");
    let outcome = state.run_once().await;
    let status = if outcome.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome)).into_response()
}

async fn handle_banner() -> &'static str {
    BANNER
}

/// Perform a run every `every`, starting one interval after the call.
pub fn spawn_schedule(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            tracing::info!(every_secs = every.as_secs(), "Scheduled sync triggered");
            let outcome = state.run_once().await;
            match &outcome {
                SyncOutcome::Completed(run) => tracing::info!(
                    collections_processed = run.report.collections_processed,
                    total_items_synced = run.report.total_items_synced,
                    "Scheduled sync finished"
                ),
                SyncOutcome::Failed(run) => {
                    tracing::error!(error = %run.error, "Scheduled sync failed")
                }
            }
        }
    })
}

/// Serve the webhook until Ctrl-C.
pub async fn run_server(state: AppState, bind: &str, every: Option<Duration>) -> anyhow::Result<()> {
    let schedule = every.map(|every| spawn_schedule(state.clone(), every));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(bind, schedule = ?every, "Sync trigger server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    if let Some(handle) = schedule {
        handle.abort();
    }
    tracing::info!("Sync trigger server stopped");
    Ok(())
}
