//! JSON-ready outcome of one triggered run, as returned by the CLI and the webhook.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::error;

use crate::config::SyncConfig;
use crate::contract::{ContentSource, SearchIndex};
use crate::observer::SyncObserver;
use crate::synchronise::{synchronise, SyncReport};

/// Either the run summary or the error that aborted the run.
///
/// A failed collection still yields [`SyncOutcome::Completed`]; only a run-level failure
/// (such as listing collections) yields [`SyncOutcome::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SyncOutcome {
    Completed(CompletedRun),
    Failed(FailedRun),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedRun {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRun {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

impl SyncOutcome {
    pub fn completed(report: SyncReport) -> Self {
        SyncOutcome::Completed(CompletedRun {
            success: true,
            report,
            timestamp: now_timestamp(),
        })
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SyncOutcome::Failed(FailedRun {
            success: false,
            error: error.into(),
            timestamp: now_timestamp(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&SyncReport> {
        match self {
            SyncOutcome::Completed(run) => Some(&run.report),
            SyncOutcome::Failed(_) => None,
        }
    }
}

/// UTC now, RFC 3339 with millisecond precision and a `Z` suffix.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Run one sync and wrap the result for the trigger surfaces.
pub async fn perform_sync<S, I, O>(
    config: &SyncConfig,
    source: &S,
    search_index: &I,
    observer: &O,
) -> SyncOutcome
where
    S: ContentSource + ?Sized,
    I: SearchIndex + ?Sized,
    O: SyncObserver + ?Sized,
{
    match synchronise(config, source, search_index, observer).await {
        Ok(report) => SyncOutcome::completed(report),
        Err(e) => {
            error!(error = %e, "[SYNC][ERROR] Sync run failed");
            SyncOutcome::failed(e.to_string())
        }
    }
}
