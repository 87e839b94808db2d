//! Error types for the sync pipeline.

use thiserror::Error;

use crate::contract::ClientError;

/// Errors raised by pipeline steps.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing collections or fetching items from the content store failed.
    #[error("{operation} failed: {source}")]
    SourceUnavailable {
        operation: String,
        #[source]
        source: ClientError,
    },

    /// Replacing the contents of a search index failed.
    #[error("replacing index '{index}' failed: {source}")]
    IndexSyncFailed {
        index: String,
        #[source]
        source: ClientError,
    },
}

impl SyncError {
    pub fn source_unavailable(operation: impl Into<String>, source: ClientError) -> Self {
        SyncError::SourceUnavailable {
            operation: operation.into(),
            source,
        }
    }

    pub fn index_sync_failed(index: impl Into<String>, source: ClientError) -> Self {
        SyncError::IndexSyncFailed {
            index: index.into(),
            source,
        }
    }
}
