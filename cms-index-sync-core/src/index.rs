use tracing::{error, info};

use crate::contract::{Record, SearchIndex};
use crate::error::SyncError;

/// Replace the full contents of `index_name` with `records`; returns the number of records written.
pub async fn sync_index<I>(index: &I, index_name: &str, records: &[Record]) -> Result<usize, SyncError>
where
    I: SearchIndex + ?Sized,
{
    info!(index_name, records = records.len(), "Replacing all objects in index");
    if let Err(e) = index.replace_all_objects(index_name, records).await {
        error!(index_name, error = %e, "Error syncing to search index");
        return Err(SyncError::index_sync_failed(index_name, e));
    }
    info!(index_name, records = records.len(), "Index now contains the new record set");
    Ok(records.len())
}
