//! Reading collections and live items from a [`ContentSource`].

use tracing::{debug, error, info};

use crate::contract::{Collection, ContentSource, Item, PageRequest};
use crate::error::SyncError;

/// Fixed page size used when paging through live items.
pub const PAGE_SIZE: u32 = 100;

/// Returns every collection of `site_id`, in store order. No retry.
pub async fn list_collections<S>(source: &S, site_id: &str) -> Result<Vec<Collection>, SyncError>
where
    S: ContentSource + ?Sized,
{
    info!(site_id, "Fetching all collections from content store");
    match source.list_collections(site_id).await {
        Ok(collections) => {
            info!(site_id, count = collections.len(), "Fetched collections");
            Ok(collections)
        }
        Err(e) => {
            error!(site_id, error = %e, "Failed to list collections");
            Err(SyncError::source_unavailable(
                format!("listing collections of site {site_id}"),
                e,
            ))
        }
    }
}

/// Pages through all live items of a collection.
///
/// Stops after an empty page or a page shorter than [`PAGE_SIZE`]. The offset advances by the
/// page size after every non-empty page. Any page error aborts the whole fetch.
pub async fn fetch_all_items<S>(source: &S, collection_id: &str) -> Result<Vec<Item>, SyncError>
where
    S: ContentSource + ?Sized,
{
    let mut all_items = Vec::new();
    let mut offset = 0;

    loop {
        let page = PageRequest {
            offset,
            limit: PAGE_SIZE,
        };
        let response = match source.list_live_items(collection_id, page).await {
            Ok(response) => response,
            Err(e) => {
                error!(collection_id, offset, error = %e, "Error fetching items page");
                return Err(SyncError::source_unavailable(
                    format!("fetching items of collection {collection_id} at offset {offset}"),
                    e,
                ));
            }
        };

        let page_len = response.items.len();
        debug!(collection_id, offset, page_len, "Fetched items page");
        if page_len == 0 {
            break;
        }

        all_items.extend(response.items);
        offset += PAGE_SIZE;

        if page_len < PAGE_SIZE as usize {
            break;
        }
    }

    Ok(all_items)
}
