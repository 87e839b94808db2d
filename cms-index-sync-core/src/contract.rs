//! # contract: capability interfaces for the content store and the search index
//!
//! This module defines the two narrow traits the pipeline consumes ([`ContentSource`] and
//! [`SearchIndex`]) together with the plain data types that cross them.
//!
//! ## Interface & Extensibility
//! - Implement [`ContentSource`] to read collections and live items from a CMS.
//! - Implement [`SearchIndex`] to atomically replace the contents of a search index.
//! - All methods are async and return boxed errors ([`ClientError`]); the pipeline maps them
//!   onto [`crate::error::SyncError`].
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, exported under the `test-export-mocks` feature,
//!   so downstream crates and integration tests can script deterministic fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type returned by capability implementations.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// Open field bag of an item: field name to JSON value, in source order.
pub type FieldData = Map<String, Value>;

/// One content type (table) of the source store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub display_name: String,
}

impl Collection {
    /// Slug, falling back to the display name when the slug is absent or empty.
    ///
    /// Used both for allow-list matching and as the target index name.
    pub fn name(&self) -> &str {
        match self.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug,
            _ => &self.display_name,
        }
    }
}

/// One content entry as returned by the source store.
///
/// Timestamps are opaque strings: they are copied onto records, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub field_data: Option<FieldData>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
    #[serde(default)]
    pub published_on: Option<String>,
    #[serde(default)]
    pub last_published: Option<String>,
    #[serde(default)]
    pub is_draft: Option<bool>,
    #[serde(default)]
    pub is_archived: Option<bool>,
}

/// Offset/limit cursor for one page of live items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

/// One page of live items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A flat, search-engine-ready document derived from one [`Item`].
///
/// Serializes as a single JSON object: `objectID` first, then `attributes` in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Read access to the content store.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// List every collection defined for the site, in the order the store returns them.
    async fn list_collections(&self, site_id: &str) -> Result<Vec<Collection>, ClientError>;

    /// Fetch one page of live (published) items of a collection.
    async fn list_live_items(
        &self,
        collection_id: &str,
        page: PageRequest,
    ) -> Result<ItemPage, ClientError>;
}

/// Write access to the search index service.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Atomically replace the entire contents of `index_name` with `records`.
    async fn replace_all_objects(
        &self,
        index_name: &str,
        records: &[Record],
    ) -> Result<(), ClientError>;
}
