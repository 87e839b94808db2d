#![doc = "Content-store integration: implements the core `ContentSource` trait against the Webflow CMS v2 REST API."]
//
//! # Webflow client
//!
//! [`WebflowClient`] lists the collections of a site and pages through the live items of a
//! collection. Authentication is a bearer token (`WEBFLOW_API_TOKEN`); the base URL defaults
//! to [`DEFAULT_WEBFLOW_API`] and can be pointed at a mock server in tests.
//!
//! Non-2xx responses are turned into errors carrying the status and response body. Nothing is
//! retried; the pipeline decides what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use cms_index_sync_core::contract::{
    ClientError, Collection, ContentSource, ItemPage, PageRequest,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const DEFAULT_WEBFLOW_API: &str = "https://api.webflow.com/v2";

#[derive(Clone)]
pub struct WebflowSettings {
    pub api_token: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for WebflowSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebflowSettings")
            .field("api_token_set", &!self.api_token.is_empty())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl WebflowSettings {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_WEBFLOW_API.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize)]
struct CollectionsResponse {
    #[serde(default)]
    collections: Vec<Collection>,
}

pub struct WebflowClient {
    http: reqwest::Client,
    settings: WebflowSettings,
}

impl WebflowClient {
    pub fn new(settings: WebflowSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        tracing::info!(
            base_url = %settings.base_url,
            api_token_set = !settings.api_token.is_empty(),
            "Initialized WebflowClient"
        );
        Ok(Self { http, settings })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.settings.base_url)?;
        url.path_segments_mut()
            .map_err(|_| format!("Webflow base URL cannot be a base: {}", self.settings.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.settings.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %url, body = %body, "Webflow API returned an error");
            return Err(format!("Webflow API returned {status} for {url}: {body}").into());
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ContentSource for WebflowClient {
    async fn list_collections(&self, site_id: &str) -> Result<Vec<Collection>, ClientError> {
        tracing::info!(site_id, "Listing Webflow collections");
        let url = self.url(&["sites", site_id, "collections"])?;
        let response: CollectionsResponse = self.get_json(url).await?;
        tracing::info!(site_id, count = response.collections.len(), "Fetched Webflow collections");
        Ok(response.collections)
    }

    async fn list_live_items(
        &self,
        collection_id: &str,
        page: PageRequest,
    ) -> Result<ItemPage, ClientError> {
        let mut url = self.url(&["collections", collection_id, "items", "live"])?;
        url.query_pairs_mut()
            .append_pair("offset", &page.offset.to_string())
            .append_pair("limit", &page.limit.to_string());
        tracing::debug!(collection_id, offset = page.offset, limit = page.limit, "Fetching live items page");
        self.get_json(url).await
    }
}
