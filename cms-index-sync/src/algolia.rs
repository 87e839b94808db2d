#![doc = "Search-index integration: implements the core `SearchIndex` trait against the Algolia REST API."]
//
//! # Algolia client
//!
//! [`AlgoliaClient::replace_all_objects`] swaps the contents of an index in one step, the same
//! way the official clients do:
//!
//! 1. copy settings, rules and synonyms of the target index into a temporary index;
//! 2. add all records to the temporary index in batches;
//! 3. wait until every task is published;
//! 4. move the temporary index over the target.
//!
//! Readers of the target index see either the old or the new record set, never a mix. When a
//! step fails the temporary index is deleted and the error is returned.

use std::time::Duration;

use async_trait::async_trait;
use cms_index_sync_core::contract::{ClientError, Record, SearchIndex};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct AlgoliaSettings {
    pub app_id: String,
    pub admin_key: String,
    /// Overrides `https://{app_id}.algolia.net`.
    pub base_url: Option<String>,
    pub batch_size: usize,
    pub task_poll_interval: Duration,
    pub max_task_polls: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for AlgoliaSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaSettings")
            .field("app_id", &self.app_id)
            .field("admin_key_set", &!self.admin_key.is_empty())
            .field("base_url", &self.base_url)
            .field("batch_size", &self.batch_size)
            .field("task_poll_interval", &self.task_poll_interval)
            .field("max_task_polls", &self.max_task_polls)
            .finish()
    }
}

impl AlgoliaSettings {
    pub fn new(app_id: impl Into<String>, admin_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            admin_key: admin_key.into(),
            base_url: None,
            batch_size: 1000,
            task_poll_interval: Duration::from_millis(500),
            max_task_polls: 120,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.algolia.net", self.app_id))
    }
}

#[derive(Serialize)]
struct OperationRequest<'a> {
    operation: &'static str,
    destination: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'static [&'static str]>,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<BatchOperation<'a>>,
}

#[derive(Serialize)]
struct BatchOperation<'a> {
    action: &'static str,
    body: &'a Record,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    #[serde(rename = "taskID")]
    task_id: i64,
}

#[derive(Debug, Deserialize)]
struct TaskStatus {
    status: String,
}

const COPY_SCOPE: &[&str] = &["settings", "rules", "synonyms"];

pub struct AlgoliaClient {
    http: reqwest::Client,
    settings: AlgoliaSettings,
}

impl AlgoliaClient {
    pub fn new(settings: AlgoliaSettings) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        tracing::info!(
            app_id = %settings.app_id,
            base_url = %settings.base_url(),
            admin_key_set = !settings.admin_key.is_empty(),
            "Initialized AlgoliaClient"
        );
        Ok(Self { http, settings })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let base = self.settings.base_url();
        let mut url = Url::parse(&base)?;
        url.path_segments_mut()
            .map_err(|_| format!("Algolia base URL cannot be a base: {base}"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("x-algolia-application-id", &self.settings.app_id)
            .header("x-algolia-api-key", &self.settings.admin_key)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, what, body = %body, "Algolia API returned an error");
            return Err(format!("Algolia {what} returned {status}: {body}").into());
        }
        Ok(response.json::<T>().await?)
    }

    async fn operation(
        &self,
        index_name: &str,
        operation: OperationRequest<'_>,
    ) -> Result<i64, ClientError> {
        let url = self.url(&["1", "indexes", index_name, "operation"])?;
        let what = format!("{} {index_name}", operation.operation);
        let task: TaskResponse = self
            .send(self.request(reqwest::Method::POST, url).json(&operation), &what)
            .await?;
        Ok(task.task_id)
    }

    async fn add_batches(&self, index_name: &str, records: &[Record]) -> Result<Vec<i64>, ClientError> {
        let url = self.url(&["1", "indexes", index_name, "batch"])?;
        let mut task_ids = Vec::new();
        for chunk in records.chunks(self.settings.batch_size.max(1)) {
            let body = BatchRequest {
                requests: chunk
                    .iter()
                    .map(|record| BatchOperation {
                        action: "addObject",
                        body: record,
                    })
                    .collect(),
            };
            let task: TaskResponse = self
                .send(
                    self.request(reqwest::Method::POST, url.clone()).json(&body),
                    &format!("batch {index_name}"),
                )
                .await?;
            tracing::debug!(index_name, records = chunk.len(), task_id = task.task_id, "Sent batch");
            task_ids.push(task.task_id);
        }
        Ok(task_ids)
    }

    /// Polls the task until Algolia reports it as published.
    pub async fn wait_for_task(&self, index_name: &str, task_id: i64) -> Result<(), ClientError> {
        let task_segment = task_id.to_string();
        let url = self.url(&["1", "indexes", index_name, "task", &task_segment])?;
        for attempt in 1..=self.settings.max_task_polls {
            let status: TaskStatus = self
                .send(
                    self.request(reqwest::Method::GET, url.clone()),
                    &format!("task {task_id} status"),
                )
                .await?;
            if status.status == "published" {
                tracing::debug!(index_name, task_id, attempt, "Task published");
                return Ok(());
            }
            tokio::time::sleep(self.settings.task_poll_interval).await;
        }
        Err(format!(
            "task {task_id} on index {index_name} not published after {} polls",
            self.settings.max_task_polls
        )
        .into())
    }

    async fn delete_index(&self, index_name: &str) -> Result<(), ClientError> {
        let url = self.url(&["1", "indexes", index_name])?;
        let _: serde_json::Value = self
            .send(
                self.request(reqwest::Method::DELETE, url),
                &format!("delete {index_name}"),
            )
            .await?;
        Ok(())
    }

    async fn replace_via(
        &self,
        index_name: &str,
        tmp_index: &str,
        records: &[Record],
    ) -> Result<(), ClientError> {
        let copy_task = self
            .operation(
                index_name,
                OperationRequest {
                    operation: "copy",
                    destination: tmp_index,
                    scope: Some(COPY_SCOPE),
                },
            )
            .await?;
        self.wait_for_task(tmp_index, copy_task).await?;

        for task_id in self.add_batches(tmp_index, records).await? {
            self.wait_for_task(tmp_index, task_id).await?;
        }

        let move_task = self
            .operation(
                tmp_index,
                OperationRequest {
                    operation: "move",
                    destination: index_name,
                    scope: None,
                },
            )
            .await?;
        self.wait_for_task(tmp_index, move_task).await
    }
}

#[async_trait]
impl SearchIndex for AlgoliaClient {
    async fn replace_all_objects(
        &self,
        index_name: &str,
        records: &[Record],
    ) -> Result<(), ClientError> {
        let tmp_index = format!("{index_name}_tmp_{}", Uuid::new_v4().simple());
        tracing::info!(index_name, %tmp_index, records = records.len(), "Replacing all objects via temporary index");

        match self.replace_via(index_name, &tmp_index, records).await {
            Ok(()) => {
                tracing::info!(index_name, records = records.len(), "Replaced all objects");
                Ok(())
            }
            Err(e) => {
                tracing::error!(index_name, %tmp_index, error = %e, "Replace failed, removing temporary index");
                if let Err(cleanup) = self.delete_index(&tmp_index).await {
                    tracing::warn!(%tmp_index, error = %cleanup, "Failed to delete temporary index");
                }
                Err(e)
            }
        }
    }
}
