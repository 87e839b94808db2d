/// `load_config` module: merges an optional static YAML file with environment variables into a [`CliConfig`].
///
/// This module is the only place where environment variables and untrusted YAML are read.
/// The pipeline itself never looks at the environment; it receives the [`SyncConfig`] built here.
///
/// # Sources, in increasing precedence
/// 1. Built-in defaults
/// 2. The YAML file passed with `--config` (non-secret settings only)
/// 3. Environment variables (a `.env` file in the working directory is loaded first)
///
/// # Environment
/// - `WEBFLOW_API_TOKEN` (required): bearer token for the content store
/// - `WEBFLOW_SITE_ID` (required unless set in the file): site to synchronise
/// - `ALGOLIA_APP_ID`, `ALGOLIA_ADMIN_KEY` (required): search index credentials
/// - `STATUS_FIELD`: optional status field name, blank disables the filter
/// - `COLLECTIONS_TO_SYNC`: comma-separated slugs/display names, blank means all
/// - `SYNC_CONCURRENCY`: collections processed at once (default 1)
///
/// # Errors
/// All errors use `anyhow::Error` for context-rich diagnostics, surfaced at the CLI boundary.
use anyhow::{bail, Context, Result};
use cms_index_sync_core::config::SyncConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

use crate::algolia::AlgoliaSettings;
use crate::webflow::{WebflowSettings, DEFAULT_WEBFLOW_API};

pub const DEFAULT_BIND: &str = "0.0.0.0:8787";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sync: SyncSection,
    pub webflow: WebflowSection,
    pub algolia: AlgoliaSection,
    pub server: ServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSection {
    pub site_id: Option<String>,
    pub status_field: Option<String>,
    pub collections: Vec<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebflowSection {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlgoliaSection {
    pub base_url: Option<String>,
    pub batch_size: Option<usize>,
    pub task_poll_interval_ms: Option<u64>,
    pub max_task_polls: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub every_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub bind: String,
    /// Scheduled run interval; `None` disables the schedule.
    pub every: Option<Duration>,
}

/// Fully merged configuration for the CLI and the server.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub sync: SyncConfig,
    pub webflow: WebflowSettings,
    pub algolia: AlgoliaSettings,
    pub server: ServerSettings,
}

/// Non-empty value of an environment variable.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required_env(name: &str) -> Result<String> {
    match env_var(name) {
        Some(value) => {
            info!(var = name, "Found required environment variable");
            Ok(value)
        }
        None => {
            error!(var = name, "Required environment variable not set");
            bail!("{name} environment variable not set")
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_collection_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read and parse the static YAML file.
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path, e));
        }
    };

    match serde_yaml::from_str::<Option<FileConfig>>(&content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf.unwrap_or_default())
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Loads the optional YAML file, applies environment overrides and checks required settings.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    dotenvy::dotenv().ok();

    let file = match path {
        Some(path) => read_file_config(path)?,
        None => FileConfig::default(),
    };

    let site_id = env_var("WEBFLOW_SITE_ID")
        .or(file.sync.site_id)
        .filter(|s| !s.trim().is_empty());
    let Some(site_id) = site_id else {
        error!("No site id configured");
        bail!("WEBFLOW_SITE_ID environment variable not set and no sync.site_id in config file");
    };

    let status_field_name = env_var("STATUS_FIELD")
        .or(file.sync.status_field)
        .unwrap_or_default();

    let collections_to_sync = match env_var("COLLECTIONS_TO_SYNC") {
        Some(raw) => parse_collection_list(&raw),
        None => file.sync.collections,
    };

    let concurrency = match env_var("SYNC_CONCURRENCY") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("SYNC_CONCURRENCY must be a positive integer, got {raw:?}"))?,
        None => file.sync.concurrency.unwrap_or(1),
    };
    if concurrency == 0 {
        bail!("sync concurrency must be at least 1");
    }

    let sync = SyncConfig {
        site_id,
        status_field_name,
        collections_to_sync,
        concurrency,
    };

    let mut webflow = WebflowSettings::new(required_env("WEBFLOW_API_TOKEN")?);
    webflow.base_url = file
        .webflow
        .base_url
        .unwrap_or_else(|| DEFAULT_WEBFLOW_API.to_string());
    if let Some(secs) = file.webflow.timeout_secs {
        webflow.timeout = Duration::from_secs(secs);
    }

    let mut algolia = AlgoliaSettings::new(
        required_env("ALGOLIA_APP_ID")?,
        required_env("ALGOLIA_ADMIN_KEY")?,
    );
    algolia.base_url = file.algolia.base_url;
    if let Some(batch_size) = file.algolia.batch_size {
        algolia.batch_size = batch_size.max(1);
    }
    if let Some(ms) = file.algolia.task_poll_interval_ms {
        algolia.task_poll_interval = Duration::from_millis(ms);
    }
    if let Some(polls) = file.algolia.max_task_polls {
        algolia.max_task_polls = polls;
    }
    if let Some(secs) = file.algolia.timeout_secs {
        algolia.timeout = Duration::from_secs(secs);
    }

    let server = ServerSettings {
        bind: file.server.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
        every: file
            .server
            .every_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
    };

    sync.trace_loaded();
    info!(
        webflow = ?webflow,
        algolia = ?algolia,
        bind = %server.bind,
        every = ?server.every,
        "Config loaded and merged successfully"
    );

    Ok(CliConfig {
        sync,
        webflow,
        algolia,
        server,
    })
}
