//! Service configuration read from the environment.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use item_search_pipeline::SyncOptions;
use item_search_repository::meilisearch::INDEX_NAME;
use item_search_repository::config::DEFAULT_ENGINE_URL;

use crate::ServiceError;

/// Default path of the item source file.
const DEFAULT_DATA_FILE: &str = "items.csv";

/// Default HTTP listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Default delay between task polls, in milliseconds.
const DEFAULT_TASK_POLL_INTERVAL_MS: u64 = 500;

/// Default maximum wait for a single task, in milliseconds.
const DEFAULT_TASK_MAX_WAIT_MS: u64 = 30_000;

/// Immutable service configuration, built once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub engine_url: String,
    pub api_key: Option<String>,
    pub index_name: String,
    pub data_file: PathBuf,
    pub bind_addr: SocketAddr,
    pub sync_on_startup: bool,
    pub sync_options: SyncOptions,
    /// Extra attempts for transient engine failures. `0` disables retries.
    pub max_retries: u32,
    /// JSON settings document replacing the built-in catalog settings.
    pub settings_file: Option<PathBuf>,
}

impl AppConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MEILISEARCH_URL`: engine URL (default: http://localhost:7700)
    /// - `MEILISEARCH_API_KEY`: bearer key (default: none)
    /// - `INDEX_NAME`: index to manage (default: items)
    /// - `DATA_FILE`: item source file (default: items.csv)
    /// - `BIND_ADDR`: HTTP listen address (default: 0.0.0.0:5000)
    /// - `SYNC_ON_STARTUP`: resync before serving (default: true)
    /// - `AWAIT_TASKS`: wait for each sync task (default: false)
    /// - `TASK_POLL_INTERVAL_MS`: task poll delay (default: 500)
    /// - `TASK_MAX_WAIT_MS`: maximum wait per task (default: 30000)
    /// - `ENGINE_MAX_RETRIES`: retries for transient failures (default: 0)
    /// - `INDEX_SETTINGS_FILE`: settings JSON (default: built-in settings)
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let poll_interval_ms =
            parse_or(&var, "TASK_POLL_INTERVAL_MS", DEFAULT_TASK_POLL_INTERVAL_MS)?;
        let max_wait_ms = parse_or(&var, "TASK_MAX_WAIT_MS", DEFAULT_TASK_MAX_WAIT_MS)?;

        Ok(Self {
            engine_url: var("MEILISEARCH_URL").unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string()),
            api_key: var("MEILISEARCH_API_KEY"),
            index_name: var("INDEX_NAME").unwrap_or_else(|| INDEX_NAME.to_string()),
            data_file: var("DATA_FILE")
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
                .into(),
            bind_addr: parse_or(
                &var,
                "BIND_ADDR",
                SocketAddr::from_str(DEFAULT_BIND_ADDR)
                    .map_err(|e| ServiceError::config(e.to_string()))?,
            )?,
            sync_on_startup: parse_flag(&var, "SYNC_ON_STARTUP", true)?,
            sync_options: SyncOptions {
                await_tasks: parse_flag(&var, "AWAIT_TASKS", false)?,
                poll_interval: Duration::from_millis(poll_interval_ms),
                max_wait: Duration::from_millis(max_wait_ms),
            },
            max_retries: parse_or(&var, "ENGINE_MAX_RETRIES", 0)?,
            settings_file: var("INDEX_SETTINGS_FILE").map(PathBuf::from),
        })
    }
}

// The key must never end up in logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("engine_url", &self.engine_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("index_name", &self.index_name)
            .field("data_file", &self.data_file)
            .field("bind_addr", &self.bind_addr)
            .field("sync_on_startup", &self.sync_on_startup)
            .field("sync_options", &self.sync_options)
            .field("max_retries", &self.max_retries)
            .field("settings_file", &self.settings_file)
            .finish()
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServiceError::config(format!("Invalid {key} `{raw}`: {e}"))),
        None => Ok(default),
    }
}

fn parse_flag<F>(var: &F, key: &str, default: bool) -> Result<bool, ServiceError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ServiceError::config(format!(
            "Invalid {key} `{raw}`: expected true or false"
        ))),
    }
}
