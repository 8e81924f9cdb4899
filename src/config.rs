// Tingwu API configuration
//
// This module contains configuration structures and constants for the Tingwu API.
// It centralizes all configuration parameters and provides defaults from environment variables.

use std::env;
use std::time::Duration;

/// Default values for configuration
pub mod defaults {
    // Endpoint of the Tingwu offline transcription service
    pub const TINGWU_ENDPOINT: &str = "https://tingwu.cn-beijing.aliyuncs.com";

    // API version path segment used by the service
    pub const TINGWU_API_VERSION: &str = "v2";

    // Default source language for transcription
    pub const LANGUAGE: &str = "cn";

    // Directory where downloaded artifacts and formatted transcripts are stored
    pub const OUTPUT_DIR: &str = "output";

    // Grace period before the first status query (milliseconds)
    pub const POLL_INITIAL_WAIT_MS: u64 = 5_000;

    // Interval between status queries (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 10_000;

    // Maximum time to wait for a task to reach a terminal status (milliseconds)
    pub const POLL_TIMEOUT_MS: u64 = 3_600_000;

    // Record sink application identifier
    pub const SINK_APP_ID: &str = "8";

    // Time budget for one record sink request (seconds)
    pub const SINK_TIMEOUT_SECS: u64 = 10;

    // Object store bucket holding staged media files
    pub const OSS_BUCKET: &str = "tingwu-media-file-provide";

    // Object store endpoint, in the same region as the Tingwu service
    pub const OSS_ENDPOINT: &str = "oss-cn-beijing.aliyuncs.com";
}

/// Configuration for the remote Tingwu service client
#[derive(Clone, Debug)]
pub struct TingwuConfig {
    /// Base endpoint of the Tingwu service
    pub endpoint: String,
    /// AppKey identifying the Tingwu application
    pub app_key: String,
}

impl Default for TingwuConfig {
    fn default() -> Self {
        Self {
            endpoint: env::var("TINGWU_ENDPOINT")
                .unwrap_or_else(|_| String::from(defaults::TINGWU_ENDPOINT)),
            app_key: env::var("TINGWU_APP_KEY").unwrap_or_default(),
        }
    }
}

impl TingwuConfig {
    /// URL of the task collection resource
    pub fn tasks_url(&self) -> String {
        format!(
            "{}/openapi/tingwu/{}/tasks",
            self.endpoint,
            defaults::TINGWU_API_VERSION
        )
    }

    /// URL of a single task resource
    pub fn task_url(&self, task_id: &str) -> String {
        format!("{}/{}", self.tasks_url(), task_id)
    }
}

/// Timing parameters for the status polling loop
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Grace period before the first status query
    pub initial_wait: Duration,
    /// Sleep between consecutive status queries
    pub interval: Duration,
    /// Total budget before the wait gives up
    pub timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            initial_wait: Duration::from_millis(env_u64(
                "TINGWU_POLL_INITIAL_WAIT_MS",
                defaults::POLL_INITIAL_WAIT_MS,
            )),
            interval: Duration::from_millis(env_u64(
                "TINGWU_POLL_INTERVAL_MS",
                defaults::POLL_INTERVAL_MS,
            )),
            timeout: Duration::from_millis(env_u64(
                "TINGWU_POLL_TIMEOUT_MS",
                defaults::POLL_TIMEOUT_MS,
            )),
        }
    }
}

/// Configuration for the external record sink
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Base URL of the record store API (e.g. "https://example.cybozu.com/k/v1")
    pub base_url: String,
    /// API token sent with every sink request
    pub api_token: String,
    /// Application id within the record store
    pub app_id: String,
    /// Time budget for one update request
    pub request_timeout: Duration,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("KINTONE_BASE_URL").unwrap_or_default(),
            api_token: env::var("KINTONE_API_TOKEN").unwrap_or_default(),
            app_id: env::var("KINTONE_APP_ID")
                .unwrap_or_else(|_| String::from(defaults::SINK_APP_ID)),
            request_timeout: Duration::from_secs(env_u64(
                "KINTONE_TIMEOUT_SECS",
                defaults::SINK_TIMEOUT_SECS,
            )),
        }
    }
}

/// Configuration for the object store staging uploaded media
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Bucket holding the staged media files
    pub bucket: String,
    /// Endpoint of the object store service
    pub endpoint: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: env::var("OSS_BUCKET").unwrap_or_else(|_| String::from(defaults::OSS_BUCKET)),
            endpoint: env::var("OSS_ENDPOINT")
                .unwrap_or_else(|_| String::from(defaults::OSS_ENDPOINT)),
        }
    }
}

/// Configuration for the HTTP handlers and background pipeline
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    /// Directory where artifacts and transcripts are written
    pub output_dir: String,
    /// Default source language when the request omits one
    pub default_language: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            output_dir: env::var("TINGWU_OUTPUT_DIR")
                .unwrap_or_else(|_| String::from(defaults::OUTPUT_DIR)),
            default_language: env::var("TINGWU_DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| String::from(defaults::LANGUAGE)),
        }
    }
}

impl HandlerConfig {
    /// Ensures the output directory exists
    pub fn ensure_output_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
