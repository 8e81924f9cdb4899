// Object store for Tingwu API
//
// This module stages local media files in an OSS-style bucket so the remote
// transcription service can fetch them. A staged object has two URLs: the
// plain bucket URL recorded with the results, and a time-limited URL handed
// to the remote service. The store is behind a trait so the orchestrator can
// run against a recording stub in tests.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::info;

use crate::config::StoreConfig;
use crate::error::PipelineError;

/// Stages media files for the remote service
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file under `object_name` and return its public URL
    async fn put(&self, local_path: &Path, object_name: &str) -> Result<String, PipelineError>;

    /// Return a URL for an already stored object, valid for `ttl`
    async fn sign_url(&self, object_name: &str, ttl: Duration) -> Result<String, PipelineError>;
}

/// HTTP implementation against an OSS bucket
///
/// Access control lives on the bucket side; requests carry no credentials,
/// only the expiry deadline of the generated URL.
pub struct OssStore {
    http: reqwest::Client,
    config: StoreConfig,
}

impl OssStore {
    pub fn new(http: reqwest::Client, config: StoreConfig) -> Self {
        Self { http, config }
    }

    fn object_url(&self, object_name: &str) -> String {
        format!(
            "https://{}.{}/{}",
            self.config.bucket, self.config.endpoint, object_name
        )
    }
}

#[async_trait]
impl ObjectStore for OssStore {
    async fn put(&self, local_path: &Path, object_name: &str) -> Result<String, PipelineError> {
        let bytes = tokio::fs::read(local_path).await?;
        let url = self.object_url(object_name);
        info!(
            "Uploading {} ({} bytes) to {}",
            local_path.display(),
            bytes.len(),
            url
        );

        let response = self.http.put(&url).body(bytes).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Store(format!(
                "bucket returned {} for {}: {}",
                status, object_name, text
            )));
        }

        Ok(url)
    }

    async fn sign_url(&self, object_name: &str, ttl: Duration) -> Result<String, PipelineError> {
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        Ok(format!("{}?Expires={}", self.object_url(object_name), expires))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> OssStore {
        OssStore::new(
            reqwest::Client::new(),
            StoreConfig {
                bucket: "media-bucket".to_string(),
                endpoint: "oss.example.com".to_string(),
            },
        )
    }

    #[test]
    fn test_object_url_joins_bucket_and_endpoint() {
        let store = test_store();
        assert_eq!(
            store.object_url("tingwu/42/m.mp3"),
            "https://media-bucket.oss.example.com/tingwu/42/m.mp3"
        );
    }

    #[tokio::test]
    async fn test_sign_url_carries_future_deadline() {
        let store = test_store();
        let url = store
            .sign_url("tingwu/42/m.mp3", Duration::from_secs(3600))
            .await
            .unwrap();

        let (base, query) = url.split_once('?').unwrap();
        assert_eq!(base, "https://media-bucket.oss.example.com/tingwu/42/m.mp3");
        let expires: i64 = query.strip_prefix("Expires=").unwrap().parse().unwrap();
        assert!(expires > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn test_put_missing_file_is_an_io_error() {
        let store = test_store();
        let err = store
            .put(Path::new("/nonexistent/m.mp3"), "tingwu/42/m.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
