// External record sink for Tingwu API
//
// This module pushes the assembled result fields to the external record
// store (a Kintone-style system). Fields are plain text blocks keyed by
// field name; the sink is behind a trait so the orchestrator can run
// against a recording stub in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use log::info;
use serde_json::json;

use crate::config::SinkConfig;
use crate::error::PipelineError;

/// Field names understood by the record store
pub mod fields {
    pub const TRANSCRIPTION: &str = "formatted_transcription";
    pub const CHAPTERS: &str = "auto_chapters";
    pub const SUMMARIZATION: &str = "summarization";
    pub const MEETING_ASSISTANCE: &str = "meeting_assistance";
    pub const SOURCE_URL: &str = "source_url";
}

/// Receives the final result of one transcription job
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write the given text fields onto the identified record
    async fn update(
        &self,
        record_id: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), PipelineError>;
}

/// HTTP implementation against a Kintone record API
pub struct KintoneSink {
    http: reqwest::Client,
    config: SinkConfig,
}

impl KintoneSink {
    pub fn new(http: reqwest::Client, config: SinkConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl RecordSink for KintoneSink {
    async fn update(
        &self,
        record_id: &str,
        fields: HashMap<String, String>,
    ) -> Result<(), PipelineError> {
        let record: serde_json::Map<String, serde_json::Value> = fields
            .into_iter()
            .map(|(name, value)| (name, json!({ "value": value })))
            .collect();

        let payload = json!({
            "app": self.config.app_id,
            "id": record_id,
            "record": record,
        });

        // Bounded so a hung record store cannot pin a background unit
        let response = self
            .http
            .put(format!("{}/record.json", self.config.base_url))
            .timeout(self.config.request_timeout)
            .header("X-Cybozu-API-Token", &self.config.api_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Sink(format!(
                "record store returned {}: {}",
                status, text
            )));
        }

        info!("Record {} updated", record_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    // Record store stub that accepts the connection and never answers.
    async fn spawn_stalled_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_unresponsive_record_store_times_out() {
        let base_url = spawn_stalled_server().await;
        let sink = KintoneSink::new(
            reqwest::Client::new(),
            SinkConfig {
                base_url,
                api_token: "token".to_string(),
                app_id: "8".to_string(),
                request_timeout: Duration::from_millis(100),
            },
        );

        let mut fields = HashMap::new();
        fields.insert("source_url".to_string(), "https://x.example.com".to_string());

        let err = sink.update("42", fields).await.unwrap_err();
        match err {
            PipelineError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected a transport timeout, got {}", other),
        }
    }
}
