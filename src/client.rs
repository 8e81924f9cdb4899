// Tingwu service client
//
// This module contains the HTTP client for the remote Tingwu transcription service.
// It covers task submission (with a feature-conditional request body) and status
// queries. The two capabilities are exposed as separate traits so the polling
// loop and the orchestrator can be exercised against mock implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::TingwuConfig;
use crate::error::PipelineError;
use crate::models::FeatureFlags;

/// Parameters for one task submission
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// URL of the media file, reachable by the remote service
    pub file_url: String,
    /// Source language of the media
    pub source_language: String,
    /// Optional capabilities to enable
    pub flags: FeatureFlags,
    /// Target languages for translation, in preference order
    pub target_languages: Vec<String>,
}

/// Payload of a task reported by the remote service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskData {
    /// Remote task identifier
    pub task_id: String,
    /// Raw status string ("ONGOING", "COMPLETED", "FAILED", "CANCELLED" or empty)
    pub task_status: String,
    /// Artifact set: artifact name to download URL, present once completed
    pub result: HashMap<String, String>,
}

/// Envelope of every Tingwu response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskResponse {
    pub request_id: String,
    pub message: String,
    pub data: Option<TaskData>,
}

/// Submits new transcription tasks to the remote service
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit a task and return the remote task id
    async fn submit(&self, request: &SubmitRequest) -> Result<String, PipelineError>;
}

/// Queries the status of previously submitted tasks
#[async_trait]
pub trait StatusQuerier: Send + Sync {
    /// Query the current status of a task
    async fn get_status(&self, task_id: &str) -> Result<TaskResponse, PipelineError>;
}

/// HTTP client for the Tingwu offline transcription service
pub struct TingwuClient {
    http: reqwest::Client,
    config: TingwuConfig,
}

impl TingwuClient {
    pub fn new(http: reqwest::Client, config: TingwuConfig) -> Self {
        Self { http, config }
    }
}

/// Build the feature-conditional submission body
///
/// Disabled capabilities are omitted from `Parameters` entirely; the remote
/// contract treats omission, not a false value, as "disabled". The task key
/// embeds the creation timestamp for traceability only.
pub fn build_task_body(app_key: &str, request: &SubmitRequest) -> Value {
    let mut parameters = serde_json::Map::new();
    let flags = &request.flags;

    if flags.diarization {
        parameters.insert(
            "Transcription".to_string(),
            json!({
                "DiarizationEnabled": true,
                "Diarization": { "SpeakerCount": flags.speaker_count },
            }),
        );
    }

    if flags.translation && !request.target_languages.is_empty() {
        parameters.insert("TranslationEnabled".to_string(), json!(true));
        parameters.insert(
            "Translation".to_string(),
            json!({ "TargetLanguages": request.target_languages }),
        );
    }

    if flags.chapters {
        parameters.insert("AutoChaptersEnabled".to_string(), json!(true));
    }

    if flags.meeting_assistance {
        parameters.insert("MeetingAssistanceEnabled".to_string(), json!(true));
        parameters.insert(
            "MeetingAssistance".to_string(),
            json!({ "Types": ["Actions", "KeyInformation"] }),
        );
    }

    if flags.summarization {
        parameters.insert("SummarizationEnabled".to_string(), json!(true));
        parameters.insert(
            "Summarization".to_string(),
            json!({
                "Types": ["Paragraph", "Conversational", "QuestionsAnswering", "MindMap"],
            }),
        );
    }

    if flags.ppt_extraction {
        parameters.insert("PptExtractionEnabled".to_string(), json!(true));
    }

    if flags.text_polish {
        parameters.insert("TextPolishEnabled".to_string(), json!(true));
    }

    json!({
        "AppKey": app_key,
        "Input": {
            "FileUrl": request.file_url,
            "SourceLanguage": request.source_language,
            "TaskKey": format!("task{}", Utc::now().format("%Y%m%d%H%M%S")),
        },
        "Parameters": Value::Object(parameters),
    })
}

#[async_trait]
impl Submitter for TingwuClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<String, PipelineError> {
        if request.file_url.trim().is_empty() {
            return Err(PipelineError::InvalidRequest(
                "file_url must not be empty".to_string(),
            ));
        }
        if request.flags.translation && request.target_languages.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "translation requested but no target languages given".to_string(),
            ));
        }

        let body = build_task_body(&self.config.app_key, request);
        debug!("Submitting task for {}", request.file_url);

        let response = self
            .http
            .put(self.config.tasks_url())
            .query(&[("type", "offline")])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PipelineError::Submission(format!(
                "service returned {}: {}",
                status, text
            )));
        }

        let envelope: TaskResponse = response.json().await?;
        let task_id = envelope
            .data
            .map(|data| data.task_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                PipelineError::Submission(format!(
                    "no task id in response: {}",
                    envelope.message
                ))
            })?;

        info!("Task {} created", task_id);
        Ok(task_id)
    }
}

#[async_trait]
impl StatusQuerier for TingwuClient {
    async fn get_status(&self, task_id: &str) -> Result<TaskResponse, PipelineError> {
        let response = self
            .http
            .get(self.config.task_url(task_id))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> SubmitRequest {
        SubmitRequest {
            file_url: "https://media.example.com/meeting.mp3".to_string(),
            source_language: "cn".to_string(),
            flags: FeatureFlags::default(),
            target_languages: Vec::new(),
        }
    }

    #[test]
    fn test_body_omits_disabled_features() {
        let body = build_task_body("app-key", &base_request());

        assert_eq!(body["AppKey"], "app-key");
        assert_eq!(body["Input"]["FileUrl"], "https://media.example.com/meeting.mp3");
        assert_eq!(body["Input"]["SourceLanguage"], "cn");

        // A disabled feature must be absent, not false
        let parameters = body["Parameters"].as_object().unwrap();
        assert!(parameters.is_empty());
    }

    #[test]
    fn test_body_includes_enabled_features() {
        let mut request = base_request();
        request.flags.diarization = true;
        request.flags.speaker_count = 2;
        request.flags.chapters = true;
        request.flags.summarization = true;
        request.flags.meeting_assistance = true;
        request.flags.ppt_extraction = true;
        request.flags.text_polish = true;

        let body = build_task_body("app-key", &request);
        let parameters = body["Parameters"].as_object().unwrap();

        assert_eq!(
            parameters["Transcription"]["Diarization"]["SpeakerCount"],
            2
        );
        assert_eq!(parameters["AutoChaptersEnabled"], true);
        assert_eq!(parameters["MeetingAssistanceEnabled"], true);
        assert_eq!(
            parameters["MeetingAssistance"]["Types"],
            json!(["Actions", "KeyInformation"])
        );
        assert_eq!(parameters["SummarizationEnabled"], true);
        assert_eq!(parameters["PptExtractionEnabled"], true);
        assert_eq!(parameters["TextPolishEnabled"], true);
    }

    #[test]
    fn test_body_translation_requires_targets() {
        let mut request = base_request();
        request.flags.translation = true;
        request.target_languages = vec!["en".to_string(), "ja".to_string()];

        let body = build_task_body("app-key", &request);
        let parameters = body["Parameters"].as_object().unwrap();

        assert_eq!(parameters["TranslationEnabled"], true);
        assert_eq!(
            parameters["Translation"]["TargetLanguages"],
            json!(["en", "ja"])
        );
    }

    #[test]
    fn test_task_key_embeds_timestamp() {
        let body = build_task_body("app-key", &base_request());
        let task_key = body["Input"]["TaskKey"].as_str().unwrap();
        assert!(task_key.starts_with("task"));
        assert_eq!(task_key.len(), "task".len() + 14);
    }

    #[test]
    fn test_status_envelope_deserializes() {
        let raw = r#"{
            "RequestId": "req-1",
            "Message": "success",
            "Data": {
                "TaskId": "task-42",
                "TaskStatus": "COMPLETED",
                "Result": { "Transcription": "https://store.example.com/t.json?sig=x" }
            }
        }"#;

        let envelope: TaskResponse = serde_json::from_str(raw).unwrap();
        let data = envelope.data.unwrap();
        assert_eq!(data.task_id, "task-42");
        assert_eq!(data.task_status, "COMPLETED");
        assert_eq!(data.result.len(), 1);
    }

    #[test]
    fn test_status_envelope_tolerates_missing_fields() {
        let envelope: TaskResponse = serde_json::from_str(r#"{"RequestId": "req-2"}"#).unwrap();
        assert!(envelope.data.is_none());

        let envelope: TaskResponse =
            serde_json::from_str(r#"{"Data": {"TaskId": "task-1"}}"#).unwrap();
        assert_eq!(envelope.data.unwrap().task_status, "");
    }
}
