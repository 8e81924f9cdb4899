// Tingwu API data models
//
// This module contains the data models used for the Tingwu API.
// It includes request and response types used across the API.

use serde::{Deserialize, Serialize};

use crate::error::HandlerError;

/// Optional capabilities of the remote transcription service.
///
/// Each flag maps to a feature-conditional block in the submission body;
/// a disabled feature is omitted from the payload entirely.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    /// Speaker diarization, with an expected speaker count (0 = unknown)
    pub diarization: bool,
    pub speaker_count: u32,
    /// Translation into the request's target languages
    pub translation: bool,
    /// Chapter detection
    pub chapters: bool,
    /// Meeting assistance (actions and key information)
    pub meeting_assistance: bool,
    /// Summarization (paragraph, conversational, Q&A, mind map)
    pub summarization: bool,
    /// PPT extraction
    pub ppt_extraction: bool,
    /// Spoken-to-written text polishing
    pub text_polish: bool,
}

/// Inbound transcription request
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionRequest {
    /// Identifier of the external record to update with the results
    pub record_id: String,
    /// URL of the media file, reachable by the remote service
    #[serde(default)]
    pub file_url: String,
    /// Local path of a media file to stage in the object store instead
    #[serde(default)]
    pub media_path: Option<String>,
    /// Source language of the media; falls back to the configured default
    #[serde(default)]
    pub language: Option<String>,
    /// Expected speaker count for diarization (None disables diarization)
    #[serde(default)]
    pub speakers: Option<u32>,
    /// Enable translation into `target_languages`
    #[serde(default)]
    pub translate: bool,
    /// Target languages for translation, in preference order
    #[serde(default)]
    pub target_languages: Vec<String>,
    /// Enable chapter detection
    #[serde(default)]
    pub chapters: bool,
    /// Enable meeting assistance
    #[serde(default)]
    pub meeting: bool,
    /// Enable summarization
    #[serde(default)]
    pub summary: bool,
    /// Enable PPT extraction
    #[serde(default)]
    pub ppt: bool,
    /// Enable spoken-to-written polishing
    #[serde(default)]
    pub polish: bool,
}

impl TranscriptionRequest {
    /// Validate the request before any background work is scheduled
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.record_id.trim().is_empty() {
            return Err(HandlerError::invalid_request("record_id must not be empty"));
        }
        if self.file_url.trim().is_empty() && self.media_path.is_none() {
            return Err(HandlerError::invalid_request(
                "either file_url or media_path is required",
            ));
        }
        if self.translate && self.target_languages.is_empty() {
            return Err(HandlerError::invalid_request(
                "translation requested but target_languages is empty",
            ));
        }
        Ok(())
    }

    /// Collect the request's booleans into the feature-flag set
    pub fn feature_flags(&self) -> FeatureFlags {
        FeatureFlags {
            diarization: self.speakers.is_some(),
            speaker_count: self.speakers.unwrap_or(0),
            translation: self.translate,
            chapters: self.chapters,
            meeting_assistance: self.meeting,
            summarization: self.summary,
            ppt_extraction: self.ppt,
            text_polish: self.polish,
        }
    }
}

/// Response for an accepted transcription request
#[derive(Serialize)]
pub struct AcceptedResponse {
    /// Message confirming background processing has started
    pub message: String,
    /// Record the results will be written to
    pub record_id: String,
}

/// Error response for API
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional status information
    pub status: Option<String>,
}

/// Status response for remote task status queries
#[derive(Serialize)]
pub struct TaskStatusView {
    /// Task identifier
    pub task_id: String,
    /// Raw status string reported by the remote service
    pub status: String,
}
