// Error handling for Tingwu API
//
// This module defines error types and handling for the Tingwu API.
// It centralizes error definitions and provides helpful conversion traits.

use std::io;
use thiserror::Error;

use actix_web::{HttpResponse, ResponseError};

use crate::models::ErrorResponse;

/// Errors that can occur while a transcription pipeline runs
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The remote service rejected the submission or returned no task id
    #[error("Submission failed: {0}")]
    Submission(String),

    /// The polling budget was exhausted while the task was still non-terminal
    #[error("Timed out after {0}ms waiting for task completion")]
    Timeout(u128),

    /// The remote task reached the Failed status
    #[error("Remote task failed: {0}")]
    RemoteJob(String),

    /// The remote task was cancelled
    #[error("Remote task was cancelled")]
    Cancelled,

    /// The inbound request was structurally invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP transport error talking to the remote service
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// I/O error while writing artifacts or transcripts
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The object store refused a media upload
    #[error("Object store error: {0}")]
    Store(String),

    /// The record sink refused the update
    #[error("Record sink update failed: {0}")]
    Sink(String),
}

/// Errors returned to HTTP clients by the API handlers
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Error when the request body fails validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error when querying the remote service on behalf of the client
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl HandlerError {
    /// Create a new InvalidRequest error
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl ResponseError for HandlerError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: self.to_string(),
            status: None,
        };

        match self {
            HandlerError::InvalidRequest(_) => HttpResponse::BadRequest().json(error_response),
            HandlerError::Upstream(_) => HttpResponse::BadGateway().json(error_response),
        }
    }
}

/// Convert PipelineError to HandlerError for the synchronous endpoints
impl From<PipelineError> for HandlerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidRequest(msg) => HandlerError::InvalidRequest(msg),
            other => HandlerError::Upstream(other.to_string()),
        }
    }
}
