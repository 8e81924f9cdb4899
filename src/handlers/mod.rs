// Tingwu API HTTP handlers
//
// This module contains the HTTP handlers for the Tingwu API.
// It provides the interface between inbound requests and the background pipeline.

pub mod authentication;
pub mod routes;

// Re-export handlers for easier access
pub use self::routes::{process_transcription, task_status, transcription_options};
// Re-export authentication middleware
pub use self::authentication::Authentication;
