// Tingwu API Library
//
// This crate provides an HTTP API that relays transcription jobs to the
// Tingwu offline speech service. Accepted requests are processed in the
// background: submit, poll to completion, download the result artifacts,
// reconstruct a speaker-attributed transcript, and update an external record.

pub mod artifacts;
pub mod client;
pub mod config;
pub mod config_loader;
pub mod download;
pub mod error;
pub mod file_utils;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod poller;
pub mod sink;
pub mod store;
pub mod transcript;

// Re-export common types for easier access
pub use client::{StatusQuerier, Submitter, TingwuClient};
pub use config::{HandlerConfig, PollerConfig, SinkConfig, StoreConfig, TingwuConfig};
pub use error::{HandlerError, PipelineError};
pub use guard::ExecutionGuard;
pub use handlers::{process_transcription, task_status, transcription_options};
pub use orchestrator::Orchestrator;
pub use store::{ObjectStore, OssStore};
pub use poller::{wait_for_completion, TerminalStatus};
pub use transcript::{reconstruct, SpeakerTurn};
