// Background orchestration for Tingwu API
//
// This module composes the pipeline that runs behind every accepted request:
// submit the remote task, wait for a terminal status, pass the execution
// guard, download the result artifacts, reconstruct the transcript, and push
// the assembled text fields to the record sink. Each request gets its own
// spawned unit of work; failures are logged with their job context and never
// reach the HTTP caller, who already received an acknowledgment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use crate::artifacts::{
    render_chapters, render_meeting_assistance, render_summarization, AutoChaptersDocument,
    MeetingAssistanceDocument, SummarizationDocument,
};
use crate::client::{StatusQuerier, SubmitRequest, Submitter};
use crate::config::{HandlerConfig, PollerConfig};
use crate::download::download_all;
use crate::error::PipelineError;
use crate::file_utils::{save_text, task_output_dir};
use crate::guard::ExecutionGuard;
use crate::models::TranscriptionRequest;
use crate::poller::{wait_for_completion, TerminalStatus};
use crate::sink::{fields, RecordSink};
use crate::store::ObjectStore;
use crate::transcript::{reconstruct, render_sink_field, render_transcript, TranscriptionDocument};

// Artifact names assigned by the remote service
const ARTIFACT_TRANSCRIPTION: &str = "Transcription";
const ARTIFACT_CHAPTERS: &str = "AutoChapters";
const ARTIFACT_SUMMARIZATION: &str = "Summarization";
const ARTIFACT_MEETING_ASSISTANCE: &str = "MeetingAssistance";

// Validity of the staged-media URL handed to the remote service
const SIGNED_URL_TTL: Duration = Duration::from_secs(3600);

/// Composes the full job pipeline behind the HTTP surface
pub struct Orchestrator<C> {
    client: Arc<C>,
    guard: ExecutionGuard,
    sink: Arc<dyn RecordSink>,
    store: Arc<dyn ObjectStore>,
    poller: PollerConfig,
    http: reqwest::Client,
    config: HandlerConfig,
}

impl<C> Orchestrator<C>
where
    C: Submitter + StatusQuerier + 'static,
{
    pub fn new(
        client: Arc<C>,
        sink: Arc<dyn RecordSink>,
        store: Arc<dyn ObjectStore>,
        poller: PollerConfig,
        http: reqwest::Client,
        config: HandlerConfig,
    ) -> Self {
        Self {
            client,
            guard: ExecutionGuard::new(),
            sink,
            store,
            poller,
            http,
            config,
        }
    }

    /// Fire-and-forget entry point: schedules the pipeline and returns immediately
    pub fn spawn(self: Arc<Self>, request: TranscriptionRequest) {
        let record_id = request.record_id.clone();

        tokio::spawn(async move {
            info!("Record {}: background task started", record_id);
            if let Err(e) = self.run(request).await {
                // Terminal for this job only; the caller was already acknowledged
                error!("Record {}: background task failed: {}", record_id, e);
            }
        });
    }

    /// Run the pipeline for one request
    pub async fn run(&self, request: TranscriptionRequest) -> Result<(), PipelineError> {
        let record_id = &request.record_id;

        // A local media file is staged in the object store first; its public
        // URL goes onto the record, the time-limited one to the service.
        let (source_url, submit_url) = match &request.media_path {
            Some(path) => {
                let local = Path::new(path);
                let file_name = local.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
                    PipelineError::InvalidRequest(format!("media_path has no file name: {}", path))
                })?;
                let object_name = format!("tingwu/{}/{}", record_id, file_name);

                info!("Record {}: uploading media as {}", record_id, object_name);
                let public_url = self.store.put(local, &object_name).await?;
                let signed_url = self.store.sign_url(&object_name, SIGNED_URL_TTL).await?;
                (public_url, signed_url)
            }
            None => (request.file_url.clone(), request.file_url.clone()),
        };

        let submit_request = SubmitRequest {
            file_url: submit_url,
            source_language: request
                .language
                .clone()
                .unwrap_or_else(|| self.config.default_language.clone()),
            flags: request.feature_flags(),
            target_languages: request.target_languages.clone(),
        };

        info!("Record {}: submitting transcription task", record_id);
        let task_id = self.client.submit(&submit_request).await?;

        info!("Record {}: waiting for task {}", record_id, task_id);
        let data = match wait_for_completion(self.client.as_ref(), &task_id, &self.poller).await? {
            TerminalStatus::Completed(data) => data,
            TerminalStatus::Failed(message) => return Err(PipelineError::RemoteJob(message)),
            TerminalStatus::Cancelled => return Err(PipelineError::Cancelled),
            TerminalStatus::TimedOut => {
                return Err(PipelineError::Timeout(self.poller.timeout.as_millis()))
            }
        };

        if !self.guard.try_acquire(&task_id).await {
            info!("Task {}: already processed, skipping", task_id);
            return Ok(());
        }

        info!(
            "Task {}: downloading {} artifact(s)",
            task_id,
            data.result.len()
        );
        let task_dir = task_output_dir(&self.config.output_dir, &task_id)?;
        let downloaded = download_all(&self.http, &data.result, &task_dir).await?;

        let result_fields = assemble_fields(&source_url, &task_id, &downloaded, &task_dir)?;

        info!("Task {}: updating record {}", task_id, record_id);
        self.sink.update(record_id, result_fields).await?;

        info!("Task {}: background task completed", task_id);
        Ok(())
    }
}

/// Assemble the plain-text field blocks for the record sink
///
/// Every artifact is optional: a missing Transcription artifact skips
/// reconstruction (a valid empty-feature outcome, not an error), and the
/// other blocks are only present when their artifact was retrieved and
/// parses. The reconstructed transcript is also persisted next to the raw
/// artifacts.
pub fn assemble_fields(
    source_url: &str,
    task_id: &str,
    downloaded: &HashMap<String, PathBuf>,
    task_dir: &Path,
) -> Result<HashMap<String, String>, PipelineError> {
    let mut result_fields = HashMap::new();
    result_fields.insert(fields::SOURCE_URL.to_string(), source_url.to_string());

    if let Some(path) = downloaded.get(ARTIFACT_TRANSCRIPTION) {
        let raw = std::fs::read_to_string(path)?;
        let document: TranscriptionDocument = serde_json::from_str(&raw)?;
        let paragraphs = document
            .transcription
            .map(|section| section.paragraphs)
            .unwrap_or_default();
        let turns = reconstruct(&paragraphs);

        let transcript_path = task_dir.join(format!("task_{}_formatted.txt", task_id));
        save_text(&render_transcript(&turns), &transcript_path)?;
        info!(
            "Task {}: formatted transcript saved to {}",
            task_id,
            transcript_path.display()
        );

        result_fields.insert(fields::TRANSCRIPTION.to_string(), render_sink_field(&turns));
    } else {
        info!(
            "Task {}: no Transcription artifact retrieved, skipping reconstruction",
            task_id
        );
    }

    if let Some(path) = downloaded.get(ARTIFACT_CHAPTERS) {
        match parse_document::<AutoChaptersDocument>(path) {
            Ok(document) => {
                result_fields.insert(
                    fields::CHAPTERS.to_string(),
                    render_chapters(&document.auto_chapters),
                );
            }
            Err(e) => warn!("Task {}: unreadable AutoChapters artifact: {}", task_id, e),
        }
    }

    if let Some(path) = downloaded.get(ARTIFACT_SUMMARIZATION) {
        match parse_document::<SummarizationDocument>(path) {
            Ok(document) => {
                result_fields.insert(
                    fields::SUMMARIZATION.to_string(),
                    render_summarization(&document.summarization),
                );
            }
            Err(e) => warn!("Task {}: unreadable Summarization artifact: {}", task_id, e),
        }
    }

    if let Some(path) = downloaded.get(ARTIFACT_MEETING_ASSISTANCE) {
        match parse_document::<MeetingAssistanceDocument>(path) {
            Ok(document) => {
                result_fields.insert(
                    fields::MEETING_ASSISTANCE.to_string(),
                    render_meeting_assistance(&document.meeting_assistance),
                );
            }
            Err(e) => warn!(
                "Task {}: unreadable MeetingAssistance artifact: {}",
                task_id, e
            ),
        }
    }

    Ok(result_fields)
}

fn parse_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
