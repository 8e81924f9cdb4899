// API route handlers for Tingwu API
//
// This module contains the route handlers for the Tingwu API.
// The transcription endpoint acknowledges immediately and hands the job to
// the background orchestrator; the status endpoint proxies a single remote
// status query so clients can observe progress out of band.

use std::sync::Arc;

use actix_web::{get, options, post, web, HttpRequest, HttpResponse};
use log::info;

use crate::client::{StatusQuerier, TingwuClient};
use crate::error::HandlerError;
use crate::models::{AcceptedResponse, TaskStatusView, TranscriptionRequest};
use crate::orchestrator::Orchestrator;

/// Orchestrator wired to the concrete remote client
pub type AppOrchestrator = Orchestrator<TingwuClient>;

/// Handler for transcription requests
///
/// Validates the JSON body, schedules the background pipeline and returns
/// 202 immediately. The final outcome is only observable via the record
/// sink or the status endpoint, never via this response.
#[post("/transcription")]
pub async fn process_transcription(
    request: web::Json<TranscriptionRequest>,
    orchestrator: web::Data<Arc<AppOrchestrator>>,
) -> Result<HttpResponse, HandlerError> {
    let request = request.into_inner();
    request.validate()?;

    info!("Received process request for record {}", request.record_id);
    let record_id = request.record_id.clone();

    Arc::clone(orchestrator.get_ref()).spawn(request);

    Ok(HttpResponse::Accepted().json(AcceptedResponse {
        message: "Task accepted, processing in background".to_string(),
        record_id,
    }))
}

/// Handler for remote task status queries
///
/// Proxies one status query to the remote service. An empty status string
/// means the service has no status for the task yet.
#[get("/transcription/{task_id}")]
pub async fn task_status(
    task_id: web::Path<String>,
    client: web::Data<Arc<TingwuClient>>,
) -> Result<HttpResponse, HandlerError> {
    let task_id = task_id.into_inner();

    let envelope = client.get_status(&task_id).await?;
    let status = envelope
        .data
        .map(|data| data.task_status)
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(TaskStatusView { task_id, status }))
}

/// Handler for OPTIONS requests to the transcription endpoint
///
/// Returns the available HTTP methods and CORS headers for the /transcription resource.
#[options("/transcription")]
pub async fn transcription_options(_req: HttpRequest) -> HttpResponse {
    let allowed_methods = "OPTIONS, POST, GET";

    HttpResponse::Ok()
        .append_header(("Allow", allowed_methods))
        .append_header(("Access-Control-Allow-Methods", allowed_methods))
        .append_header((
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type",
        ))
        .append_header(("Access-Control-Max-Age", "86400"))
        .finish()
}
