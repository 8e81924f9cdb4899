use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::sync::Arc;

// Import our modules
mod artifacts;
mod client;
mod config;
mod config_loader;
mod download;
mod error;
mod file_utils;
mod guard;
mod handlers;
mod models;
mod orchestrator;
mod poller;
mod sink;
mod store;
mod transcript;

// Import the types we need
use client::TingwuClient;
use config::{HandlerConfig, PollerConfig, SinkConfig, StoreConfig, TingwuConfig};
use handlers::{process_transcription, task_status, transcription_options, Authentication};
use orchestrator::Orchestrator;
use sink::KintoneSink;
use store::OssStore;

const DEFAULT_TINGWU_API_HOST: &str = "127.0.0.1";
const DEFAULT_TINGWU_API_PORT: &str = "8181";
const DEFAULT_TINGWU_API_TIMEOUT: u64 = 60;
const DEFAULT_TINGWU_API_KEEPALIVE: u64 = 60;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Seed environment from the optional config file
    config_loader::load_config();

    // Load configurations
    let tingwu_config = TingwuConfig::default();
    let poller_config = PollerConfig::default();
    let sink_config = SinkConfig::default();
    let store_config = StoreConfig::default();
    let handler_config = HandlerConfig::default();

    if tingwu_config.app_key.is_empty() {
        warn!("TINGWU_APP_KEY is not set, submissions will be rejected by the service");
    }

    // Create the output directory if it doesn't exist
    if let Err(e) = handler_config.ensure_output_dir() {
        warn!(
            "Failed to create output directory {}: {}",
            handler_config.output_dir, e
        );
    }

    // One shared HTTP connection pool for the remote service, the artifact
    // downloads and the record sink
    let http = reqwest::Client::new();

    let tingwu_client = Arc::new(TingwuClient::new(http.clone(), tingwu_config.clone()));
    let record_sink = Arc::new(KintoneSink::new(http.clone(), sink_config));
    let object_store = Arc::new(OssStore::new(http.clone(), store_config));
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&tingwu_client),
        record_sink,
        object_store,
        poller_config,
        http,
        handler_config.clone(),
    ));

    // Server settings
    let host =
        std::env::var("TINGWU_API_HOST").unwrap_or_else(|_| DEFAULT_TINGWU_API_HOST.to_string());
    let port =
        std::env::var("TINGWU_API_PORT").unwrap_or_else(|_| DEFAULT_TINGWU_API_PORT.to_string());
    let timeout = std::time::Duration::from_secs(
        std::env::var("TINGWU_API_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TINGWU_API_TIMEOUT),
    );
    let keep_alive = std::time::Duration::from_secs(
        std::env::var("TINGWU_API_KEEPALIVE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TINGWU_API_KEEPALIVE),
    );

    info!("Starting Tingwu API server on http://{}:{}", host, port);
    info!("Tingwu endpoint: {}", tingwu_config.endpoint);
    info!("Output directory: {}", handler_config.output_dir);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Authentication)
            .app_data(web::Data::new(Arc::clone(&orchestrator)))
            .app_data(web::Data::new(Arc::clone(&tingwu_client)))
            .service(process_transcription)
            .service(task_status)
            .service(transcription_options)
    })
    .bind(format!("{}:{}", host, port))?
    .client_disconnect_timeout(timeout)
    .keep_alive(keep_alive)
    .run()
    .await
}
