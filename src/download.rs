// Artifact download for Tingwu API
//
// This module downloads the named result artifacts of a completed task into a
// local directory. Artifacts are fetched in parallel; a failure on one (an
// expired URL, a missing object) is logged and skipped so the rest of the
// batch still lands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use log::{error, info};

use crate::file_utils::{artifact_file_name, save_bytes};

/// Download every artifact in the set, returning only the successes
///
/// The result maps artifact names to the local paths that were written.
/// Absence of a key means "not retrieved"; downstream consumers treat every
/// artifact as optional.
pub async fn download_all(
    http: &reqwest::Client,
    artifacts: &HashMap<String, String>,
    destination: &Path,
) -> std::io::Result<HashMap<String, PathBuf>> {
    std::fs::create_dir_all(destination)?;

    let fetches = artifacts.iter().map(|(name, url)| {
        let file_path = destination.join(artifact_file_name(url, name));
        async move {
            match fetch_artifact(http, url, &file_path).await {
                Ok(()) => {
                    info!("Downloaded {}: {}", name, file_path.display());
                    Some((name.clone(), file_path))
                }
                Err(e) => {
                    error!("Failed to download {}: {}", name, e);
                    None
                }
            }
        }
    });

    let downloaded = join_all(fetches).await.into_iter().flatten().collect();
    Ok(downloaded)
}

async fn fetch_artifact(
    http: &reqwest::Client,
    url: &str,
    file_path: &Path,
) -> Result<(), String> {
    let response = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;

    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    save_bytes(&bytes, file_path).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP responder: 200 with a body for paths under /good,
    /// 404 for everything else. One request per connection.
    async fn spawn_stub_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let response = if request.starts_with("GET /good") {
                        "HTTP/1.1 200 OK\r\nContent-Length: 13\r\nConnection: close\r\n\r\n{\"ok\": true}\n"
                    } else {
                        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    };
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let base = spawn_stub_server().await;
        let dir = std::env::temp_dir().join(format!("tingwu_dl_{}", uuid::Uuid::new_v4()));

        let mut artifacts = HashMap::new();
        artifacts.insert(
            "Transcription".to_string(),
            format!("{}/good/Transcription.json?Expires=1", base),
        );
        artifacts.insert(
            "AutoChapters".to_string(),
            format!("{}/expired/AutoChapters.json", base),
        );

        let http = reqwest::Client::new();
        let downloaded = download_all(&http, &artifacts, &dir).await.unwrap();

        assert_eq!(downloaded.len(), 1);
        let path = downloaded.get("Transcription").unwrap();
        assert_eq!(path, &dir.join("Transcription.json"));
        assert!(path.exists());
        assert!(!downloaded.contains_key("AutoChapters"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_empty_artifact_set() {
        let dir = std::env::temp_dir().join(format!("tingwu_dl_{}", uuid::Uuid::new_v4()));
        let http = reqwest::Client::new();

        let downloaded = download_all(&http, &HashMap::new(), &dir).await.unwrap();
        assert!(downloaded.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
