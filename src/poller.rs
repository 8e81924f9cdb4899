// Status polling loop for Tingwu tasks
//
// This module implements the wait-for-completion state machine: an initial
// grace sleep, then a fixed-interval polling loop bounded by a total timeout.
// Terminal outcomes are expressed as a tagged variant so callers handle every
// case exhaustively instead of catching errors.

use log::{debug, warn};
use tokio::time::{sleep, Instant};

use crate::client::{StatusQuerier, TaskData};
use crate::config::PollerConfig;
use crate::error::PipelineError;

// Status strings reported by the remote service
const STATUS_COMPLETED: &str = "COMPLETED";
const STATUS_FAILED: &str = "FAILED";
const STATUS_CANCELLED: &str = "CANCELLED";

/// Terminal outcome of one wait-for-completion run
#[derive(Debug, Clone)]
pub enum TerminalStatus {
    /// Task finished; carries the full status payload including the artifact set
    Completed(TaskData),
    /// Task reached the Failed status, with the service's message
    Failed(String),
    /// Task was cancelled remotely
    Cancelled,
    /// The polling budget ran out while the task was still non-terminal
    TimedOut,
}

/// Wait until a task reaches a terminal status or the polling budget runs out
///
/// Sleeps `initial_wait` before the first query (the service cannot have a
/// status earlier than that), then queries every `interval`. The deadline is
/// checked before each query, so no query is issued past `timeout`. An empty
/// or absent status is a transient window on the service side; it is logged
/// and retried, never classified as a failure. Transport errors propagate and
/// abort the wait.
pub async fn wait_for_completion<Q>(
    querier: &Q,
    task_id: &str,
    config: &PollerConfig,
) -> Result<TerminalStatus, PipelineError>
where
    Q: StatusQuerier + ?Sized,
{
    sleep(config.initial_wait).await;

    let started = Instant::now();

    loop {
        if started.elapsed() > config.timeout {
            return Ok(TerminalStatus::TimedOut);
        }

        let envelope = querier.get_status(task_id).await?;
        let data = envelope.data.unwrap_or_default();

        match data.task_status.as_str() {
            STATUS_COMPLETED => {
                debug!("Task {} completed", task_id);
                return Ok(TerminalStatus::Completed(data));
            }
            STATUS_FAILED => {
                let message = if envelope.message.is_empty() {
                    "unknown error".to_string()
                } else {
                    envelope.message
                };
                return Ok(TerminalStatus::Failed(message));
            }
            STATUS_CANCELLED => return Ok(TerminalStatus::Cancelled),
            "" => {
                // Transient window where the service reports no status yet
                warn!("Task {}: empty status from service, still waiting", task_id);
            }
            other => {
                debug!("Task {}: status {}, still waiting", task_id, other);
            }
        }

        sleep(config.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TaskResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Querier that replays a scripted sequence of status strings,
    /// repeating the last entry once the script is exhausted.
    struct ScriptedQuerier {
        statuses: Mutex<Vec<&'static str>>,
        calls: AtomicUsize,
    }

    impl ScriptedQuerier {
        fn new(statuses: Vec<&'static str>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusQuerier for ScriptedQuerier {
        async fn get_status(&self, task_id: &str) -> Result<TaskResponse, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            };

            Ok(TaskResponse {
                request_id: "req".to_string(),
                message: if status == "FAILED" {
                    "media unreadable".to_string()
                } else {
                    String::new()
                },
                data: Some(TaskData {
                    task_id: task_id.to_string(),
                    task_status: status.to_string(),
                    result: Default::default(),
                }),
            })
        }
    }

    fn fast_config(timeout_ms: u64) -> PollerConfig {
        PollerConfig {
            initial_wait: Duration::from_millis(20),
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_initial_wait_precedes_first_query() {
        let querier = ScriptedQuerier::new(vec!["COMPLETED"]);
        let start = Instant::now();

        let outcome = wait_for_completion(&querier, "t1", &fast_config(5_000))
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(matches!(outcome, TerminalStatus::Completed(_)));
        assert_eq!(querier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_terminal_statuses_are_retried() {
        let querier = ScriptedQuerier::new(vec!["ONGOING", "", "ONGOING", "COMPLETED"]);

        let outcome = wait_for_completion(&querier, "t2", &fast_config(5_000))
            .await
            .unwrap();

        assert!(matches!(outcome, TerminalStatus::Completed(_)));
        assert_eq!(querier.call_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_status_carries_message() {
        let querier = ScriptedQuerier::new(vec!["FAILED"]);

        let outcome = wait_for_completion(&querier, "t3", &fast_config(5_000))
            .await
            .unwrap();

        match outcome {
            TerminalStatus::Failed(message) => assert_eq!(message, "media unreadable"),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_status() {
        let querier = ScriptedQuerier::new(vec!["CANCELLED"]);

        let outcome = wait_for_completion(&querier, "t4", &fast_config(5_000))
            .await
            .unwrap();

        assert!(matches!(outcome, TerminalStatus::Cancelled));
    }

    #[tokio::test]
    async fn test_timeout_stops_querying() {
        let querier = ScriptedQuerier::new(vec!["ONGOING"]);
        let config = PollerConfig {
            initial_wait: Duration::from_millis(5),
            interval: Duration::from_millis(10),
            timeout: Duration::from_millis(35),
        };

        let outcome = wait_for_completion(&querier, "t5", &config).await.unwrap();

        assert!(matches!(outcome, TerminalStatus::TimedOut));
        let calls = querier.call_count();
        // Deadline is checked before every query, so no query happens past it
        assert!(calls >= 1 && calls <= 4, "unexpected query count {}", calls);
    }

    #[tokio::test]
    async fn test_completed_payload_includes_artifacts() {
        struct ArtifactQuerier;

        #[async_trait]
        impl StatusQuerier for ArtifactQuerier {
            async fn get_status(&self, task_id: &str) -> Result<TaskResponse, PipelineError> {
                let mut result = std::collections::HashMap::new();
                result.insert(
                    "Transcription".to_string(),
                    "https://store.example.com/t.json".to_string(),
                );
                Ok(TaskResponse {
                    request_id: "req".to_string(),
                    message: String::new(),
                    data: Some(TaskData {
                        task_id: task_id.to_string(),
                        task_status: "COMPLETED".to_string(),
                        result,
                    }),
                })
            }
        }

        let outcome = wait_for_completion(&ArtifactQuerier, "t6", &fast_config(5_000))
            .await
            .unwrap();

        match outcome {
            TerminalStatus::Completed(data) => {
                assert!(data.result.contains_key("Transcription"));
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }
}
