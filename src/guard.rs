// Execution guard for Tingwu API
//
// This module implements the at-most-once gate around result processing.
// A duplicated completion trigger for the same task id (e.g. the background
// unit being scheduled twice) must not update the record sink twice, so the
// first acquisition wins and every later one is refused. The counters live
// in process memory only; the guard does not provide distributed semantics.

use std::collections::HashMap;

use tokio::sync::Mutex;

/// Process-wide at-most-once gate keyed by task id
#[derive(Default)]
pub struct ExecutionGuard {
    // Invocation counter per task id; the check and the increment happen
    // inside one lock acquisition so concurrent callers cannot both pass.
    counts: Mutex<HashMap<String, u64>>,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true on the first call for `task_id`, false on every later one
    pub async fn try_acquire(&self, task_id: &str) -> bool {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(task_id.to_string()).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Number of times `try_acquire` was called for `task_id`
    #[cfg(test)]
    pub(crate) async fn execution_count(&self, task_id: &str) -> u64 {
        let counts = self.counts.lock().await;
        counts.get(task_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_acquire_wins() {
        let guard = ExecutionGuard::new();

        assert!(guard.try_acquire("job1").await);
        assert!(!guard.try_acquire("job1").await);
        assert!(!guard.try_acquire("job1").await);
        assert_eq!(guard.execution_count("job1").await, 3);
    }

    #[tokio::test]
    async fn test_distinct_ids_are_independent() {
        let guard = ExecutionGuard::new();

        assert!(guard.try_acquire("job1").await);
        assert!(guard.try_acquire("job2").await);
        assert!(!guard.try_acquire("job1").await);
        assert_eq!(guard.execution_count("job3").await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_acquisition_admits_exactly_one() {
        let guard = Arc::new(ExecutionGuard::new());

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let guard = Arc::clone(&guard);
                tokio::spawn(async move { guard.try_acquire("job1").await })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 1);
        assert_eq!(guard.execution_count("job1").await, 32);
    }
}
