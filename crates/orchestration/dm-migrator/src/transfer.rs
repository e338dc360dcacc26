//! Per-object transfer: fetch, optional decompression, destination write.

use crate::classify::{HandlingClass, classify, destination_key};
use crate::decompress::decompress;
use crate::retry::{RetryConfig, with_retry};
use crate::store::ObjectStore;
use bytes::Bytes;
use dm_error::TaskErrorKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// One unit of migration work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTask {
    /// Key in the source bucket
    pub source_key: String,

    /// Key in the destination bucket
    pub destination_key: String,

    /// How the body is handled in transit
    pub class: HandlingClass,
}

impl TransferTask {
    /// Build a task for a key, or `None` for directory markers.
    pub fn for_key(key: &str) -> Option<Self> {
        match classify(key) {
            HandlingClass::DirectoryMarker => None,
            class => Some(Self {
                source_key: key.to_string(),
                destination_key: destination_key(key, class),
                class,
            }),
        }
    }
}

/// Result of one transfer task.
///
/// Failures are data, not control flow: no error crosses the worker
/// boundary, so the orchestrator keeps processing other tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    /// The full body was written to the destination
    Success {
        destination_key: String,
        bytes_written: u64,
    },
    /// The task was aborted; nothing was written
    Failure {
        source_key: String,
        kind: TaskErrorKind,
        message: String,
    },
}

/// Executes transfer tasks against a source and destination bucket.
pub struct TransferWorker<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    source_bucket: String,
    destination_bucket: String,
    operation_timeout: Duration,
    retry: RetryConfig,
}

impl<S: ObjectStore + ?Sized> TransferWorker<S> {
    /// Create a worker bound to a source and destination bucket.
    pub fn new(
        store: Arc<S>,
        source_bucket: impl Into<String>,
        destination_bucket: impl Into<String>,
        operation_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            source_bucket: source_bucket.into(),
            destination_bucket: destination_bucket.into(),
            operation_timeout,
            retry,
        }
    }

    /// Run one task to completion.
    ///
    /// Fetch, decode (for compressed objects), write. Each step carries
    /// its own timeout; fetch and write retry throttling-class errors
    /// with bounded backoff. Either the full body is written or nothing
    /// is.
    pub async fn transfer(&self, task: &TransferTask) -> TransferOutcome {
        let body = match self.fetch(&task.source_key).await {
            Ok(body) => body,
            Err(failure) => return failure,
        };

        let body = match task.class {
            HandlingClass::Compressed => match self.decode(task, body).await {
                Ok(decoded) => decoded,
                Err(failure) => return failure,
            },
            HandlingClass::Plain => body,
            // Markers are filtered before tasks are built
            HandlingClass::DirectoryMarker => {
                return TransferOutcome::Failure {
                    source_key: task.source_key.clone(),
                    kind: TaskErrorKind::Fetch,
                    message: "directory marker should not become a task".to_string(),
                };
            }
        };

        let bytes_written = body.len() as u64;
        if let Err(failure) = self.write(task, body).await {
            return failure;
        }

        debug!(
            source = %task.source_key,
            destination = %task.destination_key,
            bytes = bytes_written,
            "Object migrated"
        );

        TransferOutcome::Success {
            destination_key: task.destination_key.clone(),
            bytes_written,
        }
    }

    async fn fetch(&self, source_key: &str) -> Result<Bytes, TransferOutcome> {
        let operation = with_retry(&self.retry, "get_object", || {
            self.store.get_object(&self.source_bucket, source_key)
        });

        match timeout(self.operation_timeout, operation).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(e)) => Err(self.failure(source_key, TaskErrorKind::Fetch, &e)),
            Err(_) => Err(self.timeout_failure(source_key, "fetch")),
        }
    }

    async fn decode(&self, task: &TransferTask, body: Bytes) -> Result<Bytes, TransferOutcome> {
        // Whole-buffer decode on a blocking thread so the runtime stays
        // responsive for network-bound peers.
        let handle = tokio::task::spawn_blocking(move || decompress(&body));

        match timeout(self.operation_timeout, handle).await {
            Ok(Ok(Ok(decoded))) => Ok(Bytes::from(decoded)),
            Ok(Ok(Err(e))) => Err(self.failure(&task.source_key, TaskErrorKind::Decode, &e)),
            Ok(Err(join_error)) => {
                Err(self.failure(&task.source_key, TaskErrorKind::Decode, &join_error))
            }
            Err(_) => Err(self.timeout_failure(&task.source_key, "decode")),
        }
    }

    async fn write(&self, task: &TransferTask, body: Bytes) -> Result<(), TransferOutcome> {
        let operation = with_retry(&self.retry, "put_object", || {
            self.store
                .put_object(&self.destination_bucket, &task.destination_key, body.clone())
        });

        match timeout(self.operation_timeout, operation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(self.failure(&task.source_key, TaskErrorKind::Write, &e)),
            Err(_) => Err(self.timeout_failure(&task.source_key, "write")),
        }
    }

    fn failure(
        &self,
        source_key: &str,
        kind: TaskErrorKind,
        error: &impl std::fmt::Display,
    ) -> TransferOutcome {
        TransferOutcome::Failure {
            source_key: source_key.to_string(),
            kind,
            message: error.to_string(),
        }
    }

    fn timeout_failure(&self, source_key: &str, operation: &str) -> TransferOutcome {
        TransferOutcome::Failure {
            source_key: source_key.to_string(),
            kind: TaskErrorKind::Timeout,
            message: format!(
                "{operation} exceeded {}s budget",
                self.operation_timeout.as_secs()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use dm_error::StoreError;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn worker(store: Arc<InMemoryStore>) -> TransferWorker<InMemoryStore> {
        TransferWorker::new(
            store,
            "src",
            "dst",
            Duration::from_secs(5),
            RetryConfig::new().with_initial_backoff_ms(1).with_jitter(false),
        )
    }

    #[test]
    fn test_task_for_gz_key() {
        let task = TransferTask::for_key("logs/a.gz").unwrap();
        assert_eq!(task.source_key, "logs/a.gz");
        assert_eq!(task.destination_key, "logs/a");
        assert_eq!(task.class, HandlingClass::Compressed);
    }

    #[test]
    fn test_task_for_plain_key() {
        let task = TransferTask::for_key("logs/b.txt").unwrap();
        assert_eq!(task.destination_key, "logs/b.txt");
        assert_eq!(task.class, HandlingClass::Plain);
    }

    #[test]
    fn test_no_task_for_directory_marker() {
        assert!(TransferTask::for_key("logs/sub/").is_none());
    }

    #[tokio::test]
    async fn test_transfer_decompresses_gz_object() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/a.gz", gzip(b"hello world\n"));

        let task = TransferTask::for_key("logs/a.gz").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        assert_eq!(
            outcome,
            TransferOutcome::Success {
                destination_key: "logs/a".to_string(),
                bytes_written: 12,
            }
        );
        assert_eq!(&store.object("dst", "logs/a").unwrap()[..], b"hello world\n");
    }

    #[tokio::test]
    async fn test_transfer_passes_plain_object_through() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/b.txt", &b"plain content"[..]);

        let task = TransferTask::for_key("logs/b.txt").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        assert!(matches!(outcome, TransferOutcome::Success { .. }));
        assert_eq!(
            &store.object("dst", "logs/b.txt").unwrap()[..],
            b"plain content"
        );
    }

    #[tokio::test]
    async fn test_transfer_missing_source_is_fetch_failure() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "present", &b""[..]);

        let task = TransferTask::for_key("absent.txt").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        match outcome {
            TransferOutcome::Failure { source_key, kind, .. } => {
                assert_eq!(source_key, "absent.txt");
                assert_eq!(kind, TaskErrorKind::Fetch);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        // Nothing was written
        assert!(store.object("dst", "absent.txt").is_none());
    }

    #[tokio::test]
    async fn test_transfer_corrupt_gz_is_decode_failure() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/bad.gz", &b"definitely not gzip"[..]);

        let task = TransferTask::for_key("logs/bad.gz").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        match outcome {
            TransferOutcome::Failure { kind, .. } => assert_eq!(kind, TaskErrorKind::Decode),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(store.object("dst", "logs/bad").is_none());
    }

    #[tokio::test]
    async fn test_transfer_rejected_write_is_write_failure() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/c.txt", &b"content"[..]);
        store.inject_put_error("logs/c.txt", StoreError::AccessDenied("dst".to_string()));

        let task = TransferTask::for_key("logs/c.txt").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        match outcome {
            TransferOutcome::Failure { kind, .. } => assert_eq!(kind, TaskErrorKind::Write),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transfer_retries_throttled_fetch() {
        // A throttled get is permanent in the in-memory store, so after
        // bounded retries the task still fails with Fetch, proving the
        // retry path classifies throttling as retryable but gives up.
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/d.txt", &b"content"[..]);
        store.inject_get_error("logs/d.txt", StoreError::Throttled("SlowDown".to_string()));

        let task = TransferTask::for_key("logs/d.txt").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        match outcome {
            TransferOutcome::Failure { kind, message, .. } => {
                assert_eq!(kind, TaskErrorKind::Fetch);
                assert!(message.contains("SlowDown"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transfer_overwrites_existing_destination() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/e.txt", &b"new"[..]);
        store.insert("dst", "logs/e.txt", &b"old"[..]);

        let task = TransferTask::for_key("logs/e.txt").unwrap();
        let outcome = worker(store.clone()).transfer(&task).await;

        assert!(matches!(outcome, TransferOutcome::Success { .. }));
        assert_eq!(&store.object("dst", "logs/e.txt").unwrap()[..], b"new");
    }
}
