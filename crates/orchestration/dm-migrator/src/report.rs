//! Aggregated outcome of a migration run.

use crate::transfer::TransferOutcome;
use chrono::{DateTime, Duration, Utc};
use dm_error::TaskErrorKind;
use serde::{Deserialize, Serialize};

/// A task that failed, with enough context to retry exactly this key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedObject {
    /// Source key of the failed task
    pub key: String,

    /// Failure category
    pub kind: TaskErrorKind,

    /// Backend error message
    pub message: String,
}

/// Counts and failure details for one migration run.
///
/// The report is the single aggregation point for worker outcomes; it is
/// owned by the orchestrator and fed from the outcome channel, never
/// mutated concurrently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of objects the lister produced
    pub objects_listed: usize,

    /// Objects written to the destination
    pub migrated: usize,

    /// Directory markers (and other non-eligible keys) never dispatched
    pub skipped: usize,

    /// Tasks that ended in failure
    pub failed: usize,

    /// Total bytes written to the destination
    pub bytes_written: u64,

    /// Every failed key with its error kind, for a targeted retry pass
    pub failures: Vec<FailedObject>,
}

impl MigrationReport {
    /// Create a new report with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the run as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a descriptor produced by the lister.
    pub fn record_listed(&mut self) {
        self.objects_listed += 1;
    }

    /// Record an object that never became a task.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Record the outcome of one transfer task.
    pub fn record_outcome(&mut self, outcome: TransferOutcome) {
        match outcome {
            TransferOutcome::Success { bytes_written, .. } => {
                self.migrated += 1;
                self.bytes_written += bytes_written;
            }
            TransferOutcome::Failure {
                source_key,
                kind,
                message,
            } => {
                self.failed += 1;
                self.failures.push(FailedObject {
                    key: source_key,
                    kind,
                    message,
                });
            }
        }
    }

    /// Get the duration of the run.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Whether any task failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
