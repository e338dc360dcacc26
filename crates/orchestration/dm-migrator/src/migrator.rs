//! Migration orchestration.
//!
//! A single producer drives the lister; eligible descriptors become
//! transfer tasks routed over bounded channels to a worker pool; worker
//! outcomes flow through one channel into the report. The run moves
//! through listing, dispatching, draining, done; only a listing failure
//! is fatal.

use crate::config::MigrationConfig;
use crate::lister::list_objects;
use crate::report::MigrationReport;
use crate::router::TaskRouter;
use crate::store::ObjectStore;
use crate::transfer::{TransferTask, TransferWorker};
use dm_error::{MigrateError, Result, StoreError};
use futures::{StreamExt, pin_mut};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Drives one migration run from a source prefix to a destination bucket.
pub struct Migrator<S: ObjectStore + ?Sized + 'static> {
    store: Arc<S>,
    source_bucket: String,
    destination_bucket: String,
    prefix: Option<String>,
    config: MigrationConfig,
    cancel: CancellationToken,
}

impl<S: ObjectStore + ?Sized + 'static> Migrator<S> {
    /// Create a migrator for a source and destination bucket.
    pub fn new(
        store: Arc<S>,
        source_bucket: impl Into<String>,
        destination_bucket: impl Into<String>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            store,
            source_bucket: source_bucket.into(),
            destination_bucket: destination_bucket.into(),
            prefix: None,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Restrict the run to keys under a prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Token that cancels the run: listing stops, nothing new is
    /// dispatched, in-flight tasks finish.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the migration to completion.
    ///
    /// Returns the report on success or partial failure; returns an
    /// error only when the configuration is invalid or the listing
    /// itself fails.
    pub async fn run(&self) -> Result<MigrationReport> {
        self.config
            .validate()
            .map_err(MigrateError::Config)?;

        let mut report = MigrationReport::new();

        info!(
            source = %self.source_bucket,
            destination = %self.destination_bucket,
            prefix = ?self.prefix,
            concurrency = self.config.concurrency,
            "Starting migration"
        );

        let (router, receivers) =
            TaskRouter::new(self.config.concurrency, self.config.channel_buffer);
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let handles = self.spawn_workers(receivers, outcome_tx);

        // Listing: the single producer. Continuation tokens make this
        // inherently sequential.
        let listing_error = self.dispatch_all(&router, &mut report).await;

        // Draining: refuse new tasks, close the worker channels, and let
        // in-flight tasks finish.
        router.shutdown();
        drop(router);
        for (worker_id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker = worker_id, error = %e, "Transfer worker panicked");
            }
        }

        while let Some(outcome) = outcome_rx.recv().await {
            report.record_outcome(outcome);
        }
        report.complete();

        if let Some(e) = listing_error {
            error!(
                error = %e,
                migrated = report.migrated,
                failed = report.failed,
                "Listing failed, aborting run"
            );
            return Err(MigrateError::Listing(e.to_string()));
        }

        info!(
            listed = report.objects_listed,
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            bytes = report.bytes_written,
            "Migration completed"
        );

        Ok(report)
    }

    fn spawn_workers(
        &self,
        receivers: Vec<mpsc::Receiver<TransferTask>>,
        outcome_tx: mpsc::UnboundedSender<crate::transfer::TransferOutcome>,
    ) -> Vec<JoinHandle<()>> {
        receivers
            .into_iter()
            .enumerate()
            .map(|(worker_id, mut rx)| {
                let worker = TransferWorker::new(
                    self.store.clone(),
                    &self.source_bucket,
                    &self.destination_bucket,
                    self.config.operation_timeout,
                    self.config.retry.clone(),
                );
                let tx = outcome_tx.clone();

                tokio::spawn(async move {
                    debug!(worker = worker_id, "Transfer worker started");
                    while let Some(task) = rx.recv().await {
                        let outcome = worker.transfer(&task).await;
                        if tx.send(outcome).is_err() {
                            break;
                        }
                    }
                    debug!(worker = worker_id, "Transfer worker stopped");
                })
            })
            .collect()
    }

    /// Drive the lister and route eligible descriptors to the pool.
    ///
    /// Returns the listing error, if any; task failures are not errors
    /// here, they surface through the outcome channel.
    async fn dispatch_all(
        &self,
        router: &TaskRouter,
        report: &mut MigrationReport,
    ) -> Option<StoreError> {
        let stream = list_objects(
            self.store.as_ref(),
            &self.source_bucket,
            self.prefix.as_deref(),
        );
        pin_mut!(stream);

        loop {
            if self.cancel.is_cancelled() {
                info!("Cancellation requested, listing stopped");
                break;
            }

            let Some(result) = stream.next().await else {
                break;
            };

            let descriptor = match result {
                Ok(descriptor) => descriptor,
                Err(e) => return Some(e),
            };
            report.record_listed();

            match TransferTask::for_key(&descriptor.key) {
                Some(task) => {
                    debug!(key = %descriptor.key, size = descriptor.size, "Dispatching object");
                    if router.route(task).await.is_err() {
                        // Worker channels are gone; nothing more can be
                        // dispatched.
                        warn!(key = %descriptor.key, "Task routing failed, stopping dispatch");
                        break;
                    }
                }
                None => {
                    debug!(key = %descriptor.key, "Skipping directory marker");
                    report.record_skipped();
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn migrator(store: Arc<InMemoryStore>) -> Migrator<InMemoryStore> {
        Migrator::new(
            store,
            "src",
            "dst",
            MigrationConfig::new().with_concurrency(4),
        )
    }

    #[tokio::test]
    async fn test_empty_prefix_migrates_nothing() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "other/file.txt", &b"x"[..]);

        let report = migrator(store.clone())
            .with_prefix("logs/")
            .run()
            .await
            .unwrap();

        assert_eq!(report.objects_listed, 0);
        assert_eq!(report.migrated, 0);
        assert!(report.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let store = Arc::new(InMemoryStore::new());
        // No such bucket at all

        let result = migrator(store).run().await;
        assert!(matches!(result, Err(MigrateError::Listing(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let migrator = Migrator::new(
            store,
            "src",
            "dst",
            MigrationConfig::new().with_concurrency(0),
        );

        let result = migrator.run().await;
        assert!(matches!(result, Err(MigrateError::Config(_))));
    }

    #[tokio::test]
    async fn test_cancelled_run_dispatches_nothing() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("src", "logs/a.txt", &b"a"[..]);
        store.insert("src", "logs/b.txt", &b"b"[..]);

        let migrator = migrator(store.clone());
        migrator.cancellation_token().cancel();

        let report = migrator.run().await.unwrap();
        assert_eq!(report.objects_listed, 0);
        assert_eq!(report.migrated, 0);
        assert!(store.objects("dst").is_empty());
    }
}
