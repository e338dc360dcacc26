//! dm-migrator - gzip-transparent S3 bucket migration.
//!
//! This crate moves every object under a source-bucket prefix to a
//! destination bucket, transparently decompressing gzip-encoded objects
//! in transit. It provides:
//!
//! - Paginated, lazy listing of the source prefix
//! - Pure key classification (compressed / directory marker / plain)
//! - Whole-buffer gzip decompression with distinct decode errors
//! - A bounded pool of transfer workers with per-object failure isolation
//! - A final report enumerating every failed key for targeted retry
//!
//! # Example
//!
//! ```ignore
//! use dm_migrator::{MigrationConfig, Migrator};
//! use dm_migrator::s3::{S3Config, S3Store, create_s3_client};
//! use std::sync::Arc;
//!
//! let client = create_s3_client(&S3Config::new().with_region("us-east-1")).await?;
//! let store = Arc::new(S3Store::new(client));
//!
//! let migrator = Migrator::new(store, "raw-logs", "raw-logs-decompressed", MigrationConfig::new())
//!     .with_prefix("monthly_build/2024/logs/");
//!
//! let report = migrator.run().await?;
//! eprintln!("Migrated {} objects ({} failed)", report.migrated, report.failed);
//! ```

pub mod classify;
pub mod config;
pub mod decompress;
pub mod lister;
pub mod migrator;
pub mod report;
pub mod retry;
pub mod router;
pub mod s3;
pub mod store;
pub mod transfer;

pub use classify::{HandlingClass, classify, destination_key};
pub use config::MigrationConfig;
pub use decompress::{DecodeError, decompress};
pub use lister::list_objects;
pub use migrator::Migrator;
pub use report::{FailedObject, MigrationReport};
pub use retry::{RetryConfig, with_retry};
pub use store::{InMemoryStore, ListPage, ObjectStore};
pub use transfer::{TransferOutcome, TransferTask, TransferWorker};

use serde::{Deserialize, Serialize};

/// An object discovered while listing the source prefix.
///
/// Produced by the lister, one per listed object; scoped to a single
/// listing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Size of the object in bytes
    pub size: u64,
}
