//! Object store abstraction.
//!
//! The migration pipeline talks to buckets only through [`ObjectStore`],
//! so the S3 backend can be swapped for the in-memory implementation in
//! tests and offline rehearsal.

mod memory;

pub use memory::InMemoryStore;

use crate::ObjectDescriptor;
use async_trait::async_trait;
use bytes::Bytes;
use dm_error::StoreError;

/// One page of a bucket listing.
#[derive(Debug, Clone)]
pub struct ListPage {
    /// Objects in this page, in the store's listing order
    pub objects: Vec<ObjectDescriptor>,

    /// Opaque cursor for the next page; `None` when the listing is
    /// exhausted. Single-use: a token is only valid for the request
    /// immediately following the one that produced it.
    pub next_token: Option<String>,
}

/// Trait for object store backends.
///
/// # Implementations
///
/// - [`crate::s3::S3Store`]: AWS SDK backend
/// - [`InMemoryStore`]: in-process backend for tests
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of the listing for `bucket` under `prefix`.
    ///
    /// Pass the `next_token` of the previous page to resume; `None`
    /// starts from the beginning.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError>;

    /// Fetch the full body of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// Write an object, overwriting any existing object at `key`.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError>;
}
