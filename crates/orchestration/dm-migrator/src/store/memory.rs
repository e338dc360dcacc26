//! In-memory object store.
//!
//! Used as a test double and for offline rehearsal of a migration. Listing
//! order and continuation-token semantics mirror S3: keys come back in
//! lexicographic order and the token resumes strictly after the last key
//! of the previous page.

use super::{ListPage, ObjectStore};
use crate::ObjectDescriptor;
use async_trait::async_trait;
use bytes::Bytes;
use dm_error::StoreError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Default number of objects per listing page (matches S3's MaxKeys).
const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Default)]
struct Inner {
    /// bucket -> key -> body
    buckets: HashMap<String, BTreeMap<String, Bytes>>,

    /// Errors to return instead of serving a get for a key
    get_errors: HashMap<String, StoreError>,

    /// Errors to return instead of accepting a put for a key
    put_errors: HashMap<String, StoreError>,
}

/// An object store held entirely in process memory.
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    page_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store with the default page size.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the listing page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Insert an object.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
    }

    /// Make every get for `key` fail with `error`.
    pub fn inject_get_error(&self, key: &str, error: StoreError) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.get_errors.insert(key.to_string(), error);
    }

    /// Make every put for `key` fail with `error`.
    pub fn inject_put_error(&self, key: &str, error: StoreError) {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.put_errors.insert(key.to_string(), error);
    }

    /// Fetch a single object's body, if present.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner.buckets.get(bucket).and_then(|b| b.get(key)).cloned()
    }

    /// Snapshot of a bucket's contents in listing order.
    pub fn objects(&self, bucket: &str) -> Vec<(String, Bytes)> {
        let inner = self.inner.lock().expect("store lock poisoned");
        inner
            .buckets
            .get(bucket)
            .map(|b| b.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let Some(contents) = inner.buckets.get(bucket) else {
            return Err(StoreError::NotFound(format!("bucket {bucket}")));
        };

        let prefix = prefix.unwrap_or("");
        let mut objects = Vec::new();
        let mut remaining = false;

        for (key, body) in contents.iter() {
            if !key.starts_with(prefix) {
                continue;
            }
            // The token resumes strictly after the last key of the
            // previous page.
            if let Some(token) = continuation {
                if key.as_str() <= token {
                    continue;
                }
            }
            if objects.len() == self.page_size {
                remaining = true;
                break;
            }
            objects.push(ObjectDescriptor {
                key: key.clone(),
                size: body.len() as u64,
            });
        }

        let next_token = if remaining {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        if let Some(error) = inner.get_errors.get(key) {
            return Err(error.clone());
        }
        inner
            .buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{bucket}/{key}")))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if let Some(error) = inner.put_errors.get(key) {
            return Err(error.clone());
        }
        inner
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body);
        Ok(())
    }
}
