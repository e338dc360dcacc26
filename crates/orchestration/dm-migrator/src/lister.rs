//! Lazy, paginated listing of a source prefix.

use crate::ObjectDescriptor;
use crate::store::ObjectStore;
use async_stream::try_stream;
use dm_error::StoreError;
use futures::Stream;
use tracing::debug;

/// List all objects in a bucket under an optional prefix.
///
/// Returns a lazy stream of [`ObjectDescriptor`] items, following the
/// store's continuation token until the listing is exhausted. Only one
/// page is held in memory at a time. Directory markers are yielded as-is;
/// deciding what to do with them belongs to the classifier, so the
/// orchestrator can count skips.
///
/// The first error ends the stream; a listing that cannot proceed is
/// fatal for the whole run.
///
/// # Example
///
/// ```ignore
/// use futures::{StreamExt, pin_mut};
///
/// let stream = list_objects(&store, "my-bucket", Some("logs/"));
/// pin_mut!(stream);
///
/// while let Some(result) = stream.next().await {
///     let obj = result?;
///     println!("Found: {} ({} bytes)", obj.key, obj.size);
/// }
/// ```
pub fn list_objects<'a, S: ObjectStore + ?Sized>(
    store: &'a S,
    bucket: &str,
    prefix: Option<&str>,
) -> impl Stream<Item = Result<ObjectDescriptor, StoreError>> + 'a {
    let bucket = bucket.to_string();
    let prefix = prefix.map(|s| s.to_string());

    try_stream! {
        let mut continuation: Option<String> = None;
        let mut pages = 0u64;

        loop {
            let page = store
                .list_page(&bucket, prefix.as_deref(), continuation.as_deref())
                .await?;
            pages += 1;

            for obj in page.objects {
                // A store should never emit an empty key
                if obj.key.is_empty() {
                    continue;
                }
                yield obj;
            }

            match page.next_token {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        debug!(bucket = %bucket, pages, "Listing exhausted");
    }
}
