//! [`ObjectStore`] implementation backed by the AWS SDK.

use crate::ObjectDescriptor;
use crate::store::{ListPage, ObjectStore};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use dm_error::StoreError;

/// An object store talking to S3 (or an S3-compatible endpoint).
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Wrap an S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut req = self.client.list_objects_v2().bucket(bucket);

        if let Some(prefix) = prefix {
            req = req.prefix(prefix);
        }

        if let Some(token) = continuation {
            req = req.continuation_token(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, bucket))?;

        let mut objects = Vec::new();
        if let Some(contents) = resp.contents {
            for obj in contents {
                let key = obj.key.unwrap_or_default();
                objects.push(ObjectDescriptor {
                    key,
                    size: obj.size.unwrap_or(0).max(0) as u64,
                });
            }
        }

        // is_truncated and the token must agree before we resume
        let next_token = if resp.is_truncated == Some(true) {
            resp.next_continuation_token
        } else {
            None
        };

        Ok(ListPage {
            objects,
            next_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, key))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Network(format!("{key}: body read failed: {e}")))?;

        Ok(data.into_bytes())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, key))?;

        Ok(())
    }
}

/// Map an SDK error onto the store error taxonomy.
fn classify_sdk_error<E>(err: &SdkError<E>, context: &str) -> StoreError
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::ServiceError(service) => {
            let code = service.err().code().unwrap_or("Unknown");
            let message = service.err().message().unwrap_or(code);
            let detail = format!("{context}: {code}: {message}");

            match code {
                "NoSuchKey" | "NotFound" => StoreError::NotFound(context.to_string()),
                "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" => {
                    StoreError::AccessDenied(detail)
                }
                "SlowDown" | "TooManyRequests" | "Throttling" | "RequestLimitExceeded" => {
                    StoreError::Throttled(detail)
                }
                "QuotaExceeded" | "ServiceQuotaExceededException" => {
                    StoreError::QuotaExceeded(detail)
                }
                "InternalError" | "ServiceUnavailable" => StoreError::Network(detail),
                _ => StoreError::Other(detail),
            }
        }
        SdkError::TimeoutError(_) => StoreError::Network(format!("{context}: request timed out")),
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreError::Network(format!("{context}: transport failure"))
        }
        _ => StoreError::Other(format!("{context}: unclassified SDK error")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // classify_sdk_error is exercised indirectly through StoreError's
    // retry classification; constructing SdkError values outside the SDK
    // is unwieldy, so here we pin down the code → variant table on the
    // StoreError side.

    #[test]
    fn test_throttling_codes_are_retryable() {
        let error = StoreError::Throttled("key: SlowDown: reduce request rate".to_string());
        assert!(error.is_retryable());
    }

    #[test]
    fn test_not_found_is_permanent() {
        let error = StoreError::NotFound("logs/a.gz".to_string());
        assert!(!error.is_retryable());
    }
}
