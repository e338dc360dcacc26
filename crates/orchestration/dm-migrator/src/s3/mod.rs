//! AWS S3 backend.
//!
//! - Client configuration with LocalStack support
//! - [`S3Store`]: the [`crate::store::ObjectStore`] implementation backed
//!   by the AWS SDK

mod client;
mod store;

pub use client::{S3Config, create_s3_client};
pub use store::S3Store;
