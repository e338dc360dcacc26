//! Main execution logic for the dm-migrator CLI.

use anyhow::Result;
use dm_migrator::s3::{S3Config, S3Store, create_s3_client};
use dm_migrator::{MigrationConfig, MigrationReport, Migrator, RetryConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, warn};
use tracing_subscriber::fmt;

use crate::args::{Cli, LogLevel};

/// Initialize logging.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let level: Level = level.into();

    let subscriber = fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr); // Log to stderr so stdout is clean for the report

    subscriber.init();

    Ok(())
}

/// Execute the migration with the provided arguments.
pub async fn execute(args: Cli) -> Result<MigrationReport> {
    // Build S3 configuration
    let mut s3_config = S3Config::new().with_region(&args.region);

    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    let client = create_s3_client(&s3_config).await?;
    let store = Arc::new(S3Store::new(client));

    let config = MigrationConfig::new()
        .with_concurrency(args.concurrency)
        .with_operation_timeout(Duration::from_secs(args.operation_timeout_secs))
        .with_retry(RetryConfig::new().with_max_retries(args.max_retries));

    let mut migrator = Migrator::new(
        store,
        &args.source_bucket,
        &args.destination_bucket,
        config,
    );
    if let Some(prefix) = &args.prefix {
        migrator = migrator.with_prefix(prefix);
    }

    // Ctrl-C cancels the run: listing stops, in-flight transfers finish.
    let cancel = migrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight transfers");
            cancel.cancel();
        }
    });

    let report = migrator.run().await?;
    Ok(report)
}
