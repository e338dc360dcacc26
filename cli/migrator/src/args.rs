//! CLI argument definitions for dm-migrator.

use clap::{Parser, ValueEnum};

/// Gzip-transparent S3 bucket migration.
///
/// Lists every object under a source prefix, decompresses `.gz` objects
/// in transit, skips directory markers, and writes everything to the
/// destination bucket. The final report is printed to stdout as JSON.
///
/// ## Examples
///
/// Basic usage:
///   dm-migrator --source-bucket raw-logs --destination-bucket raw-logs-decompressed
///
/// Restricted to a prefix, against LocalStack:
///   dm-migrator --source-bucket raw-logs --destination-bucket out \
///       --prefix "monthly_build/2024/logs/" --s3-endpoint http://localhost:4566
#[derive(Parser, Debug)]
#[command(name = "dm-migrator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Buckets ===
    /// Source bucket name
    #[arg(long, env = "DM_SOURCE_BUCKET")]
    pub source_bucket: String,

    /// Destination bucket name
    #[arg(long, env = "DM_DESTINATION_BUCKET")]
    pub destination_bucket: String,

    /// Key prefix selecting the subtree to migrate
    #[arg(short, long, env = "DM_PREFIX")]
    pub prefix: Option<String>,

    // === S3 Configuration ===
    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "DM_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    // === Concurrency Options ===
    /// Number of concurrent transfer workers (must be >= 1)
    #[arg(long, default_value = "16", value_parser = parse_positive_usize)]
    pub concurrency: usize,

    /// Per-operation timeout in seconds
    #[arg(long, default_value = "30")]
    pub operation_timeout_secs: u64,

    /// Maximum retries for throttling-class errors
    #[arg(long, default_value = "3")]
    pub max_retries: u32,

    // === Logging Options ===
    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Log level argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_usize() {
        assert_eq!(parse_positive_usize("8"), Ok(8));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("eight").is_err());
    }

    #[test]
    fn test_cli_parses_minimal_invocation() {
        let cli = Cli::try_parse_from([
            "dm-migrator",
            "--source-bucket",
            "src",
            "--destination-bucket",
            "dst",
        ])
        .unwrap();

        assert_eq!(cli.source_bucket, "src");
        assert_eq!(cli.destination_bucket, "dst");
        assert!(cli.prefix.is_none());
        assert_eq!(cli.concurrency, 16);
    }
}
