//! dm-migrator CLI
//!
//! Gzip-transparent S3 bucket migration.

use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Logging goes to stderr; stdout carries only the JSON report
    if let Err(e) = run::init_logging(args.log_level) {
        eprintln!("Failed to initialize logging: {e:#}");
        std::process::exit(2);
    }

    let report = match run::execute(args).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Migration failed: {e:#}");
            std::process::exit(2); // Listing or configuration failure
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize report: {e}"),
    }

    // Summary to stderr
    eprintln!();
    eprintln!("Migration completed:");
    eprintln!("  Objects listed: {}", report.objects_listed);
    eprintln!("  Migrated:       {}", report.migrated);
    eprintln!("  Skipped:        {}", report.skipped);
    eprintln!("  Failed:         {}", report.failed);
    eprintln!("  Bytes written:  {}", format_bytes(report.bytes_written));

    if let Some(duration) = report.duration() {
        eprintln!(
            "  Duration:       {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }

    if report.has_failures() {
        for failure in &report.failures {
            eprintln!("  Failed: {} ({}): {}", failure.key, failure.kind, failure.message);
        }
        std::process::exit(4); // Partial failure
    }
}

/// Format bytes as human-readable string.
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
