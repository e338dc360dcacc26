//! Key classification and destination key derivation.
//!
//! Classification is a pure, total function of the key string. The suffix
//! checks are ordered: `.gz` first, then trailing `/`, then plain.

use serde::{Deserialize, Serialize};

/// How an object key is handled during migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlingClass {
    /// Gzip-encoded object, decompressed in transit
    Compressed,
    /// Zero-byte folder placeholder, skipped
    DirectoryMarker,
    /// Copied through unmodified
    Plain,
}

/// Classify a key by its suffix. No I/O, no errors.
pub fn classify(key: &str) -> HandlingClass {
    if key.ends_with(".gz") {
        HandlingClass::Compressed
    } else if key.ends_with('/') {
        HandlingClass::DirectoryMarker
    } else {
        HandlingClass::Plain
    }
}

/// Derive the destination key for a source key.
///
/// Compressed keys lose their trailing `.gz`; everything else maps to
/// itself. Total for any key, even one that does not match its class.
pub fn destination_key(key: &str, class: HandlingClass) -> String {
    match class {
        HandlingClass::Compressed => key.strip_suffix(".gz").unwrap_or(key).to_string(),
        HandlingClass::DirectoryMarker | HandlingClass::Plain => key.to_string(),
    }
}
