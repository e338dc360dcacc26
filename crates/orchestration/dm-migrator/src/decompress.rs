//! Gzip decompression of whole in-memory buffers.
//!
//! Source objects are bounded system/log files, so the transform consumes
//! a complete buffer rather than a chunked stream. An implementation
//! targeting very large objects would swap this for a streaming decode
//! without changing the caller-visible contract.

use flate2::read::MultiGzDecoder;
use std::io::Read;
use thiserror::Error;

/// The input was not valid gzip-framed data.
///
/// Truncated header, bad checksum, or a corrupt deflate stream. This is a
/// per-object error, distinct from transport failures.
#[derive(Error, Debug)]
#[error("Invalid gzip data: {0}")]
pub struct DecodeError(String);

/// Decompress a complete gzip-framed buffer.
///
/// Multi-member archives are decoded in full, matching what standard
/// gzip tooling produces for concatenated files.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = MultiGzDecoder::new(input);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| DecodeError(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let original = b"line one\nline two\nline three\n";
        let compressed = gzip(original);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_round_trip_empty() {
        let compressed = gzip(b"");
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn test_multi_member_archive() {
        let mut compressed = gzip(b"first member\n");
        compressed.extend(gzip(b"second member\n"));

        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, b"first member\nsecond member\n");
    }

    #[test]
    fn test_garbage_input_fails() {
        let result = decompress(b"this is not gzip data");
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_input_fails() {
        let compressed = gzip(b"some content that will be cut off");
        let truncated = &compressed[..compressed.len() / 2];
        assert!(decompress(truncated).is_err());
    }

    #[test]
    fn test_corrupted_payload_fails() {
        let mut compressed = gzip(b"some content with a checksum trailer");
        let mid = compressed.len() / 2;
        compressed[mid] ^= 0xff;
        assert!(decompress(&compressed).is_err());
    }
}
