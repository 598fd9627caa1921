#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Best-effort decoding of submitted source files.
//!
//! Students write HDL in whatever editor they have at hand, so sources are not
//! always UTF-8. A byte-order mark decides the encoding when present;
//! otherwise decoding tries UTF-8 and then falls back to the encoding
//! `chardetng` guesses for the bytes.

use std::path::Path;

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Outcome of decoding a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The bytes decoded cleanly.
    Text(String),
    /// Neither UTF-8 nor the detected encoding could decode the bytes.
    Failure {
        /// Name of the encoding the detector settled on.
        encoding: &'static str,
    },
}

impl Decoded {
    /// Returns the decoded text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Decoded::Text(text) => Some(text),
            Decoded::Failure { .. } => None,
        }
    }
}

/// Decodes `bytes` by their byte-order mark, else as UTF-8, else with a
/// detected encoding.
pub fn decode(bytes: &[u8]) -> Decoded {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        return decode_with(encoding, &bytes[bom_length..]);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Decoded::Text(text.to_owned());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(detector.guess(None, true), bytes)
}

/// Decodes `bytes` with `encoding`, failing on malformed input.
fn decode_with(encoding: &'static Encoding, bytes: &[u8]) -> Decoded {
    match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => Decoded::Text(text.into_owned()),
        None => Decoded::Failure {
            encoding: encoding.name(),
        },
    }
}

/// Reads and decodes the file at `path`.
pub fn read_source(path: &Path) -> Result<Decoded> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Could not read {}", path.display()))?;
    Ok(decode(&bytes))
}
