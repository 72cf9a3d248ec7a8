//! Payload digests.
//!
//! The packer records the MD5 of every payload as a lowercase hex string. Nothing in the read
//! path depends on it, but it allows a damaged archive to be detected after the fact.

use md5::{Digest, Md5};

use crate::error::Error;
use crate::types::MpqEntry;

/// A payload whose digest does not match the one recorded for its entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Name of the entry
    pub key: String,
    /// Digest stored in the archive
    pub expected: String,
    /// Digest of the payload that was read
    pub actual: String,
}

impl From<Mismatch> for Error {
    fn from(value: Mismatch) -> Self {
        Error::ChecksumMismatch {
            name: value.key,
            expected: value.expected,
            actual: value.actual,
        }
    }
}

/// Hex encoded MD5 of `data`
pub fn digest_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

pub(crate) fn check(entry: &MpqEntry, data: &[u8]) -> Option<Mismatch> {
    let actual = digest_hex(data);
    if actual.eq_ignore_ascii_case(entry.md5.trim()) {
        return None;
    }

    Some(Mismatch {
        key: entry.key.clone(),
        expected: entry.md5.clone(),
        actual,
    })
}
