//! Version and release metadata stamped on both documents.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::StoreError;

/// Hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Short deterministic digest over both sorted entry lists.
///
/// The lists are serialized in order and joined with `#` before hashing, so
/// reordering entries or moving one between lists changes the result.
pub fn version_fingerprint<L: Serialize, E: Serialize>(
    licenses: &[L],
    exceptions: &[E],
) -> Result<String, StoreError> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(licenses)?);
    hasher.update(b"#");
    hasher.update(serde_json::to_vec(exceptions)?);
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    Ok(digest)
}

/// RFC 3339 UTC timestamp with millisecond precision, e.g. `2026-10-16T08:00:00.000Z`.
pub fn release_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
