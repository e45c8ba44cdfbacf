//! Storage layer: the two cached JSON documents on disk and the metadata stamped on them.

mod error;
pub use error::StoreError;

pub mod document;
pub mod staleness;
pub mod version;

pub use document::{read_document, sanitize_ascii, write_document};
pub use staleness::{needs_update, staleness_threshold};
pub use version::{FINGERPRINT_LEN, release_timestamp, version_fingerprint};
