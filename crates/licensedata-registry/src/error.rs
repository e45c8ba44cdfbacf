use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the document root")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("could not determine {kind} identifier (about: {about:?})")]
    MissingIdentifier {
        kind: EntryKind,
        about: Option<String>,
    },
}

/// The two kinds of registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    License,
    Exception,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::License => f.write_str("license"),
            EntryKind::Exception => f.write_str("license exception"),
        }
    }
}
