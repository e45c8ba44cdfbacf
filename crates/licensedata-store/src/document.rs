//! Reading and writing the persisted JSON documents.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::StoreError;

/// Drop every character outside the ASCII range.
pub fn sanitize_ascii(raw: &str) -> String {
    raw.chars().filter(char::is_ascii).collect()
}

/// Serialize `document` as two-space indented JSON, strip non-ASCII
/// characters, create the parent directory if needed and write it to `path`.
///
/// The write is not atomic; a crash mid-write leaves a file the staleness
/// gate rejects on the next run.
pub async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StoreError> {
    let serialized = sanitize_ascii(&serde_json::to_string_pretty(document)?);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(path, serialized.as_bytes())
        .await
        .map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), bytes = serialized.len(), "wrote document");
    Ok(())
}

/// Read a document previously written by [`write_document`].
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&raw).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use licensedata_core::{License, LicensesDocument};

    fn document(name: &str) -> LicensesDocument {
        LicensesDocument {
            licenses: vec![License {
                name: name.into(),
                license_id: "0BSD".into(),
                license_text: None,
                license_text_html: None,
                standard_license_template: None,
                standard_license_header: None,
                standard_license_header_html: None,
                standard_license_header_template: None,
                license_comments: None,
                is_deprecated: false,
                is_osi_approved: true,
                is_fsf_libre: false,
                see_also: vec![],
                cross_ref: vec![],
                source: "https://example.org/licenses.rdf".into(),
            }],
            version: "0a1b2c3d".into(),
            release_date: "2026-10-16T08:00:00.000Z".into(),
        }
    }

    #[test]
    fn sanitize_strips_non_ascii_only() {
        assert_eq!(sanitize_ascii("Caf\u{e9} \u{201c}quoted\u{201d}\n\ttab"), "Caf quoted\n\ttab");
        assert_eq!(sanitize_ascii("plain"), "plain");
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/deeper/licenses.json");

        write_document(&path, &document("BSD Zero Clause License")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n  \"licenses\": [\n    {\n"));
        assert!(raw.contains("\"licenseId\": \"0BSD\""));
        assert!(raw.contains("\"seeAlso\": []"));
        assert!(!raw.contains("licenseText"));
    }

    #[tokio::test]
    async fn written_output_is_ascii() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("licenses.json");

        write_document(&path, &document("Licen\u{e7}a P\u{fa}blica")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.is_ascii());
        let back: LicensesDocument = read_document(&path).await.unwrap();
        assert_eq!(back.licenses[0].name, "Licena Pblica");
    }

    #[tokio::test]
    async fn read_round_trips_written_document() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("licenses.json");
        let original = document("BSD Zero Clause License");

        write_document(&path, &original).await.unwrap();
        let back: LicensesDocument = read_document(&path).await.unwrap();
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn read_reports_missing_and_malformed_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("missing.json");
        assert!(matches!(
            read_document::<LicensesDocument>(&missing).await,
            Err(StoreError::Read { .. })
        ));

        let broken = tmp.path().join("broken.json");
        std::fs::write(&broken, "{\"licenses\": ").unwrap();
        assert!(matches!(
            read_document::<LicensesDocument>(&broken).await,
            Err(StoreError::Decode { .. })
        ));
    }
}
