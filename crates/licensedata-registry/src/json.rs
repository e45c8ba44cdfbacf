//! SPDX JSON index and per-entry detail documents.
//!
//! The index (`licenses.json`, `exceptions.json`) lists every entry with a
//! `detailsUrl`; each detail document carries the full record. Field shapes
//! follow the RDF conversion: the same absent/single/many normalisation for
//! `seeAlso` and `crossRef`, the same defaults for missing flags.

use licensedata_core::{CrossRef, ExceptionDetails, LicenseDetails, Shape};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ConvertError, EntryKind, ParseError};

/// One entry of a JSON index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub details_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIndexEntry {
    license_id: Option<String>,
    license_exception_id: Option<String>,
    details_url: Option<String>,
}

#[derive(Deserialize)]
struct RawLicenseIndex {
    #[serde(default)]
    licenses: Vec<RawIndexEntry>,
}

#[derive(Deserialize)]
struct RawExceptionIndex {
    #[serde(default)]
    exceptions: Vec<RawIndexEntry>,
}

/// Entries of a `licenses.json` index. A missing `licenses` key is an empty index.
pub fn license_index(raw: &str) -> Result<Vec<IndexEntry>, ParseError> {
    let index: RawLicenseIndex = serde_json::from_str(raw)?;
    Ok(index_entries(index.licenses, EntryKind::License))
}

/// Entries of an `exceptions.json` index.
pub fn exception_index(raw: &str) -> Result<Vec<IndexEntry>, ParseError> {
    let index: RawExceptionIndex = serde_json::from_str(raw)?;
    Ok(index_entries(index.exceptions, EntryKind::Exception))
}

fn index_entries(raw: Vec<RawIndexEntry>, kind: EntryKind) -> Vec<IndexEntry> {
    raw.into_iter()
        .filter_map(|entry| {
            let id = match kind {
                EntryKind::License => entry.license_id,
                EntryKind::Exception => entry.license_exception_id,
            };
            match (id, entry.details_url) {
                (Some(id), Some(details_url)) if !details_url.is_empty() => {
                    Some(IndexEntry { id, details_url })
                }
                (None, details_url) => {
                    warn!(%kind, details_url = ?details_url, "index entry without identifier, skipping");
                    None
                }
                (Some(id), _) => {
                    warn!(%kind, %id, "index entry without detailsUrl, skipping");
                    None
                }
            }
        })
        .collect()
}

/// Parse a detail document; anything but a JSON object is unparseable.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str(raw)? {
        Value::Object(object) => Ok(object),
        _ => Err(ParseError::NotAnObject),
    }
}

/// Convert a license detail document.
pub fn convert_license(
    candidate_id: Option<&str>,
    object: &Map<String, Value>,
) -> Result<LicenseDetails, ConvertError> {
    let license_id = resolve_id(object, "licenseId", candidate_id).ok_or(
        ConvertError::MissingIdentifier {
            kind: EntryKind::License,
            about: None,
        },
    )?;

    Ok(LicenseDetails {
        license_id,
        name: string(object, "name"),
        license_text: string(object, "licenseText"),
        license_text_html: string(object, "licenseTextHtml"),
        standard_license_template: string(object, "standardLicenseTemplate"),
        standard_license_header: string(object, "standardLicenseHeader"),
        standard_license_header_html: string(object, "standardLicenseHeaderHtml"),
        standard_license_header_template: string(object, "standardLicenseHeaderTemplate"),
        license_comments: string(object, "licenseComments"),
        is_deprecated_license_id: boolean(object, "isDeprecatedLicenseId", false),
        is_osi_approved: boolean(object, "isOsiApproved", false),
        is_fsf_libre: boolean(object, "isFsfLibre", false),
        see_also: strings(object, "seeAlso"),
        cross_ref: cross_refs(object),
    })
}

/// Convert an exception detail document.
pub fn convert_exception(
    candidate_id: Option<&str>,
    object: &Map<String, Value>,
) -> Result<ExceptionDetails, ConvertError> {
    let license_exception_id = resolve_id(object, "licenseExceptionId", candidate_id).ok_or(
        ConvertError::MissingIdentifier {
            kind: EntryKind::Exception,
            about: None,
        },
    )?;

    Ok(ExceptionDetails {
        license_exception_id,
        name: string(object, "name"),
        license_exception_text: string(object, "licenseExceptionText"),
        license_exception_text_html: string(object, "exceptionTextHtml"),
        license_exception_template: string(object, "licenseExceptionTemplate"),
        license_comments: string(object, "licenseComments"),
        is_deprecated_license_id: boolean(object, "isDeprecatedLicenseId", false),
        see_also: strings(object, "seeAlso"),
        cross_ref: cross_refs(object),
    })
}

fn resolve_id(object: &Map<String, Value>, key: &str, candidate: Option<&str>) -> Option<String> {
    string(object, key)
        .filter(|id| !id.is_empty())
        .or_else(|| candidate.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string))
}

fn shape<'a>(object: &'a Map<String, Value>, key: &str) -> Shape<&'a Value> {
    match object.get(key) {
        None | Some(Value::Null) => Shape::Absent,
        Some(Value::Array(items)) => Shape::Many(items.iter().collect()),
        Some(value) => Shape::Single(value),
    }
}

fn string(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        Some(Value::String(s)) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn strings(object: &Map<String, Value>, key: &str) -> Vec<String> {
    shape(object, key).filter_map(|value| value.as_str().map(|s| s.trim().to_string()))
}

fn boolean(object: &Map<String, Value>, key: &str, default: bool) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.trim() == "true" => true,
        Some(Value::String(s)) if s.trim() == "false" => false,
        Some(other) => {
            warn!(field = key, value = %other, "unexpected value for a boolean, using default");
            default
        }
    }
}

fn integer(object: &Map<String, Value>, key: &str, default: i64) -> i64 {
    let parsed = match object.get(key) {
        None | Some(Value::Null) => return default,
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    parsed.unwrap_or_else(|| {
        warn!(field = key, "unexpected value for an integer, using default");
        default
    })
}

fn cross_refs(object: &Map<String, Value>) -> Vec<CrossRef> {
    shape(object, "crossRef").filter_map(|value| {
        let Some(item) = value.as_object() else {
            warn!(value = %value, "crossRef entry is not an object, skipping");
            return None;
        };
        let matches = match item.get("match") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => boolean(item, "match", false).to_string(),
        };
        Some(CrossRef {
            order: integer(item, "order", 0),
            matches,
            url: string(item, "url").unwrap_or_default(),
            is_valid: boolean(item, "isValid", false),
            is_live: boolean(item, "isLive", false),
            is_way_back_link: boolean(item, "isWayBackLink", false),
            timestamp: string(item, "timestamp"),
        })
    })
}
