//! License and exception records, from converter output to persisted documents.

use serde::{Deserialize, Serialize};

use crate::options::OutputOptions;

/// A secondary URL asserted to also host the license text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossRef {
    pub order: i64,
    /// Upstream emits this as a boolean in some documents and a string in
    /// others; downstream consumers expect the string form.
    #[serde(rename = "match")]
    pub matches: String,
    pub url: String,
    pub is_valid: bool,
    pub is_live: bool,
    pub is_way_back_link: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Everything a license converter extracts from one upstream entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicenseDetails {
    pub license_id: String,
    pub name: Option<String>,
    pub license_text: Option<String>,
    pub license_text_html: Option<String>,
    pub standard_license_template: Option<String>,
    pub standard_license_header: Option<String>,
    pub standard_license_header_html: Option<String>,
    pub standard_license_header_template: Option<String>,
    pub license_comments: Option<String>,
    pub is_deprecated_license_id: bool,
    pub is_osi_approved: bool,
    pub is_fsf_libre: bool,
    pub see_also: Vec<String>,
    pub cross_ref: Vec<CrossRef>,
}

/// Everything an exception converter extracts from one upstream entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExceptionDetails {
    pub license_exception_id: String,
    pub name: Option<String>,
    pub license_exception_text: Option<String>,
    pub license_exception_text_html: Option<String>,
    pub license_exception_template: Option<String>,
    pub license_comments: Option<String>,
    pub is_deprecated_license_id: bool,
    pub see_also: Vec<String>,
    pub cross_ref: Vec<CrossRef>,
}

/// A license as persisted in the licenses document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(default)]
    pub name: String,
    pub license_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_text_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_license_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_license_header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_license_header_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_license_header_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_comments: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub is_osi_approved: bool,
    #[serde(default)]
    pub is_fsf_libre: bool,
    #[serde(default)]
    pub see_also: Vec<String>,
    #[serde(default)]
    pub cross_ref: Vec<CrossRef>,
    pub source: String,
}

/// A license exception as persisted in the exceptions document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    #[serde(default)]
    pub name: String,
    pub license_exception_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_exception_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_exception_text_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_exception_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_comments: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub see_also: Vec<String>,
    #[serde(default)]
    pub cross_ref: Vec<CrossRef>,
    pub source: String,
}

/// The persisted licenses document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensesDocument {
    pub licenses: Vec<License>,
    pub version: String,
    /// ISO 8601 timestamp string.
    pub release_date: String,
}

/// The persisted exceptions document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionsDocument {
    pub exceptions: Vec<Exception>,
    pub version: String,
    /// ISO 8601 timestamp string.
    pub release_date: String,
}

/// A record with a unique key inside its document.
pub trait RegistryEntry {
    fn id(&self) -> &str;
}

impl RegistryEntry for License {
    fn id(&self) -> &str {
        &self.license_id
    }
}

impl RegistryEntry for Exception {
    fn id(&self) -> &str {
        &self.license_exception_id
    }
}

impl LicenseDetails {
    /// Project the converter output onto the persisted shape.
    ///
    /// Returns `None` for entries without an identifier; those never reach a
    /// document.
    pub fn into_record(self, options: &OutputOptions, source: &str) -> Option<License> {
        if self.license_id.is_empty() {
            return None;
        }
        Some(License {
            name: self.name.unwrap_or_default(),
            license_id: self.license_id,
            license_text: keep_unless(options.exclude_text, self.license_text),
            license_text_html: keep_unless(options.exclude_html, self.license_text_html),
            standard_license_template: keep_unless(
                options.exclude_templates,
                self.standard_license_template,
            ),
            standard_license_header: keep_unless(options.exclude_text, self.standard_license_header),
            standard_license_header_html: keep_unless(
                options.exclude_html,
                self.standard_license_header_html,
            ),
            standard_license_header_template: keep_unless(
                options.exclude_templates,
                self.standard_license_header_template,
            ),
            license_comments: keep_unless(options.exclude_comments, self.license_comments),
            is_deprecated: self.is_deprecated_license_id,
            is_osi_approved: self.is_osi_approved,
            is_fsf_libre: self.is_fsf_libre,
            see_also: self.see_also,
            cross_ref: self.cross_ref,
            source: source.to_string(),
        })
    }
}

impl ExceptionDetails {
    /// Project the converter output onto the persisted shape.
    pub fn into_record(self, options: &OutputOptions, source: &str) -> Option<Exception> {
        if self.license_exception_id.is_empty() {
            return None;
        }
        Some(Exception {
            name: self.name.unwrap_or_default(),
            license_exception_id: self.license_exception_id,
            license_exception_text: keep_unless(options.exclude_text, self.license_exception_text),
            license_exception_text_html: keep_unless(
                options.exclude_html,
                self.license_exception_text_html,
            ),
            license_exception_template: keep_unless(
                options.exclude_templates,
                self.license_exception_template,
            ),
            license_comments: keep_unless(options.exclude_comments, self.license_comments),
            is_deprecated: self.is_deprecated_license_id,
            see_also: self.see_also,
            cross_ref: self.cross_ref,
            source: source.to_string(),
        })
    }
}

fn keep_unless(excluded: bool, value: Option<String>) -> Option<String> {
    if excluded { None } else { value }
}
