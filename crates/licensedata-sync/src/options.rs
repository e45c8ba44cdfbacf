//! Generation configuration.

use licensedata_core::OutputOptions;

use crate::fetch::FailurePolicy;

/// SPDX license list with every license and exception inline.
pub const SPDX_LICENSES_RDF_URL: &str =
    "https://raw.githubusercontent.com/spdx/license-list-data/refs/heads/main/rdfxml/licenses.rdf";
pub const SPDX_LICENSES_INDEX_URL: &str = "https://spdx.org/licenses/licenses.json";
pub const SPDX_EXCEPTIONS_INDEX_URL: &str = "https://spdx.org/licenses/exceptions.json";

pub const DEFAULT_UPDATE_FREQUENCY_HOURS: u32 = 24;

/// Where registry data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// One RDF/XML document holding every entry.
    Rdf { url: String },
    /// JSON index documents whose entries point at per-item detail documents.
    JsonIndex {
        licenses_url: String,
        exceptions_url: String,
    },
}

impl RegistrySource {
    pub fn rdf() -> Self {
        Self::Rdf {
            url: SPDX_LICENSES_RDF_URL.to_string(),
        }
    }

    pub fn json_index() -> Self {
        Self::JsonIndex {
            licenses_url: SPDX_LICENSES_INDEX_URL.to_string(),
            exceptions_url: SPDX_EXCEPTIONS_INDEX_URL.to_string(),
        }
    }
}

impl Default for RegistrySource {
    fn default() -> Self {
        Self::rdf()
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Which optional text fields are written.
    pub output: OutputOptions,
    /// Report progress at info level instead of debug.
    pub verbose: bool,
    /// Files older than this many hours are regenerated.
    pub update_frequency_hours: u32,
    pub source: RegistrySource,
    pub on_failure: FailurePolicy,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output: OutputOptions::default(),
            verbose: false,
            update_frequency_hours: DEFAULT_UPDATE_FREQUENCY_HOURS,
            source: RegistrySource::default(),
            on_failure: FailurePolicy::default(),
        }
    }
}
