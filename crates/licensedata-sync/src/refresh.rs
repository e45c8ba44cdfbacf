//! Refresh orchestration: fetch, convert, version, write.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use licensedata_core::{
    Exception, ExceptionDetails, ExceptionsDocument, License, LicenseDetails, LicensesDocument,
    RegistryEntry, dedup_by_id, sort_by_id,
};
use licensedata_registry::json::{self, IndexEntry};
use licensedata_registry::{ConvertError, ParseError, listed_exceptions, listed_licenses, parse_document};
use licensedata_store::{StoreError, release_timestamp, version_fingerprint, write_document};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::details::{self, Sourced, resolve_details_url};
use crate::fetch::{ContentFetcher, FetchDiagnostic, fetch_with_policy};
use crate::options::{GenerateOptions, RegistrySource};

/// Where a refresh currently is.
///
/// `Fetching` covers the root documents only. With a JSON index source the
/// per-entry detail documents are fetched during `Converting`, since each
/// one is converted as soon as it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Fetching,
    Converting,
    Versioning,
    Writing,
    Failed,
}

impl fmt::Display for RefreshPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshPhase::Idle => "idle",
            RefreshPhase::Fetching => "fetching",
            RefreshPhase::Converting => "converting",
            RefreshPhase::Versioning => "versioning",
            RefreshPhase::Writing => "writing",
            RefreshPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("fetching {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchDiagnostic,
    },
    #[error("{url} could not be parsed while {phase}: {source}")]
    Parse {
        phase: RefreshPhase,
        url: String,
        #[source]
        source: ParseError,
    },
    #[error("registry conversion failed: {0}")]
    Convert(#[from] ConvertError),
    #[error("{phase} failed: {source}")]
    Store {
        phase: RefreshPhase,
        #[source]
        source: StoreError,
    },
    #[error("reading generated documents failed: {0}")]
    Read(#[source] StoreError),
}

impl RefreshError {
    /// The phase the refresh was in when it failed.
    ///
    /// Failures reading back finished documents happen after the refresh
    /// returned to [`RefreshPhase::Idle`].
    pub fn phase(&self) -> RefreshPhase {
        match self {
            RefreshError::Fetch { .. } => RefreshPhase::Fetching,
            RefreshError::Parse { phase, .. } | RefreshError::Store { phase, .. } => *phase,
            RefreshError::Convert(_) => RefreshPhase::Converting,
            RefreshError::Read(_) => RefreshPhase::Idle,
        }
    }
}

/// Both generated documents.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLicenseData {
    pub licenses: LicensesDocument,
    pub exceptions: ExceptionsDocument,
}

#[derive(Default)]
struct Collected {
    licenses: Vec<Sourced<LicenseDetails>>,
    exceptions: Vec<Sourced<ExceptionDetails>>,
}

/// One refresh run against a fetcher.
///
/// Old files are only replaced once every earlier phase succeeded; a failure
/// before [`RefreshPhase::Writing`] leaves them untouched.
pub struct Refresh<'a, F: ?Sized> {
    fetcher: &'a F,
    options: &'a GenerateOptions,
    phase: RefreshPhase,
}

impl<'a, F: ContentFetcher + ?Sized> Refresh<'a, F> {
    pub fn new(fetcher: &'a F, options: &'a GenerateOptions) -> Self {
        Self {
            fetcher,
            options,
            phase: RefreshPhase::Idle,
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        self.phase
    }

    /// Regenerate both documents and write them to disk.
    pub async fn run(
        &mut self,
        licenses_path: &Path,
        exceptions_path: &Path,
    ) -> Result<GeneratedLicenseData, RefreshError> {
        match self.execute(licenses_path, exceptions_path).await {
            Ok(data) => {
                self.enter(RefreshPhase::Idle);
                Ok(data)
            }
            Err(e) => {
                self.enter(RefreshPhase::Failed);
                error!(phase = %e.phase(), error = %e, "refresh failed");
                Err(e)
            }
        }
    }

    fn enter(&mut self, phase: RefreshPhase) {
        if self.phase == phase {
            return;
        }
        debug!(from = %self.phase, to = %phase, "refresh phase");
        self.phase = phase;
    }

    async fn execute(
        &mut self,
        licenses_path: &Path,
        exceptions_path: &Path,
    ) -> Result<GeneratedLicenseData, RefreshError> {
        let options = self.options;
        let collected = match &options.source {
            RegistrySource::Rdf { url } => self.collect_rdf(url).await?,
            RegistrySource::JsonIndex {
                licenses_url,
                exceptions_url,
            } => self.collect_json(licenses_url, exceptions_url).await?,
        };

        self.enter(RefreshPhase::Converting);
        let mut licenses: Vec<License> = collected
            .licenses
            .into_iter()
            .filter_map(|s| s.details.into_record(&options.output, &s.source))
            .collect();
        let mut exceptions: Vec<Exception> = collected
            .exceptions
            .into_iter()
            .filter_map(|s| s.details.into_record(&options.output, &s.source))
            .collect();
        normalize_order(&mut licenses, "license");
        normalize_order(&mut exceptions, "exception");

        self.enter(RefreshPhase::Versioning);
        let version = version_fingerprint(&licenses, &exceptions).map_err(|source| {
            RefreshError::Store {
                phase: RefreshPhase::Versioning,
                source,
            }
        })?;
        let release_date = release_timestamp(Utc::now());
        let data = GeneratedLicenseData {
            licenses: LicensesDocument {
                licenses,
                version: version.clone(),
                release_date: release_date.clone(),
            },
            exceptions: ExceptionsDocument {
                exceptions,
                version,
                release_date,
            },
        };

        self.enter(RefreshPhase::Writing);
        let writing = |source| RefreshError::Store {
            phase: RefreshPhase::Writing,
            source,
        };
        write_document(licenses_path, &data.licenses)
            .await
            .map_err(writing)?;
        write_document(exceptions_path, &data.exceptions)
            .await
            .map_err(writing)?;

        progress!(
            options.verbose,
            licenses = data.licenses.licenses.len(),
            exceptions = data.exceptions.exceptions.len(),
            version = %data.licenses.version,
            "wrote license data"
        );
        Ok(data)
    }

    /// Fetch a root document; `None` when the policy degraded a failure or
    /// the body is blank.
    async fn fetch_root(&mut self, url: &str) -> Result<Option<String>, RefreshError> {
        let body = fetch_with_policy(self.fetcher, url, self.options.on_failure)
            .await
            .map_err(|source| RefreshError::Fetch {
                url: url.to_string(),
                source,
            })?;
        match body.filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => {
                progress!(self.options.verbose, url = %url, bytes = raw.len(), "downloaded registry document");
                Ok(Some(raw))
            }
            None => {
                warn!(url = %url, "no registry content, continuing with zero entries");
                Ok(None)
            }
        }
    }

    async fn collect_rdf(&mut self, url: &str) -> Result<Collected, RefreshError> {
        self.enter(RefreshPhase::Fetching);
        let Some(raw) = self.fetch_root(url).await? else {
            return Ok(Collected::default());
        };

        self.enter(RefreshPhase::Converting);
        let doc = parse_document(&raw).map_err(|source| RefreshError::Parse {
            phase: RefreshPhase::Converting,
            url: url.to_string(),
            source,
        })?;
        Ok(Collected {
            licenses: sourced_from(listed_licenses(&doc)?, url),
            exceptions: sourced_from(listed_exceptions(&doc)?, url),
        })
    }

    async fn collect_json(
        &mut self,
        licenses_url: &str,
        exceptions_url: &str,
    ) -> Result<Collected, RefreshError> {
        self.enter(RefreshPhase::Fetching);
        let license_raw = self.fetch_root(licenses_url).await?;
        let exception_raw = self.fetch_root(exceptions_url).await?;

        self.enter(RefreshPhase::Converting);
        let license_index = parse_index(license_raw, licenses_url, json::license_index)?;
        let exception_index = parse_index(exception_raw, exceptions_url, json::exception_index)?;
        debug!(
            licenses = license_index.len(),
            exceptions = exception_index.len(),
            "fetching detail documents"
        );

        let policy = self.options.on_failure;
        let licenses = details::license_details(self.fetcher, &license_index, policy).await;
        let exceptions = details::exception_details(self.fetcher, &exception_index, policy).await;
        Ok(Collected {
            licenses,
            exceptions,
        })
    }
}

/// Parse a fetched index and resolve its detail URLs against the index URL.
fn parse_index(
    raw: Option<String>,
    url: &str,
    parse: fn(&str) -> Result<Vec<IndexEntry>, ParseError>,
) -> Result<Vec<IndexEntry>, RefreshError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let entries = parse(&raw).map_err(|source| RefreshError::Parse {
        phase: RefreshPhase::Converting,
        url: url.to_string(),
        source,
    })?;
    Ok(entries
        .into_iter()
        .map(|entry| IndexEntry {
            details_url: resolve_details_url(url, &entry.details_url),
            id: entry.id,
        })
        .collect())
}

fn sourced_from<T>(entries: Vec<T>, url: &str) -> Vec<Sourced<T>> {
    entries
        .into_iter()
        .map(|details| Sourced {
            details,
            source: url.to_string(),
        })
        .collect()
}

/// Sort by identifier and keep the first record for each one.
fn normalize_order<T: RegistryEntry>(records: &mut Vec<T>, kind: &str) {
    sort_by_id(records);
    let dropped = dedup_by_id(records);
    if !dropped.is_empty() {
        warn!(kind, ids = ?dropped, "dropped duplicate identifiers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FailurePolicy;
    use crate::testing::StaticFetcher;
    use licensedata_core::{OutputOptions, compare_ids};
    use std::cmp::Ordering;

    const RDF_URL: &str = "https://registry.example/licenses.rdf";

    fn rdf(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:spdx="http://spdx.org/rdf/terms#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">{body}</rdf:RDF>"#
        )
    }

    fn rdf_options() -> GenerateOptions {
        GenerateOptions {
            source: RegistrySource::Rdf { url: RDF_URL.into() },
            ..GenerateOptions::default()
        }
    }

    fn paths(tmp: &tempfile::TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
        (
            tmp.path().join("out/licenses.json"),
            tmp.path().join("out/exceptions.json"),
        )
    }

    async fn run(fetcher: &StaticFetcher, options: &GenerateOptions, tmp: &tempfile::TempDir) -> Result<GeneratedLicenseData, RefreshError> {
        let (licenses, exceptions) = paths(tmp);
        Refresh::new(fetcher, options).run(&licenses, &exceptions).await
    }

    #[tokio::test]
    async fn single_license_without_optional_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            RDF_URL,
            &rdf(r#"<spdx:ListedLicense rdf:about="http://spdx.org/licenses/0BSD"/>"#),
        );

        let data = run(&fetcher, &rdf_options(), &tmp).await.unwrap();
        assert_eq!(data.licenses.licenses.len(), 1);
        let license = &data.licenses.licenses[0];
        assert_eq!(license.license_id, "0BSD");
        assert!(license.see_also.is_empty());
        assert!(!license.is_deprecated);
        assert_eq!(license.source, RDF_URL);
        assert!(data.exceptions.exceptions.is_empty());

        let raw = std::fs::read_to_string(paths(&tmp).0).unwrap();
        assert!(raw.contains("\"licenseId\": \"0BSD\""));
        assert!(raw.contains("\"seeAlso\": []"));
        assert!(raw.contains("\"isDeprecated\": false"));
    }

    #[tokio::test]
    async fn exception_with_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            RDF_URL,
            &rdf(r#"<spdx:ListedLicenseException rdf:about="http://spdx.org/licenses/Autoconf-exception-2.0">
                      <spdx:licenseExceptionId>Autoconf-exception-2.0</spdx:licenseExceptionId>
                      <spdx:name>Autoconf exception 2.0</spdx:name>
                    </spdx:ListedLicenseException>"#),
        );

        let data = run(&fetcher, &rdf_options(), &tmp).await.unwrap();
        let exception = &data.exceptions.exceptions[0];
        assert_eq!(exception.license_exception_id, "Autoconf-exception-2.0");
        assert_eq!(exception.name, "Autoconf exception 2.0");
        assert!(!exception.is_deprecated);
        assert_eq!(data.licenses.version, data.exceptions.version);
        assert_eq!(data.licenses.release_date, data.exceptions.release_date);
    }

    #[tokio::test]
    async fn records_are_sorted_and_unique() {
        let tmp = tempfile::TempDir::new().unwrap();
        let body: String = ["MIT", "Apache-2.0", "0BSD", "apache-1.0", "MIT", "GPL-2.0+"]
            .iter()
            .map(|id| format!(r#"<spdx:ListedLicense rdf:about="http://spdx.org/licenses/{id}"/>"#))
            .collect();
        let fetcher = StaticFetcher::new().with(RDF_URL, &rdf(&body));

        let data = run(&fetcher, &rdf_options(), &tmp).await.unwrap();
        let ids: Vec<_> = data.licenses.licenses.iter().map(|l| l.license_id.as_str()).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], "0BSD");
        for pair in ids.windows(2) {
            assert_eq!(compare_ids(pair[0], pair[1]), Ordering::Less, "{pair:?}");
        }
    }

    #[tokio::test]
    async fn version_is_idempotent_for_identical_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            RDF_URL,
            &rdf(r#"<spdx:ListedLicense rdf:about="http://spdx.org/licenses/0BSD"/>
                    <spdx:ListedLicense rdf:about="http://spdx.org/licenses/MIT"/>"#),
        );
        let options = rdf_options();

        let first = run(&fetcher, &options, &tmp).await.unwrap();
        let second = run(&fetcher, &options, &tmp).await.unwrap();
        assert_eq!(first.licenses.version, second.licenses.version);
        assert_eq!(first.licenses.version.len(), 8);
    }

    #[tokio::test]
    async fn exclude_text_drops_only_text() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            RDF_URL,
            &rdf(r#"<spdx:ListedLicense rdf:about="http://spdx.org/licenses/MIT">
                      <spdx:name>MIT License</spdx:name>
                      <spdx:licenseText>Permission is hereby granted</spdx:licenseText>
                      <rdfs:comment>OSI approved</rdfs:comment>
                    </spdx:ListedLicense>"#),
        );
        let options = GenerateOptions {
            output: OutputOptions {
                exclude_text: true,
                ..OutputOptions::default()
            },
            ..rdf_options()
        };

        let data = run(&fetcher, &options, &tmp).await.unwrap();
        let license = &data.licenses.licenses[0];
        assert_eq!(license.license_id, "MIT");
        assert_eq!(license.name, "MIT License");
        assert!(license.license_text.is_none());
        assert_eq!(license.license_comments.as_deref(), Some("OSI approved"));

        let raw = std::fs::read_to_string(paths(&tmp).0).unwrap();
        assert!(!raw.contains("licenseText"));
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_empty_documents() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new();

        let data = run(&fetcher, &rdf_options(), &tmp).await.unwrap();
        assert!(data.licenses.licenses.is_empty());
        assert!(data.exceptions.exceptions.is_empty());
        assert!(paths(&tmp).0.exists());
        assert!(paths(&tmp).1.exists());
    }

    #[tokio::test]
    async fn propagate_policy_fails_without_writing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new();
        let options = GenerateOptions {
            on_failure: FailurePolicy::Propagate,
            ..rdf_options()
        };

        let (licenses, exceptions) = paths(&tmp);
        let mut refresh = Refresh::new(&fetcher, &options);
        let err = refresh.run(&licenses, &exceptions).await.unwrap_err();
        assert!(matches!(err, RefreshError::Fetch { .. }));
        assert_eq!(err.phase(), RefreshPhase::Fetching);
        assert_eq!(refresh.phase(), RefreshPhase::Failed);
        assert!(!licenses.exists());
    }

    #[tokio::test]
    async fn unparseable_root_leaves_old_files_in_place() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (licenses, exceptions) = paths(&tmp);
        std::fs::create_dir_all(licenses.parent().unwrap()).unwrap();
        std::fs::write(&licenses, r#"{"licenses": [], "version": "old", "releaseDate": "x"}"#).unwrap();

        let fetcher = StaticFetcher::new().with(RDF_URL, "<rdf:RDF><spdx:ListedLicense>");
        let err = run(&fetcher, &rdf_options(), &tmp).await.unwrap_err();
        assert!(matches!(err, RefreshError::Parse { .. }));
        assert_eq!(err.phase(), RefreshPhase::Converting);

        let raw = std::fs::read_to_string(&licenses).unwrap();
        assert!(raw.contains("\"old\""));
        assert!(!exceptions.exists());
    }

    #[tokio::test]
    async fn entry_without_identifier_aborts_inline_batch() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with(
            RDF_URL,
            &rdf(r#"<spdx:ListedLicense rdf:about="http://spdx.org/licenses/0BSD"/>
                    <spdx:ListedLicense><spdx:name>Nameless</spdx:name></spdx:ListedLicense>"#),
        );

        let err = run(&fetcher, &rdf_options(), &tmp).await.unwrap_err();
        assert!(matches!(err, RefreshError::Convert(_)));
        assert!(!paths(&tmp).0.exists());
    }

    #[tokio::test]
    async fn json_index_with_fallback() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new()
            .with(
                "https://spdx.org/licenses/licenses.json",
                r#"{"licenses": [
                    {"licenseId": "MIT", "detailsUrl": "./MIT.json"},
                    {"licenseId": "0BSD", "detailsUrl": "./0BSD.json"},
                    {"licenseId": "Gone", "detailsUrl": "./Gone.json"}
                ]}"#,
            )
            .with(
                "https://spdx.org/licenses/exceptions.json",
                r#"{"exceptions": [
                    {"licenseExceptionId": "polyparse-exception", "detailsUrl": "./polyparse-exception.json"}
                ]}"#,
            )
            .with(
                "https://spdx.org/licenses/MIT.json",
                r#"{"licenseId": "MIT", "name": "MIT License", "seeAlso": ["https://opensource.org/license/mit/"]}"#,
            )
            .with("https://spdx.org/licenses/0BSD.json", "<!doctype html>")
            .with(
                "https://raw.githubusercontent.com/spdx/license-list-data/main/rdfxml/0BSD.rdf",
                &rdf(r#"<spdx:ListedLicense rdf:about="http://spdx.org/licenses/0BSD">
                          <spdx:name>BSD Zero Clause License</spdx:name>
                        </spdx:ListedLicense>"#),
            )
            .with(
                "https://spdx.org/licenses/polyparse-exception.json",
                r#"{"licenseExceptionId": "polyparse-exception", "name": "Polyparse Exception"}"#,
            );
        let options = GenerateOptions {
            source: RegistrySource::json_index(),
            ..GenerateOptions::default()
        };

        let data = run(&fetcher, &options, &tmp).await.unwrap();
        let ids: Vec<_> = data.licenses.licenses.iter().map(|l| l.license_id.as_str()).collect();
        assert_eq!(ids, vec!["0BSD", "MIT"]);
        assert_eq!(data.licenses.licenses[0].name, "BSD Zero Clause License");
        assert!(data.licenses.licenses[0].source.ends_with("rdfxml/0BSD.rdf"));
        assert_eq!(data.licenses.licenses[1].source, "https://spdx.org/licenses/MIT.json");
        assert_eq!(data.exceptions.exceptions[0].name, "Polyparse Exception");
    }

    #[tokio::test]
    async fn unparseable_index_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new().with("https://spdx.org/licenses/licenses.json", "[oops");
        let options = GenerateOptions {
            source: RegistrySource::json_index(),
            ..GenerateOptions::default()
        };

        let err = run(&fetcher, &options, &tmp).await.unwrap_err();
        assert!(matches!(err, RefreshError::Parse { phase: RefreshPhase::Converting, .. }));
        assert_eq!(err.phase(), RefreshPhase::Converting);
    }

    #[tokio::test]
    async fn both_sources_report_parse_failures_while_converting() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new()
            .with(RDF_URL, "<rdf:RDF><spdx:ListedLicense>")
            .with("https://spdx.org/licenses/licenses.json", "{}")
            .with("https://spdx.org/licenses/exceptions.json", "not json");
        let json_options = GenerateOptions {
            source: RegistrySource::json_index(),
            ..GenerateOptions::default()
        };

        let rdf_err = run(&fetcher, &rdf_options(), &tmp).await.unwrap_err();
        let json_err = run(&fetcher, &json_options, &tmp).await.unwrap_err();
        assert_eq!(rdf_err.phase(), json_err.phase());
        assert!(matches!(
            json_err,
            RefreshError::Parse { ref url, .. } if url == "https://spdx.org/licenses/exceptions.json"
        ));
    }

    #[tokio::test]
    async fn missing_detail_does_not_abort_propagating_refresh() {
        let tmp = tempfile::TempDir::new().unwrap();
        let fetcher = StaticFetcher::new()
            .with(
                "https://spdx.org/licenses/licenses.json",
                r#"{"licenses": [{"licenseId": "MIT", "detailsUrl": "./MIT.json"}]}"#,
            )
            .with("https://spdx.org/licenses/exceptions.json", r#"{"exceptions": []}"#);
        let options = GenerateOptions {
            source: RegistrySource::json_index(),
            on_failure: FailurePolicy::Propagate,
            ..GenerateOptions::default()
        };

        let (licenses, exceptions) = paths(&tmp);
        let mut refresh = Refresh::new(&fetcher, &options);
        let data = refresh.run(&licenses, &exceptions).await.unwrap();
        assert!(data.licenses.licenses.is_empty());
        assert_eq!(refresh.phase(), RefreshPhase::Idle);
    }
}
