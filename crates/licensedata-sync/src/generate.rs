//! Generation entry point: refresh stale documents, then read both back.

use std::path::Path;

use chrono::Utc;
use licensedata_store::{needs_update, read_document, staleness_threshold};
use tracing::debug;

use crate::fetch::{ContentFetcher, HttpFetcher};
use crate::options::GenerateOptions;
use crate::refresh::{GeneratedLicenseData, Refresh, RefreshError};

/// Generates license data through a [`ContentFetcher`].
pub struct Generator<F = HttpFetcher> {
    fetcher: F,
}

impl Generator<HttpFetcher> {
    pub fn new() -> Self {
        Self {
            fetcher: HttpFetcher::new(),
        }
    }
}

impl Default for Generator<HttpFetcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ContentFetcher> Generator<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Create or update both documents and return their contents.
    ///
    /// A refresh runs when either file is missing, older than
    /// `update_frequency_hours`, or not valid JSON. Both files are then read
    /// back from disk.
    pub async fn generate(
        &self,
        licenses_path: &Path,
        exceptions_path: &Path,
        options: &GenerateOptions,
    ) -> Result<GeneratedLicenseData, RefreshError> {
        let threshold = staleness_threshold(Utc::now(), options.update_frequency_hours);
        if needs_update(licenses_path, threshold) || needs_update(exceptions_path, threshold) {
            Refresh::new(&self.fetcher, options)
                .run(licenses_path, exceptions_path)
                .await?;
            progress!(
                options.verbose,
                licenses = %licenses_path.display(),
                exceptions = %exceptions_path.display(),
                "updated license and exception files"
            );
        } else {
            debug!(%threshold, "license data is fresh, skipping refresh");
        }

        Ok(GeneratedLicenseData {
            licenses: read_document(licenses_path)
                .await
                .map_err(RefreshError::Read)?,
            exceptions: read_document(exceptions_path)
                .await
                .map_err(RefreshError::Read)?,
        })
    }
}

/// [`Generator::generate`] over HTTP.
pub async fn generate(
    licenses_path: &Path,
    exceptions_path: &Path,
    options: &GenerateOptions,
) -> Result<GeneratedLicenseData, RefreshError> {
    Generator::new()
        .generate(licenses_path, exceptions_path, options)
        .await
}
