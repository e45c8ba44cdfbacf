//! Sync layer: registry fetching, refresh orchestration and generation.

/// Progress messages: `info` when verbose, `debug` otherwise.
macro_rules! progress {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            ::tracing::info!($($arg)+)
        } else {
            ::tracing::debug!($($arg)+)
        }
    };
}

pub mod details;
pub mod fetch;
pub mod generate;
pub mod options;
pub mod refresh;

#[cfg(test)]
mod testing;

pub use fetch::{ContentFetcher, FailurePolicy, FetchDiagnostic, HttpFetcher, fetch_with_policy};
pub use generate::{Generator, generate};
pub use options::{
    DEFAULT_UPDATE_FREQUENCY_HOURS, GenerateOptions, RegistrySource, SPDX_EXCEPTIONS_INDEX_URL,
    SPDX_LICENSES_INDEX_URL, SPDX_LICENSES_RDF_URL,
};
pub use refresh::{GeneratedLicenseData, Refresh, RefreshError, RefreshPhase};
