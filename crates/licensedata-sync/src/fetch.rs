//! Content fetching and the caller-level failure policy.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a fetch produced no content.
#[derive(Error, Debug)]
pub enum FetchDiagnostic {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
}

/// Retrieves the raw body behind a URL.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchDiagnostic>;
}

/// [`ContentFetcher`] over plain HTTP GET requests.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies, user agent).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchDiagnostic> {
        let transport = |source| FetchDiagnostic::Transport {
            url: url.to_string(),
            source,
        };

        debug!(url = %url, "fetching");
        let resp = self.client.get(url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchDiagnostic::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().await.map_err(transport)
    }
}

/// What to do when a fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Continue with empty content.
    #[default]
    UseEmpty,
    /// Try again up to `n` more times, then continue with empty content.
    Retry(u32),
    /// Fail the caller with the diagnostic.
    Propagate,
}

const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Fetch `url`, applying `policy` to failures.
///
/// `Ok(None)` means the fetch failed and the policy chose to degrade to
/// empty content.
pub async fn fetch_with_policy<F: ContentFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    policy: FailurePolicy,
) -> Result<Option<String>, FetchDiagnostic> {
    let attempts = match policy {
        FailurePolicy::Retry(n) => n.saturating_add(1),
        _ => 1,
    };

    let mut attempt = 1;
    loop {
        let diagnostic = match fetcher.fetch(url).await {
            Ok(body) => return Ok(Some(body)),
            Err(diagnostic) => diagnostic,
        };
        if attempt >= attempts {
            return match policy {
                FailurePolicy::Propagate => Err(diagnostic),
                _ => {
                    warn!(url = %url, error = %diagnostic, "could not download content, continuing with none");
                    Ok(None)
                }
            };
        }
        warn!(url = %url, attempt, error = %diagnostic, "fetch failed, retrying");
        tokio::time::sleep(RETRY_BACKOFF * attempt).await;
        attempt += 1;
    }
}
