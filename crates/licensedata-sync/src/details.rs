//! Per-item detail documents for the JSON index source.
//!
//! Items are fetched in fixed-size batches, strictly one batch after another.
//! An item whose detail document cannot be used is retried against its RDF
//! fallback document; if that fails too the item is dropped with a warning.

use futures::future::join_all;
use licensedata_core::{ExceptionDetails, LicenseDetails};
use licensedata_registry::json::{self, IndexEntry};
use licensedata_registry::{ConvertError, ListedEntry, convert_document, parse_document};
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::fetch::{ContentFetcher, FailurePolicy, fetch_with_policy};

/// Maximum in-flight detail requests.
pub const DETAIL_BATCH_SIZE: usize = 10;

const RDF_FALLBACK_BASE: &str =
    "https://raw.githubusercontent.com/spdx/license-list-data/main/rdfxml/";

/// Converted details plus the URL of the document they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub details: T,
    pub source: String,
}

/// RDF document equivalent to a JSON detail document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub url: String,
    pub id: String,
}

/// Rewrite `…/<id>.json` to the RDF/XML copy of the same entry.
pub fn fallback_for(details_url: &str) -> Option<Fallback> {
    let last = details_url.rsplit('/').next()?;
    let id = last.strip_suffix(".json").filter(|id| !id.is_empty())?;
    Some(Fallback {
        url: format!("{RDF_FALLBACK_BASE}{id}.rdf"),
        id: id.to_string(),
    })
}

/// Resolve a possibly relative `detailsUrl` against the index it came from.
pub fn resolve_details_url(index_url: &str, details_url: &str) -> String {
    match Url::parse(index_url).and_then(|base| base.join(details_url)) {
        Ok(url) => url.into(),
        Err(e) => {
            debug!(index_url, details_url, error = %e, "could not resolve detailsUrl");
            details_url.to_string()
        }
    }
}

pub async fn license_details<F: ContentFetcher + ?Sized>(
    fetcher: &F,
    entries: &[IndexEntry],
    policy: FailurePolicy,
) -> Vec<Sourced<LicenseDetails>> {
    let kind: DetailKind<LicenseDetails> = DetailKind {
        from_json: json::convert_license,
        from_document: |entry| match entry {
            ListedEntry::License(details) => Some(details),
            ListedEntry::Exception(_) => None,
        },
    };
    fetch_in_batches(fetcher, entries, policy, &kind).await
}

pub async fn exception_details<F: ContentFetcher + ?Sized>(
    fetcher: &F,
    entries: &[IndexEntry],
    policy: FailurePolicy,
) -> Vec<Sourced<ExceptionDetails>> {
    let kind: DetailKind<ExceptionDetails> = DetailKind {
        from_json: json::convert_exception,
        from_document: |entry| match entry {
            ListedEntry::Exception(details) => Some(details),
            ListedEntry::License(_) => None,
        },
    };
    fetch_in_batches(fetcher, entries, policy, &kind).await
}

struct DetailKind<T> {
    from_json: fn(Option<&str>, &Map<String, Value>) -> Result<T, ConvertError>,
    from_document: fn(ListedEntry) -> Option<T>,
}

async fn fetch_in_batches<F, T>(
    fetcher: &F,
    entries: &[IndexEntry],
    policy: FailurePolicy,
    kind: &DetailKind<T>,
) -> Vec<Sourced<T>>
where
    F: ContentFetcher + ?Sized,
{
    let mut collected = Vec::with_capacity(entries.len());
    for (n, batch) in entries.chunks(DETAIL_BATCH_SIZE).enumerate() {
        let results = join_all(
            batch
                .iter()
                .map(|entry| fetch_one(fetcher, entry, policy, kind)),
        )
        .await;
        let before = collected.len();
        collected.extend(results.into_iter().flatten());
        debug!(
            batch = n,
            requested = batch.len(),
            converted = collected.len() - before,
            "detail batch done"
        );
    }
    collected
}

async fn fetch_one<F, T>(
    fetcher: &F,
    entry: &IndexEntry,
    policy: FailurePolicy,
    kind: &DetailKind<T>,
) -> Option<Sourced<T>>
where
    F: ContentFetcher + ?Sized,
{
    let raw = fetch_body(fetcher, &entry.details_url, policy).await;
    let primary = json::parse_object(&raw)
        .map_err(|e| e.to_string())
        .and_then(|object| (kind.from_json)(Some(entry.id.as_str()), &object).map_err(|e| e.to_string()));
    match primary {
        Ok(details) => {
            return Some(Sourced {
                details,
                source: entry.details_url.clone(),
            });
        }
        Err(reason) => {
            debug!(id = %entry.id, url = %entry.details_url, %reason, "detail document unusable");
        }
    }

    let Some(fallback) = fallback_for(&entry.details_url) else {
        warn!(id = %entry.id, url = %entry.details_url, "no usable detail document, dropping entry");
        return None;
    };
    let raw = fetch_body(fetcher, &fallback.url, policy).await;
    let converted = parse_document(&raw)
        .map_err(|e| e.to_string())
        .and_then(|doc| convert_document(&doc, &fallback.id).map_err(|e| e.to_string()));
    match converted {
        Ok(Some(listed)) => match (kind.from_document)(listed) {
            Some(details) => Some(Sourced {
                details,
                source: fallback.url,
            }),
            None => {
                warn!(id = %entry.id, url = %fallback.url, "fallback document holds the other entry kind, dropping entry");
                None
            }
        },
        Ok(None) => {
            warn!(id = %entry.id, url = %fallback.url, "fallback document holds no entry, dropping entry");
            None
        }
        Err(reason) => {
            warn!(id = %entry.id, url = %fallback.url, %reason, "fallback document unusable, dropping entry");
            None
        }
    }
}

/// Per-item failures never abort the batch, whatever the policy.
async fn fetch_body<F: ContentFetcher + ?Sized>(fetcher: &F, url: &str, policy: FailurePolicy) -> String {
    match fetch_with_policy(fetcher, url, policy).await {
        Ok(body) => body.unwrap_or_default(),
        Err(e) => {
            debug!(url, error = %e, "detail fetch failed");
            String::new()
        }
    }
}
