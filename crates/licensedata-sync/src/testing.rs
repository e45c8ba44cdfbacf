use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{ContentFetcher, FetchDiagnostic};

/// In-memory fetcher: known URLs return their body, everything else a 404.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchDiagnostic> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchDiagnostic::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
