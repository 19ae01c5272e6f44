// src/github/testing.rs
// In-memory fetchers for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::Fetcher;
use crate::error::EmbedError;

// Serves canned files; any other URL is a 404
#[derive(Default)]
pub struct StaticFetcher {
    files: HashMap<String, String>,
    delay: Option<Duration>,
    pub requests: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, url: &str, content: &str) -> Self {
        self.files.insert(url.to_string(), content.to_string());
        self
    }

    // Every response waits this long first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, EmbedError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.files.get(url).cloned().ok_or_else(|| EmbedError::Fetch {
            status: 404,
            status_text: "Not Found".to_string(),
        })
    }
}
