// src/github/fetch.rs
// =============================================================================
// This module fetches raw file contents over HTTP.
//
// Strategy:
// - One GET per file, no retries, whole body read into a String
// - raw.githubusercontent.com serves the file as plain text, so no API token
//   or JSON decoding is needed
// - Non-2xx answers become EmbedError::Fetch carrying status code and reason
// - Requests that never complete become EmbedError::Network, or
//   EmbedError::Timeout when the client gave up waiting
//
// The pipeline only sees the Fetcher trait, so tests can swap in a fetcher
// that serves canned files without touching the network.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::EmbedError;

// Anything that can turn a URL into the text behind it
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, EmbedError>;
}

// The real fetcher, backed by a shared reqwest client
//
// Client is cheap to clone (connection pool behind an Arc), so one
// HttpFetcher serves every embed in a run.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, EmbedError> {
        let mut builder = Client::builder()
            .user_agent(concat!("snippet-embed/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| EmbedError::Network(format!("could not create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    // Maps reqwest's error into our taxonomy
    fn classify(&self, error: reqwest::Error) -> EmbedError {
        match (error.is_timeout(), self.timeout) {
            (true, Some(timeout)) => EmbedError::Timeout(timeout),
            _ => EmbedError::Network(error.to_string()),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, EmbedError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbedError::Fetch {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let content = response.text().await.map_err(|e| self.classify(e))?;
        debug!("fetched {} bytes from {}", content.len(), url);
        Ok(content)
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why a trait instead of calling reqwest directly?
//    - The pipeline takes an Arc<dyn Fetcher>
//    - Production passes HttpFetcher, tests pass an in-memory fetcher
//    - #[async_trait] is needed because the trait is used as a trait object
//
// 2. Why canonical_reason()?
//    - HTTP/2 responses carry no reason phrase on the wire
//    - The canonical phrase for the status code ("Not Found" for 404) is what
//      users expect to read
// -----------------------------------------------------------------------------
