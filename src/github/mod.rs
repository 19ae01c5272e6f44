// src/github/mod.rs
// =============================================================================
// This module handles fetching raw files from GitHub.
//
// Currently implements:
// - The Fetcher trait the pipeline fetches through
// - HttpFetcher, a reqwest-backed implementation
//
// Building the raw.githubusercontent.com URL from a file URL happens during
// target resolution (see resolve::target), this module only fetches.
// =============================================================================

mod fetch;

// Re-export the fetcher types from fetch.rs
pub use fetch::{Fetcher, HttpFetcher};

#[cfg(test)]
pub(crate) mod testing;
