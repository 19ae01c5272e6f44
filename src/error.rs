// src/error.rs
// =============================================================================
// Error types for the embed pipeline.
//
// Every failure that can happen while embedding a file ends up here:
// - InvalidTarget: the target URL could not be resolved
// - ResourceLoad: the highlighter or line-number resource failed to load
// - Fetch: the raw file server answered with a non-2xx status
// - Network: the request never completed (DNS, connection reset, ...)
// - Timeout: the request took longer than the configured limit
//
// None of these are recovered from. The pipeline turns each of them into the
// same plain-text failure block, so the Display text is what users see.
// =============================================================================

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmbedError {
    /// The target (or the script source carrying it) is not usable
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// A highlighter resource could not be loaded
    #[error("failed to load {resource}: {reason}")]
    ResourceLoad { resource: String, reason: String },

    /// The server answered, but not with a 2xx status
    #[error("{status} {status_text}")]
    Fetch { status: u16, status_text: String },

    /// The request could not complete at all
    #[error("network error: {0}")]
    Network(String),

    /// The request did not finish in time
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl EmbedError {
    // Short machine-readable name, used in the JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            EmbedError::InvalidTarget(_) => "invalid_target",
            EmbedError::ResourceLoad { .. } => "resource_load",
            EmbedError::Fetch { .. } => "fetch",
            EmbedError::Network(_) => "network",
            EmbedError::Timeout(_) => "timeout",
        }
    }
}
