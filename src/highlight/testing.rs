// src/highlight/testing.rs
// Stand-in capabilities for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{escape_html, CapabilitySource, Highlighter};
use crate::error::EmbedError;

// Echoes the input with the language in front, so tests can spot it
pub struct TaggingHighlighter;

impl Highlighter for TaggingHighlighter {
    fn highlight(&self, code: &str, language: &str) -> String {
        format!("[{}]{}", language, escape_html(code))
    }
}

// Counts loads and can be told to fail
pub struct CountingSource {
    pub loads: AtomicUsize,
    pub fail: bool,
}

impl CountingSource {
    pub fn new(fail: bool) -> Self {
        Self {
            loads: AtomicUsize::new(0),
            fail,
        }
    }
}

#[async_trait]
impl CapabilitySource<dyn Highlighter> for CountingSource {
    fn describe(&self) -> String {
        "counting highlighter".to_string()
    }

    async fn load(&self) -> Result<Arc<dyn Highlighter>, EmbedError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Give concurrent callers a chance to pile up on the cell
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail {
            Err(EmbedError::ResourceLoad {
                resource: self.describe(),
                reason: "boom".to_string(),
            })
        } else {
            Ok(Arc::new(TaggingHighlighter))
        }
    }
}
