// src/highlight/capability.rs
// =============================================================================
// Lazy, load-once access to the highlighter and line numberer.
//
// Every embed in a run shares one Capabilities value (behind an Arc). When
// several embeds ask for the highlighter at the same time, only the first
// actually runs the loader; the others wait on the same tokio OnceCell and see
// its result. A failed load leaves the cell empty, so a later embed may try
// again.
//
// Ordering: the line numberer extends the highlighter, so ensure_line_numbers
// always finishes ensure_highlighter first.
// =============================================================================

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{Highlighter, LineNumberer};
use crate::error::EmbedError;

// Something that can produce a capability, possibly over the network
#[async_trait]
pub trait CapabilitySource<T: ?Sized + Send + Sync + 'static>: Send + Sync {
    // Human-readable name for logs and error messages
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Arc<T>, EmbedError>;
}

struct LazyCapability<T: ?Sized + Send + Sync + 'static> {
    cell: OnceCell<Arc<T>>,
    source: Option<Arc<dyn CapabilitySource<T>>>,
}

impl<T: ?Sized + Send + Sync + 'static> LazyCapability<T> {
    fn from_source(source: Arc<dyn CapabilitySource<T>>) -> Self {
        Self {
            cell: OnceCell::new(),
            source: Some(source),
        }
    }

    fn present(value: Arc<T>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(value)),
            source: None,
        }
    }

    fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    async fn ensure(&self) -> Result<(), EmbedError> {
        // Already there: nothing to load
        if self.cell.get().is_some() {
            return Ok(());
        }
        let source = match &self.source {
            Some(source) => source,
            None => {
                return Err(EmbedError::ResourceLoad {
                    resource: "capability".to_string(),
                    reason: "no source configured".to_string(),
                })
            }
        };

        self.cell
            .get_or_try_init(|| async {
                debug!("loading {}", source.describe());
                source.load().await
            })
            .await
            .map(|_| ())
    }
}

pub struct Capabilities {
    highlighter: LazyCapability<dyn Highlighter>,
    line_numbers: LazyCapability<dyn LineNumberer>,
}

impl Capabilities {
    // Capabilities that load on first use
    pub fn new(
        highlighter: Arc<dyn CapabilitySource<dyn Highlighter>>,
        line_numbers: Arc<dyn CapabilitySource<dyn LineNumberer>>,
    ) -> Self {
        Self {
            highlighter: LazyCapability::from_source(highlighter),
            line_numbers: LazyCapability::from_source(line_numbers),
        }
    }

    // Capabilities that are already present, so every ensure resolves at once
    pub fn preloaded(highlighter: Arc<dyn Highlighter>, line_numbers: Arc<dyn LineNumberer>) -> Self {
        Self {
            highlighter: LazyCapability::present(highlighter),
            line_numbers: LazyCapability::present(line_numbers),
        }
    }

    pub async fn ensure_highlighter(&self) -> Result<(), EmbedError> {
        self.highlighter.ensure().await
    }

    pub async fn ensure_line_numbers(&self) -> Result<(), EmbedError> {
        self.ensure_highlighter().await?;
        self.line_numbers.ensure().await
    }

    pub fn highlighter(&self) -> Option<&Arc<dyn Highlighter>> {
        self.highlighter.get()
    }

    pub fn line_numberer(&self) -> Option<&Arc<dyn LineNumberer>> {
        self.line_numbers.get()
    }
}
