// src/highlight/syntaxes.rs
// =============================================================================
// Loading the syntax definitions the highlighter runs on.
//
// The base is syntect's bundled set (the Sublime Text default packages,
// compiled into the binary). On top of it the user can add definitions with
// --grammar or the `grammar` config key:
// - a URL to a .sublime-syntax file, fetched through the same Fetcher as the
//   raw files
// - a path to a .sublime-syntax file
// - a path to a folder, every .sublime-syntax file in it is added
//
// This is the "load the highlighter" step of the pipeline, so it can fail
// (as EmbedError::ResourceLoad) and runs at most once per run (see
// highlight::capability).
// =============================================================================

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use syntect::parsing::{SyntaxDefinition, SyntaxSet};
use tracing::info;

use super::capability::CapabilitySource;
use super::classed::ClassedHighlighter;
use super::Highlighter;
use crate::config::GrammarSource;
use crate::error::EmbedError;
use crate::github::Fetcher;

// What gets added on top of the bundled syntaxes
enum ExtraSyntaxes {
    None,
    /// The text of one .sublime-syntax file
    Definition(String),
    Folder(PathBuf),
}

// Builds the highlighter from the configured grammar source
pub struct SyntaxLoader {
    source: GrammarSource,
    fetcher: Arc<dyn Fetcher>,
}

impl SyntaxLoader {
    pub fn new(source: GrammarSource, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { source, fetcher }
    }

    async fn read_extra(&self) -> Result<ExtraSyntaxes, EmbedError> {
        match &self.source {
            GrammarSource::Bundled => Ok(ExtraSyntaxes::None),
            // A failed fetch of a definition is a resource failure, not a file failure
            GrammarSource::Remote(url) => self
                .fetcher
                .fetch_text(url)
                .await
                .map(ExtraSyntaxes::Definition)
                .map_err(|e| self.load_error(e.to_string())),
            GrammarSource::File(path) => {
                let metadata = tokio::fs::metadata(path)
                    .await
                    .map_err(|e| self.load_error(e.to_string()))?;
                if metadata.is_dir() {
                    return Ok(ExtraSyntaxes::Folder(path.clone()));
                }
                tokio::fs::read_to_string(path)
                    .await
                    .map(ExtraSyntaxes::Definition)
                    .map_err(|e| self.load_error(e.to_string()))
            }
        }
    }

    fn load_error(&self, reason: String) -> EmbedError {
        EmbedError::ResourceLoad {
            resource: self.describe(),
            reason,
        }
    }
}

// Deserialising the bundled set and linking the syntaxes is CPU work,
// so this runs on the blocking pool
fn build_syntax_set(extra: ExtraSyntaxes) -> Result<SyntaxSet, String> {
    let bundled = SyntaxSet::load_defaults_newlines();
    match extra {
        ExtraSyntaxes::None => Ok(bundled),
        ExtraSyntaxes::Definition(text) => {
            let definition = SyntaxDefinition::load_from_str(&text, true, None).map_err(|e| e.to_string())?;
            let mut builder = bundled.into_builder();
            builder.add(definition);
            Ok(builder.build())
        }
        ExtraSyntaxes::Folder(path) => {
            let mut builder = bundled.into_builder();
            builder.add_from_folder(&path, true).map_err(|e| e.to_string())?;
            Ok(builder.build())
        }
    }
}

#[async_trait]
impl CapabilitySource<dyn Highlighter> for SyntaxLoader {
    fn describe(&self) -> String {
        match &self.source {
            GrammarSource::Bundled => "bundled syntaxes".to_string(),
            GrammarSource::Remote(url) => format!("syntax definition {}", url),
            GrammarSource::File(path) => format!("syntax definitions {}", path.display()),
        }
    }

    async fn load(&self) -> Result<Arc<dyn Highlighter>, EmbedError> {
        let extra = self.read_extra().await?;
        let syntaxes = tokio::task::spawn_blocking(move || build_syntax_set(extra))
            .await
            .map_err(|e| self.load_error(e.to_string()))?
            .map_err(|reason| self.load_error(reason))?;

        let highlighter = ClassedHighlighter::new(syntaxes);
        info!("loaded {} ({} syntaxes)", self.describe(), highlighter.syntax_count());
        Ok(Arc::new(highlighter))
    }
}
