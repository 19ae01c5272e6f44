// src/pipeline/mod.rs
// =============================================================================
// The fetch-and-render pipeline.
//
// For each input:
// 1. Create the placeholder (before anything can fail or wait)
// 2. Resolve the input into an EmbedRequest
// 3. Concurrently:
//    - fetch the raw file
//    - ensure the highlighter is loaded, then (if line numbers are on) the
//      line numberer
// 4. Render the file, or on the first error, render the error message
//    through the same routine as plain text
//
// Many inputs run concurrently; they share one Fetcher and one Capabilities,
// so the highlighter resource is loaded once per run, not once per embed.
// =============================================================================

mod placeholder;
mod render;

pub use placeholder::{EmbedState, RenderedEmbed};
pub use render::render_document;

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EmbedConfig;
use crate::error::EmbedError;
use crate::github::Fetcher;
use crate::highlight::Capabilities;
use crate::resolve::{read_script_src, resolve, EmbedRequest, InputKind, LineSelection};
use placeholder::Placeholder;
use render::{render_snippet, Frame};

const FAILURE_LANGUAGE: &str = "plaintext";

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    capabilities: Arc<Capabilities>,
    config: EmbedConfig,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, capabilities: Arc<Capabilities>, config: EmbedConfig) -> Self {
        Self {
            fetcher,
            capabilities,
            config,
        }
    }

    // Embeds every input concurrently, returning results in input order
    pub async fn embed_all(&self, inputs: &[String], kind: InputKind) -> Vec<RenderedEmbed> {
        join_all(inputs.iter().map(|input| self.embed(input, kind))).await
    }

    // Runs one embed to its terminal state; this never fails, errors are rendered
    pub async fn embed(&self, input: &str, kind: InputKind) -> RenderedEmbed {
        let mut placeholder = Placeholder::new();
        debug!(id = placeholder.id(), state = ?placeholder.state(), "created placeholder for {}", input);

        let request = match resolve(input, kind, &self.config) {
            Ok(request) => request,
            Err(e) => {
                warn!("could not resolve {}: {}", input, e);
                let message = format!("Failed to process {}\n{}", input, e);
                let content = render_snippet(
                    &Frame::for_config(&self.display_config(input, kind)),
                    &message,
                    FAILURE_LANGUAGE,
                    LineSelection::Whole,
                    &self.capabilities,
                );
                return placeholder.fill(input, None, content, Some(&e));
            }
        };

        placeholder.start_loading();
        debug!(id = placeholder.id(), state = ?placeholder.state(), "fetching {}", request.raw_file_url);
        let frame = Frame::for_request(&request);

        match self.load(&request).await {
            Ok(text) => {
                info!("rendered {} ({} bytes)", request.raw_file_url, text.len());
                let content = render_snippet(
                    &frame,
                    &text,
                    &request.file_extension,
                    request.selection,
                    &self.capabilities,
                );
                placeholder.fill(input, Some(&request.raw_file_url), content, None)
            }
            Err(e) => {
                warn!("failed to process {}: {}", request.raw_file_url, e);
                let message = format!("Failed to process {}\n{}", request.raw_file_url, e);
                let content = render_snippet(
                    &frame,
                    &message,
                    FAILURE_LANGUAGE,
                    LineSelection::Whole,
                    &self.capabilities,
                );
                placeholder.fill(input, Some(&request.raw_file_url), content, Some(&e))
            }
        }
    }

    // Display options for an input that did not resolve
    //
    // A script URL may still carry readable overrides even when its target
    // is unusable, so those are kept.
    fn display_config(&self, input: &str, kind: InputKind) -> EmbedConfig {
        match kind {
            InputKind::ScriptSrc => match read_script_src(input, &self.config) {
                Ok((_, config)) => config,
                Err(_) => self.config.clone(),
            },
            InputKind::Target => self.config.clone(),
        }
    }

    // The join: the file text once the fetch and every needed load succeeded
    async fn load(&self, request: &EmbedRequest) -> Result<String, EmbedError> {
        let capabilities = async {
            if request.show_line_numbers {
                // Loads the highlighter first, then the line numberer
                self.capabilities.ensure_line_numbers().await
            } else {
                self.capabilities.ensure_highlighter().await
            }
        };

        let (text, ()) = futures::try_join!(self.fetch_raw(&request.raw_file_url), capabilities)?;
        Ok(text)
    }

    async fn fetch_raw(&self, url: &str) -> Result<String, EmbedError> {
        match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch_text(url))
                .await
                .map_err(|_| EmbedError::Timeout(limit))?,
            None => self.fetcher.fetch_text(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::StaticFetcher;
    use crate::highlight::testing::{CountingSource, TaggingHighlighter};
    use crate::highlight::{BuiltinLineNumbers, TableLineNumberer};
    use scraper::{Html, Selector};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const TARGET: &str = "https://github.com/acme/demo/blob/main/src/app.py";
    const RAW: &str = "https://raw.githubusercontent.com/acme/demo/main/src/app.py";

    fn file_text(lines: usize) -> String {
        (1..=lines).map(|n| format!("line {}", n)).collect::<Vec<_>>().join("\n")
    }

    fn preloaded() -> Arc<Capabilities> {
        Arc::new(Capabilities::preloaded(
            Arc::new(TaggingHighlighter),
            Arc::new(TableLineNumberer),
        ))
    }

    fn no_line_numbers() -> EmbedConfig {
        EmbedConfig {
            show_line_numbers: false,
            ..EmbedConfig::default()
        }
    }

    fn code_text(html: &str) -> String {
        let doc = Html::parse_fragment(html);
        let selector = Selector::parse("code").unwrap();
        doc.select(&selector).map(|e| e.text().collect::<String>()).collect()
    }

    #[tokio::test]
    async fn test_range_selection_end_to_end() {
        let fetcher = Arc::new(StaticFetcher::new().with_file(RAW, &file_text(30)));
        let pipeline = Pipeline::new(fetcher, preloaded(), no_line_numbers());

        let rendered = pipeline.embed(&format!("{}#L10-L20", TARGET), InputKind::Target).await;
        assert_eq!(rendered.state, EmbedState::RenderedSuccess);
        assert_eq!(rendered.raw_file_url.as_deref(), Some(RAW));

        let expected = (10..=20).map(|n| format!("line {}", n)).collect::<Vec<_>>().join("\n");
        assert_eq!(code_text(&rendered.content), format!("[py]{}", expected));
    }

    #[tokio::test]
    async fn test_no_fragment_renders_whole_file() {
        let text = file_text(5);
        let fetcher = Arc::new(StaticFetcher::new().with_file(RAW, &text));
        let pipeline = Pipeline::new(fetcher, preloaded(), no_line_numbers());

        let rendered = pipeline.embed(TARGET, InputKind::Target).await;
        assert!(rendered.is_ok());
        assert_eq!(code_text(&rendered.content), format!("[py]{}", text));
    }

    #[tokio::test]
    async fn test_not_found_renders_plain_failure() {
        let caps = Arc::new(Capabilities::new(
            Arc::new(CountingSource::new(false)),
            Arc::new(BuiltinLineNumbers),
        ));
        let pipeline = Pipeline::new(Arc::new(StaticFetcher::new()), caps, EmbedConfig::default());

        let rendered = pipeline.embed(TARGET, InputKind::Target).await;
        assert_eq!(rendered.state, EmbedState::RenderedError);
        assert_eq!(rendered.error.as_ref().unwrap().kind, "fetch");

        let text = code_text(&rendered.content);
        assert!(text.contains("404"));
        assert!(text.contains(RAW));
        // The error goes through the plaintext path: no token markup
        assert!(!rendered.content.contains("hljs-keyword"));
        assert!(rendered.content.contains("class=\"plaintext"));
    }

    #[tokio::test]
    async fn test_highlighter_failure_renders_unhighlighted_error() {
        let caps = Arc::new(Capabilities::new(
            Arc::new(CountingSource::new(true)),
            Arc::new(BuiltinLineNumbers),
        ));
        let fetcher = Arc::new(StaticFetcher::new().with_file(RAW, "print(1)"));
        let pipeline = Pipeline::new(fetcher, caps, EmbedConfig::default());

        let rendered = pipeline.embed(TARGET, InputKind::Target).await;
        assert_eq!(rendered.state, EmbedState::RenderedError);
        assert_eq!(rendered.error.as_ref().unwrap().kind, "resource_load");
        assert!(rendered.content.contains("<code class=\"plaintext\""));
        assert!(!rendered.content.contains("hljs-ln"));
    }

    #[tokio::test]
    async fn test_concurrent_embeds_of_same_target() {
        let fetcher = Arc::new(StaticFetcher::new().with_file(RAW, "x = 1"));
        let source = Arc::new(CountingSource::new(false));
        let caps = Arc::new(Capabilities::new(source.clone(), Arc::new(BuiltinLineNumbers)));
        let pipeline = Pipeline::new(fetcher.clone(), caps, EmbedConfig::default());

        let inputs = vec![TARGET.to_string(), TARGET.to_string()];
        let rendered = pipeline.embed_all(&inputs, InputKind::Target).await;

        assert_eq!(rendered.len(), 2);
        assert_ne!(rendered[0].placeholder_id, rendered[1].placeholder_id);
        assert!(rendered.iter().all(|r| r.state == EmbedState::RenderedSuccess));
        // Both files were fetched, the highlighter was loaded once
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 2);
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_line_numbers_follow_selection() {
        let fetcher = Arc::new(StaticFetcher::new().with_file(RAW, &file_text(10)));
        let pipeline = Pipeline::new(fetcher, preloaded(), EmbedConfig::default());

        let rendered = pipeline.embed(&format!("{}#L4-L6", TARGET), InputKind::Target).await;
        let doc = Html::parse_fragment(&rendered.content);
        let selector = Selector::parse("td.hljs-ln-numbers").unwrap();
        let numbers: Vec<&str> = doc
            .select(&selector)
            .filter_map(|td| td.value().attr("data-line-number"))
            .collect();
        assert_eq!(numbers, vec!["4", "5", "6"]);
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_file(RAW, "x")
                .with_delay(Duration::from_secs(5)),
        );
        let mut pipeline = Pipeline::new(fetcher, preloaded(), EmbedConfig::default());
        pipeline.config.timeout_secs = 1;

        let started = std::time::Instant::now();
        let rendered = pipeline.embed(TARGET, InputKind::Target).await;
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(rendered.error.as_ref().unwrap().kind, "timeout");
        assert!(code_text(&rendered.content).contains("timed out after 1s"));
    }

    #[tokio::test]
    async fn test_invalid_target_still_fills_placeholder() {
        let fetcher = Arc::new(StaticFetcher::new());
        let pipeline = Pipeline::new(fetcher.clone(), preloaded(), EmbedConfig::default());

        let rendered = pipeline.embed("https://github.com/acme", InputKind::Target).await;
        assert_eq!(rendered.state, EmbedState::RenderedError);
        assert_eq!(rendered.error.as_ref().unwrap().kind, "invalid_target");
        assert!(rendered.raw_file_url.is_none());
        assert!(code_text(&rendered.content).contains("Failed to process https://github.com/acme"));
        assert!(!rendered.content.contains("file-meta"));
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_script_target_keeps_its_overrides() {
        let fetcher = Arc::new(StaticFetcher::new());
        let pipeline = Pipeline::new(fetcher.clone(), preloaded(), EmbedConfig::default());

        let src = "https://embed.example.com/embed.js?target=https%3A%2F%2Fgithub.com%2Facme&style=monokai";
        let rendered = pipeline.embed(src, InputKind::ScriptSrc).await;
        assert_eq!(rendered.error.as_ref().unwrap().kind, "invalid_target");
        // monokai is dark, so the failure block gets the dark border
        assert!(rendered.content.contains("border:1px solid #555"));

        let src = "https://embed.example.com/embed.js?target=https%3A%2F%2Fgithub.com%2Facme&showBorder=off";
        let rendered = pipeline.embed(src, InputKind::ScriptSrc).await;
        assert!(!rendered.content.contains("border:1px solid"));
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_script_src_input() {
        let fetcher = Arc::new(StaticFetcher::new().with_file(RAW, "a\nb\nc"));
        let pipeline = Pipeline::new(fetcher, preloaded(), no_line_numbers());

        let src = format!(
            "https://embed.example.com/embed.js?target={}&showFileMeta=off",
            "https%3A%2F%2Fgithub.com%2Facme%2Fdemo%2Fblob%2Fmain%2Fsrc%2Fapp.py%23L2"
        );
        let rendered = pipeline.embed(&src, InputKind::ScriptSrc).await;
        assert!(rendered.is_ok());
        assert_eq!(code_text(&rendered.content), "[py]b");
        assert!(!rendered.content.contains("file-meta"));
    }
}
