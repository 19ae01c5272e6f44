// src/pipeline/render.rs
// =============================================================================
// Builds the HTML that goes into a placeholder.
//
// Success and failure share one routine. A failure is just a render of the
// error message with language "plaintext" and no line selection.
//
// Layout of one snippet:
//
//   <div style="margin:1em 0">
//     <div style="white-space:pre;tab-size:8">      <- a stand-in <pre> that
//       <code class="py hljs" style="...">...</code>   page CSS won't restyle
//     </div>
//     <div class="file-meta file-meta-light">      <- only with show_file_meta
//       <a ... style="float:right">view raw</a>
//       <a ...>GitHub: user/repo/branch/path</a>
//     </div>
//   </div>
// =============================================================================

use std::fmt::Write;

use crate::config::EmbedConfig;
use crate::highlight::{escape_html, Capabilities};
use crate::resolve::{EmbedRequest, LineSelection};

const LIGHT_BORDER: &str = "#ddd";
const DARK_BORDER: &str = "#555";

// The two links of the metadata block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaLinks {
    pub raw_file_url: String,
    pub target_url: String,
    pub label: String,
}

// Display options for one snippet, independent of what is shown in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub is_dark_style: bool,
    pub show_border: bool,
    pub show_line_numbers: bool,
    pub show_file_meta: bool,
    pub tab_size: u32,
    /// None when the target never resolved, in which case there is no meta block
    pub links: Option<MetaLinks>,
}

impl Frame {
    pub fn for_request(request: &EmbedRequest) -> Self {
        Frame {
            is_dark_style: request.is_dark_style,
            show_border: request.show_border,
            show_line_numbers: request.show_line_numbers,
            show_file_meta: request.show_file_meta,
            tab_size: request.tab_size,
            links: Some(MetaLinks {
                raw_file_url: request.raw_file_url.clone(),
                target_url: request.target_url.clone(),
                label: request.display_label().to_string(),
            }),
        }
    }

    // Used when the target could not be resolved into a request
    pub fn for_config(config: &EmbedConfig) -> Self {
        Frame {
            is_dark_style: crate::resolve::is_dark_style(&config.style),
            show_border: config.show_border,
            show_line_numbers: config.show_line_numbers,
            show_file_meta: config.show_file_meta,
            tab_size: crate::resolve::DEFAULT_TAB_SIZE,
            links: None,
        }
    }

    fn border_colour(&self) -> &'static str {
        if self.is_dark_style {
            DARK_BORDER
        } else {
            LIGHT_BORDER
        }
    }
}

// Renders one snippet
//
// Highlighting and line numbering only happen if the capability is loaded;
// a failure render after a failed highlighter load stays plain text.
pub fn render_snippet(
    frame: &Frame,
    code_text: &str,
    language: &str,
    selection: LineSelection,
    capabilities: &Capabilities,
) -> String {
    let selected = selection.apply(code_text);

    let (mut body, highlighted) = match capabilities.highlighter() {
        Some(highlighter) => (highlighter.highlight(&selected, language), true),
        None => (escape_html(&selected), false),
    };

    if frame.show_line_numbers {
        if let Some(numberer) = capabilities.line_numberer() {
            body = numberer.number_lines(&body, selection.first_line_number());
        }
    }

    let show_meta = frame.show_file_meta && frame.links.is_some();
    let border_radius = if show_meta { "0.3rem 0.3rem 0 0" } else { "0.3rem" };
    let mut code_style = format!("padding:1rem;border-radius:{}", border_radius);
    if frame.show_border {
        let _ = write!(code_style, ";border:1px solid {}", frame.border_colour());
    }
    let code_class = if highlighted {
        format!("{} hljs", escape_html(language))
    } else {
        escape_html(language)
    };

    let mut out = String::new();
    out.push_str("<div style=\"margin:1em 0\">");
    let _ = write!(
        out,
        "<div style=\"white-space:pre;tab-size:{}\"><code class=\"{}\" style=\"{}\">{}</code></div>",
        frame.tab_size, code_class, code_style, body
    );
    if show_meta {
        if let Some(links) = &frame.links {
            out.push_str(&render_meta(frame, links));
        }
    }
    out.push_str("</div>");
    out
}

fn render_meta(frame: &Frame, links: &MetaLinks) -> String {
    let theme_class = if frame.is_dark_style {
        "file-meta-dark"
    } else {
        "file-meta-light"
    };
    let style = if frame.show_border {
        format!(" style=\"border:1px solid {};border-top:0\"", frame.border_colour())
    } else {
        String::new()
    };

    format!(
        "<div class=\"file-meta {}\"{}>\
         <a target=\"_blank\" href=\"{}\" style=\"float:right\">view raw</a>\
         <a target=\"_blank\" href=\"{}\">GitHub: {}</a>\
         </div>",
        theme_class,
        style,
        escape_html(&links.raw_file_url),
        escape_html(&links.target_url),
        escape_html(&links.label),
    )
}

// Stylesheet links followed by the filled placeholders
//
// With `full_page` the result is a complete HTML document.
pub fn render_document(placeholders: &[String], config: &EmbedConfig, full_page: bool) -> String {
    let mut links = String::new();
    for href in config.stylesheet_urls() {
        let _ = writeln!(links, "<link rel=\"stylesheet\" href=\"{}\">", escape_html(&href));
    }
    let body = placeholders.join("\n");

    if full_page {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{}</head>\n<body>\n{}\n</body>\n</html>\n",
            links, body
        )
    } else {
        format!("{}{}\n", links, body)
    }
}
