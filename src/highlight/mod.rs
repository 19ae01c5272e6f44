// src/highlight/mod.rs
// =============================================================================
// Syntax highlighting and line numbering, seen from the pipeline as two
// opaque capabilities:
//
// - Highlighter: code text + language hint -> highlighted HTML
// - LineNumberer: code HTML + first line number -> line-numbered HTML
//
// The pipeline never looks them up globally. It gets a Capabilities value
// that loads each one lazily, once, no matter how many embeds ask for it.
//
// Submodules:
// - capability: the lazy single-flight loader and the Capabilities handle
// - classed: the default highlighter, syntect with hljs-* classes
// - syntaxes: loading the syntax definitions the highlighter runs on
// - line_numbers: the built-in line numberer
// =============================================================================

mod capability;
mod classed;
mod line_numbers;
mod syntaxes;

pub use capability::{Capabilities, CapabilitySource};
pub use syntaxes::SyntaxLoader;
pub use line_numbers::{BuiltinLineNumbers, TableLineNumberer};

#[cfg(test)]
pub(crate) mod testing;

// Turns plain code into highlighted markup
//
// The returned string must be valid HTML: the input is raw text and anything
// that is not markup has to come out escaped.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> String;
}

// Adds line numbers to already-escaped (and possibly highlighted) markup
pub trait LineNumberer: Send + Sync {
    fn number_lines(&self, html: &str, start_from: usize) -> String;
}

// Escapes text for use inside HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
