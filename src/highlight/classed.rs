// src/highlight/classed.rs
// =============================================================================
// The default highlighter, backed by syntect.
//
// syntect parses the code with Sublime Text syntax definitions and emits one
// <span> per scope. With the "hljs-" class prefix, a scope such as
// `comment.line.double-slash.rust` comes out as
//
//   <span class="hljs-comment hljs-line hljs-double-slash hljs-rust">
//
// so highlight.js themes that style .hljs-comment, .hljs-keyword,
// .hljs-string, ... pick it up.
//
// syntect keeps scopes open across lines (the outer `source.*` scope spans the
// whole file, block comments and multi-line strings span several lines). The
// line numberer cuts the markup at '\n' into table rows, so every span is
// closed before a newline and reopened after it.
// =============================================================================

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

use super::{escape_html, Highlighter};

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hljs-" };

pub struct ClassedHighlighter {
    syntaxes: SyntaxSet,
}

impl ClassedHighlighter {
    pub fn new(syntaxes: SyntaxSet) -> Self {
        Self { syntaxes }
    }

    pub fn syntax_count(&self) -> usize {
        self.syntaxes.syntaxes().len()
    }

    fn classed_html(&self, syntax: &SyntaxReference, code: &str) -> Result<String, syntect::Error> {
        let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Highlighter for ClassedHighlighter {
    // The hint is a file extension or a syntax name ("py", "Rust", ...)
    fn highlight(&self, code: &str, language: &str) -> String {
        let syntax = match self.syntaxes.find_syntax_by_token(language) {
            Some(syntax) => syntax,
            None => {
                debug!("no syntax for '{}', escaping only", language);
                return escape_html(code);
            }
        };

        match self.classed_html(syntax, code) {
            Ok(html) => split_spans_at_newlines(&html),
            Err(e) => {
                warn!("could not highlight as {}: {}", syntax.name, e);
                escape_html(code)
            }
        }
    }
}

// Makes every line of the markup balanced on its own
//
// Spans still open at a '\n' are closed before it and reopened on the next
// line. Opening tags are only written once text follows them, so spans
// without content are dropped and a trailing newline leaves an empty last
// line. The input only holds <span ...>, </span> and escaped text, so any
// '<' starts a tag.
fn split_spans_at_newlines(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    // Opening tags of the spans currently open, outermost first
    let mut open: Vec<&str> = Vec::new();
    // How many of them have been written out on the current line
    let mut written = 0;
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('\n') {
            for _ in 0..written {
                out.push_str("</span>");
            }
            out.push('\n');
            written = 0;
            rest = after;
        } else if let Some(after) = rest.strip_prefix("</span>") {
            if written > 0 && written == open.len() {
                out.push_str("</span>");
                written -= 1;
            }
            open.pop();
            rest = after;
        } else if rest.starts_with('<') {
            let end = rest.find('>').map_or(rest.len(), |i| i + 1);
            open.push(&rest[..end]);
            rest = &rest[end..];
        } else {
            let end = rest.find(['<', '\n']).unwrap_or(rest.len());
            reopen(&mut out, &open, &mut written);
            out.push_str(&rest[..end]);
            rest = &rest[end..];
        }
    }

    out
}

fn reopen(out: &mut String, open: &[&str], written: &mut usize) {
    for tag in &open[*written..] {
        out.push_str(tag);
    }
    *written = open.len();
}
