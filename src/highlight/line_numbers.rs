// src/highlight/line_numbers.rs
// =============================================================================
// The built-in line numberer.
//
// Produces the same table layout as the highlightjs-line-numbers plugin, so
// its stylesheet rules (.hljs-ln, .hljs-ln-numbers, .hljs-ln-n::before, ...)
// apply unchanged:
//
//   <table class="hljs-ln"><tbody>
//     <tr>
//       <td class="hljs-ln-line hljs-ln-numbers" data-line-number="10">
//         <div class="hljs-ln-n" data-line-number="10"></div></td>
//       <td class="hljs-ln-line hljs-ln-code" data-line-number="10">...</td>
//     </tr>
//   </tbody></table>
//
// A single line is numbered too (the plugin's `singleLine: true`).
// =============================================================================

use async_trait::async_trait;
use std::fmt::Write;
use std::sync::Arc;

use super::capability::CapabilitySource;
use super::LineNumberer;
use crate::error::EmbedError;

pub struct TableLineNumberer;

impl LineNumberer for TableLineNumberer {
    fn number_lines(&self, html: &str, start_from: usize) -> String {
        let mut lines: Vec<&str> = html.split('\n').collect();
        // A trailing newline does not get a numbered empty row
        if lines.len() > 1 && lines.last().map_or(false, |l| l.trim().is_empty()) {
            lines.pop();
        }

        let mut out = String::from("<table class=\"hljs-ln\"><tbody>");
        for (offset, line) in lines.iter().enumerate() {
            let n = start_from + offset;
            // Writing into a String cannot fail
            let _ = write!(
                out,
                "<tr><td class=\"hljs-ln-line hljs-ln-numbers\" data-line-number=\"{n}\">\
                 <div class=\"hljs-ln-n\" data-line-number=\"{n}\"></div></td>\
                 <td class=\"hljs-ln-line hljs-ln-code\" data-line-number=\"{n}\">{line}</td></tr>"
            );
        }
        out.push_str("</tbody></table>");
        out
    }
}

// The line numberer needs no resource, so loading it always succeeds
pub struct BuiltinLineNumbers;

#[async_trait]
impl CapabilitySource<dyn LineNumberer> for BuiltinLineNumbers {
    fn describe(&self) -> String {
        "line-number plugin".to_string()
    }

    async fn load(&self) -> Result<Arc<dyn LineNumberer>, EmbedError> {
        Ok(Arc::new(TableLineNumberer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn numbers(html: &str) -> Vec<String> {
        let fragment = Html::parse_fragment(html);
        let selector = Selector::parse("td.hljs-ln-numbers").unwrap();
        fragment
            .select(&selector)
            .filter_map(|td| td.value().attr("data-line-number").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_numbers_start_from_given_line() {
        let html = TableLineNumberer.number_lines("a\nb\nc", 10);
        assert_eq!(numbers(&html), vec!["10", "11", "12"]);
    }

    #[test]
    fn test_single_line_is_numbered() {
        let html = TableLineNumberer.number_lines("only", 1);
        assert_eq!(numbers(&html), vec!["1"]);
        assert!(html.contains("data-line-number=\"1\">only</td>"));
    }

    #[test]
    fn test_trailing_newline_is_dropped() {
        let html = TableLineNumberer.number_lines("a\nb\n", 1);
        assert_eq!(numbers(&html), vec!["1", "2"]);
    }

    #[test]
    fn test_markup_is_kept_per_row() {
        let html = TableLineNumberer.number_lines("<span class=\"hljs-keyword\">fn</span>\nx", 1);
        let fragment = Html::parse_fragment(&html);
        let selector = Selector::parse("td.hljs-ln-code span.hljs-keyword").unwrap();
        assert_eq!(fragment.select(&selector).count(), 1);
    }
}
