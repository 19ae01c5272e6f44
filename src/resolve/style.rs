// src/resolve/style.rs
// =============================================================================
// Decides whether a highlight.js theme is a dark one.
//
// The rendered border and metadata colours depend on it: dark themes get a
// #555 border and the "file-meta-dark" class, light ones #ddd and
// "file-meta-light".
// =============================================================================

// Dark themes whose names contain none of the marker words below
pub const UNMARKED_DARK_STYLES: &[&str] = &[
    "an-old-hope",
    "androidstudio",
    "arta",
    "codepen-embed",
    "darcula",
    "dracula",
    "far",
    "gml",
    "hopscotch",
    "hybrid",
    "monokai",
    "monokai-sublime",
    "nord",
    "obsidian",
    "ocean",
    "railscasts",
    "rainbow",
    "shades-of-purple",
    "sunburst",
    "vs2015",
    "xt256",
    "zenburn",
];

const DARK_MARKERS: &[&str] = &["dark", "black", "night"];

pub fn is_dark_style(style: &str) -> bool {
    DARK_MARKERS.iter().any(|marker| style.contains(marker))
        || UNMARKED_DARK_STYLES.contains(&style)
}
