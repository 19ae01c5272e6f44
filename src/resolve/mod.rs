// src/resolve/mod.rs
// =============================================================================
// Target resolution: from a user-supplied URL to an EmbedRequest.
//
// Submodules:
// - target: URL, fragment and path parsing
// - style: light/dark theme detection
//
// Resolution never touches the network. Anything it cannot make sense of
// becomes EmbedError::InvalidTarget, which the pipeline still renders as a
// failure block.
// =============================================================================

mod style;
mod target;

pub use style::{is_dark_style, UNMARKED_DARK_STYLES};
pub use target::{
    read_script_src, resolve, EmbedRequest, InputKind, LineSelection, DEFAULT_TAB_SIZE,
};
