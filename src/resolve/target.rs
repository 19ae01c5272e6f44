// src/resolve/target.rs
// =============================================================================
// Turns an embed target into an EmbedRequest.
//
// A target is a human-facing GitHub file URL:
//
//   https://github.com/<user>/<repo>/blob/<branch>/<path...>?ts=4#L10-L20
//
// From it we derive:
// - the raw-content URL to fetch (raw.githubusercontent.com)
// - the line selection from the fragment (#L10 or #L10-L20)
// - the tab size from the `ts` query parameter
// - the file extension, used as the language hint
//
// The target can also arrive wrapped in the URL of the embed script itself:
//
//   https://embed.example.com/embed.js?target=<url-encoded target>&style=nord
//
// in which case the script URL may carry display overrides too.
// =============================================================================

use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, warn};
use url::Url;

use super::style::is_dark_style;
use crate::config::EmbedConfig;
use crate::error::EmbedError;

pub const RAW_CONTENT_BASE: &str = "https://raw.githubusercontent.com/";
pub const DEFAULT_TAB_SIZE: u32 = 8;

// How the CLI input should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// The input is the target URL itself
    Target,
    /// The input is an embed script URL with a `target` query parameter
    ScriptSrc,
}

// Which lines of the file to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineSelection {
    /// No fragment (or an unreadable one): show the whole file
    Whole,
    /// 1-based, both ends inclusive, start <= end
    Range { start: usize, end: usize },
}

impl LineSelection {
    // Parses a URL fragment without its leading '#'
    //
    //   ""          -> Whole
    //   "L12"       -> Range { 12, 12 }
    //   "L12-L30"   -> Range { 12, 30 }
    //   "L12-30"    -> Range { 12, 30 } (the end's 'L' is optional)
    //   "Lfoo-L30"  -> Whole (start unreadable)
    //   "L12-Lbar"  -> Range { 12, 12 } (end falls back to start)
    pub fn from_fragment(fragment: Option<&str>) -> Self {
        let fragment = match fragment {
            Some(f) if !f.is_empty() => f,
            _ => return LineSelection::Whole,
        };

        let mut parts = fragment.splitn(2, '-');
        let start = match parts.next().and_then(|seg| seg.strip_prefix('L')).and_then(parse_line_number) {
            Some(n) => n,
            None => return LineSelection::Whole,
        };
        let end = parts
            .next()
            .map(|seg| seg.strip_prefix('L').unwrap_or(seg))
            .and_then(parse_line_number)
            .unwrap_or(start)
            .max(start);

        LineSelection::Range { start, end }
    }

    // The number the first displayed line gets
    pub fn first_line_number(&self) -> usize {
        match self {
            LineSelection::Whole => 1,
            LineSelection::Range { start, .. } => *start,
        }
    }

    // Cuts the selected lines out of the file text
    //
    // Lines past the end of the file are simply missing from the result.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match *self {
            LineSelection::Whole => Cow::Borrowed(text),
            LineSelection::Range { start, end } => {
                let selected: Vec<&str> = text
                    .split('\n')
                    .skip(start - 1)
                    .take(end - start + 1)
                    .collect();
                Cow::Owned(selected.join("\n"))
            }
        }
    }
}

// "12" -> Some(12); "0", "x" -> None
fn parse_line_number(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|n| *n > 0)
}

// The repository coordinates taken from the target path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoPath {
    pub user: String,
    pub repository: String,
    pub branch: String,
    /// Remaining path segments joined with '/', kept verbatim
    pub file_path: String,
}

impl RepoPath {
    // Expects /<user>/<repository>/<kind>/<branch>/<file-path...>
    // The <kind> segment ("blob" or "tree") is ignored.
    pub fn from_url(url: &Url) -> Result<Self, EmbedError> {
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();

        if segments.len() < 5 {
            return Err(EmbedError::InvalidTarget(format!(
                "expected /<user>/<repo>/blob/<branch>/<path> but got {}",
                url.path()
            )));
        }

        let file_path = segments[4..].join("/");
        if file_path.is_empty() || segments[..4].iter().any(|s| s.is_empty()) {
            return Err(EmbedError::InvalidTarget(format!(
                "empty path segment in {}",
                url.path()
            )));
        }

        Ok(RepoPath {
            user: segments[0].to_string(),
            repository: segments[1].to_string(),
            branch: segments[3].to_string(),
            file_path,
        })
    }

    pub fn raw_file_url(&self) -> String {
        format!(
            "{}{}/{}/{}/{}",
            RAW_CONTENT_BASE, self.user, self.repository, self.branch, self.file_path
        )
    }

    // Text after the last '.' of the file name, or the whole name if it has none
    pub fn file_extension(&self) -> &str {
        let file_name = self.file_path.rsplit('/').next().unwrap_or(&self.file_path);
        file_name.rsplit('.').next().unwrap_or(file_name)
    }
}

// Everything needed to fetch and render one embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedRequest {
    pub target_url: String,
    pub style: String,
    pub is_dark_style: bool,
    pub show_border: bool,
    pub show_line_numbers: bool,
    pub show_file_meta: bool,
    pub selection: LineSelection,
    pub tab_size: u32,
    pub repo: RepoPath,
    pub raw_file_url: String,
    pub file_extension: String,
}

impl EmbedRequest {
    // The "GitHub: ..." label: the raw URL without its fixed host prefix
    pub fn display_label(&self) -> &str {
        self.raw_file_url
            .strip_prefix(RAW_CONTENT_BASE)
            .unwrap_or(&self.raw_file_url)
    }
}

// Resolves CLI input of either kind into a request
pub fn resolve(input: &str, kind: InputKind, config: &EmbedConfig) -> Result<EmbedRequest, EmbedError> {
    match kind {
        InputKind::Target => resolve_target(input, config),
        InputKind::ScriptSrc => {
            let (target, config) = read_script_src(input, config)?;
            resolve_target(&target, &config)
        }
    }
}

// Resolves a target URL using the given display options
pub fn resolve_target(target: &str, config: &EmbedConfig) -> Result<EmbedRequest, EmbedError> {
    let target_url = Url::parse(target)
        .map_err(|e| EmbedError::InvalidTarget(format!("'{}': {}", target, e)))?;

    let repo = RepoPath::from_url(&target_url)?;
    let selection = LineSelection::from_fragment(target_url.fragment());
    let tab_size = target_url
        .query_pairs()
        .find(|(key, _)| key == "ts")
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .filter(|ts| *ts >= 1)
        .unwrap_or(DEFAULT_TAB_SIZE);

    let raw_file_url = repo.raw_file_url();
    let file_extension = repo.file_extension().to_string();

    debug!(%raw_file_url, ?selection, tab_size, "resolved target");

    Ok(EmbedRequest {
        target_url: target_url.to_string(),
        style: config.style.clone(),
        is_dark_style: is_dark_style(&config.style),
        show_border: config.show_border,
        show_line_numbers: config.show_line_numbers,
        show_file_meta: config.show_file_meta,
        selection,
        tab_size,
        repo,
        raw_file_url,
        file_extension,
    })
}

// Reads the `target` parameter and any display overrides off a script URL
//
// Returns the (decoded) target and the config with overrides applied.
pub fn read_script_src(script_src: &str, config: &EmbedConfig) -> Result<(String, EmbedConfig), EmbedError> {
    let src = Url::parse(script_src)
        .map_err(|e| EmbedError::InvalidTarget(format!("script source '{}': {}", script_src, e)))?;

    let mut config = config.clone();
    let mut target = None;

    for (key, value) in src.query_pairs() {
        match key.as_ref() {
            "target" => target = Some(value.into_owned()),
            "style" if !value.is_empty() => config.style = value.into_owned(),
            "showBorder" => apply_toggle(&mut config.show_border, &key, &value),
            "showLineNumbers" => apply_toggle(&mut config.show_line_numbers, &key, &value),
            "showFileMeta" => apply_toggle(&mut config.show_file_meta, &key, &value),
            _ => {}
        }
    }

    let target = target.ok_or_else(|| {
        EmbedError::InvalidTarget(format!("no 'target' parameter in {}", script_src))
    })?;

    Ok((target, config))
}

fn apply_toggle(field: &mut bool, key: &str, value: &str) {
    match parse_toggle(value) {
        Some(on) => *field = on,
        None => warn!("ignoring {}={}: expected on or off", key, value),
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}
