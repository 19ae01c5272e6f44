// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - render: fetch one or more files and print their embed HTML
// - resolve: show what a target resolves to, without any network access
// - styles: list the dark themes the renderer knows about
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// The top-level CLI structure
// #[derive(Parser)] generates the argument parsing from the fields below
#[derive(Parser, Debug)]
#[command(
    name = "snippet-embed",
    version,
    about = "Render GitHub source files as embeddable, highlighted HTML snippets",
    long_about = "snippet-embed fetches a file referenced by a GitHub URL (optionally a line range \
                  like #L10-L20) and renders it as a self-contained HTML snippet with syntax \
                  highlighting, line numbers and a link back to the file."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Which subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

// How the positional inputs should be read
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Treat inputs as embed script URLs carrying a `target` query parameter
    ///
    /// Example: https://embed.example.com/embed.js?target=https%3A%2F%2Fgithub.com%2F...
    #[arg(long)]
    pub script_src: bool,
}

// Flags that override the config file
// Shared by `render` and `resolve` through #[command(flatten)]
#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// TOML config file with display and loading options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// highlight.js theme name (e.g. default, github-dark, monokai)
    #[arg(long)]
    pub style: Option<String>,

    /// Do not draw a border around the snippet
    #[arg(long)]
    pub no_border: bool,

    /// Do not number lines
    #[arg(long)]
    pub no_line_numbers: bool,

    /// Do not show the "view raw" / "GitHub" metadata block
    #[arg(long)]
    pub no_file_meta: bool,
}

// The subcommands; each variant's fields become that subcommand's arguments
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and render files as embeddable HTML
    ///
    /// Example: snippet-embed render https://github.com/user/repo/blob/main/src/lib.rs#L1-L20
    Render {
        /// GitHub file URLs (or script URLs with --script-src)
        #[arg(required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        args: InputArgs,

        #[command(flatten)]
        display: DisplayArgs,

        /// Wrap the output in a complete HTML document
        #[arg(long)]
        page: bool,

        /// Output results in JSON format instead of HTML
        #[arg(long, conflicts_with = "page")]
        json: bool,

        /// Fetch timeout in seconds (0 = no timeout)
        #[arg(long)]
        timeout: Option<u64>,

        /// Base URL for the stylesheet links
        #[arg(long)]
        asset_base: Option<String>,

        /// Extra syntax definitions: a .sublime-syntax URL or path, or a folder of them
        #[arg(long)]
        grammar: Option<String>,
    },

    /// Show how an input resolves (raw URL, line range, extension, ...)
    Resolve {
        /// GitHub file URL (or script URL with --script-src)
        input: String,

        #[command(flatten)]
        args: InputArgs,

        #[command(flatten)]
        display: DisplayArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List the dark styles that do not say so in their name
    Styles,
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Flags and config keys
//    - --style          -> style
//    - --no-border      -> show_border = false
//    - --no-line-numbers -> show_line_numbers = false
//    - --no-file-meta   -> show_file_meta = false
//    - --timeout        -> timeout_secs
//    - --asset-base     -> asset_base
//    - --grammar        -> grammar
//    The --no-* flags can only turn a toggle off; only a script URL
//    parameter (showBorder=on, ...) can turn it back on for that input.
//
// 2. Counted flags
//    - ArgAction::Count turns -v, -vv, -vvv into 1, 2, 3
//    - global = true lets -v appear before or after the subcommand
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_flags() {
        let cli = Cli::try_parse_from([
            "snippet-embed",
            "-vv",
            "render",
            "https://github.com/u/r/blob/main/a.rs",
            "https://github.com/u/r/blob/main/b.rs",
            "--no-border",
            "--style",
            "nord",
            "--timeout",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render { inputs, display, timeout, json, .. } => {
                assert_eq!(inputs.len(), 2);
                assert!(display.no_border);
                assert!(!display.no_file_meta);
                assert_eq!(display.style.as_deref(), Some("nord"));
                assert_eq!(timeout, Some(3));
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_render_needs_an_input() {
        assert!(Cli::try_parse_from(["snippet-embed", "render"]).is_err());
    }

    #[test]
    fn test_json_and_page_conflict() {
        let result = Cli::try_parse_from([
            "snippet-embed",
            "render",
            "https://github.com/u/r/blob/main/a.rs",
            "--json",
            "--page",
        ]);
        assert!(result.is_err());
    }
}
