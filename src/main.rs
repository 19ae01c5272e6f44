// src/main.rs
// =============================================================================
// This is the entry point of the snippet-embed CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Build the configuration (defaults < config file < flags)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the rendered HTML (or JSON) on stdout
// 5. Exit with proper code (0 = all rendered, 1 = some failed, 2 = error)
// =============================================================================

// Module declarations
mod cli;        // src/cli.rs - command-line parsing
mod config;     // src/config.rs - EmbedConfig and the TOML config file
mod error;      // src/error.rs - the EmbedError taxonomy
mod github;     // src/github/ - fetching raw files
mod highlight;  // src/highlight/ - highlighter and line numberer capabilities
mod pipeline;   // src/pipeline/ - placeholder, fetch, render
mod resolve;    // src/resolve/ - target URL parsing

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DisplayArgs, InputArgs};
use config::EmbedConfig;
use github::HttpFetcher;
use highlight::{BuiltinLineNumbers, Capabilities, SyntaxLoader};
use pipeline::{render_document, Pipeline, RenderedEmbed};
use resolve::{InputKind, UNMARKED_DARK_STYLES};

#[tokio::main]
async fn main() {
    // clap handles --help and --version and exits on bad arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // anyhow's alternate format prints the whole context chain
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so they never mix with the HTML on stdout.
// RUST_LOG, when set, wins over -v.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every embed rendered its file
//   Ok(1) = at least one embed rendered an error instead
//   Err   = we could not even start (bad config, bad flags)
async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Render {
            inputs,
            args,
            display,
            page,
            json,
            timeout,
            asset_base,
            grammar,
        } => {
            // render-only options sit on top of the shared display options
            let mut config = build_config(&display)?;
            if let Some(secs) = timeout {
                config.timeout_secs = secs;
            }
            if let Some(base) = asset_base {
                config.asset_base = base;
            }
            if let Some(grammar) = grammar {
                config.grammar = grammar;
            }
            handle_render(&inputs, input_kind(&args), config, page, json).await
        }
        Commands::Resolve {
            input,
            args,
            display,
            json,
        } => {
            let config = build_config(&display)?;
            handle_resolve(&input, input_kind(&args), &config, json)
        }
        Commands::Styles => {
            for style in UNMARKED_DARK_STYLES {
                println!("{}", style);
            }
            Ok(0)
        }
    }
}

fn input_kind(args: &InputArgs) -> InputKind {
    if args.script_src {
        InputKind::ScriptSrc
    } else {
        InputKind::Target
    }
}

// Defaults, then the config file, then the display flags
fn build_config(display: &DisplayArgs) -> Result<EmbedConfig> {
    let mut config = match &display.config {
        Some(path) => EmbedConfig::from_file(path)?,
        None => EmbedConfig::default(),
    };

    if let Some(style) = &display.style {
        config.style = style.clone();
    }
    if display.no_border {
        config.show_border = false;
    }
    if display.no_line_numbers {
        config.show_line_numbers = false;
    }
    if display.no_file_meta {
        config.show_file_meta = false;
    }

    Ok(config)
}

// Handles the 'render' subcommand
async fn handle_render(
    inputs: &[String],
    kind: InputKind,
    config: EmbedConfig,
    page: bool,
    json: bool,
) -> Result<i32> {
    // One client and one set of capabilities shared by every embed
    let fetcher = Arc::new(HttpFetcher::new(config.timeout()).context("could not set up HTTP")?);
    let capabilities = Arc::new(Capabilities::new(
        // The highlighter loads lazily, at most once, and only if an embed needs it
        Arc::new(SyntaxLoader::new(config.grammar_source(), fetcher.clone())),
        Arc::new(BuiltinLineNumbers),
    ));

    info!("embedding {} input(s)", inputs.len());
    let pipeline = Pipeline::new(fetcher, capabilities, config.clone());
    let rendered = pipeline.embed_all(inputs, kind).await;

    print_rendered(&rendered, &config, page, json)?;

    // A failed embed still printed its failure block, so this is exit code 1, not an Err
    let failed = rendered.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        info!("{} of {} embed(s) failed", failed, rendered.len());
        Ok(1)
    } else {
        Ok(0)
    }
}

// Prints either the JSON records or the HTML (fragment or full page)
fn print_rendered(rendered: &[RenderedEmbed], config: &EmbedConfig, page: bool, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(rendered)?;
        println!("{}", json_output);
    } else {
        let placeholders: Vec<String> = rendered.iter().map(RenderedEmbed::to_html).collect();
        print!("{}", render_document(&placeholders, config, page));
    }
    Ok(())
}

// Handles the 'resolve' subcommand: no network, just the parsed request
fn handle_resolve(input: &str, kind: InputKind, config: &EmbedConfig, json: bool) -> Result<i32> {
    let request = match resolve::resolve(input, kind, config) {
        Ok(request) => request,
        Err(e) => {
            // The input is unusable, which is a result rather than an internal error
            eprintln!("❌ {}", e);
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(0);
    }

    // Human-readable table: one "name value" row per field
    let lines = match request.selection {
        resolve::LineSelection::Whole => "whole file".to_string(),
        resolve::LineSelection::Range { start, end } => format!("{}-{}", start, end),
    };
    let rows = [
        ("target", request.target_url.clone()),
        ("raw file", request.raw_file_url.clone()),
        ("label", request.display_label().to_string()),
        ("branch", request.repo.branch.clone()),
        ("extension", request.file_extension.clone()),
        ("lines", lines),
        ("tab size", request.tab_size.to_string()),
        ("style", format!("{} ({})", request.style, if request.is_dark_style { "dark" } else { "light" })),
        ("border", request.show_border.to_string()),
        ("line numbers", request.show_line_numbers.to_string()),
        ("file meta", request.show_file_meta.to_string()),
    ];
    for (name, value) in rows {
        println!("{:<14} {}", name, value);
    }
    Ok(0)
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Where output goes
//    - stdout: the rendered HTML, or JSON with --json
//    - stderr: tracing logs and the resolve error line
//    - `snippet-embed render URL > snippet.html` therefore gives a clean file
//
// 2. Order of configuration layers
//    - EmbedConfig::default()
//    - the --config TOML file
//    - display flags (--style, --no-border, ...), then render-only flags
//    - per-input parameters on a script URL, applied during resolution
//
// 3. Exit codes
//    - 0: every embed rendered its file
//    - 1: at least one embed rendered its failure block
//    - 2: the run could not start (unreadable config, HTTP client setup)
// -----------------------------------------------------------------------------
