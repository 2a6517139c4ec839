//! Build the JSON Patch document that creates a MEET child Feature.
//!
//! Reads one portfolio work item (as returned by the work item API) from
//! stdin and prints the patch to stdout. Nothing is sent to the service.

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use meet_cli::CommonArgs;
use meet_core::{build_child_patch, ChildTemplate};
use serde_json::Value;
use tracing::info;

#[derive(Parser)]
#[command(name = "meet-child-patch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Print the JSON Patch for a MEET child of a portfolio Feature", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Area path of the new child
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_AREA)]
    area: String,
}

fn run(cli: &Cli) -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read work item from stdin")?;
    let parent: Value = serde_json::from_str(&input).context("stdin is not valid JSON")?;

    let org_url = cli.common.ado_config().org_url();
    let template = ChildTemplate {
        area_path: cli.area.clone(),
        ..ChildTemplate::meet(&org_url)
    };

    let patch = build_child_patch(&parent, &template).context("Cannot build child patch")?;
    info!(operations = patch.len(), "child patch built");

    let mut out = serde_json::to_string_pretty(&patch)?;
    out.push('\n');
    Ok(out)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.common.init_tracing();
    meet_cli::finish(run(&cli))
}
