//! MEET missing-child report.
//!
//! Lists Ready For Delivery portfolio Features tagged `MEET` that have no
//! child Feature anywhere under `AGI\MEET`.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use meet_cli::CommonArgs;
use meet_core::{render_missing_child, run_missing_child, MissingChildScope};
use tracing::info;

#[derive(Parser)]
#[command(name = "meet-missing-child")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Portfolio Features without a MEET child Feature", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Project holding the portfolio parents
    #[arg(long, default_value = meet_core::config::DEFAULT_PARENT_PROJECT)]
    parent_project: String,

    /// Tag the parents must carry
    #[arg(long, default_value = meet_core::config::DEFAULT_MEET_TAG)]
    tag: String,

    /// Project holding the child Features
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_PROJECT)]
    child_project: String,

    /// Area path the children sit in (sub-areas included)
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_AREA)]
    child_area: String,
}

async fn run(cli: Cli) -> Result<String> {
    let client = meet_cli::connect(&cli.common)?;
    let scope = MissingChildScope {
        parent_project: cli.parent_project,
        tag: cli.tag,
        child_project: cli.child_project,
        child_area: cli.child_area,
        ..MissingChildScope::default()
    };

    let report = run_missing_child(&client, &scope, meet_cli::now())
        .await
        .context("Missing-child report failed")?;
    info!(
        parents = report.parent_count,
        children = report.child_count,
        findings = report.findings.len(),
        "missing-child report complete"
    );

    Ok(render_missing_child(&report, client.config()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.common.init_tracing();
    meet_cli::finish(run(cli).await)
}
