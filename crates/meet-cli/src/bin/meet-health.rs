//! MEET health report.
//!
//! Traffic-light view of target dates per state, plus progress field data
//! quality for the Features in `AGI\MEET`.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use meet_cli::CommonArgs;
use meet_core::{render_health, run_health, HealthScope, ProgressFields};
use tracing::info;

#[derive(Parser)]
#[command(name = "meet-health")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Target date and progress health of MEET Features", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Project holding the Features
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_PROJECT)]
    project: String,

    /// Area path (exact match)
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_AREA)]
    area: String,

    /// Progress status field reference name
    #[arg(long)]
    progress_status_field: Option<String>,

    /// Progress info field reference name
    #[arg(long)]
    progress_info_field: Option<String>,
}

impl Cli {
    fn scope(&self) -> HealthScope {
        let defaults = ProgressFields::default();
        HealthScope {
            project: self.project.clone(),
            area: self.area.clone(),
            progress: ProgressFields {
                status: self
                    .progress_status_field
                    .clone()
                    .unwrap_or(defaults.status),
                info: self.progress_info_field.clone().unwrap_or(defaults.info),
            },
            ..HealthScope::default()
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let client = meet_cli::connect(&cli.common)?;
    let scope = cli.scope();

    let health = run_health(&client, &scope, chrono::Local::now())
        .await
        .context("Health report failed")?;
    info!(
        items = health.report.total,
        quality_findings = health.report.quality.len(),
        "health report complete"
    );

    Ok(render_health(&health, client.config()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.common.init_tracing();
    meet_cli::finish(run(cli).await)
}
