//! Weekly MEET consistency report.
//!
//! Lists `AGI\MEET` children that are In Progress under a parent that is
//! not, children planned past their parent's implementation end date, and
//! children whose parent cannot be found in the portfolio project.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use meet_cli::CommonArgs;
use meet_core::{render_weekly, run_weekly, LinkRule, LinkRuleSet, WeeklyScope};
use tracing::info;

#[derive(Parser)]
#[command(name = "meet-weekly")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Weekly MEET parent/child consistency report", long_about = None)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Project holding the child Features
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_PROJECT)]
    child_project: String,

    /// Area path the child Features sit in (exact match)
    #[arg(long, default_value = meet_core::config::DEFAULT_CHILD_AREA)]
    child_area: String,

    /// Project the parent Features must belong to
    #[arg(long, default_value = meet_core::config::DEFAULT_PARENT_PROJECT)]
    parent_project: String,

    /// Skip the TargetDate / ImplementationEndDate check
    #[arg(long)]
    no_date_check: bool,
}

impl Cli {
    fn scope(&self) -> WeeklyScope {
        WeeklyScope {
            child_project: self.child_project.clone(),
            child_area: self.child_area.clone(),
            parent_project: self.parent_project.clone(),
            ..WeeklyScope::default()
        }
    }

    fn rules(&self) -> LinkRuleSet {
        let mut rules = LinkRuleSet::standard();
        if self.no_date_check {
            rules.rules.retain(|r| *r != LinkRule::DateOrdering);
        }
        rules
    }
}

async fn run(cli: Cli) -> Result<String> {
    let client = meet_cli::connect(&cli.common)?;
    let scope = cli.scope();

    let report = run_weekly(&client, &scope, &cli.rules(), meet_cli::now())
        .await
        .context("Weekly report failed")?;
    info!(
        children = report.child_count,
        linked = report.linked_count,
        findings = report.findings.len(),
        "weekly report complete"
    );

    Ok(render_weekly(&report, client.config()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.common.init_tracing();
    meet_cli::finish(run(cli).await)
}
