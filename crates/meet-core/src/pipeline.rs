//! Report pipelines: query → link → evaluate.
//!
//! Each pipeline either returns a complete report or an error. Nothing is
//! printed here, so a failing query can never leave a partial report behind.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::{HealthScope, MissingChildScope, WeeklyScope};
use crate::domain::{Finding, Result, RuleId, WorkItem, WorkItemId};
use crate::existence::missing_children;
use crate::health::{build_health_report, HealthReport};
use crate::linker::link;
use crate::obs;
use crate::query::WorkItemQuery;
use crate::rules::{evaluate_linkage, LinkRuleSet};
use crate::source::WorkItemSource;

/// Output of the weekly consistency check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub scope: WeeklyScope,
    pub generated_at: DateTime<FixedOffset>,
    /// Distinct child Features examined.
    pub child_count: usize,
    pub linked_count: usize,
    /// Findings in report order: child id, then rule.
    pub findings: Vec<Finding>,
}

impl WeeklyReport {
    pub fn findings_for(&self, rule: RuleId) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.rule == rule)
    }
}

/// Output of the missing-child check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingChildReport {
    pub scope: MissingChildScope,
    pub generated_at: DateTime<FixedOffset>,
    pub parent_count: usize,
    pub child_count: usize,
    /// One finding per parent without a child, ordered by parent id.
    pub findings: Vec<Finding>,
}

/// Output of the health check, with its scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRun {
    pub scope: HealthScope,
    pub generated_at: DateTime<FixedOffset>,
    pub report: HealthReport,
}

async fn query_items(source: &dyn WorkItemSource, query: &WorkItemQuery) -> Result<Vec<WorkItem>> {
    obs::emit_query_started(&query.label);
    let started = Instant::now();
    let items = source.query_items(query).await?;
    obs::emit_query_finished(
        &query.label,
        items.len(),
        started.elapsed().as_millis() as u64,
    );
    Ok(items)
}

/// Weekly report: In Progress children of the MEET area against their
/// portfolio parents.
#[tracing::instrument(name = "meet.report", skip_all, fields(report = "weekly"))]
pub async fn run_weekly(
    source: &dyn WorkItemSource,
    scope: &WeeklyScope,
    rules: &LinkRuleSet,
    now: DateTime<FixedOffset>,
) -> Result<WeeklyReport> {
    let children = query_items(source, &scope.children_query()).await?;

    let parent_ids: Vec<WorkItemId> = children
        .iter()
        .filter_map(|c| c.parent)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let parents: Vec<WorkItem> = if parent_ids.is_empty() {
        Vec::new()
    } else {
        let fetched = source.fetch(&parent_ids).await?;
        obs::emit_items_fetched(parent_ids.len(), fetched.len());
        fetched
            .into_iter()
            .filter(|p| p.team_project == scope.parent_project)
            .collect()
    };

    let linkage = link(&children, &parents);
    let findings = evaluate_linkage(rules, &linkage, &scope.parent_project);
    obs::emit_report_evaluated("weekly", findings.len());

    Ok(WeeklyReport {
        scope: scope.clone(),
        generated_at: now,
        child_count: linkage.child_count(),
        linked_count: linkage.links.len(),
        findings,
    })
}

/// Missing-child report: tagged portfolio parents with no child Feature.
///
/// The two queries are independent and run concurrently.
#[tracing::instrument(name = "meet.report", skip_all, fields(report = "missing-child"))]
pub async fn run_missing_child(
    source: &dyn WorkItemSource,
    scope: &MissingChildScope,
    now: DateTime<FixedOffset>,
) -> Result<MissingChildReport> {
    let parents_query = scope.parents_query();
    let children_query = scope.children_query();
    let (parents, children) = tokio::try_join!(
        query_items(source, &parents_query),
        query_items(source, &children_query),
    )?;

    let findings = missing_children(&parents, &children, &scope.child_scope_label());
    obs::emit_report_evaluated("missing-child", findings.len());

    Ok(MissingChildReport {
        scope: scope.clone(),
        generated_at: now,
        parent_count: parents.len(),
        child_count: children.len(),
        findings,
    })
}

/// Health report: target date traffic lights and progress data quality.
///
/// Target dates are read in the time zone of `now`; pass `Local::now()` to
/// get the calendar the users see, daylight saving included.
#[tracing::instrument(name = "meet.report", skip_all, fields(report = "health"))]
pub async fn run_health<Tz: TimeZone>(
    source: &dyn WorkItemSource,
    scope: &HealthScope,
    now: DateTime<Tz>,
) -> Result<HealthRun> {
    let items = query_items(source, &scope.query()).await?;
    let report = build_health_report(&items, &scope.states, &now, &scope.progress);
    obs::emit_report_evaluated("health", report.quality.len());

    Ok(HealthRun {
        scope: scope.clone(),
        generated_at: now.fixed_offset(),
        report,
    })
}
