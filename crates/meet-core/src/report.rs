//! Plain-text rendering of the reports.
//!
//! Every listed item is followed by its web URL, produced by a
//! [`WorkItemLinks`] implementation so the renderer stays independent of the
//! service's URL scheme.

use std::fmt::Write as _;

use crate::domain::{Finding, ItemRef, RuleId, WorkItemId};
use crate::health::TrafficLight;
use crate::pipeline::{HealthRun, MissingChildReport, WeeklyReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M %:z";
const OK_LINE: &str = "  OK (no issues)";

/// Builds human-clickable links to work items.
pub trait WorkItemLinks {
    fn edit_url(&self, project: &str, id: WorkItemId) -> String;
}

fn url_for(links: &dyn WorkItemLinks, item: &ItemRef, fallback_project: &str) -> String {
    let project = if item.team_project.is_empty() {
        fallback_project
    } else {
        &item.team_project
    };
    links.edit_url(project, item.id)
}

fn item_line(label: &str, item: &ItemRef) -> String {
    let mut line = format!("{} {} | {}", label, item.id, item.title);
    if let Some(note) = &item.note {
        line.push_str(" | ");
        line.push_str(note);
    }
    line
}

fn push_link_findings(
    out: &mut String,
    findings: &[&Finding],
    report: &WeeklyReport,
    links: &dyn WorkItemLinks,
) {
    if findings.is_empty() {
        out.push_str(OK_LINE);
        out.push('\n');
        return;
    }
    for finding in findings {
        let _ = writeln!(out, "  {}", item_line("Child", &finding.subject));
        let _ = writeln!(
            out,
            "    {}",
            url_for(links, &finding.subject, &report.scope.child_project)
        );
        if let Some(parent) = &finding.related {
            let _ = writeln!(out, "    {}", item_line("Parent", parent));
            let _ = writeln!(
                out,
                "    {}",
                url_for(links, parent, &report.scope.parent_project)
            );
        }
    }
}

/// Render the weekly consistency report.
pub fn render_weekly(report: &WeeklyReport, links: &dyn WorkItemLinks) -> String {
    let scope = &report.scope;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Weekly MEET report - {}",
        report.generated_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(
        out,
        "Found {} child features in {}/{} with state='{}'",
        report.child_count, scope.child_project, scope.child_area, scope.child_state
    );

    let sections = [
        (
            RuleId::StatusMismatch,
            format!(
                "CHECK 1: {} Feature is '{}' but parent ({}) is NOT '{}'",
                scope.child_area, scope.child_state, scope.parent_project, scope.child_state
            ),
        ),
        (
            RuleId::DateOrdering,
            format!(
                "CHECK 2: {} Feature TargetDate > parent ImplementationEndDate",
                scope.child_area
            ),
        ),
        (
            RuleId::ParentNotFound,
            format!(
                "CHECK 3: {} Feature parent not found in expected portfolio ({})",
                scope.child_area, scope.parent_project
            ),
        ),
    ];

    for (rule, title) in &sections {
        let findings: Vec<&Finding> = report.findings_for(*rule).collect();
        let _ = writeln!(out, "\n{}", title);
        push_link_findings(&mut out, &findings, report, links);
    }

    let count = |rule| report.findings_for(rule).count();
    let _ = writeln!(
        out,
        "\nSUMMARY: {} finding(s) | status={} | dates={} | parent not found={} | linked={}/{}",
        report.findings.len(),
        count(RuleId::StatusMismatch),
        count(RuleId::DateOrdering),
        count(RuleId::ParentNotFound),
        report.linked_count,
        report.child_count,
    );
    out
}

/// Render the missing-child report.
pub fn render_missing_child(report: &MissingChildReport, links: &dyn WorkItemLinks) -> String {
    let scope = &report.scope;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "MEET missing child report - {}",
        report.generated_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(
        out,
        "Parent filter: {} | State='{}' | Tag contains '{}'",
        scope.parent_project, scope.parent_state, scope.tag
    );
    let _ = writeln!(
        out,
        "Child filter: {} | AreaPath UNDER '{}'",
        scope.child_project, scope.child_area
    );
    let _ = writeln!(out, "Found {} parent Features", report.parent_count);
    let _ = writeln!(
        out,
        "Found {} child Features in {} (all states)",
        report.child_count,
        scope.child_scope_label()
    );

    let _ = writeln!(
        out,
        "\nMissing child Features in {}: {}",
        scope.child_scope_label(),
        report.findings.len()
    );
    if report.findings.is_empty() {
        out.push_str(OK_LINE);
        out.push('\n');
        return out;
    }

    out.push_str("\nLIST:\n");
    for finding in &report.findings {
        let item = &finding.subject;
        let _ = writeln!(out, "- {} | {} | {}", item.id, item.state, item.title);
        let _ = writeln!(out, "  {}", url_for(links, item, &scope.parent_project));
    }
    out
}

fn push_item_list(out: &mut String, items: &[ItemRef], links: &dyn WorkItemLinks, project: &str) {
    for item in items {
        let _ = writeln!(out, "    - {}", item_line_plain(item));
        let _ = writeln!(out, "      {}", url_for(links, item, project));
    }
}

fn item_line_plain(item: &ItemRef) -> String {
    match &item.note {
        Some(note) => format!("{} | {} | {}", item.id, item.title, note),
        None => format!("{} | {}", item.id, item.title),
    }
}

fn push_quality(
    out: &mut String,
    findings: &[&Finding],
    ok: &str,
    heading: &str,
    links: &dyn WorkItemLinks,
    project: &str,
) {
    if findings.is_empty() {
        let _ = writeln!(out, "  OK: {}", ok);
        return;
    }
    let _ = writeln!(out, "  {}: {}", heading, findings.len());
    for finding in findings {
        let item = &finding.subject;
        let _ = writeln!(out, "    - {} | {} | {}", item.id, item.state, item.title);
        let _ = writeln!(out, "      {}", url_for(links, item, project));
    }
}

/// Render the health report.
pub fn render_health(run: &HealthRun, links: &dyn WorkItemLinks) -> String {
    let scope = &run.scope;
    let report = &run.report;
    let project = scope.project.as_str();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "MEET health report - {}",
        run.generated_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out, "Scope: {} / {} / Feature", scope.project, scope.area);
    let _ = writeln!(
        out,
        "Calendar week window (YELLOW): next week {} .. {}",
        report.next_week_start,
        report.next_week_end()
    );
    let _ = writeln!(
        out,
        "Total features ({}): {}",
        scope.states.join(" + "),
        report.total
    );

    let focus = crate::domain::state::IN_PROGRESS;
    let _ = writeln!(out, "\nSUMMARY (quick) - focus: {} risks", focus);
    if let Some(b) = report.buckets_for(focus) {
        let _ = writeln!(
            out,
            "  {}: GREEN={} | YELLOW(next week)={} | RED(past)={} | MISSING TargetDate={}",
            focus,
            b.count(TrafficLight::Green),
            b.count(TrafficLight::Yellow),
            b.count(TrafficLight::Red),
            b.count(TrafficLight::Missing),
        );
    }
    let urgent = report.urgent(focus, 3);
    if urgent.is_empty() {
        out.push_str("  Top issues: none\n");
    } else {
        out.push_str("  Top issues (up to 3):\n");
        for item in urgent {
            let target = item.note.as_deref().unwrap_or("TargetDate=MISSING");
            let _ = writeln!(out, "    - {} | {} | {}", item.id, item.title, target);
            let _ = writeln!(out, "      {}", url_for(links, item, project));
        }
    }

    for buckets in &report.buckets {
        let _ = writeln!(out, "\nSTATE = {}", buckets.state);
        let _ = writeln!(
            out,
            "  GREEN={} | YELLOW={} | RED={} | MISSING TargetDate={}",
            buckets.count(TrafficLight::Green),
            buckets.count(TrafficLight::Yellow),
            buckets.count(TrafficLight::Red),
            buckets.count(TrafficLight::Missing),
        );
        let listed = [
            (TrafficLight::Red, "RED (TargetDate in the past)"),
            (TrafficLight::Yellow, "YELLOW (TargetDate next calendar week)"),
            (TrafficLight::Missing, "MISSING TargetDate"),
        ];
        for (light, heading) in listed {
            let items = buckets.get(light);
            if !items.is_empty() {
                let _ = writeln!(out, "  {}:", heading);
                push_item_list(&mut out, items, links, project);
            }
        }
    }

    out.push_str("\nDATA QUALITY\n");
    let _ = writeln!(
        out,
        "  Progress Status field used: {}",
        report.progress_fields.status
    );
    let _ = writeln!(
        out,
        "  Progress Info field used: {}",
        report.progress_fields.info
    );
    let missing: Vec<&Finding> = report.findings_for(RuleId::ProgressStatusMissing).collect();
    push_quality(
        &mut out,
        &missing,
        "All features have Progress Status",
        "Missing Progress Status",
        links,
        project,
    );
    let amber: Vec<&Finding> = report.findings_for(RuleId::AmberWithoutInfo).collect();
    push_quality(
        &mut out,
        &amber,
        &format!("All '{}' features have Progress Info", crate::health::AMBER),
        &format!("'{}' but missing Progress Info", crate::health::AMBER),
        links,
        project,
    );
    out
}
