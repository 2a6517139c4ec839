//! Structured observability hooks for report runs.
//!
//! Pipelines run inside a `meet.report` span carrying the report name; the
//! `emit_*` functions log the query and evaluation lifecycle inside it.
//!
//! Events are emitted at `info!`/`debug!` level; see [`crate::telemetry`].

use tracing::{debug, info};

/// Emit event: a WIQL query was sent.
pub fn emit_query_started(label: &str) {
    debug!(event = "query.started", query = %label);
}

/// Emit event: a query returned `count` ids.
pub fn emit_query_finished(label: &str, count: usize, duration_ms: u64) {
    info!(
        event = "query.finished",
        query = %label,
        count = count,
        duration_ms = duration_ms,
    );
}

/// Emit event: work item snapshots were fetched.
pub fn emit_items_fetched(requested: usize, received: usize) {
    info!(event = "items.fetched", requested = requested, received = received);
}

/// Emit event: rules were evaluated.
pub fn emit_report_evaluated(report: &str, findings: usize) {
    info!(event = "report.evaluated", report = %report, findings = findings);
}
