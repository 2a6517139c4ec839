//! MEET Report Core
//!
//! Read-only consistency checks between EEM Portfolio parent Features and
//! their AGI\MEET child Features:
//! query → link → evaluate → render.

pub mod child_patch;
pub mod config;
pub mod domain;
pub mod existence;
pub mod fakes;
pub mod health;
pub mod linker;
pub mod obs;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod rules;
pub mod source;
pub mod telemetry;

pub use domain::{
    area_is_under, field, sort_findings, split_tags, state, BoxError, CoreError, FieldValue,
    Finding, ItemRef, Result, RuleId, WorkItem, WorkItemId,
};

pub use child_patch::{build_child_patch, ChildTemplate, PatchOperation};
pub use config::{HealthScope, MissingChildScope, WeeklyScope};
pub use existence::{missing_children, parents_with_children};
pub use health::{
    build_health_report, classify_target_date, next_monday, HealthReport, ProgressFields,
    TrafficLight,
};
pub use linker::{link, Link, Linkage, UnresolvedChild, UnresolvedReason};
pub use pipeline::{
    run_health, run_missing_child, run_weekly, HealthRun, MissingChildReport, WeeklyReport,
};
pub use query::{AreaFilter, WorkItemQuery};
pub use report::{render_health, render_missing_child, render_weekly, WorkItemLinks};
pub use rules::{check_link, evaluate_linkage, evaluate_links, LinkRule, LinkRuleSet};
pub use source::WorkItemSource;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
