//! Findings produced by the consistency rules.

use serde::{Deserialize, Serialize};

use super::work_item::{WorkItem, WorkItemId};

/// Identifies the rule that produced a [`Finding`].
///
/// The declaration order is the tie-break order used when sorting findings
/// for the same subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Child is "In Progress" while its parent is not.
    StatusMismatch,
    /// Child TargetDate is later than parent ImplementationEndDate.
    DateOrdering,
    /// Child's parent is missing from the expected portfolio.
    ParentNotFound,
    /// Tagged portfolio parent has no child at all.
    MissingChild,
    /// Progress status field is missing or blank.
    ProgressStatusMissing,
    /// Amber progress status without progress info.
    AmberWithoutInfo,
}

impl RuleId {
    /// Stable dotted identifier, e.g. `meet.link.status_mismatch`.
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::StatusMismatch => "meet.link.status_mismatch",
            RuleId::DateOrdering => "meet.link.date_ordering",
            RuleId::ParentNotFound => "meet.link.parent_not_found",
            RuleId::MissingChild => "meet.portfolio.missing_child",
            RuleId::ProgressStatusMissing => "meet.quality.progress_status_missing",
            RuleId::AmberWithoutInfo => "meet.quality.amber_without_info",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The parts of a work item a finding needs to be rendered on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: WorkItemId,
    pub title: String,
    pub state: String,
    pub team_project: String,
    /// Extra context for this item, e.g. `TargetDate=2025-06-01`.
    pub note: Option<String>,
}

impl ItemRef {
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl From<&WorkItem> for ItemRef {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            state: item.state.clone(),
            team_project: item.team_project.clone(),
            note: None,
        }
    }
}

/// One reported inconsistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleId,
    /// The item the finding is about (the child for link rules).
    pub subject: ItemRef,
    /// The other side of the link, when there is one.
    pub related: Option<ItemRef>,
    pub message: String,
}

impl Finding {
    pub fn new(rule: RuleId, subject: ItemRef, message: impl Into<String>) -> Self {
        Self {
            rule,
            subject,
            related: None,
            message: message.into(),
        }
    }

    pub fn with_related(mut self, related: ItemRef) -> Self {
        self.related = Some(related);
        self
    }

    /// Sort key: subject id ascending, then rule order.
    pub fn sort_key(&self) -> (WorkItemId, RuleId) {
        (self.subject.id, self.rule)
    }
}

/// Sort findings into report order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by_key(Finding::sort_key);
}
