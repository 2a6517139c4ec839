//! Work item snapshot.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::field::{self, FieldValue};

/// Canonical state names as configured in the tracking system.
pub mod state {
    pub const NEW: &str = "New";
    pub const IN_PROGRESS: &str = "In Progress";
    pub const READY_FOR_DELIVERY: &str = "Ready For Delivery";
}

/// Work item identifier, unique within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(pub u64);

impl std::fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for WorkItemId {
    fn from(id: u64) -> Self {
        WorkItemId(id)
    }
}

/// Immutable snapshot of a work item as fetched during one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    /// Work item type name, e.g. `Feature`.
    pub work_item_type: String,
    pub title: String,
    /// Canonical state name, compared case-sensitively.
    pub state: String,
    /// Backslash separated area path, e.g. `AGI\MEET`.
    pub area_path: String,
    pub team_project: String,
    pub tags: Vec<String>,
    /// Every other field returned by the service, keyed by reference name.
    pub fields: BTreeMap<String, FieldValue>,
    /// Target of the first `Hierarchy-Reverse` relation.
    pub parent: Option<WorkItemId>,
}

impl WorkItem {
    /// Create a Feature with the given id, title and state. Remaining
    /// attributes are empty.
    pub fn new(id: impl Into<WorkItemId>, title: &str, state: &str) -> Self {
        Self {
            id: id.into(),
            work_item_type: "Feature".to_string(),
            title: title.to_string(),
            state: state.to_string(),
            area_path: String::new(),
            team_project: String::new(),
            tags: Vec::new(),
            fields: BTreeMap::new(),
            parent: None,
        }
    }

    pub fn with_project(mut self, project: &str) -> Self {
        self.team_project = project.to_string();
        self
    }

    pub fn with_area(mut self, area_path: &str) -> Self {
        self.area_path = area_path.to_string();
        self
    }

    pub fn with_type(mut self, work_item_type: &str) -> Self {
        self.work_item_type = work_item_type.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_date(self, name: &str, date: NaiveDate) -> Self {
        self.with_field(name, FieldValue::Date(date))
    }

    pub fn with_parent(mut self, parent: impl Into<WorkItemId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Date value of a field. Absent and non-date values both yield `None`.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.field(name).and_then(FieldValue::as_date)
    }

    pub fn target_date(&self) -> Option<NaiveDate> {
        self.date(field::TARGET_DATE)
    }

    /// TargetDate converted to the calendar of `tz`.
    pub fn target_date_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.field(field::TARGET_DATE)
            .and_then(|v| v.as_date_in(tz))
    }

    pub fn implementation_end_date(&self) -> Option<NaiveDate> {
        self.date(field::IMPLEMENTATION_END_DATE)
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == state::IN_PROGRESS
    }

    /// Case-insensitive tag membership, matching how the service compares tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether the item sits at `area` or one of its sub-areas.
    pub fn is_under_area(&self, area: &str) -> bool {
        area_is_under(&self.area_path, area)
    }
}

/// Split the service's `;`-separated tag string.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// `UNDER` semantics: equal to `area`, or a descendant separated by `\`.
/// Area paths compare case-insensitively.
pub fn area_is_under(path: &str, area: &str) -> bool {
    let path = path.to_lowercase();
    let area = area.to_lowercase();
    path == area
        || path
            .strip_prefix(&area)
            .is_some_and(|rest| rest.starts_with('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("MEET; Q3 ;"), vec!["MEET", "Q3"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_area_is_under() {
        assert!(area_is_under("AGI\\MEET", "AGI\\MEET"));
        assert!(area_is_under("AGI\\MEET\\Team A", "AGI\\MEET"));
        assert!(area_is_under("agi\\meet", "AGI\\MEET"));
        assert!(!area_is_under("AGI\\MEETING", "AGI\\MEET"));
        assert!(!area_is_under("AGI", "AGI\\MEET"));
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let item = WorkItem::new(1, "t", state::NEW).with_tags(&["meet", "Q3"]);
        assert!(item.has_tag("MEET"));
        assert!(!item.has_tag("EEM"));
    }

    #[test]
    fn test_non_date_field_is_not_a_date() {
        let item = WorkItem::new(1, "t", state::NEW)
            .with_field(field::TARGET_DATE, FieldValue::Text("soon".to_string()));
        assert_eq!(item.target_date(), None);
    }
}
