//! Report scopes: which projects, areas, states and tags each report reads.
//!
//! Defaults match the MEET setup: child Features live in `AGI\MEET`, their
//! portfolio parents in `EEM Portfolio`.

use serde::{Deserialize, Serialize};

use crate::domain::state;
use crate::health::ProgressFields;
use crate::query::{AreaFilter, WorkItemQuery};

pub const DEFAULT_CHILD_PROJECT: &str = "AGI";
pub const DEFAULT_CHILD_AREA: &str = "AGI\\MEET";
pub const DEFAULT_PARENT_PROJECT: &str = "EEM Portfolio";
pub const DEFAULT_MEET_TAG: &str = "MEET";

/// Scope of the weekly consistency report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyScope {
    pub child_project: String,
    /// Children must sit exactly in this area (no sub-areas).
    pub child_area: String,
    pub child_state: String,
    /// Parents outside this project count as "not found".
    pub parent_project: String,
}

impl Default for WeeklyScope {
    fn default() -> Self {
        Self {
            child_project: DEFAULT_CHILD_PROJECT.to_string(),
            child_area: DEFAULT_CHILD_AREA.to_string(),
            child_state: state::IN_PROGRESS.to_string(),
            parent_project: DEFAULT_PARENT_PROJECT.to_string(),
        }
    }
}

impl WeeklyScope {
    pub fn children_query(&self) -> WorkItemQuery {
        WorkItemQuery::features(
            &format!(
                "children in {}/{} with state '{}'",
                self.child_project, self.child_area, self.child_state
            ),
            &self.child_project,
        )
        .with_area(AreaFilter::Exact(self.child_area.clone()))
        .with_state(&self.child_state)
    }
}

/// Scope of the missing-child report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingChildScope {
    pub parent_project: String,
    pub parent_state: String,
    pub tag: String,
    pub child_project: String,
    /// Children may sit in this area or any sub-area, in any state.
    pub child_area: String,
}

impl Default for MissingChildScope {
    fn default() -> Self {
        Self {
            parent_project: DEFAULT_PARENT_PROJECT.to_string(),
            parent_state: state::READY_FOR_DELIVERY.to_string(),
            tag: DEFAULT_MEET_TAG.to_string(),
            child_project: DEFAULT_CHILD_PROJECT.to_string(),
            child_area: DEFAULT_CHILD_AREA.to_string(),
        }
    }
}

impl MissingChildScope {
    pub fn parents_query(&self) -> WorkItemQuery {
        WorkItemQuery::features(
            &format!(
                "parents in {} with state '{}' tagged '{}'",
                self.parent_project, self.parent_state, self.tag
            ),
            &self.parent_project,
        )
        .with_state(&self.parent_state)
        .with_tag(&self.tag)
    }

    pub fn children_query(&self) -> WorkItemQuery {
        WorkItemQuery::features(
            &format!("children under {}/{}", self.child_project, self.child_area),
            &self.child_project,
        )
        .with_area(AreaFilter::Under(self.child_area.clone()))
    }

    /// `AGI/AGI\MEET` style label for messages.
    pub fn child_scope_label(&self) -> String {
        format!("{}/{}", self.child_project, self.child_area)
    }
}

/// Scope of the health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScope {
    pub project: String,
    pub area: String,
    /// States to report, in display order.
    pub states: Vec<String>,
    pub progress: ProgressFields,
}

impl Default for HealthScope {
    fn default() -> Self {
        Self {
            project: DEFAULT_CHILD_PROJECT.to_string(),
            area: DEFAULT_CHILD_AREA.to_string(),
            states: vec![state::NEW.to_string(), state::IN_PROGRESS.to_string()],
            progress: ProgressFields::default(),
        }
    }
}

impl HealthScope {
    pub fn query(&self) -> WorkItemQuery {
        let query = WorkItemQuery::features(
            &format!("features in {}/{}", self.project, self.area),
            &self.project,
        )
        .with_area(AreaFilter::Exact(self.area.clone()));
        self.states
            .iter()
            .fold(query, |query, state| query.with_state(state))
    }
}
