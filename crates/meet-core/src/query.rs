//! Work item queries.
//!
//! A [`WorkItemQuery`] describes a flat WIQL selection. It renders to WIQL for
//! the remote service and can also be evaluated directly against a
//! [`WorkItem`], which is what the in-memory source does.

use serde::{Deserialize, Serialize};

use crate::domain::WorkItem;

/// How the area path constraint is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", content = "path", rename_all = "snake_case")]
pub enum AreaFilter {
    /// `[System.AreaPath] = '<path>'`
    Exact(String),
    /// `[System.AreaPath] UNDER '<path>'`, the area and all sub-areas.
    Under(String),
}

/// A single flat query over work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemQuery {
    /// Human-readable label used in logs and error messages.
    pub label: String,
    pub project: String,
    pub work_item_type: String,
    pub area: Option<AreaFilter>,
    /// Allowed states. Empty means any state.
    pub states: Vec<String>,
    /// Tag that must be present.
    pub tag: Option<String>,
}

impl WorkItemQuery {
    /// Features in `project`, any area, any state.
    pub fn features(label: &str, project: &str) -> Self {
        Self {
            label: label.to_string(),
            project: project.to_string(),
            work_item_type: "Feature".to_string(),
            area: None,
            states: Vec::new(),
            tag: None,
        }
    }

    pub fn with_area(mut self, area: AreaFilter) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.states.push(state.to_string());
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    /// Render as a WIQL statement selecting ids.
    pub fn to_wiql(&self) -> String {
        let mut clauses = vec![
            format!("[System.TeamProject] = '{}'", escape(&self.project)),
            format!("[System.WorkItemType] = '{}'", escape(&self.work_item_type)),
        ];

        match &self.area {
            Some(AreaFilter::Exact(path)) => {
                clauses.push(format!("[System.AreaPath] = '{}'", escape(path)))
            }
            Some(AreaFilter::Under(path)) => {
                clauses.push(format!("[System.AreaPath] UNDER '{}'", escape(path)))
            }
            None => {}
        }

        match self.states.as_slice() {
            [] => {}
            [single] => clauses.push(format!("[System.State] = '{}'", escape(single))),
            many => {
                let list = many
                    .iter()
                    .map(|s| format!("'{}'", escape(s)))
                    .collect::<Vec<_>>()
                    .join(", ");
                clauses.push(format!("[System.State] IN ({})", list));
            }
        }

        if let Some(tag) = &self.tag {
            clauses.push(format!("[System.Tags] CONTAINS '{}'", escape(tag)));
        }

        format!(
            "SELECT [System.Id] FROM WorkItems WHERE {} ORDER BY [System.Id]",
            clauses.join(" AND ")
        )
    }

    /// Evaluate the query against an already fetched item.
    pub fn matches(&self, item: &WorkItem) -> bool {
        if item.team_project != self.project || item.work_item_type != self.work_item_type {
            return false;
        }

        let area_ok = match &self.area {
            Some(AreaFilter::Exact(path)) => item.area_path.eq_ignore_ascii_case(path),
            Some(AreaFilter::Under(path)) => item.is_under_area(path),
            None => true,
        };

        let state_ok = self.states.is_empty() || self.states.iter().any(|s| *s == item.state);
        let tag_ok = self.tag.as_deref().map_or(true, |t| item.has_tag(t));

        area_ok && state_ok && tag_ok
    }
}

impl std::fmt::Display for WorkItemQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// WIQL string literals escape a single quote by doubling it.
fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state;

    fn meet_children() -> WorkItemQuery {
        WorkItemQuery::features("children", "AGI")
            .with_area(AreaFilter::Exact("AGI\\MEET".to_string()))
            .with_state(state::IN_PROGRESS)
    }

    #[test]
    fn test_to_wiql_exact_area_single_state() {
        let wiql = meet_children().to_wiql();
        assert!(wiql.starts_with("SELECT [System.Id] FROM WorkItems WHERE "));
        assert!(wiql.contains("[System.TeamProject] = 'AGI'"));
        assert!(wiql.contains("[System.WorkItemType] = 'Feature'"));
        assert!(wiql.contains("[System.AreaPath] = 'AGI\\MEET'"));
        assert!(wiql.contains("[System.State] = 'In Progress'"));
        assert!(!wiql.contains("Tags"));
    }

    #[test]
    fn test_to_wiql_under_states_and_tag() {
        let wiql = WorkItemQuery::features("parents", "EEM Portfolio")
            .with_area(AreaFilter::Under("EEM Portfolio".to_string()))
            .with_state(state::NEW)
            .with_state(state::IN_PROGRESS)
            .with_tag("MEET")
            .to_wiql();
        assert!(wiql.contains("[System.AreaPath] UNDER 'EEM Portfolio'"));
        assert!(wiql.contains("[System.State] IN ('New', 'In Progress')"));
        assert!(wiql.contains("[System.Tags] CONTAINS 'MEET'"));
    }

    #[test]
    fn test_to_wiql_escapes_quotes() {
        let wiql = WorkItemQuery::features("q", "O'Brien").to_wiql();
        assert!(wiql.contains("'O''Brien'"));
    }

    #[test]
    fn test_matches() {
        let query = meet_children();
        let hit = WorkItem::new(1, "a", state::IN_PROGRESS)
            .with_project("AGI")
            .with_area("AGI\\MEET");
        assert!(query.matches(&hit));

        let sub_area = hit.clone().with_area("AGI\\MEET\\Sub");
        assert!(!query.matches(&sub_area));

        let wrong_state = WorkItem::new(2, "b", state::NEW)
            .with_project("AGI")
            .with_area("AGI\\MEET");
        assert!(!query.matches(&wrong_state));

        let wrong_type = hit.clone().with_type("Epic");
        assert!(!query.matches(&wrong_type));
    }

    #[test]
    fn test_matches_tag() {
        let query = WorkItemQuery::features("p", "EEM Portfolio").with_tag("MEET");
        let tagged = WorkItem::new(1, "a", state::NEW)
            .with_project("EEM Portfolio")
            .with_tags(&["MEET"]);
        let untagged = WorkItem::new(2, "b", state::NEW).with_project("EEM Portfolio");
        assert!(query.matches(&tagged));
        assert!(!query.matches(&untagged));
    }
}
