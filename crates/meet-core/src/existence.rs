//! Reverse existence check: tagged parents that no child points at.
//!
//! `violations = parent ids − { parent(child) | child ∈ children }`, computed
//! with a single index over the children.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{Finding, ItemRef, RuleId, WorkItem, WorkItemId};

/// Ids targeted by at least one child's parent relation.
pub fn parents_with_children(children: &[WorkItem]) -> HashSet<WorkItemId> {
    children.iter().filter_map(|c| c.parent).collect()
}

/// One `MissingChild` finding per parent without any child, ordered by
/// parent id. Duplicate parents are reported once.
pub fn missing_children(
    parents: &[WorkItem],
    children: &[WorkItem],
    child_scope: &str,
) -> Vec<Finding> {
    let has_child = parents_with_children(children);

    let unique: BTreeMap<WorkItemId, &WorkItem> = parents.iter().map(|p| (p.id, p)).collect();

    unique
        .into_values()
        .filter(|p| !has_child.contains(&p.id))
        .map(|p| {
            Finding::new(
                RuleId::MissingChild,
                ItemRef::from(p),
                format!("Parent {} has no child Feature in {}", p.id, child_scope),
            )
        })
        .collect()
}
