//! Child → parent link resolution.
//!
//! Every child candidate ends up in exactly one of two places: a resolved
//! [`Link`] to a parent candidate, or an [`UnresolvedChild`] explaining why
//! no parent could be matched. Unresolved children are reported as
//! [`RuleId::ParentNotFound`] findings instead of being dropped.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{Finding, ItemRef, RuleId, WorkItem, WorkItemId};

/// A resolved child → parent relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link<'a> {
    pub child: &'a WorkItem,
    pub parent: &'a WorkItem,
}

/// Why a child could not be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The child declares no parent at all.
    NoParentRelation,
    /// The declared parent is not among the parent candidates.
    ParentNotInPortfolio(WorkItemId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnresolvedChild<'a> {
    pub child: &'a WorkItem,
    pub reason: UnresolvedReason,
}

/// Result of linking one set of children against one set of parents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Linkage<'a> {
    /// Resolved links, ordered by child id.
    pub links: Vec<Link<'a>>,
    /// Children without a resolvable parent, ordered by child id.
    pub unresolved: Vec<UnresolvedChild<'a>>,
}

impl<'a> Linkage<'a> {
    /// Total number of distinct children accounted for.
    pub fn child_count(&self) -> usize {
        self.links.len() + self.unresolved.len()
    }

    /// One `ParentNotFound` finding per unresolved child.
    pub fn unresolved_findings(&self, portfolio: &str) -> Vec<Finding> {
        self.unresolved
            .iter()
            .map(|u| {
                let message = match u.reason {
                    UnresolvedReason::NoParentRelation => {
                        format!("Child {} has no parent link", u.child.id)
                    }
                    UnresolvedReason::ParentNotInPortfolio(pid) => format!(
                        "Parent {} of child {} not found in expected portfolio '{}'",
                        pid, u.child.id, portfolio
                    ),
                };
                let subject = ItemRef::from(u.child);
                let subject = match u.reason {
                    UnresolvedReason::NoParentRelation => subject.with_note("parent=none"),
                    UnresolvedReason::ParentNotInPortfolio(pid) => {
                        subject.with_note(format!("parent={}", pid))
                    }
                };
                Finding::new(RuleId::ParentNotFound, subject, message)
            })
            .collect()
    }
}

/// Resolve each child's declared parent against `parents`.
///
/// Children are deduplicated by id (first occurrence wins) and processed in
/// ascending id order, so the output does not depend on input order.
pub fn link<'a>(children: &'a [WorkItem], parents: &'a [WorkItem]) -> Linkage<'a> {
    let parent_index: HashMap<WorkItemId, &WorkItem> =
        parents.iter().map(|p| (p.id, p)).collect();

    let mut unique: BTreeMap<WorkItemId, &WorkItem> = BTreeMap::new();
    for child in children {
        unique.entry(child.id).or_insert(child);
    }

    let mut linkage = Linkage::default();
    for child in unique.into_values() {
        match child.parent {
            None => linkage.unresolved.push(UnresolvedChild {
                child,
                reason: UnresolvedReason::NoParentRelation,
            }),
            Some(pid) => match parent_index.get(&pid) {
                Some(parent) => linkage.links.push(Link { child, parent }),
                None => linkage.unresolved.push(UnresolvedChild {
                    child,
                    reason: UnresolvedReason::ParentNotInPortfolio(pid),
                }),
            },
        }
    }

    tracing::debug!(
        linked = linkage.links.len(),
        unresolved = linkage.unresolved.len(),
        "linked children to parents"
    );
    linkage
}
