//! Consistency rules for linked child/parent pairs.
//!
//! Each [`LinkRule`] is an independent predicate over a [`Link`]; a pair can
//! produce zero, one or several findings. The combined output is sorted by
//! child id and rule order, so evaluation order never shows in the report.

use serde::{Deserialize, Serialize};

use crate::domain::{sort_findings, Finding, ItemRef, RuleId};
use crate::linker::{Link, Linkage};

/// A rule evaluated against every resolved link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRule {
    /// Child is "In Progress" but the parent is not. Exact state match.
    StatusMismatch,
    /// Child TargetDate is strictly after parent ImplementationEndDate.
    /// Does not fire when either date is absent.
    DateOrdering,
}

impl LinkRule {
    pub fn id(&self) -> RuleId {
        match self {
            LinkRule::StatusMismatch => RuleId::StatusMismatch,
            LinkRule::DateOrdering => RuleId::DateOrdering,
        }
    }
}

/// The rules to apply to each link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRuleSet {
    pub rules: Vec<LinkRule>,
}

impl LinkRuleSet {
    /// Status mismatch + date ordering.
    pub fn standard() -> Self {
        Self {
            rules: vec![LinkRule::StatusMismatch, LinkRule::DateOrdering],
        }
    }
}

impl Default for LinkRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Apply a single rule to a single link.
pub fn check_link(rule: LinkRule, link: &Link<'_>) -> Option<Finding> {
    let Link { child, parent } = *link;
    match rule {
        LinkRule::StatusMismatch => {
            if child.is_in_progress() && !parent.is_in_progress() {
                Some(
                    Finding::new(
                        rule.id(),
                        ItemRef::from(child),
                        format!(
                            "Child {} is '{}' but parent {} is '{}'",
                            child.id, child.state, parent.id, parent.state
                        ),
                    )
                    .with_related(
                        ItemRef::from(parent).with_note(format!("state={}", parent.state)),
                    ),
                )
            } else {
                None
            }
        }
        LinkRule::DateOrdering => {
            let target = child.target_date()?;
            let end = parent.implementation_end_date()?;
            if target > end {
                Some(
                    Finding::new(
                        rule.id(),
                        ItemRef::from(child).with_note(format!("TargetDate={}", target)),
                        format!(
                            "Child {} TargetDate {} is after parent {} ImplementationEndDate {}",
                            child.id, target, parent.id, end
                        ),
                    )
                    .with_related(
                        ItemRef::from(parent).with_note(format!("ImplementationEndDate={}", end)),
                    ),
                )
            } else {
                None
            }
        }
    }
}

/// Apply every rule in `rule_set` to every link, in report order.
pub fn evaluate_links(rule_set: &LinkRuleSet, links: &[Link<'_>]) -> Vec<Finding> {
    let mut findings: Vec<Finding> = links
        .iter()
        .flat_map(|link| {
            rule_set
                .rules
                .iter()
                .filter_map(move |rule| check_link(*rule, link))
        })
        .collect();
    sort_findings(&mut findings);
    findings
}

/// Rule findings for resolved links plus `ParentNotFound` findings for
/// unresolved children, in report order.
pub fn evaluate_linkage(
    rule_set: &LinkRuleSet,
    linkage: &Linkage<'_>,
    portfolio: &str,
) -> Vec<Finding> {
    let mut findings = evaluate_links(rule_set, &linkage.links);
    findings.extend(linkage.unresolved_findings(portfolio));
    sort_findings(&mut findings);
    findings
}
