//! JSON Patch document for creating a MEET child Feature under a portfolio
//! parent.
//!
//! The document is only built and printed; sending it is left to the user.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{field, state, CoreError, Result};

/// Relation type pointing from a child to its parent.
pub const PARENT_LINK_TYPE: &str = "System.LinkTypes.Hierarchy-Reverse";

/// One JSON Patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: Value,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: path.into(),
            value,
        }
    }

    fn add_field(name: &str, value: Value) -> Self {
        Self::add(format!("/fields/{}", name), value)
    }
}

/// Where the new child goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildTemplate {
    /// Organization URL, e.g. `https://dev.azure.com/eon-seed`.
    pub org_url: String,
    pub area_path: String,
    pub comment: String,
}

impl ChildTemplate {
    pub fn meet(org_url: &str) -> Self {
        Self {
            org_url: org_url.trim_end_matches('/').to_string(),
            area_path: crate::config::DEFAULT_CHILD_AREA.to_string(),
            comment: "Auto-linked from EEM Portfolio (MEET) -> AGI\\MEET".to_string(),
        }
    }
}

/// Build the patch for a parent work item payload (`{"id": .., "fields": {..}}`).
///
/// Title and description are always set (empty when absent). Start and target
/// dates are copied only when present and non-null.
pub fn build_child_patch(parent: &Value, template: &ChildTemplate) -> Result<Vec<PatchOperation>> {
    let parent_id = parent
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| CoreError::InvalidPortfolioItem("missing numeric 'id'".to_string()))?;

    let empty = Map::new();
    let fields = parent
        .get("fields")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let text = |name: &str| {
        fields
            .get(name)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| json!(""))
    };

    let mut ops = vec![
        PatchOperation::add_field(field::TITLE, text(field::TITLE)),
        PatchOperation::add_field(field::AREA_PATH, json!(template.area_path)),
        PatchOperation::add_field(field::STATE, json!(state::NEW)),
        PatchOperation::add_field(field::DESCRIPTION, text(field::DESCRIPTION)),
    ];

    for name in [field::START_DATE, field::TARGET_DATE] {
        if let Some(value) = fields.get(name).filter(|v| !v.is_null()) {
            ops.push(PatchOperation::add_field(name, value.clone()));
        }
    }

    ops.push(PatchOperation::add(
        "/relations/-",
        json!({
            "rel": PARENT_LINK_TYPE,
            "url": format!("{}/_apis/wit/workitems/{}", template.org_url, parent_id),
            "attributes": { "comment": template.comment },
        }),
    ));

    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ChildTemplate {
        ChildTemplate::meet("https://dev.azure.com/eon-seed/")
    }

    #[test]
    fn test_full_parent() {
        let parent = json!({
            "id": 4711,
            "fields": {
                "System.Title": "Smart meter rollout",
                "System.Description": "<p>desc</p>",
                "Microsoft.VSTS.Scheduling.StartDate": "2026-01-01T00:00:00Z",
                "Microsoft.VSTS.Scheduling.TargetDate": "2026-06-30T00:00:00Z"
            }
        });
        let ops = build_child_patch(&parent, &template()).unwrap();
        let paths: Vec<&str> = ops.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/fields/System.Title",
                "/fields/System.AreaPath",
                "/fields/System.State",
                "/fields/System.Description",
                "/fields/Microsoft.VSTS.Scheduling.StartDate",
                "/fields/Microsoft.VSTS.Scheduling.TargetDate",
                "/relations/-",
            ]
        );
        assert!(ops.iter().all(|o| o.op == "add"));
        assert_eq!(ops[1].value, json!("AGI\\MEET"));
        assert_eq!(ops[2].value, json!("New"));

        let relation = &ops[6].value;
        assert_eq!(relation["rel"], json!(PARENT_LINK_TYPE));
        assert_eq!(
            relation["url"],
            json!("https://dev.azure.com/eon-seed/_apis/wit/workitems/4711")
        );
    }

    #[test]
    fn test_missing_dates_skipped_and_text_defaults() {
        let parent = json!({
            "id": 1,
            "fields": { "Microsoft.VSTS.Scheduling.TargetDate": null }
        });
        let ops = build_child_patch(&parent, &template()).unwrap();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0].value, json!(""));
        assert_eq!(ops[3].value, json!(""));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = build_child_patch(&json!({"fields": {}}), &template()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPortfolioItem(_)));
    }

    #[test]
    fn test_serializes_as_json_patch() {
        let op = PatchOperation::add("/fields/System.State", json!("New"));
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(
            v,
            json!({"op": "add", "path": "/fields/System.State", "value": "New"})
        );
    }
}
