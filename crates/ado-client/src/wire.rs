//! Wire formats of the work item tracking REST API.

use std::sync::OnceLock;

use meet_core::{field, split_tags, FieldValue, WorkItem, WorkItemId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Relation type from a child to its parent.
pub const PARENT_RELATION: &str = "System.LinkTypes.Hierarchy-Reverse";

/// Body of `POST {project}/_apis/wit/wiql`.
#[derive(Debug, Serialize)]
pub struct WiqlRequest<'a> {
    pub query: &'a str,
}

/// Response of a flat WIQL query.
#[derive(Debug, Deserialize)]
pub struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    pub work_items: Vec<WiqlReference>,
}

#[derive(Debug, Deserialize)]
pub struct WiqlReference {
    pub id: u64,
}

/// Body of `POST _apis/wit/workitemsbatch`.
///
/// `$expand` cannot be combined with a field list, so all fields come back.
#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    pub ids: &'a [u64],
    #[serde(rename = "$expand")]
    pub expand: &'static str,
    /// `Omit` returns `null` for deleted or inaccessible ids instead of
    /// failing the whole batch.
    #[serde(rename = "errorPolicy")]
    pub error_policy: &'static str,
}

impl<'a> BatchRequest<'a> {
    pub fn with_relations(ids: &'a [u64]) -> Self {
        Self {
            ids,
            expand: "Relations",
            error_policy: "Omit",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub value: Vec<Option<WireWorkItem>>,
}

#[derive(Debug, Deserialize)]
pub struct WireWorkItem {
    pub id: u64,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub relations: Option<Vec<WireRelation>>,
}

#[derive(Debug, Deserialize)]
pub struct WireRelation {
    pub rel: String,
    #[serde(default)]
    pub url: String,
}

fn work_item_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The service may spell the segment `workItems`.
    RE.get_or_init(|| Regex::new(r"(?i)/workitems/(\d+)$").expect("valid regex"))
}

/// Parent id from the first `Hierarchy-Reverse` relation, if any.
pub fn parent_id(relations: &[WireRelation]) -> Option<WorkItemId> {
    let relation = relations.iter().find(|r| r.rel == PARENT_RELATION)?;
    let caps = work_item_url_re().captures(&relation.url)?;
    caps.get(1)?.as_str().parse().ok().map(WorkItemId)
}

impl WireWorkItem {
    fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Convert into the domain snapshot. Every field is kept in
    /// `WorkItem::fields`; well-known ones are also lifted into typed members.
    pub fn into_work_item(self) -> WorkItem {
        let parent = self.relations.as_deref().and_then(parent_id);
        let tags = self
            .fields
            .get(field::TAGS)
            .and_then(Value::as_str)
            .map(split_tags)
            .unwrap_or_default();

        WorkItem {
            id: WorkItemId(self.id),
            work_item_type: self.text(field::WORK_ITEM_TYPE),
            title: self.text(field::TITLE),
            state: self.text(field::STATE),
            area_path: self.text(field::AREA_PATH),
            team_project: self.text(field::TEAM_PROJECT),
            tags,
            fields: self
                .fields
                .iter()
                .filter_map(|(k, v)| FieldValue::from_json(v).map(|v| (k.clone(), v)))
                .collect(),
            parent,
        }
    }
}
