//! Domain models for the MEET reports.
//!
//! - `WorkItem`: immutable snapshot of a tracked work item
//! - `FieldValue`: tagged custom field value
//! - `Finding`: one inconsistency reported by a rule

pub mod error;
pub mod field;
pub mod finding;
pub mod work_item;

pub use error::{BoxError, CoreError, Result};
pub use field::FieldValue;
pub use finding::{sort_findings, Finding, ItemRef, RuleId};
pub use work_item::{area_is_under, split_tags, state, WorkItem, WorkItemId};
