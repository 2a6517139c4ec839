//! Typed custom field values.
//!
//! Azure DevOps returns field values as loosely typed JSON. The schema of a
//! project is not known at compile time, so every value is decoded into a
//! tagged [`FieldValue`] and an absent field is simply `None`.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `Microsoft.VSTS.Scheduling.TargetDate` on child Features.
pub const TARGET_DATE: &str = "Microsoft.VSTS.Scheduling.TargetDate";
/// `Microsoft.VSTS.Scheduling.StartDate`.
pub const START_DATE: &str = "Microsoft.VSTS.Scheduling.StartDate";
/// `Custom.ImplementationEndDate` on portfolio Features.
pub const IMPLEMENTATION_END_DATE: &str = "Custom.ImplementationEndDate";

pub const ID: &str = "System.Id";
pub const TITLE: &str = "System.Title";
pub const STATE: &str = "System.State";
pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";
pub const AREA_PATH: &str = "System.AreaPath";
pub const TEAM_PROJECT: &str = "System.TeamProject";
pub const TAGS: &str = "System.Tags";
pub const DESCRIPTION: &str = "System.Description";

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// A calendar date without time or offset.
    Date(NaiveDate),
    /// An RFC 3339 timestamp with its offset. Date-only fields come back as
    /// the user's local midnight expressed in UTC.
    Timestamp(DateTime<FixedOffset>),
    Text(String),
    Number(f64),
    Bool(bool),
    /// Identity references and other structured values.
    Other(Value),
}

impl FieldValue {
    /// Decode a raw JSON value. `null` decodes to `None`.
    ///
    /// RFC 3339 strings become [`FieldValue::Timestamp`], other ISO-8601
    /// dates become [`FieldValue::Date`]; every other string stays text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::String(s) => Some(match DateTime::parse_from_rfc3339(s.trim()) {
                Ok(ts) => FieldValue::Timestamp(ts),
                Err(_) => match parse_date(s) {
                    Some(date) => FieldValue::Date(date),
                    None => FieldValue::Text(s.clone()),
                },
            }),
            other => Some(FieldValue::Other(other.clone())),
        }
    }

    /// Calendar date as written. Timestamps keep their own offset.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Timestamp(ts) => Some(ts.date_naive()),
            _ => None,
        }
    }

    /// Calendar date as seen in `tz`. Plain dates are returned unchanged.
    pub fn as_date_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Timestamp(ts) => Some(ts.with_timezone(tz).date_naive()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value carries no information (blank text).
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Other(v) => write!(f, "{}", v),
        }
    }
}

/// Parse the calendar date out of an ISO-8601 value.
///
/// Timestamps keep the date as written (`2026-06-30T00:00:00Z` is
/// 2026-06-30); no time zone conversion happens.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    // Timestamps without an offset, e.g. `2026-06-30T00:00:00`
    raw.get(..10)
        .filter(|_| raw.as_bytes().get(10) == Some(&b'T'))
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}
