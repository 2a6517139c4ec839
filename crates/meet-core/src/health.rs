//! Delivery health: target date traffic lights and progress data quality.
//!
//! Target dates are read in the caller's time zone (a date-only field is
//! stored as local midnight in UTC) and classified relative to "today":
//! - `Missing`: no TargetDate (or not a date)
//! - `Red`: TargetDate before today
//! - `Yellow`: TargetDate inside next calendar week (Monday..Sunday)
//! - `Green`: anything else from today on

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{sort_findings, Finding, ItemRef, RuleId, WorkItem};

/// Progress status value that requires a progress info comment.
pub const AMBER: &str = "2-Amber";

/// Traffic light for a single target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrafficLight {
    Green,
    Yellow,
    Red,
    Missing,
}

impl std::fmt::Display for TrafficLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrafficLight::Green => "GREEN",
            TrafficLight::Yellow => "YELLOW",
            TrafficLight::Red => "RED",
            TrafficLight::Missing => "MISSING",
        };
        f.write_str(s)
    }
}

/// Monday of next calendar week. Always 1 to 7 days after `today`.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days_from_monday = i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(7 - days_from_monday)
}

/// Classify a target date against `today`.
pub fn classify_target_date(target: Option<NaiveDate>, today: NaiveDate) -> TrafficLight {
    let Some(date) = target else {
        return TrafficLight::Missing;
    };
    if date < today {
        return TrafficLight::Red;
    }
    let week_start = next_monday(today);
    let week_end = week_start + Duration::days(6);
    if (week_start..=week_end).contains(&date) {
        TrafficLight::Yellow
    } else {
        TrafficLight::Green
    }
}

/// Items of one state grouped by traffic light.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    pub state: String,
    pub items: BTreeMap<TrafficLight, Vec<ItemRef>>,
}

impl Buckets {
    pub fn count(&self, light: TrafficLight) -> usize {
        self.items.get(&light).map_or(0, Vec::len)
    }

    pub fn get(&self, light: TrafficLight) -> &[ItemRef] {
        self.items.get(&light).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Field names holding the progress status and its explanatory text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressFields {
    pub status: String,
    pub info: String,
}

impl Default for ProgressFields {
    fn default() -> Self {
        Self {
            status: "Custom.ProgressStatus".to_string(),
            info: "Custom.ProgressInfo".to_string(),
        }
    }
}

/// Keep `configured` when the sample carries both fields; otherwise look for
/// fields named like `Progress…Status` / `Progress…Info` on the sample.
///
/// The service omits empty fields from responses, so absence on one item is
/// only a hint that the configured names may be wrong.
pub fn discover_progress_fields(sample: &WorkItem, configured: &ProgressFields) -> ProgressFields {
    if sample.fields.contains_key(&configured.status) && sample.fields.contains_key(&configured.info)
    {
        return configured.clone();
    }

    let find = |pattern: &str| -> Option<String> {
        let re = Regex::new(pattern).ok()?;
        sample.fields.keys().find(|k| re.is_match(k)).cloned()
    };

    ProgressFields {
        status: find(r"(?i)Progress.*Status").unwrap_or_else(|| configured.status.clone()),
        info: find(r"(?i)Progress.*Info").unwrap_or_else(|| configured.info.clone()),
    }
}

/// Progress data quality findings, ordered by item id.
///
/// An item missing its status is not checked for the amber rule.
pub fn data_quality_findings(items: &[WorkItem], fields: &ProgressFields) -> Vec<Finding> {
    let mut findings = Vec::new();
    for item in items {
        let status = item.field(&fields.status).filter(|v| !v.is_blank());
        let Some(status) = status else {
            findings.push(Finding::new(
                RuleId::ProgressStatusMissing,
                ItemRef::from(item),
                format!("Feature {} has no progress status", item.id),
            ));
            continue;
        };

        let is_amber = status.as_text().is_some_and(|s| s.trim() == AMBER);
        let has_info = item.field(&fields.info).is_some_and(|v| !v.is_blank());
        if is_amber && !has_info {
            findings.push(Finding::new(
                RuleId::AmberWithoutInfo,
                ItemRef::from(item),
                format!("Feature {} is '{}' without progress info", item.id, AMBER),
            ));
        }
    }
    sort_findings(&mut findings);
    findings
}

/// Everything the health report prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub today: NaiveDate,
    pub next_week_start: NaiveDate,
    pub total: usize,
    /// One entry per configured state, in configured order.
    pub buckets: Vec<Buckets>,
    pub progress_fields: ProgressFields,
    pub quality: Vec<Finding>,
}

impl HealthReport {
    pub fn next_week_end(&self) -> NaiveDate {
        self.next_week_start + Duration::days(6)
    }

    pub fn buckets_for(&self, state: &str) -> Option<&Buckets> {
        self.buckets.iter().find(|b| b.state == state)
    }

    /// Up to `limit` urgent items of `state`: missing target dates first,
    /// then overdue ones.
    pub fn urgent(&self, state: &str, limit: usize) -> Vec<&ItemRef> {
        self.buckets_for(state)
            .map(|b| {
                b.get(TrafficLight::Missing)
                    .iter()
                    .chain(b.get(TrafficLight::Red))
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn findings_for(&self, rule: RuleId) -> impl Iterator<Item = &Finding> {
        self.quality.iter().filter(move |f| f.rule == rule)
    }
}

/// Classify `items` into per-state buckets and run the data quality checks.
///
/// `today` and every TargetDate are taken in the time zone of `now`.
/// Items are deduplicated by id and processed in id order. Items in a state
/// not listed in `states` are left out of the buckets but still checked for
/// data quality.
pub fn build_health_report<Tz: TimeZone>(
    items: &[WorkItem],
    states: &[String],
    now: &DateTime<Tz>,
    configured: &ProgressFields,
) -> HealthReport {
    let tz = now.timezone();
    let today = now.date_naive();
    let unique: BTreeMap<_, &WorkItem> = items.iter().map(|i| (i.id, i)).collect();
    let items: Vec<WorkItem> = unique.into_values().cloned().collect();

    let mut buckets: Vec<Buckets> = states
        .iter()
        .map(|s| Buckets {
            state: s.clone(),
            items: BTreeMap::new(),
        })
        .collect();

    for item in &items {
        let target = item.target_date_in(&tz);
        let light = classify_target_date(target, today);
        let entry = match target {
            Some(date) => ItemRef::from(item).with_note(format!("TargetDate={}", date)),
            None => ItemRef::from(item),
        };
        if let Some(bucket) = buckets.iter_mut().find(|b| b.state == item.state) {
            bucket.items.entry(light).or_default().push(entry);
        }
    }

    let progress_fields = items
        .first()
        .map(|sample| discover_progress_fields(sample, configured))
        .unwrap_or_else(|| configured.clone());
    let quality = data_quality_findings(&items, &progress_fields);

    HealthReport {
        today,
        next_week_start: next_monday(today),
        total: items.len(),
        buckets,
        progress_fields,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{field, state, FieldValue};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_monday() {
        // 2026-10-14 is a Wednesday
        assert_eq!(next_monday(date(2026, 10, 14)), date(2026, 10, 19));
        // a Monday moves a full week ahead
        assert_eq!(next_monday(date(2026, 10, 19)), date(2026, 10, 26));
        // a Sunday moves to the next day
        assert_eq!(next_monday(date(2026, 10, 18)), date(2026, 10, 19));
    }

    #[test]
    fn test_classify_target_date() {
        let today = date(2026, 10, 14);
        assert_eq!(classify_target_date(None, today), TrafficLight::Missing);
        assert_eq!(
            classify_target_date(Some(date(2026, 10, 13)), today),
            TrafficLight::Red
        );
        assert_eq!(classify_target_date(Some(today), today), TrafficLight::Green);
        assert_eq!(
            classify_target_date(Some(date(2026, 10, 18)), today),
            TrafficLight::Green
        );
        assert_eq!(
            classify_target_date(Some(date(2026, 10, 19)), today),
            TrafficLight::Yellow
        );
        assert_eq!(
            classify_target_date(Some(date(2026, 10, 25)), today),
            TrafficLight::Yellow
        );
        assert_eq!(
            classify_target_date(Some(date(2026, 10, 26)), today),
            TrafficLight::Green
        );
    }

    #[test]
    fn test_discover_progress_fields() {
        let configured = ProgressFields::default();
        let sample = WorkItem::new(1, "a", state::NEW)
            .with_field("Custom.Progress_Status", FieldValue::Text("1-Green".into()))
            .with_field("Custom.ProgressInformation", FieldValue::Text("ok".into()));
        let found = discover_progress_fields(&sample, &configured);
        assert_eq!(found.status, "Custom.Progress_Status");
        assert_eq!(found.info, "Custom.ProgressInformation");

        let plain = WorkItem::new(2, "b", state::NEW);
        assert_eq!(discover_progress_fields(&plain, &configured), configured);
    }

    #[test]
    fn test_configured_fields_kept_when_present() {
        let configured = ProgressFields::default();
        let sample = WorkItem::new(1, "a", state::NEW)
            .with_field(&configured.status, FieldValue::Text("1-Green".into()))
            .with_field(&configured.info, FieldValue::Text("ok".into()))
            .with_field("Custom.OtherProgressStatus", FieldValue::Text("x".into()));
        assert_eq!(discover_progress_fields(&sample, &configured), configured);
    }

    #[test]
    fn test_data_quality_findings() {
        let fields = ProgressFields::default();
        let items = vec![
            WorkItem::new(3, "amber ok", state::NEW)
                .with_field(&fields.status, FieldValue::Text(AMBER.into()))
                .with_field(&fields.info, FieldValue::Text("blocked on vendor".into())),
            WorkItem::new(2, "amber blank", state::NEW)
                .with_field(&fields.status, FieldValue::Text(format!(" {} ", AMBER)))
                .with_field(&fields.info, FieldValue::Text("  ".into())),
            WorkItem::new(1, "no status", state::NEW)
                .with_field(&fields.status, FieldValue::Text("".into())),
            WorkItem::new(4, "green", state::NEW)
                .with_field(&fields.status, FieldValue::Text("1-Green".into())),
        ];

        let findings = data_quality_findings(&items, &fields);
        let got: Vec<_> = findings.iter().map(|f| (f.subject.id.0, f.rule)).collect();
        assert_eq!(
            got,
            vec![
                (1, RuleId::ProgressStatusMissing),
                (2, RuleId::AmberWithoutInfo),
            ]
        );
    }

    #[test]
    fn test_target_dates_read_in_local_time() {
        // Wednesday 09:00 in UTC+2; date-only TargetDates arrive as local
        // midnight expressed in UTC.
        let now = DateTime::parse_from_rfc3339("2026-10-14T09:00:00+02:00").unwrap();
        let states = vec![state::IN_PROGRESS.to_string()];
        let target = |id: u64, raw: &str| {
            WorkItem::new(id, "f", state::IN_PROGRESS).with_field(
                field::TARGET_DATE,
                FieldValue::from_json(&serde_json::json!(raw)).unwrap(),
            )
        };
        let items = vec![
            target(1, "2026-10-13T22:00:00Z"),
            target(2, "2026-10-18T22:00:00Z"),
            target(3, "2026-10-12T22:00:00Z"),
        ];

        let report = build_health_report(&items, &states, &now, &ProgressFields::default());
        let b = report.buckets_for(state::IN_PROGRESS).unwrap();

        let green: Vec<_> = b.get(TrafficLight::Green).iter().map(|i| i.id.0).collect();
        let yellow: Vec<_> = b.get(TrafficLight::Yellow).iter().map(|i| i.id.0).collect();
        let red: Vec<_> = b.get(TrafficLight::Red).iter().map(|i| i.id.0).collect();
        assert_eq!(green, vec![1]);
        assert_eq!(yellow, vec![2]);
        assert_eq!(red, vec![3]);
        assert_eq!(
            b.get(TrafficLight::Green)[0].note.as_deref(),
            Some("TargetDate=2026-10-14")
        );
    }

    #[test]
    fn test_build_health_report() {
        let today = date(2026, 10, 14);
        let now = chrono::Utc.from_utc_datetime(&today.and_hms_opt(9, 0, 0).unwrap());
        let states = vec![state::NEW.to_string(), state::IN_PROGRESS.to_string()];
        let items = vec![
            WorkItem::new(1, "late", state::IN_PROGRESS)
                .with_date(field::TARGET_DATE, date(2026, 10, 1)),
            WorkItem::new(2, "undated", state::IN_PROGRESS),
            WorkItem::new(3, "next week", state::NEW)
                .with_date(field::TARGET_DATE, date(2026, 10, 20)),
            WorkItem::new(4, "later", state::IN_PROGRESS)
                .with_date(field::TARGET_DATE, date(2026, 12, 1)),
        ];

        let report = build_health_report(&items, &states, &now, &ProgressFields::default());
        assert_eq!(report.today, today);
        assert_eq!(report.total, 4);
        assert_eq!(report.next_week_start, date(2026, 10, 19));
        assert_eq!(report.next_week_end(), date(2026, 10, 25));

        let ip = report.buckets_for(state::IN_PROGRESS).unwrap();
        assert_eq!(ip.count(TrafficLight::Red), 1);
        assert_eq!(ip.count(TrafficLight::Missing), 1);
        assert_eq!(ip.count(TrafficLight::Green), 1);
        assert_eq!(ip.count(TrafficLight::Yellow), 0);

        let new = report.buckets_for(state::NEW).unwrap();
        assert_eq!(new.count(TrafficLight::Yellow), 1);

        let urgent: Vec<u64> = report
            .urgent(state::IN_PROGRESS, 3)
            .iter()
            .map(|i| i.id.0)
            .collect();
        assert_eq!(urgent, vec![2, 1]);

        // none of the items carry a progress status
        assert_eq!(report.findings_for(RuleId::ProgressStatusMissing).count(), 4);
    }
}
