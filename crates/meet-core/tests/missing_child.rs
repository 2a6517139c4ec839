//! Missing-child existence check end to end.

use chrono::{DateTime, FixedOffset};
use meet_core::fakes::MemoryWorkItemSource;
use meet_core::{
    render_missing_child, run_missing_child, state, MissingChildScope, RuleId, WorkItem,
    WorkItemId, WorkItemLinks,
};

struct Links;

impl WorkItemLinks for Links {
    fn edit_url(&self, project: &str, id: WorkItemId) -> String {
        format!("https://dev.azure.com/test/{}/_workitems/edit/{}", project, id)
    }
}

fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-10-14T08:00:00+00:00").expect("timestamp")
}

fn meet_parent(id: u64) -> WorkItem {
    WorkItem::new(id, &format!("portfolio {}", id), state::READY_FOR_DELIVERY)
        .with_project("EEM Portfolio")
        .with_tags(&["MEET", "2026"])
}

fn meet_child(id: u64, parent: u64) -> WorkItem {
    WorkItem::new(id, &format!("child {}", id), state::NEW)
        .with_project("AGI")
        .with_area("AGI\\MEET")
        .with_parent(parent)
}

async fn missing_ids(source: &MemoryWorkItemSource) -> Vec<u64> {
    run_missing_child(source, &MissingChildScope::default(), now())
        .await
        .expect("report")
        .findings
        .iter()
        .map(|f| f.subject.id.0)
        .collect()
}

#[tokio::test]
async fn parent_without_child_is_reported_until_child_added() {
    let source = MemoryWorkItemSource::with_items([meet_parent(9)]);
    assert_eq!(missing_ids(&source).await, vec![9]);

    source.insert(meet_child(103, 9));
    assert!(missing_ids(&source).await.is_empty());

    source.remove(WorkItemId(103));
    assert_eq!(missing_ids(&source).await, vec![9]);
}

#[tokio::test]
async fn children_in_sub_areas_and_any_state_count() {
    let done_child = WorkItem::new(300, "done", "Done")
        .with_project("AGI")
        .with_area("AGI\\MEET\\Platform")
        .with_parent(9);
    let source = MemoryWorkItemSource::with_items([meet_parent(9), done_child]);

    assert!(missing_ids(&source).await.is_empty());
}

#[tokio::test]
async fn children_outside_area_do_not_count() {
    let foreign = WorkItem::new(301, "other area", state::NEW)
        .with_project("AGI")
        .with_area("AGI\\Grid")
        .with_parent(9);
    let source = MemoryWorkItemSource::with_items([meet_parent(9), foreign]);

    assert_eq!(missing_ids(&source).await, vec![9]);
}

#[tokio::test]
async fn untagged_or_other_state_parents_are_out_of_scope() {
    let untagged = WorkItem::new(5, "untagged", state::READY_FOR_DELIVERY)
        .with_project("EEM Portfolio");
    let in_progress = meet_parent(6);
    let in_progress = WorkItem {
        state: state::IN_PROGRESS.to_string(),
        ..in_progress
    };
    let source = MemoryWorkItemSource::with_items([untagged, in_progress, meet_parent(7)]);

    assert_eq!(missing_ids(&source).await, vec![7]);
}

#[tokio::test]
async fn report_lists_missing_parents_with_links() {
    let source = MemoryWorkItemSource::with_items([
        meet_parent(12),
        meet_parent(4),
        meet_parent(8),
        meet_child(100, 8),
    ]);

    let report = run_missing_child(&source, &MissingChildScope::default(), now())
        .await
        .expect("report");
    assert_eq!(report.parent_count, 3);
    assert_eq!(report.child_count, 1);
    assert!(report.findings.iter().all(|f| f.rule == RuleId::MissingChild));

    let text = render_missing_child(&report, &Links);
    let first = text.find("- 4 |").expect("parent 4 listed");
    let second = text.find("- 12 |").expect("parent 12 listed");
    assert!(first < second);
    assert!(text.contains("https://dev.azure.com/test/EEM Portfolio/_workitems/edit/12"));
    assert!(!text.contains("- 8 |"));
}

#[tokio::test]
async fn failing_child_query_fails_whole_report() {
    let source = MemoryWorkItemSource::with_items([meet_parent(9)]);
    let scope = MissingChildScope::default();
    source.fail_query(&scope.children_query().label);

    let result = run_missing_child(&source, &scope, now()).await;

    assert!(result.is_err());
}
