use std::sync::Arc;

use serde_json::Value;

use super::*;
use crate::model::{
    Goal, GoalDraft, GoalStatus, HeroBadge, HeroBadgeDraft, Project, ProjectDraft, ProjectStatus,
    ProjectType, Skill, SkillDraft, StatusVocabulary, Tool, ToolDraft,
};
use crate::store::{ContentStore, MemoryStore};

fn store() -> Arc<dyn ContentStore> {
    Arc::new(MemoryStore::new())
}

fn skill(name: &str, category: &str, proficiency: i32) -> SkillDraft {
    SkillDraft {
        name: name.into(),
        category: category.into(),
        proficiency: Some(proficiency),
        level: None,
        icon: None,
    }
}

fn project(name: &str) -> ProjectDraft {
    ProjectDraft {
        name: name.into(),
        kind: ProjectType::Web,
        status: ProjectStatus::Building,
        stack: vec!["Rust".into()],
        github_url: None,
        app_url: None,
        description: String::new(),
    }
}

#[tokio::test]
async fn added_skill_lands_at_end_and_edit_keeps_position() {
    let admin = CollectionAdmin::<Skill>::new(store(), EventBus::new());
    admin
        .submit(skill("Rust", "Backend", 80), None)
        .await
        .expect("seed one");
    admin
        .submit(skill("SQL", "Backend", 60), None)
        .await
        .expect("seed two");

    let go = admin
        .submit(skill("Go", "Backend", 70), None)
        .await
        .expect("add");
    assert_eq!(go.order_index, 2);
    let listed = admin.load().await.expect("load");
    assert_eq!(listed.last().map(|item| item.name.as_str()), Some("Go"));

    let edited = admin
        .submit(skill("Go", "Backend", 90), Some(go.id))
        .await
        .expect("edit");
    assert_eq!(edited.proficiency, Some(90));

    let refetched = admin.get(go.id).await.expect("get").expect("present");
    assert_eq!(refetched.proficiency, Some(90));
    assert_eq!(refetched.order_index, 2);
}

#[tokio::test]
async fn invalid_draft_issues_no_write() {
    let store = store();
    let admin = CollectionAdmin::<Skill>::new(store.clone(), EventBus::new());
    let err = admin
        .submit(skill("", "Backend", 50), None)
        .await
        .expect_err("blank name rejected");
    assert!(matches!(err, AdminError::Invalid(_)));
    assert_eq!(
        store.count(&Query::from(Table::Skills)).await.expect("count"),
        0
    );
}

#[tokio::test]
async fn deleted_project_disappears_and_second_delete_is_noop() {
    let store = store();
    let admin = CollectionAdmin::<Project>::new(store.clone(), EventBus::new());
    let kept = admin.submit(project("Kept"), None).await.expect("kept");
    let doomed = admin.submit(project("Doomed"), None).await.expect("doomed");

    assert_eq!(
        admin.delete(doomed.id, false).await.expect("unconfirmed"),
        DeleteOutcome::Unconfirmed
    );
    assert_eq!(admin.load().await.expect("load").len(), 2);

    assert_eq!(
        admin.delete(doomed.id, true).await.expect("confirmed"),
        DeleteOutcome::Archived
    );
    let listed = admin.load().await.expect("load");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept.id);

    let tombstone = store
        .select_one(&Query::from(Table::Projects).id(doomed.id))
        .await
        .expect("select")
        .expect("row retained");
    let stamped = tombstone
        .get("deleted_at")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    assert!(stamped.is_some());

    assert_eq!(
        admin.delete(doomed.id, true).await.expect("again"),
        DeleteOutcome::Missing
    );
    let unchanged = store
        .select_one(&Query::from(Table::Projects).id(doomed.id))
        .await
        .expect("select")
        .expect("row retained");
    assert_eq!(
        unchanged
            .get("deleted_at")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        stamped
    );
    assert!(admin.get(doomed.id).await.expect("get").is_none());
}

#[tokio::test]
async fn hard_delete_removes_rows() {
    let admin = CollectionAdmin::<Tool>::new(store(), EventBus::new());
    let tool = admin
        .submit(
            ToolDraft {
                name: "Docker".into(),
                category: "backend".into(),
                description: None,
                icon: None,
                website_url: None,
                is_visible: true,
            },
            None,
        )
        .await
        .expect("add");
    assert_eq!(
        admin.delete(tool.id, true).await.expect("delete"),
        DeleteOutcome::Removed
    );
    assert_eq!(
        admin.delete(tool.id, true).await.expect("delete again"),
        DeleteOutcome::Missing
    );
}

#[tokio::test]
async fn visibility_toggle_changes_only_the_flag() {
    let admin = CollectionAdmin::<Goal>::new(store(), EventBus::new());
    let draft: GoalDraft = serde_json::from_value(serde_json::json!({
        "title": "Ship HQ",
        "description": "Finish the admin",
        "category": "Professional",
        "status": "in_progress",
        "priority": "high",
        "year": 2025
    }))
    .expect("draft");
    let goal = admin.submit(draft, None).await.expect("add");
    assert!(goal.is_visible);

    let toggled = admin.toggle_visibility(goal.id).await.expect("toggle");
    assert!(!toggled.is_visible);

    let refetched = admin.get(goal.id).await.expect("get").expect("present");
    assert_eq!(
        Goal {
            is_visible: true,
            ..refetched.clone()
        },
        goal
    );
    assert_eq!(refetched.status, GoalStatus::InProgress);
}

#[tokio::test]
async fn visibility_toggle_rejected_for_skills() {
    let admin = CollectionAdmin::<Skill>::new(store(), EventBus::new());
    let skill = admin
        .submit(skill("Rust", "Backend", 80), None)
        .await
        .expect("add");
    assert!(matches!(
        admin.toggle_visibility(skill.id).await,
        Err(AdminError::Unsupported {
            operation: "toggle_visibility",
            ..
        })
    ));
}

#[tokio::test]
async fn reorder_rewrites_positions() {
    let admin = CollectionAdmin::<Skill>::new(store(), EventBus::new());
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        ids.push(
            admin
                .submit(skill(name, "x", 10), None)
                .await
                .expect("add")
                .id,
        );
    }
    ids.reverse();
    let reordered = admin.reorder(&ids).await.expect("reorder");
    let names: Vec<&str> = reordered.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn projects_cannot_be_reordered() {
    let admin = CollectionAdmin::<Project>::new(store(), EventBus::new());
    assert!(matches!(
        admin.reorder(&[]).await,
        Err(AdminError::Unsupported { .. })
    ));
}

#[tokio::test]
async fn batch_editor_inserts_updates_and_reports_failures() {
    let admin = CollectionAdmin::<HeroBadge>::new(store(), EventBus::new());
    let existing = admin
        .submit(
            HeroBadgeDraft {
                text: "Old".into(),
                icon: "⭐".into(),
                link: None,
                is_visible: true,
            },
            None,
        )
        .await
        .expect("seed");

    let items: Vec<BatchItem<HeroBadgeDraft>> = serde_json::from_value(serde_json::json!([
        {"id": "new-1", "text": "Fresh", "icon": "🚀"},
        {"id": existing.id.to_string(), "text": "Renamed", "icon": "⭐"},
        {"id": "new-2", "text": "  ", "icon": "x"}
    ]))
    .expect("items");

    let report = admin.save_all(items).await;
    assert_eq!(report.saved.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].index, 2);
    assert_eq!(report.failed[0].issues[0].field, "text");

    let listed = admin.load().await.expect("load");
    let texts: Vec<&str> = listed.iter().map(|badge| badge.text.as_str()).collect();
    assert_eq!(texts, vec!["Fresh", "Renamed"]);
    assert_eq!(listed[1].id, existing.id);
}

#[tokio::test]
async fn page_stats_group_by_record_bucket() {
    let admin = CollectionAdmin::<Skill>::new(store(), EventBus::new());
    for (name, category) in [("Rust", "Backend"), ("Go", "Backend"), ("React", "Frontend")] {
        admin
            .submit(skill(name, category, 50), None)
            .await
            .expect("add");
    }
    let page = admin.page().await.expect("page");
    assert_eq!(page.stats.get("Backend"), Some(&2));
    assert_eq!(page.stats.get("Frontend"), Some(&1));
}

#[tokio::test]
async fn writes_are_announced_on_the_bus() {
    let events = EventBus::new();
    let mut stream = events.subscribe(None);
    let admin = CollectionAdmin::<Skill>::new(store(), events);
    let created = admin
        .submit(skill("Rust", "Backend", 80), None)
        .await
        .expect("add");
    let envelope = stream.next().await.expect("event");
    assert_eq!(
        envelope.event,
        folio_events::Event::ContentChanged {
            table: "skills".into(),
            id: Some(created.id),
            action: ContentAction::Created,
        }
    );
}

#[tokio::test]
async fn dashboard_counts_live_rows_and_status_vocabularies() {
    let store = store();
    let events = EventBus::new();
    let projects = CollectionAdmin::<Project>::new(store.clone(), events.clone());
    let first = projects.submit(project("One"), None).await.expect("one");
    let mut with_repo = project("Two");
    with_repo.github_url = Some("https://github.com/example/two".into());
    projects.submit(with_repo, None).await.expect("two");
    projects.delete(first.id, true).await.expect("delete");

    let goals = CollectionAdmin::<Goal>::new(store.clone(), events);
    for status in ["not_started", "todo", "in_progress"] {
        let draft: GoalDraft =
            serde_json::from_value(serde_json::json!({"title": "g", "status": status}))
                .expect("draft");
        goals.submit(draft, None).await.expect("goal");
    }

    let counts = dashboard(store.as_ref()).await.expect("dashboard");
    assert_eq!(counts.projects, 1);
    assert_eq!(counts.goals, 3);
    assert_eq!(
        counts.goal_status_vocabularies.get(&StatusVocabulary::Admin),
        Some(&1)
    );
    assert!(counts.has_status_drift());

    let repos = repositories(store.as_ref()).await.expect("repos");
    assert_eq!(repos.len(), 1);
    assert_eq!(repos[0].name, "Two");
}
