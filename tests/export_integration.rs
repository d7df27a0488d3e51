use serde_json::{json, Value};
use study_organizer::{Category, ContentItem, SchemaMode, Store, Subject, SubjectStatus};
use tempfile::TempDir;

fn test_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = Store::initialize(dir.path().join("material.db"), SchemaMode::Preserve)
        .expect("store should initialize");
    (dir, store)
}

fn exported_json(store: &Store) -> Value {
    let snapshot = store.export_snapshot().expect("export should succeed");
    let text = snapshot.to_json_pretty().expect("snapshot should serialize");
    serde_json::from_str(&text).expect("export should be valid JSON")
}

#[test]
fn empty_store_exports_empty_array() {
    let (_dir, store) = test_store();
    assert_eq!(exported_json(&store), json!([]));
}

#[test]
fn subject_without_content_exports_empty_lists() {
    let (_dir, store) = test_store();
    let mut subject = Subject::new("Calculus", "M1", SubjectStatus::InProgress);
    store.save(&mut subject).expect("save");

    assert_eq!(
        exported_json(&store),
        json!([{
            "name": "Calculus",
            "module": "M1",
            "status": "In Progress",
            "documents": [],
            "videos": [],
            "live_classes": []
        }])
    );
}

#[test]
fn export_keeps_list_order_and_divider_flags() {
    let (_dir, store) = test_store();
    let mut subject = Subject::new("Physics", "M2", SubjectStatus::Failed);
    store.save(&mut subject).expect("save");
    store
        .add_content(&mut subject, ContentItem::new(Category::Video, "intro.mp4", "/v/intro.mp4"))
        .expect("video");
    store
        .add_content(&mut subject, ContentItem::divider(Category::Video, "Week 2"))
        .expect("divider");
    store
        .add_content(&mut subject, ContentItem::live_class(0, "https://zoom.us/j/9"))
        .expect("link");

    let exported = exported_json(&store);
    let entry = &exported[0];
    assert_eq!(entry["status"], "Failed");
    assert_eq!(
        entry["videos"],
        json!([
            {"name": "intro.mp4", "path": "/v/intro.mp4", "is_divider": false},
            {"name": "Week 2", "path": "", "is_divider": true}
        ])
    );
    assert_eq!(
        entry["live_classes"],
        json!([{"name": "Class 1", "path": "https://zoom.us/j/9"}])
    );
}

#[test]
fn snapshot_lists_subjects_in_name_order() {
    let (_dir, store) = test_store();
    for name in ["Zoology", "Anatomy"] {
        let mut subject = Subject::new(name, "M1", SubjectStatus::Awaiting);
        store.save(&mut subject).expect("save");
    }

    let snapshot = store.export_snapshot().expect("export");
    let names: Vec<&str> = snapshot.subjects.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Anatomy", "Zoology"]);
}
