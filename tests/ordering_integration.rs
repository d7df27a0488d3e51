use study_organizer::ordering::{move_item, reorder_by_ids, reorder_from_display};
use study_organizer::{Category, ContentItem, SchemaMode, Store, Subject, SubjectStatus};
use tempfile::TempDir;

/// Helper: a store holding one subject with documents a, b, c (ranks 1..=3).
fn subject_with_documents() -> (TempDir, Store, Subject) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = Store::initialize(dir.path().join("material.db"), SchemaMode::Preserve)
        .expect("store should initialize");

    let mut subject = Subject::new("Algorithms", "M3", SubjectStatus::InProgress);
    store.save(&mut subject).expect("subject should save");
    for name in ["a.pdf", "b.pdf", "c.pdf"] {
        store
            .add_content(
                &mut subject,
                ContentItem::new(Category::Document, name, format!("/d/{name}")),
            )
            .expect("document should be added");
    }
    (dir, store, subject)
}

fn document_names(subject: &Subject) -> Vec<String> {
    subject
        .content
        .documents
        .iter()
        .map(|item| item.name.clone())
        .collect()
}

fn document_ids(subject: &Subject) -> Vec<i64> {
    subject
        .content
        .documents
        .iter()
        .filter_map(|item| item.id)
        .collect()
}

#[test]
fn reorder_by_ids_persists_permutation() {
    let (_dir, store, mut subject) = subject_with_documents();
    let ids = document_ids(&subject);
    let permutation = vec![ids[2], ids[0], ids[1]];

    reorder_by_ids(&store, &mut subject, Category::Document, &permutation)
        .expect("reorder should succeed");

    assert_eq!(document_ids(&subject), permutation);
    let ranks: Vec<i64> = subject.content.documents.iter().map(|i| i.order_rank).collect();
    assert_eq!(ranks, vec![0, 1, 2]);

    let mut reloaded = store
        .load_subject(subject.id.expect("id"))
        .expect("load should succeed")
        .expect("subject should exist");
    store.load_content(&mut reloaded).expect("reload");
    assert_eq!(document_ids(&reloaded), permutation);
}

#[test]
fn reordering_with_current_order_keeps_sequence() {
    let (_dir, store, mut subject) = subject_with_documents();
    let before = document_ids(&subject);

    reorder_by_ids(&store, &mut subject, Category::Document, &before).expect("first reorder");
    let once: Vec<i64> = subject.content.documents.iter().map(|i| i.order_rank).collect();
    reorder_by_ids(&store, &mut subject, Category::Document, &before).expect("second reorder");
    let twice: Vec<i64> = subject.content.documents.iter().map(|i| i.order_rank).collect();

    assert_eq!(document_ids(&subject), before);
    assert_eq!(once, twice);
}

#[test]
fn reorder_from_display_resolves_rendered_lines() {
    let (_dir, store, mut subject) = subject_with_documents();
    let lines: Vec<String> = subject
        .content
        .documents
        .iter()
        .rev()
        .map(ContentItem::display_line)
        .collect();

    reorder_from_display(&store, &mut subject, Category::Document, &lines)
        .expect("reorder should succeed");

    assert_eq!(document_names(&subject), vec!["c.pdf", "b.pdf", "a.pdf"]);
}

#[test]
fn unresolved_display_lines_are_dropped_silently() {
    let (_dir, store, mut subject) = subject_with_documents();
    let lines = ["c.pdf | /d/c.pdf", "ghost.pdf | /d/ghost.pdf", "a.pdf | /d/a.pdf"];

    reorder_from_display(&store, &mut subject, Category::Document, &lines)
        .expect("reorder should succeed");

    // c and a take ranks 0 and 1; b was not mentioned and keeps rank 2.
    assert_eq!(document_names(&subject), vec!["c.pdf", "a.pdf", "b.pdf"]);
    assert_eq!(subject.content.documents.len(), 3);
}

#[test]
fn dividers_with_default_name_reorder_by_id() {
    let (_dir, store, mut subject) = subject_with_documents();
    store
        .add_content(&mut subject, ContentItem::divider(Category::Document, ""))
        .expect("first divider");
    store
        .add_content(&mut subject, ContentItem::divider(Category::Document, ""))
        .expect("second divider");

    let items = subject.content.documents.clone();
    // Move the last divider to the top.
    let moved = move_item(&items, items.len() - 1, 0);
    let ids: Vec<i64> = moved.iter().filter_map(|i| i.id).collect();
    reorder_by_ids(&store, &mut subject, Category::Document, &ids).expect("reorder");

    assert_eq!(document_ids(&subject), ids);
    assert_eq!(subject.content.documents[0].id, items[4].id);
    assert_eq!(subject.content.documents[0].name, "Div");
}

#[test]
fn reorder_leaves_other_categories_untouched() {
    let (_dir, store, mut subject) = subject_with_documents();
    store
        .add_content(&mut subject, ContentItem::new(Category::Video, "v.mp4", "/v.mp4"))
        .expect("video");
    let video_rank = subject.content.videos[0].order_rank;

    let ids: Vec<i64> = document_ids(&subject).into_iter().rev().collect();
    reorder_by_ids(&store, &mut subject, Category::Document, &ids).expect("reorder");

    assert_eq!(subject.content.videos[0].order_rank, video_rank);
}
