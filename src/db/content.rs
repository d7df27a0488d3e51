use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use super::connection::Store;
use crate::models::{Category, ContentItem, Subject};

/// Every item of one category for a subject, in rank order.
fn fetch_content(
    conn: &Connection,
    subject_id: i64,
    category: Category,
) -> Result<Vec<ContentItem>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, category, name, path, is_divider, order_rank
             FROM content_items
             WHERE subject_id = ?1 AND category = ?2
             ORDER BY order_rank, id",
        )
        .context("failed to prepare content query")?;

    let items = stmt
        .query_map(params![subject_id, category], |row| {
            Ok(ContentItem {
                id: Some(row.get(0)?),
                category: row.get(1)?,
                name: row.get(2)?,
                path: row.get(3)?,
                is_divider: row.get(4)?,
                order_rank: row.get(5)?,
            })
        })
        .context("failed to iterate content")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect content")?;

    Ok(items)
}

/// Rank that places a new item after everything already in the list. An empty
/// list starts at 1.
fn next_order_rank(conn: &Connection, subject_id: i64, category: Category) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(order_rank), 0) + 1
         FROM content_items
         WHERE subject_id = ?1 AND category = ?2",
        params![subject_id, category],
        |row| row.get(0),
    )
    .context("failed to compute next order rank")
}

/// Append an item at the end of its list and return it with its id and rank.
fn insert_content(conn: &Connection, subject_id: i64, item: &ContentItem) -> Result<ContentItem> {
    let order_rank = next_order_rank(conn, subject_id, item.category)?;
    conn.execute(
        "INSERT INTO content_items (subject_id, category, name, path, is_divider, order_rank)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            subject_id,
            item.category,
            item.name,
            item.path,
            item.is_divider,
            order_rank
        ],
    )
    .context("failed to insert content")?;

    Ok(ContentItem {
        id: Some(conn.last_insert_rowid()),
        order_rank,
        ..item.clone()
    })
}

/// Delete the rows matching `item` and return how many went away.
///
/// Persisted items are matched by id. Items without an id fall back to the
/// name-based key: live-class links on name and path, documents and videos on
/// name and divider flag. That key cannot tell same-named entries apart, so
/// every one of them is removed.
fn delete_content(conn: &Connection, subject_id: i64, item: &ContentItem) -> Result<usize> {
    let deleted = match (item.id, item.category) {
        (Some(id), _) => conn.execute(
            "DELETE FROM content_items WHERE subject_id = ?1 AND id = ?2",
            params![subject_id, id],
        ),
        (None, Category::LiveClass) => conn.execute(
            "DELETE FROM content_items
             WHERE subject_id = ?1 AND category = ?2 AND name = ?3 AND path = ?4",
            params![subject_id, item.category, item.name, item.path],
        ),
        (None, _) => conn.execute(
            "DELETE FROM content_items
             WHERE subject_id = ?1 AND category = ?2 AND name = ?3 AND is_divider = ?4",
            params![subject_id, item.category, item.name, item.is_divider],
        ),
    }
    .context("failed to delete content")?;

    Ok(deleted)
}

/// Rewrite ranks so each item takes its 0-based position in `ordered`. Uses the
/// same matching rules as [`delete_content`].
///
/// All updates share one transaction, so a failure part way through leaves the
/// previous order in place instead of a half-applied one. Rows that `ordered`
/// does not mention keep their old rank.
fn update_order(
    conn: &mut Connection,
    subject_id: i64,
    category: Category,
    ordered: &[ContentItem],
) -> Result<()> {
    let tx = conn.transaction().context("failed to start transaction")?;
    {
        let mut by_id = tx
            .prepare(
                "UPDATE content_items SET order_rank = ?1
                 WHERE subject_id = ?2 AND category = ?3 AND id = ?4",
            )
            .context("failed to prepare reorder by id")?;
        let mut by_link = tx
            .prepare(
                "UPDATE content_items SET order_rank = ?1
                 WHERE subject_id = ?2 AND category = ?3 AND name = ?4 AND path = ?5",
            )
            .context("failed to prepare reorder by link")?;
        let mut by_name = tx
            .prepare(
                "UPDATE content_items SET order_rank = ?1
                 WHERE subject_id = ?2 AND category = ?3 AND name = ?4 AND is_divider = ?5",
            )
            .context("failed to prepare reorder by name")?;

        for (rank, item) in ordered.iter().enumerate() {
            let rank = rank as i64;
            match (item.id, category) {
                (Some(id), _) => by_id.execute(params![rank, subject_id, category, id]),
                (None, Category::LiveClass) => {
                    by_link.execute(params![rank, subject_id, category, item.name, item.path])
                }
                (None, _) => by_name.execute(params![
                    rank,
                    subject_id,
                    category,
                    item.name,
                    item.is_divider
                ]),
            }
            .context("failed to update order rank")?;
        }
    }
    tx.commit().context("failed to commit reorder")
}

/// Content operations need a persisted subject to hang rows off.
fn saved_id(subject: &Subject) -> Result<i64> {
    subject
        .id
        .ok_or_else(|| anyhow!("subject has not been saved yet"))
}

impl Store {
    /// Replace all three in-memory lists with what the store holds.
    pub fn load_content(&self, subject: &mut Subject) -> Result<()> {
        let subject_id = saved_id(subject)?;
        let (documents, videos, live_classes) = self.run("load content", |conn| {
            Ok((
                fetch_content(conn, subject_id, Category::Document)?,
                fetch_content(conn, subject_id, Category::Video)?,
                fetch_content(conn, subject_id, Category::LiveClass)?,
            ))
        })?;
        subject.content.documents = documents;
        subject.content.videos = videos;
        subject.content.live_classes = live_classes;
        Ok(())
    }

    /// Append `item` to the end of its list, then reload the subject's content.
    pub fn add_content(&self, subject: &mut Subject, item: ContentItem) -> Result<ContentItem> {
        let subject_id = saved_id(subject)?;
        let stored = self.run("add content", |conn| insert_content(conn, subject_id, &item))?;
        tracing::debug!(
            subject_id,
            category = stored.category.as_str(),
            rank = stored.order_rank,
            "added content"
        );
        self.load_content(subject)?;
        Ok(stored)
    }

    /// Delete `item` from the subject, then reload. Returns the number of rows
    /// removed, which exceeds one when an id-less item has a duplicate name.
    pub fn remove_content(&self, subject: &mut Subject, item: &ContentItem) -> Result<usize> {
        let subject_id = saved_id(subject)?;
        let deleted = self.run("remove content", |conn| delete_content(conn, subject_id, item))?;
        if deleted > 1 {
            tracing::warn!(subject_id, name = %item.name, deleted, "ambiguous content removal");
        }
        self.load_content(subject)?;
        Ok(deleted)
    }

    /// Persist `ordered` as the new order of `category`, then reload. The reload
    /// is what callers render, so any item that failed to match simply stays
    /// where the store already had it.
    pub fn reorder_content(
        &self,
        subject: &mut Subject,
        category: Category,
        ordered: &[ContentItem],
    ) -> Result<()> {
        let subject_id = saved_id(subject)?;
        self.run("reorder content", |conn| {
            update_order(conn, subject_id, category, ordered)
        })?;
        self.load_content(subject)
    }
}
