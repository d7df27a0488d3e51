use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::connection::Store;
use crate::models::Subject;

fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    let mut subject = Subject::new(
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get(3)?,
    );
    subject.id = Some(row.get(0)?);
    Ok(subject)
}

/// Retrieve every subject sorted by name. Content lists are left empty; the
/// caller decides whether to load them.
fn fetch_subjects(conn: &Connection) -> Result<Vec<Subject>> {
    let mut stmt = conn
        .prepare("SELECT id, name, module, status FROM subjects ORDER BY name")
        .context("failed to prepare subject query")?;

    let subjects = stmt
        .query_map([], subject_from_row)
        .context("failed to load subjects")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect subjects")?;

    Ok(subjects)
}

fn fetch_subject(conn: &Connection, id: i64) -> Result<Option<Subject>> {
    conn.query_row(
        "SELECT id, name, module, status FROM subjects WHERE id = ?1",
        params![id],
        subject_from_row,
    )
    .optional()
    .context("failed to load subject")
}

/// Insert a new subject row and return the generated id.
fn insert_subject(conn: &Connection, subject: &Subject) -> Result<i64> {
    conn.execute(
        "INSERT INTO subjects (name, module, status) VALUES (?1, ?2, ?3)",
        params![subject.name, subject.module, subject.status],
    )
    .context("failed to insert subject")?;

    Ok(conn.last_insert_rowid())
}

/// Overwrite every field of the subject row. Zero touched rows means the id is
/// stale, which we report instead of continuing silently.
fn update_subject(conn: &Connection, id: i64, subject: &Subject) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE subjects SET name = ?1, module = ?2, status = ?3 WHERE id = ?4",
            params![subject.name, subject.module, subject.status, id],
        )
        .context("failed to update subject")?;

    if updated == 0 {
        Err(anyhow!("Subject not found"))
    } else {
        Ok(())
    }
}

/// Delete the subject's content and then the subject itself in a single
/// transaction.
fn delete_subject_rows(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction().context("failed to start transaction")?;
    tx.execute("DELETE FROM content_items WHERE subject_id = ?1", params![id])
        .context("failed to delete subject content")?;
    let deleted = tx
        .execute("DELETE FROM subjects WHERE id = ?1", params![id])
        .context("failed to delete subject")?;

    if deleted == 0 {
        return Err(anyhow!("Subject not found"));
    }
    tx.commit().context("failed to commit subject deletion")
}

impl Store {
    /// Insert the subject when it has no id yet (writing the new id back),
    /// otherwise update the existing row. Last writer wins.
    pub fn save(&self, subject: &mut Subject) -> Result<()> {
        match subject.id {
            None => {
                let id = self.run("save subject", |conn| insert_subject(conn, subject))?;
                subject.id = Some(id);
                tracing::info!(id, name = %subject.name, "created subject");
            }
            Some(id) => {
                self.run("save subject", |conn| update_subject(conn, id, subject))?;
                tracing::info!(id, name = %subject.name, "updated subject");
            }
        }
        Ok(())
    }

    /// Every subject ordered by name, each with its content loaded.
    pub fn load_all_subjects(&self) -> Result<Vec<Subject>> {
        let mut subjects = self.run("load subjects", |conn| fetch_subjects(conn))?;
        for subject in &mut subjects {
            self.load_content(subject)?;
        }
        Ok(subjects)
    }

    /// A single subject with its content, or `None` when the id is unknown.
    pub fn load_subject(&self, id: i64) -> Result<Option<Subject>> {
        let subject = self.run("load subject", |conn| fetch_subject(conn, id))?;
        match subject {
            Some(mut subject) => {
                self.load_content(&mut subject)?;
                Ok(Some(subject))
            }
            None => Ok(None),
        }
    }

    /// Permanently remove a subject and everything it owns.
    pub fn delete_subject(&self, id: i64) -> Result<()> {
        self.run("delete subject", |conn| delete_subject_rows(conn, id))?;
        tracing::info!(id, "deleted subject");
        Ok(())
    }
}
