//! One-shot backup export. The snapshot is a plain tree of every subject and
//! its lists; writing it somewhere is the caller's job.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::db::Store;
use crate::models::{ContentItem, Subject};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub is_divider: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSnapshot {
    pub name: String,
    pub module: String,
    pub status: String,
    pub documents: Vec<FileEntry>,
    pub videos: Vec<FileEntry>,
    pub live_classes: Vec<LinkEntry>,
}

/// Every subject in name order, serialized as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub subjects: Vec<SubjectSnapshot>,
}

fn file_entries(items: &[ContentItem]) -> Vec<FileEntry> {
    items
        .iter()
        .map(|item| FileEntry {
            name: item.name.clone(),
            path: item.path.clone(),
            is_divider: item.is_divider,
        })
        .collect()
}

impl From<&Subject> for SubjectSnapshot {
    fn from(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            module: subject.module.clone(),
            status: subject.status.to_string(),
            documents: file_entries(&subject.content.documents),
            videos: file_entries(&subject.content.videos),
            live_classes: subject
                .content
                .live_classes
                .iter()
                .map(|item| LinkEntry {
                    name: item.name.clone(),
                    path: item.path.clone(),
                })
                .collect(),
        }
    }
}

impl Snapshot {
    pub fn from_subjects(subjects: &[Subject]) -> Self {
        Self {
            subjects: subjects.iter().map(SubjectSnapshot::from).collect(),
        }
    }

    /// Indented JSON ready to be written to a backup file.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize snapshot")
    }
}

impl Store {
    /// Load everything fresh from the store and fold it into a [`Snapshot`].
    pub fn export_snapshot(&self) -> Result<Snapshot> {
        let subjects = self.load_all_subjects()?;
        tracing::info!(subjects = subjects.len(), "exporting snapshot");
        Ok(Snapshot::from_subjects(&subjects))
    }
}
