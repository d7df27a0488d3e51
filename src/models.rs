//! Domain models that mirror the SQLite schema and get passed throughout the
//! application. Subjects own their three content lists directly so the store can
//! swap them wholesale after every write, and the UI can render them without
//! another query.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Name given to a divider when the user does not type one.
pub const DEFAULT_DIVIDER_NAME: &str = "Div";

/// Padding drawn on each side of a divider name in its display line.
const DIVIDER_RULE: &str = "-------------------";

/// Separator between a content item's name and its path in display lines.
pub const DISPLAY_SEPARATOR: &str = " | ";

/// Errors raised when text read back from the store does not map onto one of
/// the fixed enumerations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown subject status '{0}'")]
    UnknownStatus(String),
    #[error("unknown content category '{0}'")]
    UnknownCategory(String),
}

/// Lifecycle state of a subject. The labels double as the persisted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubjectStatus {
    #[default]
    InProgress,
    Completed,
    Awaiting,
    Failed,
    ReferenceMaterial,
}

impl SubjectStatus {
    /// Every status in the order the edit form cycles through them.
    pub const ALL: [SubjectStatus; 5] = [
        SubjectStatus::InProgress,
        SubjectStatus::Completed,
        SubjectStatus::Awaiting,
        SubjectStatus::Failed,
        SubjectStatus::ReferenceMaterial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectStatus::InProgress => "In Progress",
            SubjectStatus::Completed => "Completed",
            SubjectStatus::Awaiting => "Awaiting",
            SubjectStatus::Failed => "Failed",
            SubjectStatus::ReferenceMaterial => "Reference Material",
        }
    }

    /// Step through [`SubjectStatus::ALL`], wrapping at both ends.
    pub fn cycle(&self, offset: isize) -> SubjectStatus {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0) as isize;
        Self::ALL[(idx + offset).rem_euclid(len) as usize]
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

/// The three content lists a subject owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Document,
    Video,
    LiveClass,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Document, Category::Video, Category::LiveClass];

    /// Tag stored in the `content_items.category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Document => "document",
            Category::Video => "video",
            Category::LiveClass => "live_class",
        }
    }

    /// Human-facing tab title.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Document => "Documents",
            Category::Video => "Videos",
            Category::LiveClass => "Live Classes",
        }
    }

    /// Only the file-backed lists expose an "add divider" action. The store
    /// itself does not enforce this.
    pub fn supports_dividers(&self) -> bool {
        !matches!(self, Category::LiveClass)
    }

    /// File extensions offered for this category. Live classes are links, so
    /// they have none.
    pub fn accepted_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Document => &[
                "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "xml", "txt",
            ],
            Category::Video => &["mp4", "avi", "mov", "mkv"],
            Category::LiveClass => &[],
        }
    }

    /// Whether `path` carries one of the advertised extensions (case-insensitive).
    /// Categories without a list accept everything.
    pub fn accepts_path(&self, path: &str) -> bool {
        let accepted = self.accepted_extensions();
        if accepted.is_empty() {
            return true;
        }
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| accepted.iter().any(|a| a.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Next tab, wrapping around.
    pub fn cycle(&self, offset: isize) -> Category {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0) as isize;
        Self::ALL[(idx + offset).rem_euclid(len) as usize]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}

/// Whether a content target should go to a browser or the OS file opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Web,
    Local,
}

/// Resolved location the presentation layer hands to an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTarget {
    pub location: String,
    pub kind: TargetKind,
}

impl ContentTarget {
    /// Classify a raw path or URL by its scheme prefix.
    pub fn classify(location: &str) -> Self {
        let kind = if location.starts_with("http://") || location.starts_with("https://") {
            TargetKind::Web
        } else {
            TargetKind::Local
        };
        Self {
            location: location.to_string(),
            kind,
        }
    }
}

/// One document, video, live-class link, or divider belonging to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Store-assigned key. `None` until the item has been persisted; removal
    /// and reordering prefer this over the name-based key once it is set.
    pub id: Option<i64>,
    pub category: Category,
    pub name: String,
    /// File path or URL. Empty for dividers.
    pub path: String,
    pub is_divider: bool,
    /// Authoritative list position within the subject and category.
    pub order_rank: i64,
}

impl ContentItem {
    pub fn new(category: Category, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: None,
            category,
            name: name.into(),
            path: path.into(),
            is_divider: false,
            order_rank: 0,
        }
    }

    /// Build a file-backed item named after the file's base name.
    pub fn from_path(category: Category, path: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(path)
            .to_string();
        Self::new(category, name, path)
    }

    /// Build a divider. Blank names fall back to [`DEFAULT_DIVIDER_NAME`].
    pub fn divider(category: Category, name: &str) -> Self {
        let name = name.trim();
        let name = if name.is_empty() {
            DEFAULT_DIVIDER_NAME
        } else {
            name
        };
        Self {
            is_divider: true,
            ..Self::new(category, name, "")
        }
    }

    /// Build a live-class link numbered after the ones already present.
    pub fn live_class(existing: usize, link: &str) -> Self {
        Self::new(Category::LiveClass, format!("Class {}", existing + 1), link)
    }

    /// Render the line shown in lists. Dividers become a banner so they can be
    /// told apart when the line is parsed back.
    pub fn display_line(&self) -> String {
        if self.is_divider {
            format!("{DIVIDER_RULE} {} {DIVIDER_RULE}", self.name)
        } else {
            format!("{}{DISPLAY_SEPARATOR}{}", self.name, self.path)
        }
    }

    /// Parse a display line back into `(name, is_divider)`.
    pub fn parse_display_line(line: &str) -> (String, bool) {
        if let Some(inner) = line
            .strip_prefix(DIVIDER_RULE)
            .and_then(|rest| rest.strip_suffix(DIVIDER_RULE))
        {
            return (inner.trim().to_string(), true);
        }
        let name = line
            .split_once(DISPLAY_SEPARATOR)
            .map(|(name, _)| name)
            .unwrap_or(line);
        (name.to_string(), false)
    }

    /// Where this item points, or `None` for dividers and blank paths.
    pub fn target(&self) -> Option<ContentTarget> {
        let location = self.path.trim();
        if self.is_divider || location.is_empty() {
            return None;
        }
        Some(ContentTarget::classify(location))
    }
}

/// The three ordered content lists held by a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentCollections {
    pub documents: Vec<ContentItem>,
    pub videos: Vec<ContentItem>,
    pub live_classes: Vec<ContentItem>,
}

impl ContentCollections {
    pub fn get(&self, category: Category) -> &[ContentItem] {
        match category {
            Category::Document => &self.documents,
            Category::Video => &self.videos,
            Category::LiveClass => &self.live_classes,
        }
    }
}

/// A course or topic being studied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Primary key from the database, absent until the first save.
    pub id: Option<i64>,
    pub name: String,
    pub module: String,
    pub status: SubjectStatus,
    /// Loaded on demand and always replaced as a whole.
    pub content: ContentCollections,
}

impl Subject {
    pub fn new(name: impl Into<String>, module: impl Into<String>, status: SubjectStatus) -> Self {
        Self {
            id: None,
            name: name.into(),
            module: module.into(),
            status,
            content: ContentCollections::default(),
        }
    }

    /// Case-insensitive substring match on the name, used by the search bar.
    /// A blank query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.name.to_lowercase().contains(&query)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.module, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_through_from_str() {
        for status in SubjectStatus::ALL {
            assert_eq!(status.as_str().parse::<SubjectStatus>(), Ok(status));
        }
        assert_eq!(
            "Done".parse::<SubjectStatus>(),
            Err(ModelError::UnknownStatus("Done".into()))
        );
    }

    #[test]
    fn status_cycle_wraps_both_ways() {
        assert_eq!(
            SubjectStatus::InProgress.cycle(-1),
            SubjectStatus::ReferenceMaterial
        );
        assert_eq!(
            SubjectStatus::ReferenceMaterial.cycle(1),
            SubjectStatus::InProgress
        );
    }

    #[test]
    fn unknown_category_tag_is_rejected() {
        assert_eq!("livro".parse::<Category>(), Err(ModelError::UnknownCategory("livro".into())));
        assert_eq!("live_class".parse::<Category>(), Ok(Category::LiveClass));
    }

    #[test]
    fn dividers_only_offered_for_file_lists() {
        assert!(Category::Document.supports_dividers());
        assert!(Category::Video.supports_dividers());
        assert!(!Category::LiveClass.supports_dividers());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(Category::Document.accepts_path("/d/Notes.PDF"));
        assert!(!Category::Document.accepts_path("/d/clip.mp4"));
        assert!(Category::Video.accepts_path("clip.mkv"));
        assert!(Category::LiveClass.accepts_path("https://zoom.us/j/1"));
    }

    #[test]
    fn from_path_uses_base_name() {
        let item = ContentItem::from_path(Category::Document, "/home/me/notes.pdf");
        assert_eq!(item.name, "notes.pdf");
        assert_eq!(item.path, "/home/me/notes.pdf");
        assert!(!item.is_divider);
    }

    #[test]
    fn blank_divider_gets_default_name() {
        let div = ContentItem::divider(Category::Video, "   ");
        assert_eq!(div.name, DEFAULT_DIVIDER_NAME);
        assert!(div.is_divider);
        assert!(div.path.is_empty());
    }

    #[test]
    fn live_class_is_numbered_after_existing() {
        let item = ContentItem::live_class(2, "https://youtu.be/x");
        assert_eq!(item.name, "Class 3");
        assert_eq!(item.category, Category::LiveClass);
    }

    #[test]
    fn display_lines_parse_back() {
        let div = ContentItem::divider(Category::Document, "Midterm");
        assert_eq!(
            ContentItem::parse_display_line(&div.display_line()),
            ("Midterm".to_string(), true)
        );

        let doc = ContentItem::new(Category::Document, "notes.pdf", "/d/notes.pdf");
        assert_eq!(doc.display_line(), "notes.pdf | /d/notes.pdf");
        assert_eq!(
            ContentItem::parse_display_line(&doc.display_line()),
            ("notes.pdf".to_string(), false)
        );
    }

    #[test]
    fn target_classification() {
        let web = ContentItem::new(Category::LiveClass, "Class 1", "https://zoom.us/j/1");
        assert_eq!(web.target().map(|t| t.kind), Some(TargetKind::Web));

        let local = ContentItem::new(Category::Video, "lec.mp4", "/v/lec.mp4");
        assert_eq!(local.target().map(|t| t.kind), Some(TargetKind::Local));

        let div = ContentItem::divider(Category::Video, "Week 2");
        assert_eq!(div.target(), None);
    }

    #[test]
    fn subject_display_and_query() {
        let subject = Subject::new("Calculus", "M1", SubjectStatus::InProgress);
        assert_eq!(subject.to_string(), "Calculus (M1) - In Progress");
        assert!(subject.matches_query("calc"));
        assert!(subject.matches_query(""));
        assert!(!subject.matches_query("physics"));
    }
}
