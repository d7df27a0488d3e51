use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Category, ContentItem, Subject, SubjectStatus};

/// Render a `Label: value` line, highlighting the focused field and showing a
/// placeholder for blank values.
fn field_line(field_name: &str, value: &str, placeholder: &str, is_active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Internal representation of the subject form fields.
#[derive(Default, Clone)]
pub(crate) struct SubjectForm {
    pub(crate) name: String,
    pub(crate) module: String,
    pub(crate) status: SubjectStatus,
    pub(crate) active: SubjectField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum SubjectField {
    #[default]
    Name,
    Module,
    Status,
}

impl SubjectForm {
    /// Populate the form from an existing subject when editing.
    pub(crate) fn from_subject(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            module: subject.module.clone(),
            status: subject.status,
            active: SubjectField::Name,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SubjectField::Name => SubjectField::Module,
            SubjectField::Module => SubjectField::Status,
            SubjectField::Status => SubjectField::Name,
        };
    }

    /// Append a character to the active text field. The status field only
    /// reacts to the arrow keys.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SubjectField::Name => self.name.push(ch),
            SubjectField::Module => self.module.push(ch),
            SubjectField::Status => return false,
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            SubjectField::Name => {
                self.name.pop();
            }
            SubjectField::Module => {
                self.module.pop();
            }
            SubjectField::Status => {}
        }
    }

    /// Step the status selector when it has focus.
    pub(crate) fn cycle_status(&mut self, offset: isize) {
        if self.active == SubjectField::Status {
            self.status = self.status.cycle(offset);
        }
    }

    /// Validate the inputs and return trimmed values ready for persistence.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, SubjectStatus)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Subject name is required."));
        }
        let module = self.module.trim();
        if module.is_empty() {
            return Err(anyhow!("Module is required."));
        }
        Ok((name.to_string(), module.to_string(), self.status))
    }

    pub(crate) fn build_line(&self, field_name: &str, field: SubjectField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            SubjectField::Name => field_line(field_name, &self.name, "<required>", is_active),
            SubjectField::Module => field_line(field_name, &self.module, "<required>", is_active),
            SubjectField::Status => {
                let value = format!("◀ {} ▶", self.status);
                field_line(field_name, &value, "", is_active)
            }
        }
    }

    pub(crate) fn value_len(&self, field: SubjectField) -> usize {
        match field {
            SubjectField::Name => self.name.chars().count(),
            SubjectField::Module => self.module.chars().count(),
            SubjectField::Status => 0,
        }
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmSubjectDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) item_count: usize,
}

impl ConfirmSubjectDelete {
    pub(crate) fn from(subject: &Subject) -> Option<Self> {
        let content = &subject.content;
        Some(Self {
            id: subject.id?,
            name: subject.name.clone(),
            item_count: content.documents.len() + content.videos.len() + content.live_classes.len(),
        })
    }
}

/// Form for adding a document, video, or live-class link.
#[derive(Clone)]
pub(crate) struct ContentForm {
    pub(crate) category: Category,
    pub(crate) location: String,
    pub(crate) name: String,
    pub(crate) active: ContentField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum ContentField {
    Location,
    Name,
}

impl ContentForm {
    pub(crate) fn new(category: Category) -> Self {
        Self {
            category,
            location: String::new(),
            name: String::new(),
            active: ContentField::Location,
            error: None,
        }
    }

    /// Label for the location field: links for live classes, paths otherwise.
    pub(crate) fn location_label(&self) -> &'static str {
        match self.category {
            Category::LiveClass => "Link",
            _ => "Path",
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            ContentField::Location => ContentField::Name,
            ContentField::Name => ContentField::Location,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            ContentField::Location => self.location.push(ch),
            ContentField::Name => self.name.push(ch),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            ContentField::Location => {
                self.location.pop();
            }
            ContentField::Name => {
                self.name.pop();
            }
        }
    }

    /// Build the item to store. A blank name falls back to the file name for
    /// documents and videos, and to `Class N` for live classes, where
    /// `existing` is how many live classes the subject already has.
    pub(crate) fn parse_inputs(&self, existing: usize) -> Result<ContentItem> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(anyhow!("{} is required.", self.location_label()));
        }
        let mut item = match self.category {
            Category::LiveClass => ContentItem::live_class(existing, location),
            category => ContentItem::from_path(category, location),
        };
        let name = self.name.trim();
        if !name.is_empty() {
            item.name = name.to_string();
        }
        Ok(item)
    }

    /// Note shown when a file does not carry one of the category's usual
    /// extensions. The item is still accepted.
    pub(crate) fn extension_warning(&self) -> Option<String> {
        let location = self.location.trim();
        if location.is_empty() || self.category.accepts_path(location) {
            return None;
        }
        Some(format!(
            "Unusual file type for {} (expected {}).",
            self.category.label().to_lowercase(),
            self.category.accepted_extensions().join(", ")
        ))
    }

    pub(crate) fn build_line(&self, field: ContentField) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            ContentField::Location => {
                field_line(self.location_label(), &self.location, "<required>", is_active)
            }
            ContentField::Name => field_line("Name", &self.name, "<optional>", is_active),
        }
    }

    /// Width of the label prefix for the requested field, used to place the cursor.
    pub(crate) fn prefix_len(&self, field: ContentField) -> usize {
        match field {
            ContentField::Location => self.location_label().len() + 2,
            ContentField::Name => "Name: ".len(),
        }
    }

    pub(crate) fn value_len(&self, field: ContentField) -> usize {
        match field {
            ContentField::Location => self.location.chars().count(),
            ContentField::Name => self.name.chars().count(),
        }
    }
}

/// Single-field form for naming a new divider.
#[derive(Clone)]
pub(crate) struct DividerForm {
    pub(crate) category: Category,
    pub(crate) name: String,
}

impl DividerForm {
    pub(crate) fn new(category: Category) -> Self {
        Self {
            category,
            name: String::new(),
        }
    }

    pub(crate) fn to_item(&self) -> ContentItem {
        ContentItem::divider(self.category, &self.name)
    }
}

#[derive(Clone)]
pub(crate) struct ConfirmContentRemove {
    pub(crate) item: ContentItem,
}

/// Destination prompt for the JSON backup.
#[derive(Default, Clone)]
pub(crate) struct ExportForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl ExportForm {
    pub(crate) fn parse_path(&self) -> Result<PathBuf> {
        let path = self.path.trim();
        if path.is_empty() {
            return Err(anyhow!("Backup path is required."));
        }
        let mut path = PathBuf::from(path);
        if path.extension().is_none() {
            path.set_extension("json");
        }
        Ok(path)
    }
}
