use std::cmp::min;

use crate::models::{Category, ContentItem, Subject};

/// Clamp-move a selection index inside `len` entries.
fn shifted(selected: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max_index = len as isize - 1;
    (selected as isize + offset).clamp(0, max_index) as usize
}

/// The subject list plus the active search filter.
pub(crate) struct SubjectListScreen {
    pub(crate) subjects: Vec<Subject>,
    /// Indices into `subjects` that pass the filter.
    pub(crate) visible: Vec<usize>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl SubjectListScreen {
    pub(crate) fn new(subjects: Vec<Subject>) -> Self {
        let mut screen = Self {
            subjects,
            visible: Vec::new(),
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        let query = self.filter.as_deref().unwrap_or("");
        self.visible = self
            .subjects
            .iter()
            .enumerate()
            .filter(|(_, subject)| subject.matches_query(query))
            .map(|(idx, _)| idx)
            .collect();

        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Swap in a freshly loaded list, keeping focus on `focus_id` when it is
    /// still visible.
    pub(crate) fn replace(&mut self, subjects: Vec<Subject>, focus_id: Option<i64>) {
        self.subjects = subjects;
        self.apply_filter();
        if let Some(id) = focus_id {
            if let Some(pos) = self
                .visible
                .iter()
                .position(|&idx| self.subjects[idx].id == Some(id))
            {
                self.selected = pos;
            }
        }
    }

    pub(crate) fn visible_subjects(&self) -> impl Iterator<Item = &Subject> {
        self.visible.iter().map(|&idx| &self.subjects[idx])
    }

    pub(crate) fn current_subject(&self) -> Option<&Subject> {
        self.visible
            .get(self.selected)
            .and_then(|&idx| self.subjects.get(idx))
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = shifted(self.selected, offset, self.visible.len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }

    pub(crate) fn len(&self) -> usize {
        self.visible.len()
    }
}

/// Detail view for one subject with a tab per content category.
pub(crate) struct SubjectScreen {
    pub(crate) subject: Subject,
    pub(crate) tab: Category,
    pub(crate) selected: usize,
}

impl SubjectScreen {
    pub(crate) fn new(subject: Subject) -> Self {
        Self {
            subject,
            tab: Category::Document,
            selected: 0,
        }
    }

    pub(crate) fn items(&self) -> &[ContentItem] {
        self.subject.content.get(self.tab)
    }

    pub(crate) fn current_item(&self) -> Option<&ContentItem> {
        self.items().get(self.selected)
    }

    pub(crate) fn switch_tab(&mut self, offset: isize) {
        self.tab = self.tab.cycle(offset);
        self.selected = 0;
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = shifted(self.selected, offset, self.items().len());
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items().len().saturating_sub(1);
    }

    /// Point the selection at the item with `id`, or keep it in bounds.
    pub(crate) fn focus_item(&mut self, id: Option<i64>) {
        if let Some(pos) = id.and_then(|id| self.items().iter().position(|i| i.id == Some(id))) {
            self.selected = pos;
        } else {
            self.ensure_in_bounds();
        }
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        let len = self.items().len();
        self.selected = if len == 0 { 0 } else { min(self.selected, len - 1) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectStatus;

    fn subject(id: i64, name: &str) -> Subject {
        let mut subject = Subject::new(name, "M1", SubjectStatus::InProgress);
        subject.id = Some(id);
        subject
    }

    #[test]
    fn filter_narrows_and_clamps_selection() {
        let mut screen = SubjectListScreen::new(vec![
            subject(1, "Algebra"),
            subject(2, "Calculus"),
            subject(3, "Calligraphy"),
        ]);
        screen.select_last();
        assert_eq!(screen.current_subject().and_then(|s| s.id), Some(3));

        screen.set_filter(Some("CAL".into()));
        assert_eq!(screen.len(), 2);
        assert_eq!(screen.current_subject().and_then(|s| s.id), Some(3));

        screen.set_filter(Some("zzz".into()));
        assert!(screen.current_subject().is_none());
    }

    #[test]
    fn replace_keeps_focus_on_requested_subject() {
        let mut screen = SubjectListScreen::new(vec![subject(1, "Algebra")]);
        screen.replace(vec![subject(1, "Algebra"), subject(5, "Biology")], Some(5));
        assert_eq!(screen.current_subject().and_then(|s| s.id), Some(5));
    }

    #[test]
    fn tab_switch_resets_selection() {
        let mut s = subject(1, "Physics");
        s.content.documents = vec![
            ContentItem::new(Category::Document, "a", "/a"),
            ContentItem::new(Category::Document, "b", "/b"),
        ];
        let mut screen = SubjectScreen::new(s);
        screen.move_selection(5);
        assert_eq!(screen.selected, 1);

        screen.switch_tab(1);
        assert_eq!(screen.tab, Category::Video);
        assert_eq!(screen.selected, 0);
        assert!(screen.current_item().is_none());
    }
}
