use std::fs;
use std::mem;

use anyhow::{anyhow, Context, Result};
use crossterm::event::KeyCode;
use open::that as open_target;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::db::Store;
use crate::models::{Category, ContentItem, Subject, TargetKind};
use crate::ordering::{move_item, reorder_by_ids};

use super::forms::{
    ConfirmContentRemove, ConfirmSubjectDelete, ContentField, ContentForm, DividerForm,
    ExportForm, SubjectField, SubjectForm,
};
use super::helpers::{centered_rect, divider_banner, status_style, surface_error};
use super::screens::{SubjectListScreen, SubjectScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Which top-level view is rendered. The subject view owns a copy of the
/// subject it shows; returning to the list reloads from the store so counts
/// and edits made in the view show up there too.
enum Screen {
    Subjects,
    Subject(SubjectScreen),
}

/// Modal state layered over the current screen.
///
/// Each variant carries the form it edits, so closing a popup is just a return
/// to [`Mode::Normal`] and nothing needs resetting. Keys are routed to the
/// active mode first; the screen only sees them in `Normal`.
enum Mode {
    Normal,
    AddingSubject(SubjectForm),
    EditingSubject { id: i64, form: SubjectForm },
    ConfirmSubjectDelete(ConfirmSubjectDelete),
    AddingContent(ContentForm),
    AddingDivider(DividerForm),
    ConfirmContentRemove(ConfirmContentRemove),
    Searching(SearchState),
    Exporting(ExportForm),
}

struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

fn category_noun(category: Category) -> &'static str {
    match category {
        Category::Document => "document",
        Category::Video => "video",
        Category::LiveClass => "live class",
    }
}

/// Central application state shared across the TUI.
///
/// `list` survives while a subject is open so the selection and search filter
/// are where the user left them on the way back.
pub struct App {
    store: Store,
    list: SubjectListScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Store, subjects: Vec<Subject>) -> Self {
        Self {
            store,
            list: SubjectListScreen::new(subjects),
            screen: Screen::Subjects,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Dispatch a key press. Returns `true` when the app should exit.
    ///
    /// The current mode is taken out of `self` for the duration of the call so
    /// handlers can consume their form by value and hand back the next mode.
    /// Handlers that fail leave the popup open with the error shown in it.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => {
                if matches!(self.screen, Screen::Subjects) {
                    self.handle_subjects_key(code, &mut exit)?
                } else {
                    self.handle_subject_key(code, &mut exit)?
                }
            }
            Mode::AddingSubject(form) => self.handle_add_subject(code, form),
            Mode::EditingSubject { id, form } => self.handle_edit_subject(code, id, form),
            Mode::ConfirmSubjectDelete(confirm) => self.handle_confirm_subject_delete(code, confirm),
            Mode::AddingContent(form) => self.handle_add_content(code, form),
            Mode::AddingDivider(form) => self.handle_add_divider(code, form),
            Mode::ConfirmContentRemove(confirm) => self.handle_confirm_content_remove(code, confirm),
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::Exporting(form) => self.handle_export(code, form),
        };

        Ok(exit)
    }

    /// Ctrl+Up / Ctrl+Down move the selected item inside the open list. Ignored
    /// while a popup is open so a stray chord cannot reorder behind a form.
    pub(crate) fn handle_ctrl_move(&mut self, offset: isize) -> Result<()> {
        if matches!(self.mode, Mode::Normal) {
            self.move_current_item(offset);
        }
        Ok(())
    }

    fn handle_subjects_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.list.move_selection(PAGE_STEP),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),
            KeyCode::Enter => {
                if let Some(subject) = self.list.current_subject().cloned() {
                    self.clear_status();
                    self.open_subject(subject)?;
                } else {
                    self.set_status("No subject selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingSubject(SubjectForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(subject) = self.list.current_subject() {
                    if let Some(id) = subject.id {
                        let form = SubjectForm::from_subject(subject);
                        self.clear_status();
                        return Ok(Mode::EditingSubject { id, form });
                    }
                }
                self.set_status("No subject selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') => {
                let confirm = self.list.current_subject().and_then(ConfirmSubjectDelete::from);
                if let Some(confirm) = confirm {
                    self.clear_status();
                    return Ok(Mode::ConfirmSubjectDelete(confirm));
                }
                self.set_status("No subject selected to remove.", StatusKind::Error);
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                let query = self.list.filter.clone().unwrap_or_default();
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.clear_status();
                return Ok(Mode::Exporting(ExportForm::default()));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_subject_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::Subject(view) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                let focus = view.subject.id;
                self.screen = Screen::Subjects;
                self.clear_status();
                self.reload_subjects(focus)?;
            }
            KeyCode::Tab | KeyCode::Right => view.switch_tab(1),
            KeyCode::BackTab | KeyCode::Left => view.switch_tab(-1),
            KeyCode::Up => view.move_selection(-1),
            KeyCode::Down => view.move_selection(1),
            KeyCode::PageUp => view.move_selection(-PAGE_STEP),
            KeyCode::PageDown => view.move_selection(PAGE_STEP),
            KeyCode::Home => view.select_first(),
            KeyCode::End => view.select_last(),
            KeyCode::Enter => {
                if let Some(item) = view.current_item().cloned() {
                    self.open_item(&item);
                }
            }
            KeyCode::Char('+') => {
                let form = ContentForm::new(view.tab);
                self.clear_status();
                return Ok(Mode::AddingContent(form));
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                let tab = view.tab;
                if tab.supports_dividers() {
                    self.clear_status();
                    return Ok(Mode::AddingDivider(DividerForm::new(tab)));
                }
                self.set_status(
                    format!("{} do not use dividers.", tab.label()),
                    StatusKind::Error,
                );
            }
            KeyCode::Char('-') => {
                if let Some(item) = view.current_item().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmContentRemove(ConfirmContentRemove { item }));
                }
                self.set_status("No item selected to remove.", StatusKind::Error);
            }
            KeyCode::Char('[') => self.move_current_item(-1),
            KeyCode::Char(']') => self.move_current_item(1),
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(id) = view.subject.id {
                    let form = SubjectForm::from_subject(&view.subject);
                    self.clear_status();
                    return Ok(Mode::EditingSubject { id, form });
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_subject(&mut self, code: KeyCode, mut form: SubjectForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add subject cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Left => form.cycle_status(-1),
            KeyCode::Right => form.cycle_status(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_subject(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::AddingSubject(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_edit_subject(&mut self, code: KeyCode, id: i64, mut form: SubjectForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Left => form.cycle_status(-1),
            KeyCode::Right => form.cycle_status(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_subject(id, &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::EditingSubject { id, form }
        } else {
            Mode::Normal
        }
    }

    fn handle_confirm_subject_delete(&mut self, code: KeyCode, confirm: ConfirmSubjectDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_subject_delete(&confirm) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Mode::ConfirmSubjectDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmSubjectDelete(confirm),
        }
    }

    fn handle_add_content(&mut self, code: KeyCode, mut form: ContentForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_content(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::AddingContent(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_add_divider(&mut self, code: KeyCode, mut form: DividerForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add divider cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Backspace => {
                form.name.pop();
                Mode::AddingDivider(form)
            }
            KeyCode::Enter => match self.save_divider(&form) {
                Ok(()) => Mode::Normal,
                Err(err) => {
                    self.set_status(surface_error(&err), StatusKind::Error);
                    Mode::AddingDivider(form)
                }
            },
            KeyCode::Char(ch) if !ch.is_control() => {
                form.name.push(ch);
                Mode::AddingDivider(form)
            }
            _ => Mode::AddingDivider(form),
        }
    }

    fn handle_confirm_content_remove(&mut self, code: KeyCode, confirm: ConfirmContentRemove) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_content_remove(&confirm) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Mode::ConfirmContentRemove(confirm)
                    }
                }
            }
            _ => Mode::ConfirmContentRemove(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.list.set_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => {
                if self.list.len() == 0 {
                    self.set_status("No subjects match the search.", StatusKind::Error);
                }
                return Mode::Normal;
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::Backspace => {
                state.query.pop();
                self.list.set_filter(Some(state.query.clone()));
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                self.list.set_filter(Some(state.query.clone()));
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    fn handle_export(&mut self, code: KeyCode, mut form: ExportForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Export cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                form.path.pop();
            }
            KeyCode::Enter => match self.export_backup(&form) {
                Ok(()) => return Mode::Normal,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) if !ch.is_control() => {
                form.path.push(ch);
                form.error = None;
            }
            _ => {}
        }
        Mode::Exporting(form)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Subjects => self.draw_subject_list(frame, content_area),
            Screen::Subject(view) => self.draw_subject_view(frame, content_area, view),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingSubject(form) => self.draw_subject_form(frame, area, "Add Subject", form),
            Mode::EditingSubject { form, .. } => {
                self.draw_subject_form(frame, area, "Edit Subject", form)
            }
            Mode::ConfirmSubjectDelete(confirm) => self.draw_confirm_subject(frame, area, confirm),
            Mode::AddingContent(form) => self.draw_content_form(frame, area, form),
            Mode::AddingDivider(form) => self.draw_divider_form(frame, area, form),
            Mode::ConfirmContentRemove(confirm) => self.draw_confirm_content(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Exporting(form) => self.draw_export_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_subject_list(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.list.filter {
            Some(filter) if !filter.trim().is_empty() => format!("Subjects (filter: {filter})"),
            _ => "Subjects".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.list.len() == 0 {
            let text = if self.list.subjects.is_empty() {
                "No subjects yet. Press '+' to add one."
            } else {
                "No subjects match the search."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .list
            .visible_subjects()
            .map(|subject| {
                let content = &subject.content;
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            subject.name.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(format!(" ({})  ", subject.module)),
                        Span::styled(subject.status.to_string(), status_style(subject.status)),
                    ]),
                    Line::from(Span::styled(
                        format!(
                            "  {} documents · {} videos · {} live classes",
                            content.documents.iter().filter(|i| !i.is_divider).count(),
                            content.videos.iter().filter(|i| !i.is_divider).count(),
                            content.live_classes.len()
                        ),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_subject_view(&self, frame: &mut Frame, area: Rect, view: &SubjectScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        let subject = &view.subject;
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                subject.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" ({})  ", subject.module)),
            Span::styled(subject.status.to_string(), status_style(subject.status)),
        ]));
        frame.render_widget(header, chunks[0]);

        let titles = Category::ALL
            .iter()
            .map(|category| format!("{} ({})", category.label(), subject.content.get(*category).len()));
        let selected_tab = Category::ALL
            .iter()
            .position(|category| *category == view.tab)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL))
            .select(selected_tab)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[1]);

        let list_area = chunks[2];
        let block = Block::default().borders(Borders::ALL).title(view.tab.label());
        let items = view.items();
        if items.is_empty() {
            let message = Paragraph::new(format!(
                "No {}s yet. Press '+' to add one.",
                category_noun(view.tab)
            ))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(message, list_area);
            return;
        }

        // Borders plus the highlight symbol.
        let banner_width = list_area.width.saturating_sub(4) as usize;
        let rows: Vec<ListItem> = items
            .iter()
            .map(|item| self.content_row(item, banner_width))
            .collect();

        let list = List::new(rows)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(view.selected));
        frame.render_stateful_widget(list, list_area, &mut state);
    }

    fn content_row(&self, item: &ContentItem, banner_width: usize) -> ListItem<'static> {
        if item.is_divider {
            return ListItem::new(Line::from(Span::styled(
                divider_banner(&item.name, banner_width),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let path_style = match item.target().map(|t| t.kind) {
            Some(TargetKind::Web) => Style::default().fg(Color::Cyan),
            _ => Style::default().fg(Color::Gray),
        };
        ListItem::new(Line::from(vec![
            Span::raw(item.name.clone()),
            Span::raw("  "),
            Span::styled(item.path.clone(), path_style),
        ]))
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => &[("[Type]", "Filter"), ("[Enter]", "Keep"), ("[Esc]", "Clear")],
            (_, Mode::Normal) => match &self.screen {
                Screen::Subjects => &[
                    ("[↑↓]", "Navigate"),
                    ("[Enter]", "Open"),
                    ("[+]", "Add"),
                    ("[e]", "Edit"),
                    ("[-]", "Remove"),
                    ("[f]", "Search"),
                    ("[x]", "Export"),
                    ("[q]", "Quit"),
                ],
                Screen::Subject(_) => &[
                    ("[←→]", "Tab"),
                    ("[↑↓]", "Navigate"),
                    ("[Enter]", "Open"),
                    ("[+]", "Add"),
                    ("[d]", "Divider"),
                    ("[-]", "Remove"),
                    ("[ [ ] ]", "Move"),
                    ("[Esc]", "Back"),
                ],
            },
            _ => &[],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, action) in keys {
            spans.push(Span::styled(key.to_string(), key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_subject_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &SubjectForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Name", SubjectField::Name),
            form.build_line("Module", SubjectField::Module),
            form.build_line("Status", SubjectField::Status),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • ←→ to change status • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            SubjectField::Name => ("Name: ".len(), 0),
            SubjectField::Module => ("Module: ".len(), 1),
            SubjectField::Status => return,
        };
        frame.set_cursor_position((
            inner.x + (prefix + form.value_len(form.active)) as u16,
            inner.y + row,
        ));
    }

    fn draw_content_form(&self, frame: &mut Frame, area: Rect, form: &ContentForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let title = format!("Add {}", category_noun(form.category));
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(ContentField::Location),
            form.build_line(ContentField::Name),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else if let Some(warning) = form.extension_warning() {
            lines.push(Line::from(Span::styled(
                warning,
                Style::default().fg(Color::Yellow),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let row = match form.active {
            ContentField::Location => 0,
            ContentField::Name => 1,
        };
        let offset = form.prefix_len(form.active) + form.value_len(form.active);
        frame.set_cursor_position((inner.x + offset as u16, inner.y + row));
    }

    fn draw_divider_form(&self, frame: &mut Frame, area: Rect, form: &DividerForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Divider").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Divider name: {}", form.name)),
            Line::from(""),
            Line::from(Span::styled(
                "Leave blank for the default name • Enter to save • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + "Divider name: ".len() as u16 + form.name.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_export_form(&self, frame: &mut Frame, area: Rect, form: &ExportForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Export Backup").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let hint = match &form.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
            None => Span::styled(
                "JSON file path • Enter to export • Esc to cancel",
                Style::default().fg(Color::Gray),
            ),
        };
        let lines = vec![
            Line::from(format!("Save to: {}", form.path)),
            Line::from(""),
            Line::from(hint),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let cursor_x = inner.x + "Save to: ".len() as u16 + form.path.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_confirm_subject(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSubjectDelete) {
        let lines = vec![
            Line::from(format!("Remove '{}'?", confirm.name)),
            Line::from(format!(
                "This also deletes its {} content item(s).",
                confirm.item_count
            )),
        ];
        self.draw_confirm(frame, area, "Confirm Removal", lines);
    }

    fn draw_confirm_content(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmContentRemove) {
        let what = if confirm.item.is_divider {
            format!("Remove divider '{}'?", confirm.item.name)
        } else {
            format!("Remove '{}'?", confirm.item.name)
        };
        self.draw_confirm(frame, area, "Confirm Removal", vec![Line::from(what)]);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line<'static>>) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Refresh the list from the store, keeping the cursor on `focus_id` when
    /// it is still visible after the filter is reapplied.
    fn reload_subjects(&mut self, focus_id: Option<i64>) -> Result<()> {
        let subjects = self.store.load_all_subjects()?;
        self.list.replace(subjects, focus_id);
        Ok(())
    }

    /// Switch to the subject view with freshly loaded content. The list copy may
    /// be stale if the same subject was changed since the last reload.
    fn open_subject(&mut self, mut subject: Subject) -> Result<()> {
        self.store.load_content(&mut subject)?;
        self.screen = Screen::Subject(SubjectScreen::new(subject));
        Ok(())
    }

    fn open_item(&mut self, item: &ContentItem) {
        let Some(target) = item.target() else {
            let message = if item.is_divider {
                "Dividers cannot be opened."
            } else {
                "This item has no path."
            };
            self.set_status(message, StatusKind::Error);
            return;
        };

        match open_target(&target.location) {
            Ok(()) => {
                let verb = match target.kind {
                    TargetKind::Web => "in the browser",
                    TargetKind::Local => "with the default program",
                };
                self.set_status(format!("Opened {} {verb}.", item.name), StatusKind::Info);
            }
            Err(err) => {
                tracing::warn!(location = %target.location, error = %err, "failed to open content");
                self.set_status(format!("Failed to open: {err}"), StatusKind::Error);
            }
        }
    }

    /// Move the selected item one slot and persist the new order by id. The
    /// store reloads the list afterwards, so the cursor follows the moved item
    /// by id rather than by position.
    fn move_current_item(&mut self, offset: isize) {
        if let Err(err) = self.try_move_current_item(offset) {
            self.set_status(surface_error(&err), StatusKind::Error);
        }
    }

    fn try_move_current_item(&mut self, offset: isize) -> Result<()> {
        let Screen::Subject(view) = &mut self.screen else {
            return Ok(());
        };
        let items = view.items();
        let from = view.selected;
        let to = from as isize + offset;
        if from >= items.len() || to < 0 || to as usize >= items.len() {
            return Ok(());
        }

        let moved_id = items[from].id;
        let ids: Vec<i64> = move_item(items, from, to as usize)
            .iter()
            .filter_map(|item| item.id)
            .collect();
        let tab = view.tab;
        reorder_by_ids(&self.store, &mut view.subject, tab, &ids)?;
        view.focus_item(moved_id);
        Ok(())
    }

    fn save_new_subject(&mut self, form: &SubjectForm) -> Result<()> {
        let (name, module, status) = form.parse_inputs()?;
        let mut subject = Subject::new(name, module, status);
        self.store.save(&mut subject)?;
        self.reload_subjects(subject.id)?;
        self.set_status(format!("Added {}.", subject.name), StatusKind::Info);
        Ok(())
    }

    fn save_existing_subject(&mut self, id: i64, form: &SubjectForm) -> Result<()> {
        let (name, module, status) = form.parse_inputs()?;

        let mut subject = match &self.screen {
            Screen::Subject(view) if view.subject.id == Some(id) => view.subject.clone(),
            _ => self
                .list
                .subjects
                .iter()
                .find(|s| s.id == Some(id))
                .cloned()
                .ok_or_else(|| anyhow!("Subject not found"))?,
        };
        subject.name = name;
        subject.module = module;
        subject.status = status;
        self.store.save(&mut subject)?;

        if let Screen::Subject(view) = &mut self.screen {
            if view.subject.id == Some(id) {
                view.subject.name = subject.name.clone();
                view.subject.module = subject.module.clone();
                view.subject.status = subject.status;
            }
        }
        self.reload_subjects(Some(id))?;
        self.set_status(format!("Updated {}.", subject.name), StatusKind::Info);
        Ok(())
    }

    /// Deleting always lands back on the list, since the open view (if any)
    /// may belong to the subject that just went away.
    fn perform_subject_delete(&mut self, confirm: &ConfirmSubjectDelete) -> Result<()> {
        self.store.delete_subject(confirm.id)?;
        self.screen = Screen::Subjects;
        self.reload_subjects(None)?;
        self.set_status(format!("Deleted {}.", confirm.name), StatusKind::Info);
        Ok(())
    }

    fn save_new_content(&mut self, form: &ContentForm) -> Result<()> {
        let Screen::Subject(view) = &mut self.screen else {
            return Err(anyhow!("No subject is open."));
        };
        let item = form.parse_inputs(view.subject.content.live_classes.len())?;
        let stored = self.store.add_content(&mut view.subject, item)?;
        view.focus_item(stored.id);

        let message = match form.extension_warning() {
            Some(warning) => format!("Added {}. {warning}", stored.name),
            None => format!("Added {}.", stored.name),
        };
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn save_divider(&mut self, form: &DividerForm) -> Result<()> {
        let Screen::Subject(view) = &mut self.screen else {
            return Err(anyhow!("No subject is open."));
        };
        let stored = self.store.add_content(&mut view.subject, form.to_item())?;
        view.focus_item(stored.id);
        self.set_status(format!("Added divider {}.", stored.name), StatusKind::Info);
        Ok(())
    }

    fn perform_content_remove(&mut self, confirm: &ConfirmContentRemove) -> Result<()> {
        let Screen::Subject(view) = &mut self.screen else {
            return Err(anyhow!("No subject is open."));
        };
        self.store.remove_content(&mut view.subject, &confirm.item)?;
        view.ensure_in_bounds();
        self.set_status(format!("Removed {}.", confirm.item.name), StatusKind::Info);
        Ok(())
    }

    fn export_backup(&mut self, form: &ExportForm) -> Result<()> {
        let path = form.parse_path()?;
        let snapshot = self.store.export_snapshot()?;
        let json = snapshot.to_json_pretty()?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write backup to {}", path.display()))?;
        self.set_status(
            format!(
                "Exported {} subject(s) to {}.",
                snapshot.subjects.len(),
                path.display()
            ),
            StatusKind::Info,
        );
        Ok(())
    }
}
