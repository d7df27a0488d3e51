use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::models::SubjectStatus;

/// Center a divider name inside a rule that fills `width` columns.
pub(crate) fn divider_banner(label: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let trimmed = label.trim();
    let mut decorated = format!(" {trimmed} ");
    let label_width = decorated.chars().count();
    if label_width >= width {
        decorated = decorated.chars().take(width).collect();
        return decorated;
    }
    let padding = width - label_width;
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", "─".repeat(left), decorated, "─".repeat(right))
}

/// Colour used for a subject's status badge.
pub(crate) fn status_style(status: SubjectStatus) -> Style {
    let color = match status {
        SubjectStatus::InProgress => Color::Cyan,
        SubjectStatus::Completed => Color::Green,
        SubjectStatus::Awaiting => Color::Yellow,
        SubjectStatus::Failed => Color::Red,
        SubjectStatus::ReferenceMaterial => Color::Magenta,
    };
    Style::default().fg(color)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn banner_fills_width_around_label() {
        let banner = divider_banner("Midterm", 21);
        assert_eq!(banner.chars().count(), 21);
        assert!(banner.contains(" Midterm "));
        assert!(banner.starts_with('─') && banner.ends_with('─'));
    }

    #[test]
    fn banner_truncates_when_too_narrow() {
        assert_eq!(divider_banner("Midterm", 4), " Mid");
        assert_eq!(divider_banner("Midterm", 0), "");
    }

    #[test]
    fn surface_error_reports_root_cause() {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("failed to insert content")
            .unwrap_err();
        assert_eq!(surface_error(&err), "disk full");
    }
}
