//! Layout - screen grids for the inventory review and dialogs
//!
//! The review screen is a header line, three inventory columns, a footer
//! with stage progress and hotkeys, and a one-line status bar. On short
//! terminals the footer is dropped first so the inventory stays readable.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const HEADER_HEIGHT: u16 = 1;
const STATUS_BAR_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 8;
const MIN_COLUMNS_HEIGHT: u16 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLayout {
    pub header: Rect,
    /// processor+memory | GPU+network | storage
    pub columns: [Rect; 3],
    /// Zero height when the terminal is too short
    pub progress: Rect,
    pub hotkeys: Rect,
    pub status_bar: Rect,
}

pub fn compute_review_layout(area: Rect) -> ReviewLayout {
    let remaining = area.height.saturating_sub(HEADER_HEIGHT + STATUS_BAR_HEIGHT);
    let footer_height = if remaining >= MIN_COLUMNS_HEIGHT + FOOTER_HEIGHT {
        FOOTER_HEIGHT
    } else {
        0
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(footer_height),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(rows[1]);

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    ReviewLayout {
        header: rows[0],
        columns: [columns[0], columns[1], columns[2]],
        progress: footer[0],
        hotkeys: footer[1],
        status_bar: rows[3],
    }
}

/// Rectangle of the given percentage size, centered in `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Bottom strip of `r`, `height` lines tall
pub fn bottom_strip(r: Rect, height: u16) -> Rect {
    let height = height.min(r.height);
    Rect::new(r.x, r.y + r.height - height, r.width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_layout_80x24() {
        let layout = compute_review_layout(Rect::new(0, 0, 80, 24));
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.progress.height, FOOTER_HEIGHT);
        assert_eq!(layout.columns[0].height, 24 - 1 - 1 - FOOTER_HEIGHT);

        // Columns span the full width without overlap
        let width: u16 = layout.columns.iter().map(|c| c.width).sum();
        assert_eq!(width, 80);
        assert_eq!(layout.columns[1].x, layout.columns[0].x + layout.columns[0].width);
    }

    #[test]
    fn test_review_layout_short_terminal_drops_footer() {
        let layout = compute_review_layout(Rect::new(0, 0, 80, 15));
        assert_eq!(layout.progress.height, 0);
        assert_eq!(layout.hotkeys.height, 0);
        assert_eq!(layout.columns[0].height, 13);
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, area);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
        assert_eq!(inner.y, 10);
    }

    #[test]
    fn test_bottom_strip() {
        let strip = bottom_strip(Rect::new(0, 0, 80, 24), 3);
        assert_eq!(strip, Rect::new(0, 21, 80, 3));
        assert_eq!(bottom_strip(Rect::new(0, 0, 10, 2), 5).height, 2);
    }
}
