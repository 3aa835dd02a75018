//! Display test patterns drawn straight into the terminal buffer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;
use troubadour_common::TestPattern;

/// Grid line spacing in cells (columns, rows)
const GRID_X: u16 = 8;
const GRID_Y: u16 = 4;

const GRID_BG: Color = Color::Rgb(220, 220, 220);
const GRID_LINE: Color = Color::Rgb(100, 100, 100);

const BLOCK_COLOURS: [Color; 5] = [
    Color::Rgb(255, 0, 0),
    Color::Rgb(0, 255, 0),
    Color::Rgb(0, 0, 255),
    Color::Rgb(255, 255, 255),
    Color::Rgb(0, 0, 0),
];

/// Fill colour of a full-screen field; None for the calibration pattern
pub fn field_colour(pattern: TestPattern) -> Option<Color> {
    match pattern {
        TestPattern::Red => Some(Color::Rgb(255, 0, 0)),
        TestPattern::Green => Some(Color::Rgb(0, 255, 0)),
        TestPattern::Blue => Some(Color::Rgb(0, 0, 255)),
        TestPattern::White => Some(Color::Rgb(255, 255, 255)),
        TestPattern::Black => Some(Color::Rgb(0, 0, 0)),
        TestPattern::Calibration => None,
    }
}

/// Solid colour over the whole area
pub struct ColourField(pub Color);

impl Widget for ColourField {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf.get_mut(x, y).set_symbol(" ").set_bg(self.0);
            }
        }
    }
}

/// Grey ramp, geometry grid and colour blocks stacked in thirds
pub struct CalibrationPattern;

impl Widget for CalibrationPattern {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let third = area.height / 3;
        let ramp = Rect::new(area.x, area.y, area.width, third);
        let grid = Rect::new(area.x, area.y + third, area.width, third);
        let blocks = Rect::new(
            area.x,
            area.y + 2 * third,
            area.width,
            area.height - 2 * third,
        );

        render_ramp(ramp, buf);
        render_grid(grid, buf);
        render_blocks(blocks, buf);
    }
}

/// Grey level of column `x` in a ramp `width` cells wide, black to white
pub fn ramp_level(x: u16, width: u16) -> u8 {
    let span = width.saturating_sub(1).max(1) as u32;
    (x.min(width.saturating_sub(1)) as u32 * 255 / span) as u8
}

fn render_ramp(area: Rect, buf: &mut Buffer) {
    for dx in 0..area.width {
        let level = ramp_level(dx, area.width);
        for y in area.top()..area.bottom() {
            buf.get_mut(area.x + dx, y)
                .set_symbol(" ")
                .set_bg(Color::Rgb(level, level, level));
        }
    }
}

fn render_grid(area: Rect, buf: &mut Buffer) {
    for dy in 0..area.height {
        for dx in 0..area.width {
            let symbol = match (dx % GRID_X == 0, dy % GRID_Y == 0) {
                (true, true) => "┼",
                (true, false) => "│",
                (false, true) => "─",
                (false, false) => " ",
            };
            buf.get_mut(area.x + dx, area.y + dy)
                .set_symbol(symbol)
                .set_fg(GRID_LINE)
                .set_bg(GRID_BG);
        }
    }
}

fn render_blocks(area: Rect, buf: &mut Buffer) {
    let count = BLOCK_COLOURS.len() as u16;
    for dx in 0..area.width {
        let index = ((dx as u32 * count as u32) / area.width.max(1) as u32) as usize;
        let colour = BLOCK_COLOURS[index.min(BLOCK_COLOURS.len() - 1)];
        for y in area.top()..area.bottom() {
            buf.get_mut(area.x + dx, y).set_symbol(" ").set_bg(colour);
        }
    }
}
