//! Terminal UI components.
//!
//! Screen layout, top to bottom: a one-row header, the title row, the tags
//! and status row, the two panes (each with a one-row caption), and a footer
//! used for toasts and the status bar. The geometry helpers here are shared
//! with the input layer so mouse hits land where things are drawn.

pub mod style;

mod overlays;
mod render;
mod status;

use ratatui::layout::Rect;

pub use render::render;

pub const HEADER_ROWS: u16 = 1;
/// Title row plus tags/status row.
pub const FORM_ROWS: u16 = 2;
pub const PANE_CAPTION_ROWS: u16 = 1;
pub const FOOTER_ROWS: u16 = 1;
/// Blank columns left of pane text.
pub const PANE_LEFT_PADDING: u16 = 1;

pub const TITLE_ROW: u16 = HEADER_ROWS;
pub const TAGS_ROW: u16 = HEADER_ROWS + 1;

/// First terminal row of pane content.
pub const fn pane_top() -> u16 {
    HEADER_ROWS + FORM_ROWS + PANE_CAPTION_ROWS
}

/// Rows of pane content for a terminal `height` rows tall.
pub const fn pane_body_height(height: u16) -> u16 {
    height.saturating_sub(HEADER_ROWS + FORM_ROWS + PANE_CAPTION_ROWS + FOOTER_ROWS)
}

/// Columns available for text inside a pane `width` columns wide.
pub const fn pane_text_width(width: u16) -> u16 {
    let w = width.saturating_sub(PANE_LEFT_PADDING);
    if w == 0 { 1 } else { w }
}

/// Rows spanned by both panes, captions included.
pub const fn main_area(width: u16, height: u16) -> Rect {
    Rect::new(
        0,
        HEADER_ROWS + FORM_ROWS,
        width,
        pane_body_height(height) + PANE_CAPTION_ROWS,
    )
}

/// Column at which the status selector starts on the tags row.
pub const fn status_column(width: u16) -> u16 {
    width.saturating_sub(STATUS_FIELD_WIDTH)
}

pub const STATUS_FIELD_WIDTH: u16 = 22;

#[cfg(test)]
mod tests;
