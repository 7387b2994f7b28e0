use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::api::ApiHealth;
use crate::app::Model;
use crate::session::{Lifecycle, Mutation, Slot};

use super::style::{Chrome, toast_style};

/// Label shown while a request blocks its control.
pub fn busy_label(model: &Model) -> Option<&'static str> {
    match model.in_flight.mutation() {
        Some(Mutation::CreateDraft | Mutation::SaveDraft) => return Some("Saving\u{2026}"),
        Some(Mutation::Publish) => return Some("Publishing\u{2026}"),
        None => {}
    }
    if model.in_flight.is_busy(Slot::Load) {
        Some("Loading\u{2026}")
    } else if model.in_flight.is_busy(Slot::Delete) {
        Some("Deleting\u{2026}")
    } else {
        None
    }
}

pub const fn lifecycle_label(lifecycle: Lifecycle) -> &'static str {
    match lifecycle {
        Lifecycle::Unsaved => "unsaved",
        Lifecycle::Draft => "draft",
        Lifecycle::Published => "published",
    }
}

fn api_label(model: &Model) -> String {
    match &model.api_status {
        None => "API: checking\u{2026}".to_string(),
        Some(status) => match status.status {
            ApiHealth::Working => "API: ok".to_string(),
            ApiHealth::NoToken => "API: no token".to_string(),
            ApiHealth::Error if status.message.is_empty() => "API: error".to_string(),
            ApiHealth::Error => format!("API: error ({})", status.message),
        },
    }
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let cursor = model.editor.cursor();
    let dirty = if model.is_dirty() { " [modified]" } else { "" };
    let busy = busy_label(model).map(|label| format!("  {label}")).unwrap_or_default();
    let status = format!(
        " Ln {}, Col {}  {}{}{}  {}  F1:help",
        cursor.line + 1,
        cursor.col + 1,
        lifecycle_label(model.session.lifecycle()),
        dirty,
        busy,
        api_label(model),
    );
    frame.render_widget(Paragraph::new(status).style(chrome.status_bar), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = toast_style(level);
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
