use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::{HistoryView, Model};
use crate::article::HistoryEntry;
use crate::config::{global_config_path, local_override_path};

use super::style::Chrome;

/// Terminal rows used by one history entry, separator included.
pub const HISTORY_ENTRY_ROWS: usize = 6;

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White))
}

/// Area inside a popup's border and padding.
const fn popup_inner(popup: Rect) -> Rect {
    Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    )
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = global_config_path().display().to_string();
    let local_cfg = local_override_path().display().to_string();

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = vec![
        Line::styled("Article", section_style),
        Line::raw("  Ctrl-o              Open a markdown file"),
        Line::raw("  Ctrl-s              Save draft"),
        Line::raw("  Ctrl-p              Publish"),
        Line::raw("  Ctrl-e              Export (HTML, markdown, text)"),
        Line::raw("  Ctrl-l              Article history"),
        Line::raw("  Ctrl-r              Recheck API status"),
        Line::raw(""),
        Line::styled("Editing", section_style),
        Line::raw("  Tab / Shift-Tab     Editor, title, tags, status"),
        Line::raw("  Esc                 Back to the editor"),
        Line::raw("  Arrows, Home/End    Navigate"),
        Line::raw("  Ctrl+Left/Right     Word movement"),
        Line::raw("  Ctrl+Home/End       Start / end of text"),
        Line::raw("  Space on status     Cycle publish status"),
        Line::raw("  Mouse drag divider  Resize panes"),
        Line::raw(""),
        Line::styled("Other", section_style),
        Line::raw("  Ctrl-q / Ctrl-c     Quit"),
        Line::raw("  F1                  Toggle help"),
        Line::raw(""),
        Line::styled("Config", section_style),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
    ];
    if let Some(dir) = model.export_dir.to_str() {
        lines.push(Line::raw(format!("  Exports: {dir}")));
    }

    frame.render_widget(Clear, popup);
    frame.render_widget(popup_block("Help"), popup);

    let inner = popup_inner(popup);
    let content_height = inner.height.saturating_sub(1);
    let visible: Vec<Line> = lines.into_iter().take(usize::from(content_height)).collect();
    frame.render_widget(
        Paragraph::new(visible),
        Rect::new(inner.x, inner.y, inner.width, content_height),
    );

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    frame.render_widget(
        Paragraph::new(Line::styled("any key closes", dim_style)),
        footer_area,
    );
}

/// First entry to draw so `selected` stays within `visible` entries.
pub const fn history_window_start(selected: usize, visible: usize) -> usize {
    if visible == 0 || selected < visible {
        0
    } else {
        selected + 1 - visible
    }
}

fn history_entry_lines<'a>(entry: &'a HistoryEntry, selected: bool, chrome: Chrome) -> Vec<Line<'a>> {
    let dim = Style::default().fg(Color::Indexed(245));
    let marker = if selected { "> " } else { "  " };
    let status_color = if entry.is_published() {
        Color::Green
    } else {
        Color::Yellow
    };

    let mut header = vec![
        Span::raw(marker),
        Span::styled(
            entry.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("[{}]", entry.status), Style::default().fg(status_color)),
    ];
    if let Some(words) = entry.word_count {
        header.push(Span::styled(format!("  {words} words"), dim));
    }

    let mut dates = format!("    Created {}", entry.created);
    if let Some(updated) = &entry.updated {
        dates.push_str(&format!(" \u{b7} Updated {updated}"));
    }
    if let Some(published) = &entry.published {
        dates.push_str(&format!(" \u{b7} Published {published}"));
    }
    if let Some(days) = &entry.days_to_publish {
        dates.push_str(&format!(" ({days} to publish)"));
    }

    let tags = if entry.tags.is_empty() {
        "    no tags".to_string()
    } else {
        format!("    #{}", entry.tags.join(" #"))
    };

    let actions = entry
        .actions
        .iter()
        .map(|action| action.label())
        .collect::<Vec<_>>()
        .join(" \u{b7} ");

    let mut lines = vec![
        Line::from(header),
        Line::styled(dates, dim),
        Line::styled(tags, Style::default().fg(Color::Cyan)),
        Line::styled(format!("    {}", entry.snippet), dim),
        Line::styled(format!("    {actions}"), dim),
        Line::raw(""),
    ];
    if selected {
        for line in &mut lines {
            line.style = line.style.patch(chrome.selected);
        }
    }
    lines
}

pub fn render_history_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let popup_width = area.width.saturating_sub(8).max(50);
    let popup_height = area.height.saturating_sub(2).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);
    let dim_style = Style::default().fg(Color::Indexed(245));

    frame.render_widget(Clear, popup);
    frame.render_widget(popup_block("Article History"), popup);

    let inner = popup_inner(popup);
    let content_height = inner.height.saturating_sub(1);
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);

    let lines: Vec<Line> = match &model.history {
        HistoryView::Loading => vec![Line::styled("Loading history\u{2026}", dim_style)],
        HistoryView::Failed(message) => vec![Line::styled(
            message.as_str(),
            Style::default().fg(Color::Red),
        )],
        HistoryView::Loaded(entries) if entries.is_empty() => {
            vec![Line::styled("No articles or drafts yet.", dim_style)]
        }
        HistoryView::Loaded(entries) => {
            let visible = (usize::from(content_height) / HISTORY_ENTRY_ROWS).max(1);
            let start = history_window_start(model.history_selected, visible);
            entries
                .iter()
                .enumerate()
                .skip(start)
                .take(visible)
                .flat_map(|(idx, entry)| {
                    history_entry_lines(entry, idx == model.history_selected, chrome)
                })
                .collect()
        }
    };
    frame.render_widget(Paragraph::new(lines), content_area);

    let hint = if model.pending_delete.is_some() {
        Line::styled(
            "d again deletes \u{b7} any other key cancels",
            Style::default().fg(Color::Yellow),
        )
    } else {
        Line::styled(
            "j/k select \u{2502} e edit \u{2502} p publish \u{2502} v view \u{2502} d delete \u{2502} r refresh \u{2502} Esc closes",
            dim_style,
        )
    };
    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    frame.render_widget(Paragraph::new(hint), footer_area);
}

pub fn render_export_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup = centered_popup_rect(44, 11, area);
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![Span::styled("h", key_style), Span::raw("  HTML document")]),
        Line::from(vec![Span::styled("m", key_style), Span::raw("  Markdown")]),
        Line::from(vec![Span::styled("t", key_style), Span::raw("  Plain text")]),
        Line::raw(""),
        Line::styled(
            format!("Into {}", model.export_dir.display()),
            Style::default().fg(Color::Indexed(245)),
        ),
        Line::styled("Esc cancels", Style::default().fg(Color::Indexed(245))),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(popup_block("Export")), popup);
}

pub fn render_prompt_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(10).clamp(30, 80);
    let popup = centered_popup_rect(popup_width, 8, area);
    let inner_width = usize::from(popup_width.saturating_sub(4)).saturating_sub(1);

    // Keep the end of a long path visible.
    let skip = model.prompt.chars().count().saturating_sub(inner_width);
    let shown: String = model.prompt.chars().skip(skip).collect();

    let lines = vec![
        Line::raw("Path to a .md file:"),
        Line::from(vec![
            Span::raw(shown),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]),
        Line::styled(
            "Enter opens \u{b7} Esc cancels",
            Style::default().fg(Color::Indexed(245)),
        ),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(popup_block("Open")), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
