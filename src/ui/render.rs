use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{Focus, Model, Overlay, Screen};

use super::style::{Chrome, style_for_inline, style_for_line_kind};
use super::{
    FOOTER_ROWS, HEADER_ROWS, PANE_CAPTION_ROWS, PANE_LEFT_PADDING, STATUS_FIELD_WIDTH, TAGS_ROW,
    TITLE_ROW, main_area, overlays, status,
};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    if area.height <= HEADER_ROWS + FOOTER_ROWS {
        return;
    }

    render_header(model, frame, Rect::new(area.x, area.y, area.width, HEADER_ROWS));

    match model.screen {
        Screen::Upload => render_upload(model, frame, area),
        Screen::Editor => {
            render_form(model, frame, area);
            render_panes(model, frame, area);
        }
    }

    let footer = Rect::new(
        area.x,
        area.y + area.height - FOOTER_ROWS,
        area.width,
        FOOTER_ROWS,
    );
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, footer);
    } else {
        status::render_status_bar(model, frame, footer);
    }

    match model.overlay {
        Some(Overlay::Help) => overlays::render_help_overlay(model, frame, area),
        Some(Overlay::History) => overlays::render_history_overlay(model, frame, area),
        Some(Overlay::Export) => overlays::render_export_overlay(model, frame, area),
        Some(Overlay::OpenPrompt) => overlays::render_prompt_overlay(model, frame, area),
        None => {}
    }
}

fn render_header(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let mut text = " quillpost".to_string();
    if model.screen == Screen::Editor {
        text.push_str("  \u{b7}  ");
        text.push_str(status::lifecycle_label(model.session.lifecycle()));
        if let Some(id) = model.session.article_id() {
            text.push_str(&format!(" #{id}"));
        }
    }
    if let Some(label) = status::busy_label(model) {
        text.push_str("  \u{b7}  ");
        text.push_str(label);
    }
    frame.render_widget(Paragraph::new(text).style(chrome.header), area);
}

fn render_upload(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let body = Rect::new(
        area.x,
        area.y + HEADER_ROWS,
        area.width,
        area.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS),
    );
    let lines = vec![
        Line::raw(""),
        Line::styled(
            "Drop a markdown (.md) file here",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::styled("Drag it onto the terminal, paste its path,", chrome.placeholder),
        Line::styled("or press Enter to type a path.", chrome.placeholder),
        Line::raw(""),
        Line::styled("Ctrl+L history \u{b7} F1 help \u{b7} q quit", chrome.caption),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(chrome.handle);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        body,
    );
}

/// A single-line input, tail kept visible when longer than the field.
fn field_line<'a>(value: &'a str, width: u16, focused: bool, style: Style) -> Line<'a> {
    let room = usize::from(width).saturating_sub(usize::from(focused));
    let mut start = 0;
    while value[start..].width() > room {
        start += value[start..].chars().next().map_or(1, char::len_utf8);
    }
    let mut spans = vec![Span::styled(&value[start..], style)];
    if focused {
        spans.push(Span::styled(" ", style.add_modifier(Modifier::REVERSED)));
    }
    Line::from(spans)
}

fn render_form(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let label_width = 8;
    let field_style = |focus: Focus| {
        if model.focus == focus && model.overlay.is_none() {
            chrome.field_focused
        } else {
            chrome.field
        }
    };
    let focused = |focus: Focus| model.focus == focus && model.overlay.is_none();

    let title_row = Rect::new(area.x, area.y + TITLE_ROW, area.width, 1);
    let [label, field] =
        Layout::horizontal([Constraint::Length(label_width), Constraint::Fill(1)]).areas(title_row);
    frame.render_widget(Paragraph::new(" Title").style(chrome.field_label), label);
    frame.render_widget(
        Paragraph::new(field_line(
            &model.session.title,
            field.width,
            focused(Focus::Title),
            field_style(Focus::Title),
        ))
        .style(field_style(Focus::Title)),
        field,
    );

    let tags_row = Rect::new(area.x, area.y + TAGS_ROW, area.width, 1);
    let [label, field, status_area] = Layout::horizontal([
        Constraint::Length(label_width),
        Constraint::Fill(1),
        Constraint::Length(STATUS_FIELD_WIDTH),
    ])
    .areas(tags_row);
    frame.render_widget(Paragraph::new(" Tags").style(chrome.field_label), label);
    frame.render_widget(
        Paragraph::new(field_line(
            &model.session.tags,
            field.width,
            focused(Focus::Tags),
            field_style(Focus::Tags),
        ))
        .style(field_style(Focus::Tags)),
        field,
    );
    let status_text = format!(" Status: < {} >", model.session.status);
    frame.render_widget(
        Paragraph::new(status_text).style(field_style(Focus::Status)),
        status_area,
    );
}

fn render_panes(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let main = main_area(area.width, area.height);
    let split = model.layout.split();

    let editor = Rect::new(main.x, main.y, split.editor, main.height);
    let handle = Rect::new(main.x + split.editor, main.y, split.handle, main.height);
    let preview = Rect::new(
        main.x + split.editor + split.handle,
        main.y,
        split.preview,
        main.height,
    );

    let caption = |rect: Rect| Rect::new(rect.x, rect.y, rect.width, PANE_CAPTION_ROWS);
    let body = |rect: Rect| {
        Rect::new(
            rect.x + PANE_LEFT_PADDING.min(rect.width),
            rect.y + PANE_CAPTION_ROWS,
            rect.width.saturating_sub(PANE_LEFT_PADDING),
            rect.height.saturating_sub(PANE_CAPTION_ROWS),
        )
    };

    frame.render_widget(Paragraph::new(" Markdown").style(chrome.caption), caption(editor));
    let preview_caption = if model.preview.is_fallback() {
        " Preview (raw)"
    } else {
        " Preview"
    };
    frame.render_widget(Paragraph::new(preview_caption).style(chrome.caption), caption(preview));

    render_editor_body(model, frame, body(editor));
    render_handle(model, frame, handle);
    render_preview_body(model, frame, body(preview));
}

fn render_handle(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let style = if model.layout.is_resizing() {
        chrome.handle_active
    } else {
        chrome.handle
    };
    let lines: Vec<Line> = (0..area.height).map(|_| Line::raw("\u{2502}")).collect();
    frame.render_widget(Paragraph::new(lines).style(style), area);
}

fn render_editor_body(model: &Model, frame: &mut Frame, area: Rect) {
    let chrome = Chrome::new(model.light_theme);
    let buf = &model.editor;
    if buf.is_blank() && model.focus != Focus::Editor {
        frame.render_widget(
            Paragraph::new(Line::styled("Write your article in markdown\u{2026}", chrome.placeholder)),
            area,
        );
        return;
    }

    let cursor = buf.cursor();
    let offset = model.editor_col_offset();
    let width = usize::from(area.width);
    let show_cursor = model.focus == Focus::Editor && model.overlay.is_none();
    let start = model.editor_scroll;
    let end = (start + usize::from(area.height)).min(buf.line_count());

    let mut content: Vec<Line> = Vec::with_capacity(end.saturating_sub(start));
    for line_idx in start..end {
        let chars: Vec<char> = buf.line_at(line_idx).unwrap_or_default().chars().collect();
        let visible: Vec<char> = chars.iter().skip(offset).take(width).copied().collect();

        if show_cursor && line_idx == cursor.line {
            let col = cursor.col.saturating_sub(offset).min(visible.len());
            let before: String = visible[..col].iter().collect();
            let under = visible.get(col).map_or_else(|| " ".to_string(), char::to_string);
            let after: String = visible.iter().skip(col + 1).collect();
            content.push(Line::from(vec![
                Span::raw(before),
                Span::styled(under, Style::default().add_modifier(Modifier::REVERSED)),
                Span::raw(after),
            ]));
        } else {
            content.push(Line::raw(visible.into_iter().collect::<String>()));
        }
    }
    frame.render_widget(Paragraph::new(content), area);
}

fn render_preview_body(model: &Model, frame: &mut Frame, area: Rect) {
    let light = model.light_theme;
    let lines: Vec<Line> = model
        .preview
        .lines()
        .iter()
        .skip(model.preview_scroll)
        .take(usize::from(area.height))
        .map(|line| {
            let base = style_for_line_kind(line.kind(), light);
            if line.spans().is_empty() {
                Line::styled(line.text().to_string(), base)
            } else {
                Line::from(
                    line.spans()
                        .iter()
                        .map(|span| {
                            Span::styled(
                                span.text().to_string(),
                                style_for_inline(base, span.style(), light),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
