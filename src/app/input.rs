use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::model::{Focus, Overlay, Screen};
use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::export::ExportFormat;
use crate::ui::{PANE_LEFT_PADDING, TAGS_ROW, TITLE_ROW, main_area, pane_top, status_column};

use super::event_loop::ResizeDebouncer;

const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => Self::handle_paste(text, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_paste(text: &str, model: &Model) -> Option<Message> {
        match (model.overlay, model.screen) {
            // Terminals deliver a dragged-in file as a pasted path.
            (Some(Overlay::OpenPrompt), _) | (None, Screen::Upload) => {
                Some(Message::DropPath(text.to_string()))
            }
            (None, Screen::Editor) => match model.focus {
                Focus::Editor => Some(Message::EditorInsertText(text.replace("\r\n", "\n"))),
                Focus::Title | Focus::Tags => Some(Message::FieldInsertText(text.to_string())),
                Focus::Status => None,
            },
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match model.overlay {
            Some(Overlay::Help) => return Some(Message::CloseOverlay),
            Some(Overlay::OpenPrompt) => {
                return match key.code {
                    KeyCode::Esc => Some(Message::CloseOverlay),
                    KeyCode::Enter => Some(Message::PromptSubmit),
                    KeyCode::Backspace => Some(Message::PromptBackspace),
                    KeyCode::Char(c) if !ctrl => Some(Message::PromptInput(c)),
                    _ => None,
                };
            }
            Some(Overlay::Export) => {
                return match key.code {
                    KeyCode::Char('h') => Some(Message::Export(ExportFormat::Html)),
                    KeyCode::Char('m') => Some(Message::Export(ExportFormat::Markdown)),
                    KeyCode::Char('t') => Some(Message::Export(ExportFormat::Text)),
                    KeyCode::Esc | KeyCode::Char('q') => Some(Message::CloseOverlay),
                    _ => None,
                };
            }
            Some(Overlay::History) => {
                return match key.code {
                    KeyCode::Char('j') | KeyCode::Down => Some(Message::HistoryDown),
                    KeyCode::Char('k') | KeyCode::Up => Some(Message::HistoryUp),
                    KeyCode::Char('e') | KeyCode::Enter => Some(Message::HistoryEdit),
                    KeyCode::Char('p') => Some(Message::HistoryPublish),
                    KeyCode::Char('v') => Some(Message::HistoryView),
                    KeyCode::Char('d') => Some(Message::HistoryDelete),
                    KeyCode::Char('r') => Some(Message::RefreshHistory),
                    KeyCode::Esc | KeyCode::Char('q') => Some(Message::CloseOverlay),
                    KeyCode::Char('c') if ctrl => Some(Message::Quit),
                    _ => None,
                };
            }
            None => {}
        }

        // Shortcuts available everywhere
        match key.code {
            KeyCode::Char('q' | 'c') if ctrl => return Some(Message::Quit),
            KeyCode::Char('o') if ctrl => return Some(Message::OpenPrompt),
            KeyCode::Char('l') if ctrl => return Some(Message::ShowHistory),
            KeyCode::Char('r') if ctrl => return Some(Message::RefreshApiStatus),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            _ => {}
        }

        if model.screen == Screen::Upload {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('o') => Some(Message::OpenPrompt),
                KeyCode::Char('q') => Some(Message::Quit),
                KeyCode::Char('?') => Some(Message::ToggleHelp),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('s') if ctrl => return Some(Message::SaveDraft),
            KeyCode::Char('p') if ctrl => return Some(Message::Publish),
            KeyCode::Char('e') if ctrl => return Some(Message::ShowExportMenu),
            KeyCode::Tab => return Some(Message::FocusNext),
            KeyCode::BackTab => return Some(Message::FocusPrev),
            KeyCode::Esc => return Some(Message::Focus(Focus::Editor)),
            _ => {}
        }

        match model.focus {
            Focus::Editor => Self::handle_editor_key(key),
            Focus::Title | Focus::Tags => match key.code {
                KeyCode::Enter => Some(Message::FocusNext),
                KeyCode::Backspace => Some(Message::FieldBackspace),
                KeyCode::Char(c) if !ctrl => Some(Message::FieldInput(c)),
                _ => None,
            },
            Focus::Status => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                    Some(Message::CycleStatus)
                }
                _ => None,
            },
        }
    }

    fn handle_editor_key(key: KeyEvent) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Left if ctrl => Some(Message::EditorMoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::EditorMoveWordRight),
            KeyCode::Home if ctrl => Some(Message::EditorMoveToStart),
            KeyCode::End if ctrl => Some(Message::EditorMoveToEnd),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::PageUp => Some(Message::EditorPageUp),
            KeyCode::PageDown => Some(Message::EditorPageDown),
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),
            KeyCode::Char(c) if !ctrl => Some(Message::EditorInsertChar(c)),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        match model.overlay {
            Some(Overlay::History) => {
                return match mouse.kind {
                    MouseEventKind::ScrollDown => Some(Message::HistoryDown),
                    MouseEventKind::ScrollUp => Some(Message::HistoryUp),
                    _ => None,
                };
            }
            Some(_) => return None,
            None => {}
        }

        let (width, height) = model.terminal_size;
        let main = main_area(width, height);
        let in_main = mouse.row >= main.y && mouse.row < main.y + main.height;

        if model.screen == Screen::Upload {
            return (in_main && matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)))
                .then_some(Message::OpenPrompt);
        }

        if model.layout.is_resizing() {
            return match mouse.kind {
                MouseEventKind::Drag(MouseButton::Left) => Some(Message::ResizeDrag(mouse.column)),
                MouseEventKind::Up(MouseButton::Left) => Some(Message::ResizeEnd),
                _ => None,
            };
        }

        let split = model.layout.split();
        let in_editor = in_main && mouse.column < split.editor;
        let in_preview = in_main && mouse.column >= split.editor + split.handle;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if in_main && model.layout.handle_contains(mouse.column) {
                    return Some(Message::ResizeStart(mouse.column));
                }
                if mouse.row == TITLE_ROW {
                    return Some(Message::Focus(Focus::Title));
                }
                if mouse.row == TAGS_ROW {
                    let focus = if mouse.column >= status_column(width) {
                        Focus::Status
                    } else {
                        Focus::Tags
                    };
                    return Some(Message::Focus(focus));
                }
                if in_editor && mouse.row >= pane_top() {
                    let line = model.editor_scroll + usize::from(mouse.row - pane_top());
                    let col = usize::from(mouse.column.saturating_sub(PANE_LEFT_PADDING))
                        + model.editor_col_offset();
                    return Some(Message::EditorClick(line, col));
                }
                None
            }
            MouseEventKind::ScrollDown if in_editor => Some(Message::EditorScrollDown(WHEEL_LINES)),
            MouseEventKind::ScrollUp if in_editor => Some(Message::EditorScrollUp(WHEEL_LINES)),
            MouseEventKind::ScrollDown if in_preview => {
                Some(Message::PreviewScrollDown(WHEEL_LINES))
            }
            MouseEventKind::ScrollUp if in_preview => Some(Message::PreviewScrollUp(WHEEL_LINES)),
            _ => None,
        }
    }
}
