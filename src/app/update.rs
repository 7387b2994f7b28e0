use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiHealth, ApiStatus};
use crate::app::Model;
use crate::app::model::{Focus, HistoryView, Overlay, Screen, ToastLevel};
use crate::article::{ArticleId, HistoryAction, HistoryEntry, extract_title};
use crate::editor::Direction;
use crate::export::ExportFormat;
use crate::ingest::{check_markdown_path, normalize_dropped_path};
use crate::session::{Mutation, Slot};
use crate::worker::{Completion, Job};

/// All possible events and actions in the application.
///
/// These represent user input, timer ticks, and replies from the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Ingestion
    /// Open the path prompt
    OpenPrompt,
    PromptInput(char),
    PromptBackspace,
    /// Open the path typed into the prompt
    PromptSubmit,
    /// A path dropped (pasted) onto the window
    DropPath(String),

    // Editor
    EditorInsertChar(char),
    /// Insert pasted text at the cursor
    EditorInsertText(String),
    EditorDeleteBack,
    EditorDeleteForward,
    EditorSplitLine,
    EditorMoveCursor(Direction),
    EditorMoveHome,
    EditorMoveEnd,
    EditorMoveWordLeft,
    EditorMoveWordRight,
    EditorMoveToStart,
    EditorMoveToEnd,
    EditorPageUp,
    EditorPageDown,
    /// Scroll the editor without moving the cursor
    EditorScrollUp(usize),
    EditorScrollDown(usize),
    /// Click at buffer position (line, col)
    EditorClick(usize, usize),
    PreviewScrollUp(usize),
    PreviewScrollDown(usize),

    // Form fields
    FocusNext,
    FocusPrev,
    Focus(Focus),
    FieldInput(char),
    /// Paste into the focused single-line field
    FieldInsertText(String),
    FieldBackspace,
    CycleStatus,

    // Layout
    /// Mouse down at column x on the main area
    ResizeStart(u16),
    ResizeDrag(u16),
    ResizeEnd,
    /// Terminal resized to (width, height)
    Resize(u16, u16),

    // Remote operations
    SaveDraft,
    Publish,
    ShowHistory,
    RefreshHistory,
    HistoryUp,
    HistoryDown,
    HistoryEdit,
    HistoryPublish,
    /// Open the selected article's public URL
    HistoryView,
    HistoryDelete,
    RefreshApiStatus,

    // Export
    ShowExportMenu,
    Export(ExportFormat),

    ToggleHelp,
    CloseOverlay,
    Quit,
    /// Advance the clock to the given milliseconds
    Tick(u64),
    /// A background job finished
    Completed(Completion),
}

/// Pure state transition function.
///
/// Takes the current model and a message, returns the new model. Work for the
/// background thread is queued on the model and picked up by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    if !matches!(msg, Message::Quit | Message::Tick(_) | Message::Completed(_)) {
        model.quit_confirmed = false;
    }
    if !matches!(
        msg,
        Message::HistoryDelete | Message::Tick(_) | Message::Completed(_)
    ) {
        model.pending_delete = None;
    }

    match msg {
        Message::OpenPrompt => {
            model.prompt.clear();
            model.overlay = Some(Overlay::OpenPrompt);
        }
        Message::PromptInput(c) => model.prompt.push(c),
        Message::PromptBackspace => {
            model.prompt.pop();
        }
        Message::PromptSubmit => {
            let raw = std::mem::take(&mut model.prompt);
            model.overlay = None;
            request_file(&mut model, &raw);
        }
        Message::DropPath(raw) => {
            if model.overlay == Some(Overlay::OpenPrompt) {
                model.overlay = None;
                model.prompt.clear();
            }
            request_file(&mut model, &raw);
        }

        Message::EditorInsertChar(c) => edit(&mut model, |buf| buf.insert_char(c)),
        Message::EditorInsertText(text) => edit(&mut model, |buf| buf.insert_str(&text)),
        Message::EditorDeleteBack => edit(&mut model, |buf| {
            buf.delete_back();
        }),
        Message::EditorDeleteForward => edit(&mut model, |buf| {
            buf.delete_forward();
        }),
        Message::EditorSplitLine => edit(&mut model, crate::editor::EditorBuffer::split_line),
        Message::EditorMoveCursor(dir) => move_cursor(&mut model, |buf| buf.move_cursor(dir)),
        Message::EditorMoveHome => move_cursor(&mut model, crate::editor::EditorBuffer::move_home),
        Message::EditorMoveEnd => move_cursor(&mut model, crate::editor::EditorBuffer::move_end),
        Message::EditorMoveWordLeft => {
            move_cursor(&mut model, crate::editor::EditorBuffer::move_word_left);
        }
        Message::EditorMoveWordRight => {
            move_cursor(&mut model, crate::editor::EditorBuffer::move_word_right);
        }
        Message::EditorMoveToStart => {
            move_cursor(&mut model, crate::editor::EditorBuffer::move_to_start);
        }
        Message::EditorMoveToEnd => {
            move_cursor(&mut model, crate::editor::EditorBuffer::move_to_end);
        }
        Message::EditorPageUp => {
            let page = model.pane_height().max(1);
            move_cursor(&mut model, |buf| {
                for _ in 0..page {
                    buf.move_cursor(Direction::Up);
                }
            });
        }
        Message::EditorPageDown => {
            let page = model.pane_height().max(1);
            move_cursor(&mut model, |buf| {
                for _ in 0..page {
                    buf.move_cursor(Direction::Down);
                }
            });
        }
        Message::EditorScrollUp(n) => {
            model.editor_scroll = model.editor_scroll.saturating_sub(n);
            model.sync_preview_scroll();
        }
        Message::EditorScrollDown(n) => {
            model.editor_scroll = (model.editor_scroll + n).min(model.max_editor_scroll());
            model.sync_preview_scroll();
        }
        Message::EditorClick(line, col) => {
            model.focus = Focus::Editor;
            model.editor.move_to(line, col);
            model.ensure_cursor_visible();
            model.sync_preview_scroll();
        }
        Message::PreviewScrollUp(n) => {
            model.cancel_smooth_scroll();
            model.preview_scroll = model.preview_scroll.saturating_sub(n);
        }
        Message::PreviewScrollDown(n) => {
            model.cancel_smooth_scroll();
            model.preview_scroll = (model.preview_scroll + n).min(model.max_preview_scroll());
        }

        Message::FocusNext => model.focus = model.focus.next(),
        Message::FocusPrev => model.focus = model.focus.prev(),
        Message::Focus(focus) => model.focus = focus,
        Message::FieldInput(c) => {
            if let Some(field) = focused_field(&mut model) {
                field.push(c);
            }
        }
        Message::FieldInsertText(text) => {
            let line = text.lines().next().unwrap_or_default().to_string();
            if let Some(field) = focused_field(&mut model) {
                field.push_str(&line);
            }
        }
        Message::FieldBackspace => {
            if let Some(field) = focused_field(&mut model) {
                field.pop();
            }
        }
        Message::CycleStatus => model.session.status = model.session.status.cycle(),

        Message::ResizeStart(x) => {
            model.layout.begin_drag(x);
        }
        Message::ResizeDrag(x) => {
            model.layout.drag_to(x);
            model.reflow_preview();
        }
        Message::ResizeEnd => {
            model.layout.end_drag();
            model.reflow_preview();
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.layout.resize(width);
            model.editor_scroll = model.editor_scroll.min(model.max_editor_scroll());
            model.ensure_cursor_visible();
            model.reflow_preview();
            model.preview_scroll = model.preview_scroll.min(model.max_preview_scroll());
        }

        Message::SaveDraft => start_save(&mut model),
        Message::Publish => start_publish(&mut model),
        Message::ShowHistory => {
            model.overlay = Some(Overlay::History);
            start_history(&mut model);
        }
        Message::RefreshHistory => start_history(&mut model),
        Message::HistoryUp => {
            model.history_selected = model.history_selected.saturating_sub(1);
        }
        Message::HistoryDown => {
            let last = model.history_len().saturating_sub(1);
            model.history_selected = (model.history_selected + 1).min(last);
        }
        Message::HistoryEdit => {
            if let Some(id) = model.selected_history_entry().map(|e| e.id.clone()) {
                start_load(&mut model, id, false);
            }
        }
        Message::HistoryPublish => {
            let target = model
                .selected_history_entry()
                .filter(|e| e.has_action(HistoryAction::Publish))
                .map(|e| e.id.clone());
            if let Some(id) = target {
                start_load(&mut model, id, true);
            }
        }
        // Opening the browser is a side effect; nothing changes here.
        Message::HistoryView => {}
        Message::HistoryDelete => request_delete(&mut model),
        Message::RefreshApiStatus => start_status(&mut model),

        Message::ShowExportMenu => model.overlay = Some(Overlay::Export),
        Message::Export(format) => {
            model.overlay = None;
            let job = Job::Export {
                dir: model.export_dir.clone(),
                title: model.session.title.trim().to_string(),
                content: model.editor.text(),
                format,
            };
            model.enqueue(job);
        }

        Message::ToggleHelp => {
            model.overlay = if model.overlay == Some(Overlay::Help) {
                None
            } else {
                Some(Overlay::Help)
            };
        }
        Message::CloseOverlay => {
            model.overlay = None;
            model.prompt.clear();
            if model.screen == Screen::Editor {
                model.focus = Focus::Editor;
            }
        }
        Message::Quit => {
            if model.is_dirty() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes. Press Ctrl+Q again to quit",
                );
            } else {
                model.should_quit = true;
            }
        }
        Message::Tick(now) => {
            if model.advance_clock(now) {
                start_initial_draft(&mut model);
            }
        }
        Message::Completed(completion) => apply_completion(&mut model, completion),
    }
    model
}

fn edit(model: &mut Model, f: impl FnOnce(&mut crate::editor::EditorBuffer)) {
    model.focus = Focus::Editor;
    f(&mut model.editor);
    model.ensure_cursor_visible();
    model.refresh_preview();
}

fn move_cursor(model: &mut Model, f: impl FnOnce(&mut crate::editor::EditorBuffer)) {
    f(&mut model.editor);
    model.ensure_cursor_visible();
    model.sync_preview_scroll();
}

fn focused_field(model: &mut Model) -> Option<&mut String> {
    match model.focus {
        Focus::Title => Some(&mut model.session.title),
        Focus::Tags => Some(&mut model.session.tags),
        Focus::Editor | Focus::Status => None,
    }
}

/// Validate a dropped or typed path and hand it to the worker.
fn request_file(model: &mut Model, raw: &str) {
    let Some(path) = normalize_dropped_path(raw) else {
        return;
    };
    if let Err(err) = check_markdown_path(&path) {
        model.show_toast(ToastLevel::Error, err.to_string());
        return;
    }
    model.enqueue(Job::ReadFile(path));
}

/// Load a file's text into a fresh session.
fn ingest(model: &mut Model, path: &std::path::Path, content: &str) {
    info!(path = %path.display(), bytes = content.len(), "file ingested");
    model.session.begin_ingest(extract_title(content));
    model.editor.replace_all(content);
    model.editor_scroll = 0;
    model.preview_scroll = 0;
    model.cancel_smooth_scroll();
    model.is_loading_file = true;
    model.refresh_preview();
    model.screen = Screen::Editor;
    model.focus = Focus::Editor;
    model.overlay = None;
    model.schedule_settle();
    model.show_toast(ToastLevel::Success, "File loaded successfully!");
}

fn start_initial_draft(model: &mut Model) {
    let form = model.session.initial_draft_form(&model.editor.text());
    if let Err(err) = model.in_flight.begin_mutation(Mutation::CreateDraft) {
        warn!("initial draft skipped: {err}");
        model.show_toast(ToastLevel::Warning, err.to_string());
        return;
    }
    let epoch = model.session.epoch();
    model.enqueue(Job::CreateDraft { epoch, form });
}

fn start_save(model: &mut Model) {
    let form = match model.session.draft_form(&model.editor.text()) {
        Ok(form) => form,
        Err(err) => {
            model.show_toast(ToastLevel::Error, err.to_string());
            return;
        }
    };
    if let Err(err) = model.in_flight.begin_mutation(Mutation::SaveDraft) {
        model.show_toast(ToastLevel::Warning, err.to_string());
        return;
    }
    let epoch = model.session.epoch();
    model.enqueue(Job::SaveDraft { epoch, form });
}

fn start_publish(model: &mut Model) {
    let form = match model.session.publish_form(&model.editor.text()) {
        Ok(form) => form,
        Err(err) => {
            model.show_toast(ToastLevel::Error, err.to_string());
            return;
        }
    };
    if let Err(err) = model.in_flight.begin_mutation(Mutation::Publish) {
        model.show_toast(ToastLevel::Warning, err.to_string());
        return;
    }
    let epoch = model.session.epoch();
    model.enqueue(Job::Publish { epoch, form });
}

fn start_history(model: &mut Model) {
    if !model.in_flight.begin(Slot::History) {
        return;
    }
    model.history = HistoryView::Loading;
    model.enqueue(Job::History);
}

fn start_load(model: &mut Model, id: ArticleId, then_publish: bool) {
    if !model.in_flight.begin(Slot::Load) {
        model.show_toast(ToastLevel::Warning, "Still loading the previous article");
        return;
    }
    let epoch = model.session.epoch();
    model.enqueue(Job::LoadArticle {
        epoch,
        id,
        then_publish,
    });
}

fn start_status(model: &mut Model) {
    if model.in_flight.begin(Slot::Status) {
        model.enqueue(Job::ApiStatus);
    }
}

/// Delete asks for a second press on the same entry before going ahead.
fn request_delete(model: &mut Model) {
    let Some((id, title)) = model
        .selected_history_entry()
        .map(|e| (e.id.clone(), e.title.clone()))
    else {
        return;
    };
    if model.pending_delete.as_ref() != Some(&id) {
        model.show_toast(
            ToastLevel::Warning,
            format!("Press d again to delete \"{title}\""),
        );
        model.pending_delete = Some(id);
        return;
    }
    model.pending_delete = None;
    if model.in_flight.begin(Slot::Delete) {
        model.enqueue(Job::Delete(id));
    }
}

/// Whether a reply belongs to the open session; stale ones are dropped.
fn is_current(model: &Model, epoch: u64, what: &str) -> bool {
    let current = model.session.is_current(epoch);
    if !current {
        debug!(
            epoch,
            current = model.session.epoch(),
            "dropping stale {what} reply"
        );
    }
    current
}

fn apply_completion(model: &mut Model, completion: Completion) {
    match completion {
        Completion::FileRead { path, result } => match result {
            Ok(content) => ingest(model, &path, &content),
            Err(err) => {
                warn!(path = %path.display(), "file read failed: {err}");
                model.show_toast(ToastLevel::Error, err.to_string());
            }
        },
        Completion::DraftCreated {
            epoch,
            content,
            result,
        } => {
            model.in_flight.finish(Slot::Mutation);
            if !is_current(model, epoch, "create-draft") {
                return;
            }
            match result {
                Ok(reply) => {
                    model.session.apply_saved(reply.article_id, content);
                    model.show_toast(ToastLevel::Success, "Draft created automatically");
                }
                Err(err) => {
                    warn!("initial draft failed: {err}");
                    model.show_toast(
                        ToastLevel::Warning,
                        err.notification("Failed to save draft", "Error saving draft"),
                    );
                }
            }
        }
        Completion::DraftSaved {
            epoch,
            content,
            result,
        } => {
            model.in_flight.finish(Slot::Mutation);
            if !is_current(model, epoch, "save-draft") {
                return;
            }
            match result {
                Ok(reply) => {
                    let message = if model.session.article_id().is_some() {
                        "Draft updated successfully"
                    } else {
                        "Draft saved successfully"
                    };
                    model.session.apply_saved(reply.article_id, content);
                    model.show_toast(ToastLevel::Success, message);
                }
                Err(err) => {
                    warn!("save draft failed: {err}");
                    model.show_toast(
                        ToastLevel::Error,
                        err.notification("Failed to save draft", "Error saving draft"),
                    );
                }
            }
        }
        Completion::Published { epoch, result } => {
            model.in_flight.finish(Slot::Mutation);
            if !is_current(model, epoch, "publish") {
                return;
            }
            match result {
                Ok(reply) => {
                    info!(url = ?reply.url(), "article published");
                    model.session.apply_published();
                    model.editor.replace_all("");
                    model.editor_scroll = 0;
                    model.preview_scroll = 0;
                    model.cancel_smooth_scroll();
                    model.refresh_preview();
                    let message = reply.url().map_or_else(
                        || "Article published successfully!".to_string(),
                        |url| format!("Article published successfully! {url}"),
                    );
                    model.show_toast(ToastLevel::Success, message);
                }
                Err(err) => {
                    warn!("publish failed: {err}");
                    model.show_toast(
                        ToastLevel::Error,
                        err.notification("Failed to publish article", "Error publishing article"),
                    );
                }
            }
        }
        Completion::History(result) => {
            model.in_flight.finish(Slot::History);
            model.history = match result {
                Ok(articles) => {
                    let entries: Vec<_> = articles.iter().map(HistoryEntry::from_article).collect();
                    model.history_selected =
                        model.history_selected.min(entries.len().saturating_sub(1));
                    HistoryView::Loaded(entries)
                }
                Err(err) => {
                    warn!("history failed: {err}");
                    HistoryView::Failed(format!("Failed to load history: {err}"))
                }
            };
        }
        Completion::ArticleLoaded {
            epoch,
            id,
            then_publish,
            result,
        } => {
            model.in_flight.finish(Slot::Load);
            if !is_current(model, epoch, "load-article") {
                return;
            }
            match result {
                Ok(article) => {
                    model.session.apply_loaded(id, &article);
                    model.editor.replace_all(&article.content);
                    model.editor_scroll = 0;
                    model.preview_scroll = 0;
                    model.cancel_smooth_scroll();
                    model.screen = Screen::Editor;
                    model.focus = Focus::Editor;
                    model.overlay = None;
                    model.refresh_preview();
                    if then_publish {
                        start_publish(model);
                    } else {
                        model.show_toast(ToastLevel::Success, "Article loaded successfully");
                    }
                }
                Err(err) => {
                    warn!(id = %id, "load article failed: {err}");
                    let fallback = if then_publish {
                        "Failed to load article for publishing"
                    } else {
                        "Failed to load article"
                    };
                    model.show_toast(
                        ToastLevel::Error,
                        err.notification(fallback, "Error loading article"),
                    );
                }
            }
        }
        Completion::Deleted { id, result } => {
            model.in_flight.finish(Slot::Delete);
            match result {
                Ok(()) => {
                    model.session.forget_article(&id);
                    model.show_toast(ToastLevel::Success, "Article removed from history");
                    start_history(model);
                }
                Err(err) => {
                    warn!(id = %id, "delete failed: {err}");
                    model.show_toast(
                        ToastLevel::Error,
                        err.notification("Failed to delete article", "Error deleting article"),
                    );
                }
            }
        }
        Completion::ApiStatus(result) => {
            model.in_flight.finish(Slot::Status);
            model.api_status = Some(result.unwrap_or_else(|err: ApiError| ApiStatus {
                status: ApiHealth::Error,
                message: err.to_string(),
            }));
        }
        Completion::Exported(result) => match result {
            Ok(path) => model.show_toast(
                ToastLevel::Success,
                format!("Exported to {}", path.display()),
            ),
            Err(message) => model.show_toast(ToastLevel::Error, message),
        },
    }
}
