use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tempfile::tempdir;

use crate::api::{
    ApiError, ApiHealth, ApiStatus, ArticleApi, ArticleForm, PublishResponse, SaveDraftResponse,
};
use crate::article::{Article, ArticleId, LoadedArticle, PublishStatus};
use crate::session::{Lifecycle, Slot};
use crate::worker::{Completion, Job, execute};

use super::event_loop::ResizeDebouncer;
use super::{App, Focus, HistoryView, Message, Model, Overlay, Screen, ToastLevel, update};

/// In-memory backend recording what the client sent.
#[derive(Default)]
struct FakeApi {
    saves: RefCell<Vec<ArticleForm>>,
    publishes: RefCell<Vec<ArticleForm>>,
    deletes: RefCell<Vec<ArticleId>>,
    articles: Vec<Article>,
    loaded: LoadedArticle,
    fail_publish: bool,
}

impl ArticleApi for FakeApi {
    fn save_draft(&self, form: &ArticleForm) -> Result<SaveDraftResponse, ApiError> {
        self.saves.borrow_mut().push(form.clone());
        let id = form
            .article_id
            .clone()
            .unwrap_or_else(|| ArticleId::new("7"));
        Ok(SaveDraftResponse {
            success: true,
            message: None,
            article_id: id,
        })
    }

    fn publish(&self, form: &ArticleForm) -> Result<PublishResponse, ApiError> {
        self.publishes.borrow_mut().push(form.clone());
        if self.fail_publish {
            return Err(ApiError::Server {
                status: 502,
                detail: Some("Platform rejected the post".to_string()),
            });
        }
        Ok(PublishResponse {
            success: true,
            response: serde_json::json!({"data": {"url": "https://blog.example/p/1"}}),
        })
    }

    fn history(&self) -> Result<Vec<Article>, ApiError> {
        Ok(self.articles.clone())
    }

    fn article(&self, _id: &ArticleId) -> Result<LoadedArticle, ApiError> {
        Ok(self.loaded.clone())
    }

    fn delete(&self, id: &ArticleId) -> Result<(), ApiError> {
        self.deletes.borrow_mut().push(id.clone());
        Ok(())
    }

    fn status(&self) -> Result<ApiStatus, ApiError> {
        Err(ApiError::Transport("connection refused".to_string()))
    }
}

fn article(id: &str, title: &str, url: Option<&str>) -> Article {
    Article {
        id: ArticleId::new(id),
        title: title.to_string(),
        content: "Body".to_string(),
        tags: Vec::new(),
        publish_status: PublishStatus::Draft,
        word_count: Some(1),
        created_at: None,
        updated_at: None,
        published_at: None,
        external_url: url.map(str::to_string),
    }
}

/// Run queued jobs (and any they trigger) the way the worker would.
fn run_jobs(mut model: Model, api: &FakeApi) -> Model {
    loop {
        let jobs = model.take_jobs();
        if jobs.is_empty() {
            return model;
        }
        for job in jobs {
            model = update(model, Message::Completed(execute(api, job)));
        }
    }
}

fn read_completion(text: &str) -> Message {
    Message::Completed(Completion::FileRead {
        path: PathBuf::from("post.md"),
        result: Ok(text.to_string()),
    })
}

/// A model with `text` ingested and its automatic draft saved as id 7.
fn drafted_model(text: &str, api: &FakeApi) -> Model {
    let model = update(Model::new((100, 30), 20), read_completion(text));
    let model = update(model, Message::Tick(200));
    run_jobs(model, api)
}

fn toast(model: &Model) -> Option<(String, ToastLevel)> {
    model
        .active_toast()
        .map(|(message, level)| (message.to_string(), level))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn write_md(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_non_markdown_drop_is_rejected_without_state_change() {
    let model = update(Model::default(), Message::DropPath("notes.txt".to_string()));
    assert_eq!(model.screen, Screen::Upload);
    assert_eq!(model.queued_jobs(), 0);
    assert_eq!(
        toast(&model),
        Some((
            "Please select a markdown (.md) file".to_string(),
            ToastLevel::Error
        ))
    );
}

#[test]
fn test_drop_reads_file_and_extracts_title() {
    let dir = tempdir().unwrap();
    let path = write_md(dir.path(), "post.md", "intro\n# My Post \nbody\n");
    let model = update(
        Model::default(),
        Message::DropPath(format!("'{}'", path.display())),
    );
    assert_eq!(model.queued_jobs(), 1);

    let api = FakeApi::default();
    let model = run_jobs(model, &api);
    assert_eq!(model.screen, Screen::Editor);
    assert_eq!(model.session.title, "My Post");
    assert_eq!(model.editor.text(), "intro\n# My Post \nbody\n");
    assert!(model.is_loading_file);
    assert_eq!(
        toast(&model),
        Some(("File loaded successfully!".to_string(), ToastLevel::Success))
    );
}

#[test]
fn test_file_without_title_keeps_existing_title() {
    let mut model = Model::default();
    model.session.title = "Kept".to_string();
    let model = update(model, read_completion("no heading here\n"));
    assert_eq!(model.session.title, "Kept");
}

#[test]
fn test_settle_creates_initial_draft() {
    let api = FakeApi::default();
    let model = update(Model::new((100, 30), 20), read_completion("# T\n\nbody"));
    assert_eq!(model.queued_jobs(), 0);

    let model = update(model, Message::Tick(50));
    assert_eq!(model.queued_jobs(), 0);

    let model = update(model, Message::Tick(200));
    assert!(!model.is_loading_file);
    assert_eq!(model.queued_jobs(), 1);

    let model = run_jobs(model, &api);
    let saves = api.saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].content, "# T\n\nbody");
    assert!(saves[0].article_id.is_none());
    assert_eq!(model.session.lifecycle(), Lifecycle::Draft);
    assert_eq!(model.session.article_id(), Some(&ArticleId::new("7")));
    assert!(!model.is_dirty());
}

#[test]
fn test_save_sends_known_id_and_trimmed_content() {
    let api = FakeApi::default();
    let model = drafted_model("# T\n\nbody", &api);
    let model = update(model, Message::EditorMoveToEnd);
    let model = update(model, Message::EditorInsertText("  \n".to_string()));
    assert!(model.is_dirty());

    let model = update(model, Message::SaveDraft);
    let model = run_jobs(model, &api);
    let saves = api.saves.borrow();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[1].article_id, Some(ArticleId::new("7")));
    assert_eq!(saves[1].content, "# T\n\nbody");
    assert_eq!(
        toast(&model),
        Some(("Draft updated successfully".to_string(), ToastLevel::Success))
    );
}

#[test]
fn test_save_rejects_blank_content() {
    let mut model = update(Model::default(), read_completion("   \n"));
    model.session.title = "T".to_string();
    let model = update(model, Message::SaveDraft);
    assert_eq!(model.queued_jobs(), 0);
    assert_eq!(
        toast(&model),
        Some((
            "Please enter some content to save as draft".to_string(),
            ToastLevel::Error
        ))
    );
}

#[test]
fn test_publish_requires_title_before_content() {
    let model = update(Model::default(), read_completion(""));
    let model = update(model, Message::Publish);
    assert_eq!(model.queued_jobs(), 0);
    assert_eq!(
        toast(&model).map(|(m, _)| m),
        Some("Please enter an article title".to_string())
    );
}

#[test]
fn test_publish_success_clears_session_and_editor() {
    let api = FakeApi::default();
    let model = drafted_model("# Ship It\n\nbody", &api);
    let epoch = model.session.epoch();

    let model = update(model, Message::Publish);
    assert_eq!(model.in_flight.mutation(), Some(crate::session::Mutation::Publish));
    let model = run_jobs(model, &api);

    assert_eq!(api.publishes.borrow()[0].article_id, Some(ArticleId::new("7")));
    assert!(model.session.article_id().is_none());
    assert!(model.session.title.is_empty());
    assert!(model.editor.is_blank());
    assert!(model.session.epoch() > epoch);
    assert!(!model.in_flight.is_busy(Slot::Mutation));
    assert_eq!(
        toast(&model).map(|(m, _)| m),
        Some("Article published successfully! https://blog.example/p/1".to_string())
    );
}

#[test]
fn test_publish_failure_keeps_session() {
    let api = FakeApi {
        fail_publish: true,
        ..FakeApi::default()
    };
    let model = drafted_model("# T\n\nbody", &api);
    let model = run_jobs(update(model, Message::Publish), &api);
    assert_eq!(model.session.article_id(), Some(&ArticleId::new("7")));
    assert_eq!(
        toast(&model),
        Some(("Platform rejected the post".to_string(), ToastLevel::Error))
    );
}

#[test]
fn test_second_mutation_is_refused_while_busy() {
    let api = FakeApi::default();
    let model = drafted_model("# T\n\nbody", &api);
    let model = update(model, Message::SaveDraft);
    let model = update(model, Message::Publish);
    assert_eq!(model.queued_jobs(), 1);
    assert_eq!(
        toast(&model),
        Some((
            "Another save or publish is still in progress".to_string(),
            ToastLevel::Warning
        ))
    );
}

#[test]
fn test_stale_save_reply_is_dropped() {
    let api = FakeApi::default();
    let mut model = drafted_model("# Old\n\nbody", &api);
    model = update(model, Message::SaveDraft);
    let stale = model.take_jobs();

    // A new file starts a new session before the old save returns.
    model = update(model, read_completion("# New\n\nfresh"));
    for job in stale {
        model = update(model, Message::Completed(execute(&api, job)));
    }
    assert!(model.session.article_id().is_none());
    assert_eq!(model.session.lifecycle(), Lifecycle::Unsaved);
    assert!(!model.in_flight.is_busy(Slot::Mutation));
    assert_eq!(model.session.title, "New");
}

#[test]
fn test_history_lists_entries_and_clamps_selection() {
    let api = FakeApi {
        articles: vec![
            article("1", "One", None),
            article("2", "Two", Some("https://blog.example/two")),
        ],
        ..FakeApi::default()
    };
    let model = update(Model::default(), Message::ShowHistory);
    assert_eq!(model.overlay, Some(Overlay::History));
    assert_eq!(model.history, HistoryView::Loading);

    let model = run_jobs(model, &api);
    assert_eq!(model.history_len(), 2);
    let model = update(model, Message::HistoryDown);
    let model = update(model, Message::HistoryDown);
    assert_eq!(model.history_selected, 1);
    assert_eq!(
        model.selected_history_entry().map(|e| e.title.as_str()),
        Some("Two")
    );
}

#[test]
fn test_history_edit_loads_article() {
    let api = FakeApi {
        articles: vec![article("3", "Loaded", None)],
        loaded: LoadedArticle {
            title: "Loaded".to_string(),
            content: "stored body".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            publish_status: PublishStatus::Draft,
            external_url: None,
        },
        ..FakeApi::default()
    };
    let model = run_jobs(update(Model::default(), Message::ShowHistory), &api);
    let model = run_jobs(update(model, Message::HistoryEdit), &api);
    assert_eq!(model.screen, Screen::Editor);
    assert_eq!(model.overlay, None);
    assert_eq!(model.editor.text(), "stored body");
    assert_eq!(model.session.tags, "a, b");
    assert_eq!(model.session.article_id(), Some(&ArticleId::new("3")));
    assert!(!model.is_dirty());
}

#[test]
fn test_history_publish_loads_then_publishes() {
    let api = FakeApi {
        articles: vec![article("4", "Later", None)],
        loaded: LoadedArticle {
            title: "Later".to_string(),
            content: "ready".to_string(),
            ..LoadedArticle::default()
        },
        ..FakeApi::default()
    };
    let model = run_jobs(update(Model::default(), Message::ShowHistory), &api);
    let _model = run_jobs(update(model, Message::HistoryPublish), &api);
    let publishes = api.publishes.borrow();
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].article_id, Some(ArticleId::new("4")));
}

#[test]
fn test_public_status_draft_can_still_be_published() {
    let mut stored = article("5", "Selector", None);
    stored.publish_status = PublishStatus::Public;
    let api = FakeApi {
        articles: vec![stored],
        loaded: LoadedArticle {
            title: "Selector".to_string(),
            content: "saved with public selected".to_string(),
            publish_status: PublishStatus::Public,
            ..LoadedArticle::default()
        },
        ..FakeApi::default()
    };
    let model = run_jobs(update(Model::default(), Message::ShowHistory), &api);
    assert!(
        model
            .selected_history_entry()
            .is_some_and(|entry| !entry.is_published())
    );

    let model = run_jobs(update(model, Message::HistoryPublish), &api);
    let publishes = api.publishes.borrow();
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].publish_status, PublishStatus::Public);
    assert_eq!(publishes[0].article_id, Some(ArticleId::new("5")));
    assert_ne!(
        toast(&model).map(|(message, _)| message),
        Some("This article is already published".to_string())
    );
}

#[test]
fn test_loaded_public_draft_accepts_saves() {
    let api = FakeApi {
        articles: vec![article("6", "Open", None)],
        loaded: LoadedArticle {
            title: "Open".to_string(),
            content: "body".to_string(),
            publish_status: PublishStatus::Unlisted,
            ..LoadedArticle::default()
        },
        ..FakeApi::default()
    };
    let model = run_jobs(update(Model::default(), Message::ShowHistory), &api);
    let model = run_jobs(update(model, Message::HistoryEdit), &api);
    assert_eq!(model.session.lifecycle(), Lifecycle::Draft);

    let _model = run_jobs(update(model, Message::SaveDraft), &api);
    let saves = api.saves.borrow();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].article_id, Some(ArticleId::new("6")));
}

#[test]
fn test_deleting_open_article_clears_its_id() {
    let mut api = FakeApi::default();
    let model = drafted_model("# T\n\nbody", &api);
    api.articles = vec![article("7", "T", None)];

    let model = run_jobs(update(model, Message::ShowHistory), &api);
    let model = update(model, Message::HistoryDelete);
    assert_eq!(model.queued_jobs(), 0);
    assert_eq!(model.pending_delete, Some(ArticleId::new("7")));

    let model = update(model, Message::HistoryDelete);
    let model = run_jobs(model, &api);
    assert_eq!(*api.deletes.borrow(), vec![ArticleId::new("7")]);
    assert!(model.session.article_id().is_none());
    assert_eq!(model.session.lifecycle(), Lifecycle::Unsaved);
    assert_eq!(model.session.title, "T");
}

#[test]
fn test_delete_confirmation_is_cancelled_by_other_input() {
    let api = FakeApi {
        articles: vec![article("9", "Keep", None)],
        ..FakeApi::default()
    };
    let model = run_jobs(update(Model::default(), Message::ShowHistory), &api);
    let model = update(model, Message::HistoryDelete);
    let model = update(model, Message::HistoryDown);
    let model = update(model, Message::HistoryDelete);
    assert_eq!(model.queued_jobs(), 0);
    assert!(api.deletes.borrow().is_empty());
}

#[test]
fn test_api_status_error_is_recorded() {
    let api = FakeApi::default();
    let model = run_jobs(update(Model::default(), Message::RefreshApiStatus), &api);
    let status = model.api_status.unwrap();
    assert_eq!(status.status, ApiHealth::Error);
    assert_eq!(status.message, "connection refused");
}

#[test]
fn test_quit_with_unsaved_changes_needs_second_press() {
    let model = update(Model::default(), read_completion("# T\n\nbody"));
    assert!(model.is_dirty());

    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
    assert_eq!(
        toast(&model).map(|(_, level)| level),
        Some(ToastLevel::Warning)
    );

    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_confirmation_resets_after_other_input() {
    let model = update(Model::default(), read_completion("# T\n\nbody"));
    let model = update(model, Message::Quit);
    let model = update(model, Message::EditorMoveEnd);
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
}

#[test]
fn test_clean_quit_is_immediate() {
    let model = update(Model::default(), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_typing_updates_preview_and_marks_dirty() {
    let api = FakeApi::default();
    let model = drafted_model("body", &api);
    let model = update(model, Message::EditorMoveToStart);
    let model = update(model, Message::EditorInsertText("# Head\n".to_string()));
    assert!(model.is_dirty());
    assert!(model.preview.lines().iter().any(|l| l.text().contains("Head")));
}

#[test]
fn test_field_input_goes_to_focused_field() {
    let model = update(Model::default(), read_completion("text"));
    let model = update(model, Message::Focus(Focus::Tags));
    let model = update(model, Message::FieldInsertText("rust, tui\nignored".to_string()));
    assert_eq!(model.session.tags, "rust, tui");
    let model = update(model, Message::FocusNext);
    assert_eq!(model.focus, Focus::Status);
    let model = update(model, Message::CycleStatus);
    assert_eq!(model.session.status, PublishStatus::Public);
}

#[test]
fn test_resize_drag_moves_split() {
    let model = Model::new((100, 30), 20);
    let handle = model.layout.split().editor;
    let model = update(model, Message::ResizeStart(handle));
    assert!(model.layout.is_resizing());
    let model = update(model, Message::ResizeDrag(handle + 10));
    assert_eq!(model.layout.split().editor, handle + 10);
    let model = update(model, Message::ResizeEnd);
    assert!(!model.layout.is_resizing());
    assert_eq!(model.preview.width(), model.preview_width());
}

#[test]
fn test_resize_drag_respects_min_width() {
    let model = Model::new((100, 30), 20);
    let handle = model.layout.split().editor;
    let model = update(model, Message::ResizeStart(handle));
    let model = update(model, Message::ResizeDrag(0));
    assert_eq!(model.layout.split().editor, 20);
}

#[test]
fn test_export_job_uses_session_title() {
    let mut model = update(Model::default(), read_completion("# Notes\n\nbody"));
    model = update(model, Message::ShowExportMenu);
    model = update(model, Message::Export(crate::export::ExportFormat::Text));
    assert_eq!(model.overlay, None);
    match model.take_jobs().as_slice() {
        [Job::Export { title, .. }] => assert_eq!(title, "Notes"),
        other => panic!("unexpected jobs: {other:?}"),
    }
}

#[test]
fn test_export_writes_into_directory() {
    let dir = tempdir().unwrap();
    let api = FakeApi::default();
    let model = update(Model::default(), read_completion("# Notes\n\n**body**"))
        .with_export_dir(dir.path().to_path_buf());
    let model = run_jobs(update(model, Message::Export(crate::export::ExportFormat::Markdown)), &api);
    let (message, level) = toast(&model).unwrap();
    assert_eq!(level, ToastLevel::Success);
    assert!(message.starts_with("Exported to"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_key_mapping_on_upload_screen() {
    let model = Model::default();
    assert_eq!(App::handle_key(key(KeyCode::Enter), &model), Some(Message::OpenPrompt));
    assert_eq!(App::handle_key(key(KeyCode::Char('q')), &model), Some(Message::Quit));
    assert_eq!(App::handle_key(ctrl('l'), &model), Some(Message::ShowHistory));
    assert_eq!(App::handle_key(ctrl('s'), &model), None);
}

#[test]
fn test_key_mapping_on_editor_screen() {
    let model = update(Model::default(), read_completion("text"));
    assert_eq!(App::handle_key(ctrl('s'), &model), Some(Message::SaveDraft));
    assert_eq!(App::handle_key(ctrl('p'), &model), Some(Message::Publish));
    assert_eq!(App::handle_key(ctrl('e'), &model), Some(Message::ShowExportMenu));
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::EditorInsertChar('q'))
    );
    assert_eq!(App::handle_key(key(KeyCode::Tab), &model), Some(Message::FocusNext));
}

#[test]
fn test_history_overlay_keys() {
    let mut model = Model::default();
    model.overlay = Some(Overlay::History);
    assert_eq!(App::handle_key(key(KeyCode::Char('d')), &model), Some(Message::HistoryDelete));
    assert_eq!(App::handle_key(key(KeyCode::Esc), &model), Some(Message::CloseOverlay));
    assert_eq!(App::handle_key(key(KeyCode::Down), &model), Some(Message::HistoryDown));
}

#[test]
fn test_paste_routes_by_screen_and_focus() {
    let model = Model::default();
    assert_eq!(
        App::handle_paste("/tmp/a.md", &model),
        Some(Message::DropPath("/tmp/a.md".to_string()))
    );

    let model = update(model, read_completion("text"));
    assert_eq!(
        App::handle_paste("a\r\nb", &model),
        Some(Message::EditorInsertText("a\nb".to_string()))
    );
}

#[test]
fn test_mouse_down_on_handle_starts_resize() {
    let model = update(Model::new((100, 30), 20), read_completion("text"));
    let handle = model.layout.split().editor;
    let mouse = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: handle,
        row: 10,
        modifiers: KeyModifiers::NONE,
    };
    assert_eq!(App::handle_mouse(mouse, &model), Some(Message::ResizeStart(handle)));
}

#[test]
fn test_click_in_editor_moves_cursor() {
    let model = update(Model::new((100, 30), 20), read_completion("one\ntwo\nthree"));
    let mouse = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 3,
        row: crate::ui::pane_top() + 1,
        modifiers: KeyModifiers::NONE,
    };
    let msg = App::handle_mouse(mouse, &model).unwrap();
    assert_eq!(msg, Message::EditorClick(1, 2));
    let model = update(model, msg);
    assert_eq!(model.editor.cursor().line, 1);
    assert_eq!(model.editor.cursor().col, 2);
}

#[test]
fn test_resize_event_is_debounced() {
    let model = Model::default();
    let mut debouncer = ResizeDebouncer::new(100);
    assert_eq!(
        App::handle_event(&Event::Resize(120, 40), &model, 0, &mut debouncer),
        None
    );
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(50), None);
    assert_eq!(debouncer.take_ready(100), Some((120, 40)));
    assert!(!debouncer.is_pending());
}

#[test]
fn test_toast_expires_with_clock() {
    let model = update(Model::default(), Message::DropPath("x.txt".to_string()));
    assert!(model.active_toast().is_some());
    let model = update(model, Message::Tick(super::TOAST_MS - 1));
    assert!(model.active_toast().is_some());
    let model = update(model, Message::Tick(super::TOAST_MS));
    assert!(model.active_toast().is_none());
}

#[test]
fn test_scroll_sync_follows_cursor() {
    let mut text = String::new();
    for i in 0..200 {
        text.push_str(&format!("line {i}\n\n"));
    }
    let api = FakeApi::default();
    let model = drafted_model(&text, &api);
    let model = update(model, Message::EditorMoveToEnd);
    assert!(model.is_animating());
    let model = update(model, Message::Tick(10_000));
    assert!(!model.is_animating());
    assert!(model.preview_scroll > 0);
    assert_eq!(model.preview_scroll, model.max_preview_scroll());
}
