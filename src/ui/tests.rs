use super::*;
use crate::app::{HistoryView, Message, Model, Overlay, update};
use crate::article::{Article, ArticleId, HistoryEntry, PublishStatus};
use crate::worker::Completion;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use std::path::PathBuf;

fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).unwrap()
}

fn draw(model: &Model, width: u16, height: u16) -> String {
    let mut terminal = create_test_terminal(width, height);
    terminal.draw(|frame| render(model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer.content().iter().map(|c| c.symbol()).collect()
}

fn loaded_model(text: &str) -> Model {
    let model = Model::new((100, 30), 20);
    update(
        model,
        Message::Completed(Completion::FileRead {
            path: PathBuf::from("post.md"),
            result: Ok(text.to_string()),
        }),
    )
}

fn article(id: &str, title: &str, status: PublishStatus) -> Article {
    Article {
        id: ArticleId::new(id),
        title: title.to_string(),
        content: "Some body text".to_string(),
        tags: vec!["rust".to_string()],
        publish_status: status,
        word_count: Some(3),
        created_at: None,
        updated_at: None,
        published_at: None,
        external_url: None,
    }
}

#[test]
fn test_upload_screen_invites_a_file() {
    let model = Model::new((100, 30), 20);
    let content = draw(&model, 100, 30);
    assert!(content.contains("Drop a markdown (.md) file here"));
    assert!(content.contains("quillpost"));
}

#[test]
fn test_editor_screen_shows_form_and_panes() {
    let model = loaded_model("# Launch Notes\n\nFirst paragraph.\n");
    let content = draw(&model, 100, 30);
    assert!(content.contains("Title"));
    assert!(content.contains("Launch Notes"));
    assert!(content.contains("Markdown"));
    assert!(content.contains("Preview"));
    assert!(content.contains("First paragraph."));
    assert!(content.contains("Status: < draft >"));
}

#[test]
fn test_toast_replaces_status_bar() {
    let model = loaded_model("# T\n\nbody\n");
    let content = draw(&model, 100, 30);
    assert!(content.contains("File loaded successfully!"));
    assert!(!content.contains("F1:help"));
}

#[test]
fn test_status_bar_after_toast_expires() {
    let model = loaded_model("# T\n\nbody\n");
    let model = update(model, Message::Tick(crate::app::TOAST_MS + 10));
    let content = draw(&model, 100, 30);
    assert!(content.contains("Ln 1, Col 1"));
    assert!(content.contains("F1:help"));
}

#[test]
fn test_divider_is_drawn_between_panes() {
    let model = loaded_model("text\n");
    let split = model.layout.split();
    let mut terminal = create_test_terminal(100, 30);
    terminal.draw(|frame| render(&model, frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let cell = &buffer[(split.editor, pane_top())];
    assert_eq!(cell.symbol(), "\u{2502}");
}

#[test]
fn test_help_overlay_lists_shortcuts() {
    let mut model = Model::new((100, 30), 20);
    model.overlay = Some(Overlay::Help);
    let content = draw(&model, 100, 30);
    assert!(content.contains("Save draft"));
    assert!(content.contains("Publish"));
}

#[test]
fn test_history_overlay_states() {
    let mut model = Model::new((100, 30), 20);
    model.overlay = Some(Overlay::History);
    assert!(draw(&model, 100, 30).contains("Loading history"));

    model.history = HistoryView::Loaded(Vec::new());
    assert!(draw(&model, 100, 30).contains("No articles or drafts yet."));

    model.history = HistoryView::Failed("Failed to load history: boom".to_string());
    assert!(draw(&model, 100, 30).contains("Failed to load history: boom"));
}

#[test]
fn test_history_overlay_shows_entries() {
    let mut model = Model::new((100, 30), 20);
    model.overlay = Some(Overlay::History);
    model.history = HistoryView::Loaded(vec![
        HistoryEntry::from_article(&article("1", "First Draft", PublishStatus::Draft)),
        HistoryEntry::from_article(&article("2", "Shipped", PublishStatus::Public)),
    ]);
    let content = draw(&model, 100, 30);
    assert!(content.contains("First Draft"));
    assert!(content.contains("[draft]"));
    assert!(content.contains("Shipped"));
    assert!(content.contains("#rust"));
}

#[test]
fn test_prompt_overlay_shows_typed_path() {
    let mut model = Model::new((100, 30), 20);
    model.overlay = Some(Overlay::OpenPrompt);
    model.prompt = "notes/today.md".to_string();
    let content = draw(&model, 100, 30);
    assert!(content.contains("notes/today.md"));
}

#[test]
fn test_tiny_terminal_does_not_panic() {
    let model = loaded_model("# T\n\nbody\n");
    let _ = draw(&model, 10, 2);
    let _ = draw(&model, 30, 6);
}

#[test]
fn test_pane_geometry() {
    assert_eq!(pane_top(), 4);
    assert_eq!(pane_body_height(24), 19);
    assert_eq!(pane_text_width(0), 1);
    assert_eq!(main_area(80, 24), Rect::new(0, 3, 80, 20));
}
