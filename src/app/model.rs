use std::path::PathBuf;

use tracing::debug;

use crate::api::ApiStatus;
use crate::article::{ArticleId, HistoryEntry};
use crate::config::DEFAULT_EXPORT_DIR;
use crate::editor::EditorBuffer;
use crate::ingest::SETTLE_DELAY;
use crate::layout::{DEFAULT_MIN_WIDTH, PaneLayout};
use crate::preview::{Preview, render_lines};
use crate::scroll::{
    SYNC_DELAY_MS, SmoothScroll, exceeds_threshold, preview_target, scroll_ratio,
};
use crate::session::{EditorSession, InFlight};
use crate::worker::Job;

/// How long a toast stays on screen.
pub const TOAST_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_ms: u64,
}

/// Which top-level screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for a markdown file.
    #[default]
    Upload,
    Editor,
}

/// Which input receives typed keys on the editor screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Editor,
    Title,
    Tags,
    Status,
}

impl Focus {
    const ORDER: [Self; 4] = [Self::Editor, Self::Title, Self::Tags, Self::Status];

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Modal layers drawn over the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    History,
    Export,
    /// Typing a path to open.
    OpenPrompt,
}

/// Contents of the history overlay.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HistoryView {
    #[default]
    Loading,
    Failed(String),
    Loaded(Vec<HistoryEntry>),
}

/// The complete application state.
///
/// All state lives here. Time comes in through `clock_ms` so timers stay
/// deterministic under test.
pub struct Model {
    pub screen: Screen,
    pub focus: Focus,
    pub overlay: Option<Overlay>,
    /// Markdown source being edited
    pub editor: EditorBuffer,
    /// First visible editor line
    pub editor_scroll: usize,
    pub session: EditorSession,
    pub in_flight: InFlight,
    pub preview: Preview,
    /// First visible preview line
    pub preview_scroll: usize,
    smooth: Option<SmoothScroll>,
    pub layout: PaneLayout,
    pub terminal_size: (u16, u16),
    /// Set between reading a file and its settle delay; suppresses scroll sync.
    pub is_loading_file: bool,
    settle_due: Option<u64>,
    sync_due: Option<u64>,
    /// Milliseconds since the event loop started.
    pub clock_ms: u64,
    toast: Option<Toast>,
    pub history: HistoryView,
    pub history_selected: usize,
    /// Article awaiting a second delete press.
    pub pending_delete: Option<ArticleId>,
    /// Path typed into the open prompt
    pub prompt: String,
    pub api_status: Option<ApiStatus>,
    pub export_dir: PathBuf,
    pub light_theme: bool,
    pub should_quit: bool,
    /// Set after the first quit with unsaved changes; a second quit proceeds.
    pub quit_confirmed: bool,
    outbox: Vec<Job>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("screen", &self.screen)
            .field("focus", &self.focus)
            .field("overlay", &self.overlay)
            .field("lifecycle", &self.session.lifecycle())
            .field("epoch", &self.session.epoch())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model for a terminal of `terminal_size` (columns, rows).
    pub fn new(terminal_size: (u16, u16), min_pane_width: u16) -> Self {
        Self {
            screen: Screen::Upload,
            focus: Focus::Editor,
            overlay: None,
            editor: EditorBuffer::empty(),
            editor_scroll: 0,
            session: EditorSession::new(),
            in_flight: InFlight::default(),
            // Empty until the first ingest.
            preview: Preview::default(),
            preview_scroll: 0,
            smooth: None,
            layout: PaneLayout::new(terminal_size.0, min_pane_width),
            terminal_size,
            is_loading_file: false,
            settle_due: None,
            sync_due: None,
            clock_ms: 0,
            toast: None,
            history: HistoryView::Loading,
            history_selected: 0,
            pending_delete: None,
            prompt: String::new(),
            api_status: None,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            light_theme: false,
            should_quit: false,
            quit_confirmed: false,
            outbox: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    #[must_use]
    pub const fn with_light_theme(mut self, light: bool) -> Self {
        self.light_theme = light;
        self
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_ms: self.clock_ms + TOAST_MS,
        });
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Queue work for the background thread.
    pub(super) fn enqueue(&mut self, job: Job) {
        debug!(?job, "job queued");
        self.outbox.push(job);
    }

    pub fn queued_jobs(&self) -> usize {
        self.outbox.len()
    }

    /// Hand over every queued job, oldest first.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.outbox)
    }

    /// Rows of text visible in either pane.
    pub fn pane_height(&self) -> usize {
        crate::ui::pane_body_height(self.terminal_size.1) as usize
    }

    /// Columns the preview wraps to.
    pub fn preview_width(&self) -> u16 {
        crate::ui::pane_text_width(self.layout.split().preview)
    }

    /// Columns of editor text visible at once.
    pub fn editor_text_width(&self) -> usize {
        crate::ui::pane_text_width(self.layout.split().editor) as usize
    }

    /// Horizontal offset keeping the cursor column on screen.
    pub fn editor_col_offset(&self) -> usize {
        let width = self.editor_text_width().max(1);
        let col = self.editor.cursor().col;
        if col >= width { col + 1 - width } else { 0 }
    }

    pub fn max_editor_scroll(&self) -> usize {
        self.editor.line_count().saturating_sub(self.pane_height())
    }

    pub fn max_preview_scroll(&self) -> usize {
        self.preview.line_count().saturating_sub(self.pane_height())
    }

    /// Re-render the preview from the editor text.
    ///
    /// Unless a file is still settling, a scroll sync follows shortly after.
    pub(super) fn refresh_preview(&mut self) {
        self.preview = render_lines(&self.editor.text(), self.preview_width());
        self.preview_scroll = self.preview_scroll.min(self.max_preview_scroll());
        if !self.is_loading_file {
            self.sync_due = Some(self.clock_ms + SYNC_DELAY_MS);
        }
    }

    /// Re-render only if the preview width changed.
    pub(super) fn reflow_preview(&mut self) {
        if self.preview.width() != self.preview_width() {
            self.refresh_preview();
        }
    }

    /// Scroll the editor so the cursor line is visible.
    pub(super) fn ensure_cursor_visible(&mut self) {
        let height = self.pane_height().max(1);
        let line = self.editor.cursor().line;
        if line < self.editor_scroll {
            self.editor_scroll = line;
        } else if line >= self.editor_scroll + height {
            self.editor_scroll = line + 1 - height;
        }
    }

    /// Move the preview toward the position matching the editor.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(super) fn sync_preview_scroll(&mut self) {
        if self.is_loading_file || self.screen != Screen::Editor {
            return;
        }
        let client = self.pane_height() as f64;
        let ratio = scroll_ratio(
            self.editor.cursor().line,
            self.editor.line_count(),
            self.editor_scroll as f64,
            self.editor.line_count() as f64,
            client,
        );
        let target = preview_target(ratio, self.preview.line_count() as f64, client);
        if exceeds_threshold(target, self.preview_scroll as f64) {
            let to = target.round().max(0.0) as usize;
            self.smooth = Some(SmoothScroll::start(self.preview_scroll, to, self.clock_ms));
        }
    }

    /// Stop any preview animation where it stands.
    pub(super) const fn cancel_smooth_scroll(&mut self) {
        self.smooth = None;
    }

    pub const fn is_animating(&self) -> bool {
        self.smooth.is_some()
    }

    /// Arm the post-ingest settle timer.
    pub(super) fn schedule_settle(&mut self) {
        let delay = u64::try_from(SETTLE_DELAY.as_millis()).unwrap_or(u64::MAX);
        self.settle_due = Some(self.clock_ms + delay);
    }

    /// Advance the clock to `now_ms`, firing due timers.
    ///
    /// Returns true when the post-ingest settle delay elapsed on this tick.
    pub(super) fn advance_clock(&mut self, now_ms: u64) -> bool {
        self.clock_ms = self.clock_ms.max(now_ms);
        let now = self.clock_ms;

        if self.toast.as_ref().is_some_and(|toast| toast.expires_ms <= now) {
            self.toast = None;
        }

        let settled = self.settle_due.is_some_and(|due| due <= now);
        if settled {
            self.settle_due = None;
            self.editor_scroll = 0;
            self.preview_scroll = 0;
            self.smooth = None;
            self.is_loading_file = false;
        }

        if self.sync_due.is_some_and(|due| due <= now) {
            self.sync_due = None;
            self.sync_preview_scroll();
        }

        if let Some(smooth) = self.smooth {
            self.preview_scroll = smooth.position(now).min(self.max_preview_scroll());
            if smooth.is_done(now) {
                self.smooth = None;
            }
        }

        settled
    }

    /// Earliest time a timer needs the clock advanced, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        let animating = self.smooth.map(|_| self.clock_ms + 16);
        [
            self.toast.as_ref().map(|toast| toast.expires_ms),
            self.settle_due,
            self.sync_due,
            animating,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Whether the editor holds text the backend has not seen.
    pub fn is_dirty(&self) -> bool {
        self.screen == Screen::Editor && self.session.is_dirty(&self.editor.text())
    }

    /// The history entry under the selection.
    pub fn selected_history_entry(&self) -> Option<&HistoryEntry> {
        match &self.history {
            HistoryView::Loaded(entries) => entries.get(self.history_selected),
            _ => None,
        }
    }

    pub fn history_len(&self) -> usize {
        match &self.history {
            HistoryView::Loaded(entries) => entries.len(),
            _ => 0,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new((80, 24), DEFAULT_MIN_WIDTH)
    }
}
