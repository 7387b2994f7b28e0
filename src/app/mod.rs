//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! `update` never performs I/O. Requests are queued on the model as
//! [`Job`](crate::worker::Job)s and the event loop hands them to the
//! background worker, feeding replies back in as [`Message::Completed`].

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Focus, HistoryView, Model, Overlay, Screen, TOAST_MS, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::api::ArticleApi;
use crate::config::DEFAULT_EXPORT_DIR;
use crate::layout::DEFAULT_MIN_WIDTH;

/// Main application struct that owns the backend client until the loop starts.
pub struct App {
    api: Box<dyn ArticleApi>,
    initial_file: Option<PathBuf>,
    min_pane_width: u16,
    export_dir: PathBuf,
    light_theme: bool,
}

impl App {
    /// Create an application talking to `api`.
    pub fn new(api: Box<dyn ArticleApi>) -> Self {
        Self {
            api,
            initial_file: None,
            min_pane_width: DEFAULT_MIN_WIDTH,
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            light_theme: false,
        }
    }

    /// Ingest this file as soon as the editor starts.
    #[must_use]
    pub fn with_initial_file(mut self, path: Option<PathBuf>) -> Self {
        self.initial_file = path;
        self
    }

    /// Minimum width of either pane, in columns.
    #[must_use]
    pub const fn with_min_pane_width(mut self, width: u16) -> Self {
        self.min_pane_width = width;
        self
    }

    /// Directory exports are written into.
    #[must_use]
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Use the palette for light terminal backgrounds.
    #[must_use]
    pub const fn with_light_theme(mut self, light: bool) -> Self {
        self.light_theme = light;
        self
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("initial_file", &self.initial_file)
            .field("min_pane_width", &self.min_pane_width)
            .field("export_dir", &self.export_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
