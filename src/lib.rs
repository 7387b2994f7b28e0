// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. api::ApiError)
    clippy::module_name_repetitions
)]

//! # Quillpost
//!
//! A terminal markdown article editor with a draft and publish workflow.
//!
//! Quillpost loads a markdown file into a side-by-side editor and preview:
//! - Live preview that follows the editor cursor
//! - Draggable divider between the panes
//! - Automatic draft creation, manual saves and publishing through a backend API
//! - Article history with edit, publish, view and delete
//! - Export to HTML, markdown or plain text
//!
//! ## Architecture
//!
//! Quillpost uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! Network and file I/O run on a background [`worker`] thread.
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`editor`]: Text buffer with cursor movement
//! - [`preview`]: Markdown rendering for the preview pane and HTML export
//! - [`session`]: Draft/publish lifecycle of the open article
//! - [`api`]: Backend client
//! - [`ui`]: Terminal UI components

pub mod api;
pub mod app;
pub mod article;
pub mod config;
pub mod editor;
pub mod export;
pub mod ingest;
pub mod layout;
pub mod preview;
pub mod scroll;
pub mod session;
pub mod ui;
pub mod worker;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ArticleApi, HttpApi};
    pub use crate::app::{App, Message, Model};
    pub use crate::session::EditorSession;
}
