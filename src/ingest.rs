//! Bringing a markdown file into the editor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

/// Pause between showing a freshly loaded file and syncing/creating its draft.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("Please select a markdown (.md) file")]
    NotMarkdown,
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// Accept only paths whose file name ends in `.md`.
///
/// # Errors
///
/// Returns [`IngestError::NotMarkdown`] for anything else.
pub fn check_markdown_path(path: &Path) -> Result<(), IngestError> {
    let is_md = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".md"));
    if is_md {
        Ok(())
    } else {
        warn!(path = %path.display(), "rejected non-markdown file");
        Err(IngestError::NotMarkdown)
    }
}

/// Turn text pasted or dropped onto the terminal into a path.
///
/// Terminals deliver drag-and-drop as the quoted or backslash-escaped path,
/// sometimes as a `file://` URL. Returns `None` for blank input.
pub fn normalize_dropped_path(raw: &str) -> Option<PathBuf> {
    let mut text = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            text = inner;
        }
    }
    let text = text.strip_prefix("file://").unwrap_or(text);
    let unescaped = text.replace("\\ ", " ");
    if unescaped.is_empty() {
        None
    } else {
        Some(PathBuf::from(unescaped))
    }
}

/// Read a markdown file after checking its name.
///
/// # Errors
///
/// Fails for non-markdown names and unreadable or non-UTF-8 files.
pub fn read_markdown(path: &Path) -> Result<String, IngestError> {
    check_markdown_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    info!(path = %path.display(), bytes = text.len(), "markdown file read");
    Ok(text)
}
