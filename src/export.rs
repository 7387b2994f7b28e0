//! Exporting the open article to a local file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use tracing::info;

use crate::preview::render_html;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
    Text,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
            Self::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "HTML",
            Self::Markdown => "Markdown",
            Self::Text => "plain text",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Please enter an article title")]
    MissingTitle,
    #[error("Please enter article content")]
    MissingContent,
    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
}

const STYLESHEET: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }
h1, h2, h3 { color: #333; }
code { background: #f4f4f4; padding: 2px 4px; border-radius: 3px; font-family: monospace; }
pre { background: #f4f4f4; padding: 15px; border-radius: 6px; overflow-x: auto; margin: 15px 0; }
blockquote { border-left: 4px solid #00ab6c; margin: 0; padding-left: 20px; color: #666; }";

static HEADER_MARKS: LazyLock<Regex> = LazyLock::new(|| compile(r"#+\s*"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*(.*?)\*\*"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| compile(r"\*(.*?)\*"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`(.*?)`"));
static LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"\[(.*?)\]\(.*?\)"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static export pattern is valid")
}

/// File-name-safe form of a title: alphanumerics, space, `-` and `_` kept,
/// trailing whitespace trimmed, spaces turned into underscores.
///
/// # Example
///
/// ```
/// use quillpost::export::safe_title;
///
/// assert_eq!(safe_title("Hello, World! v2 "), "Hello_World_v2");
/// ```
pub fn safe_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().replace(' ', "_")
}

/// Export file name, stamped with `now`.
pub fn file_name(title: &str, format: ExportFormat, now: NaiveDateTime) -> String {
    let safe = safe_title(title);
    let safe = if safe.is_empty() { "untitled".to_string() } else { safe };
    format!("{safe}_{}.{}", now.format("%Y%m%d_%H%M%S"), format.extension())
}

/// Body of the exported file.
pub fn render_export(title: &str, content: &str, format: ExportFormat) -> String {
    match format {
        ExportFormat::Html => html_document(title, &render_html(content)),
        ExportFormat::Markdown => format!("# {title}\n\n{content}"),
        ExportFormat::Text => format!("{title}\n\n{}", strip_markdown(content)),
    }
}

fn html_document(title: &str, body: &str) -> String {
    let title = escape_text(title);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>\n{STYLESHEET}\n</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{body}</body>\n</html>\n"
    )
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Drop the commonest markdown markup, leaving readable text.
pub fn strip_markdown(content: &str) -> String {
    let text = HEADER_MARKS.replace_all(content, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    LINK.replace_all(&text, "$1").into_owned()
}

/// Write an export into `dir`, creating it if needed.
///
/// # Errors
///
/// Fails for a blank title or content, or when the file cannot be written.
pub fn write_export(
    dir: &Path,
    title: &str,
    content: &str,
    format: ExportFormat,
    now: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ExportError::MissingTitle);
    }
    if content.trim().is_empty() {
        return Err(ExportError::MissingContent);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(title, format, now));
    std::fs::write(&path, render_export(title, content, format))?;
    info!(path = %path.display(), %format, "article exported");
    Ok(path)
}
