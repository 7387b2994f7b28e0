//! Live markdown preview.
//!
//! Two renderings of the same source: [`render_html`] produces a sanitized
//! HTML fragment (used for export), [`render_lines`] produces styled terminal
//! lines for the preview pane. Both are pure and fall back to showing the raw
//! text if the markdown library panics, so a bad document never freezes the
//! preview.

mod lines;
mod types;

use std::panic::{self, AssertUnwindSafe};

use comrak::{Arena, Options, markdown_to_html, parse_document};
use tracing::warn;

pub use types::{InlineSpan, InlineStyle, LineKind, PreviewLine};

fn with_options<R>(f: impl FnOnce(&Options) -> R) -> R {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    // Raw HTML is dropped and javascript:/data: links are neutralized.
    options.render.unsafe_ = false;
    f(&options)
}

/// Render markdown to a sanitized HTML fragment.
///
/// # Example
///
/// ```
/// use quillpost::preview::render_html;
///
/// let html = render_html("# Hi\n\n<script>alert(1)</script>");
/// assert!(html.contains("<h1>Hi</h1>"));
/// assert!(!html.contains("<script>"));
/// ```
pub fn render_html(source: &str) -> String {
    panic::catch_unwind(|| with_options(|options| markdown_to_html(source, options)))
        .unwrap_or_else(|_| {
            warn!(bytes = source.len(), "markdown renderer panicked, showing raw text");
            format!("<pre>{}</pre>", escape_html(source))
        })
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The rendered preview pane content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    lines: Vec<PreviewLine>,
    width: u16,
    fallback: bool,
}

impl Preview {
    pub fn lines(&self) -> &[PreviewLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Wrap width the lines were laid out for.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// True when rendering failed and the raw text is shown instead.
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Render markdown into lines wrapped at `width` columns.
pub fn render_lines(source: &str, width: u16) -> Preview {
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
        with_options(|options| {
            let arena = Arena::new();
            let root = parse_document(&arena, source, options);
            let mut builder = lines::LineBuilder::new(width);
            builder.block(root, 0, None);
            builder.finish()
        })
    }));
    match rendered {
        Ok(lines) => Preview {
            lines,
            width,
            fallback: false,
        },
        Err(_) => {
            warn!(bytes = source.len(), "preview layout panicked, showing raw text");
            Preview {
                lines: raw_lines(source),
                width,
                fallback: true,
            }
        }
    }
}

fn raw_lines(source: &str) -> Vec<PreviewLine> {
    source
        .lines()
        .map(|line| PreviewLine::new(line.to_string(), LineKind::Raw))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(preview: &Preview) -> Vec<&str> {
        preview.lines().iter().map(PreviewLine::text).collect()
    }

    #[test]
    fn test_html_strips_raw_html() {
        let html = render_html("hello <b onclick=\"x()\">bold</b>\n\n<div>block</div>");
        assert!(!html.contains("<div>"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_html_filters_javascript_links() {
        let html = render_html("[click](javascript:alert(1))");
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_html_is_idempotent() {
        let source = "# Title\n\n- a\n- b\n";
        assert_eq!(render_html(source), render_html(source));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn test_lines_heading_and_paragraph() {
        let preview = render_lines("# Hello\n\nSome *text* here.", 40);
        let lines = texts(&preview);
        assert_eq!(lines[0], "Hello");
        assert_eq!(preview.lines()[0].kind(), LineKind::Heading(1));
        assert!(lines.contains(&"Some text here."));
        assert!(!preview.is_fallback());
    }

    #[test]
    fn test_lines_inline_styles_survive() {
        let preview = render_lines("a **b** `c`", 40);
        let spans = preview.lines()[0].spans();
        assert!(spans.iter().any(|s| s.text() == "b" && s.style().strong));
        assert!(spans.iter().any(|s| s.text() == "c" && s.style().code));
    }

    #[test]
    fn test_lines_wrap_to_width() {
        let preview = render_lines("one two three four five six", 10);
        assert!(preview.line_count() >= 3);
        assert!(preview.lines().iter().all(|l| l.text().chars().count() <= 10));
    }

    #[test]
    fn test_lines_lists_and_tasks() {
        let preview = render_lines("- first\n- [x] done\n- [ ] todo\n\n1. one\n2. two", 40);
        let lines = texts(&preview);
        assert!(lines.contains(&"• first"));
        assert!(lines.contains(&"✓ done"));
        assert!(lines.contains(&"□ todo"));
        assert!(lines.contains(&"1. one"));
    }

    #[test]
    fn test_lines_code_block_framed() {
        let preview = render_lines("```rust\nfn main() {}\n```", 40);
        let lines = texts(&preview);
        assert!(lines[0].starts_with("┌ rust "));
        assert!(lines[1].contains("fn main() {}"));
        assert!(lines[2].starts_with('└'));
    }

    #[test]
    fn test_lines_table_rows() {
        let preview = render_lines("| a | b |\n|---|--:|\n| 1 | 22 |", 40);
        let lines = texts(&preview);
        assert_eq!(lines[0], "┌───┬────┐");
        assert_eq!(lines[1], "│ a │  b │");
        assert_eq!(lines[2], "├───┼────┤");
        assert_eq!(lines[3], "│ 1 │ 22 │");
    }

    #[test]
    fn test_lines_skip_raw_html() {
        let preview = render_lines("<div>secret</div>\n\ntext", 40);
        assert_eq!(texts(&preview), vec!["text"]);
    }

    #[test]
    fn test_lines_image_placeholder() {
        let preview = render_lines("![diagram](img.png)", 40);
        assert_eq!(texts(&preview), vec!["[Image: diagram]"]);
        assert_eq!(preview.lines()[0].kind(), LineKind::Image);
    }

    #[test]
    fn test_empty_source_has_no_lines() {
        assert_eq!(render_lines("", 40).line_count(), 0);
    }
}
