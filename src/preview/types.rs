//! Rendered preview lines.

/// Inline emphasis flags for a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

/// A run of text sharing one [`InlineStyle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text.into(), InlineStyle::default())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Block a preview line belongs to, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    CodeBlock,
    BlockQuote,
    /// List item with nesting depth
    ListItem(usize),
    Table,
    Rule,
    Image,
    Empty,
    /// Raw source shown because rendering failed
    Raw,
}

/// One terminal row of the rendered preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    text: String,
    kind: LineKind,
    spans: Vec<InlineSpan>,
}

impl PreviewLine {
    pub const fn new(text: String, kind: LineKind) -> Self {
        Self {
            text,
            kind,
            spans: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(String::new(), LineKind::Empty)
    }

    /// A line built from spans; the plain text is their concatenation.
    pub fn from_spans(kind: LineKind, spans: Vec<InlineSpan>) -> Self {
        let text = spans.iter().map(InlineSpan::text).collect();
        Self { text, kind, spans }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    /// Styled runs, empty when the line is a single unstyled run.
    pub fn spans(&self) -> &[InlineSpan] {
        &self.spans
    }
}
