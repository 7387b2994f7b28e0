//! Walks the comrak AST into wrapped, styled preview lines.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{InlineSpan, InlineStyle, LineKind, PreviewLine};

const CODE_RIGHT_PADDING: usize = 2;

pub(super) struct LineBuilder {
    lines: Vec<PreviewLine>,
    width: usize,
}

impl LineBuilder {
    pub(super) fn new(width: u16) -> Self {
        Self {
            lines: Vec::new(),
            width: usize::from(width.max(1)),
        }
    }

    pub(super) fn finish(mut self) -> Vec<PreviewLine> {
        while self
            .lines
            .last()
            .is_some_and(|line| line.kind() == LineKind::Empty)
        {
            self.lines.pop();
        }
        self.lines
    }

    fn blank(&mut self) {
        self.lines.push(PreviewLine::empty());
    }

    fn push_wrapped(&mut self, kind: LineKind, spans: &[InlineSpan], first: &str, next: &str) {
        for line_spans in wrap_spans(spans, self.width, first, next) {
            self.lines.push(PreviewLine::from_spans(kind, line_spans));
        }
    }

    pub(super) fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: Option<&str>) {
        match &node.data.borrow().value {
            NodeValue::Document => {
                for child in node.children() {
                    self.block(child, depth, None);
                }
            }
            NodeValue::Heading(heading) => {
                if !self.lines.is_empty()
                    && self
                        .lines
                        .last()
                        .is_some_and(|line| line.kind() != LineKind::Empty)
                {
                    self.blank();
                }
                let spans = inline_spans(node);
                let kind = LineKind::Heading(heading.level);
                self.push_wrapped(kind, &spans, "", "");
                if heading.level <= 2 {
                    let width = self.lines.last().map_or(0, |l| l.text().width());
                    let rule = if heading.level == 1 { "═" } else { "─" };
                    self.lines
                        .push(PreviewLine::new(rule.repeat(width.max(1)), kind));
                }
                self.blank();
            }
            NodeValue::Paragraph => {
                if let Some(images) = lone_images(node) {
                    for (alt, src) in images {
                        let label = if alt.is_empty() { src } else { alt };
                        self.lines
                            .push(PreviewLine::new(format!("[Image: {label}]"), LineKind::Image));
                    }
                } else {
                    let spans = inline_spans(node);
                    self.push_wrapped(LineKind::Paragraph, &spans, "", "");
                }
                self.blank();
            }
            NodeValue::CodeBlock(code) => {
                self.code_block(&code.info, &code.literal);
            }
            NodeValue::List(list) => {
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let count = node.children().count();
                let number_width = (list.start + count.saturating_sub(1)).to_string().len();
                for (index, child) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => format!(
                            "{:>number_width$}{delimiter} ",
                            list.start + index
                        ),
                    };
                    self.block(child, depth + 1, Some(&marker));
                }
                if depth == 0 {
                    self.blank();
                }
            }
            NodeValue::Item(_) | NodeValue::TaskItem(_) => {
                self.list_item(node, depth, marker.unwrap_or("- "));
            }
            NodeValue::BlockQuote => {
                self.block_quote(node, 1);
                self.blank();
            }
            NodeValue::ThematicBreak => {
                self.lines
                    .push(PreviewLine::new("─".repeat(self.width.min(40)), LineKind::Rule));
                self.blank();
            }
            NodeValue::Table(table) => {
                for row in render_table(node, &table.alignments, self.width) {
                    self.lines.push(PreviewLine::new(row, LineKind::Table));
                }
                self.blank();
            }
            // Raw HTML never reaches the preview.
            NodeValue::HtmlBlock(_) => {}
            _ => {
                for child in node.children() {
                    self.block(child, depth, marker);
                }
            }
        }
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: &str) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let marker = match &node.data.borrow().value {
            NodeValue::TaskItem(Some(_)) => "✓ ".to_string(),
            NodeValue::TaskItem(None) => "□ ".to_string(),
            _ => marker.to_string(),
        };
        let first = format!("{indent}{marker}");
        let next = format!("{indent}{}", " ".repeat(marker.width()));
        let mut rendered_any = false;

        for child in node.children() {
            let is_text_block = matches!(child.data.borrow().value, NodeValue::Paragraph);
            if is_text_block {
                let spans = inline_spans(child);
                let prefix = if rendered_any { &next } else { &first };
                self.push_wrapped(LineKind::ListItem(depth), &spans, prefix, &next);
                rendered_any = true;
            } else {
                if !rendered_any {
                    self.lines
                        .push(PreviewLine::new(first.clone(), LineKind::ListItem(depth)));
                    rendered_any = true;
                }
                self.block(child, depth, None);
            }
        }
        if !rendered_any {
            self.lines
                .push(PreviewLine::new(first, LineKind::ListItem(depth)));
        }
    }

    fn block_quote<'a>(&mut self, node: &'a AstNode<'a>, level: usize) {
        let prefix = "│ ".repeat(level);
        for child in node.children() {
            match &child.data.borrow().value {
                NodeValue::BlockQuote => self.block_quote(child, level + 1),
                NodeValue::Paragraph => {
                    let spans = inline_spans(child);
                    self.push_wrapped(LineKind::BlockQuote, &spans, &prefix, &prefix);
                }
                _ => {
                    for raw in plain_text(child).lines() {
                        let spans = [InlineSpan::plain(raw)];
                        self.push_wrapped(LineKind::BlockQuote, &spans, &prefix, &prefix);
                    }
                }
            }
        }
    }

    fn code_block(&mut self, info: &str, literal: &str) {
        let label = info.split_whitespace().next().unwrap_or("code");
        let max_body = self.width.saturating_sub(4 + CODE_RIGHT_PADDING).max(1);
        let body_width = literal
            .lines()
            .map(UnicodeWidthStr::width)
            .max()
            .unwrap_or(0)
            .min(max_body);
        let inner = body_width + 2 + CODE_RIGHT_PADDING;
        let label = truncate_to_width(&format!(" {label} "), inner);
        let code_style = InlineStyle {
            code: true,
            ..InlineStyle::default()
        };

        self.lines.push(PreviewLine::new(
            format!("┌{label}{}┐", "─".repeat(inner.saturating_sub(label.width()))),
            LineKind::CodeBlock,
        ));
        for raw in literal.lines() {
            let shown = truncate_to_width(raw, body_width);
            let pad = " ".repeat(body_width - shown.width() + CODE_RIGHT_PADDING);
            self.lines.push(PreviewLine::from_spans(
                LineKind::CodeBlock,
                vec![
                    InlineSpan::plain("│ "),
                    InlineSpan::new(shown, code_style),
                    InlineSpan::plain(format!("{pad}│")),
                ],
            ));
        }
        self.lines.push(PreviewLine::new(
            format!("└{}┘", "─".repeat(inner)),
            LineKind::CodeBlock,
        ));
        self.blank();
    }
}

fn inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline(child, InlineStyle::default(), &mut spans);
    }
    spans
}

fn collect_inline<'a>(node: &'a AstNode<'a>, style: InlineStyle, spans: &mut Vec<InlineSpan>) {
    let nested = |flag: fn(&mut InlineStyle), spans: &mut Vec<InlineSpan>| {
        let mut next = style;
        flag(&mut next);
        for child in node.children() {
            collect_inline(child, next, spans);
        }
    };
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::HtmlInline(_) => {}
        NodeValue::Text(text) => spans.push(InlineSpan::new(text.clone(), style)),
        NodeValue::Code(code) => spans.push(InlineSpan::new(
            code.literal.clone(),
            InlineStyle {
                code: true,
                link: style.link,
                ..InlineStyle::default()
            },
        )),
        NodeValue::Emph => nested(|s| s.emphasis = true, spans),
        NodeValue::Strong => nested(|s| s.strong = true, spans),
        NodeValue::Strikethrough => nested(|s| s.strikethrough = true, spans),
        NodeValue::Link(_) => nested(|s| s.link = true, spans),
        NodeValue::Image(image) => {
            let alt = plain_text(node);
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            spans.push(InlineSpan::new(format!("[Image: {label}]"), style));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
        }
        _ => {
            for child in node.children() {
                collect_inline(child, style, spans);
            }
        }
    }
}

fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    push_plain_text(node, &mut out);
    out
}

fn push_plain_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::CodeBlock(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
        _ => {
            for child in node.children() {
                push_plain_text(child, out);
            }
        }
    }
}

/// `(alt, src)` pairs when a paragraph holds nothing but images.
fn lone_images<'a>(node: &'a AstNode<'a>) -> Option<Vec<(String, String)>> {
    let mut images = Vec::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Image(image) => images.push((plain_text(child), image.url.clone())),
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            NodeValue::Text(text) if text.trim().is_empty() => {}
            _ => return None,
        }
    }
    (!images.is_empty()).then_some(images)
}

fn render_table<'a>(
    node: &'a AstNode<'a>,
    alignments: &[TableAlignment],
    width: usize,
) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut has_header = false;
    for row in node.children() {
        let NodeValue::TableRow(header) = row.data.borrow().value else {
            continue;
        };
        has_header |= header;
        rows.push(
            row.children()
                .map(|cell| plain_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
                .collect(),
        );
    }
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![1usize; columns];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.width());
        }
    }
    // Row width is 1 + sum(width + 3); shave the widest column until it fits.
    while 1 + widths.iter().sum::<usize>() + 3 * columns > width.max(4) {
        let Some((idx, widest)) = widths.iter().copied().enumerate().max_by_key(|(_, w)| *w)
        else {
            break;
        };
        if widest <= 1 {
            break;
        }
        widths[idx] -= 1;
    }

    let border = |left: char, mid: char, right: char| {
        let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", inner.join(&mid.to_string()))
    };

    let mut out = vec![border('┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        let mut line = String::from("│");
        for (col, width) in widths.iter().enumerate() {
            let cell = truncate_to_width(row.get(col).map_or("", String::as_str), *width);
            let pad = width - cell.width();
            let (left, right) = match alignments.get(col).copied().unwrap_or(TableAlignment::None) {
                TableAlignment::Right => (pad, 0),
                TableAlignment::Center => (pad / 2, pad - pad / 2),
                TableAlignment::Left | TableAlignment::None => (0, pad),
            };
            line.push_str(&format!(" {}{cell}{} │", " ".repeat(left), " ".repeat(right)));
        }
        out.push(line);
        if has_header && idx == 0 {
            out.push(border('├', '┼', '┤'));
        }
    }
    out.push(border('└', '┴', '┘'));
    out
}

fn truncate_to_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

/// Greedy word wrap keeping span styles; prefixes are unstyled.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    first: &str,
    next: &str,
) -> Vec<Vec<InlineSpan>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut used = 0;
    let mut has_word = false;

    let start = |prefix: &str, current: &mut Vec<InlineSpan>, used: &mut usize| {
        current.clear();
        *used = prefix.width();
        if !prefix.is_empty() {
            current.push(InlineSpan::plain(prefix));
        }
    };
    start(first, &mut current, &mut used);

    for token in spans.iter().flat_map(split_words) {
        let token_width = token.text().width();
        let is_space = token.text().chars().all(char::is_whitespace);
        if has_word && used + token_width > width {
            // Drop trailing whitespace before breaking.
            if current
                .last()
                .is_some_and(|s: &InlineSpan| s.text().chars().all(char::is_whitespace))
            {
                current.pop();
            }
            lines.push(std::mem::take(&mut current));
            start(next, &mut current, &mut used);
            has_word = false;
        }
        if is_space && !has_word {
            continue;
        }
        used += token_width;
        current.push(token);
        has_word |= !is_space;
    }
    lines.push(current);
    lines
}

fn split_words(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_space = None;
    for ch in span.text().chars() {
        let is_space = ch.is_whitespace();
        if in_space.is_some_and(|state| state != is_space) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        in_space = Some(is_space);
        buf.push(ch);
    }
    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(spans: &[Vec<InlineSpan>]) -> Vec<String> {
        spans
            .iter()
            .map(|line| line.iter().map(InlineSpan::text).collect())
            .collect()
    }

    #[test]
    fn test_wrap_breaks_on_word_boundaries() {
        let spans = [InlineSpan::plain("alpha beta gamma delta")];
        assert_eq!(
            texts(&wrap_spans(&spans, 11, "", "")),
            vec!["alpha beta", "gamma delta"]
        );
    }

    #[test]
    fn test_wrap_applies_prefixes() {
        let spans = [InlineSpan::plain("one two three")];
        assert_eq!(
            texts(&wrap_spans(&spans, 9, "- ", "  ")),
            vec!["- one two", "  three"]
        );
    }

    #[test]
    fn test_wrap_keeps_overlong_word_whole() {
        let spans = [InlineSpan::plain("supercalifragilistic")];
        assert_eq!(texts(&wrap_spans(&spans, 5, "", "")), vec!["supercalifragilistic"]);
    }

    #[test]
    fn test_split_words_alternates() {
        let parts: Vec<String> = split_words(&InlineSpan::plain("a  b"))
            .iter()
            .map(|s| s.text().to_string())
            .collect();
        assert_eq!(parts, vec!["a", "  ", "b"]);
    }

    #[test]
    fn test_truncate_to_width_counts_wide_chars() {
        assert_eq!(truncate_to_width("日本語", 4), "日本");
    }
}
