//! Theming and color definitions.
//!
//! Preview styling uses semantic ANSI colors that respect the terminal's
//! palette, with darker indexed colors swapped in on light backgrounds.

use ratatui::style::{Color, Modifier, Style};

use crate::app::ToastLevel;
use crate::preview::{InlineStyle, LineKind};

/// Get the style for a preview line of the given kind.
pub fn style_for_line_kind(kind: LineKind, light_bg: bool) -> Style {
    let pick = |light: Color, dark: Color| if light_bg { light } else { dark };
    match kind {
        // Headings - bold with distinct colors per level
        LineKind::Heading(1) => Style::default()
            .fg(pick(Color::Indexed(24), Color::Cyan))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineKind::Heading(2) => Style::default()
            .fg(pick(Color::Indexed(22), Color::Green))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(3) => Style::default()
            .fg(pick(Color::Indexed(58), Color::Yellow))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(4) => Style::default()
            .fg(pick(Color::Indexed(24), Color::Blue))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(5) => Style::default()
            .fg(pick(Color::Indexed(54), Color::Magenta))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(_) => Style::default()
            .fg(pick(Color::Indexed(24), Color::Cyan))
            .add_modifier(Modifier::BOLD),

        LineKind::CodeBlock => Style::default()
            .fg(pick(Color::Indexed(238), Color::Indexed(245)))
            .add_modifier(Modifier::DIM),

        LineKind::BlockQuote => Style::default()
            .fg(pick(Color::Indexed(24), Color::Blue))
            .add_modifier(Modifier::ITALIC),

        LineKind::Rule => Style::default()
            .fg(pick(Color::Indexed(241), Color::Indexed(240)))
            .add_modifier(Modifier::DIM),

        // Placeholder stands in for the picture
        LineKind::Image => Style::default()
            .fg(pick(Color::Indexed(90), Color::Magenta))
            .add_modifier(Modifier::ITALIC),

        LineKind::Table => Style::default().fg(pick(Color::Indexed(236), Color::Indexed(252))),

        LineKind::ListItem(_) | LineKind::Paragraph | LineKind::Empty | LineKind::Raw => {
            Style::default()
        }
    }
}

/// Get the style for an inline span, merged with a base line style.
pub fn style_for_inline(base: Style, inline: InlineStyle, light_bg: bool) -> Style {
    let mut style = base;

    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style
            .add_modifier(Modifier::UNDERLINED)
            .fg(if light_bg { Color::Blue } else { Color::LightBlue });
    }
    if inline.code {
        style = style
            .fg(if light_bg { Color::Indexed(88) } else { Color::Red })
            .add_modifier(Modifier::BOLD);
    }

    style
}

/// Colors for everything around the two panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chrome {
    pub header: Style,
    pub caption: Style,
    pub field_label: Style,
    pub field: Style,
    pub field_focused: Style,
    pub handle: Style,
    pub handle_active: Style,
    pub status_bar: Style,
    pub placeholder: Style,
    pub selected: Style,
}

impl Chrome {
    pub fn new(light_bg: bool) -> Self {
        if light_bg {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .bg(Color::Indexed(24))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            caption: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::BOLD),
            field_label: Style::default().fg(Color::Indexed(245)),
            field: Style::default().bg(Color::Indexed(236)).fg(Color::Indexed(252)),
            field_focused: Style::default().bg(Color::Indexed(238)).fg(Color::White),
            handle: Style::default().fg(Color::Indexed(240)),
            handle_active: Style::default().fg(Color::Cyan),
            status_bar: Style::default().bg(Color::Indexed(236)).fg(Color::Indexed(252)),
            placeholder: Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::ITALIC),
            selected: Style::default().bg(Color::Indexed(238)).fg(Color::White),
        }
    }

    pub fn light() -> Self {
        Self {
            header: Style::default()
                .bg(Color::Indexed(153))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            caption: Style::default()
                .fg(Color::Indexed(241))
                .add_modifier(Modifier::BOLD),
            field_label: Style::default().fg(Color::Indexed(241)),
            field: Style::default().bg(Color::Indexed(254)).fg(Color::Indexed(235)),
            field_focused: Style::default().bg(Color::Indexed(252)).fg(Color::Black),
            handle: Style::default().fg(Color::Indexed(248)),
            handle_active: Style::default().fg(Color::Blue),
            status_bar: Style::default().bg(Color::Indexed(252)).fg(Color::Indexed(235)),
            placeholder: Style::default()
                .fg(Color::Indexed(241))
                .add_modifier(Modifier::ITALIC),
            selected: Style::default().bg(Color::Indexed(252)).fg(Color::Black),
        }
    }
}

/// Prefix and style of a toast.
pub const fn toast_style(level: ToastLevel) -> (&'static str, Style) {
    match level {
        ToastLevel::Info => ("[info]", Style::new().bg(Color::DarkGray).fg(Color::White)),
        ToastLevel::Success => ("[ok]", Style::new().bg(Color::Green).fg(Color::Black)),
        ToastLevel::Warning => ("[warn]", Style::new().bg(Color::Yellow).fg(Color::Black)),
        ToastLevel::Error => ("[error]", Style::new().bg(Color::Red).fg(Color::White)),
    }
}

/// Guess whether the terminal background is light from `COLORFGBG`.
pub fn detect_light_background() -> bool {
    light_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); background indices
/// 7 and 9..=15 are the light ANSI colors.
fn light_from_colorfgbg(value: Option<&str>) -> bool {
    value
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg == 7 || (9..=15).contains(&bg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        for level in 1..=6 {
            let style = style_for_line_kind(LineKind::Heading(level), false);
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_light_background_swaps_heading_color() {
        let dark = style_for_line_kind(LineKind::Heading(1), false);
        let light = style_for_line_kind(LineKind::Heading(1), true);
        assert_eq!(dark.fg, Some(Color::Cyan));
        assert_eq!(light.fg, Some(Color::Indexed(24)));
    }

    #[test]
    fn test_inline_styles_stack() {
        let inline = InlineStyle {
            emphasis: true,
            strong: true,
            ..InlineStyle::default()
        };
        let style = style_for_inline(Style::default(), inline, false);
        assert!(style.add_modifier.contains(Modifier::ITALIC));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_link_is_underlined() {
        let inline = InlineStyle {
            link: true,
            ..InlineStyle::default()
        };
        let style = style_for_inline(Style::default(), inline, false);
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(style.fg, Some(Color::LightBlue));
    }

    #[test]
    fn test_colorfgbg_detection() {
        assert!(light_from_colorfgbg(Some("0;15")));
        assert!(light_from_colorfgbg(Some("0;default;7")));
        assert!(!light_from_colorfgbg(Some("15;0")));
        assert!(!light_from_colorfgbg(Some("garbage")));
        assert!(!light_from_colorfgbg(None));
    }
}
