//! One-line select: a label row and a `◂ value ▸` row cycled with the arrow keys.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

pub struct SelectLine<'a> {
    pub label: &'a str,
    pub value: Option<&'a str>,
    pub placeholder: &'a str,
    pub focused: bool,
    pub border_color: Color,
    pub active_color: Color,
    pub text_color: Color,
    pub dimmed_color: Color,
}

impl Widget for SelectLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        let label_style = if self.focused {
            Style::default()
                .fg(self.active_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border_color)
        };
        Paragraph::new(self.label)
            .style(label_style)
            .render(rows[0], buf);

        let (text, value_style) = match self.value {
            Some(v) => (v, Style::default().fg(self.text_color)),
            None => (self.placeholder, Style::default().fg(self.dimmed_color)),
        };
        let arrow_style = if self.focused {
            Style::default().fg(self.active_color)
        } else {
            Style::default().fg(self.dimmed_color)
        };
        Paragraph::new(Line::from(vec![
            Span::styled("◂ ", arrow_style),
            Span::styled(text.to_string(), value_style),
            Span::styled(" ▸", arrow_style),
        ]))
        .render(rows[1], buf);
    }
}

/// Next value when stepping through `options` from `current`.
///
/// With `allow_none` an unset entry sits before the first option, so stepping
/// backwards from the first option unsets the value. Without it the options wrap.
pub fn cycle(options: &[String], current: Option<&str>, forward: bool, allow_none: bool) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let n = options.len();
    let position = current.and_then(|c| options.iter().position(|o| o == c));

    let next = match (position, forward) {
        (None, true) => Some(0),
        (None, false) => Some(n - 1),
        (Some(i), true) if i + 1 < n => Some(i + 1),
        (Some(_), true) if allow_none => None,
        (Some(_), true) => Some(0),
        (Some(0), false) if allow_none => None,
        (Some(0), false) => Some(n - 1),
        (Some(i), false) => Some(i - 1),
    };
    next.map(|i| options[i].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn cycle_with_unset_entry() {
        assert_eq!(cycle(&opts(), None, true, true).as_deref(), Some("a"));
        assert_eq!(cycle(&opts(), Some("a"), true, true).as_deref(), Some("b"));
        assert_eq!(cycle(&opts(), Some("c"), true, true), None);
        assert_eq!(cycle(&opts(), Some("a"), false, true), None);
        assert_eq!(cycle(&opts(), None, false, true).as_deref(), Some("c"));
    }

    #[test]
    fn cycle_wraps_without_unset_entry() {
        assert_eq!(cycle(&opts(), Some("c"), true, false).as_deref(), Some("a"));
        assert_eq!(cycle(&opts(), Some("a"), false, false).as_deref(), Some("c"));
    }

    #[test]
    fn cycle_on_empty_options() {
        assert_eq!(cycle(&[], Some("a"), true, true), None);
    }

    #[test]
    fn renders_placeholder_when_unset() {
        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        SelectLine {
            label: "X axis",
            value: None,
            placeholder: "(none)",
            focused: false,
            border_color: Color::Cyan,
            active_color: Color::Yellow,
            text_color: Color::White,
            dimmed_color: Color::DarkGray,
        }
        .render(area, &mut buf);
        let second: String = (0..20).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(second.contains("(none)"));
    }
}
