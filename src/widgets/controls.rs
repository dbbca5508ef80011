use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const DEFAULT_CONTROLS: [(&str, &str); 8] = [
    ("Tab", "Focus"),
    ("o", "Import"),
    ("d", "Describe"),
    ("t", "Chart/Table"),
    ("h/l", "Pan"),
    ("+/-", "Zoom"),
    ("c", "Clear"),
    ("q", "Quit"),
];

/// Key hint bar along the bottom of the screen.
pub struct Controls {
    pub status: Option<String>,
    pub dimmed: bool,
    pub custom_controls: Option<Vec<(&'static str, &'static str)>>,
    pub bg: Color,
    pub key_fg: Color,
    pub text_fg: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            status: None,
            dimmed: false,
            custom_controls: None,
            bg: Color::DarkGray,
            key_fg: Color::Reset,
            text_fg: Color::White,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: String) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_custom_controls(mut self, controls: Vec<(&'static str, &'static str)>) -> Self {
        self.custom_controls = Some(controls);
        self
    }

    pub fn with_colors(mut self, bg: Color, key_fg: Color, text_fg: Color) -> Self {
        self.bg = bg;
        self.key_fg = key_fg;
        self.text_fg = text_fg;
        self
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls: &[(&str, &str)] = match &self.custom_controls {
            Some(custom) => custom.as_slice(),
            None => &DEFAULT_CONTROLS,
        };

        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(self.key_fg)
        };

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg).fg(self.text_fg))
                .render(layout[j + 1], buf);
        }

        let status = self.status.as_deref().unwrap_or("");
        Paragraph::new(status)
            .style(base_style.bg(self.bg).fg(self.text_fg))
            .right_aligned()
            .render(layout[controls.len() * 2], buf);
    }
}
