use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::analytics::{format_stat, ColumnAnalytics};
use crate::config::Theme;

const LABEL_WIDTH: usize = 9;

/// Right panel: statistics for each plotted series.
pub struct AnalyticsPanel<'a> {
    pub analytics: &'a [ColumnAnalytics],
    pub theme: &'a Theme,
}

impl AnalyticsPanel<'_> {
    fn lines(&self) -> Vec<Line<'static>> {
        let label_style = Style::default().fg(self.theme.get("text_secondary"));
        let value_style = Style::default().fg(self.theme.get("text_primary"));
        let mut lines = Vec::new();

        for (i, a) in self.analytics.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                a.name.clone(),
                Style::default()
                    .fg(self.theme.series_color(i))
                    .add_modifier(Modifier::BOLD),
            )));
            let stats = [
                ("count", Some(a.count as f64)),
                ("unique", Some(a.n_unique as f64)),
                ("mean", a.mean),
                ("median", a.median),
                ("min", a.min),
                ("max", a.max),
                ("std", a.std),
                ("var", a.var),
            ];
            for (label, value) in stats {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<width$}", label, width = LABEL_WIDTH), label_style),
                    Span::styled(format_stat(value), value_style),
                ]));
            }
        }
        lines
    }
}

impl Widget for AnalyticsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.get("panel_border")))
            .title(" Analytics ");

        if self.analytics.is_empty() {
            Paragraph::new("Statistics appear once a y-axis is plotted")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .wrap(Wrap { trim: true })
                .block(block)
                .render(area, buf);
            return;
        }

        Paragraph::new(self.lines()).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_each_series() {
        let analytics = vec![
            ColumnAnalytics {
                name: "east".into(),
                count: 2,
                n_unique: 2,
                mean: Some(15.0),
                ..Default::default()
            },
            ColumnAnalytics {
                name: "west".into(),
                ..Default::default()
            },
        ];
        let theme = Theme::default();
        let panel = AnalyticsPanel {
            analytics: &analytics,
            theme: &theme,
        };
        let lines: Vec<String> = panel.lines().iter().map(|l| l.to_string()).collect();
        assert_eq!(lines[0], "east");
        assert!(lines.iter().any(|l| l.contains("mean") && l.contains("15")));
        assert!(lines.contains(&"west".to_string()));
    }
}
