//! Left panel: dataset import, the selection selects, paging inputs and the clear button.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::select::SelectLine;
use super::text_input::TextInput;
use crate::config::Theme;
use crate::selection::SelectionController;
use crate::Focus;

const INPUT_LABEL_WIDTH: u16 = 8;

pub struct Sidebar<'a> {
    pub controller: &'a SelectionController,
    pub focus: Focus,
    pub import_input: &'a TextInput,
    pub offset_input: &'a TextInput,
    pub range_input: &'a TextInput,
    pub theme: &'a Theme,
}

impl Sidebar<'_> {
    /// Label of the current chart type within the purpose's options, else its bare name.
    fn chart_label(&self) -> String {
        let chart_type = self.controller.chart_type();
        self.controller
            .chart_options()
            .iter()
            .find(|o| o.chart_type == chart_type)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| chart_type.to_string())
    }

    fn select(&self, area: Rect, buf: &mut Buffer, label: &str, value: Option<&str>, focus: Focus) {
        SelectLine {
            label,
            value,
            placeholder: "(none)",
            focused: self.focus == focus,
            border_color: self.theme.get("panel_border"),
            active_color: self.theme.get("panel_border_active"),
            text_color: self.theme.get("text_primary"),
            dimmed_color: self.theme.get("dimmed"),
        }
        .render(area, buf);
    }

    fn labeled_input(&self, area: Rect, buf: &mut Buffer, label: &str, input: &TextInput, focus: Focus) {
        let row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(INPUT_LABEL_WIDTH), Constraint::Fill(1)])
            .split(area);
        let style = if self.focus == focus {
            Style::default().fg(self.theme.get("panel_border_active"))
        } else {
            Style::default().fg(self.theme.get("panel_border"))
        };
        Paragraph::new(label).style(style).render(row[0], buf);
        input.render(row[1], buf);
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = matches!(
            self.focus,
            Focus::Import
                | Focus::Purpose
                | Focus::ChartType
                | Focus::XAxis
                | Focus::YAxis
                | Focus::GroupBy
                | Focus::Offset
                | Focus::Range
                | Focus::Clear
        );
        let border_color = if active {
            self.theme.get("panel_border_active")
        } else {
            self.theme.get("panel_border")
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Selection ");
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // File label
                Constraint::Length(1), // Import input
                Constraint::Length(1),
                Constraint::Length(2), // Purpose
                Constraint::Length(2), // Chart
                Constraint::Length(2), // X axis
                Constraint::Length(2), // Y axis
                Constraint::Length(2), // Group by
                Constraint::Length(1),
                Constraint::Length(1), // Offset
                Constraint::Length(1), // Range
                Constraint::Length(1), // Rows
                Constraint::Length(1),
                Constraint::Length(1), // Clear
                Constraint::Fill(1),
            ])
            .split(inner);

        let file_label_style = if self.focus == Focus::Import {
            Style::default().fg(self.theme.get("panel_border_active"))
        } else {
            Style::default().fg(self.theme.get("panel_border"))
        };
        Paragraph::new("File (o to import):")
            .style(file_label_style)
            .render(rows[0], buf);
        if self.focus == Focus::Import || self.controller.dataset().is_none() {
            self.import_input.render(rows[1], buf);
        } else if let Some(dataset) = self.controller.dataset() {
            Paragraph::new(dataset.file.as_str())
                .style(Style::default().fg(self.theme.get("text_primary")))
                .render(rows[1], buf);
        }

        let c = self.controller;
        self.select(rows[3], buf, "Purpose", c.purpose().map(|p| p.as_str()), Focus::Purpose);
        let chart_label = self.chart_label();
        self.select(rows[4], buf, "Chart", Some(chart_label.as_str()), Focus::ChartType);
        self.select(rows[5], buf, "X axis", c.x_axis(), Focus::XAxis);
        self.select(rows[6], buf, "Y axis", c.y_axis(), Focus::YAxis);
        self.select(rows[7], buf, "Group by", c.group_by(), Focus::GroupBy);

        // Nothing to page through until the x column has rows
        if c.paging().rows > 0 {
            self.labeled_input(rows[9], buf, "Offset", self.offset_input, Focus::Offset);
            self.labeled_input(rows[10], buf, "Range", self.range_input, Focus::Range);
        }
        Paragraph::new(format!("Rows: {}", c.paging().rows))
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .render(rows[11], buf);

        let clear_style = if self.focus == Focus::Clear {
            Style::default()
                .fg(self.theme.get("panel_border_active"))
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(self.theme.get("secondary"))
        };
        Paragraph::new("[ Clear ]")
            .style(clear_style)
            .centered()
            .render(rows[13], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{DatasetRef, Purpose};

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_current_selection() {
        let mut controller = SelectionController::default();
        controller.set_dataset(DatasetRef::new(
            "sales.csv",
            vec!["Revenue".into(), "Region".into()],
        ));
        controller.set_purpose(Some(Purpose::Distribution));
        controller.set_x_axis(Some("Region".into()));
        let theme = Theme::default();
        let empty = TextInput::new();

        let area = Rect::new(0, 0, 34, 24);
        let mut buf = Buffer::empty(area);
        Sidebar {
            controller: &controller,
            focus: Focus::XAxis,
            import_input: &empty,
            offset_input: &empty,
            range_input: &empty,
            theme: &theme,
        }
        .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("sales.csv"));
        assert!(text.contains("Distribution"));
        assert!(text.contains("Bar chart (Histogram)"));
        assert!(text.contains("Region"));
        assert!(text.contains("[ Clear ]"));
        assert!(!text.contains("Offset"));
        assert!(!text.contains("Range"));
    }

    #[test]
    fn paging_inputs_appear_once_rows_are_known() {
        let mut controller = SelectionController::default();
        controller.set_dataset(DatasetRef::new("sales.csv", vec!["Date".into()]));
        let request = controller.set_x_axis(Some("Date".into())).unwrap();
        assert!(controller.apply_row_count(request.generation, 40));
        let theme = Theme::default();
        let empty = TextInput::new();

        let area = Rect::new(0, 0, 34, 24);
        let mut buf = Buffer::empty(area);
        Sidebar {
            controller: &controller,
            focus: Focus::View,
            import_input: &empty,
            offset_input: &empty,
            range_input: &empty,
            theme: &theme,
        }
        .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Offset"));
        assert!(text.contains("Range"));
        assert!(text.contains("Rows: 40"));
    }
}
