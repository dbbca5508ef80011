use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table, Widget},
};

use crate::chart_data::TableFrame;
use crate::config::Theme;

const MAX_COLUMN_WIDTH: usize = 24;

/// Table view of the current window: the x column first, then the value columns.
pub struct TableView<'a> {
    pub frame: &'a TableFrame,
    pub theme: &'a Theme,
}

impl TableView<'_> {
    fn column_widths(&self) -> Vec<Constraint> {
        self.frame
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let widest = self
                    .frame
                    .rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max);
                Constraint::Length(widest.clamp(1, MAX_COLUMN_WIDTH) as u16)
            })
            .collect()
    }
}

impl Widget for TableView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.frame.headers.is_empty() {
            Paragraph::new("Choose an x-axis to list its values")
                .style(Style::default().fg(self.theme.get("text_secondary")))
                .centered()
                .render(area, buf);
            return;
        }

        let header = Row::new(
            self.frame
                .headers
                .iter()
                .map(|h| Cell::from(h.as_str())),
        )
        .style(
            Style::default()
                .fg(self.theme.get("table_header"))
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

        let rows = self.frame.rows.iter().map(|row| {
            Row::new(row.iter().map(|c| Cell::from(c.as_str())))
                .style(Style::default().fg(self.theme.get("text_primary")))
        });

        Table::new(rows, self.column_widths())
            .header(header)
            .column_spacing(2)
            .render(area, buf);

        // Rule under the header, drawn into the header's bottom margin
        if area.height > 1 {
            buf.set_string(
                area.x,
                area.y + 1,
                "─".repeat(area.width as usize),
                Style::default().fg(self.theme.get("table_border")),
            );
        }
    }
}
