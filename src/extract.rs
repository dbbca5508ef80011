//! Infer chart settings from the free-text description field.
//!
//! Tokens are produced by splitting on single spaces only, so punctuation stays
//! attached ("Bar," does not match `Bar`). Matching is exact and case sensitive.

use crate::selection::{ChartType, Purpose, SelectionUpdate};

/// Chart keywords recognised in a description and the purpose each implies.
pub const CHART_KEYWORDS: [(&str, ChartType, Purpose); 5] = [
    ("Line", ChartType::Line, Purpose::Trends),
    ("Bar", ChartType::Bar, Purpose::Distribution),
    ("Pie", ChartType::Pie, Purpose::Composition),
    ("Scatter", ChartType::Scatter, Purpose::Comparison),
    ("Doughnut", ChartType::Doughnut, Purpose::Composition),
];

/// What a description implies. Absent fields leave the selection untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub chart: Option<(Purpose, ChartType)>,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.chart.is_none() && self.x_axis.is_none() && self.y_axis.is_none()
    }

    /// Updates in application order: purpose, chart type, x-axis, y-axis.
    pub fn updates(&self) -> Vec<SelectionUpdate> {
        let mut updates = Vec::new();
        if let Some((purpose, chart_type)) = self.chart {
            updates.push(SelectionUpdate::Purpose(Some(purpose)));
            updates.push(SelectionUpdate::ChartType(chart_type));
        }
        if let Some(x) = &self.x_axis {
            updates.push(SelectionUpdate::XAxis(Some(x.clone())));
        }
        if let Some(y) = &self.y_axis {
            updates.push(SelectionUpdate::YAxis(Some(y.clone())));
        }
        updates
    }
}

/// Scan the complete description against the current columns.
///
/// The first chart keyword wins. Column tokens are taken left to right, repeats
/// included: the first is the x-axis candidate and the second the y-axis candidate.
pub fn extract(text: &str, columns: &[String]) -> Extraction {
    let words: Vec<&str> = text.split(' ').collect();

    let chart = words.iter().find_map(|word| {
        CHART_KEYWORDS
            .iter()
            .find(|(keyword, _, _)| keyword == word)
            .map(|&(_, chart_type, purpose)| (purpose, chart_type))
    });

    let mut matches = words
        .iter()
        .filter(|word| columns.iter().any(|c| c.as_str() == **word))
        .map(|word| word.to_string());

    let x_axis = matches.next();
    let y_axis = matches.next();

    Extraction {
        chart,
        x_axis,
        y_axis,
    }
}
