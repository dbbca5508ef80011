//! Chart view: line, scatter, bar and the radial chart types.

use std::f64::consts::TAU;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, LegendPosition, List, ListItem,
        Paragraph, Widget,
    },
};

use crate::analytics::format_stat;
use crate::chart_data::ChartFrame;
use crate::config::Theme;
use crate::selection::ChartType;

const LEGEND_WIDTH: u16 = 22;

/// Render `frame` as `chart_type`; a hint is shown when there is nothing to plot.
pub fn render_chart_view(
    area: Rect,
    buf: &mut Buffer,
    frame: &ChartFrame,
    chart_type: ChartType,
    theme: &Theme,
) {
    let hint = if frame.x_column.is_empty() {
        Some("Choose an x-axis (Tab to the sidebar) or describe the chart below")
    } else if frame.is_empty() {
        Some("No values in this window")
    } else if !frame.has_values() {
        Some("Choose a numeric y-axis to plot values")
    } else {
        None
    };
    if let Some(hint) = hint {
        Paragraph::new(hint)
            .style(Style::default().fg(theme.get("text_secondary")))
            .centered()
            .render(area, buf);
        return;
    }

    match chart_type {
        ChartType::Line | ChartType::Scatter => render_xy(area, buf, frame, chart_type, theme),
        ChartType::Bar => render_bars(area, buf, frame, theme),
        ChartType::Pie | ChartType::Doughnut | ChartType::PolarArea => {
            render_radial(area, buf, frame, chart_type, theme)
        }
    }
}

pub fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn value_bounds(frame: &ChartFrame) -> (f64, f64) {
    frame
        .series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn render_xy(area: Rect, buf: &mut Buffer, frame: &ChartFrame, chart_type: ChartType, theme: &Theme) {
    let (graph_type, marker) = match chart_type {
        ChartType::Scatter => (GraphType::Scatter, symbols::Marker::Dot),
        _ => (GraphType::Line, symbols::Marker::Braille),
    };

    // x is the position within the window; labels carry the real values
    let points: Vec<Vec<(f64, f64)>> = frame
        .series
        .iter()
        .map(|s| {
            s.values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = frame
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (series, pts))| {
            Dataset::default()
                .name(series.name.clone())
                .marker(marker)
                .graph_type(graph_type)
                .style(Style::default().fg(theme.series_color(i)))
                .data(pts)
        })
        .collect();

    let (y_min, y_max) = value_bounds(frame);
    let y_max = if y_max > y_min { y_max } else { y_min + 1.0 };
    let x_max = (frame.labels.len().saturating_sub(1) as f64).max(1.0);

    let label_style = Style::default().fg(theme.get("text_primary"));
    let first = frame.labels.first().cloned().unwrap_or_default();
    let middle = frame
        .labels
        .get(frame.labels.len() / 2)
        .cloned()
        .unwrap_or_default();
    let last = frame.labels.last().cloned().unwrap_or_default();
    let x_labels = if frame.labels.len() > 2 {
        vec![
            Span::styled(first, label_style),
            Span::styled(middle, label_style),
            Span::styled(last, label_style),
        ]
    } else {
        vec![Span::styled(first, label_style), Span::styled(last, label_style)]
    };
    let y_labels = vec![
        Span::styled(format_axis_label(y_min), label_style),
        Span::styled(format_axis_label((y_min + y_max) / 2.0), label_style),
        Span::styled(format_axis_label(y_max), label_style),
    ];

    let legend = if frame.series.len() > 1 {
        Some(LegendPosition::TopRight)
    } else {
        None
    };
    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(frame.x_column.as_str())
                .bounds([0.0, x_max])
                .style(Style::default().fg(theme.get("text_secondary")))
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .style(Style::default().fg(theme.get("text_secondary")))
                .labels(y_labels),
        )
        .legend_position(legend)
        .render(area, buf);
}

/// Bar heights on a 0-100 scale; negative values draw as empty bars.
fn bar_height(v: Option<f64>, max: f64) -> u64 {
    match v {
        Some(v) if v > 0.0 && max > 0.0 => ((v / max) * 100.0).round() as u64,
        _ => 0,
    }
}

fn render_bars(area: Rect, buf: &mut Buffer, frame: &ChartFrame, theme: &Theme) {
    let (_, max) = value_bounds(frame);
    let n_series = frame.series.len().clamp(1, u16::MAX as usize) as u16;
    let n_groups = frame.labels.len().clamp(1, u16::MAX as usize) as u16;

    let group_gap = if n_series > 1 { 1 } else { 0 };
    let bar_gap = if n_series > 1 { 0 } else { 1 };
    let per_group = area
        .width
        .saturating_sub(n_groups.saturating_mul(group_gap + bar_gap))
        / n_groups;
    let bar_width = (per_group / n_series).max(1);

    let mut chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .group_gap(group_gap)
        .max(100)
        .label_style(Style::default().fg(theme.get("text_primary")));

    for (i, label) in frame.labels.iter().enumerate() {
        let bars: Vec<Bar> = frame
            .series
            .iter()
            .enumerate()
            .map(|(s, series)| {
                let value = series.values.get(i).copied().flatten();
                Bar::default()
                    .value(bar_height(value, max))
                    .text_value(format_stat(value))
                    .style(Style::default().fg(theme.series_color(s)))
                    .value_style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(theme.series_color(s)),
                    )
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(label.as_str()))
                .bars(&bars),
        );
    }
    chart.render(area, buf);
}

/// One slice of a radial chart, angles in radians from the positive x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub start: f64,
    pub end: f64,
    /// Outer radius as a fraction of the full radius
    pub radius: f64,
    pub color: Color,
}

/// Slice geometry for the first series. Pie and doughnut slices are sized by
/// value; polar-area slices share the angle and are sized by radius.
pub fn radial_slices(values: &[Option<f64>], chart_type: ChartType, colors: &[Color]) -> Vec<Slice> {
    let positive: Vec<f64> = values
        .iter()
        .map(|v| v.filter(|v| *v > 0.0).unwrap_or(0.0))
        .collect();
    let total: f64 = positive.iter().sum();
    let max = positive.iter().copied().fold(0.0, f64::max);
    if total <= 0.0 || colors.is_empty() {
        return Vec::new();
    }

    let mut start = 0.0;
    let mut slices = Vec::with_capacity(positive.len());
    for (i, v) in positive.iter().enumerate() {
        let (sweep, radius) = if chart_type == ChartType::PolarArea {
            (TAU / positive.len() as f64, (v / max).sqrt())
        } else {
            (TAU * v / total, 1.0)
        };
        slices.push(Slice {
            start,
            end: start + sweep,
            radius,
            color: colors[i % colors.len()],
        });
        start += sweep;
    }
    slices
}

struct RadialShape<'a> {
    slices: &'a [Slice],
    /// Inner radius fraction (doughnut hole)
    hole: f64,
}

impl Shape for RadialShape<'_> {
    fn draw(&self, painter: &mut Painter) {
        const RADIUS_STEPS: usize = 48;
        const ANGLE_STEPS: usize = 720;
        for slice in self.slices.iter().filter(|s| s.end > s.start) {
            let steps = ((slice.end - slice.start) / TAU * ANGLE_STEPS as f64).ceil() as usize;
            for a in 0..=steps.max(1) {
                let theta = slice.start + (slice.end - slice.start) * a as f64 / steps.max(1) as f64;
                for r in 0..=RADIUS_STEPS {
                    let radius = r as f64 / RADIUS_STEPS as f64;
                    if radius < self.hole || radius > slice.radius {
                        continue;
                    }
                    if let Some((x, y)) = painter.get_point(radius * theta.cos(), radius * theta.sin()) {
                        painter.paint(x, y, slice.color);
                    }
                }
            }
        }
    }
}

fn render_radial(area: Rect, buf: &mut Buffer, frame: &ChartFrame, chart_type: ChartType, theme: &Theme) {
    let Some(series) = frame.series.first() else {
        return;
    };
    let colors: Vec<Color> = (0..frame.labels.len()).map(|i| theme.series_color(i)).collect();
    let slices = radial_slices(&series.values, chart_type, &colors);
    if slices.is_empty() {
        Paragraph::new("Nothing to draw: no positive values")
            .style(Style::default().fg(theme.get("text_secondary")))
            .centered()
            .render(area, buf);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Fill(1), Constraint::Length(LEGEND_WIDTH)])
        .split(area);

    // Braille dots are square when a cell is twice as tall as wide
    let plot = layout[0];
    let aspect = (plot.width.max(1) as f64 * 2.0) / (plot.height.max(1) as f64 * 4.0);
    let (x_half, y_half) = if aspect >= 1.0 {
        (aspect, 1.0)
    } else {
        (1.0, 1.0 / aspect)
    };
    let hole = if chart_type == ChartType::Doughnut { 0.5 } else { 0.0 };

    Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds([-x_half * 1.05, x_half * 1.05])
        .y_bounds([-y_half * 1.05, y_half * 1.05])
        .paint(|ctx| {
            ctx.draw(&RadialShape {
                slices: &slices,
                hole,
            });
        })
        .render(plot, buf);

    let items: Vec<ListItem> = frame
        .labels
        .iter()
        .zip(series.values.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            ListItem::new(Line::from(vec![
                Span::styled("■ ", Style::default().fg(theme.series_color(i))),
                Span::styled(
                    format!("{} {}", label, format_stat(*value)),
                    Style::default().fg(theme.get("text_primary")),
                ),
            ]))
        })
        .collect();
    List::new(items).render(layout[1], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart_data::ChartSeries;

    fn frame() -> ChartFrame {
        ChartFrame {
            x_column: "Region".into(),
            labels: vec!["east".into(), "north".into(), "west".into()],
            series: vec![ChartSeries {
                name: "Revenue".into(),
                values: vec![Some(10.0), None, Some(30.0)],
            }],
        }
    }

    fn text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.bottom())
            .flat_map(|y| (area.x..area.right()).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn pie_slices_follow_values() {
        let colors = [Color::Red, Color::Green];
        let slices = radial_slices(&[Some(1.0), Some(3.0)], ChartType::Pie, &colors);
        assert_eq!(slices.len(), 2);
        assert!((slices[0].end - TAU / 4.0).abs() < 1e-9);
        assert!((slices[1].end - TAU).abs() < 1e-9);
        assert_eq!(slices[1].color, Color::Green);
    }

    #[test]
    fn polar_area_slices_share_angle() {
        let slices = radial_slices(&[Some(1.0), Some(4.0)], ChartType::PolarArea, &[Color::Red]);
        assert!((slices[0].end - slices[0].start - TAU / 2.0).abs() < 1e-9);
        assert!((slices[0].radius - 0.5).abs() < 1e-9);
        assert!((slices[1].radius - 1.0).abs() < 1e-9);
    }

    #[test]
    fn radial_without_positive_values_is_empty() {
        assert!(radial_slices(&[None, Some(-1.0)], ChartType::Pie, &[Color::Red]).is_empty());
    }

    #[test]
    fn bar_heights_are_normalized() {
        assert_eq!(bar_height(Some(50.0), 200.0), 25);
        assert_eq!(bar_height(Some(-3.0), 200.0), 0);
        assert_eq!(bar_height(None, 200.0), 0);
    }

    #[test]
    fn hint_without_x_axis() {
        let area = Rect::new(0, 0, 80, 5);
        let mut buf = Buffer::empty(area);
        render_chart_view(area, &mut buf, &ChartFrame::default(), ChartType::Bar, &Theme::default());
        assert!(text(&buf).contains("Choose an x-axis"));
    }

    #[test]
    fn every_chart_type_renders() {
        let area = Rect::new(0, 0, 60, 20);
        for chart_type in ChartType::ALL {
            let mut buf = Buffer::empty(area);
            render_chart_view(area, &mut buf, &frame(), chart_type, &Theme::default());
            assert!(!text(&buf).trim().is_empty(), "{} rendered nothing", chart_type);
        }
    }

    #[test]
    fn bar_chart_shows_labels() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        render_chart_view(area, &mut buf, &frame(), ChartType::Bar, &Theme::default());
        let t = text(&buf);
        assert!(t.contains("east"));
        assert!(t.contains("west"));
    }
}
