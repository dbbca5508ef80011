//! Build the paged x-axis frame behind the chart and table views.
//!
//! The x domain is the distinct, non-null values of the x column in ascending
//! order, sliced by the paging window. Value columns hold the first value seen
//! for each x; a group-by column splits the y column into one series per group.

use color_eyre::Result;
use polars::prelude::*;

use crate::selection::ViewParams;

/// Internal name of the x key inside collected frames.
pub const X_KEY: &str = "__x";

/// One plotted series, aligned with [`ChartFrame::labels`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Chart data for the current window: x labels plus zero or more series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartFrame {
    pub x_column: String,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartFrame {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn has_values(&self) -> bool {
        self.series
            .iter()
            .any(|s| s.values.iter().any(Option::is_some))
    }
}

/// Table data for the current window, already formatted for display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableFrame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Which value columns accompany the x key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Only the y column (or its groups)
    Chart,
    /// The y column split by groups when both are chosen, otherwise every other column
    Table,
    /// The y column split by groups when both are chosen, otherwise every column, x included
    Analytics,
}

/// Sorted distinct values of `column` (as strings), at most `limit` of them.
pub fn group_values(lf: &LazyFrame, column: &str, limit: usize) -> Result<Vec<String>> {
    let df = lf
        .clone()
        .select([col(column)
            .cast(DataType::String)
            .drop_nulls()
            .unique()
            .sort(SortOptions::default())
            .alias(column)])
        .collect()?;

    let values = df
        .column(column)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .take(limit)
        .map(str::to_string)
        .collect();
    Ok(values)
}

/// Number of distinct non-null values of `column`; the size of the x domain.
pub fn distinct_count(lf: &LazyFrame, column: &str) -> Result<usize> {
    let df = lf
        .clone()
        .select([col(column)
            .drop_nulls()
            .n_unique()
            .cast(DataType::UInt64)
            .alias("count")])
        .collect()?;
    let count = df
        .column("count")?
        .as_materialized_series()
        .u64()?
        .get(0)
        .unwrap_or(0);
    Ok(count as usize)
}

fn value_exprs(
    lf: &LazyFrame,
    columns: &[String],
    params: &ViewParams,
    x: &str,
    kind: FrameKind,
    max_groups: usize,
) -> Result<Vec<Expr>> {
    let exprs = match (params.y_axis.as_deref(), params.group_by.as_deref(), kind) {
        (Some(y), Some(g), _) => group_values(lf, g, max_groups)?
            .iter()
            .map(|group| {
                col(y)
                    .filter(col(g).cast(DataType::String).eq(lit(group.as_str())))
                    .first()
                    .alias(group.as_str())
            })
            .collect(),
        (Some(y), None, FrameKind::Chart) => vec![col(y).first().alias(y)],
        (None, _, FrameKind::Chart) => Vec::new(),
        (_, _, FrameKind::Table) => columns
            .iter()
            .filter(|c| c.as_str() != x)
            .map(|c| col(c.as_str()).first().alias(c.as_str()))
            .collect(),
        // The x key is renamed to X_KEY, so x keeps its own name here
        (_, _, FrameKind::Analytics) => columns
            .iter()
            .map(|c| col(c.as_str()).first().alias(c.as_str()))
            .collect(),
    };
    Ok(exprs)
}

/// Collect the paged frame: an `X_KEY` column plus the value columns for `kind`.
/// Returns `None` when no x-axis is selected.
pub fn collect_window(
    lf: &LazyFrame,
    columns: &[String],
    params: &ViewParams,
    kind: FrameKind,
    max_groups: usize,
) -> Result<Option<DataFrame>> {
    let Some(x) = params.x_axis.as_deref() else {
        return Ok(None);
    };

    let values = value_exprs(lf, columns, params, x, kind, max_groups)?;
    let base = lf.clone().filter(col(x).is_not_null());

    let grouped = if values.is_empty() {
        base.select([col(x).unique().alias(X_KEY)])
    } else {
        base.group_by([col(x).alias(X_KEY)]).agg(values)
    };

    let df = grouped
        .sort_by_exprs([col(X_KEY)], SortMultipleOptions::default())
        .slice(
            params.offset.min(i64::MAX as usize) as i64,
            params.range.min(u32::MAX as usize) as u32,
        )
        .collect()?;
    Ok(Some(df))
}

/// Names of the value columns of a collected window, in frame order.
pub fn value_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .filter(|n| n != X_KEY)
        .collect()
}

fn x_labels(df: &DataFrame) -> Result<Vec<String>> {
    let labels = df
        .column(X_KEY)?
        .cast(&DataType::String)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect();
    Ok(labels)
}

/// Turn a collected window into plottable series. Non-numeric values become gaps.
pub fn chart_frame_from(df: &DataFrame, x_column: &str) -> Result<ChartFrame> {
    let labels = x_labels(df)?;
    let mut series = Vec::new();
    for name in value_columns(df) {
        let values = df
            .column(name.as_str())?
            .cast(&DataType::Float64)?
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.filter(|f| f.is_finite()))
            .collect();
        series.push(ChartSeries { name, values });
    }
    Ok(ChartFrame {
        x_column: x_column.to_string(),
        labels,
        series,
    })
}

/// Format a collected window as display strings, the x key renamed to its column.
pub fn table_frame_from(df: &DataFrame, x_column: &str) -> Result<TableFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    let headers = names
        .iter()
        .map(|n| {
            if n == X_KEY {
                x_column.to_string()
            } else {
                n.clone()
            }
        })
        .collect();

    let mut rows = vec![Vec::with_capacity(names.len()); df.height()];
    for name in &names {
        let series = df.column(name.as_str())?.as_materialized_series();
        for (i, row) in rows.iter_mut().enumerate() {
            let cell = match series.get(i)? {
                AnyValue::Null => String::new(),
                v => v.str_value().to_string(),
            };
            row.push(cell);
        }
    }

    Ok(TableFrame { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> LazyFrame {
        df!(
            "month" => &[3i64, 1, 2, 1, 3, 2],
            "region" => &["east", "east", "east", "west", "west", "west"],
            "revenue" => &[30.0f64, 10.0, 20.0, 11.0, 31.0, 21.0]
        )
        .unwrap()
        .lazy()
    }

    fn columns() -> Vec<String> {
        vec!["month".into(), "region".into(), "revenue".into()]
    }

    fn params(x: &str, y: Option<&str>, group: Option<&str>) -> ViewParams {
        ViewParams {
            file: "sales.csv".into(),
            x_axis: Some(x.into()),
            y_axis: y.map(String::from),
            group_by: group.map(String::from),
            offset: 0,
            range: 10,
            ..Default::default()
        }
    }

    #[test]
    fn distinct_count_ignores_nulls() {
        let lf = df!("x" => &[Some(1i32), None, Some(1), Some(2)]).unwrap().lazy();
        assert_eq!(distinct_count(&lf, "x").unwrap(), 2);
    }

    #[test]
    fn group_values_sorted_and_limited() {
        let lf = df!("g" => &["c", "a", "b", "a"]).unwrap().lazy();
        assert_eq!(group_values(&lf, "g", 10).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(group_values(&lf, "g", 2).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn chart_window_sorted_by_x_first_value() {
        let p = params("month", Some("revenue"), None);
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Chart, 10)
            .unwrap()
            .unwrap();
        let frame = chart_frame_from(&df, "month").unwrap();
        assert_eq!(frame.labels, vec!["1", "2", "3"]);
        assert_eq!(frame.series.len(), 1);
        assert_eq!(frame.series[0].name, "revenue");
        assert_eq!(frame.series[0].values.len(), 3);
    }

    #[test]
    fn chart_window_grouped_series() {
        let p = params("month", Some("revenue"), Some("region"));
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Chart, 10)
            .unwrap()
            .unwrap();
        let frame = chart_frame_from(&df, "month").unwrap();
        let names: Vec<&str> = frame.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["east", "west"]);
        assert_eq!(frame.series[0].values, vec![Some(10.0), Some(20.0), Some(30.0)]);
        assert_eq!(frame.series[1].values, vec![Some(11.0), Some(21.0), Some(31.0)]);
    }

    #[test]
    fn window_respects_offset_and_range() {
        let mut p = params("month", Some("revenue"), Some("region"));
        p.offset = 1;
        p.range = 1;
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Chart, 10)
            .unwrap()
            .unwrap();
        let frame = chart_frame_from(&df, "month").unwrap();
        assert_eq!(frame.labels, vec!["2"]);
        assert_eq!(frame.series[0].values, vec![Some(20.0)]);
    }

    #[test]
    fn chart_without_y_has_labels_only() {
        let p = params("region", None, None);
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Chart, 10)
            .unwrap()
            .unwrap();
        let frame = chart_frame_from(&df, "region").unwrap();
        assert_eq!(frame.labels, vec!["east", "west"]);
        assert!(frame.series.is_empty());
        assert!(!frame.has_values());
    }

    #[test]
    fn table_without_group_has_every_column() {
        let p = params("month", None, None);
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Table, 10)
            .unwrap()
            .unwrap();
        let table = table_frame_from(&df, "month").unwrap();
        assert_eq!(table.headers, vec!["month", "region", "revenue"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][0], "1");
    }

    #[test]
    fn analytics_window_covers_every_column_without_group() {
        let p = params("month", None, None);
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Analytics, 10)
            .unwrap()
            .unwrap();
        assert_eq!(value_columns(&df), vec!["month", "region", "revenue"]);
        assert_eq!(df.height(), 3);

        let p = params("month", Some("revenue"), Some("region"));
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Analytics, 10)
            .unwrap()
            .unwrap();
        assert_eq!(value_columns(&df), vec!["east", "west"]);
    }

    #[test]
    fn huge_offset_is_past_the_end() {
        let mut p = params("month", Some("revenue"), None);
        p.offset = usize::MAX;
        p.range = usize::MAX;
        let df = collect_window(&sales(), &columns(), &p, FrameKind::Chart, 10)
            .unwrap()
            .unwrap();
        assert_eq!(df.height(), 0);
    }

    #[test]
    fn no_x_axis_yields_nothing() {
        let p = ViewParams::default();
        assert!(collect_window(&sales(), &columns(), &p, FrameKind::Table, 10)
            .unwrap()
            .is_none());
    }
}
