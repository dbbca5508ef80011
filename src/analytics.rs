//! Summary statistics for the series shown in the current window.

use color_eyre::Result;
use polars::prelude::*;

use crate::chart_data::value_columns;

/// Statistics for one series (a y column or one group of it).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnAnalytics {
    pub name: String,
    /// Non-null values in the window
    pub count: usize,
    pub n_unique: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub var: Option<f64>,
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|f| f.is_finite())
}

/// Compute statistics for one series. Values that are not numeric count towards
/// `count` and `n_unique` but leave the numeric fields empty.
pub fn compute_series_analytics(series: &Series) -> Result<ColumnAnalytics> {
    let count = series.len() - series.null_count();
    let n_unique = series.drop_nulls().n_unique()?;
    let name = series.name().to_string();

    if !series.dtype().is_primitive_numeric() {
        return Ok(ColumnAnalytics {
            name,
            count,
            n_unique,
            ..Default::default()
        });
    }

    let numeric = series.cast(&DataType::Float64)?;
    Ok(ColumnAnalytics {
        name,
        count,
        n_unique,
        mean: finite(numeric.mean()),
        min: finite(numeric.min::<f64>()?),
        max: finite(numeric.max::<f64>()?),
        median: finite(numeric.median()),
        // Sample statistics (ddof = 1)
        std: finite(numeric.std(1)),
        var: finite(numeric.var(1)),
    })
}

/// Statistics for every value column of a collected window, in frame order.
pub fn compute_analytics(window: &DataFrame) -> Result<Vec<ColumnAnalytics>> {
    value_columns(window)
        .iter()
        .map(|name| compute_series_analytics(window.column(name.as_str())?.as_materialized_series()))
        .collect()
}

/// Human-readable statistic, or a dash when it is undefined.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() >= 1e6 || (v != 0.0 && v.abs() < 1e-3) => format!("{:.3e}", v),
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_series_statistics() {
        let s = Series::new("revenue".into(), &[Some(1.0f64), Some(2.0), None, Some(3.0), Some(2.0)]);
        let a = compute_series_analytics(&s).unwrap();
        assert_eq!(a.name, "revenue");
        assert_eq!(a.count, 4);
        assert_eq!(a.n_unique, 3);
        assert_eq!(a.mean, Some(2.0));
        assert_eq!(a.min, Some(1.0));
        assert_eq!(a.max, Some(3.0));
        assert_eq!(a.median, Some(2.0));
        let var = a.var.unwrap();
        assert!((var - 2.0 / 3.0).abs() < 1e-9);
        assert!((a.std.unwrap() - var.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn integer_series_is_cast() {
        let s = Series::new("n".into(), &[4i64, 8]);
        let a = compute_series_analytics(&s).unwrap();
        assert_eq!(a.mean, Some(6.0));
        assert_eq!(a.max, Some(8.0));
    }

    #[test]
    fn string_series_has_counts_only() {
        let s = Series::new("region".into(), &["east", "west", "east"]);
        let a = compute_series_analytics(&s).unwrap();
        assert_eq!(a.count, 3);
        assert_eq!(a.n_unique, 2);
        assert_eq!(a.mean, None);
        assert_eq!(a.std, None);
    }

    #[test]
    fn single_value_has_no_spread() {
        let s = Series::new("one".into(), &[5.0f64]);
        let a = compute_series_analytics(&s).unwrap();
        assert_eq!(a.mean, Some(5.0));
        assert_eq!(a.std, None);
        assert_eq!(a.var, None);
    }

    #[test]
    fn window_analytics_skip_x_key() {
        let df = df!(
            crate::chart_data::X_KEY => &[1i64, 2],
            "east" => &[10.0f64, 20.0],
            "west" => &[Some(1.0f64), None]
        )
        .unwrap();
        let all = compute_analytics(&df).unwrap();
        let names: Vec<&str> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["east", "west"]);
        assert_eq!(all[1].count, 1);
    }

    #[test]
    fn stat_formatting() {
        assert_eq!(format_stat(None), "-");
        assert_eq!(format_stat(Some(3.0)), "3");
        assert_eq!(format_stat(Some(2.5)), "2.500");
        assert_eq!(format_stat(Some(1.5e7)), "1.500e7");
    }
}
