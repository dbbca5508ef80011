//! Where the selection's data comes from.
//!
//! [`DataSource`] is the seam between the UI and the query backend. The
//! application only talks to the trait; [`PolarsSource`] scans files lazily
//! with polars, tests substitute their own implementation.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;

use crate::analytics::{compute_analytics, ColumnAnalytics};
use crate::chart_data::{
    chart_frame_from, collect_window, distinct_count, table_frame_from, ChartFrame, FrameKind,
    TableFrame,
};
use crate::selection::{DatasetRef, ViewParams};
use crate::OpenOptions;

pub trait DataSource {
    /// Scan a file and register it; returns its identifier and column names.
    fn open(&mut self, path: &Path) -> Result<DatasetRef>;

    /// Number of distinct non-null values of `column`.
    fn row_count(&self, file: &str, column: &str) -> Result<usize>;

    fn chart_frame(&self, params: &ViewParams) -> Result<ChartFrame>;

    fn table_frame(&self, params: &ViewParams) -> Result<TableFrame>;

    fn analytics(&self, params: &ViewParams) -> Result<Vec<ColumnAnalytics>>;
}

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Psv,
    Parquet,
    Json,
    JsonLines,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "psv" => Some(Self::Psv),
            "parquet" => Some(Self::Parquet),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Polars-backed source. Every opened file is kept as a lazy scan keyed by its identifier.
pub struct PolarsSource {
    options: OpenOptions,
    max_groups: usize,
    frames: HashMap<String, (LazyFrame, Vec<String>)>,
}

impl PolarsSource {
    pub fn new(options: OpenOptions, max_groups: usize) -> Self {
        Self {
            options,
            max_groups,
            frames: HashMap::new(),
        }
    }

    fn scan_delimited(&self, path: &Path, default_separator: u8) -> Result<LazyFrame> {
        let pl_path = PlPath::Local(Arc::from(path));
        let mut reader = LazyCsvReader::new(pl_path)
            .with_separator(self.options.delimiter.unwrap_or(default_separator));
        if let Some(skip_lines) = self.options.skip_lines {
            reader = reader.with_skip_lines(skip_lines);
        }
        if let Some(skip_rows) = self.options.skip_rows {
            reader = reader.with_skip_rows(skip_rows);
        }
        if let Some(has_header) = self.options.has_header {
            reader = reader.with_has_header(has_header);
        }
        Ok(reader.finish()?)
    }

    fn scan(&self, path: &Path) -> Result<LazyFrame> {
        let format = FileFormat::from_path(path)
            .ok_or_else(|| eyre!("Unsupported file type: {}", path.display()))?;
        let lf = match format {
            FileFormat::Csv => self.scan_delimited(path, b',')?,
            FileFormat::Tsv => self.scan_delimited(path, b'\t')?,
            FileFormat::Psv => self.scan_delimited(path, b'|')?,
            FileFormat::Parquet => {
                LazyFrame::scan_parquet(PlPath::Local(Arc::from(path)), Default::default())?
            }
            FileFormat::JsonLines => {
                LazyJsonLineReader::new(PlPath::Local(Arc::from(path))).finish()?
            }
            FileFormat::Json => {
                let file = File::open(path)?;
                JsonReader::new(file)
                    .with_json_format(JsonFormat::Json)
                    .finish()?
                    .lazy()
            }
        };
        Ok(lf)
    }

    fn frame(&self, file: &str) -> Result<&(LazyFrame, Vec<String>)> {
        self.frames
            .get(file)
            .ok_or_else(|| eyre!("No dataset named '{}' has been imported", file))
    }

    fn window(&self, params: &ViewParams, kind: FrameKind) -> Result<Option<DataFrame>> {
        let (lf, columns) = self.frame(&params.file)?;
        collect_window(lf, columns, params, kind, self.max_groups)
    }
}

impl DataSource for PolarsSource {
    fn open(&mut self, path: &Path) -> Result<DatasetRef> {
        let lf = self.scan(path)?;
        let columns: Vec<String> = lf
            .clone()
            .collect_schema()?
            .iter_names()
            .map(|n| n.to_string())
            .collect();
        if columns.is_empty() {
            return Err(eyre!("{} has no columns", path.display()));
        }
        let file = path.display().to_string();
        tracing::info!(file = %file, columns = columns.len(), "dataset imported");
        self.frames.insert(file.clone(), (lf, columns.clone()));
        Ok(DatasetRef::new(file, columns))
    }

    fn row_count(&self, file: &str, column: &str) -> Result<usize> {
        let (lf, _) = self.frame(file)?;
        distinct_count(lf, column)
    }

    fn chart_frame(&self, params: &ViewParams) -> Result<ChartFrame> {
        match self.window(params, FrameKind::Chart)? {
            Some(df) => chart_frame_from(&df, params.x_axis.as_deref().unwrap_or_default()),
            None => Ok(ChartFrame::default()),
        }
    }

    fn table_frame(&self, params: &ViewParams) -> Result<TableFrame> {
        match self.window(params, FrameKind::Table)? {
            Some(df) => table_frame_from(&df, params.x_axis.as_deref().unwrap_or_default()),
            None => Ok(TableFrame::default()),
        }
    }

    fn analytics(&self, params: &ViewParams) -> Result<Vec<ColumnAnalytics>> {
        match self.window(params, FrameKind::Analytics)? {
            Some(df) => compute_analytics(&df),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("a.ndjson")), Some(FileFormat::JsonLines));
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn open_reads_columns_and_counts_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "sales.csv",
            "Date,Region,Revenue\n2024-01,east,10\n2024-02,east,20\n2024-01,west,11\n",
        );
        let mut source = PolarsSource::new(OpenOptions::new(), 10);
        let dataset = source.open(&path).unwrap();
        assert_eq!(dataset.columns, vec!["Date", "Region", "Revenue"]);
        assert_eq!(source.row_count(&dataset.file, "Date").unwrap(), 2);
        assert_eq!(source.row_count(&dataset.file, "Revenue").unwrap(), 3);
    }

    #[test]
    fn semicolon_delimiter_option() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "semi.csv", "a;b\n1;2\n3;4\n");
        let mut source = PolarsSource::new(OpenOptions::new().with_delimiter(b';'), 10);
        let dataset = source.open(&path).unwrap();
        assert_eq!(dataset.columns, vec!["a", "b"]);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "data.xyz", "a\n1\n");
        let mut source = PolarsSource::new(OpenOptions::new(), 10);
        assert!(source.open(&path).is_err());
    }

    #[test]
    fn unknown_file_is_an_error() {
        let source = PolarsSource::new(OpenOptions::new(), 10);
        assert!(source.row_count("missing.csv", "a").is_err());
    }

    #[test]
    fn frames_for_selection() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "sales.csv",
            "Date,Region,Revenue\n2024-02,east,20\n2024-01,east,10\n2024-01,west,11\n2024-02,west,21\n",
        );
        let mut source = PolarsSource::new(OpenOptions::new(), 10);
        let dataset = source.open(&path).unwrap();
        let params = ViewParams {
            file: dataset.file,
            x_axis: Some("Date".into()),
            y_axis: Some("Revenue".into()),
            group_by: Some("Region".into()),
            offset: 0,
            range: 2,
            ..Default::default()
        };

        let chart = source.chart_frame(&params).unwrap();
        assert_eq!(chart.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(chart.series[0].name, "east");
        assert_eq!(chart.series[0].values, vec![Some(10.0), Some(20.0)]);
        assert_eq!(chart.series[1].values, vec![Some(11.0), Some(21.0)]);

        let table = source.table_frame(&params).unwrap();
        assert_eq!(table.headers, vec!["Date", "east", "west"]);
        assert_eq!(table.rows[1], vec!["2024-02", "20", "21"]);

        let analytics = source.analytics(&params).unwrap();
        assert_eq!(analytics.len(), 2);
        assert_eq!(analytics[0].mean, Some(15.0));
    }

    #[test]
    fn analytics_cover_every_column_until_grouped() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "sales.csv",
            "Date,Region,Revenue\n2024-02,east,20\n2024-01,east,10\n2024-01,west,11\n2024-03,west,30\n",
        );
        let mut source = PolarsSource::new(OpenOptions::new(), 10);
        let dataset = source.open(&path).unwrap();
        let mut params = ViewParams {
            file: dataset.file,
            x_axis: Some("Date".into()),
            offset: 0,
            range: 10,
            ..Default::default()
        };

        let names = |a: Vec<ColumnAnalytics>| a.into_iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(
            names(source.analytics(&params).unwrap()),
            vec!["Date", "Region", "Revenue"]
        );

        params.y_axis = Some("Revenue".into());
        let analytics = source.analytics(&params).unwrap();
        assert_eq!(names(analytics.clone()), vec!["Date", "Region", "Revenue"]);
        // First Revenue per date: 10, 20, 30
        assert_eq!(analytics[2].mean, Some(20.0));
        assert_eq!(analytics[0].n_unique, 3);

        params.group_by = Some("Region".into());
        assert_eq!(names(source.analytics(&params).unwrap()), vec!["east", "west"]);
    }
}
