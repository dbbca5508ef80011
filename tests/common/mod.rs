#![allow(dead_code)]

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use daviz::analytics::ColumnAnalytics;
use daviz::chart_data::{ChartFrame, ChartSeries, TableFrame};
use daviz::selection::{DatasetRef, ViewParams};
use daviz::{dispatch, App, AppConfig, AppEvent, CacheManager, DataSource, Theme};
use polars::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Small sales table: 3 regions, 6 dates, one row per (region, date).
pub fn write_sales_csv(dir: &Path) -> PathBuf {
    let path = dir.join("sales.csv");
    let regions = ["east", "west", "north"];
    let mut df = df!(
        "Region" => (0..18).map(|i| regions[i % 3]).collect::<Vec<&str>>(),
        "Date" => (0..18).map(|i| format!("2024-01-0{}", i / 3 + 1)).collect::<Vec<String>>(),
        "Revenue" => (0..18).map(|i| (i * 10) as f64).collect::<Vec<f64>>()
    )
    .unwrap();
    let mut file = File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

/// What the app asked of a [`MockSource`].
#[derive(Debug, Default)]
pub struct Calls {
    pub opened: Vec<PathBuf>,
    pub row_counts: Vec<String>,
    pub last_view: Option<ViewParams>,
}

/// In-memory source with fixed columns and per-column row counts.
pub struct MockSource {
    pub columns: Vec<String>,
    pub rows: HashMap<String, usize>,
    pub calls: Rc<RefCell<Calls>>,
}

impl MockSource {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: HashMap::new(),
            calls: Rc::new(RefCell::new(Calls::default())),
        }
    }

    pub fn with_rows(mut self, column: &str, rows: usize) -> Self {
        self.rows.insert(column.to_string(), rows);
        self
    }
}

impl DataSource for MockSource {
    fn open(&mut self, path: &Path) -> Result<DatasetRef> {
        if path.extension().is_some_and(|e| e == "xlsx") {
            return Err(eyre!("Unsupported file type: {}", path.display()));
        }
        self.calls.borrow_mut().opened.push(path.to_path_buf());
        Ok(DatasetRef::new(
            path.display().to_string(),
            self.columns.clone(),
        ))
    }

    fn row_count(&self, _file: &str, column: &str) -> Result<usize> {
        self.calls.borrow_mut().row_counts.push(column.to_string());
        if column == "broken" {
            return Err(eyre!("column '{}' could not be scanned", column));
        }
        Ok(self.rows.get(column).copied().unwrap_or(0))
    }

    fn chart_frame(&self, params: &ViewParams) -> Result<ChartFrame> {
        self.calls.borrow_mut().last_view = Some(params.clone());
        let Some(x) = &params.x_axis else {
            return Ok(ChartFrame::default());
        };
        let labels: Vec<String> = (params.offset..params.offset.saturating_add(params.range.min(5)))
            .map(|i| format!("{}-{}", x, i))
            .collect();
        let series = params
            .y_axis
            .iter()
            .map(|y| ChartSeries {
                name: y.clone(),
                values: labels.iter().enumerate().map(|(i, _)| Some(i as f64)).collect(),
            })
            .collect();
        Ok(ChartFrame {
            x_column: x.clone(),
            labels,
            series,
        })
    }

    fn table_frame(&self, params: &ViewParams) -> Result<TableFrame> {
        Ok(TableFrame {
            headers: params.x_axis.iter().cloned().collect(),
            rows: Vec::new(),
        })
    }

    fn analytics(&self, _params: &ViewParams) -> Result<Vec<ColumnAnalytics>> {
        Ok(Vec::new())
    }
}

/// App over `source` with history kept in `cache_dir`.
pub fn test_app(source: impl DataSource + 'static, cache_dir: &TempDir) -> App {
    let config = AppConfig::default();
    App::with_source(
        &config,
        Theme::default(),
        Box::new(source),
        CacheManager::with_dir(cache_dir.path().to_path_buf()),
    )
}

pub fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn press(app: &mut App, code: KeyCode) {
    dispatch(app, key(code)).unwrap();
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}
