//! Selection state: the user's current visualization request (purpose, chart type,
//! axes, grouping and paging window) and the controller that mutates it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use color_eyre::eyre::eyre;

/// Visualization intent; gates which chart types are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    Composition,
    Distribution,
    Trends,
    Comparison,
}

impl Purpose {
    pub const ALL: [Self; 4] = [
        Self::Composition,
        Self::Distribution,
        Self::Trends,
        Self::Comparison,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Composition => "Composition",
            Self::Distribution => "Distribution",
            Self::Trends => "Trends",
            Self::Comparison => "Comparison",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chart type rendered by the chart view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartType {
    Line,
    #[default]
    Bar,
    Pie,
    Scatter,
    Doughnut,
    PolarArea,
}

impl ChartType {
    pub const ALL: [Self; 6] = [
        Self::Line,
        Self::Bar,
        Self::Pie,
        Self::Scatter,
        Self::Doughnut,
        Self::PolarArea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
            Self::Pie => "Pie",
            Self::Scatter => "Scatter",
            Self::Doughnut => "Doughnut",
            Self::PolarArea => "PolarArea",
        }
    }

    /// Pie-like charts plot a single series as angular slices.
    pub fn is_radial(self) -> bool {
        matches!(self, Self::Pie | Self::Doughnut | Self::PolarArea)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| eyre!("unknown chart type '{}'", s))
    }
}

/// One entry of a purpose's chart select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOption {
    pub label: String,
    pub chart_type: ChartType,
}

impl ChartOption {
    pub fn new(label: &str, chart_type: ChartType) -> Self {
        Self {
            label: label.to_string(),
            chart_type,
        }
    }
}

/// Immutable purpose → chart options table, handed to the controller at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartCatalog {
    options: BTreeMap<Purpose, Vec<ChartOption>>,
}

impl ChartCatalog {
    pub fn new(options: BTreeMap<Purpose, Vec<ChartOption>>) -> Self {
        Self { options }
    }

    pub fn purposes(&self) -> impl Iterator<Item = Purpose> + '_ {
        self.options.keys().copied()
    }

    pub fn options(&self, purpose: Purpose) -> &[ChartOption] {
        self.options
            .get(&purpose)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn allows(&self, purpose: Purpose, chart_type: ChartType) -> bool {
        self.options(purpose)
            .iter()
            .any(|o| o.chart_type == chart_type)
    }
}

impl Default for ChartCatalog {
    fn default() -> Self {
        let mut options = BTreeMap::new();
        options.insert(
            Purpose::Composition,
            vec![
                ChartOption::new("Pie chart", ChartType::Pie),
                ChartOption::new("Doughnut chart", ChartType::Doughnut),
            ],
        );
        options.insert(
            Purpose::Distribution,
            vec![
                ChartOption::new("Bar chart (Histogram)", ChartType::Bar),
                ChartOption::new("Line chart (Area)", ChartType::Line),
            ],
        );
        options.insert(
            Purpose::Trends,
            vec![
                ChartOption::new("Column chart", ChartType::Bar),
                ChartOption::new("Line chart", ChartType::Line),
            ],
        );
        options.insert(
            Purpose::Comparison,
            vec![
                ChartOption::new("Line chart", ChartType::Line),
                ChartOption::new("Scatter plot", ChartType::Scatter),
            ],
        );
        Self { options }
    }
}

/// The imported dataset: file identifier and its ordered column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetRef {
    pub file: String,
    pub columns: Vec<String>,
}

impl DatasetRef {
    pub fn new(file: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            file: file.into(),
            columns,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Which slice of the x domain is visualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingWindow {
    /// Distinct x values available (0 until a row count arrives)
    pub rows: usize,
    pub offset: usize,
    pub range: usize,
}

impl PagingWindow {
    fn new(range: usize) -> Self {
        Self {
            rows: 0,
            offset: 0,
            range,
        }
    }

    /// Offset after moving the window by `steps` windows (negative = left), kept inside `rows`.
    pub fn panned_offset(&self, steps: isize) -> usize {
        let stride = (self.range.max(1) / 2).max(1);
        let max_offset = self.rows.saturating_sub(self.range.max(1));
        let distance = stride.saturating_mul(steps.unsigned_abs());
        let offset = if steps < 0 {
            self.offset.saturating_sub(distance)
        } else {
            self.offset.saturating_add(distance)
        };
        offset.min(max_offset)
    }

    /// Range after zooming in (halve) or out (double), centered on the current window.
    pub fn zoomed(&self, zoom_in: bool) -> (usize, usize) {
        let range = self.range.max(1);
        let new_range = if zoom_in {
            (range / 2).max(1)
        } else {
            range.saturating_mul(2).min(self.rows.max(1))
        };
        let center = self.offset.saturating_add(range / 2);
        let max_offset = self.rows.saturating_sub(new_range);
        let offset = center.saturating_sub(new_range / 2).min(max_offset);
        (offset, new_range)
    }
}

/// A single typed change to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate {
    Purpose(Option<Purpose>),
    ChartType(ChartType),
    XAxis(Option<String>),
    YAxis(Option<String>),
    GroupBy(Option<String>),
    Offset(usize),
    Range(usize),
}

/// Row-count query issued by an x-axis change. `generation` identifies the request
/// so a late response for a superseded axis can be recognised and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCountRequest {
    pub generation: u64,
    pub file: String,
    pub column: String,
}

/// Snapshot of the parameters handed to the chart, table and analytics views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewParams {
    pub file: String,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub group_by: Option<String>,
    pub offset: usize,
    pub range: usize,
    pub rows: usize,
    pub chart_type: ChartType,
}

/// Single owner of the selection state.
#[derive(Debug, Clone)]
pub struct SelectionController {
    catalog: ChartCatalog,
    default_range: usize,
    dataset: Option<DatasetRef>,
    purpose: Option<Purpose>,
    chart_type: ChartType,
    x_axis: Option<String>,
    y_axis: Option<String>,
    group_by: Option<String>,
    paging: PagingWindow,
    generation: u64,
}

impl SelectionController {
    pub fn new(catalog: ChartCatalog, chart_type: ChartType, default_range: usize) -> Self {
        Self {
            catalog,
            default_range,
            dataset: None,
            purpose: None,
            chart_type,
            x_axis: None,
            y_axis: None,
            group_by: None,
            paging: PagingWindow::new(default_range),
            generation: 0,
        }
    }

    pub fn catalog(&self) -> &ChartCatalog {
        &self.catalog
    }

    pub fn dataset(&self) -> Option<&DatasetRef> {
        self.dataset.as_ref()
    }

    /// Column names of the current dataset (empty before the first import).
    pub fn columns(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(|d| d.columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn purpose(&self) -> Option<Purpose> {
        self.purpose
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn x_axis(&self) -> Option<&str> {
        self.x_axis.as_deref()
    }

    pub fn y_axis(&self) -> Option<&str> {
        self.y_axis.as_deref()
    }

    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    pub fn paging(&self) -> PagingWindow {
        self.paging
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Chart options for the current purpose (empty when no purpose is chosen).
    pub fn chart_options(&self) -> &[ChartOption] {
        match self.purpose {
            Some(p) => self.catalog.options(p),
            None => &[],
        }
    }

    /// Replace the dataset; every dependent selection is cleared.
    pub fn set_dataset(&mut self, dataset: DatasetRef) {
        self.clear_params();
        self.paging = PagingWindow::new(self.default_range);
        self.dataset = Some(dataset);
    }

    /// Set or unset the x-axis. Returns the row-count query to run for a new column;
    /// unsetting zeroes the row count immediately. Either way earlier requests go stale.
    pub fn set_x_axis(&mut self, column: Option<String>) -> Option<RowCountRequest> {
        self.generation += 1;
        self.x_axis = column;
        match (&self.x_axis, &self.dataset) {
            (Some(column), Some(dataset)) => Some(RowCountRequest {
                generation: self.generation,
                file: dataset.file.clone(),
                column: column.clone(),
            }),
            _ => {
                self.paging.rows = 0;
                None
            }
        }
    }

    /// Apply a row-count response. Responses for superseded requests are ignored.
    pub fn apply_row_count(&mut self, generation: u64, rows: usize) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale row count"
            );
            return false;
        }
        self.paging.rows = rows;
        self.paging.range = rows;
        self.paging.offset = 0;
        true
    }

    pub fn set_y_axis(&mut self, column: Option<String>) {
        self.y_axis = column;
    }

    pub fn set_group_by(&mut self, column: Option<String>) {
        self.group_by = column;
    }

    pub fn set_purpose(&mut self, purpose: Option<Purpose>) {
        self.purpose = purpose;
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.chart_type = chart_type;
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.paging.offset = offset;
    }

    pub fn set_range(&mut self, range: usize) {
        self.paging.range = range;
    }

    /// Reset purpose, axes and group-by, then run the x-axis reset path.
    /// The dataset and the chart type are kept.
    pub fn clear_params(&mut self) {
        self.purpose = None;
        self.y_axis = None;
        self.group_by = None;
        self.set_x_axis(None);
    }

    /// Apply one typed update; an x-axis change may yield a row-count request.
    pub fn apply(&mut self, update: SelectionUpdate) -> Option<RowCountRequest> {
        match update {
            SelectionUpdate::Purpose(p) => self.set_purpose(p),
            SelectionUpdate::ChartType(t) => self.set_chart_type(t),
            SelectionUpdate::XAxis(c) => return self.set_x_axis(c),
            SelectionUpdate::YAxis(c) => self.set_y_axis(c),
            SelectionUpdate::GroupBy(c) => self.set_group_by(c),
            SelectionUpdate::Offset(n) => self.set_offset(n),
            SelectionUpdate::Range(n) => self.set_range(n),
        }
        None
    }

    pub fn view(&self) -> ViewParams {
        ViewParams {
            file: self
                .dataset
                .as_ref()
                .map(|d| d.file.clone())
                .unwrap_or_default(),
            x_axis: self.x_axis.clone(),
            y_axis: self.y_axis.clone(),
            group_by: self.group_by.clone(),
            offset: self.paging.offset,
            range: self.paging.range,
            rows: self.paging.rows,
            chart_type: self.chart_type,
        }
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(ChartCatalog::default(), ChartType::default(), 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with_dataset() -> SelectionController {
        let mut c = SelectionController::default();
        c.set_dataset(DatasetRef::new(
            "sales.csv",
            vec!["Revenue".into(), "Region".into(), "Date".into()],
        ));
        c
    }

    #[test]
    fn x_axis_change_requests_row_count_and_resets_paging() {
        let mut c = controller_with_dataset();
        c.set_offset(5);
        let req = c.set_x_axis(Some("Region".into())).unwrap();
        assert_eq!(req.file, "sales.csv");
        assert_eq!(req.column, "Region");

        assert!(c.apply_row_count(req.generation, 42));
        let paging = c.paging();
        assert_eq!(paging.rows, 42);
        assert_eq!(paging.range, 42);
        assert_eq!(paging.offset, 0);
    }

    #[test]
    fn stale_row_count_is_discarded() {
        let mut c = controller_with_dataset();
        let first = c.set_x_axis(Some("Revenue".into())).unwrap();
        let second = c.set_x_axis(Some("Region".into())).unwrap();

        assert!(c.apply_row_count(second.generation, 7));
        assert!(!c.apply_row_count(first.generation, 1000));
        assert_eq!(c.paging().rows, 7);
        assert_eq!(c.paging().range, 7);
    }

    #[test]
    fn unsetting_x_axis_zeroes_rows_and_invalidates_requests() {
        let mut c = controller_with_dataset();
        let req = c.set_x_axis(Some("Date".into())).unwrap();
        assert!(c.set_x_axis(None).is_none());
        assert_eq!(c.paging().rows, 0);
        assert!(!c.apply_row_count(req.generation, 99));
        assert_eq!(c.paging().rows, 0);
    }

    #[test]
    fn clear_params_keeps_dataset_and_chart_type() {
        let mut c = controller_with_dataset();
        c.set_purpose(Some(Purpose::Trends));
        c.set_chart_type(ChartType::Line);
        let req = c.set_x_axis(Some("Date".into())).unwrap();
        c.apply_row_count(req.generation, 12);
        c.set_y_axis(Some("Revenue".into()));
        c.set_group_by(Some("Region".into()));

        c.clear_params();

        assert_eq!(c.purpose(), None);
        assert_eq!(c.x_axis(), None);
        assert_eq!(c.y_axis(), None);
        assert_eq!(c.group_by(), None);
        assert_eq!(c.paging().rows, 0);
        assert_eq!(c.chart_type(), ChartType::Line);
        assert_eq!(c.dataset().unwrap().file, "sales.csv");
    }

    #[test]
    fn new_dataset_resets_selection() {
        let mut c = controller_with_dataset();
        c.set_purpose(Some(Purpose::Composition));
        c.set_y_axis(Some("Revenue".into()));
        c.set_range(3);
        c.set_dataset(DatasetRef::new("other.csv", vec!["a".into()]));
        assert_eq!(c.purpose(), None);
        assert_eq!(c.y_axis(), None);
        assert_eq!(c.paging().range, 10);
        assert_eq!(c.columns(), ["a".to_string()]);
    }

    #[test]
    fn chart_options_follow_purpose() {
        let mut c = SelectionController::default();
        assert!(c.chart_options().is_empty());
        c.apply(SelectionUpdate::Purpose(Some(Purpose::Comparison)));
        let types: Vec<ChartType> = c.chart_options().iter().map(|o| o.chart_type).collect();
        assert_eq!(types, vec![ChartType::Line, ChartType::Scatter]);
        assert!(c.catalog().allows(Purpose::Composition, ChartType::Doughnut));
        assert!(!c.catalog().allows(Purpose::Composition, ChartType::Bar));
    }

    #[test]
    fn chart_type_parses_exact_names() {
        assert_eq!("Doughnut".parse::<ChartType>().unwrap(), ChartType::Doughnut);
        assert!("bar".parse::<ChartType>().is_err());
    }

    #[test]
    fn paging_pan_and_zoom_stay_in_bounds() {
        let window = PagingWindow {
            rows: 100,
            offset: 0,
            range: 20,
        };
        assert_eq!(window.panned_offset(-1), 0);
        assert_eq!(window.panned_offset(1), 10);
        assert_eq!(window.panned_offset(100), 80);

        let (offset, range) = window.zoomed(true);
        assert_eq!(range, 10);
        assert_eq!(offset, 5);

        let wide = PagingWindow {
            rows: 30,
            offset: 10,
            range: 20,
        };
        assert_eq!(wide.zoomed(false), (0, 30));
    }

    #[test]
    fn paging_saturates_at_usize_max() {
        let window = PagingWindow {
            rows: usize::MAX,
            offset: usize::MAX - 1,
            range: usize::MAX,
        };
        assert_eq!(window.panned_offset(isize::MAX), 0);
        assert_eq!(window.panned_offset(isize::MIN), 0);
        let (offset, range) = window.zoomed(false);
        assert_eq!(range, usize::MAX);
        assert_eq!(offset, 0);
        let (_, range) = window.zoomed(true);
        assert_eq!(range, usize::MAX / 2);
    }
}
