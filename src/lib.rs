use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};

pub mod analytics;
pub mod cache;
pub mod chart_data;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod extract;
pub mod logging;
pub mod selection;
pub mod source;
pub mod widgets;

pub use cache::CacheManager;
pub use cli::Args;
pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use source::{DataSource, PolarsSource};

use analytics::ColumnAnalytics;
use chart_data::{ChartFrame, TableFrame};
use debounce::Debouncer;
use extract::extract;
use selection::{
    ChartCatalog, ChartType, PagingWindow, Purpose, RowCountRequest, SelectionController,
    SelectionUpdate,
};
use widgets::analytics::AnalyticsPanel;
use widgets::chart::render_chart_view;
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::select::cycle;
use widgets::sidebar::Sidebar;
use widgets::table::TableView;
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for cache directory and other app-specific paths
pub const APP_NAME: &str = "daviz";

/// History id of the description input (`description_history.txt` in the cache)
pub const DESCRIPTION_HISTORY: &str = "description";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
    pub skip_lines: Option<usize>,
    pub skip_rows: Option<usize>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = Some(skip_lines);
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = Some(skip_rows);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    /// Create OpenOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &cli::Args, config: &AppConfig) -> Self {
        let mut opts = OpenOptions::new();

        opts.delimiter = args.delimiter.or(config.file_loading.delimiter);
        opts.skip_lines = args.skip_lines.or(config.file_loading.skip_lines);
        opts.skip_rows = args.skip_rows.or(config.file_loading.skip_rows);

        // CLI no_header flag overrides config
        opts.has_header = match args.no_header {
            Some(no_header) => Some(!no_header),
            None => config.file_loading.has_header,
        };

        opts
    }
}

impl From<&cli::Args> for OpenOptions {
    fn from(args: &cli::Args) -> Self {
        Self::from_args_and_config(args, &AppConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    Open(PathBuf),
    DoLoad(PathBuf), // Performs the import after the UI has shown the loading state
    FetchRowCount(RowCountRequest),
    RowCount { generation: u64, rows: usize },
    Describe(String), // Debounced description text
    Offset(usize),    // Debounced offset
    Range(usize),     // Debounced range
    Update(SelectionUpdate),
    Collect,
    Exit,
    Crash(String),
}

/// Keyboard focus. Tab / Shift-Tab walk `Focus::ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Import,
    Purpose,
    ChartType,
    XAxis,
    YAxis,
    GroupBy,
    Offset,
    Range,
    Clear,
    Description,
    View,
}

impl Focus {
    pub const ORDER: [Focus; 11] = [
        Focus::Import,
        Focus::Purpose,
        Focus::ChartType,
        Focus::XAxis,
        Focus::YAxis,
        Focus::GroupBy,
        Focus::Offset,
        Focus::Range,
        Focus::Clear,
        Focus::Description,
        Focus::View,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Focus targets that consume typed characters
    pub fn is_text_input(self) -> bool {
        matches!(
            self,
            Focus::Import | Focus::Offset | Focus::Range | Focus::Description
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewTab {
    #[default]
    Chart,
    Table,
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

#[derive(Clone, Debug, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading { file_path: PathBuf },
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }
}

/// What the views currently show, refreshed on `AppEvent::Collect`.
#[derive(Debug, Default)]
struct ViewData {
    chart: ChartFrame,
    table: TableFrame,
    analytics: Vec<ColumnAnalytics>,
    error: Option<String>,
}

pub struct App {
    controller: SelectionController,
    source: Box<dyn DataSource>,
    cache: CacheManager,
    theme: Theme,
    focus: Focus,
    tab: ViewTab,
    import_input: TextInput,
    description_input: TextInput,
    offset_input: TextInput,
    range_input: TextInput,
    description_debounce: Debouncer<String>,
    offset_debounce: Debouncer<usize>,
    range_debounce: Debouncer<usize>,
    view: ViewData,
    loading_state: LoadingState,
    error_modal: ErrorModal,
    show_help: bool,
    /// Transient message for the controls bar (e.g. a failed row count)
    status: Option<String>,
    debug: DebugState,
    sidebar_width: u16,
    analytics_width: u16,
}

impl App {
    /// Application backed by polars, with history in the user's cache directory
    pub fn new(config: &AppConfig, theme: Theme, options: OpenOptions) -> App {
        let cache = CacheManager::new(APP_NAME).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not initialize cache manager, using temp dir");
            CacheManager::with_dir(std::env::temp_dir().join(APP_NAME))
        });
        let source = PolarsSource::new(options, config.display.max_groups);
        Self::with_source(config, theme, Box::new(source), cache)
    }

    pub fn with_source(
        config: &AppConfig,
        theme: Theme,
        source: Box<dyn DataSource>,
        cache: CacheManager,
    ) -> App {
        let delay = Duration::from_millis(config.performance.debounce_ms);
        let controller = SelectionController::new(
            ChartCatalog::default(),
            config.default_chart_type(),
            config.display.default_range,
        );

        let mut app = App {
            controller,
            source,
            cache,
            focus: Focus::View,
            tab: ViewTab::Chart,
            import_input: TextInput::new()
                .with_theme(&theme)
                .with_placeholder("path to csv, parquet, json"),
            description_input: TextInput::new()
                .with_theme(&theme)
                .with_placeholder("e.g. Show a Bar chart of Revenue over Region")
                .with_history(DESCRIPTION_HISTORY),
            offset_input: TextInput::new().with_theme(&theme),
            range_input: TextInput::new().with_theme(&theme),
            description_debounce: Debouncer::new(delay),
            offset_debounce: Debouncer::new(delay),
            range_debounce: Debouncer::new(delay),
            view: ViewData::default(),
            loading_state: LoadingState::Idle,
            error_modal: ErrorModal::new(),
            show_help: false,
            status: None,
            debug: DebugState::default(),
            sidebar_width: config.display.sidebar_width,
            analytics_width: config.display.analytics_width,
            theme,
        };
        app.debug.enabled = config.debug.enabled;
        app.sync_paging_inputs();
        app
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn tab(&self) -> ViewTab {
        self.tab
    }

    pub fn chart_frame(&self) -> &ChartFrame {
        &self.view.chart
    }

    pub fn table_frame(&self) -> &TableFrame {
        &self.view.table
    }

    pub fn analytics(&self) -> &[ColumnAnalytics] {
        &self.view.analytics
    }

    pub fn view_error(&self) -> Option<&str> {
        self.view.error.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_modal
            .active
            .then_some(self.error_modal.message.as_str())
    }

    pub fn is_loading(&self) -> bool {
        self.loading_state.is_loading()
    }

    pub fn description(&self) -> &str {
        self.description_input.value()
    }

    pub fn offset_text(&self) -> &str {
        self.offset_input.value()
    }

    pub fn range_text(&self) -> &str {
        self.range_input.value()
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    /// Debounced values whose quiet period has elapsed, as events to dispatch.
    pub fn poll_debounced(&mut self, now: Instant) -> Vec<AppEvent> {
        let mut events = Vec::new();
        if let Some(text) = self.description_debounce.poll(now) {
            events.push(AppEvent::Describe(text));
        }
        if let Some(offset) = self.offset_debounce.poll(now) {
            events.push(AppEvent::Offset(offset));
        }
        if let Some(range) = self.range_debounce.poll(now) {
            events.push(AppEvent::Range(range));
        }
        self.debug.debounced += events.len();
        events
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.import_input.set_focused(focus == Focus::Import);
        self.description_input.set_focused(focus == Focus::Description);
        self.offset_input.set_focused(focus == Focus::Offset);
        self.range_input.set_focused(focus == Focus::Range);
        // Leaving a paging input shows the effective value again
        self.sync_paging_inputs();
    }

    /// Tab / Shift-Tab. The paging inputs are hidden until the x column has rows.
    fn step_focus(&mut self, forward: bool) {
        let mut focus = if forward { self.focus.next() } else { self.focus.prev() };
        while matches!(focus, Focus::Offset | Focus::Range) && self.controller.paging().rows == 0 {
            focus = if forward { focus.next() } else { focus.prev() };
        }
        self.set_focus(focus);
    }

    /// Paging window including offset/range edits still waiting in their debouncers
    fn effective_paging(&self) -> PagingWindow {
        let mut paging = self.controller.paging();
        if let Some(offset) = self.offset_debounce.pending() {
            paging.offset = *offset;
        }
        if let Some(range) = self.range_debounce.pending() {
            paging.range = *range;
        }
        paging
    }

    fn sync_paging_inputs(&mut self) {
        let paging = self.effective_paging();
        if self.focus != Focus::Offset {
            self.offset_input.set_value(paging.offset.to_string());
        }
        if self.focus != Focus::Range {
            self.range_input.set_value(paging.range.to_string());
        }
    }

    fn apply_update(&mut self, update: SelectionUpdate) -> Option<AppEvent> {
        tracing::debug!(?update, "selection update");
        let request = self.controller.apply(update);
        self.debug.generation = self.controller.generation();
        self.sync_paging_inputs();
        match request {
            Some(request) => Some(AppEvent::FetchRowCount(request)),
            None => Some(AppEvent::Collect),
        }
    }

    fn clear_params(&mut self) -> Option<AppEvent> {
        self.controller.clear_params();
        self.offset_debounce.cancel();
        self.range_debounce.cancel();
        self.debug.generation = self.controller.generation();
        self.debug.last_action = "clear_params".to_string();
        self.sync_paging_inputs();
        Some(AppEvent::Collect)
    }

    fn describe(&mut self, text: &str) -> Option<AppEvent> {
        let extraction = extract(text, self.controller.columns());
        if extraction.is_empty() {
            return None;
        }
        tracing::debug!(?extraction, "description matched");

        let mut request = None;
        for update in extraction.updates() {
            if let Some(r) = self.controller.apply(update) {
                request = Some(r);
            }
        }
        self.debug.generation = self.controller.generation();
        self.sync_paging_inputs();
        match request {
            Some(request) => Some(AppEvent::FetchRowCount(request)),
            None => Some(AppEvent::Collect),
        }
    }

    fn pan(&mut self, steps: isize) {
        let paging = self.effective_paging();
        if paging.rows == 0 {
            return;
        }
        let offset = paging.panned_offset(steps);
        if offset != paging.offset {
            self.offset_debounce.call(offset, Instant::now());
            self.sync_paging_inputs();
        }
        self.debug.last_action = if steps < 0 { "pan_left" } else { "pan_right" }.to_string();
    }

    fn zoom(&mut self, zoom_in: bool) {
        let paging = self.effective_paging();
        if paging.rows == 0 {
            return;
        }
        let (offset, range) = paging.zoomed(zoom_in);
        let now = Instant::now();
        if offset != paging.offset {
            self.offset_debounce.call(offset, now);
        }
        if range != paging.range {
            self.range_debounce.call(range, now);
        }
        self.sync_paging_inputs();
        self.debug.last_action = if zoom_in { "zoom_in" } else { "zoom_out" }.to_string();
    }

    /// Step the focused select forwards or backwards.
    fn cycle_select(&mut self, forward: bool) -> Option<AppEvent> {
        let c = &self.controller;
        let update = match self.focus {
            Focus::Purpose => {
                let names: Vec<String> = c.catalog().purposes().map(|p| p.to_string()).collect();
                let next = cycle(&names, c.purpose().map(Purpose::as_str), forward, true);
                let purpose = next.and_then(|n| Purpose::ALL.into_iter().find(|p| p.as_str() == n));
                SelectionUpdate::Purpose(purpose)
            }
            Focus::ChartType => {
                let options: Vec<(String, ChartType)> = if c.chart_options().is_empty() {
                    ChartType::ALL
                        .into_iter()
                        .map(|t| (t.to_string(), t))
                        .collect()
                } else {
                    c.chart_options()
                        .iter()
                        .map(|o| (o.label.clone(), o.chart_type))
                        .collect()
                };
                let labels: Vec<String> = options.iter().map(|(l, _)| l.clone()).collect();
                let current = options
                    .iter()
                    .find(|(_, t)| *t == c.chart_type())
                    .map(|(l, _)| l.as_str());
                let next = cycle(&labels, current, forward, false)?;
                let chart_type = options.iter().find(|(l, _)| *l == next)?.1;
                SelectionUpdate::ChartType(chart_type)
            }
            Focus::XAxis => {
                SelectionUpdate::XAxis(cycle(c.columns(), c.x_axis(), forward, true))
            }
            Focus::YAxis => {
                SelectionUpdate::YAxis(cycle(c.columns(), c.y_axis(), forward, true))
            }
            Focus::GroupBy => {
                SelectionUpdate::GroupBy(cycle(c.columns(), c.group_by(), forward, true))
            }
            _ => return None,
        };
        Some(AppEvent::Update(update))
    }

    fn text_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let now = Instant::now();
        match self.focus {
            Focus::Import => match self.import_input.handle_key(event, None) {
                TextInputEvent::Submit => {
                    let path = self.import_input.value().trim().to_string();
                    self.set_focus(Focus::View);
                    if path.is_empty() {
                        return None;
                    }
                    self.import_input.clear();
                    Some(AppEvent::Open(PathBuf::from(path)))
                }
                TextInputEvent::Cancel => {
                    self.set_focus(Focus::View);
                    None
                }
                _ => None,
            },
            Focus::Description => {
                match self.description_input.handle_key(event, Some(&self.cache)) {
                    TextInputEvent::Changed | TextInputEvent::HistoryChanged => {
                        let text = self.description_input.value().to_string();
                        self.description_debounce.call(text, now);
                    }
                    TextInputEvent::Submit => {
                        self.description_debounce.cancel();
                        return Some(AppEvent::Describe(
                            self.description_input.value().to_string(),
                        ));
                    }
                    TextInputEvent::Cancel => self.set_focus(Focus::View),
                    _ => {}
                }
                None
            }
            Focus::Offset | Focus::Range => {
                let offset = self.focus == Focus::Offset;
                let input = if offset {
                    &mut self.offset_input
                } else {
                    &mut self.range_input
                };
                match input.handle_key(event, None) {
                    TextInputEvent::Changed => match input.value().trim().parse::<usize>() {
                        Ok(n) if offset => self.offset_debounce.call(n, now),
                        // Range 0 would hide everything
                        Ok(n) if n > 0 => self.range_debounce.call(n, now),
                        Ok(_) => {}
                        Err(_) => {
                            tracing::debug!(text = input.value(), "ignoring non-numeric paging input")
                        }
                    },
                    TextInputEvent::Submit | TextInputEvent::Cancel => self.set_focus(Focus::View),
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        self.debug.on_key(event);

        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.show_help {
            if matches!(event.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return None;
        }

        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        match event.code {
            KeyCode::Tab => {
                self.step_focus(true);
                return None;
            }
            KeyCode::BackTab => {
                self.step_focus(false);
                return None;
            }
            _ => {}
        }

        if self.focus.is_text_input() {
            return self.text_key(event);
        }

        let in_select = matches!(
            self.focus,
            Focus::Purpose | Focus::ChartType | Focus::XAxis | Focus::YAxis | Focus::GroupBy
        );

        match event.code {
            KeyCode::Char('q') => Some(AppEvent::Exit),
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Char('o') => {
                self.set_focus(Focus::Import);
                None
            }
            KeyCode::Char('d') => {
                self.set_focus(Focus::Description);
                None
            }
            KeyCode::Char('c') => self.clear_params(),
            KeyCode::Enter if self.focus == Focus::Clear => self.clear_params(),
            KeyCode::Char('t') => {
                self.tab = match self.tab {
                    ViewTab::Chart => ViewTab::Table,
                    ViewTab::Table => ViewTab::Chart,
                };
                Some(AppEvent::Collect)
            }
            KeyCode::Up | KeyCode::Left if in_select => self.cycle_select(false),
            KeyCode::Down | KeyCode::Right | KeyCode::Enter if in_select => self.cycle_select(true),
            KeyCode::Char('h') | KeyCode::Left => {
                self.pan(-1);
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.pan(1);
                None
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.zoom(true);
                None
            }
            KeyCode::Char('-') => {
                self.zoom(false);
                None
            }
            KeyCode::Esc => {
                self.set_focus(Focus::View);
                None
            }
            _ => None,
        }
    }

    /// Re-query the views for the current selection
    fn collect(&mut self) {
        let params = self.controller.view();
        self.view.error = None;
        if self.controller.dataset().is_none() {
            self.view = ViewData::default();
            return;
        }

        let chart = self.source.chart_frame(&params);
        let analytics = self.source.analytics(&params);
        let table = match self.tab {
            ViewTab::Table => self.source.table_frame(&params).map(Some),
            ViewTab::Chart => Ok(None),
        };

        let mut errors = Vec::new();
        match chart {
            Ok(frame) => self.view.chart = frame,
            Err(e) => errors.push(e.to_string()),
        }
        match analytics {
            Ok(a) => self.view.analytics = a,
            Err(e) => errors.push(e.to_string()),
        }
        match table {
            Ok(Some(t)) => self.view.table = t,
            Ok(None) => {}
            Err(e) => errors.push(e.to_string()),
        }
        if !errors.is_empty() {
            let message = errors.join("; ");
            tracing::warn!(error = %message, "query for the current selection failed");
            self.view.error = Some(message);
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path) => {
                // Render the loading state before the import blocks
                self.loading_state = LoadingState::Loading {
                    file_path: path.clone(),
                };
                Some(AppEvent::DoLoad(path.clone()))
            }
            AppEvent::DoLoad(path) => {
                self.loading_state = LoadingState::Idle;
                match self.source.open(path) {
                    Ok(dataset) => {
                        self.controller.set_dataset(dataset);
                        self.status = None;
                        self.description_debounce.cancel();
                        self.offset_debounce.cancel();
                        self.range_debounce.cancel();
                        self.debug.generation = self.controller.generation();
                        self.sync_paging_inputs();
                        Some(AppEvent::Collect)
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "import failed");
                        self.error_modal
                            .show(format!("Could not import {}: {}", path.display(), e));
                        None
                    }
                }
            }
            AppEvent::FetchRowCount(request) => {
                match self.source.row_count(&request.file, &request.column) {
                    Ok(rows) => Some(AppEvent::RowCount {
                        generation: request.generation,
                        rows,
                    }),
                    Err(e) => {
                        tracing::warn!(
                            column = %request.column,
                            error = %e,
                            "row count fetch failed"
                        );
                        self.status = Some(format!("Row count for {} failed ", request.column));
                        None
                    }
                }
            }
            AppEvent::RowCount { generation, rows } => {
                if self.controller.apply_row_count(*generation, *rows) {
                    self.status = None;
                    self.offset_debounce.cancel();
                    self.range_debounce.cancel();
                    self.sync_paging_inputs();
                    Some(AppEvent::Collect)
                } else {
                    self.debug.stale_row_counts += 1;
                    None
                }
            }
            AppEvent::Describe(text) => self.describe(text),
            AppEvent::Offset(offset) => self.apply_update(SelectionUpdate::Offset(*offset)),
            AppEvent::Range(range) => self.apply_update(SelectionUpdate::Range(*range)),
            AppEvent::Update(update) => self.apply_update(update.clone()),
            AppEvent::Collect => {
                self.collect();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    fn help_lines(&self) -> Vec<Line<'static>> {
        const HELP: [(&str, &str); 14] = [
            ("Tab / Shift-Tab", "Move focus"),
            ("o", "Import a dataset (type a path, Enter)"),
            ("d", "Describe the chart in words"),
            ("↑ ↓ ← →", "Change the focused select"),
            ("Enter", "Next option / press Clear"),
            ("Offset, Range", "Type a number; applied after a pause"),
            ("h / l", "Pan the window"),
            ("+ / -", "Zoom in / out"),
            ("t", "Switch between chart and table"),
            ("c", "Clear the selection"),
            ("Esc", "Leave an input"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
            ("Ctrl-C", "Quit from anywhere"),
        ];
        let key_style = Style::default()
            .fg(self.color("primary"))
            .add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(self.color("text_primary"));
        let mut lines = vec![
            Line::from(Span::styled(
                "Describe a chart such as \"Line chart of Revenue by Date\": the first chart \
                 keyword (Line, Bar, Pie, Scatter, Doughnut) picks the chart, the first two \
                 column names become the x and y axes.",
                text_style,
            )),
            Line::default(),
        ];
        lines.extend(HELP.iter().map(|(key, text)| {
            Line::from(vec![
                Span::styled(format!("{:<16}", key), key_style),
                Span::styled(*text, text_style),
            ])
        }));
        lines
    }

    fn controls(&self) -> Controls {
        let colors = (
            self.color("controls_bg"),
            self.color("primary"),
            self.color("text_primary"),
        );
        let status = match self.controller.dataset() {
            _ if self.status.is_some() => self.status.clone().unwrap_or_default(),
            Some(_) => {
                let paging = self.controller.paging();
                let end = paging.offset.saturating_add(paging.range).min(paging.rows);
                format!("Rows: {}  Window: {}..{} ", paging.rows, paging.offset, end)
            }
            None => "No dataset ".to_string(),
        };
        let controls = Controls::new()
            .with_colors(colors.0, colors.1, colors.2)
            .with_status(status)
            .with_dimmed(self.error_modal.active || self.show_help);
        if self.focus.is_text_input() {
            controls.with_custom_controls(vec![
                ("Enter", "Apply"),
                ("Esc", "Back"),
                ("Tab", "Next"),
                ("↑↓", "History"),
            ])
        } else {
            controls
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(self.sidebar_width),
                Constraint::Fill(1),
                Constraint::Length(self.analytics_width),
            ])
            .split(layout[0]);

        Sidebar {
            controller: &self.controller,
            focus: self.focus,
            import_input: &self.import_input,
            offset_input: &self.offset_input,
            range_input: &self.range_input,
            theme: &self.theme,
        }
        .render(columns[0], buf);

        let center = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(3)])
            .split(columns[1]);

        let view_border = if self.focus == Focus::View {
            self.color("panel_border_active")
        } else {
            self.color("panel_border")
        };
        let selected_tab = match self.tab {
            ViewTab::Chart => 0,
            ViewTab::Table => 1,
        };
        let title = Tabs::new(vec![" Chart ", " Table "])
            .select(selected_tab)
            .style(Style::default().fg(self.color("text_secondary")))
            .highlight_style(
                Style::default()
                    .fg(self.color("primary"))
                    .add_modifier(Modifier::BOLD),
            );
        let view_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(view_border));
        let view_inner = view_block.inner(center[0]);
        view_block.render(center[0], buf);
        let view_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Fill(1)])
            .split(view_inner);
        title.render(view_rows[0], buf);

        if let LoadingState::Loading { file_path } = &self.loading_state {
            Paragraph::new(format!("Importing {} ...", file_path.display()))
                .style(Style::default().fg(self.color("secondary")))
                .centered()
                .render(view_rows[1], buf);
        } else if let Some(error) = &self.view.error {
            Paragraph::new(error.as_str())
                .style(Style::default().fg(self.color("error")))
                .wrap(Wrap { trim: true })
                .render(view_rows[1], buf);
        } else if self.controller.dataset().is_none() {
            Paragraph::new("Press o to import a dataset")
                .style(Style::default().fg(self.color("text_secondary")))
                .centered()
                .render(view_rows[1], buf);
        } else {
            match self.tab {
                ViewTab::Chart => render_chart_view(
                    view_rows[1],
                    buf,
                    &self.view.chart,
                    self.controller.chart_type(),
                    &self.theme,
                ),
                ViewTab::Table => TableView {
                    frame: &self.view.table,
                    theme: &self.theme,
                }
                .render(view_rows[1], buf),
            }
        }

        let description_border = if self.focus == Focus::Description {
            self.color("panel_border_active")
        } else {
            self.color("panel_border")
        };
        let description_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(description_border))
            .title(" Description (d) ");
        let description_inner = description_block.inner(center[1]);
        description_block.render(center[1], buf);
        (&self.description_input).render(description_inner, buf);

        AnalyticsPanel {
            analytics: &self.view.analytics,
            theme: &self.theme,
        }
        .render(columns[2], buf);

        (&self.controls()).render(layout[1], buf);
        if self.debug.enabled && layout.len() > 2 {
            (&self.debug).render(layout[2], buf);
        }

        if self.show_help {
            let popup = centered_rect(area, 70, 70);
            Clear.render(popup, buf);
            Paragraph::new(self.help_lines())
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(self.color("panel_border_active")))
                        .title(" Help "),
                )
                .render(popup, buf);
        }

        if self.error_modal.active {
            let popup = centered_rect(area, 60, 30);
            Clear.render(popup, buf);
            let block = Block::default()
                .borders(Borders::ALL)
                .title(" Error ")
                .border_style(Style::default().fg(self.color("error")));
            let inner = block.inner(popup);
            block.render(popup, buf);
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(inner);
            Paragraph::new(self.error_modal.message.as_str())
                .style(Style::default().fg(self.color("error")))
                .wrap(Wrap { trim: true })
                .render(chunks[0], buf);
            Paragraph::new("[ OK ]")
                .style(Style::default().fg(self.color("panel_border_active")))
                .centered()
                .render(chunks[1], buf);
        }
    }
}

/// Send an event and every follow-up it produces, as the event loop would.
pub fn dispatch(app: &mut App, event: AppEvent) -> Result<()> {
    let mut next = Some(event);
    while let Some(event) = next.take() {
        if let AppEvent::Crash(msg) = &event {
            return Err(color_eyre::eyre::eyre!(msg.clone()));
        }
        next = app.event(&event);
    }
    Ok(())
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_to_open_options() {
        let args = Args {
            skip_lines: Some(1),
            skip_rows: Some(2),
            no_header: Some(true),
            delimiter: Some(b';'),
            ..Default::default()
        };
        let opts: OpenOptions = (&args).into();
        assert_eq!(opts.skip_lines, Some(1));
        assert_eq!(opts.skip_rows, Some(2));
        assert_eq!(opts.has_header, Some(false));
        assert_eq!(opts.delimiter, Some(b';'));
    }

    #[test]
    fn test_cli_overrides_config_file_loading() {
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some(b'\t');
        config.file_loading.has_header = Some(false);
        config.file_loading.skip_rows = Some(3);

        let args = Args {
            delimiter: Some(b','),
            ..Default::default()
        };
        let opts = OpenOptions::from_args_and_config(&args, &config);
        assert_eq!(opts.delimiter, Some(b','));
        assert_eq!(opts.has_header, Some(false));
        assert_eq!(opts.skip_rows, Some(3));
    }

    #[test]
    fn test_focus_order_wraps() {
        assert_eq!(Focus::View.next(), Focus::Import);
        assert_eq!(Focus::Import.prev(), Focus::View);
        assert_eq!(Focus::XAxis.next(), Focus::YAxis);
        assert!(Focus::Description.is_text_input());
        assert!(!Focus::GroupBy.is_text_input());
    }
}
