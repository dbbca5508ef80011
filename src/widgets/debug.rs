use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Paragraph, Widget},
};

#[derive(Default)]
pub struct DebugState {
    pub num_events: usize,
    pub num_frames: usize,
    pub num_key_events: usize,
    pub last_key_event_name: String,
    /// Last action taken (e.g. "pan_right") for debugging key handling.
    pub last_action: String,
    pub enabled: bool,
    /// Current row-count generation of the selection.
    pub generation: u64,
    /// Row-count responses dropped because a newer x-axis was chosen.
    pub stale_row_counts: usize,
    pub debounced: usize,
}

impl DebugState {
    pub fn on_key(&mut self, event: &crossterm::event::KeyEvent) {
        self.num_key_events += 1;
        self.last_key_event_name = format!("{:?}", event.code);
    }
}

impl Widget for &DebugState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(format!(
            "events={} keys={} last_key={} last_action={} frames={} generation={} stale={} debounced={}",
            self.num_events,
            self.num_key_events,
            self.last_key_event_name,
            self.last_action,
            self.num_frames,
            self.generation,
            self.stale_row_counts,
            self.debounced,
        ))
        .render(area, buf);
    }
}
