use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{CursorMove, Input, Key, TextArea};

use crate::cache::CacheManager;
use crate::config::Theme;

use super::text_input_common::{add_to_history, load_history_impl, save_history_impl};

/// Event emitted by TextInput widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInputEvent {
    None,
    Changed,        // Value edited by typing
    Submit,         // Enter pressed
    Cancel,         // Esc pressed
    HistoryChanged, // Value replaced by a history entry
}

/// Single-line text input wrapping tui-textarea, with optional persisted history
pub struct TextInput {
    textarea: TextArea<'static>,
    value: String,
    pub history_id: Option<String>,
    pub history: Vec<String>,
    history_index: Option<usize>,
    history_temp: Option<String>,
    pub history_limit: usize,
    history_loaded: bool,
    placeholder: Option<String>,
    text_color: Option<Color>,
    placeholder_color: Option<Color>,
    cursor_focused: Option<Color>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            history_id: None,
            history: Vec::new(),
            history_index: None,
            history_temp: None,
            history_limit: 1000,
            history_loaded: false,
            placeholder: None,
            text_color: None,
            placeholder_color: None,
            cursor_focused: None,
            focused: false,
        };
        widget.apply_style();
        widget
    }

    fn apply_style(&mut self) {
        let mut style = Style::default();
        if let Some(color) = self.text_color {
            style = style.fg(color);
        }
        self.textarea.set_style(style);
        self.textarea.set_cursor_line_style(Style::default());
        if let Some(placeholder) = &self.placeholder {
            self.textarea.set_placeholder_text(placeholder.clone());
            if let Some(color) = self.placeholder_color {
                self.textarea
                    .set_placeholder_style(Style::default().fg(color));
            }
        }
        self.apply_cursor_style();
    }

    fn apply_cursor_style(&mut self) {
        if self.focused {
            let cursor_style = match self.cursor_focused.unwrap_or(Color::Reset) {
                Color::Reset => Style::default().add_modifier(Modifier::REVERSED),
                color => Style::default().bg(color).fg(Color::Black),
            };
            self.textarea.set_cursor_style(cursor_style);
        } else {
            // Same style as the text hides the cursor
            let style = self.textarea.style();
            self.textarea.set_cursor_style(style);
        }
    }

    fn sync_from_textarea(&mut self) {
        self.value = self.textarea.lines().first().cloned().unwrap_or_default();
    }

    fn sync_to_textarea(&mut self) {
        let single_line = self.value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line]);
        self.apply_style();
        self.textarea.move_cursor(CursorMove::End);
    }

    /// Colors from the theme; the cursor uses `cursor_focused` (reset = reversed)
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.placeholder_color = Some(theme.get("text_secondary"));
        self.cursor_focused = Some(theme.get("cursor_focused"));
        self.apply_style();
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self.apply_style();
        self
    }

    /// Enable history stored under `<id>_history.txt`
    pub fn with_history(mut self, history_id: &str) -> Self {
        self.history_id = Some(history_id.to_string());
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        if self.focused != focused {
            self.focused = focused;
            self.apply_cursor_style();
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value; the cursor moves to the end
    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.history_index = None;
        self.history_temp = None;
        self.sync_to_textarea();
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn load_history(&mut self, cache: &CacheManager) -> Result<()> {
        if self.history_loaded {
            return Ok(());
        }
        if let Some(ref history_id) = self.history_id {
            self.history = load_history_impl(cache, history_id)?;
            self.history_loaded = true;
        }
        Ok(())
    }

    pub fn save_to_history(&mut self, cache: &CacheManager) -> Result<()> {
        if let Some(history_id) = self.history_id.clone() {
            if !self.value.trim().is_empty() {
                self.load_history(cache)?;
                add_to_history(&mut self.history, self.value.clone());
                save_history_impl(cache, &history_id, &self.history, self.history_limit)?;
            }
        }
        Ok(())
    }

    /// Step to an older entry
    pub fn navigate_history_up(&mut self, cache: Option<&CacheManager>) {
        if self.history_id.is_none() {
            return;
        }
        if !self.history_loaded {
            let Some(cache) = cache else {
                return;
            };
            if let Err(e) = self.load_history(cache) {
                tracing::warn!(error = %e, "could not load input history");
                return;
            }
        }
        if self.history.is_empty() {
            return;
        }

        let new_index = match self.history_index {
            Some(idx) => idx.saturating_sub(1),
            None => {
                self.history_temp = Some(self.value.clone());
                self.history.len() - 1
            }
        };
        self.show_history_entry(new_index);
    }

    /// Step to a newer entry, or back to the text being edited
    pub fn navigate_history_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };
        if idx + 1 >= self.history.len() {
            let temp = self.history_temp.take().unwrap_or_default();
            self.value = temp;
            self.history_index = None;
            self.sync_to_textarea();
        } else {
            self.show_history_entry(idx + 1);
        }
    }

    fn show_history_entry(&mut self, index: usize) {
        if let Some(entry) = self.history.get(index) {
            self.value = entry.clone();
            self.history_index = Some(index);
            self.sync_to_textarea();
        }
    }

    pub fn handle_key(&mut self, event: &KeyEvent, cache: Option<&CacheManager>) -> TextInputEvent {
        match event.code {
            KeyCode::Enter => {
                if let Some(cache) = cache {
                    if let Err(e) = self.save_to_history(cache) {
                        tracing::warn!(error = %e, "could not save input history");
                    }
                }
                TextInputEvent::Submit
            }
            KeyCode::Esc => TextInputEvent::Cancel,
            KeyCode::Up if self.history_id.is_some() => {
                self.navigate_history_up(cache);
                TextInputEvent::HistoryChanged
            }
            KeyCode::Down if self.history_id.is_some() => {
                self.navigate_history_down();
                TextInputEvent::HistoryChanged
            }
            _ => {
                let input = key_event_to_input(event);
                if matches!(input.key, Key::Null | Key::Enter | Key::Tab) {
                    return TextInputEvent::None;
                }
                let before = self.value.clone();
                self.textarea.input(input);
                self.sync_from_textarea();
                if self.value == before {
                    return TextInputEvent::None;
                }
                self.history_index = None;
                self.history_temp = None;
                TextInputEvent::Changed
            }
        }
    }
}

fn key_event_to_input(event: &KeyEvent) -> Input {
    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab | KeyCode::BackTab => Key::Tab,
        _ => Key::Null,
    };

    Input {
        key,
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &TextInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);

        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let cell = &mut buf[(x, y)];
                let style = cell.style().remove_modifier(Modifier::UNDERLINED);
                cell.set_style(style);
            }
        }
    }
}
