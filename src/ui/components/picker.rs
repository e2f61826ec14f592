use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
  /// Item selected (returns the item's value)
  Selected(String),
  /// Picker cancelled
  Cancelled,
}

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
  pub label: String,
  pub value: String,
  /// Rendered with a marker; used for toggle-style pickers (tags)
  pub marked: bool,
}

impl PickerItem {
  pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      value: value.into(),
      marked: false,
    }
  }

  pub fn marked(mut self, marked: bool) -> Self {
    self.marked = marked;
    self
  }
}

/// Centered overlay list for choosing one item (status, template,
/// contact, tag). Generalized so every selection flow shares one widget.
#[derive(Debug, Clone, Default)]
pub struct Picker {
  active: bool,
  items: Vec<PickerItem>,
  selected: usize,
  title: String,
}

impl Picker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if picker is currently active
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show the picker with the given items
  pub fn show(&mut self, title: impl Into<String>, items: Vec<PickerItem>) {
    self.active = true;
    self.items = items;
    self.selected = 0;
    self.title = title.into();
  }

  /// Update rows in place (e.g. after a toggle) keeping the selection
  pub fn set_items(&mut self, items: Vec<PickerItem>) {
    if self.selected >= items.len() {
      self.selected = items.len().saturating_sub(1);
    }
    self.items = items;
  }

  /// Hide the picker
  pub fn hide(&mut self) {
    self.active = false;
    self.items.clear();
    self.selected = 0;
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(PickerEvent::Cancelled)
      }
      KeyCode::Enter | KeyCode::Char(' ') => {
        if let Some(item) = self.items.get(self.selected) {
          KeyResult::Event(PickerEvent::Selected(item.value.clone()))
        } else {
          self.hide();
          KeyResult::Event(PickerEvent::Cancelled)
        }
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.items.is_empty() {
          self.selected = (self.selected + 1) % self.items.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.items.is_empty() {
          self.selected = if self.selected == 0 {
            self.items.len() - 1
          } else {
            self.selected - 1
          };
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.items.is_empty() {
      return;
    }

    let max_label_len = self
      .items
      .iter()
      .map(|i| i.label.len())
      .max()
      .unwrap_or(10);
    let width = (max_label_len as u16 + 8).min(area.width.saturating_sub(4)).max(20);
    let height = (self.items.len() as u16 + 2).min(area.height.saturating_sub(4)).max(3);

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .items
      .iter()
      .map(|item| {
        let marker = if item.marked { "✓ " } else { "  " };
        let line = Line::from(vec![
          Span::styled(marker, Style::default().fg(Color::Green)),
          Span::styled(item.label.clone(), Style::default().fg(Color::Cyan)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));

    frame.render_stateful_widget(list, inner, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn picker_with(items: &[&str]) -> Picker {
    let mut picker = Picker::new();
    picker.show(
      "Pick",
      items.iter().map(|i| PickerItem::new(*i, *i)).collect(),
    );
    picker
  }

  #[test]
  fn test_enter_selects_current_item() {
    let mut picker = picker_with(&["a", "b", "c"]);
    picker.handle_key(key(KeyCode::Down));

    let result = picker.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Event(PickerEvent::Selected("b".to_string())));
  }

  #[test]
  fn test_navigation_wraps() {
    let mut picker = picker_with(&["a", "b"]);
    picker.handle_key(key(KeyCode::Up));
    let result = picker.handle_key(key(KeyCode::Enter));
    assert_eq!(result, KeyResult::Event(PickerEvent::Selected("b".to_string())));
  }

  #[test]
  fn test_escape_cancels_and_hides() {
    let mut picker = picker_with(&["a"]);
    let result = picker.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(PickerEvent::Cancelled));
    assert!(!picker.is_active());
  }

  #[test]
  fn test_inactive_picker_ignores_keys() {
    let mut picker = Picker::new();
    assert_eq!(picker.handle_key(key(KeyCode::Enter)), KeyResult::NotHandled);
  }
}
