use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Events emitted by the confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmEvent {
  /// User confirmed the pending action (identified by its tag)
  Confirmed(String),
  /// User backed out
  Cancelled,
}

/// Blocking yes/no dialog for destructive actions (delete, import
/// overwrite, reset). Nothing else receives input while it is open.
#[derive(Debug, Clone, Default)]
pub struct ConfirmDialog {
  active: bool,
  message: String,
  /// Caller-supplied tag returned on confirmation, so one dialog instance
  /// can serve several actions
  tag: String,
}

impl ConfirmDialog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Open the dialog.
  pub fn show(&mut self, tag: impl Into<String>, message: impl Into<String>) {
    self.active = true;
    self.tag = tag.into();
    self.message = message.into();
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.message.clear();
    self.tag.clear();
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
        let tag = self.tag.clone();
        self.hide();
        KeyResult::Event(ConfirmEvent::Confirmed(tag))
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the dialog overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 50 / 100).clamp(30, 56);
    let height = 5;

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let text = vec![
      Line::from(self.message.clone()),
      Line::from(""),
      Line::from(vec![
        Span::styled("y", Style::default().fg(Color::Red).bold()),
        Span::styled(" confirm   ", Style::default().fg(Color::DarkGray)),
        Span::styled("n", Style::default().fg(Color::Cyan).bold()),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_confirm_returns_tag() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("delete-job", "Delete this job application?");

    let result = dialog.handle_key(key(KeyCode::Char('y')));
    assert_eq!(
      result,
      KeyResult::Event(ConfirmEvent::Confirmed("delete-job".to_string()))
    );
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_cancel_closes_without_action() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("reset", "Wipe all data?");

    let result = dialog.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(ConfirmEvent::Cancelled));
    assert!(!dialog.is_active());
  }

  #[test]
  fn test_other_keys_are_swallowed_while_open() {
    let mut dialog = ConfirmDialog::new();
    dialog.show("reset", "Wipe all data?");

    // Keys must not leak through to the view underneath
    assert_eq!(dialog.handle_key(key(KeyCode::Char('d'))), KeyResult::Handled);
    assert!(dialog.is_active());
  }
}
