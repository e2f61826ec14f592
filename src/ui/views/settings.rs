use crate::backup;
use crate::query::Query;
use crate::store::{Store, StoreBackend};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, InputResult, KeyResult, TextInput,
};
use crate::ui::view::{View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::path::PathBuf;

/// Record counts shown in the data section
type Counts = (usize, usize, usize, usize);

/// Backup, import and reset.
pub struct SettingsView<B: StoreBackend + 'static> {
  store: Store<B>,
  counts: Query<Counts>,
  /// Path prompt shown while importing
  import_path: TextInput,
  import_prompt_open: bool,
  /// Path captured from the prompt, pending the overwrite confirmation
  pending_import: Option<PathBuf>,
  confirm: ConfirmDialog,
  status_line: Option<String>,
}

impl<B: StoreBackend + 'static> SettingsView<B> {
  pub fn new(store: Store<B>) -> Self {
    let store_for_query = store.clone();
    let mut counts = Query::new(move || {
      let store = store_for_query.clone();
      async move {
        store
          .snapshot()
          .map(|s| {
            (
              s.jobs.len(),
              s.contacts.len(),
              s.interactions.len(),
              s.templates.len(),
            )
          })
          .map_err(|e| e.to_string())
      }
    });
    counts.fetch();

    Self {
      store,
      counts,
      import_path: TextInput::new(),
      import_prompt_open: false,
      pending_import: None,
      confirm: ConfirmDialog::new(),
      status_line: None,
    }
  }

  fn export_dir() -> PathBuf {
    dirs::download_dir()
      .or_else(|| std::env::current_dir().ok())
      .unwrap_or_else(|| PathBuf::from("."))
  }

  fn export(&mut self) {
    match backup::export_to_dir(&self.store, &Self::export_dir()) {
      Ok(path) => self.status_line = Some(format!("Backup written to {}", path.display())),
      Err(e) => self.status_line = Some(format!("Error: {}", e)),
    }
  }

  fn run_import(&mut self) {
    let Some(path) = self.pending_import.take() else {
      return;
    };
    match backup::import(&self.store, &path) {
      Ok(summary) => {
        self.status_line = Some(format!(
          "Imported {} jobs, {} contacts, {} interactions, {} templates",
          summary.jobs, summary.contacts, summary.interactions, summary.templates
        ));
      }
      // Parse and storage failures land here; existing data is untouched
      Err(e) => self.status_line = Some(format!("Error: {}", e)),
    }
    self.counts.refetch();
  }

  fn run_reset(&mut self) {
    match self.store.reset() {
      Ok(()) => self.status_line = Some("All data deleted".to_string()),
      Err(e) => self.status_line = Some(format!("Error: {}", e)),
    }
    self.counts.refetch();
  }

  fn on_confirmed(&mut self, tag: String) {
    match tag.as_str() {
      "import" => self.run_import(),
      "reset" => self.run_reset(),
      _ => {}
    }
  }

  fn render_import_prompt(&self, frame: &mut Frame, area: Rect) {
    if !self.import_prompt_open {
      return;
    }

    let width = (area.width * 70 / 100).clamp(40, 80);
    let height = 3;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Backup file path ");
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let line = Line::from(vec![
      Span::raw(self.import_path.value()),
      Span::styled("_", Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
  }
}

impl<B: StoreBackend + 'static> View for SettingsView<B> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(tag)) => {
        self.on_confirmed(tag);
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.pending_import = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    if self.import_prompt_open {
      match self.import_path.handle_key(key) {
        InputResult::Submitted(path) => {
          self.import_prompt_open = false;
          let path = path.trim().to_string();
          if path.is_empty() {
            return ViewAction::None;
          }
          self.pending_import = Some(PathBuf::from(path));
          self
            .confirm
            .show("import", "Overwrite current data with this backup?");
        }
        InputResult::Cancelled => {
          self.import_prompt_open = false;
          self.import_path.clear();
        }
        _ => {}
      }
      return ViewAction::None;
    }

    self.status_line = None;

    match key.code {
      KeyCode::Char('e') => self.export(),
      KeyCode::Char('i') => {
        self.import_path.clear();
        self.import_prompt_open = true;
      }
      KeyCode::Char('R') => {
        self
          .confirm
          .show("reset", "Permanently delete ALL data?");
      }
      KeyCode::Char('r') => self.counts.refetch(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Settings ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (jobs, contacts, interactions, templates) =
      self.counts.data().copied().unwrap_or((0, 0, 0, 0));

    let mut lines = vec![
      Line::from(""),
      Line::from(Span::styled(
        " Data",
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(format!(
        "   {} jobs · {} contacts · {} interactions · {} templates",
        jobs, contacts, interactions, templates
      )),
      Line::from(""),
      Line::from(Span::styled(
        " Backup",
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(vec![
        Span::styled("   e ", Style::default().fg(Color::Yellow).bold()),
        Span::raw("export all data to a JSON backup file"),
      ]),
      Line::from(vec![
        Span::styled("   i ", Style::default().fg(Color::Yellow).bold()),
        Span::raw("import a backup file (overwrites current data)"),
      ]),
      Line::from(""),
      Line::from(Span::styled(
        " Danger zone",
        Style::default().fg(Color::Red).bold(),
      )),
      Line::from(vec![
        Span::styled("   R ", Style::default().fg(Color::Red).bold()),
        Span::raw("reset the application (delete everything)"),
      ]),
      Line::from(""),
    ];

    if let Some(message) = &self.status_line {
      let style = if message.starts_with("Error") {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::Green)
      };
      lines.push(Line::from(Span::styled(format!(" {}", message), style)));
    }

    frame.render_widget(Paragraph::new(lines), inner);

    self.render_import_prompt(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Settings".to_string()
  }

  fn tick(&mut self) {
    self.counts.poll();
  }

  fn on_resume(&mut self) {
    self.counts.refetch();
  }

  fn wants_text_input(&self) -> bool {
    self.import_prompt_open
  }
}
