use crate::domain::types::Template;
use crate::query::{Query, QueryState};
use crate::store::{Store, StoreBackend};
use crate::ui::components::{ConfirmDialog, ConfirmEvent, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::TemplateFormView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// List of reusable message templates, with the selected body previewed.
pub struct TemplatesView<B: StoreBackend + 'static> {
  store: Store<B>,
  query: Query<Vec<Template>>,
  list_state: ListState,
  confirm: ConfirmDialog,
  status_line: Option<String>,
}

impl<B: StoreBackend + 'static> TemplatesView<B> {
  pub fn new(store: Store<B>) -> Self {
    let store_for_query = store.clone();
    let mut query = Query::new(move || {
      let templates = store_for_query.templates();
      async move { templates.list().map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      store,
      query,
      list_state: ListState::default(),
      confirm: ConfirmDialog::new(),
      status_line: None,
    }
  }

  fn templates(&self) -> &[Template] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn delete_selected(&mut self) {
    if let Some(idx) = self.list_state.selected() {
      if let Some(template) = self.templates().get(idx).cloned() {
        match self.store.templates().delete(&template.id) {
          Ok(()) => self.status_line = Some(format!("Deleted '{}'", template.title)),
          Err(e) => self.status_line = Some(format!("Error: {}", e)),
        }
        self.query.refetch();
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let templates = self.templates().to_vec();
    ensure_valid_selection(&mut self.list_state, templates.len());

    let title = match self.query.state() {
      QueryState::Loading => " Templates (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Templates (error: {}) ", e),
      _ => format!(" Templates ({}) ", templates.len()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if templates.is_empty() && !self.query.is_loading() {
      let paragraph = Paragraph::new("No templates yet. Press 'n' to create one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = templates
      .iter()
      .map(|t| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<28}", truncate(&t.title, 28)),
            Style::default().fg(Color::White),
          ),
          Span::styled(t.channel.label(), Style::default().fg(Color::Yellow)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_preview(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Body ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let body = self
      .list_state
      .selected()
      .and_then(|idx| self.templates().get(idx))
      .map(|t| t.body.clone())
      .unwrap_or_default();

    let paragraph = Paragraph::new(body).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }
}

impl<B: StoreBackend + 'static> View for TemplatesView<B> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(_)) => {
        self.delete_selected();
        return ViewAction::None;
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => return ViewAction::None,
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    self.status_line = None;

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
      }
      KeyCode::Char('r') => {
        self.query.refetch();
      }
      KeyCode::Char('n') => {
        return ViewAction::Push(Box::new(TemplateFormView::new(self.store.clone())));
      }
      KeyCode::Char('d') | KeyCode::Char('x') => {
        if !self.templates().is_empty() {
          self.confirm.show("delete-template", "Delete this template?");
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Percentage(60), // List
        Constraint::Percentage(40), // Body preview
        Constraint::Length(1),      // Status line
      ])
      .split(area);

    self.render_list(frame, rows[0]);
    self.render_preview(frame, rows[1]);

    if let Some(message) = &self.status_line {
      let style = if message.starts_with("Error") {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::Green)
      };
      frame.render_widget(Paragraph::new(message.clone()).style(style), rows[2]);
    } else {
      frame.render_widget(
        Paragraph::new(" n new  d delete  j/k browse")
          .style(Style::default().fg(Color::DarkGray)),
        rows[2],
      );
    }

    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Templates".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn on_resume(&mut self) {
    self.query.refetch();
  }
}
