use crate::domain::filter::{all_tags, JobFilter, Urgency};
use crate::domain::followup::today;
use crate::domain::types::{Job, JobStatus};
use crate::query::{Query, QueryState};
use crate::store::{Store, StoreBackend};
use crate::ui::components::{
  KeyResult, Picker, PickerEvent, PickerItem, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{follow_up_label, status_color, truncate};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{JobDetailView, JobFormView};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Which selection the overlay picker is currently serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerMode {
  None,
  Status,
  Tags,
}

/// Filterable list of tracked applications.
pub struct JobListView<B: StoreBackend + 'static> {
  store: Store<B>,
  query: Query<Vec<Job>>,
  filter: JobFilter,
  list_state: ListState,
  search: SearchInput,
  picker: Picker,
  picker_mode: PickerMode,
}

impl<B: StoreBackend + 'static> JobListView<B> {
  pub fn new(store: Store<B>) -> Self {
    let store_for_query = store.clone();
    let mut query = Query::new(move || {
      let jobs = store_for_query.jobs();
      async move { jobs.list().map_err(|e| e.to_string()) }
    });
    query.fetch();

    Self {
      store,
      query,
      filter: JobFilter::default(),
      list_state: ListState::default(),
      search: SearchInput::new(),
      picker: Picker::new(),
      picker_mode: PickerMode::None,
    }
  }

  fn all_jobs(&self) -> &[Job] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn filtered_jobs(&self) -> Vec<Job> {
    self.filter.apply(self.all_jobs())
  }

  fn open_status_picker(&mut self) {
    let mut items = vec![PickerItem::new("All statuses", "ALL")];
    items.extend(
      JobStatus::ALL
        .iter()
        .map(|s| PickerItem::new(s.label(), s.label()).marked(self.filter.status == Some(*s))),
    );
    self.picker_mode = PickerMode::Status;
    self.picker.show("Filter by status", items);
  }

  fn open_tag_picker(&mut self) {
    let tags = all_tags(self.all_jobs());
    if tags.is_empty() {
      return;
    }
    let items = self.tag_items(&tags);
    self.picker_mode = PickerMode::Tags;
    self.picker.show("Filter by tags (toggle)", items);
  }

  fn tag_items(&self, tags: &[String]) -> Vec<PickerItem> {
    tags
      .iter()
      .map(|t| PickerItem::new(t.clone(), t.clone()).marked(self.filter.tags.contains(t)))
      .collect()
  }

  fn on_picker_selected(&mut self, value: String) {
    match self.picker_mode {
      PickerMode::Status => {
        self.filter.status = JobStatus::ALL.iter().copied().find(|s| s.label() == value);
        self.picker.hide();
        self.picker_mode = PickerMode::None;
      }
      PickerMode::Tags => {
        // Toggle and keep the picker open for multi-select
        self.filter.toggle_tag(&value);
        let tags = all_tags(self.all_jobs());
        let items = self.tag_items(&tags);
        self.picker.set_items(items);
      }
      PickerMode::None => {}
    }
  }

  fn cycle_urgency(&mut self) {
    self.filter.urgency = match self.filter.urgency {
      None => Some(Urgency::Overdue),
      Some(Urgency::Overdue) => Some(Urgency::Upcoming),
      Some(Urgency::Upcoming) => Some(Urgency::NoDate),
      Some(Urgency::NoDate) => None,
    };
  }

  fn filter_summary(&self) -> Line<'static> {
    let mut spans = vec![Span::styled(" Filters: ", Style::default().fg(Color::DarkGray))];

    let mut parts: Vec<String> = Vec::new();
    if let Some(status) = self.filter.status {
      parts.push(format!("status={}", status.label()));
    }
    if let Some(urgency) = self.filter.urgency {
      parts.push(format!("due={}", urgency.label()));
    }
    if !self.filter.tags.is_empty() {
      let tags: Vec<&str> = self.filter.tags.iter().map(String::as_str).collect();
      parts.push(format!("tags={}", tags.join("+")));
    }
    if !self.filter.text_query.trim().is_empty() {
      parts.push(format!("\"{}\"", self.filter.text_query.trim()));
    }

    if parts.is_empty() {
      spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
    } else {
      spans.push(Span::styled(
        parts.join("  "),
        Style::default().fg(Color::Yellow),
      ));
    }

    spans.push(Span::styled(
      "   (s status  u due  t tags  / search  c clear)",
      Style::default().fg(Color::DarkGray),
    ));
    Line::from(spans)
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let today_str = today();
    let jobs = self.filtered_jobs();
    ensure_valid_selection(&mut self.list_state, jobs.len());

    let title = match self.query.state() {
      QueryState::Loading => " Jobs (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Jobs (error: {}) ", e),
      _ => format!(" Jobs ({}/{}) ", jobs.len(), self.all_jobs().len()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if jobs.is_empty() && !self.query.is_loading() {
      let content = if self.all_jobs().is_empty() {
        "No jobs yet. Press 'n' to track your first application."
      } else {
        "No jobs match the current filters. Press 'c' to clear them."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = jobs
      .iter()
      .map(|job| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&job.company, 24)),
            Style::default().fg(Color::White),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<20}", truncate(&job.role, 20)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<10}", job.status.label()),
            Style::default().fg(status_color(job.status)),
          ),
          Span::raw(" "),
          Span::styled(
            follow_up_label(job.next_follow_up_date.as_deref(), &today_str),
            Style::default().fg(Color::Cyan),
          ),
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
}

impl<B: StoreBackend + 'static> View for JobListView<B> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Overlay picker gets first dibs
    match self.picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Selected(value)) => {
        self.on_picker_selected(value);
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) => {
        self.picker_mode = PickerMode::None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    // Then the search overlay (also handles the '/' activation key)
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.filter.text_query = query;
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) => return ViewAction::None,
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

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
      KeyCode::Char('s') => self.open_status_picker(),
      KeyCode::Char('u') => self.cycle_urgency(),
      KeyCode::Char('t') => self.open_tag_picker(),
      KeyCode::Char('c') => {
        self.filter = JobFilter::default();
      }
      KeyCode::Char('n') => {
        return ViewAction::Push(Box::new(JobFormView::create(self.store.clone())));
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(job) = self.filtered_jobs().get(idx) {
            return ViewAction::Push(Box::new(JobDetailView::new(
              job.id.clone(),
              self.store.clone(),
            )));
          }
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Filter summary
        Constraint::Min(1),    // List
      ])
      .split(area);

    frame.render_widget(Paragraph::new(self.filter_summary()), chunks[0]);
    self.render_list(frame, chunks[1]);

    // Overlays
    self.search.render_overlay(frame, area);
    self.picker.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    if self.filter.is_empty() {
      "Jobs".to_string()
    } else {
      "Jobs (filtered)".to_string()
    }
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn on_resume(&mut self) {
    self.query.refetch();
  }

  fn wants_text_input(&self) -> bool {
    self.search.is_active()
  }
}
