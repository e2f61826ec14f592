use crate::domain::followup::{follow_up_buckets, status_counts, today};
use crate::domain::types::Job;
use crate::query::{Query, QueryState};
use crate::store::{Store, StoreBackend};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::JobDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Overview: KPI tiles plus the follow-ups that need action today.
pub struct DashboardView<B: StoreBackend + 'static> {
  store: Store<B>,
  query: Query<Vec<Job>>,
  list_state: ListState,
}

impl<B: StoreBackend + 'static> DashboardView<B> {
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
      list_state: ListState::default(),
    }
  }

  fn jobs(&self) -> &[Job] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  /// Overdue first, then due today - the "action required" list.
  fn action_jobs(&self) -> Vec<Job> {
    let buckets = follow_up_buckets(self.jobs(), &today());
    let mut jobs = buckets.overdue;
    jobs.extend(buckets.due_today);
    jobs
  }

  fn render_kpis(&self, frame: &mut Frame, area: Rect) {
    let counts = status_counts(self.jobs());

    let tiles = [
      ("To apply", counts.to_apply),
      ("Applied", counts.applied),
      ("Interviews", counts.interview),
      ("Total", counts.total),
    ];

    let chunks = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Ratio(1, 4); 4])
      .split(area);

    for ((label, value), chunk) in tiles.iter().zip(chunks.iter()) {
      let text = vec![
        Line::from(Span::styled(
          value.to_string(),
          Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
          *label,
          Style::default().fg(Color::DarkGray),
        )),
      ];
      let tile = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
      frame.render_widget(tile, *chunk);
    }
  }

  fn render_actions(&mut self, frame: &mut Frame, area: Rect) {
    let today_str = today();
    let actions = self.action_jobs();
    ensure_valid_selection(&mut self.list_state, actions.len());

    let title = match self.query.state() {
      QueryState::Loading => " Action required (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Action required (error: {}) ", e),
      _ => format!(" Action required ({}) ", actions.len()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if actions.is_empty() {
      let paragraph = Paragraph::new("All caught up! No follow-ups due today.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = actions
      .iter()
      .map(|job| {
        let date = job.next_follow_up_date.as_deref().unwrap_or("-");
        let overdue = date < today_str.as_str();
        let badge = if overdue { "OVERDUE " } else { "today   " };
        let badge_color = if overdue { Color::Red } else { Color::Yellow };

        let line = Line::from(vec![
          Span::styled(badge, Style::default().fg(badge_color).bold()),
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
          Span::styled(job.status.label(), Style::default().fg(status_color(job.status))),
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

impl<B: StoreBackend + 'static> View for DashboardView<B> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
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
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(job) = self.action_jobs().get(idx) {
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
        Constraint::Length(4), // KPI tiles
        Constraint::Min(1),    // Action list
      ])
      .split(area);

    self.render_kpis(frame, chunks[0]);
    self.render_actions(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Dashboard".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn on_resume(&mut self) {
    self.query.refetch();
  }
}
