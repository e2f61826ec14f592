use crate::domain::followup::{is_valid_date, now_iso};
use crate::domain::types::{Job, JobStatus};
use crate::store::{Store, StoreBackend};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const FIELD_COMPANY: usize = 0;
const FIELD_ROLE: usize = 1;
const FIELD_LOCATION: usize = 2;
const FIELD_STATUS: usize = 3;
const FIELD_TAGS: usize = 4;
const FIELD_FOLLOW_UP: usize = 5;
const FIELD_NOTES: usize = 6;
const FIELD_COUNT: usize = 7;

/// Create/edit form for a job record.
pub struct JobFormView<B: StoreBackend + 'static> {
  store: Store<B>,
  /// Set when editing; create otherwise
  existing: Option<Job>,
  company: TextInput,
  role: TextInput,
  location: TextInput,
  tags: TextInput,
  follow_up: TextInput,
  notes: TextInput,
  status: JobStatus,
  focus: usize,
  error: Option<String>,
}

impl<B: StoreBackend + 'static> JobFormView<B> {
  pub fn create(store: Store<B>) -> Self {
    Self {
      store,
      existing: None,
      company: TextInput::new(),
      role: TextInput::new(),
      location: TextInput::new(),
      tags: TextInput::new(),
      follow_up: TextInput::new(),
      notes: TextInput::new(),
      status: JobStatus::ToApply,
      focus: FIELD_COMPANY,
      error: None,
    }
  }

  pub fn edit(store: Store<B>, job: Job) -> Self {
    Self {
      store,
      company: TextInput::with_value(&job.company),
      role: TextInput::with_value(&job.role),
      location: TextInput::with_value(&job.location),
      tags: TextInput::with_value(&job.tags.join(", ")),
      follow_up: TextInput::with_value(job.next_follow_up_date.as_deref().unwrap_or("")),
      notes: TextInput::with_value(job.notes.as_deref().unwrap_or("")),
      status: job.status,
      focus: FIELD_COMPANY,
      error: None,
      existing: Some(job),
    }
  }

  fn focused_input(&mut self) -> Option<&mut TextInput> {
    match self.focus {
      FIELD_COMPANY => Some(&mut self.company),
      FIELD_ROLE => Some(&mut self.role),
      FIELD_LOCATION => Some(&mut self.location),
      FIELD_TAGS => Some(&mut self.tags),
      FIELD_FOLLOW_UP => Some(&mut self.follow_up),
      FIELD_NOTES => Some(&mut self.notes),
      _ => None, // status row
    }
  }

  fn cycle_status(&mut self, direction: i32) {
    let all = JobStatus::ALL;
    let idx = all.iter().position(|s| *s == self.status).unwrap_or(0);
    let next = (idx as i32 + direction).rem_euclid(all.len() as i32) as usize;
    self.status = all[next];
  }

  fn parsed_tags(&self) -> Vec<String> {
    self
      .tags
      .value()
      .split(',')
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(String::from)
      .collect()
  }

  /// Validate and persist. Returns true when the form is done.
  fn submit(&mut self) -> bool {
    // Required fields block submission; input is not persisted
    if self.company.value().trim().is_empty() || self.role.value().trim().is_empty() {
      self.error = Some("Company and role are required".to_string());
      return false;
    }
    let follow_up = self.follow_up.value().trim();
    if !follow_up.is_empty() && !is_valid_date(follow_up) {
      self.error = Some("Follow-up date must be YYYY-MM-DD".to_string());
      return false;
    }

    let result = match &self.existing {
      Some(job) => {
        let patch = serde_json::json!({
          "company": self.company.value().trim(),
          "role": self.role.value().trim(),
          "location": self.location.value().trim(),
          "status": self.status,
          "tags": self.parsed_tags(),
          "nextFollowUpDate": if follow_up.is_empty() {
            serde_json::Value::Null
          } else {
            serde_json::Value::String(follow_up.to_string())
          },
          "notes": if self.notes.value().trim().is_empty() {
            serde_json::Value::Null
          } else {
            serde_json::Value::String(self.notes.value().trim().to_string())
          },
          "updatedAt": now_iso(),
        });
        self.store.jobs().update(&job.id, &patch).map(|_| ())
      }
      None => {
        let mut job = Job::new(
          self.company.value().trim().to_string(),
          self.role.value().trim().to_string(),
          self.location.value().trim().to_string(),
          now_iso(),
        );
        job.status = self.status;
        job.tags = self.parsed_tags();
        if !follow_up.is_empty() {
          job.next_follow_up_date = Some(follow_up.to_string());
        }
        if !self.notes.value().trim().is_empty() {
          job.notes = Some(self.notes.value().trim().to_string());
        }
        self.store.jobs().add(&job)
      }
    };

    match result {
      Ok(()) => true,
      Err(e) => {
        self.error = Some(format!("Error: {}", e));
        false
      }
    }
  }

  fn render_field(
    &self,
    frame: &mut Frame,
    area: Rect,
    index: usize,
    label: &str,
    value: &str,
  ) {
    let focused = self.focus == index;
    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
      Span::styled(format!(" {:<12}", label), label_style),
      Span::raw(value.to_string()),
    ];
    if focused {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

impl<B: StoreBackend + 'static> View for JobFormView<B> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Esc => return ViewAction::Pop,
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % FIELD_COUNT;
        return ViewAction::None;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = if self.focus == 0 {
          FIELD_COUNT - 1
        } else {
          self.focus - 1
        };
        return ViewAction::None;
      }
      KeyCode::Enter => {
        if self.submit() {
          return ViewAction::Pop;
        }
        return ViewAction::None;
      }
      _ => {}
    }

    if self.focus == FIELD_STATUS {
      match key.code {
        KeyCode::Left | KeyCode::Char('h') => self.cycle_status(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.cycle_status(1),
        _ => {}
      }
      return ViewAction::None;
    }

    if let Some(input) = self.focused_input() {
      if input.handle_key(key) == InputResult::Consumed {
        self.error = None;
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.existing.is_some() {
      " Edit job "
    } else {
      " New job "
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // company
        Constraint::Length(1), // role
        Constraint::Length(1), // location
        Constraint::Length(1), // status
        Constraint::Length(1), // tags
        Constraint::Length(1), // follow-up
        Constraint::Length(1), // notes
        Constraint::Length(1), // spacer
        Constraint::Length(1), // error / hint
        Constraint::Min(0),
      ])
      .split(inner);

    let company = self.company.value().to_string();
    let role = self.role.value().to_string();
    let location = self.location.value().to_string();
    let tags = self.tags.value().to_string();
    let follow_up = self.follow_up.value().to_string();
    let notes = self.notes.value().to_string();

    self.render_field(frame, chunks[0], FIELD_COMPANY, "Company *", &company);
    self.render_field(frame, chunks[1], FIELD_ROLE, "Role *", &role);
    self.render_field(frame, chunks[2], FIELD_LOCATION, "Location", &location);

    let status_value = format!("< {} >", self.status.label());
    self.render_field(frame, chunks[3], FIELD_STATUS, "Status", &status_value);

    self.render_field(frame, chunks[4], FIELD_TAGS, "Tags", &tags);
    self.render_field(frame, chunks[5], FIELD_FOLLOW_UP, "Follow-up", &follow_up);
    self.render_field(frame, chunks[6], FIELD_NOTES, "Notes", &notes);

    let message = match &self.error {
      Some(error) => {
        Line::from(Span::styled(format!(" {}", error), Style::default().fg(Color::Red)))
      }
      None => Line::from(Span::styled(
        " Tab next field  Enter save  Esc cancel  (tags comma-separated, follow-up YYYY-MM-DD)",
        Style::default().fg(Color::DarkGray),
      )),
    };
    frame.render_widget(Paragraph::new(message), chunks[8]);
  }

  fn breadcrumb_label(&self) -> String {
    if self.existing.is_some() {
      "Edit".to_string()
    } else {
      "New job".to_string()
    }
  }

  fn wants_text_input(&self) -> bool {
    true
  }
}
