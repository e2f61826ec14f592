use crate::domain::followup::{is_valid_date, now_iso, today};
use crate::domain::types::{Interaction, InteractionType};
use crate::store::{Store, StoreBackend};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const FIELD_DATE: usize = 0;
const FIELD_TYPE: usize = 1;
const FIELD_NOTES: usize = 2;
const FIELD_OUTCOME: usize = 3;
const FIELD_COUNT: usize = 4;

/// Form for logging a touchpoint on a job.
pub struct InteractionFormView<B: StoreBackend + 'static> {
  store: Store<B>,
  job_id: String,
  date: TextInput,
  notes: TextInput,
  outcome: TextInput,
  kind: InteractionType,
  focus: usize,
  error: Option<String>,
}

impl<B: StoreBackend + 'static> InteractionFormView<B> {
  pub fn new(store: Store<B>, job_id: String) -> Self {
    Self {
      store,
      job_id,
      date: TextInput::with_value(&today()),
      notes: TextInput::new(),
      outcome: TextInput::new(),
      kind: InteractionType::Msg,
      focus: FIELD_NOTES,
      error: None,
    }
  }

  fn cycle_kind(&mut self, direction: i32) {
    let all = InteractionType::ALL;
    let idx = all.iter().position(|k| *k == self.kind).unwrap_or(0);
    let next = (idx as i32 + direction).rem_euclid(all.len() as i32) as usize;
    self.kind = all[next];
  }

  fn submit(&mut self) -> bool {
    if !is_valid_date(self.date.value().trim()) {
      self.error = Some("Date must be YYYY-MM-DD".to_string());
      return false;
    }

    let mut interaction = Interaction::new(
      self.job_id.clone(),
      self.date.value().trim().to_string(),
      self.kind,
      now_iso(),
    );
    if !self.notes.value().trim().is_empty() {
      interaction.notes = Some(self.notes.value().trim().to_string());
    }
    if !self.outcome.value().trim().is_empty() {
      interaction.outcome = Some(self.outcome.value().trim().to_string());
    }

    match self.store.interactions().add(&interaction) {
      Ok(()) => true,
      Err(e) => {
        self.error = Some(format!("Error: {}", e));
        false
      }
    }
  }

  fn render_field(&self, frame: &mut Frame, area: Rect, index: usize, label: &str, value: &str) {
    let focused = self.focus == index;
    let label_style = if focused {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
      Span::styled(format!(" {:<10}", label), label_style),
      Span::raw(value.to_string()),
    ];
    if focused {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}

impl<B: StoreBackend + 'static> View for InteractionFormView<B> {
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

    if self.focus == FIELD_TYPE {
      match key.code {
        KeyCode::Left | KeyCode::Char('h') => self.cycle_kind(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.cycle_kind(1),
        _ => {}
      }
      return ViewAction::None;
    }

    let input = match self.focus {
      FIELD_DATE => &mut self.date,
      FIELD_OUTCOME => &mut self.outcome,
      _ => &mut self.notes,
    };
    if input.handle_key(key) == InputResult::Consumed {
      self.error = None;
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Log interaction ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // date
        Constraint::Length(1), // type
        Constraint::Length(1), // notes
        Constraint::Length(1), // outcome
        Constraint::Length(1), // spacer
        Constraint::Length(1), // error / hint
        Constraint::Min(0),
      ])
      .split(inner);

    let date = self.date.value().to_string();
    let notes = self.notes.value().to_string();
    let outcome = self.outcome.value().to_string();

    self.render_field(frame, chunks[0], FIELD_DATE, "Date *", &date);

    let kind_value = format!("< {} >", self.kind.label());
    self.render_field(frame, chunks[1], FIELD_TYPE, "Type", &kind_value);
    self.render_field(frame, chunks[2], FIELD_NOTES, "Notes", &notes);
    self.render_field(frame, chunks[3], FIELD_OUTCOME, "Outcome", &outcome);

    let message = match &self.error {
      Some(error) => {
        Line::from(Span::styled(format!(" {}", error), Style::default().fg(Color::Red)))
      }
      None => Line::from(Span::styled(
        " Tab next field  Enter save  Esc cancel  (what happened? outcome?)",
        Style::default().fg(Color::DarkGray),
      )),
    };
    frame.render_widget(Paragraph::new(message), chunks[5]);
  }

  fn breadcrumb_label(&self) -> String {
    "Log interaction".to_string()
  }

  fn wants_text_input(&self) -> bool {
    true
  }
}
