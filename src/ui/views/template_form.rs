use crate::domain::followup::now_iso;
use crate::domain::types::{ContactChannel, Template};
use crate::store::{Store, StoreBackend};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

const FIELD_TITLE: usize = 0;
const FIELD_CHANNEL: usize = 1;
const FIELD_BODY: usize = 2;
const FIELD_COUNT: usize = 3;

/// Form for creating a message template.
pub struct TemplateFormView<B: StoreBackend + 'static> {
  store: Store<B>,
  title: TextInput,
  body: TextInput,
  channel: ContactChannel,
  focus: usize,
  error: Option<String>,
}

impl<B: StoreBackend + 'static> TemplateFormView<B> {
  pub fn new(store: Store<B>) -> Self {
    Self {
      store,
      title: TextInput::new(),
      body: TextInput::new(),
      channel: ContactChannel::Whatsapp,
      focus: FIELD_TITLE,
      error: None,
    }
  }

  fn cycle_channel(&mut self, direction: i32) {
    let all = ContactChannel::ALL;
    let idx = all.iter().position(|c| *c == self.channel).unwrap_or(0);
    let next = (idx as i32 + direction).rem_euclid(all.len() as i32) as usize;
    self.channel = all[next];
  }

  fn submit(&mut self) -> bool {
    if self.title.value().trim().is_empty() || self.body.value().trim().is_empty() {
      self.error = Some("Title and body are required".to_string());
      return false;
    }

    let template = Template::new(
      self.title.value().trim().to_string(),
      self.channel,
      self.body.value().trim().to_string(),
      now_iso(),
    );

    match self.store.templates().add(&template) {
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

impl<B: StoreBackend + 'static> View for TemplateFormView<B> {
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

    if self.focus == FIELD_CHANNEL {
      match key.code {
        KeyCode::Left | KeyCode::Char('h') => self.cycle_channel(-1),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.cycle_channel(1),
        _ => {}
      }
      return ViewAction::None;
    }

    let input = match self.focus {
      FIELD_TITLE => &mut self.title,
      _ => &mut self.body,
    };
    if input.handle_key(key) == InputResult::Consumed {
      self.error = None;
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" New template ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // title
        Constraint::Length(1), // channel
        Constraint::Length(1), // body
        Constraint::Length(1), // spacer
        Constraint::Length(1), // error / hint
        Constraint::Min(0),
      ])
      .split(inner);

    let title = self.title.value().to_string();
    let body = self.body.value().to_string();

    self.render_field(frame, chunks[0], FIELD_TITLE, "Title *", &title);

    let channel_value = format!("< {} >", self.channel.label());
    self.render_field(frame, chunks[1], FIELD_CHANNEL, "Channel", &channel_value);
    self.render_field(frame, chunks[2], FIELD_BODY, "Body *", &body);

    let message = match &self.error {
      Some(error) => {
        Line::from(Span::styled(format!(" {}", error), Style::default().fg(Color::Red)))
      }
      None => Line::from(Span::styled(
        " Placeholders: {{role}} {{company}} {{location}} {{name}}",
        Style::default().fg(Color::DarkGray),
      )),
    };
    frame.render_widget(Paragraph::new(message), chunks[4]);
  }

  fn breadcrumb_label(&self) -> String {
    "New template".to_string()
  }

  fn wants_text_input(&self) -> bool {
    true
  }
}
