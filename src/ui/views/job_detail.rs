use crate::domain::followup::{follow_up_default, now_iso, today, today_plus};
use crate::domain::template::{render as render_template, usage_interaction, Bindings};
use crate::domain::types::{Contact, Interaction, Job, JobStatus, Template};
use crate::query::Query;
use crate::store::{Store, StoreBackend};
use crate::ui::components::{ConfirmDialog, ConfirmEvent, KeyResult, Picker, PickerEvent, PickerItem};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{ContactFormView, InteractionFormView, JobFormView};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

/// Which sidebar list has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
  Contacts,
  History,
}

/// What the overlay picker is currently choosing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerMode {
  None,
  Status,
  /// Step 1 of template use: pick the template
  Template,
  /// Step 2: pick the contact bound to {{name}}
  Contact,
}

/// Rendered template awaiting confirmation
struct TemplatePreview {
  template: Template,
  text: String,
}

/// Detail view for one tracked application.
pub struct JobDetailView<B: StoreBackend + 'static> {
  store: Store<B>,
  job_id: String,
  job: Query<Option<Job>>,
  contacts: Query<Vec<Contact>>,
  interactions: Query<Vec<Interaction>>,
  templates: Query<Vec<Template>>,
  pane: Pane,
  contacts_state: ListState,
  history_state: ListState,
  picker: Picker,
  picker_mode: PickerMode,
  /// Template selected in step 1, kept while picking the contact
  pending_template: Option<Template>,
  preview: Option<TemplatePreview>,
  confirm: ConfirmDialog,
  status_line: Option<String>,
}

impl<B: StoreBackend + 'static> JobDetailView<B> {
  pub fn new(job_id: String, store: Store<B>) -> Self {
    let id = job_id.clone();
    let store_for_job = store.clone();
    let mut job = Query::new(move || {
      let jobs = store_for_job.jobs();
      let id = id.clone();
      async move { jobs.get(&id).map_err(|e| e.to_string()) }
    });
    job.fetch();

    let id = job_id.clone();
    let store_for_contacts = store.clone();
    let mut contacts = Query::new(move || {
      let contacts = store_for_contacts.contacts();
      let id = id.clone();
      async move { contacts.query("jobId", &id).map_err(|e| e.to_string()) }
    });
    contacts.fetch();

    let id = job_id.clone();
    let store_for_interactions = store.clone();
    let mut interactions = Query::new(move || {
      let interactions = store_for_interactions.interactions();
      let id = id.clone();
      async move {
        interactions
          .query("jobId", &id)
          .map(|mut list: Vec<Interaction>| {
            // Newest touchpoints first
            list.sort_by(|a, b| b.date.cmp(&a.date));
            list
          })
          .map_err(|e| e.to_string())
      }
    });
    interactions.fetch();

    let store_for_templates = store.clone();
    let mut templates = Query::new(move || {
      let templates = store_for_templates.templates();
      async move { templates.list().map_err(|e| e.to_string()) }
    });
    templates.fetch();

    Self {
      store,
      job_id,
      job,
      contacts,
      interactions,
      templates,
      pane: Pane::Contacts,
      contacts_state: ListState::default(),
      history_state: ListState::default(),
      picker: Picker::new(),
      picker_mode: PickerMode::None,
      pending_template: None,
      preview: None,
      confirm: ConfirmDialog::new(),
      status_line: None,
    }
  }

  fn current_job(&self) -> Option<&Job> {
    self.job.data().and_then(|j| j.as_ref())
  }

  fn contact_list(&self) -> &[Contact] {
    self.contacts.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn interaction_list(&self) -> &[Interaction] {
    self.interactions.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn template_list(&self) -> &[Template] {
    self.templates.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn refetch_all(&mut self) {
    self.job.refetch();
    self.contacts.refetch();
    self.interactions.refetch();
    self.templates.refetch();
  }

  fn report<T>(&mut self, result: Result<T, color_eyre::Report>, ok_message: &str) {
    match result {
      Ok(_) => self.status_line = Some(ok_message.to_string()),
      Err(e) => self.status_line = Some(format!("Error: {}", e)),
    }
  }

  /// Apply a status transition with the follow-up smart defaults.
  fn set_status(&mut self, status: JobStatus) {
    let Some(job) = self.current_job().cloned() else {
      return;
    };

    let mut patch = serde_json::json!({
      "status": status,
      "updatedAt": now_iso(),
    });
    if let Some(date) = follow_up_default(status, job.next_follow_up_date.as_deref()) {
      patch["nextFollowUpDate"] = serde_json::Value::String(date);
    }

    let result = self.store.jobs().update(&self.job_id, &patch);
    self.report(result, "Status updated");
    self.job.refetch();
  }

  /// Quick action: set the follow-up date to today + days.
  fn set_follow_up(&mut self, days: i64) {
    let patch = serde_json::json!({
      "nextFollowUpDate": today_plus(days),
      "updatedAt": now_iso(),
    });
    let result = self.store.jobs().update(&self.job_id, &patch);
    self.report(result, "Follow-up scheduled");
    self.job.refetch();
  }

  fn open_status_picker(&mut self) {
    let current = self.current_job().map(|j| j.status);
    let items = JobStatus::ALL
      .iter()
      .map(|s| PickerItem::new(s.label(), s.label()).marked(current == Some(*s)))
      .collect();
    self.picker_mode = PickerMode::Status;
    self.picker.show("Set status", items);
  }

  fn open_template_picker(&mut self) {
    let templates = self.template_list();
    if templates.is_empty() {
      self.status_line = Some("No templates yet - create one under :templates".to_string());
      return;
    }
    let items = templates
      .iter()
      .map(|t| {
        PickerItem::new(
          format!("{} ({})", t.title, t.channel.label()),
          t.id.clone(),
        )
      })
      .collect();
    self.picker_mode = PickerMode::Template;
    self.picker.show("Use template", items);
  }

  fn open_contact_picker(&mut self) {
    let mut items = vec![PickerItem::new("(no specific contact)", "")];
    items.extend(
      self
        .contact_list()
        .iter()
        .map(|c| PickerItem::new(format!("{} ({})", c.name, c.channel.label()), c.id.clone())),
    );
    self.picker_mode = PickerMode::Contact;
    self.picker.show("Contact for {{name}}", items);
  }

  fn on_picker_selected(&mut self, value: String) {
    match self.picker_mode {
      PickerMode::Status => {
        self.picker.hide();
        self.picker_mode = PickerMode::None;
        if let Some(status) = JobStatus::ALL.iter().copied().find(|s| s.label() == value) {
          self.set_status(status);
        }
      }
      PickerMode::Template => {
        self.picker.hide();
        let template = self.template_list().iter().find(|t| t.id == value).cloned();
        if let Some(template) = template {
          self.pending_template = Some(template);
          self.open_contact_picker();
        } else {
          self.picker_mode = PickerMode::None;
        }
      }
      PickerMode::Contact => {
        self.picker.hide();
        self.picker_mode = PickerMode::None;
        let contact = self.contact_list().iter().find(|c| c.id == value).cloned();
        let job = self.current_job().cloned();
        if let (Some(template), Some(job)) = (self.pending_template.take(), job) {
          let text = render_template(&template.body, &Bindings::for_job(&job, contact.as_ref()));
          self.preview = Some(TemplatePreview { template, text });
        }
      }
      PickerMode::None => {}
    }
  }

  /// Log the previewed template as an interaction.
  fn log_template_use(&mut self) {
    let Some(preview) = self.preview.take() else {
      return;
    };
    let interaction = usage_interaction(&preview.template, &self.job_id, today(), now_iso());
    let result = self.store.interactions().add(&interaction);
    self.report(result, "Message logged to history");
    self.interactions.refetch();
  }

  fn on_confirmed(&mut self, tag: String) -> ViewAction {
    match tag.as_str() {
      "delete-job" => {
        let result = self.store.jobs().delete(&self.job_id);
        // Contacts and interactions are left behind on purpose:
        // jobId is a reference, not ownership
        if result.is_ok() {
          return ViewAction::Pop;
        }
        self.report(result, "");
      }
      "delete-contact" => {
        if let Some(idx) = self.contacts_state.selected() {
          if let Some(contact) = self.contact_list().get(idx).cloned() {
            let result = self.store.contacts().delete(&contact.id);
            self.report(result, "Contact deleted");
            self.contacts.refetch();
          }
        }
      }
      "delete-interaction" => {
        if let Some(idx) = self.history_state.selected() {
          if let Some(interaction) = self.interaction_list().get(idx).cloned() {
            let result = self.store.interactions().delete(&interaction.id);
            self.report(result, "Log entry deleted");
            self.interactions.refetch();
          }
        }
      }
      _ => {}
    }
    ViewAction::None
  }

  fn delete_selected_in_pane(&mut self) {
    match self.pane {
      Pane::Contacts => {
        if self.contacts_state.selected().is_some() && !self.contact_list().is_empty() {
          self.confirm.show("delete-contact", "Delete contact?");
        }
      }
      Pane::History => {
        if self.history_state.selected().is_some() && !self.interaction_list().is_empty() {
          self.confirm.show("delete-interaction", "Delete log entry?");
        }
      }
    }
  }

  fn render_info(&self, frame: &mut Frame, area: Rect, job: &Job) {
    let today_str = today();

    let block = Block::default()
      .title(format!(" {} ", truncate(&job.company, 40)))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let follow_up = match job.next_follow_up_date.as_deref() {
      Some(date) if date < today_str.as_str() => Span::styled(
        format!("{} OVERDUE", date),
        Style::default().fg(Color::Red).bold(),
      ),
      Some(date) => Span::styled(date.to_string(), Style::default().fg(Color::Cyan)),
      None => Span::styled("none set", Style::default().fg(Color::DarkGray)),
    };

    let tags = if job.tags.is_empty() {
      Span::styled("no tags", Style::default().fg(Color::DarkGray))
    } else {
      Span::styled(job.tags.join(", "), Style::default().fg(Color::Magenta))
    };

    let mut lines = vec![
      Line::from(vec![
        Span::styled("Role:      ", Style::default().fg(Color::DarkGray)),
        Span::raw(job.role.clone()),
        Span::raw("  ·  "),
        Span::raw(job.location.clone()),
      ]),
      Line::from(vec![
        Span::styled("Status:    ", Style::default().fg(Color::DarkGray)),
        Span::styled(job.status.label(), Style::default().fg(status_color(job.status)).bold()),
      ]),
      Line::from(vec![
        Span::styled("Follow-up: ", Style::default().fg(Color::DarkGray)),
        follow_up,
      ]),
      Line::from(vec![
        Span::styled("Tags:      ", Style::default().fg(Color::DarkGray)),
        tags,
      ]),
    ];

    lines.push(Line::from(""));
    match job.notes.as_deref() {
      Some(notes) if !notes.is_empty() => {
        for note_line in notes.lines() {
          lines.push(Line::from(note_line.to_string()));
        }
      }
      _ => lines.push(Line::from(Span::styled(
        "No notes",
        Style::default().fg(Color::DarkGray).italic(),
      ))),
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
  }

  fn render_contacts(&mut self, frame: &mut Frame, area: Rect) {
    let contacts = self.contact_list().to_vec();
    ensure_valid_selection(&mut self.contacts_state, contacts.len());

    let focused = self.pane == Pane::Contacts;
    let border = if focused { Color::Yellow } else { Color::Blue };

    let block = Block::default()
      .title(format!(" Contacts ({}) ", contacts.len()))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    if contacts.is_empty() {
      let paragraph = Paragraph::new("No contacts yet. Press 'c' to add one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = contacts
      .iter()
      .map(|c| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<16}", truncate(&c.name, 16)),
            Style::default().fg(Color::White),
          ),
          Span::styled(
            format!("{} · {}", c.channel.label(), truncate(&c.handle, 20)),
            Style::default().fg(Color::DarkGray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let mut list = List::new(items).block(block);
    if focused {
      list = list
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    }
    frame.render_stateful_widget(list, area, &mut self.contacts_state);
  }

  fn render_history(&mut self, frame: &mut Frame, area: Rect) {
    let interactions = self.interaction_list().to_vec();
    ensure_valid_selection(&mut self.history_state, interactions.len());

    let focused = self.pane == Pane::History;
    let border = if focused { Color::Yellow } else { Color::Blue };

    let block = Block::default()
      .title(format!(" History ({}) ", interactions.len()))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    if interactions.is_empty() {
      let paragraph = Paragraph::new("No interactions yet. Press 'l' to log one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = interactions
      .iter()
      .map(|i| {
        let notes = i.notes.as_deref().unwrap_or("");
        let line = Line::from(vec![
          Span::styled(format!("{} ", i.date), Style::default().fg(Color::Cyan)),
          Span::styled(
            format!("{:<8}", i.kind.label()),
            Style::default().fg(Color::Yellow),
          ),
          Span::styled(truncate(notes, 40), Style::default().fg(Color::DarkGray)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let mut list = List::new(items).block(block);
    if focused {
      list = list
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    }
    frame.render_stateful_widget(list, area, &mut self.history_state);
  }

  fn render_preview(&self, frame: &mut Frame, area: Rect) {
    let Some(preview) = &self.preview else {
      return;
    };

    let width = (area.width * 70 / 100).clamp(40, 70);
    let height = (area.height * 60 / 100).clamp(8, 20);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .title(format!(" {} ", preview.template.title))
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = preview.text.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
      Span::styled("y", Style::default().fg(Color::Green).bold()),
      Span::styled(" log to history   ", Style::default().fg(Color::DarkGray)),
      Span::styled("Esc", Style::default().fg(Color::Cyan).bold()),
      Span::styled(" close", Style::default().fg(Color::DarkGray)),
    ]));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
  }

  fn render_status_line(&self, frame: &mut Frame, area: Rect) {
    let Some(message) = &self.status_line else {
      return;
    };
    let style = if message.starts_with("Error") {
      Style::default().fg(Color::Red)
    } else {
      Style::default().fg(Color::Green)
    };
    frame.render_widget(Paragraph::new(message.clone()).style(style), area);
  }
}

impl<B: StoreBackend + 'static> View for JobDetailView<B> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // Confirm dialog blocks everything else
    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed(tag)) => return self.on_confirmed(tag),
      KeyResult::Event(ConfirmEvent::Cancelled) => return ViewAction::None,
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    // Template preview overlay
    if self.preview.is_some() {
      match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => self.log_template_use(),
        KeyCode::Esc | KeyCode::Char('q') => self.preview = None,
        _ => {}
      }
      return ViewAction::None;
    }

    // Overlay pickers
    match self.picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Selected(value)) => {
        self.on_picker_selected(value);
        return ViewAction::None;
      }
      KeyResult::Event(PickerEvent::Cancelled) => {
        self.picker_mode = PickerMode::None;
        self.pending_template = None;
        return ViewAction::None;
      }
      KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    self.status_line = None;

    match key.code {
      KeyCode::Tab => {
        self.pane = match self.pane {
          Pane::Contacts => Pane::History,
          Pane::History => Pane::Contacts,
        };
      }
      KeyCode::Char('j') | KeyCode::Down => match self.pane {
        Pane::Contacts => self.contacts_state.select_next(),
        Pane::History => self.history_state.select_next(),
      },
      KeyCode::Char('k') | KeyCode::Up => match self.pane {
        Pane::Contacts => self.contacts_state.select_previous(),
        Pane::History => self.history_state.select_previous(),
      },
      KeyCode::Char('s') => self.open_status_picker(),
      KeyCode::Char('f') => self.set_follow_up(1),
      KeyCode::Char('w') => self.set_follow_up(7),
      KeyCode::Char('m') => self.open_template_picker(),
      KeyCode::Char('e') => {
        if let Some(job) = self.current_job().cloned() {
          return ViewAction::Push(Box::new(JobFormView::edit(self.store.clone(), job)));
        }
      }
      KeyCode::Char('c') => {
        return ViewAction::Push(Box::new(ContactFormView::new(
          self.store.clone(),
          self.job_id.clone(),
        )));
      }
      KeyCode::Char('l') => {
        return ViewAction::Push(Box::new(InteractionFormView::new(
          self.store.clone(),
          self.job_id.clone(),
        )));
      }
      KeyCode::Char('d') => {
        self.confirm.show("delete-job", "Delete this job application?");
      }
      KeyCode::Char('x') => self.delete_selected_in_pane(),
      KeyCode::Char('r') => self.refetch_all(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    if self.job.is_loading() && self.job.data().is_none() {
      let paragraph =
        Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let Some(job) = self.current_job().cloned() else {
      // Referenced record absent: render an empty state, not an error
      let paragraph = Paragraph::new("Job not found. Press 'q' to go back.")
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    };

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Status/hint line
      ])
      .split(area);

    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
      .split(rows[0]);

    self.render_info(frame, columns[0], &job);

    let sidebar = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
      .split(columns[1]);
    self.render_contacts(frame, sidebar[0]);
    self.render_history(frame, sidebar[1]);

    if self.status_line.is_some() {
      self.render_status_line(frame, rows[1]);
    } else {
      let hint = " s status  f/w follow-up  m template  e edit  c contact  l log  x delete item  d delete job";
      frame.render_widget(
        Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
        rows[1],
      );
    }

    // Overlays
    self.picker.render_overlay(frame, area);
    self.render_preview(frame, area);
    self.confirm.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self
      .current_job()
      .map(|j| truncate(&j.company, 24))
      .unwrap_or_else(|| "Job".to_string())
  }

  fn tick(&mut self) {
    self.job.poll();
    self.contacts.poll();
    self.interactions.poll();
    self.templates.poll();
  }

  fn on_resume(&mut self) {
    self.refetch_all();
  }
}
