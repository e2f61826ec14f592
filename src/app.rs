use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::shell::{self, HttpFetcher, ShellController, SqliteAssets};
use crate::store::{Store, StoreBackend};
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{DashboardView, JobFormView, JobListView, SettingsView, TemplatesView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

/// Main application: view stack, global command palette, event loop.
pub struct App<B: StoreBackend + 'static> {
  config: Config,
  store: Store<B>,
  /// Taken by the startup sync task on run()
  shell: Option<ShellController<HttpFetcher, SqliteAssets>>,
  views: Vec<Box<dyn View>>,
  command: CommandInput,
  /// None until the first shell sync resolves
  online: Option<bool>,
  should_quit: bool,
}

impl<B: StoreBackend + 'static> App<B> {
  pub fn new(
    config: Config,
    store: Store<B>,
    shell: Option<ShellController<HttpFetcher, SqliteAssets>>,
  ) -> Self {
    let root: Box<dyn View> = Box::new(DashboardView::new(store.clone()));
    Self {
      config,
      store,
      shell,
      views: vec![root],
      command: CommandInput::new(),
      online: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));

    // Kick off the shell sync in the background; its outcome drives the
    // offline banner
    if let Some(controller) = self.shell.take() {
      let tx = events.sender();
      tokio::spawn(async move {
        let online = match shell::sync(&controller).await {
          Ok(()) => true,
          Err(err) => {
            info!(%err, "shell sync failed, assuming offline");
            false
          }
        };
        let _ = tx.send(Event::Online(online));
      });
    }

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Header
        Constraint::Min(1),    // Main content
        Constraint::Length(1), // Footer / breadcrumb
      ])
      .split(frame.area());

    draw_header(frame, chunks[0], self.config.title(), self.online);

    if let Some(view) = self.views.last_mut() {
      view.render(frame, chunks[1]);
    }

    let breadcrumb: Vec<String> = self.views.iter().map(|v| v.breadcrumb_label()).collect();
    draw_footer(frame, chunks[2], &breadcrumb);

    // Command overlay sits above everything
    self.command.render_overlay(frame, chunks[1]);
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {
        if let Some(view) = self.views.last_mut() {
          view.tick();
        }
      }
      Event::Online(online) => {
        self.online = Some(online);
      }
    }
  }

  fn handle_key(&mut self, key: crossterm::event::KeyEvent) {
    // Ctrl-C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // Command palette gets first dibs (and handles ':' activation),
    // except while the top view is capturing free text
    let capturing = self
      .views
      .last()
      .map(|v| v.wants_text_input())
      .unwrap_or(false);
    if !capturing {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::Event(CommandEvent::Cancelled) => return,
        KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    let action = match self.views.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };

    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.views.push(view),
      ViewAction::Pop => {
        if self.views.len() > 1 {
          self.views.pop();
          if let Some(view) = self.views.last_mut() {
            view.on_resume();
          }
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "dashboard" => self.set_root(Box::new(DashboardView::new(self.store.clone()))),
      "jobs" => self.set_root(Box::new(JobListView::new(self.store.clone()))),
      "templates" => self.set_root(Box::new(TemplatesView::new(self.store.clone()))),
      "settings" => self.set_root(Box::new(SettingsView::new(self.store.clone()))),
      "new" => self.views.push(Box::new(JobFormView::create(self.store.clone()))),
      "quit" => self.should_quit = true,
      _ => {
        // Unknown command
      }
    }
  }

  fn set_root(&mut self, view: Box<dyn View>) {
    self.views.clear();
    self.views.push(view);
  }
}
