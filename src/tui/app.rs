//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Submitting the form to the assessment service

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::forest::RandomForestClassifier;
use crate::application::AssessmentService;
use crate::config::AppConfig;
use crate::ports::RiskClassifier;

use super::ui::{
    form::{render_form, FormState},
    reference::render_reference,
    render_disclaimer,
    result::{render_result, ResultState},
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Result,
}

/// Main application state
pub struct App<C = RandomForestClassifier>
where
    C: RiskClassifier,
{
    screen: Screen,
    should_quit: bool,
    service: AssessmentService<C>,
    form_state: FormState,
    result_state: Option<ResultState>,
    show_reference: bool,
}

impl App<RandomForestClassifier> {
    /// Create the application, loading the model bundle named by `config`.
    ///
    /// # Errors
    /// Returns error if the bundle cannot be loaded or verified.
    pub fn new(config: &AppConfig) -> Result<Self> {
        if !config.model_dir.exists() {
            anyhow::bail!(
                "Model directory not found at {:?}. Set CARDIORENAL_MODEL_DIR to a directory containing model.json and feature_names.json.",
                config.model_dir
            );
        }

        // Refuse to start if the model cannot be loaded and verified.
        let service = AssessmentService::from_config(config)
            .with_context(|| format!("Failed to load model from {:?}", config.model_dir))?;

        Ok(Self::with_service(service))
    }
}

impl<C> App<C>
where
    C: RiskClassifier,
{
    /// Create the application around an already-built service.
    pub fn with_service(service: AssessmentService<C>) -> Self {
        Self {
            screen: Screen::Form,
            should_quit: false,
            service,
            form_state: FormState::default(),
            result_state: None,
            show_reference: false,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let area = f.area();
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = if self.show_reference {
                    let columns = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                        .split(rows[0]);
                    render_reference(f, columns[1]);
                    columns[0]
                } else {
                    rows[0]
                };

                match (self.screen, &self.result_state) {
                    (Screen::Result, Some(state)) => render_result(f, content_area, state),
                    _ => render_form(f, content_area, &self.form_state),
                }

                render_disclaimer(f, rows[1]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.cycle_choice(-1);
            }
            KeyCode::Right => {
                self.form_state.cycle_choice(1);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.show_reference = !self.show_reference;
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.result_state = None;
                self.form_state = FormState::default();
                self.screen = Screen::Form;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.show_reference = !self.show_reference;
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let input = match self.form_state.to_raw_input() {
            Ok(input) => input,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        match self.service.assess(&input) {
            Ok(assessment) => {
                self.result_state = Some(ResultState::Complete { assessment });
                self.screen = Screen::Result;
                self.form_state.clear_sensitive();
            }
            // Keep the entered values so the clinician can correct the field.
            Err(e) if e.is_user_correctable() => {
                self.form_state.error_message = Some(e.to_string());
            }
            Err(e) => {
                self.result_state = Some(ResultState::Error {
                    message: e.user_message(),
                });
                self.screen = Screen::Result;
                self.form_state.clear_sensitive();
            }
        }
    }
}
