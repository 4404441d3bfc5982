//! Main TUI application state and logic

use std::sync::Arc;

use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{error, info};

use super::screens::{DashboardScreen, PatientFormScreen};
use super::traits::{Navigable, ScreenAction};
use super::ui::centered_rect;
use crate::api::PatientApi;
use crate::config::Config;
use crate::models::Patient;
use crate::registry::{DeleteOutcome, SubmitError};

/// Navigation target. The form route may carry the record to edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Dashboard,
    PatientForm(Option<Patient>),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::PatientForm(_) => "/patient-form",
        }
    }

    /// Resolve a path given on the command line; no record is attached
    pub fn from_path(path: &str) -> Result<Self> {
        match path.trim_end_matches('/') {
            "" => Ok(Route::Dashboard),
            "/patient-form" | "patient-form" => Ok(Route::PatientForm(None)),
            other => bail!("Unknown route: {} (expected / or /patient-form)", other),
        }
    }
}

/// Screen currently mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
}

/// Main TUI application state
pub struct App {
    pub current_screen: Screen,
    pub config: Config,
    api: Arc<dyn PatientApi>,

    pub dashboard: DashboardScreen,
    /// Present only while the form route is mounted
    pub form: Option<PatientFormScreen>,

    pub should_quit: bool,
    pub show_help_popup: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn PatientApi>) -> Self {
        Self {
            current_screen: Screen::Dashboard,
            config,
            api,
            dashboard: DashboardScreen::new(),
            form: None,
            should_quit: false,
            show_help_popup: false,
            status_message: None,
            error_message: None,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, start: Route) -> Result<()> {
        self.navigate_to(start).await;

        loop {
            terminal.draw(|f| self.draw(f))?;

            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key).await;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Whether keystrokes currently go into a text input
    fn is_typing(&self) -> bool {
        match self.current_screen {
            Screen::PatientForm => true,
            Screen::Dashboard => self.dashboard.search_active,
        }
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Char('?') if !self.is_typing() => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return;
            }
            _ => {}
        }

        if self.show_help_popup {
            return;
        }

        let action = match self.current_screen {
            Screen::Dashboard => self.dashboard.handle_key(key),
            Screen::PatientForm => match self.form.as_mut() {
                Some(form) => form.handle_key(key),
                None => ScreenAction::NavigateTo(Route::Dashboard),
            },
        };
        self.apply(action).await;
    }

    /// Carry out what a screen asked for
    pub async fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.set_status(message),
            ScreenAction::SetError(message) => self.set_error(message),
            ScreenAction::NavigateTo(route) => self.navigate_to(route).await,
            ScreenAction::Refresh => {
                if self.refresh_dashboard().await {
                    let count = self.dashboard.dashboard.patients.len();
                    self.set_status(format!("Loaded {} patient(s)", count));
                }
            }
            ScreenAction::ConfirmDelete(confirmed) => self.resolve_delete(confirmed).await,
            ScreenAction::Export => self.export(),
            ScreenAction::Submit => self.submit_form().await,
        }
    }

    /// Mount the screen for `route`. Entering the dashboard re-fetches the list.
    pub async fn navigate_to(&mut self, route: Route) {
        info!("Navigating to {}", route.path());
        self.clear_messages();

        match route {
            Route::Dashboard => {
                self.form = None;
                self.current_screen = Screen::Dashboard;
                self.refresh_dashboard().await;
            }
            Route::PatientForm(record) => {
                self.form = Some(PatientFormScreen::open(record.as_ref()));
                self.current_screen = Screen::PatientForm;
            }
        }
    }

    /// Re-fetch the list; a failure keeps the cached rows and shows a notice
    async fn refresh_dashboard(&mut self) -> bool {
        let result = self.dashboard.dashboard.refresh(self.api.as_ref()).await;
        self.dashboard.clamp_selection();
        match result {
            Ok(_) => true,
            Err(_) => {
                self.set_error(self.failure_notice("Could not load patients"));
                false
            }
        }
    }

    async fn resolve_delete(&mut self, confirmed: bool) {
        let outcome = self
            .dashboard
            .dashboard
            .resolve_delete(self.api.as_ref(), confirmed)
            .await;
        self.dashboard.clamp_selection();

        match outcome {
            DeleteOutcome::NothingPending => {}
            DeleteOutcome::Declined => self.set_status("Delete cancelled".to_string()),
            DeleteOutcome::Deleted { id, refreshed: true } => {
                self.set_status(format!("Deleted patient {}", id))
            }
            DeleteOutcome::Deleted { id, refreshed: false } => {
                let what = format!("Deleted patient {} but could not reload patients", id);
                self.set_error(self.failure_notice(&what));
            }
            DeleteOutcome::Failed(_) => self.set_error(self.failure_notice("Delete failed")),
        }
    }

    fn export(&mut self) {
        let path = self.config.export_path();
        match self.dashboard.dashboard.export(&path) {
            Ok(count) => {
                info!("Exported {} row(s) to {}", count, path.display());
                self.set_status(format!("Exported {} row(s) to {}", count, path.display()));
            }
            Err(e) => {
                error!("Export to {} failed: {}", path.display(), e);
                self.set_error(format!("Export failed: {}", e));
            }
        }
    }

    async fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };

        match form.form.submit(self.api.as_ref()).await {
            Ok(patient) => {
                self.navigate_to(Route::Dashboard).await;
                if self.error_message.is_none() {
                    self.set_status(format!("Saved {}", patient.full_name()));
                }
            }
            Err(SubmitError::Invalid(errors)) => {
                form.show_errors(&errors);
                let message = errors
                    .first()
                    .map_or_else(String::new, |e| e.to_string());
                self.set_error(message);
            }
            Err(SubmitError::Api(_)) => {
                self.set_error(self.failure_notice("Could not save patient"));
            }
        }
    }

    /// Uniform notice for backend failures; details go to the log
    fn failure_notice(&self, what: &str) -> String {
        format!("{} (details in {})", what, self.config.log_file.display())
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match (self.current_screen, self.form.as_ref()) {
            (Screen::PatientForm, Some(form)) => form.draw(f, chunks[0]),
            _ => self.dashboard.draw(f, chunks[0]),
        }

        self.draw_status_bar(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else {
            format!(
                "Patient Registry - {} | F1/?: Help | Ctrl+C: Quit",
                match self.current_screen {
                    Screen::Dashboard => "Dashboard",
                    Screen::PatientForm => "Patient Form",
                }
            )
        };

        let style = if self.error_message.is_some() {
            Style::default().fg(Color::Red)
        } else if self.status_message.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 70, area);

        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }

    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            Ctrl+C - Quit application\n\n";

        let screen_help = match self.current_screen {
            Screen::Dashboard => {
                "Dashboard:\n\
                ↑/↓ - Select patient\n\
                / - Search by first or last name\n\
                g - Cycle gender filter\n\
                p - Cycle payment type filter\n\
                c - Clear search and filters\n\
                1-5 - Sort by column (again to reverse)\n\
                a - Add patient\n\
                e / Enter - Edit selected patient\n\
                d - Delete selected patient\n\
                x - Export visible rows to Excel\n\
                r - Refresh\n\
                q - Quit"
            }
            Screen::PatientForm => {
                "Patient Form:\n\
                Tab / ↓ - Next field\n\
                Shift+Tab / ↑ - Previous field\n\
                ←/→ - Move cursor, or choose an option\n\
                Space - Next option in Gender / Payment Type\n\
                Enter - Submit\n\
                Esc - Back to dashboard"
            }
        };

        format!("{}{}", global_help, screen_help)
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}
