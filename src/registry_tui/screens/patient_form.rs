//! Create/edit patient form screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::Patient;
use crate::registry::{FieldError, PatientForm};
use crate::registry_tui::{
    app::Route,
    components::FormField,
    handlers::CommonKeyHandler,
    traits::{FormHandler, ScreenAction},
    ui::Styles,
};

pub struct PatientFormScreen {
    pub form: PatientForm,
    pub fields: Vec<FormField>,
    pub current_field: usize,
}

impl PatientFormScreen {
    /// Open for create, or for edit when `record` is a saved patient
    pub fn open(record: Option<&Patient>) -> Self {
        let form = PatientForm::open(record);
        let fields = crate::registry::DraftField::ALL
            .iter()
            .map(|&field| FormField::new(field, form.draft.get(field)))
            .collect();

        let mut screen = Self {
            form,
            fields,
            current_field: 0,
        };
        screen.update_focus();
        screen
    }

    fn update_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focus(i == self.current_field);
        }
    }

    fn current(&mut self) -> &mut FormField {
        &mut self.fields[self.current_field]
    }

    /// Copy the focused widget's text into the draft
    fn commit_current(&mut self) {
        let field = &self.fields[self.current_field];
        self.form.draft.set_field(field.field, field.value());
    }

    fn cycle_current(&mut self, forward: bool) {
        let field = self.fields[self.current_field].field;
        self.form.draft.cycle_option(field, forward);
        let value = self.form.draft.get(field).to_string();
        self.current().set_value(&value);
    }

    /// Mark invalid fields and focus the first one
    pub fn show_errors(&mut self, errors: &[FieldError]) {
        for field in &mut self.fields {
            field.validation_error = errors
                .iter()
                .find(|e| e.field == field.field)
                .map(|e| e.problem.to_string());
        }
        if let Some(first) = errors.first() {
            if let Some(index) = self.fields.iter().position(|f| f.field == first.field) {
                self.set_current_field(index);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Enter => return ScreenAction::Submit,
            KeyCode::Esc => return ScreenAction::NavigateTo(Route::Dashboard),
            _ => {}
        }

        if self.current().is_select() {
            match key.code {
                KeyCode::Right | KeyCode::Char(' ') => {
                    self.cycle_current(true);
                    return ScreenAction::None;
                }
                KeyCode::Left => {
                    self.cycle_current(false);
                    return ScreenAction::None;
                }
                _ => {}
            }
        } else {
            match key.code {
                KeyCode::Left => {
                    self.current().input.move_cursor_left();
                    return ScreenAction::None;
                }
                KeyCode::Right => {
                    self.current().input.move_cursor_right();
                    return ScreenAction::None;
                }
                KeyCode::Home => {
                    self.current().input.move_cursor_to_start();
                    return ScreenAction::None;
                }
                KeyCode::End => {
                    self.current().input.move_cursor_to_end();
                    return ScreenAction::None;
                }
                _ => {}
            }
        }

        CommonKeyHandler::handle_form_keys(self, key).unwrap_or(ScreenAction::None)
    }

    pub fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new(self.form.mode.title())
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        // Two columns of six fields
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        let half = self.fields.len().div_ceil(2);
        for (column, fields) in columns.iter().zip(self.fields.chunks(half)) {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Length(3); fields.len()])
                .split(*column);
            for (row, field) in rows.iter().zip(fields) {
                field.render(f, *row);
            }
        }

        let footer = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("[Enter] {}", self.form.mode.submit_label()),
                Styles::success(),
            ),
            Span::raw("  Tab/↑/↓ move | ←/→/Space choose option | Esc back"),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, chunks[2]);
    }
}

impl FormHandler for PatientFormScreen {
    fn get_current_field(&self) -> usize {
        self.current_field
    }

    fn set_current_field(&mut self, field: usize) {
        if field < self.fields.len() {
            self.current_field = field;
            self.update_focus();
        }
    }

    fn get_field_count(&self) -> usize {
        self.fields.len()
    }

    fn handle_char_input(&mut self, c: char) {
        self.current().insert_char(c);
        self.commit_current();
    }

    fn handle_backspace(&mut self) {
        self.current().delete_char();
        self.commit_current();
    }

    fn handle_delete(&mut self) {
        self.current().delete_char_forward();
        self.commit_current();
    }
}
