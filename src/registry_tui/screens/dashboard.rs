//! Dashboard screen: searchable, filterable, sortable patient table

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState},
    Frame,
};

use crate::models::Patient;
use crate::registry::view::SortColumn;
use crate::registry::Dashboard;
use crate::registry_tui::{
    app::Route,
    components::{render_confirm_dialog, render_patient_table},
    handlers::CommonKeyHandler,
    traits::{Navigable, ScreenAction},
    ui::{InputField, Styles},
};

pub struct DashboardScreen {
    pub dashboard: Dashboard,
    pub table_state: TableState,
    pub search_input: InputField,
    pub search_active: bool,
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            dashboard: Dashboard::new(),
            table_state: TableState::default(),
            search_input: InputField::new("Search by name (/)").with_placeholder("Search..."),
            search_active: false,
        }
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        let index = self.table_state.selected()?;
        self.dashboard.visible().get(index).copied()
    }

    /// Name of the record awaiting delete confirmation
    pub fn pending_delete_name(&self) -> Option<String> {
        let id = self.dashboard.pending_delete.as_deref()?;
        Some(
            self.dashboard
                .patients
                .iter()
                .find(|p| p.id.as_deref() == Some(id))
                .map_or_else(|| id.to_string(), Patient::full_name),
        )
    }

    fn set_search_active(&mut self, active: bool) {
        self.search_active = active;
        self.search_input.set_focus(active);
    }

    fn sync_search_term(&mut self) {
        self.dashboard.view.search_term = self.search_input.value.clone();
        self.clamp_selection();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ScreenAction {
        if self.dashboard.pending_delete.is_some() {
            return self.handle_confirm_key(key);
        }
        if self.search_active {
            return self.handle_search_key(key);
        }

        if let Some(action) = CommonKeyHandler::handle_navigation_keys(self, key) {
            return action;
        }

        match key.code {
            KeyCode::Char('q') => ScreenAction::Quit,
            KeyCode::Char('/') => {
                self.set_search_active(true);
                ScreenAction::SetStatus("Type to search, Enter or Esc to finish".to_string())
            }
            KeyCode::Char('g') => {
                self.dashboard.view.cycle_gender_filter();
                self.clamp_selection();
                let label = self
                    .dashboard
                    .view
                    .gender_filter
                    .map_or("All".to_string(), |g| g.to_string());
                ScreenAction::SetStatus(format!("Gender filter: {}", label))
            }
            KeyCode::Char('p') => {
                self.dashboard.view.cycle_payment_filter();
                self.clamp_selection();
                let label = self
                    .dashboard
                    .view
                    .payment_filter
                    .map_or("All".to_string(), |p| p.to_string());
                ScreenAction::SetStatus(format!("Payment type filter: {}", label))
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                let column = SortColumn::ALL[index];
                self.dashboard.view.toggle_sort(column);
                self.clamp_selection();
                ScreenAction::SetStatus(format!(
                    "Sorted by {} {}",
                    column.as_str(),
                    self.dashboard.view.sort_indicator(column)
                ))
            }
            KeyCode::Char('c') => {
                self.dashboard.view.clear_filters();
                self.search_input.clear();
                self.clamp_selection();
                ScreenAction::SetStatus("Filters cleared".to_string())
            }
            KeyCode::Char('a') => ScreenAction::NavigateTo(Route::PatientForm(None)),
            KeyCode::Char('e') | KeyCode::Enter => match self.selected_patient() {
                Some(patient) => ScreenAction::NavigateTo(Route::PatientForm(Some(patient.clone()))),
                None => ScreenAction::SetError("No patient selected".to_string()),
            },
            KeyCode::Char('d') => {
                let Some(patient) = self.selected_patient() else {
                    return ScreenAction::SetError("No patient selected".to_string());
                };
                let Some(id) = patient.id.clone() else {
                    return ScreenAction::SetError("This record has no identifier".to_string());
                };
                let name = patient.full_name();
                self.dashboard.request_delete(&id);
                ScreenAction::SetStatus(format!("Delete {}? (y/n)", name))
            }
            KeyCode::Char('x') => ScreenAction::Export,
            KeyCode::Char('r') => ScreenAction::Refresh,
            _ => ScreenAction::None,
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                ScreenAction::ConfirmDelete(true)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                ScreenAction::ConfirmDelete(false)
            }
            _ => ScreenAction::None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.set_search_active(false);
                return ScreenAction::SetStatus(format!(
                    "{} patient(s) shown",
                    self.dashboard.visible().len()
                ));
            }
            KeyCode::Char(c) => self.search_input.insert_char(c),
            KeyCode::Backspace => self.search_input.delete_char(),
            KeyCode::Delete => self.search_input.delete_char_forward(),
            KeyCode::Left => self.search_input.move_cursor_left(),
            KeyCode::Right => self.search_input.move_cursor_right(),
            KeyCode::Home => self.search_input.move_cursor_to_start(),
            KeyCode::End => self.search_input.move_cursor_to_end(),
            _ => return ScreenAction::None,
        }
        self.sync_search_term();
        ScreenAction::None
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new("Patient Registry Dashboard")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        self.draw_filter_bar(f, chunks[1]);

        let visible = self.dashboard.visible();
        render_patient_table(f, chunks[2], &visible, &self.dashboard.view, &mut self.table_state);

        let instructions = Paragraph::new(
            "↑/↓ select | / search | g gender | p payment | 1-5 sort | a add | e edit | d delete | x export | r refresh | c clear | q quit",
        )
        .style(Styles::info())
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(instructions, chunks[3]);

        if let Some(name) = self.pending_delete_name() {
            render_confirm_dialog(
                f,
                area,
                "Delete Patient",
                &format!("Are you sure you want to delete {}?", name),
            );
        }
    }

    fn draw_filter_bar(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        self.search_input.render(f, chunks[0]);

        let view = &self.dashboard.view;
        let gender = view.gender_filter.map_or("All".to_string(), |g| g.to_string());
        let payment = view.payment_filter.map_or("All".to_string(), |p| p.to_string());
        let filters = Paragraph::new(Line::from(vec![
            Span::styled("Gender: ", Styles::inactive()),
            Span::raw(gender),
            Span::styled("   Payment Type: ", Styles::inactive()),
            Span::raw(payment),
        ]))
        .block(Block::default().title("Filters (g/p)").borders(Borders::ALL));
        f.render_widget(filters, chunks[1]);
    }
}

impl Navigable for DashboardScreen {
    fn get_selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.table_state.select(index);
    }

    fn get_item_count(&self) -> usize {
        self.dashboard.visible().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::patient;
    use crate::models::{Gender, PaymentType};
    use crossterm::event::KeyModifiers;

    fn press(screen: &mut DashboardScreen, code: KeyCode) -> ScreenAction {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn loaded_screen() -> DashboardScreen {
        let mut screen = DashboardScreen::new();
        screen.dashboard.patients = vec![
            patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash),
            patient("2", "Bob", "Lee", Gender::Male, PaymentType::Online),
        ];
        screen.clamp_selection();
        screen
    }

    #[test]
    fn test_search_typing_filters_rows() {
        let mut screen = loaded_screen();
        press(&mut screen, KeyCode::Char('/'));
        for c in "bob".chars() {
            assert_eq!(press(&mut screen, KeyCode::Char(c)), ScreenAction::None);
        }

        assert_eq!(screen.dashboard.view.search_term, "bob");
        assert_eq!(screen.dashboard.visible().len(), 1);
        assert_eq!(screen.selected_patient().unwrap().first_name, "Bob");

        // 'q' is text while searching
        press(&mut screen, KeyCode::Char('q'));
        assert_eq!(screen.dashboard.view.search_term, "bobq");
        assert!(screen.dashboard.visible().is_empty());
        assert_eq!(screen.table_state.selected(), None);
    }

    #[test]
    fn test_sort_keys_toggle_columns() {
        let mut screen = loaded_screen();
        press(&mut screen, KeyCode::Char('1'));
        press(&mut screen, KeyCode::Char('1'));
        assert_eq!(
            screen.dashboard.view.sort,
            Some((SortColumn::FirstName, crate::registry::SortOrder::Descending))
        );
        assert_eq!(screen.selected_patient().unwrap().first_name, "Bob");
    }

    #[test]
    fn test_edit_carries_selected_record() {
        let mut screen = loaded_screen();
        press(&mut screen, KeyCode::Down);

        match press(&mut screen, KeyCode::Char('e')) {
            ScreenAction::NavigateTo(Route::PatientForm(Some(record))) => {
                assert_eq!(record.id.as_deref(), Some("2"));
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(
            press(&mut screen, KeyCode::Char('a')),
            ScreenAction::NavigateTo(Route::PatientForm(None))
        );
    }

    #[test]
    fn test_delete_asks_for_confirmation() {
        let mut screen = loaded_screen();
        press(&mut screen, KeyCode::Char('d'));
        assert_eq!(screen.dashboard.pending_delete.as_deref(), Some("1"));
        assert_eq!(screen.pending_delete_name().as_deref(), Some("Ann Lee"));

        // Other keys are swallowed until answered
        assert_eq!(press(&mut screen, KeyCode::Char('q')), ScreenAction::None);
        assert_eq!(press(&mut screen, KeyCode::Char('n')), ScreenAction::ConfirmDelete(false));
        assert_eq!(press(&mut screen, KeyCode::Char('y')), ScreenAction::ConfirmDelete(true));
    }

    #[test]
    fn test_actions_on_empty_table() {
        let mut screen = DashboardScreen::new();
        assert!(matches!(press(&mut screen, KeyCode::Char('e')), ScreenAction::SetError(_)));
        assert!(matches!(press(&mut screen, KeyCode::Char('d')), ScreenAction::SetError(_)));
        assert!(screen.dashboard.pending_delete.is_none());
        assert_eq!(press(&mut screen, KeyCode::Char('x')), ScreenAction::Export);
        assert_eq!(press(&mut screen, KeyCode::Char('q')), ScreenAction::Quit);
    }
}
