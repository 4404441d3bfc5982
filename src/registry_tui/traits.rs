//! Core traits for the registry TUI screens

use crate::registry_tui::app::Route;

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a route, optionally carrying a record
    NavigateTo(Route),
    /// Quit the application
    Quit,
    /// Set status message
    SetStatus(String),
    /// Set error message
    SetError(String),
    /// Re-fetch the patient list
    Refresh,
    /// Answer the pending delete confirmation
    ConfirmDelete(bool),
    /// Write the visible rows to the export file
    Export,
    /// Submit the patient form
    Submit,
    /// No action taken
    None,
}

/// Trait for screens with navigable lists
pub trait Navigable {
    /// Get currently selected index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set selected index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Move selection up, stopping at the first item
    fn navigate_up(&mut self) {
        if self.get_item_count() == 0 {
            return;
        }
        let current = self.get_selected_index().unwrap_or(0);
        self.set_selected_index(Some(current.saturating_sub(1)));
    }

    /// Move selection down, stopping at the last item
    fn navigate_down(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let next = self.get_selected_index().map_or(0, |i| i + 1);
        self.set_selected_index(Some(next.min(count - 1)));
    }

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }

    /// Keep the selection inside the list after it changed size
    fn clamp_selection(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            self.set_selected_index(None);
        } else {
            let index = self.get_selected_index().unwrap_or(0).min(count - 1);
            self.set_selected_index(Some(index));
        }
    }
}

/// Trait for form handling
pub trait FormHandler {
    /// Get current field index
    fn get_current_field(&self) -> usize;

    /// Set current field
    fn set_current_field(&mut self, field: usize);

    /// Get total number of fields
    fn get_field_count(&self) -> usize;

    /// Move to next field
    fn next_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        self.set_current_field((current + 1) % total);
    }

    /// Move to previous field
    fn previous_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        self.set_current_field(if current == 0 { total - 1 } else { current - 1 });
    }

    /// Handle character input for current field
    fn handle_char_input(&mut self, c: char);

    /// Handle backspace for current field
    fn handle_backspace(&mut self);

    /// Handle delete for current field
    fn handle_delete(&mut self);
}
