//! Common event handlers for the registry TUI
//!
//! Reusable key handling shared by the dashboard table and the form.

use crossterm::event::{KeyCode, KeyEvent};

use super::traits::{FormHandler, Navigable, ScreenAction};

/// Common keyboard event handling utilities
pub struct CommonKeyHandler;

impl CommonKeyHandler {
    /// Handle navigation keys for list-based screens
    pub fn handle_navigation_keys<T: Navigable>(
        navigable: &mut T,
        key: KeyEvent,
    ) -> Option<ScreenAction> {
        match key.code {
            KeyCode::Up => {
                navigable.navigate_up();
                Some(ScreenAction::None)
            }
            KeyCode::Down => {
                navigable.navigate_down();
                Some(ScreenAction::None)
            }
            KeyCode::Home => {
                navigable.navigate_to_first();
                Some(ScreenAction::SetStatus("First patient".to_string()))
            }
            KeyCode::End => {
                navigable.navigate_to_last();
                Some(ScreenAction::SetStatus("Last patient".to_string()))
            }
            _ => None,
        }
    }

    /// Handle form navigation and text input
    pub fn handle_form_keys<T: FormHandler>(form: &mut T, key: KeyEvent) -> Option<ScreenAction> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                form.next_field();
                Some(ScreenAction::None)
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.previous_field();
                Some(ScreenAction::None)
            }
            KeyCode::Char(c) => {
                form.handle_char_input(c);
                Some(ScreenAction::None)
            }
            KeyCode::Backspace => {
                form.handle_backspace();
                Some(ScreenAction::None)
            }
            KeyCode::Delete => {
                form.handle_delete();
                Some(ScreenAction::None)
            }
            _ => None,
        }
    }
}
