//! Form field component bound to one draft field

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::registry::draft::{DraftField, FieldKind};
use crate::registry_tui::ui::{place_cursor, InputField, Styles};

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub field: DraftField,
    pub input: InputField,
    pub validation_error: Option<String>,
}

impl FormField {
    pub fn new(field: DraftField, value: &str) -> Self {
        let placeholder = match field.kind() {
            FieldKind::Date => "YYYY-MM-DD",
            FieldKind::Number => "0.00",
            FieldKind::Select(_) => "Select... (←/→ to choose)",
            FieldKind::Text => "",
        };

        Self {
            field,
            input: InputField::new(field.label())
                .with_placeholder(placeholder)
                .with_value(value),
            validation_error: None,
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self.field.kind(), FieldKind::Select(_))
    }

    pub fn value(&self) -> &str {
        &self.input.value
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.input.set_focus(focused);
    }

    pub fn is_focused(&self) -> bool {
        self.input.is_focused
    }

    /// Replace the value, e.g. after a select field cycled
    pub fn set_value(&mut self, value: &str) {
        self.input.set_value(value);
        self.validation_error = None;
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_select() {
            return;
        }
        self.input.insert_char(c);
        self.validation_error = None;
    }

    pub fn delete_char(&mut self) {
        if self.is_select() {
            return;
        }
        self.input.delete_char();
        self.validation_error = None;
    }

    pub fn delete_char_forward(&mut self) {
        if self.is_select() {
            return;
        }
        self.input.delete_char_forward();
        self.validation_error = None;
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let border_style = if self.is_focused() {
            Styles::active_border()
        } else if self.validation_error.is_some() {
            Styles::error()
        } else {
            Styles::inactive_border()
        };

        let title = match &self.validation_error {
            Some(error) => format!("{} - Error: {}", self.field.label(), error),
            None => self.field.label().to_string(),
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, style) = if self.input.is_empty() {
            (self.input.placeholder.clone(), Styles::inactive())
        } else if self.is_select() {
            (format!("◀ {} ▶", self.input.value), Styles::info())
        } else {
            (self.input.value.clone(), Styles::default())
        };

        f.render_widget(Paragraph::new(text).style(style).block(block), area);

        if self.is_focused() && !self.is_select() {
            place_cursor(f, area, self.input.cursor_column());
        }
    }
}
