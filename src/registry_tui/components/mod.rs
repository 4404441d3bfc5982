//! Reusable widgets of the registry TUI

pub mod confirm_dialog;
pub mod form_field;
pub mod patient_table;

pub use confirm_dialog::render_confirm_dialog;
pub use form_field::FormField;
pub use patient_table::render_patient_table;
