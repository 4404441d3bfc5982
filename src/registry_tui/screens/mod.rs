//! Screens of the registry TUI, one per route

pub mod dashboard;
pub mod patient_form;

pub use dashboard::DashboardScreen;
pub use patient_form::PatientFormScreen;
