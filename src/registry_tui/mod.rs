//! Terminal user interface for the patient registry

pub mod app;
pub mod components;
pub mod handlers;
pub mod screens;
pub mod traits;
pub mod ui;

pub use app::{App, Route, Screen};
