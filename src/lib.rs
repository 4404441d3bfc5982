//! Patient registry client
//!
//! A terminal client for a REST patient registry: a dashboard that lists,
//! searches, filters, sorts, exports and deletes patient records, and a
//! form that creates or edits them.

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod registry;
pub mod registry_tui;
