//! Registry REST API
//!
//! The dashboard and the form only ever talk to the backend through the
//! [`PatientApi`] trait. [`RestClient`] is the reqwest-backed implementation.

pub mod client;
pub mod errors;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::{Patient, PatientFields};

pub use client::RestClient;
pub use errors::ApiError;

/// Operations exposed by the registry backend
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PatientApi: Send + Sync {
    /// GET /patients
    async fn list_patients(&self) -> Result<Vec<Patient>, ApiError>;

    /// POST /patients
    async fn create_patient(&self, fields: &PatientFields) -> Result<Patient, ApiError>;

    /// PUT /patients/{id}
    async fn update_patient(&self, id: &str, fields: &PatientFields) -> Result<Patient, ApiError>;

    /// DELETE /patients/{id}
    async fn delete_patient(&self, id: &str) -> Result<(), ApiError>;
}

/// Backend rejection used by tests of the controllers
#[cfg(test)]
pub(crate) fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "{\"message\":\"boom\"}".to_string(),
        headers: "{\"content-type\": \"application/json\"}".to_string(),
    }
}
