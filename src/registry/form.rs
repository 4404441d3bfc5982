//! Create/edit form controller

use thiserror::Error;
use tracing::{error, info};

use super::draft::{FieldError, PatientDraft};
use crate::api::{ApiError, PatientApi};
use crate::models::Patient;

/// Chosen once when the form opens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

impl FormMode {
    pub fn title(&self) -> &str {
        match self {
            FormMode::Create => "New Patient Information Form",
            FormMode::Edit { .. } => "Edit Patient Information",
        }
    }

    pub fn submit_label(&self) -> &str {
        match self {
            FormMode::Create => "Add Patient",
            FormMode::Edit { .. } => "Update Patient",
        }
    }
}

/// Why a submit did not reach the backend or was rejected by it
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone)]
pub struct PatientForm {
    pub mode: FormMode,
    pub draft: PatientDraft,
}

impl PatientForm {
    /// Open the form, in Edit mode when a saved record is handed over
    pub fn open(record: Option<&Patient>) -> Self {
        match record {
            Some(patient) => Self {
                mode: match &patient.id {
                    Some(id) => FormMode::Edit { id: id.clone() },
                    None => FormMode::Create,
                },
                draft: PatientDraft::from_patient(patient),
            },
            None => Self {
                mode: FormMode::Create,
                draft: PatientDraft::default(),
            },
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    /// Validate, then issue exactly one create or update request
    pub async fn submit(&self, api: &dyn PatientApi) -> Result<Patient, SubmitError> {
        let fields = self.draft.to_fields().map_err(SubmitError::Invalid)?;

        let result = match &self.mode {
            FormMode::Edit { id } => api.update_patient(id, &fields).await,
            FormMode::Create => api.create_patient(&fields).await,
        };

        match result {
            Ok(patient) => {
                info!(
                    "Patient {} saved ({})",
                    patient.full_name(),
                    if self.is_editing() { "updated" } else { "created" }
                );
                Ok(patient)
            }
            Err(e) => {
                error!("Error submitting patient data: {}", e);
                if let Some((status, body, headers)) = e.response_details() {
                    error!("Response data: {}", body);
                    error!("Response status: {}", status);
                    error!("Response headers: {}", headers);
                }
                Err(SubmitError::Api(e))
            }
        }
    }
}
