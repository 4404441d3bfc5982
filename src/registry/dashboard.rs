//! Dashboard state: cached patient list, view selections, pending delete

use std::path::Path;
use tracing::{error, info, warn};

use super::export::{export_rows, write_xlsx, ExportError};
use super::view::{visible_patients, ViewState};
use crate::api::{ApiError, PatientApi};
use crate::models::Patient;

/// Outcome of resolving a delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Nothing was pending
    NothingPending,
    /// The user declined; no request was made
    Declined,
    /// Deleted; `refreshed` is false when the follow-up re-fetch failed
    /// and the list still shows the pre-delete rows
    Deleted { id: String, refreshed: bool },
    /// The delete request failed; the list was left as is
    Failed(String),
}

#[derive(Debug, Default)]
pub struct Dashboard {
    /// Last successfully fetched list, in backend order
    pub patients: Vec<Patient>,
    pub view: ViewState,
    /// Identifier awaiting delete confirmation
    pub pending_delete: Option<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered-then-sorted rows
    pub fn visible(&self) -> Vec<&Patient> {
        visible_patients(&self.patients, &self.view)
    }

    /// Re-fetch the whole list. On failure the cached list is kept.
    pub async fn refresh(&mut self, api: &dyn PatientApi) -> Result<usize, ApiError> {
        match api.list_patients().await {
            Ok(patients) => {
                self.patients = patients;
                Ok(self.patients.len())
            }
            Err(e) => {
                error!("Error fetching patients: {}", e);
                Err(e)
            }
        }
    }

    /// Ask for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: &str) {
        self.pending_delete = Some(id.to_string());
    }

    /// Resolve the pending confirmation. Accepting issues one delete and,
    /// when it succeeds, one list re-fetch.
    pub async fn resolve_delete(&mut self, api: &dyn PatientApi, confirmed: bool) -> DeleteOutcome {
        let Some(id) = self.pending_delete.take() else {
            return DeleteOutcome::NothingPending;
        };

        if !confirmed {
            info!("Delete of patient {} cancelled", id);
            return DeleteOutcome::Declined;
        }

        if let Err(e) = api.delete_patient(&id).await {
            error!("Error deleting patient: {}", e);
            return DeleteOutcome::Failed(id);
        }

        let refreshed = self.refresh(api).await.is_ok();
        if !refreshed {
            warn!("Patient {} deleted but the list could not be refreshed", id);
        }
        DeleteOutcome::Deleted { id, refreshed }
    }

    /// Write the visible rows to `path` as a workbook; returns the row count
    pub fn export(&self, path: &Path) -> Result<usize, ExportError> {
        let rows = export_rows(&self.visible());
        write_xlsx(&rows, path)?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{server_error, MockPatientApi};
    use crate::models::fixtures::patient;
    use crate::models::{Gender, PaymentType};
    use crate::registry::view::SortColumn;
    use mockall::Sequence;

    fn registry() -> Vec<Patient> {
        vec![
            patient("1", "Ann", "Lee", Gender::Female, PaymentType::Cash),
            patient("2", "Bob", "Lee", Gender::Male, PaymentType::Online),
        ]
    }

    fn loaded_dashboard() -> Dashboard {
        let mut dashboard = Dashboard::new();
        dashboard.patients = registry();
        dashboard
    }

    #[tokio::test]
    async fn test_refresh_populates_list() {
        let mut api = MockPatientApi::new();
        api.expect_list_patients()
            .times(1)
            .returning(|| Ok(registry()));
        let mut dashboard = Dashboard::new();

        assert_eq!(dashboard.refresh(&api).await.unwrap(), 2);
        assert_eq!(dashboard.patients, registry());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_list() {
        let mut api = MockPatientApi::new();
        api.expect_list_patients()
            .times(1)
            .returning(|| Err(server_error()));
        let mut dashboard = loaded_dashboard();

        assert!(dashboard.refresh(&api).await.is_err());
        assert_eq!(dashboard.patients, registry());
    }

    #[tokio::test]
    async fn test_declined_delete_issues_no_request() {
        let mut api = MockPatientApi::new();
        api.expect_delete_patient().never();
        api.expect_list_patients().never();
        let mut dashboard = loaded_dashboard();
        dashboard.request_delete("1");

        assert_eq!(dashboard.resolve_delete(&api, false).await, DeleteOutcome::Declined);
        assert!(dashboard.pending_delete.is_none());
        assert_eq!(dashboard.patients, registry());
    }

    #[tokio::test]
    async fn test_confirmed_delete_then_one_refetch() {
        let mut seq = Sequence::new();
        let mut api = MockPatientApi::new();
        api.expect_delete_patient()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|id| id == "1")
            .returning(|_| Ok(()));
        api.expect_list_patients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(registry().split_off(1)));
        let mut dashboard = loaded_dashboard();
        dashboard.request_delete("1");

        let outcome = dashboard.resolve_delete(&api, true).await;

        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                id: "1".to_string(),
                refreshed: true
            }
        );
        assert_eq!(dashboard.patients.len(), 1);
        assert_eq!(dashboard.patients[0].first_name, "Bob");
    }

    #[tokio::test]
    async fn test_delete_with_failed_refetch_reports_stale_list() {
        let mut seq = Sequence::new();
        let mut api = MockPatientApi::new();
        api.expect_delete_patient()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        api.expect_list_patients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(server_error()));
        let mut dashboard = loaded_dashboard();
        dashboard.request_delete("2");

        let outcome = dashboard.resolve_delete(&api, true).await;

        assert_eq!(
            outcome,
            DeleteOutcome::Deleted {
                id: "2".to_string(),
                refreshed: false
            }
        );
        assert_eq!(dashboard.patients, registry());
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_unchanged() {
        let mut seq = Sequence::new();
        let mut api = MockPatientApi::new();
        api.expect_delete_patient()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|id| id == "2")
            .returning(|_| Err(server_error()));
        // Only the explicit re-fetch below; a failed delete does not refresh.
        api.expect_list_patients()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(registry()));
        let mut dashboard = loaded_dashboard();
        dashboard.request_delete("2");

        let outcome = dashboard.resolve_delete(&api, true).await;
        assert_eq!(outcome, DeleteOutcome::Failed("2".to_string()));
        assert_eq!(dashboard.patients, registry());

        dashboard.refresh(&api).await.unwrap();
        assert_eq!(dashboard.patients, registry());
    }

    #[tokio::test]
    async fn test_resolve_without_pending_delete() {
        let mut api = MockPatientApi::new();
        api.expect_delete_patient().never();
        let mut dashboard = Dashboard::new();
        assert_eq!(dashboard.resolve_delete(&api, true).await, DeleteOutcome::NothingPending);
    }

    #[test]
    fn test_export_writes_visible_rows() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("patient_data.xlsx");

        let mut dashboard = loaded_dashboard();
        dashboard.view.gender_filter = Some(Gender::Male);
        dashboard.view.toggle_sort(SortColumn::FirstName);

        assert_eq!(dashboard.export(&path).unwrap(), 1);
        assert!(path.exists());
    }
}
