//! Registry core: view computation, form draft, controllers and export
//!
//! Nothing in here touches the terminal. The dashboard and form
//! controllers reach the backend only through [`crate::api::PatientApi`].

pub mod dashboard;
pub mod draft;
pub mod export;
pub mod form;
pub mod view;

pub use dashboard::{Dashboard, DeleteOutcome};
pub use draft::{
    display_date, normalize_date_of_birth, DraftField, FieldError, FieldProblem, PatientDraft,
};
pub use export::{export_rows, write_csv, write_xlsx, ExportError, ExportRow};
pub use form::{FormMode, PatientForm, SubmitError};
pub use view::{visible_patients, SortColumn, SortOrder, ViewState};
