//! Command-line surface of the patient registry client

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::{Gender, Patient, PaymentType};
use crate::registry::{display_date, DeleteOutcome, SortColumn, SortOrder, ViewState};

#[derive(Parser)]
#[command(name = "patient-registry")]
#[command(about = "Terminal client for a REST patient registry")]
#[command(version)]
pub struct Cli {
    /// Base URL of the registry API (overrides REGISTRY_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal UI (default)
    Tui {
        /// Route to open first: / or /patient-form
        #[arg(long, default_value = "/")]
        route: String,
    },

    /// Print the patient table
    List {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Export the patient table to a workbook or CSV file
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Output file (defaults to patient_data.xlsx in the export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "xlsx")]
        format: ExportFormat,
    },

    /// Delete a patient by identifier
    Delete {
        /// Patient identifier
        #[arg(long)]
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Search, filter and sort options shared by `list` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Case-insensitive substring of first or last name
    #[arg(short, long)]
    pub search: Option<String>,

    /// Gender filter (Male, Female, Other)
    #[arg(short, long)]
    pub gender: Option<String>,

    /// Payment type filter (Online, Cash)
    #[arg(short, long)]
    pub payment_type: Option<String>,

    /// Sort column (name, dob, gender, payment-type, amount)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl ViewArgs {
    pub fn to_view_state(&self) -> Result<ViewState> {
        let mut view = ViewState {
            search_term: self.search.clone().unwrap_or_default(),
            gender_filter: self.gender.as_deref().map(str::parse::<Gender>).transpose()?,
            payment_filter: self
                .payment_type
                .as_deref()
                .map(str::parse::<PaymentType>)
                .transpose()?,
            sort: None,
        };

        if let Some(sort) = &self.sort {
            let order = if self.desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            view.sort_by(Commands::parse_sort_column(sort)?, order);
        }

        Ok(view)
    }
}

impl Commands {
    pub fn parse_sort_column(column: &str) -> Result<SortColumn> {
        match column.to_lowercase().as_str() {
            "name" | "first-name" | "firstname" => Ok(SortColumn::FirstName),
            "dob" | "date-of-birth" | "dateofbirth" => Ok(SortColumn::DateOfBirth),
            "gender" => Ok(SortColumn::Gender),
            "payment-type" | "paymenttype" => Ok(SortColumn::PaymentType),
            "amount" | "payment-amount" | "paymentamount" => Ok(SortColumn::PaymentAmount),
            other => Err(anyhow!(
                "Unsupported sort column: {}. Supported columns: name, dob, gender, payment-type, amount",
                other
            )),
        }
    }
}

/// Truncate string to specified length with ellipsis
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Plain-text table lines for `list`
pub fn format_table(patients: &[&Patient]) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{:<26} {:<30} {:<14} {:<8} {:<13} {:>14}",
            "ID", "Name", "Date of Birth", "Gender", "Payment Type", "Payment Amount"
        ),
        "-".repeat(110),
    ];

    for patient in patients {
        lines.push(format!(
            "{:<26} {:<30} {:<14} {:<8} {:<13} {:>14}",
            truncate_string(patient.id.as_deref().unwrap_or("-"), 26),
            truncate_string(&patient.full_name(), 30),
            truncate_string(&display_date(&patient.date_of_birth), 14),
            patient.gender.as_str(),
            patient.payment_type.as_str(),
            format!("${}", patient.payment_amount),
        ));
    }

    lines
}

/// Lines printed after `delete`; a failed delete is an error
pub fn delete_report(outcome: &DeleteOutcome, remaining: usize) -> Result<Vec<String>> {
    match outcome {
        DeleteOutcome::Deleted { id, refreshed: true } => Ok(vec![
            format!("Deleted patient {}", id),
            format!("{} patient(s) remaining", remaining),
        ]),
        DeleteOutcome::Deleted { id, refreshed: false } => Ok(vec![
            format!("Deleted patient {}", id),
            "The patient list could not be refreshed".to_string(),
        ]),
        DeleteOutcome::Declined | DeleteOutcome::NothingPending => {
            Ok(vec!["Delete cancelled".to_string()])
        }
        DeleteOutcome::Failed(id) => Err(anyhow!("Failed to delete patient {}", id)),
    }
}
