//! Form draft of a patient record and its validation

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::models::{Gender, Patient, PatientFields, PaymentType};

/// Format produced by a date input
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

const NAIVE_TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

const GENDER_OPTIONS: [&str; 3] = ["Male", "Female", "Other"];
const PAYMENT_TYPE_OPTIONS: [&str; 2] = ["Online", "Cash"];

/// Input kind of a draft field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Number,
    Select(&'static [&'static str]),
}

/// The twelve editable fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    FirstName,
    LastName,
    DateOfBirth,
    Gender,
    Address,
    PhoneNumber,
    Email,
    EmergencyContact,
    EmergencyPhone,
    InsuranceProvider,
    PaymentType,
    PaymentAmount,
}

impl DraftField {
    pub const ALL: [DraftField; 12] = [
        DraftField::FirstName,
        DraftField::LastName,
        DraftField::DateOfBirth,
        DraftField::Gender,
        DraftField::Address,
        DraftField::PhoneNumber,
        DraftField::Email,
        DraftField::EmergencyContact,
        DraftField::EmergencyPhone,
        DraftField::InsuranceProvider,
        DraftField::PaymentType,
        DraftField::PaymentAmount,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DraftField::FirstName => "First Name",
            DraftField::LastName => "Last Name",
            DraftField::DateOfBirth => "Date of Birth",
            DraftField::Gender => "Gender",
            DraftField::Address => "Address",
            DraftField::PhoneNumber => "Phone Number",
            DraftField::Email => "Email",
            DraftField::EmergencyContact => "Emergency Contact Name",
            DraftField::EmergencyPhone => "Emergency Contact Phone",
            DraftField::InsuranceProvider => "Insurance Provider",
            DraftField::PaymentType => "Payment Type",
            DraftField::PaymentAmount => "Payment Amount",
        }
    }

    /// Wire name of the field
    pub fn name(&self) -> &'static str {
        match self {
            DraftField::FirstName => "firstName",
            DraftField::LastName => "lastName",
            DraftField::DateOfBirth => "dateOfBirth",
            DraftField::Gender => "gender",
            DraftField::Address => "address",
            DraftField::PhoneNumber => "phoneNumber",
            DraftField::Email => "email",
            DraftField::EmergencyContact => "emergencyContact",
            DraftField::EmergencyPhone => "emergencyPhone",
            DraftField::InsuranceProvider => "insuranceProvider",
            DraftField::PaymentType => "paymentType",
            DraftField::PaymentAmount => "paymentAmount",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            DraftField::DateOfBirth => FieldKind::Date,
            DraftField::PaymentAmount => FieldKind::Number,
            DraftField::Gender => FieldKind::Select(&GENDER_OPTIONS),
            DraftField::PaymentType => FieldKind::Select(&PAYMENT_TYPE_OPTIONS),
            _ => FieldKind::Text,
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self.kind() {
            FieldKind::Select(options) => options,
            _ => &[],
        }
    }
}

/// Why a field failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldProblem {
    #[error("is required")]
    Missing,
    #[error("must be a date (YYYY-MM-DD)")]
    InvalidDate,
    #[error("must be a number")]
    InvalidNumber,
    #[error("must be one of the listed options")]
    InvalidOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} {}", .field.label(), .problem)]
pub struct FieldError {
    pub field: DraftField,
    pub problem: FieldProblem,
}

/// In-progress copy of a patient record, one string per input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub insurance_provider: String,
    pub payment_type: String,
    pub payment_amount: String,
}

impl PatientDraft {
    /// Draft pre-filled from a record, with date of birth in date-input shape
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            date_of_birth: normalize_date_of_birth(&patient.date_of_birth)
                .unwrap_or_else(|| patient.date_of_birth.clone()),
            gender: patient.gender.as_str().to_string(),
            address: patient.address.clone(),
            phone_number: patient.phone_number.clone(),
            email: patient.email.clone(),
            emergency_contact: patient.emergency_contact.clone(),
            emergency_phone: patient.emergency_phone.clone(),
            insurance_provider: patient.insurance_provider.clone(),
            payment_type: patient.payment_type.as_str().to_string(),
            payment_amount: patient.payment_amount.to_string(),
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::FirstName => &self.first_name,
            DraftField::LastName => &self.last_name,
            DraftField::DateOfBirth => &self.date_of_birth,
            DraftField::Gender => &self.gender,
            DraftField::Address => &self.address,
            DraftField::PhoneNumber => &self.phone_number,
            DraftField::Email => &self.email,
            DraftField::EmergencyContact => &self.emergency_contact,
            DraftField::EmergencyPhone => &self.emergency_phone,
            DraftField::InsuranceProvider => &self.insurance_provider,
            DraftField::PaymentType => &self.payment_type,
            DraftField::PaymentAmount => &self.payment_amount,
        }
    }

    fn slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::FirstName => &mut self.first_name,
            DraftField::LastName => &mut self.last_name,
            DraftField::DateOfBirth => &mut self.date_of_birth,
            DraftField::Gender => &mut self.gender,
            DraftField::Address => &mut self.address,
            DraftField::PhoneNumber => &mut self.phone_number,
            DraftField::Email => &mut self.email,
            DraftField::EmergencyContact => &mut self.emergency_contact,
            DraftField::EmergencyPhone => &mut self.emergency_phone,
            DraftField::InsuranceProvider => &mut self.insurance_provider,
            DraftField::PaymentType => &mut self.payment_type,
            DraftField::PaymentAmount => &mut self.payment_amount,
        }
    }

    /// Change handler: replaces exactly one field
    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    /// Step a select field through its options; blank starts at the first
    /// (or last, going backwards) option. Other kinds are left untouched.
    pub fn cycle_option(&mut self, field: DraftField, forward: bool) {
        let options = field.options();
        if options.is_empty() {
            return;
        }

        let current = options.iter().position(|o| *o == self.get(field));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => options.len() - 1,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        self.set_field(field, options[next]);
    }

    /// Check required, option, date and number constraints
    pub fn validate(&self) -> Vec<FieldError> {
        DraftField::ALL
            .iter()
            .filter_map(|&field| {
                check_field(field, self.get(field)).map(|problem| FieldError { field, problem })
            })
            .collect()
    }

    /// Assemble the twelve-field payload, or every field error found
    pub fn to_fields(&self) -> Result<PatientFields, Vec<FieldError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let invalid = |field| vec![FieldError { field, problem: FieldProblem::InvalidOption }];
        let gender: Gender = self
            .gender
            .parse()
            .map_err(|_| invalid(DraftField::Gender))?;
        let payment_type: PaymentType = self
            .payment_type
            .parse()
            .map_err(|_| invalid(DraftField::PaymentType))?;
        let payment_amount = self.payment_amount.trim().parse::<f64>().map_err(|_| {
            vec![FieldError {
                field: DraftField::PaymentAmount,
                problem: FieldProblem::InvalidNumber,
            }]
        })?;

        Ok(PatientFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            gender,
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            emergency_contact: self.emergency_contact.clone(),
            emergency_phone: self.emergency_phone.clone(),
            insurance_provider: self.insurance_provider.clone(),
            payment_type,
            payment_amount,
        })
    }
}

fn check_field(field: DraftField, value: &str) -> Option<FieldProblem> {
    let value = value.trim();
    if value.is_empty() {
        return Some(FieldProblem::Missing);
    }

    match field.kind() {
        FieldKind::Text => None,
        FieldKind::Date => NaiveDate::parse_from_str(value, DATE_INPUT_FORMAT)
            .err()
            .map(|_| FieldProblem::InvalidDate),
        FieldKind::Number => match value.parse::<f64>() {
            Ok(n) if n.is_finite() => None,
            _ => Some(FieldProblem::InvalidNumber),
        },
        FieldKind::Select(options) => {
            if options.contains(&value) {
                None
            } else {
                Some(FieldProblem::InvalidOption)
            }
        }
    }
}

/// Calendar date (`YYYY-MM-DD`) of a date or timestamp string.
///
/// Timestamps carrying an offset are converted to UTC first; naive
/// timestamps keep their own date. Returns `None` when nothing parses.
pub fn normalize_date_of_birth(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let date = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| {
            NAIVE_TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(raw, DATE_INPUT_FORMAT).ok())?;

    Some(date.format(DATE_INPUT_FORMAT).to_string())
}

/// Calendar date when the value parses, the raw text otherwise
pub fn display_date(raw: &str) -> String {
    normalize_date_of_birth(raw).unwrap_or_else(|| raw.to_string())
}
