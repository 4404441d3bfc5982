use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A patient record as returned by the registry backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Backend-assigned identifier, absent until the first save
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub insurance_provider: String,
    pub payment_type: PaymentType,
    #[serde(deserialize_with = "deserialize_amount")]
    pub payment_amount: f64,
}

impl Patient {
    /// First and last name separated by a single space
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The twelve domain fields, without the identifier
    pub fn fields(&self) -> PatientFields {
        PatientFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth.clone(),
            gender: self.gender,
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            emergency_contact: self.emergency_contact.clone(),
            emergency_phone: self.emergency_phone.clone(),
            insurance_provider: self.insurance_provider.clone(),
            payment_type: self.payment_type,
            payment_amount: self.payment_amount,
        }
    }
}

/// Body of create and update requests. Never carries an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFields {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: Gender,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub insurance_provider: String,
    pub payment_type: PaymentType,
    pub payment_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    Online,
    Cash,
}

impl PaymentType {
    pub const ALL: [PaymentType; 2] = [PaymentType::Online, PaymentType::Cash];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Online => "Online",
            PaymentType::Cash => "Cash",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(anyhow::anyhow!(
                "Unsupported gender: {}. Supported values: Male, Female, Other",
                other
            )),
        }
    }
}

impl FromStr for PaymentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(PaymentType::Online),
            "cash" => Ok(PaymentType::Cash),
            other => Err(anyhow::anyhow!(
                "Unsupported payment type: {}. Supported values: Online, Cash",
                other
            )),
        }
    }
}

/// Amounts arrive as JSON numbers, but older records were stored from the
/// raw input value and come back as numeric strings.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    let amount = match Amount::deserialize(deserializer)? {
        Amount::Number(n) => n,
        Amount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid paymentAmount '{}': {}", s, e)))?,
    };

    if !amount.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "invalid paymentAmount '{}': not a finite number",
            amount
        )));
    }
    Ok(amount)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_deserialization_from_backend() {
        let body = r#"{
            "_id": "65f1c0ffee",
            "firstName": "Ann",
            "lastName": "Lee",
            "dateOfBirth": "1985-03-02T00:00:00.000Z",
            "gender": "Female",
            "address": "12 Oak Rd",
            "phoneNumber": "555-0101",
            "email": "ann@example.com",
            "emergencyContact": "Sam Lee",
            "emergencyPhone": "555-0102",
            "insuranceProvider": "Acme",
            "paymentType": "Cash",
            "paymentAmount": "250.5",
            "__v": 0
        }"#;

        let patient: Patient = serde_json::from_str(body).unwrap();
        assert_eq!(patient.id.as_deref(), Some("65f1c0ffee"));
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.payment_type, PaymentType::Cash);
        assert_eq!(patient.payment_amount, 250.5);
        assert_eq!(patient.full_name(), "Ann Lee");
    }

    #[test]
    fn test_fields_payload_has_no_identifier() {
        let patient = fixtures::patient("abc", "Bob", "Lee", Gender::Male, PaymentType::Online);
        let value = serde_json::to_value(patient.fields()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 12);
        assert!(!object.contains_key("_id"));
        assert!(!object.contains_key("id"));
        assert_eq!(object["firstName"], "Bob");
        assert_eq!(object["paymentType"], "Online");
        assert_eq!(object["paymentAmount"], 100.0);
    }

    #[test]
    fn test_non_finite_amounts_are_rejected() {
        let record = fixtures::patient("abc", "Ann", "Lee", Gender::Female, PaymentType::Cash);
        let mut value = serde_json::to_value(&record).unwrap();

        for amount in ["NaN", "inf", "-inf", "Infinity", "1e400", "twelve"] {
            value["paymentAmount"] = serde_json::Value::from(amount);
            assert!(
                serde_json::from_value::<Patient>(value.clone()).is_err(),
                "{} should not decode",
                amount
            );
        }

        value["paymentAmount"] = serde_json::Value::from(1e308);
        assert_eq!(serde_json::from_value::<Patient>(value).unwrap().payment_amount, 1e308);
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("CASH".parse::<PaymentType>().unwrap(), PaymentType::Cash);
        assert!("card".parse::<PaymentType>().is_err());
    }
}
