// Competitor records - in-memory shapes for rows of the registry file

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Header line written by `CsvStore::init`, fields in storage order.
pub const HEADER: [&str; 4] = ["RegNumber", "CompanyName", "RegistrationDate", "Status"];

/// Message returned when a new competitor is missing a field.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Company name and registration date are required.";

/// One parsed line of the store: header names zipped with values.
///
/// Field order follows the file's header, so the JSON object keeps the
/// column order of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Record { fields }
    }

    /// Value of a named column, if the header has it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A competitor as created by an append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(rename = "RegNumber")]
    pub reg_number: String,

    #[serde(rename = "CompanyName")]
    pub company_name: String,

    #[serde(rename = "RegistrationDate")]
    pub registration_date: String,

    #[serde(rename = "Status")]
    pub status: String,
}

impl Competitor {
    /// Build a competitor with a freshly generated registration number.
    pub fn new(company_name: String, registration_date: String, status: String) -> Self {
        Competitor {
            reg_number: generate_reg_number(),
            company_name,
            registration_date,
            status,
        }
    }

    /// Fields in storage order (see `HEADER`).
    pub fn values(&self) -> [&str; 4] {
        [
            &self.reg_number,
            &self.company_name,
            &self.registration_date,
            &self.status,
        ]
    }

    /// The store line for this competitor, without separators around it.
    /// Values are joined as-is; commas inside a value are not escaped.
    pub fn to_line(&self) -> String {
        self.values().join(",")
    }
}

impl From<Competitor> for Record {
    fn from(competitor: Competitor) -> Self {
        let fields = HEADER
            .iter()
            .zip(competitor.values())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Record::new(fields)
    }
}

/// `REG-` followed by the first 8 characters of a random v4 UUID, uppercased.
pub fn generate_reg_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("REG-{}", id[..8].to_uppercase())
}

/// Request body for creating a competitor.
///
/// Every field is optional here so that a missing field becomes a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompetitor {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub registration_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl NewCompetitor {
    /// Presence check only: each field must be present and non-empty.
    /// No trimming, format or length checks.
    pub fn validate(self) -> Result<Competitor> {
        match (
            non_empty(self.company_name),
            non_empty(self.registration_date),
            non_empty(self.status),
        ) {
            (Some(company_name), Some(registration_date), Some(status)) => {
                Ok(Competitor::new(company_name, registration_date, status))
            }
            _ => Err(Error::validation(REQUIRED_FIELDS_MESSAGE)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
