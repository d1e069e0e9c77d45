use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown gender '{0}', expected male, female or other")]
pub struct ParseGenderError(String);

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ParseGenderError(s.to_string())),
        }
    }
}

/// One booked OPD appointment as persisted by the record gateway.
///
/// Records are never updated once stored; the gateway only creates and lists them.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OpdRecord {
    pub patient_name: String,
    pub age: u8,
    pub address: String,
    pub gender: Gender,
    pub appointment_date: NaiveDate,
    pub doctor_name: String,
}

/// Raw appointment form input, exactly as typed or selected by the patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub patient_name: String,
    pub age: String,
    pub address: String,
    pub gender: Gender,
    pub appointment_date: String,
    pub doctor_name: String,
}

/// A submitted appointment waiting for the patient to acknowledge payment.
///
/// Lives only in memory between the form step and the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAppointment {
    record: OpdRecord,
}

impl PendingAppointment {
    pub fn new(record: OpdRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &OpdRecord {
        &self.record
    }

    pub fn into_record(self) -> OpdRecord {
        self.record
    }
}
