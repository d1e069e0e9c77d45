//! Local validation of booking and registration input.
//!
//! Every rule is evaluated independently so the caller gets all failing
//! fields in one pass. Validation never touches the gateway.

use crate::domain::appointment::{AppointmentForm, OpdRecord};
use crate::domain::doctor::find_doctor;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

pub const FIELD_PATIENT_NAME: &str = "patientName";
pub const FIELD_AGE: &str = "age";
pub const FIELD_ADDRESS: &str = "address";
pub const FIELD_APPOINTMENT_DATE: &str = "appointmentDate";
pub const FIELD_DOCTOR_NAME: &str = "doctorName";
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failing fields mapped to a message suitable for showing next to the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Validates a raw appointment form against the booking rules.
///
/// `today` is the earliest acceptable appointment date. On success the
/// returned record carries trimmed text and the canonical doctor name.
pub fn validate_appointment(
    form: &AppointmentForm,
    today: NaiveDate,
) -> Result<OpdRecord, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let patient_name = form.patient_name.trim();
    if patient_name.is_empty() {
        errors.add(FIELD_PATIENT_NAME, "Name is required");
    }

    let age = parse_age(&form.age);
    if age.is_none() {
        errors.add(FIELD_AGE, format!("Valid age required ({MIN_AGE}-{MAX_AGE})"));
    }

    let address = form.address.trim();
    if address.is_empty() {
        errors.add(FIELD_ADDRESS, "Address is required");
    }

    let appointment_date = match parse_appointment_date(&form.appointment_date, today) {
        Ok(date) => Some(date),
        Err(message) => {
            errors.add(FIELD_APPOINTMENT_DATE, message);
            None
        }
    };

    let doctor_name = find_doctor(&form.doctor_name);
    if doctor_name.is_none() {
        errors.add(FIELD_DOCTOR_NAME, "Please select a doctor");
    }

    match (age, appointment_date, doctor_name) {
        (Some(age), Some(appointment_date), Some(doctor_name)) if errors.is_empty() => {
            Ok(OpdRecord {
                patient_name: patient_name.to_string(),
                age,
                address: address.to_string(),
                gender: form.gender,
                appointment_date,
                doctor_name: doctor_name.to_string(),
            })
        }
        _ => Err(errors),
    }
}

/// Validates patient registration details before they are sent to the gateway.
pub fn validate_registration(name: &str, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if name.trim().is_empty() {
        errors.add(FIELD_NAME, "Name is required");
    }

    let email = email.trim();
    if email.is_empty() {
        errors.add(FIELD_EMAIL, "Email is required");
    } else if !looks_like_email(email) {
        errors.add(FIELD_EMAIL, "Enter a valid email address");
    }

    errors.into_result(|| ())
}

fn parse_age(raw: &str) -> Option<u8> {
    let age: i64 = raw.trim().parse().ok()?;
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        u8::try_from(age).ok()
    } else {
        None
    }
}

fn parse_appointment_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Date is required");
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| "Enter a valid date (YYYY-MM-DD)")?;
    if date < today {
        return Err("Appointment date cannot be in the past");
    }
    Ok(date)
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
