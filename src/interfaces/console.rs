//! Plain-text rendering of the booking screens for the terminal.

use crate::config::PaymentDetails;
use crate::domain::appointment::OpdRecord;
use crate::domain::confirmation::ConfirmationRecord;
use crate::domain::doctor::DOCTORS;
use crate::domain::patient::{PatientProfile, UserRole};
use crate::domain::validation::ValidationErrors;
use std::fmt::Write;

const LONG_DATE_FORMAT: &str = "%A, %-d %B %Y";

pub fn render_doctors() -> String {
    let mut out = String::from("Doctors available for OPD booking:\n");
    for doctor in DOCTORS {
        let _ = writeln!(out, "  - {}", doctor);
    }
    out
}

pub fn render_validation_errors(errors: &ValidationErrors) -> String {
    let mut out = String::from("Please fix the errors before submitting:\n");
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  - {}: {}", field, message);
    }
    out
}

pub fn render_payment(details: &PaymentDetails, appointment: &OpdRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "OPD form submitted! Please complete payment.");
    let _ = writeln!(out, "  Patient:     {}", appointment.patient_name);
    let _ = writeln!(out, "  Doctor:      {}", appointment.doctor_name);
    let _ = writeln!(out, "  Date:        {}", appointment.appointment_date);
    let _ = writeln!(out, "  OPD fee:     {}", details.fee_display());
    let _ = writeln!(out, "  Pay via UPI: {}", details.upi_number);
    out
}

/// The success screen shown once after payment is acknowledged.
pub fn render_confirmation(confirmation: &ConfirmationRecord) -> String {
    let appointment = &confirmation.appointment;
    let mut out = String::new();
    let _ = writeln!(out, "Appointment Confirmed!");
    let _ = writeln!(out, "  Confirmation Number: {}", confirmation.confirmation_number);
    let _ = writeln!(
        out,
        "  Patient:             {} ({}, {})",
        appointment.patient_name, appointment.age, appointment.gender
    );
    let _ = writeln!(out, "  Address:             {}", appointment.address);
    let _ = writeln!(out, "  Doctor:              {}", appointment.doctor_name);
    let _ = writeln!(
        out,
        "  Date:                {}",
        appointment.appointment_date.format(LONG_DATE_FORMAT)
    );
    out
}

pub fn render_profile(profile: Option<&PatientProfile>, role: UserRole) -> String {
    match profile {
        Some(profile) => format!("{} <{}> (role: {})\n", profile.name, profile.email, role),
        None => format!("No patient profile registered (role: {})\n", role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::appointment::{Gender, PendingAppointment};
    use crate::domain::confirmation::ConfirmationNumber;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn appointment() -> OpdRecord {
        OpdRecord {
            patient_name: "Asha Rao".to_string(),
            age: 34,
            address: "12 MG Road".to_string(),
            gender: Gender::Female,
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap(),
            doctor_name: "Dr. Priya Patel".to_string(),
        }
    }

    #[test]
    fn test_confirmation_screen() {
        let number = ConfirmationNumber::from_time(Utc.timestamp_millis_opt(1_700_000_654_321).unwrap());
        let confirmation = ConfirmationRecord::new(PendingAppointment::new(appointment()), number);

        let screen = render_confirmation(&confirmation);
        assert!(screen.starts_with("Appointment Confirmed!"));
        assert!(screen.contains("Confirmation Number: SNH654321"));
        assert!(screen.contains("Asha Rao (34, female)"));
        assert!(screen.contains("Tuesday, 15 January 2030"));
    }

    #[test]
    fn test_payment_screen() {
        let details = PaymentDetails {
            opd_fee: rust_decimal_macros::dec!(200),
            upi_number: "7258871868".to_string(),
        };
        let screen = render_payment(&details, &appointment());
        assert!(screen.contains("OPD fee:     ₹200"));
        assert!(screen.contains("Pay via UPI: 7258871868"));
        assert!(screen.contains("2030-01-15"));
    }

    #[test]
    fn test_doctor_list_and_profile() {
        let doctors = render_doctors();
        assert_eq!(doctors.lines().count(), DOCTORS.len() + 1);
        assert!(doctors.contains("Dr. Vikram Verma"));

        assert_eq!(
            render_profile(None, UserRole::Guest),
            "No patient profile registered (role: guest)\n"
        );
        let profile = PatientProfile {
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
        };
        assert_eq!(
            render_profile(Some(&profile), UserRole::User),
            "Meera <meera@example.com> (role: user)\n"
        );
    }
}
