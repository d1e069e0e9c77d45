use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn opd() -> Command {
    let mut cmd = Command::new(cargo_bin!("opd-booking"));
    cmd.env_remove("OPD_DB_PATH")
        .env_remove("OPD_ADMIN")
        .env_remove("OPD_CALLER");
    cmd
}

#[test]
fn test_empty_form_reports_every_field() {
    let dir = tempfile::tempdir().unwrap();

    opd()
        .arg("--session-file")
        .arg(dir.path().join("session.json"))
        .args(["--caller", "someone", "book", "--paid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("patientName: Name is required"))
        .stderr(predicate::str::contains("age: Valid age required (1-120)"))
        .stderr(predicate::str::contains("address: Address is required"))
        .stderr(predicate::str::contains("appointmentDate: Date is required"))
        .stderr(predicate::str::contains("doctorName: Please select a doctor"));
}

#[test]
fn test_unregistered_caller_cannot_book() {
    let dir = tempfile::tempdir().unwrap();

    opd()
        .arg("--session-file")
        .arg(dir.path().join("session.json"))
        .args(["--caller", "stranger", "book", "--paid"])
        .args(["--patient-name", "Ravi", "--age", "40", "--address", "Lane 2"])
        .args(["--date", "2999-01-01", "--doctor", "Dr. Amit Singh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to submit form"))
        .stdout(predicate::str::contains("Appointment Confirmed!").not());
}

#[test]
fn test_unknown_gender_is_rejected_by_parser() {
    opd()
        .args(["book", "--gender", "unknown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown gender"));
}

#[test]
fn test_anonymous_registration_fails() {
    opd()
        .args(["register", "--name", "Anon", "--email", "anon@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to register patient"));
}

#[test]
fn test_invalid_email_is_reported() {
    opd()
        .args(["--caller", "meera", "register", "--name", "Meera", "--email", "meera"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email: Enter a valid email address"));
}

#[test]
fn test_non_admin_cannot_export_records() {
    opd()
        .args(["--caller", "meera", "records"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn test_admin_export_of_empty_store() {
    opd()
        .args(["--caller", "boss", "--admin", "boss", "records"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "patientName,age,address,gender,appointmentDate,doctorName",
        ));
}

#[test]
fn test_profile_of_new_caller() {
    opd()
        .args(["--caller", "meera", "profile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No patient profile registered (role: guest)"));
}

#[test]
fn test_non_positive_fee_is_a_configuration_error() {
    opd()
        .args(["--opd-fee", "0", "doctors"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration: OPD fee must be positive"));
}

#[test]
fn test_blank_upi_number_is_a_configuration_error() {
    opd()
        .args(["--upi-number", " ", "doctors"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration: UPI number cannot be empty"));
}
