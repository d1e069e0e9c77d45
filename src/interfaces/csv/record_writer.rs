use crate::domain::appointment::OpdRecord;
use crate::domain::patient::{CallerId, PatientProfile};
use crate::error::{BookingError, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ProfileRow<'a> {
    caller: &'a str,
    name: &'a str,
    email: &'a str,
}

/// Writes OPD records and patient profiles as CSV.
///
/// Headers come from the serialized field names, so the record columns match
/// the JSON keys (`patientName`, `appointmentDate`, ...).
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    /// Creates a new `RecordWriter` over any `Write` sink (e.g. Stdout, File).
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_records(&mut self, records: &[OpdRecord]) -> Result<()> {
        if records.is_empty() {
            self.writer.write_record([
                "patientName",
                "age",
                "address",
                "gender",
                "appointmentDate",
                "doctorName",
            ])?;
        }
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_profiles(&mut self, profiles: &[(CallerId, PatientProfile)]) -> Result<()> {
        if profiles.is_empty() {
            self.writer.write_record(["caller", "name", "email"])?;
        }
        for (caller, profile) in profiles {
            self.writer.serialize(ProfileRow {
                caller: caller.as_str(),
                name: &profile.name,
                email: &profile.email,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| BookingError::Io(e.into_error()))
    }
}
