use crate::domain::appointment::{OpdRecord, PendingAppointment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CONFIRMATION_PREFIX: &str = "SNH";
const SUFFIX_DIGITS: usize = 6;
const SUFFIX_MODULUS: i64 = 1_000_000;

/// Human-presentable booking code shown on the success screen.
///
/// Derived from the clock rather than the record store, so it is unique only
/// with high probability within one session. It is a display code, not a key.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct ConfirmationNumber(String);

impl ConfirmationNumber {
    pub fn generate() -> Self {
        Self::from_time(Utc::now())
    }

    /// Builds the code from the last six digits of the Unix time in milliseconds.
    pub fn from_time(time: DateTime<Utc>) -> Self {
        let suffix = time.timestamp_millis().rem_euclid(SUFFIX_MODULUS);
        Self(format!(
            "{}{:0width$}",
            CONFIRMATION_PREFIX,
            suffix,
            width = SUFFIX_DIGITS
        ))
    }

    pub fn is_well_formed(code: &str) -> bool {
        match code.strip_prefix(CONFIRMATION_PREFIX) {
            Some(digits) => {
                digits.len() == SUFFIX_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfirmationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The completed booking as handed to the success display.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRecord {
    #[serde(flatten)]
    pub appointment: OpdRecord,
    pub confirmation_number: ConfirmationNumber,
}

impl ConfirmationRecord {
    pub fn new(pending: PendingAppointment, confirmation_number: ConfirmationNumber) -> Self {
        Self {
            appointment: pending.into_record(),
            confirmation_number,
        }
    }
}
