//! Booking configuration.
//!
//! Resolved once at startup (from CLI flags and environment) and passed into
//! the services, so nothing reads process-wide settings while a booking runs.

use crate::domain::patient::CallerId;
use crate::error::{BookingError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const DEFAULT_OPD_FEE: Decimal = dec!(200);
pub const DEFAULT_UPI_NUMBER: &str = "7258871868";

/// Where and how much the patient pays before acknowledging payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub opd_fee: Decimal,
    pub upi_number: String,
}

impl PaymentDetails {
    /// Fee formatted for display, e.g. `₹200`.
    pub fn fee_display(&self) -> String {
        format!("₹{}", self.opd_fee.normalize())
    }
}

#[derive(Debug, Clone)]
pub struct BookingConfig {
    payment: PaymentDetails,
    admins: Vec<CallerId>,
}

impl BookingConfig {
    pub fn new(opd_fee: Decimal, upi_number: String, admins: Vec<CallerId>) -> Result<Self> {
        if opd_fee <= Decimal::ZERO {
            return Err(BookingError::Config("OPD fee must be positive".to_string()));
        }
        let upi_number = upi_number.trim().to_string();
        if upi_number.is_empty() {
            return Err(BookingError::Config("UPI number cannot be empty".to_string()));
        }

        Ok(Self {
            payment: PaymentDetails {
                opd_fee,
                upi_number,
            },
            admins,
        })
    }

    pub fn payment(&self) -> &PaymentDetails {
        &self.payment
    }

    pub fn admins(&self) -> &[CallerId] {
        &self.admins
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            payment: PaymentDetails {
                opd_fee: DEFAULT_OPD_FEE,
                upi_number: DEFAULT_UPI_NUMBER.to_string(),
            },
            admins: Vec::new(),
        }
    }
}
