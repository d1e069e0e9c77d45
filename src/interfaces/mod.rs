//! Outer surfaces: CSV export for the admin views and console rendering of
//! the payment and success screens.

pub mod console;
pub mod csv;
