//! Domain layer: booking data model, validation rules and the ports the
//! application layer talks to.

pub mod appointment;
pub mod confirmation;
pub mod doctor;
pub mod patient;
pub mod ports;
pub mod validation;
