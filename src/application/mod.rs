//! Application layer containing the booking workflow orchestration.
//!
//! Every service is built from an explicit [`session::Session`] (caller
//! identity plus gateway handle) instead of ambient global state. The
//! [`coordinator::BookingCoordinator`] is the form → payment → success state
//! machine at the heart of the crate.

pub mod account;
pub mod admin;
pub mod coordinator;
pub mod session;
