//! Adapters for the domain ports: an in-memory record gateway and confirmation
//! stores, plus an optional RocksDB-backed gateway.

use crate::domain::patient::{CallerId, UserRole};
use crate::error::{BookingError, Result};

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

pub(crate) fn ensure_authenticated(caller: &CallerId) -> Result<()> {
    if caller.is_anonymous() {
        return Err(BookingError::Unauthorized(
            "anonymous callers must log in first".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_can_book(caller: &CallerId, role: UserRole) -> Result<()> {
    if !role.can_book() {
        return Err(BookingError::Unauthorized(format!(
            "caller {} must register before booking",
            caller
        )));
    }
    Ok(())
}

pub(crate) fn ensure_admin(caller: &CallerId, role: UserRole, action: &str) -> Result<()> {
    if !role.is_admin() {
        return Err(BookingError::Unauthorized(format!(
            "only admins can {} (caller {} is {})",
            action, caller, role
        )));
    }
    Ok(())
}
