use super::appointment::OpdRecord;
use super::confirmation::ConfirmationRecord;
use super::patient::{CallerId, PatientProfile, UserRole};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The remote record store holding OPD records and patient profiles.
///
/// Every call is a single request/response scoped to `caller`. Implementations
/// enforce their own authorization and either fully apply a call or not at all.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn create_opd_record(&self, caller: &CallerId, record: OpdRecord) -> Result<()>;
    async fn list_all_opd_records(&self, caller: &CallerId) -> Result<Vec<OpdRecord>>;
    async fn patient_opd_records(
        &self,
        caller: &CallerId,
        patient: &CallerId,
    ) -> Result<Vec<OpdRecord>>;
    async fn register_patient(&self, caller: &CallerId, name: &str, email: &str) -> Result<()>;
    async fn caller_patient_profile(&self, caller: &CallerId) -> Result<Option<PatientProfile>>;
    async fn list_all_patient_profiles(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<(CallerId, PatientProfile)>>;
    async fn caller_user_role(&self, caller: &CallerId) -> Result<UserRole>;
    async fn assign_user_role(&self, caller: &CallerId, user: &CallerId, role: UserRole)
    -> Result<()>;
}

/// Short-lived local storage for the confirmation shown after payment.
#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    async fn put(&self, record: ConfirmationRecord) -> Result<()>;
    /// Returns the stored record and removes it, so it is read at most once.
    async fn take(&self) -> Result<Option<ConfirmationRecord>>;
}

pub type RecordGatewayRef = Arc<dyn RecordGateway>;
pub type ConfirmationStoreRef = Arc<dyn ConfirmationStore>;
