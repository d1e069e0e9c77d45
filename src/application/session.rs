use crate::domain::appointment::OpdRecord;
use crate::domain::patient::{CallerId, PatientProfile, UserRole};
use crate::domain::ports::RecordGatewayRef;
use crate::error::Result;

/// The caller's identity bound to a gateway handle.
///
/// Created once when the caller logs in and handed to each service, so every
/// gateway call is scoped to the same principal.
#[derive(Clone)]
pub struct Session {
    caller: CallerId,
    gateway: RecordGatewayRef,
}

impl Session {
    pub fn new(caller: CallerId, gateway: RecordGatewayRef) -> Self {
        Self { caller, gateway }
    }

    pub fn caller(&self) -> &CallerId {
        &self.caller
    }

    pub async fn create_opd_record(&self, record: OpdRecord) -> Result<()> {
        self.gateway.create_opd_record(&self.caller, record).await
    }

    pub async fn list_all_opd_records(&self) -> Result<Vec<OpdRecord>> {
        self.gateway.list_all_opd_records(&self.caller).await
    }

    pub async fn patient_opd_records(&self, patient: &CallerId) -> Result<Vec<OpdRecord>> {
        self.gateway.patient_opd_records(&self.caller, patient).await
    }

    pub async fn register_patient(&self, name: &str, email: &str) -> Result<()> {
        self.gateway.register_patient(&self.caller, name, email).await
    }

    pub async fn patient_profile(&self) -> Result<Option<PatientProfile>> {
        self.gateway.caller_patient_profile(&self.caller).await
    }

    pub async fn list_all_patient_profiles(&self) -> Result<Vec<(CallerId, PatientProfile)>> {
        self.gateway.list_all_patient_profiles(&self.caller).await
    }

    pub async fn user_role(&self) -> Result<UserRole> {
        self.gateway.caller_user_role(&self.caller).await
    }

    pub async fn assign_user_role(&self, user: &CallerId, role: UserRole) -> Result<()> {
        self.gateway.assign_user_role(&self.caller, user, role).await
    }
}
