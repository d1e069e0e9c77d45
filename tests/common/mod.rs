#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use opd_booking::domain::appointment::{AppointmentForm, Gender, OpdRecord};
use opd_booking::domain::patient::{CallerId, PatientProfile, UserRole};
use opd_booking::domain::ports::RecordGateway;
use opd_booking::error::{BookingError, Result};
use opd_booking::infrastructure::in_memory::InMemoryRecordGateway;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn tomorrow() -> String {
    (Utc::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

pub fn asha_form() -> AppointmentForm {
    AppointmentForm {
        patient_name: "Asha Rao".to_string(),
        age: "34".to_string(),
        address: "12 MG Road".to_string(),
        gender: Gender::Female,
        appointment_date: tomorrow(),
        doctor_name: "Dr. Priya Patel".to_string(),
    }
}

/// In-memory gateway that counts create-record calls and can be told to
/// reject them, the way a backend outage would.
#[derive(Default)]
pub struct CountingGateway {
    inner: InMemoryRecordGateway,
    creates: AtomicUsize,
    reject: AtomicBool,
}

impl CountingGateway {
    pub fn new(inner: InMemoryRecordGateway) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordGateway for CountingGateway {
    async fn create_opd_record(&self, caller: &CallerId, record: OpdRecord) -> Result<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.reject.load(Ordering::SeqCst) {
            return Err(BookingError::Internal("backend unavailable".to_string()));
        }
        self.inner.create_opd_record(caller, record).await
    }

    async fn list_all_opd_records(&self, caller: &CallerId) -> Result<Vec<OpdRecord>> {
        self.inner.list_all_opd_records(caller).await
    }

    async fn patient_opd_records(
        &self,
        caller: &CallerId,
        patient: &CallerId,
    ) -> Result<Vec<OpdRecord>> {
        self.inner.patient_opd_records(caller, patient).await
    }

    async fn register_patient(&self, caller: &CallerId, name: &str, email: &str) -> Result<()> {
        self.inner.register_patient(caller, name, email).await
    }

    async fn caller_patient_profile(&self, caller: &CallerId) -> Result<Option<PatientProfile>> {
        self.inner.caller_patient_profile(caller).await
    }

    async fn list_all_patient_profiles(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<(CallerId, PatientProfile)>> {
        self.inner.list_all_patient_profiles(caller).await
    }

    async fn caller_user_role(&self, caller: &CallerId) -> Result<UserRole> {
        self.inner.caller_user_role(caller).await
    }

    async fn assign_user_role(
        &self,
        caller: &CallerId,
        user: &CallerId,
        role: UserRole,
    ) -> Result<()> {
        self.inner.assign_user_role(caller, user, role).await
    }
}
