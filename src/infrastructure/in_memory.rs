use super::{ensure_admin, ensure_authenticated, ensure_can_book};
use crate::domain::appointment::OpdRecord;
use crate::domain::confirmation::ConfirmationRecord;
use crate::domain::patient::{CallerId, PatientProfile, UserRole};
use crate::domain::ports::{ConfirmationStore, RecordGateway};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage key the success display reads the confirmation from.
pub const APPOINTMENT_DATA_KEY: &str = "appointmentData";

#[derive(Default)]
struct GatewayState {
    records: Vec<(CallerId, OpdRecord)>,
    profiles: BTreeMap<CallerId, PatientProfile>,
    roles: HashMap<CallerId, UserRole>,
}

impl GatewayState {
    fn role_of(&self, caller: &CallerId) -> UserRole {
        UserRole::resolve(
            self.roles.get(caller).copied(),
            self.profiles.contains_key(caller),
        )
    }
}

/// A thread-safe in-memory record gateway.
///
/// Uses `Arc<RwLock<..>>` so clones share the same records. Ideal for tests
/// and single-process runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryRecordGateway {
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryRecordGateway {
    /// Creates a new, empty gateway with no admins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway where the given principals hold the admin role.
    pub fn with_admins(admins: impl IntoIterator<Item = CallerId>) -> Self {
        let roles = admins
            .into_iter()
            .map(|admin| (admin, UserRole::Admin))
            .collect();
        Self {
            state: Arc::new(RwLock::new(GatewayState {
                roles,
                ..GatewayState::default()
            })),
        }
    }
}

#[async_trait]
impl RecordGateway for InMemoryRecordGateway {
    async fn create_opd_record(&self, caller: &CallerId, record: OpdRecord) -> Result<()> {
        let mut state = self.state.write().await;
        ensure_can_book(caller, state.role_of(caller))?;
        debug!(%caller, doctor = %record.doctor_name, "storing OPD record");
        state.records.push((caller.clone(), record));
        Ok(())
    }

    async fn list_all_opd_records(&self, caller: &CallerId) -> Result<Vec<OpdRecord>> {
        let state = self.state.read().await;
        ensure_admin(caller, state.role_of(caller), "list all OPD records")?;
        Ok(state.records.iter().map(|(_, record)| record.clone()).collect())
    }

    async fn patient_opd_records(
        &self,
        caller: &CallerId,
        patient: &CallerId,
    ) -> Result<Vec<OpdRecord>> {
        let state = self.state.read().await;
        if caller != patient {
            ensure_admin(caller, state.role_of(caller), "view another patient's records")?;
        }
        Ok(state
            .records
            .iter()
            .filter(|(owner, _)| owner == patient)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn register_patient(&self, caller: &CallerId, name: &str, email: &str) -> Result<()> {
        ensure_authenticated(caller)?;
        let mut state = self.state.write().await;
        state.profiles.insert(
            caller.clone(),
            PatientProfile {
                name: name.to_string(),
                email: email.to_string(),
            },
        );
        Ok(())
    }

    async fn caller_patient_profile(&self, caller: &CallerId) -> Result<Option<PatientProfile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(caller).cloned())
    }

    async fn list_all_patient_profiles(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<(CallerId, PatientProfile)>> {
        let state = self.state.read().await;
        ensure_admin(caller, state.role_of(caller), "list patient profiles")?;
        Ok(state
            .profiles
            .iter()
            .map(|(id, profile)| (id.clone(), profile.clone()))
            .collect())
    }

    async fn caller_user_role(&self, caller: &CallerId) -> Result<UserRole> {
        let state = self.state.read().await;
        Ok(state.role_of(caller))
    }

    async fn assign_user_role(
        &self,
        caller: &CallerId,
        user: &CallerId,
        role: UserRole,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        ensure_admin(caller, state.role_of(caller), "assign roles")?;
        state.roles.insert(user.clone(), role);
        Ok(())
    }
}

/// Session-scoped key/value storage, the in-process stand-in for browser
/// session storage. Values are kept as JSON text.
#[derive(Default, Clone)]
pub struct InMemoryConfirmationStore {
    entries: Arc<RwLock<HashMap<&'static str, String>>>,
}

impl InMemoryConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently held under the confirmation key, without consuming it.
    pub async fn peek_raw(&self) -> Option<String> {
        self.entries.read().await.get(APPOINTMENT_DATA_KEY).cloned()
    }
}

#[async_trait]
impl ConfirmationStore for InMemoryConfirmationStore {
    async fn put(&self, record: ConfirmationRecord) -> Result<()> {
        let json = serde_json::to_string(&record)?;
        self.entries.write().await.insert(APPOINTMENT_DATA_KEY, json);
        Ok(())
    }

    async fn take(&self) -> Result<Option<ConfirmationRecord>> {
        let raw = self.entries.write().await.remove(APPOINTMENT_DATA_KEY);
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::appointment::{Gender, PendingAppointment};
    use crate::domain::confirmation::ConfirmationNumber;
    use crate::error::BookingError;
    use chrono::NaiveDate;

    fn record(name: &str) -> OpdRecord {
        OpdRecord {
            patient_name: name.to_string(),
            age: 40,
            address: "5 Park Street".to_string(),
            gender: Gender::Male,
            appointment_date: NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(),
            doctor_name: "Dr. Amit Singh".to_string(),
        }
    }

    #[tokio::test]
    async fn test_guest_cannot_create_record() {
        let gateway = InMemoryRecordGateway::new();
        let caller = CallerId::new("guest-1");

        let result = gateway.create_opd_record(&caller, record("Ravi")).await;
        assert!(matches!(result, Err(BookingError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_registered_patient_books_and_sees_own_records() {
        let gateway = InMemoryRecordGateway::new();
        let ravi = CallerId::new("ravi");
        let meera = CallerId::new("meera");

        gateway.register_patient(&ravi, "Ravi", "ravi@example.com").await.unwrap();
        gateway.register_patient(&meera, "Meera", "meera@example.com").await.unwrap();
        gateway.create_opd_record(&ravi, record("Ravi")).await.unwrap();
        gateway.create_opd_record(&meera, record("Meera")).await.unwrap();

        let own = gateway.patient_opd_records(&ravi, &ravi).await.unwrap();
        assert_eq!(own, vec![record("Ravi")]);

        let other = gateway.patient_opd_records(&ravi, &meera).await;
        assert!(matches!(other, Err(BookingError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_anonymous_registration_rejected() {
        let gateway = InMemoryRecordGateway::new();
        let result = gateway
            .register_patient(&CallerId::anonymous(), "Anon", "anon@example.com")
            .await;
        assert!(matches!(result, Err(BookingError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_roles_follow_registration_and_assignment() {
        let admin = CallerId::new("admin");
        let gateway = InMemoryRecordGateway::with_admins([admin.clone()]);
        let patient = CallerId::new("patient");

        assert_eq!(gateway.caller_user_role(&patient).await.unwrap(), UserRole::Guest);
        gateway.register_patient(&patient, "P", "p@example.com").await.unwrap();
        assert_eq!(gateway.caller_user_role(&patient).await.unwrap(), UserRole::User);

        gateway.assign_user_role(&admin, &patient, UserRole::Admin).await.unwrap();
        assert_eq!(gateway.caller_user_role(&patient).await.unwrap(), UserRole::Admin);

        let denied = gateway
            .assign_user_role(&CallerId::new("nobody"), &patient, UserRole::Guest)
            .await;
        assert!(matches!(denied, Err(BookingError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_admin_lists_everything() {
        let admin = CallerId::new("admin");
        let gateway = InMemoryRecordGateway::with_admins([admin.clone()]);
        let patient = CallerId::new("patient");
        gateway.register_patient(&patient, "P", "p@example.com").await.unwrap();
        gateway.create_opd_record(&patient, record("P")).await.unwrap();

        assert_eq!(gateway.list_all_opd_records(&admin).await.unwrap().len(), 1);
        let profiles = gateway.list_all_patient_profiles(&admin).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].0, patient);

        assert!(gateway.list_all_opd_records(&patient).await.is_err());
        assert!(gateway.list_all_patient_profiles(&patient).await.is_err());
    }

    #[tokio::test]
    async fn test_confirmation_store_reads_once() {
        let store = InMemoryConfirmationStore::new();
        assert!(store.take().await.unwrap().is_none());

        let confirmation = ConfirmationRecord::new(
            PendingAppointment::new(record("Ravi")),
            ConfirmationNumber::generate(),
        );
        store.put(confirmation.clone()).await.unwrap();

        let raw = store.peek_raw().await.unwrap();
        assert!(raw.contains("\"confirmationNumber\":\"SNH"));

        assert_eq!(store.take().await.unwrap(), Some(confirmation));
        assert!(store.take().await.unwrap().is_none());
    }
}
