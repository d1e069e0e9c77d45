use super::{ensure_admin, ensure_authenticated, ensure_can_book};
use crate::domain::appointment::OpdRecord;
use crate::domain::patient::{CallerId, PatientProfile, UserRole};
use crate::domain::ports::RecordGateway;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Column Family for storing OPD records, keyed by insertion time.
pub const CF_OPD_RECORDS: &str = "opd_records";
/// Column Family for storing patient profiles, keyed by caller principal.
pub const CF_PATIENT_PROFILES: &str = "patient_profiles";
/// Column Family for explicitly assigned user roles, keyed by caller principal.
pub const CF_USER_ROLES: &str = "user_roles";

/// A persistent record gateway using RocksDB.
///
/// Records, profiles and role assignments live in separate Column Families.
/// Values are JSON so the data stays readable with generic tooling.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbRecordGateway {
    db: Arc<DB>,
    sequence: Arc<AtomicU64>,
}

impl RocksDbRecordGateway {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures the required column families exist and grants the admin role
    /// to every principal in `admins`.
    pub fn open<P: AsRef<Path>>(path: P, admins: impl IntoIterator<Item = CallerId>) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_OPD_RECORDS, CF_PATIENT_PROFILES, CF_USER_ROLES]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;
        let gateway = Self {
            db: Arc::new(db),
            sequence: Arc::new(AtomicU64::new(0)),
        };

        for admin in admins {
            gateway.put_json(CF_USER_ROLES, admin.as_str().as_bytes(), &UserRole::Admin)?;
        }

        Ok(gateway)
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| BookingError::Internal(format!("{} column family not found", name)))
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<(Vec<u8>, T)>> {
        let cf = self.cf(cf_name)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            entries.push((key.to_vec(), serde_json::from_slice(&value)?));
        }
        Ok(entries)
    }

    fn role_of(&self, caller: &CallerId) -> Result<UserRole> {
        let key = caller.as_str().as_bytes();
        let assigned: Option<UserRole> = self.get_json(CF_USER_ROLES, key)?;
        let has_profile = self.db.get_pinned_cf(self.cf(CF_PATIENT_PROFILES)?, key)?.is_some();
        Ok(UserRole::resolve(assigned, has_profile))
    }

    fn next_record_key(&self) -> Vec<u8> {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        // Zero-padded so lexicographic order is insertion order.
        format!("{:020}-{:010}", nanos, seq).into_bytes()
    }

    fn records(&self) -> Result<Vec<(CallerId, OpdRecord)>> {
        Ok(self
            .scan_json::<(CallerId, OpdRecord)>(CF_OPD_RECORDS)?
            .into_iter()
            .map(|(_, entry)| entry)
            .collect())
    }
}

#[async_trait]
impl RecordGateway for RocksDbRecordGateway {
    async fn create_opd_record(&self, caller: &CallerId, record: OpdRecord) -> Result<()> {
        ensure_can_book(caller, self.role_of(caller)?)?;
        let key = self.next_record_key();
        debug!(%caller, key = %String::from_utf8_lossy(&key), "storing OPD record");
        self.put_json(CF_OPD_RECORDS, &key, &(caller, &record))
    }

    async fn list_all_opd_records(&self, caller: &CallerId) -> Result<Vec<OpdRecord>> {
        ensure_admin(caller, self.role_of(caller)?, "list all OPD records")?;
        Ok(self.records()?.into_iter().map(|(_, record)| record).collect())
    }

    async fn patient_opd_records(
        &self,
        caller: &CallerId,
        patient: &CallerId,
    ) -> Result<Vec<OpdRecord>> {
        if caller != patient {
            ensure_admin(caller, self.role_of(caller)?, "view another patient's records")?;
        }
        Ok(self
            .records()?
            .into_iter()
            .filter(|(owner, _)| owner == patient)
            .map(|(_, record)| record)
            .collect())
    }

    async fn register_patient(&self, caller: &CallerId, name: &str, email: &str) -> Result<()> {
        ensure_authenticated(caller)?;
        let profile = PatientProfile {
            name: name.to_string(),
            email: email.to_string(),
        };
        self.put_json(CF_PATIENT_PROFILES, caller.as_str().as_bytes(), &profile)
    }

    async fn caller_patient_profile(&self, caller: &CallerId) -> Result<Option<PatientProfile>> {
        self.get_json(CF_PATIENT_PROFILES, caller.as_str().as_bytes())
    }

    async fn list_all_patient_profiles(
        &self,
        caller: &CallerId,
    ) -> Result<Vec<(CallerId, PatientProfile)>> {
        ensure_admin(caller, self.role_of(caller)?, "list patient profiles")?;
        Ok(self
            .scan_json::<PatientProfile>(CF_PATIENT_PROFILES)?
            .into_iter()
            .map(|(key, profile)| (CallerId::new(String::from_utf8_lossy(&key)), profile))
            .collect())
    }

    async fn caller_user_role(&self, caller: &CallerId) -> Result<UserRole> {
        self.role_of(caller)
    }

    async fn assign_user_role(
        &self,
        caller: &CallerId,
        user: &CallerId,
        role: UserRole,
    ) -> Result<()> {
        ensure_admin(caller, self.role_of(caller)?, "assign roles")?;
        self.put_json(CF_USER_ROLES, user.as_str().as_bytes(), &role)
    }
}
