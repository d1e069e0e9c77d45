use super::in_memory::APPOINTMENT_DATA_KEY;
use crate::domain::confirmation::ConfirmationRecord;
use crate::domain::ports::ConfirmationStore;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Confirmation storage backed by a small JSON file.
///
/// The file holds one object keyed like browser session storage, so a
/// confirmation written by one run of the CLI can be shown by the next.
/// `take` deletes the file.
#[derive(Debug, Clone)]
pub struct JsonFileConfirmationStore {
    path: PathBuf,
}

impl JsonFileConfirmationStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfirmationStore for JsonFileConfirmationStore {
    async fn put(&self, record: ConfirmationRecord) -> Result<()> {
        let mut entries = Map::new();
        entries.insert(APPOINTMENT_DATA_KEY.to_string(), serde_json::to_value(&record)?);
        let bytes = serde_json::to_vec_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!(path = %self.path.display(), "wrote confirmation");
        Ok(())
    }

    async fn take(&self) -> Result<Option<ConfirmationRecord>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        tokio::fs::remove_file(&self.path).await?;

        let mut entries: Map<String, Value> = serde_json::from_slice(&bytes)?;
        match entries.remove(APPOINTMENT_DATA_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::appointment::{Gender, OpdRecord, PendingAppointment};
    use crate::domain::confirmation::ConfirmationNumber;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn confirmation() -> ConfirmationRecord {
        ConfirmationRecord::new(
            PendingAppointment::new(OpdRecord {
                patient_name: "Kiran".to_string(),
                age: 7,
                address: "Lane 4".to_string(),
                gender: Gender::Other,
                appointment_date: NaiveDate::from_ymd_opt(2031, 2, 10).unwrap(),
                doctor_name: "Dr. Sunita Gupta".to_string(),
            }),
            ConfirmationNumber::generate(),
        )
    }

    #[tokio::test]
    async fn test_put_then_take_once() {
        let dir = tempdir().unwrap();
        let store = JsonFileConfirmationStore::new(dir.path().join("session.json"));

        let record = confirmation();
        store.put(record.clone()).await.unwrap();
        assert!(store.path().exists());

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("appointmentData"));

        assert_eq!(store.take().await.unwrap(), Some(record));
        assert!(!store.path().exists());
        assert!(store.take().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileConfirmationStore::new(dir.path().join("absent.json"));
        assert!(store.take().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileConfirmationStore::new(&path);
        assert!(store.take().await.is_err());
    }
}
