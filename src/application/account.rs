use crate::application::session::Session;
use crate::domain::appointment::OpdRecord;
use crate::domain::patient::{PatientProfile, UserRole};
use crate::domain::validation::validate_registration;
use crate::error::{BookingError, Result};
use tracing::{info, warn};

/// The logged-in patient's own view: registration, profile and bookings.
pub struct PatientAccount {
    session: Session,
}

impl PatientAccount {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Registers (or re-registers) the caller's patient profile.
    pub async fn register(&self, name: &str, email: &str) -> Result<PatientProfile> {
        validate_registration(name, email)?;
        let profile = PatientProfile {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        };

        if let Err(e) = self
            .session
            .register_patient(&profile.name, &profile.email)
            .await
        {
            warn!(caller = %self.session.caller(), error = %e, "patient registration failed");
            return Err(BookingError::ProfileRegistration(e.to_string()));
        }

        info!(caller = %self.session.caller(), "patient registered");
        Ok(profile)
    }

    pub async fn profile(&self) -> Result<Option<PatientProfile>> {
        self.session.patient_profile().await
    }

    pub async fn role(&self) -> Result<UserRole> {
        self.session.user_role().await
    }

    pub async fn own_records(&self) -> Result<Vec<OpdRecord>> {
        self.session.patient_opd_records(self.session.caller()).await
    }
}
