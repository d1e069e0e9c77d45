use crate::application::session::Session;
use crate::domain::appointment::OpdRecord;
use crate::domain::patient::{CallerId, PatientProfile, UserRole};
use crate::error::{BookingError, Result};
use tracing::{info, warn};

/// Admin views over every booking and patient.
///
/// Checks the caller's role before each listing so a non-admin gets a clear
/// `AccessDenied` rather than a gateway rejection.
pub struct AdminConsole {
    session: Session,
}

impl AdminConsole {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    async fn ensure_admin(&self) -> Result<()> {
        let role = self.session.user_role().await?;
        if !role.is_admin() {
            warn!(caller = %self.session.caller(), %role, "admin access denied");
            return Err(BookingError::AccessDenied(
                "you do not have admin privileges".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn all_records(&self) -> Result<Vec<OpdRecord>> {
        self.ensure_admin().await?;
        self.session.list_all_opd_records().await
    }

    pub async fn all_patients(&self) -> Result<Vec<(CallerId, PatientProfile)>> {
        self.ensure_admin().await?;
        self.session.list_all_patient_profiles().await
    }

    pub async fn patient_records(&self, patient: &CallerId) -> Result<Vec<OpdRecord>> {
        self.ensure_admin().await?;
        self.session.patient_opd_records(patient).await
    }

    pub async fn assign_role(&self, user: &CallerId, role: UserRole) -> Result<()> {
        self.ensure_admin().await?;
        self.session.assign_user_role(user, role).await?;
        info!(caller = %self.session.caller(), %user, %role, "role assigned");
        Ok(())
    }
}
