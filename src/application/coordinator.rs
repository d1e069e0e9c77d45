use crate::application::session::Session;
use crate::config::PaymentDetails;
use crate::domain::appointment::{AppointmentForm, OpdRecord, PendingAppointment};
use crate::domain::confirmation::{ConfirmationNumber, ConfirmationRecord};
use crate::domain::ports::ConfirmationStoreRef;
use crate::domain::validation::validate_appointment;
use crate::error::{BookingError, Result};
use chrono::Utc;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// The visible step of the booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    Form,
    Submitting,
    Payment,
    Confirming,
    Completed,
}

impl BookingStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStep::Form => "form",
            BookingStep::Submitting => "submitting",
            BookingStep::Payment => "payment",
            BookingStep::Confirming => "confirming",
            BookingStep::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum StepState {
    Form,
    Submitting,
    Payment(PendingAppointment),
    Confirming,
    Completed,
}

impl StepState {
    fn step(&self) -> BookingStep {
        match self {
            StepState::Form => BookingStep::Form,
            StepState::Submitting => BookingStep::Submitting,
            StepState::Payment(_) => BookingStep::Payment,
            StepState::Confirming => BookingStep::Confirming,
            StepState::Completed => BookingStep::Completed,
        }
    }
}

fn lock(state: &Mutex<StepState>) -> MutexGuard<'_, StepState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the flow back on the form if a submission ends without reaching payment,
/// including when the submitting future is dropped mid-call.
struct SubmissionGuard<'a> {
    state: &'a Mutex<StepState>,
    armed: bool,
}

impl SubmissionGuard<'_> {
    fn finish(mut self, next: StepState) {
        *lock(self.state) = next;
        self.armed = false;
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = lock(self.state);
            if matches!(*state, StepState::Submitting) {
                *state = StepState::Form;
            }
        }
    }
}

/// Hands the pending appointment back to the payment step if the
/// confirmation is not written, provided nothing else moved the flow meanwhile.
struct ConfirmationGuard<'a> {
    state: &'a Mutex<StepState>,
    pending: Option<PendingAppointment>,
}

impl ConfirmationGuard<'_> {
    fn finish(mut self) {
        *lock(self.state) = StepState::Completed;
        self.pending = None;
    }
}

impl Drop for ConfirmationGuard<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            let mut state = lock(self.state);
            if matches!(*state, StepState::Confirming) {
                *state = StepState::Payment(pending);
            }
        }
    }
}

/// Drives one patient through form → payment → success.
///
/// The step lives behind a mutex that is never held across a gateway call;
/// the `Submitting` step is what keeps a second submit from issuing another
/// create-record call while the first is outstanding, and `Confirming` holds
/// the flow while the confirmation is written. Share it with `Arc` when
/// several tasks may trigger actions.
pub struct BookingCoordinator {
    session: Session,
    confirmations: ConfirmationStoreRef,
    payment: PaymentDetails,
    state: Mutex<StepState>,
}

impl BookingCoordinator {
    pub fn new(session: Session, confirmations: ConfirmationStoreRef, payment: PaymentDetails) -> Self {
        Self {
            session,
            confirmations,
            payment,
            state: Mutex::new(StepState::Form),
        }
    }

    pub fn step(&self) -> BookingStep {
        lock(&self.state).step()
    }

    /// The appointment awaiting payment, if the flow is on the payment step.
    pub fn pending_appointment(&self) -> Option<OpdRecord> {
        match &*lock(&self.state) {
            StepState::Payment(pending) => Some(pending.record().clone()),
            _ => None,
        }
    }

    /// Validates the form and persists it as an OPD record.
    ///
    /// Moves to the payment step only when the gateway accepts the record. A
    /// rejected or failed call leaves the flow on the form so the patient can
    /// resubmit; nothing is retried here.
    pub async fn submit(&self, form: &AppointmentForm) -> Result<()> {
        let record = {
            let mut state = lock(&self.state);
            match &*state {
                StepState::Form => {}
                StepState::Submitting => return Err(BookingError::SubmissionInFlight),
                other => {
                    return Err(BookingError::InvalidStep {
                        action: "submit the form",
                        step: other.step().as_str(),
                    });
                }
            }
            let record = validate_appointment(form, Utc::now().date_naive())?;
            *state = StepState::Submitting;
            record
        };

        let guard = SubmissionGuard {
            state: &self.state,
            armed: true,
        };

        match self.session.create_opd_record(record.clone()).await {
            Ok(()) => {
                info!(
                    caller = %self.session.caller(),
                    doctor = %record.doctor_name,
                    date = %record.appointment_date,
                    "OPD form submitted, awaiting payment"
                );
                guard.finish(StepState::Payment(PendingAppointment::new(record)));
                Ok(())
            }
            Err(e) => {
                warn!(caller = %self.session.caller(), error = %e, "OPD form submission failed");
                Err(BookingError::Submission(e.to_string()))
            }
        }
    }

    /// Fee and UPI number to show while the patient pays.
    pub fn payment_details(&self) -> Result<PaymentDetails> {
        match lock(&self.state).step() {
            BookingStep::Payment => Ok(self.payment.clone()),
            step => Err(BookingError::InvalidStep {
                action: "show payment details",
                step: step.as_str(),
            }),
        }
    }

    /// Records the patient's word that the fee was paid and issues the confirmation.
    ///
    /// The payment itself is not verified. The confirmation is written to the
    /// confirmation store exactly once; if that write fails, or the call is
    /// dropped before it finishes, the flow goes back to the payment step.
    pub async fn acknowledge_payment(&self) -> Result<ConfirmationRecord> {
        let pending = {
            let mut state = lock(&self.state);
            match std::mem::replace(&mut *state, StepState::Confirming) {
                StepState::Payment(pending) => pending,
                other => {
                    let step = other.step();
                    *state = other;
                    return Err(BookingError::InvalidStep {
                        action: "acknowledge payment",
                        step: step.as_str(),
                    });
                }
            }
        };

        warn!(
            caller = %self.session.caller(),
            "payment acknowledged by the patient; no payment verification is performed"
        );

        let confirmation = ConfirmationRecord::new(pending.clone(), ConfirmationNumber::generate());
        let guard = ConfirmationGuard {
            state: &self.state,
            pending: Some(pending),
        };
        if let Err(e) = self.confirmations.put(confirmation.clone()).await {
            warn!(caller = %self.session.caller(), error = %e, "confirmation could not be stored");
            return Err(e);
        }
        guard.finish();

        info!(
            caller = %self.session.caller(),
            confirmation = %confirmation.confirmation_number,
            "appointment confirmed"
        );
        Ok(confirmation)
    }

    /// Returns to an empty form, e.g. to book another appointment.
    ///
    /// An appointment still waiting on the payment step is dropped; its OPD
    /// record stays in the gateway.
    pub fn start_over(&self) -> Result<()> {
        let mut state = lock(&self.state);
        match *state {
            StepState::Submitting => return Err(BookingError::SubmissionInFlight),
            StepState::Confirming => {
                return Err(BookingError::InvalidStep {
                    action: "start over",
                    step: BookingStep::Confirming.as_str(),
                });
            }
            _ => {}
        }
        *state = StepState::Form;
        Ok(())
    }
}
