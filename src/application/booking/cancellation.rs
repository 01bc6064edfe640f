//! The cancellation workflow.
//!
//! Cancelling a confirmed booking is a multi-step run against four
//! collaborators (scheduler, payment gateway, messaging, record store).
//! Each step's failure policy comes from the declared table in the domain
//! layer, and the run persists a cursor per attempt so a failed or
//! interrupted run can be resumed without repeating completed steps.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::booking::resolver::{project_gig_status, project_hire_status};
use crate::domain::{
    ARTIST_CANCELLATION_STEPS, AttemptState, BookingStatus, CancellationAttempt,
    CancellationError, CancellationReason, CancellationRecord, FailurePolicy, Gig, PerformerId,
    SagaStep, VenueId,
};
use crate::infra::db::Database;
use crate::infra::messaging::MessagingService;
use crate::infra::payments::PaymentGateway;
use crate::infra::scheduler::ScheduledTaskRegistry;

/// Venue-side permission required to cancel a venue hire.
pub const GIGS_UPDATE_PERMISSION: &str = "gigs.update";

/// Who is asking for the cancellation.
#[derive(Debug, Clone)]
pub enum CancellationActor {
    /// The confirmed performer cancelling their own slot.
    Performer { performer_id: PerformerId },
    /// A venue member acting for the venue.
    VenueMember {
        member_id: String,
        venue_id: VenueId,
        permissions: Vec<String>,
    },
}

pub struct CancellationSaga {
    db: Arc<Database>,
    scheduler: Arc<dyn ScheduledTaskRegistry>,
    payments: Arc<dyn PaymentGateway>,
}

impl CancellationSaga {
    pub fn new(
        db: Arc<Database>,
        scheduler: Arc<dyn ScheduledTaskRegistry>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            scheduler,
            payments,
        }
    }

    fn messaging(&self) -> MessagingService {
        MessagingService::new(self.db.conversation_repo(), self.db.message_repo())
    }

    /// Cancel a confirmed artist booking.
    ///
    /// Preconditions are checked before any step runs: the gig must resolve
    /// to `Confirmed` and the actor must be the confirmed performer. A
    /// repeat invocation on an already-unwound booking fails the status
    /// precondition, which is what makes the workflow safe to re-enter.
    pub async fn cancel_booking(
        &self,
        gig_id: &str,
        actor: &CancellationActor,
        reason: CancellationReason,
    ) -> Result<CancellationAttempt, CancellationError> {
        let gigs = self.db.gig_repo();
        let gig = gigs
            .find_by_id(&gig_id.to_string())?
            .ok_or_else(|| CancellationError::NotFound(gig_id.to_string()))?;

        let status = project_gig_status(&gig);
        if status != BookingStatus::Confirmed {
            return Err(CancellationError::NotConfirmed {
                gig_id: gig.id,
                status,
            });
        }
        let confirmed = gig
            .confirmed_applicant()
            .ok_or_else(|| CancellationError::NotConfirmed {
                gig_id: gig.id.clone(),
                status: BookingStatus::Open,
            })?;
        match actor {
            CancellationActor::Performer { performer_id }
                if *performer_id == confirmed.performer_id => {}
            _ => {
                return Err(CancellationError::NotPermitted(format!(
                    "only the confirmed performer may cancel gig {}",
                    gig.id
                )));
            }
        }

        let now = Utc::now().to_rfc3339();
        let mut attempt = CancellationAttempt {
            id: Uuid::new_v4().to_string(),
            gig_id: gig.id.clone(),
            performer_id: confirmed.performer_id.clone(),
            reason,
            cursor: SagaStep::CancelFeeRelease,
            state: AttemptState::Running,
            created_at: now.clone(),
            updated_at: now,
        };
        self.db.cancellation_repo().save_attempt(&attempt)?;

        self.run_artist_steps(&mut attempt).await?;
        Ok(attempt)
    }

    /// Resume a parked or interrupted attempt from its cursor.
    ///
    /// Steps before the cursor are not repeated; a `PendingRefund` attempt
    /// retries the refund first. Resuming a completed attempt is a no-op.
    pub async fn resume(&self, attempt_id: &str) -> Result<CancellationAttempt, CancellationError> {
        let mut attempt = self
            .db
            .cancellation_repo()
            .find_attempt(attempt_id)?
            .ok_or_else(|| CancellationError::AttemptNotFound(attempt_id.to_string()))?;
        if attempt.state == AttemptState::Completed {
            return Ok(attempt);
        }
        attempt.state = AttemptState::Running;
        self.run_artist_steps(&mut attempt).await?;
        Ok(attempt)
    }

    /// Cancel a confirmed venue hire: the hirer is dropped, the opportunity
    /// returns to the open market, and the hirer is notified only when the
    /// booking came through the platform's own conversation flow.
    pub async fn cancel_venue_hire(
        &self,
        opportunity_id: &str,
        actor: &CancellationActor,
        reason: CancellationReason,
        notify: bool,
    ) -> Result<(), CancellationError> {
        let hires = self.db.venue_hire_repo();
        let mut opportunity = hires
            .find_by_id(&opportunity_id.to_string())?
            .ok_or_else(|| CancellationError::NotFound(opportunity_id.to_string()))?;

        let status = project_hire_status(&opportunity);
        if status != BookingStatus::Confirmed {
            return Err(CancellationError::NotConfirmed {
                gig_id: opportunity.id,
                status,
            });
        }
        let member_id = match actor {
            CancellationActor::VenueMember {
                member_id,
                venue_id,
                permissions,
            } if *venue_id == opportunity.venue_id
                && permissions.iter().any(|p| p == GIGS_UPDATE_PERMISSION) =>
            {
                member_id.clone()
            }
            _ => {
                return Err(CancellationError::NotPermitted(format!(
                    "cancelling venue hire {} requires the {} permission on venue {}",
                    opportunity.id, GIGS_UPDATE_PERMISSION, opportunity.venue_id
                )));
            }
        };

        // A manual hirer name has no account to notify; a platform hirer is
        // only notified through a thread that already exists.
        if notify && let Some(hirer_user_id) = opportunity.hirer_user_id.clone() {
            let messaging = self.messaging();
            match messaging.find_conversation(&hirer_user_id, &opportunity.id) {
                Ok(Some(conversation)) => {
                    let text = format!(
                        "{} has cancelled this venue hire because {}.",
                        opportunity.venue_name,
                        reason.phrase()
                    );
                    if let Err(err) =
                        messaging.append_announcement(&conversation, &member_id, &text)
                    {
                        log::warn!(
                            "failed to notify hirer of cancelled hire {}: {err}",
                            opportunity.id
                        );
                    }
                }
                Ok(None) => {}
                Err(err) => log::warn!(
                    "failed to look up conversation for hire {}: {err}",
                    opportunity.id
                ),
            }
        }

        opportunity
            .release_hire()
            .map_err(|e| CancellationError::OperationFailed(e.into()))?;
        opportunity.updated_at = Utc::now().to_rfc3339();
        hires.save(&opportunity)?;

        self.db.cancellation_repo().append(&CancellationRecord {
            gig_id: opportunity.id.clone(),
            performer_id: member_id,
            reason,
            timestamp: Utc::now().to_rfc3339(),
        })?;

        log::info!("venue hire {} returned to available", opportunity.id);
        Ok(())
    }

    async fn run_artist_steps(
        &self,
        attempt: &mut CancellationAttempt,
    ) -> Result<(), CancellationError> {
        let gigs = self.db.gig_repo();
        let attempts = self.db.cancellation_repo();
        let mut gig = gigs
            .find_by_id(&attempt.gig_id)?
            .ok_or_else(|| CancellationError::NotFound(attempt.gig_id.clone()))?;

        for (step, policy) in ARTIST_CANCELLATION_STEPS {
            if step < attempt.cursor {
                continue;
            }
            attempt.cursor = step;
            attempt.updated_at = Utc::now().to_rfc3339();
            attempts.save_attempt(attempt)?;

            if let Err(err) = self.run_step(step, &mut gig, attempt).await {
                match policy {
                    FailurePolicy::Continue => {
                        log::warn!(
                            "cancellation step {step} failed for gig {} (continuing): {err}",
                            gig.id
                        );
                    }
                    FailurePolicy::Abort => {
                        if matches!(err, CancellationError::RefundFailed { .. }) {
                            attempt.state = AttemptState::PendingRefund;
                            attempt.updated_at = Utc::now().to_rfc3339();
                            attempts.save_attempt(attempt)?;
                        }
                        return Err(err);
                    }
                }
            }
        }

        attempt.state = AttemptState::Completed;
        attempt.updated_at = Utc::now().to_rfc3339();
        attempts.save_attempt(attempt)?;
        log::info!(
            "cancelled gig {} for performer {} ({})",
            attempt.gig_id,
            attempt.performer_id,
            attempt.reason
        );
        Ok(())
    }

    async fn run_step(
        &self,
        step: SagaStep,
        gig: &mut Gig,
        attempt: &CancellationAttempt,
    ) -> Result<(), CancellationError> {
        match step {
            SagaStep::CancelFeeRelease => {
                if let Some(name) = gig.clear_pending_fee_task.clone() {
                    self.scheduler
                        .cancel(&name)
                        .await
                        .map_err(|e| CancellationError::OperationFailed(e.into()))?;
                }
                Ok(())
            }
            SagaStep::CancelReminder => {
                if let Some(name) = gig.automatic_message_task.clone() {
                    self.scheduler
                        .cancel(&name)
                        .await
                        .map_err(|e| CancellationError::OperationFailed(e.into()))?;
                }
                Ok(())
            }
            SagaStep::RefundPayment => {
                if let Some(transaction_id) = gig.transaction_id.clone() {
                    self.payments.refund(&transaction_id).await.map_err(
                        |source| CancellationError::RefundFailed {
                            transaction_id,
                            source,
                        },
                    )?;
                }
                Ok(())
            }
            SagaStep::NotifyCounterparty => {
                let performer_name = self
                    .db
                    .performer_repo()
                    .find_by_id(&attempt.performer_id)?
                    .map(|p| p.name)
                    .unwrap_or_else(|| attempt.performer_id.clone());
                let messaging = self.messaging();
                let conversation = messaging.find_or_create_conversation(
                    &attempt.performer_id,
                    &performer_name,
                    gig,
                )?;
                let text = format!(
                    "{performer_name} has cancelled this booking because {}. \
                     Any fee already held for this gig will be returned to the venue \
                     account within 3 to 5 working days.",
                    attempt.reason.phrase()
                );
                messaging.append_announcement(&conversation, &attempt.performer_id, &text)?;
                Ok(())
            }
            SagaStep::UpdateGigRecord => {
                gig.release_booking(&attempt.performer_id, attempt.reason)?;
                gig.updated_at = Utc::now().to_rfc3339();
                self.db.gig_repo().save(gig)?;
                Ok(())
            }
            SagaStep::UpdatePerformerProfile => {
                let performers = self.db.performer_repo();
                if let Some(mut profile) = performers.find_by_id(&attempt.performer_id)? {
                    profile.withdraw_from_gig(&attempt.gig_id);
                    performers.save(&profile)?;
                }
                Ok(())
            }
            SagaStep::AppendAudit => {
                self.db.cancellation_repo().append(&CancellationRecord {
                    gig_id: attempt.gig_id.clone(),
                    performer_id: attempt.performer_id.clone(),
                    reason: attempt.reason,
                    timestamp: Utc::now().to_rfc3339(),
                })?;
                Ok(())
            }
        }
    }
}
