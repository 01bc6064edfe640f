//! Booking confirmation: the step that creates everything the cancellation
//! workflow later unwinds — the confirmed applicant, the charge, and the
//! two scheduled tasks.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeDelta, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Gig, GigError};
use crate::infra::db::Database;
use crate::infra::payments::{ChargeRequest, PaymentGateway};
use crate::infra::scheduler::{ScheduledTask, ScheduledTaskRegistry, TaskKind};

/// Held fees are released to the performer this long after the gig ends.
const FEE_RELEASE_DELAY_HOURS: i64 = 48;
/// The automatic reminder goes out this long before the gig starts.
const REMINDER_LEAD_HOURS: i64 = 24;

pub struct BookingConfirmation {
    db: Arc<Database>,
    scheduler: Arc<dyn ScheduledTaskRegistry>,
    payments: Arc<dyn PaymentGateway>,
}

impl BookingConfirmation {
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

    /// Confirm an applicant on an open gig.
    ///
    /// Charges the venue for the agreed fee, registers the fee-release and
    /// reminder tasks, and records the task names and transaction id on the
    /// gig so a later cancellation can find them.
    pub async fn confirm_booking(
        &self,
        gig_id: &str,
        performer_id: &str,
        agreed_fee: &str,
    ) -> Result<Gig> {
        let gigs = self.db.gig_repo();
        let mut gig = gigs
            .find_by_id(&gig_id.to_string())?
            .ok_or_else(|| GigError::NotFound(gig_id.to_string()))?;

        gig.confirm_applicant(performer_id, agreed_fee)?;

        let receipt = self
            .payments
            .charge(ChargeRequest {
                gig_id: gig.id.clone(),
                amount: agreed_fee.to_string(),
                description: format!("Performer fee for {} on {}", gig.venue_name, gig.date),
            })
            .await
            .context("charging agreed fee")?;
        gig.transaction_id = Some(receipt.transaction_id);
        gig.payment_status = Some("charged".to_string());
        gig.musician_fee_status = Some("held".to_string());

        let starts = NaiveDateTime::new(gig.date, gig.start_time);
        let ends = starts + TimeDelta::minutes(gig.duration_minutes);

        let fee_release = ScheduledTask {
            name: format!("fee-release-{}", Uuid::new_v4()),
            gig_id: gig.id.clone(),
            kind: TaskKind::FeeRelease,
            fire_at: (ends + TimeDelta::hours(FEE_RELEASE_DELAY_HOURS))
                .and_utc()
                .to_rfc3339(),
        };
        let reminder = ScheduledTask {
            name: format!("reminder-{}", Uuid::new_v4()),
            gig_id: gig.id.clone(),
            kind: TaskKind::Reminder,
            fire_at: (starts - TimeDelta::hours(REMINDER_LEAD_HOURS))
                .and_utc()
                .to_rfc3339(),
        };
        gig.clear_pending_fee_task = Some(fee_release.name.clone());
        gig.automatic_message_task = Some(reminder.name.clone());
        self.scheduler
            .schedule(fee_release)
            .await
            .context("scheduling fee release")?;
        self.scheduler
            .schedule(reminder)
            .await
            .context("scheduling reminder")?;

        gig.updated_at = Utc::now().to_rfc3339();
        gigs.save(&gig)?;

        let performers = self.db.performer_repo();
        match performers.find_by_id(&performer_id.to_string())? {
            Some(mut profile) => {
                profile.add_confirmed_gig(&gig.id);
                performers.save(&profile)?;
            }
            None => log::warn!("no profile found for confirmed performer {performer_id}"),
        }

        log::info!("confirmed {performer_id} on gig {} for {agreed_fee}", gig.id);
        Ok(gig)
    }
}
