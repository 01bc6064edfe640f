use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::gig::GigId;

/// Reason code supplied by the cancelling party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CancellationReason {
    Fee,
    Availability,
    DoubleBooking,
    PersonalReasons,
    Illness,
    Information,
    #[default]
    Other,
}

impl CancellationReason {
    /// Human-readable phrase used verbatim in the cancellation message.
    ///
    /// Total over all codes; anything unrecognised reads as other reasons.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Fee => "they're not happy with the fee",
            Self::Availability => "of availability",
            Self::DoubleBooking => "of a double booking",
            Self::PersonalReasons => "of personal reasons",
            Self::Illness => "of illness",
            Self::Information => "of not enough information",
            Self::Other => "of other reasons",
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fee => write!(f, "fee"),
            Self::Availability => write!(f, "availability"),
            Self::DoubleBooking => write!(f, "double-booking"),
            Self::PersonalReasons => write!(f, "personal-reasons"),
            Self::Illness => write!(f, "illness"),
            Self::Information => write!(f, "information"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl FromStr for CancellationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "fee" => Ok(Self::Fee),
            "availability" => Ok(Self::Availability),
            "double-booking" => Ok(Self::DoubleBooking),
            "personal-reasons" => Ok(Self::PersonalReasons),
            "illness" => Ok(Self::Illness),
            "information" => Ok(Self::Information),
            _ => Ok(Self::Other),
        }
    }
}

/// Append-only audit row written at the end of a cancellation. Never read
/// back by the workflow itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub gig_id: GigId,
    /// The cancelling party: the performer for artist bookings, the acting
    /// venue member for venue hires.
    pub performer_id: String,
    pub reason: CancellationReason,
    /// RFC3339 timestamp.
    pub timestamp: String,
}

/// One step of the artist-booking cancellation workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    CancelFeeRelease,
    CancelReminder,
    RefundPayment,
    NotifyCounterparty,
    UpdateGigRecord,
    UpdatePerformerProfile,
    AppendAudit,
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CancelFeeRelease => write!(f, "cancel_fee_release"),
            Self::CancelReminder => write!(f, "cancel_reminder"),
            Self::RefundPayment => write!(f, "refund_payment"),
            Self::NotifyCounterparty => write!(f, "notify_counterparty"),
            Self::UpdateGigRecord => write!(f, "update_gig_record"),
            Self::UpdatePerformerProfile => write!(f, "update_performer_profile"),
            Self::AppendAudit => write!(f, "append_audit"),
        }
    }
}

impl FromStr for SagaStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cancel_fee_release" => Ok(Self::CancelFeeRelease),
            "cancel_reminder" => Ok(Self::CancelReminder),
            "refund_payment" => Ok(Self::RefundPayment),
            "notify_counterparty" => Ok(Self::NotifyCounterparty),
            "update_gig_record" => Ok(Self::UpdateGigRecord),
            "update_performer_profile" => Ok(Self::UpdatePerformerProfile),
            "append_audit" => Ok(Self::AppendAudit),
            other => Err(format!("unknown saga step: {other}")),
        }
    }
}

/// What the workflow does when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and carry on: the step is best-effort.
    Continue,
    /// Stop the workflow and surface the error.
    Abort,
}

/// Failure policy of every step of the artist-booking path, declared once.
///
/// Task cancellations are best-effort (the task may already have fired),
/// and a failed notification must never block the record rollback. The
/// refund and the record writes abort.
pub const ARTIST_CANCELLATION_STEPS: [(SagaStep, FailurePolicy); 7] = [
    (SagaStep::CancelFeeRelease, FailurePolicy::Continue),
    (SagaStep::CancelReminder, FailurePolicy::Continue),
    (SagaStep::RefundPayment, FailurePolicy::Abort),
    (SagaStep::NotifyCounterparty, FailurePolicy::Continue),
    (SagaStep::UpdateGigRecord, FailurePolicy::Abort),
    (SagaStep::UpdatePerformerProfile, FailurePolicy::Abort),
    (SagaStep::AppendAudit, FailurePolicy::Abort),
];

/// State of a persisted cancellation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Running,
    /// The refund failed; the booking record is untouched and the attempt
    /// waits for an operator to resume it.
    PendingRefund,
    Completed,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::PendingRefund => write!(f, "pending_refund"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for AttemptState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "pending_refund" => Ok(Self::PendingRefund),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown attempt state: {other}")),
        }
    }
}

/// Persisted cursor of one cancellation run. A crash or an aborting step
/// leaves this row behind so the run can be resumed from `cursor` without
/// repeating completed steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationAttempt {
    pub id: String,
    pub gig_id: GigId,
    pub performer_id: String,
    pub reason: CancellationReason,
    /// Next step to execute.
    pub cursor: SagaStep,
    pub state: AttemptState,
    pub created_at: String,
    pub updated_at: String,
}
