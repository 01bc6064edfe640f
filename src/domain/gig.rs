use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cancellation::CancellationReason;
use super::error::GigError;

/// Unique identifier for a gig (artist-booking record)
pub type GigId = String;

/// Unique identifier for a venue
pub type VenueId = String;

/// Unique identifier for a performer (musician or band account)
pub type PerformerId = String;

/// Classification of a gig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GigKind {
    #[default]
    LiveMusic,
    Wedding,
    /// Ticket-based event; performers are paid from ticket sales, not a fee.
    Ticketed,
    OpenMic,
    /// Reserved sentinel: records of this kind are venue-hire bookings.
    VenueRental,
}

impl GigKind {
    /// Ticketed and open-mic gigs never advertise a fee.
    pub fn is_ticket_based(&self) -> bool {
        matches!(self, Self::Ticketed | Self::OpenMic)
    }
}

impl fmt::Display for GigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiveMusic => write!(f, "live_music"),
            Self::Wedding => write!(f, "wedding"),
            Self::Ticketed => write!(f, "ticketed"),
            Self::OpenMic => write!(f, "open_mic"),
            Self::VenueRental => write!(f, "venue_rental"),
        }
    }
}

impl FromStr for GigKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "live_music" => Ok(Self::LiveMusic),
            "wedding" => Ok(Self::Wedding),
            "ticketed" => Ok(Self::Ticketed),
            "open_mic" => Ok(Self::OpenMic),
            "venue_rental" => Ok(Self::VenueRental),
            _ => Ok(Self::LiveMusic),
        }
    }
}

/// Lifecycle status of a booking.
///
/// Stored directly on the record and mutated only by the transition
/// functions on [`Gig`]. Display code may re-derive a status from the
/// record's side-channel fields (see the resolver), but the stored value is
/// the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Open,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" | "canceled" | "closed" => Ok(Self::Cancelled),
            "completed" | "past" => Ok(Self::Completed),
            _ => Ok(Self::Open),
        }
    }
}

/// Status of a performer's application on a gig's roster, independent of the
/// gig's own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Confirmed,
    Paid,
}

impl ApplicantStatus {
    /// Confirmed and paid applicants both count as the booked performer.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Paid)
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

impl FromStr for ApplicantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "confirmed" => Ok(Self::Confirmed),
            "paid" => Ok(Self::Paid),
            _ => Ok(Self::Pending),
        }
    }
}

/// A performer's entry on a gig's roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    /// Performer account the application belongs to.
    pub performer_id: PerformerId,
    /// Proposed fee, or the agreed fee once confirmed.
    pub fee: String,
    /// Current application status.
    #[serde(default)]
    pub status: ApplicantStatus,
    /// Application timestamp in RFC3339 format.
    pub applied_at: String,
    /// Whether the venue has viewed the application.
    #[serde(default)]
    pub viewed: bool,
}

/// Time-slot view of a gig, used when a date has multiple sibling sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigSlot {
    pub gig_id: GigId,
    pub start_time: NaiveTime,
    pub duration_minutes: i64,
}

impl GigSlot {
    pub fn end_time(&self) -> NaiveTime {
        self.start_time + TimeDelta::minutes(self.duration_minutes)
    }
}

/// An artist-booking record: a venue's request for a performer at a
/// specific date and time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gig {
    /// Unique identifier for the gig.
    pub id: GigId,
    /// Venue the gig belongs to.
    pub venue_id: VenueId,
    /// Venue display name, denormalised for labels and messages.
    pub venue_name: String,
    /// Date of the gig.
    pub date: NaiveDate,
    /// Start time of this set.
    pub start_time: NaiveTime,
    /// Length of this set in minutes.
    pub duration_minutes: i64,
    /// Other sets on the same date, for multi-set gigs.
    #[serde(default)]
    pub sibling_slot_ids: Vec<GigId>,
    /// Classification of the gig.
    #[serde(default)]
    pub kind: GigKind,
    /// Private gigs are only reachable via an invitation token.
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub invite_token: Option<String>,
    /// Advertised budget as entered by the venue (e.g. "£150").
    #[serde(default)]
    pub budget: Option<String>,
    /// Fee agreed with the confirmed performer. Present iff a confirmed
    /// applicant exists.
    #[serde(default)]
    pub agreed_fee: Option<String>,
    /// Whether the performer fee has been released.
    #[serde(default)]
    pub paid: bool,
    /// Performer applications, at most one of which is confirmed.
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    /// Stored lifecycle status.
    #[serde(default)]
    pub status: BookingStatus,
    /// Name of the scheduled fee-release task, set at confirmation.
    #[serde(default)]
    pub clear_pending_fee_task: Option<String>,
    /// Name of the scheduled reminder task, set at confirmation.
    #[serde(default)]
    pub automatic_message_task: Option<String>,
    /// Payment transaction reference from the confirmation charge.
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub dispute_logged: bool,
    #[serde(default)]
    pub dispute_clearing_time: Option<String>,
    #[serde(default)]
    pub musician_fee_status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Reason code recorded by the last cancellation.
    #[serde(default)]
    pub cancellation_reason: Option<CancellationReason>,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
    /// Update timestamp in RFC3339 format.
    pub updated_at: String,
}

impl Gig {
    /// The confirmed (or paid) applicant, if any.
    pub fn confirmed_applicant(&self) -> Option<&Applicant> {
        self.applicants.iter().find(|a| a.status.is_confirmed())
    }

    /// Slot view of this record's own set.
    pub fn own_slot(&self) -> GigSlot {
        GigSlot {
            gig_id: self.id.clone(),
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
        }
    }

    /// Confirm a pending applicant and record the agreed fee.
    pub fn confirm_applicant(
        &mut self,
        performer_id: &str,
        agreed_fee: &str,
    ) -> Result<(), GigError> {
        if self.status != BookingStatus::Open {
            return Err(GigError::InvalidState(format!(
                "cannot confirm applicant while gig {} is {}",
                self.id, self.status
            )));
        }
        if self.confirmed_applicant().is_some() {
            return Err(GigError::InvalidState(format!(
                "gig {} already has a confirmed applicant",
                self.id
            )));
        }
        let applicant = self
            .applicants
            .iter_mut()
            .find(|a| a.performer_id == performer_id)
            .ok_or_else(|| GigError::ApplicantNotFound {
                gig_id: self.id.clone(),
                performer_id: performer_id.to_string(),
            })?;
        applicant.status = ApplicantStatus::Confirmed;
        applicant.fee = agreed_fee.to_string();
        self.agreed_fee = Some(agreed_fee.to_string());
        self.status = BookingStatus::Confirmed;
        Ok(())
    }

    /// Roll a confirmed gig back to open: drop the cancelling performer from
    /// the roster, clear the confirmation bookkeeping, and record the reason.
    pub fn release_booking(
        &mut self,
        performer_id: &str,
        reason: CancellationReason,
    ) -> Result<(), GigError> {
        let confirmed = self
            .confirmed_applicant()
            .filter(|a| a.performer_id == performer_id);
        if confirmed.is_none() {
            return Err(GigError::InvalidState(format!(
                "performer {} is not the confirmed applicant on gig {}",
                performer_id, self.id
            )));
        }
        self.applicants.retain(|a| a.performer_id != performer_id);
        self.agreed_fee = None;
        self.dispute_clearing_time = None;
        self.dispute_logged = false;
        self.musician_fee_status = None;
        self.payment_status = None;
        self.clear_pending_fee_task = None;
        self.automatic_message_task = None;
        self.paid = false;
        self.status = BookingStatus::Open;
        self.cancellation_reason = Some(reason);
        Ok(())
    }

    /// Mark a confirmed gig as played.
    pub fn mark_completed(&mut self) -> Result<(), GigError> {
        if self.status != BookingStatus::Confirmed {
            return Err(GigError::InvalidState(format!(
                "cannot complete gig {} while {}",
                self.id, self.status
            )));
        }
        self.status = BookingStatus::Completed;
        Ok(())
    }

    /// Close an open gig without a booking having taken place.
    pub fn mark_cancelled(&mut self) -> Result<(), GigError> {
        if self.status == BookingStatus::Completed {
            return Err(GigError::InvalidState(format!(
                "cannot cancel completed gig {}",
                self.id
            )));
        }
        self.status = BookingStatus::Cancelled;
        Ok(())
    }

    /// Check record invariants. Called by the store before every write.
    pub fn validate(&self) -> Result<(), GigError> {
        let confirmed: Vec<_> = self
            .applicants
            .iter()
            .filter(|a| a.status.is_confirmed())
            .collect();
        if confirmed.len() > 1 {
            return Err(GigError::InvalidState(format!(
                "gig {} has {} confirmed applicants",
                self.id,
                confirmed.len()
            )));
        }
        if self.agreed_fee.is_some() != (confirmed.len() == 1) {
            return Err(GigError::InvalidState(format!(
                "gig {} agreed_fee does not match its roster",
                self.id
            )));
        }
        if self.status == BookingStatus::Confirmed && confirmed.is_empty() {
            return Err(GigError::InvalidState(format!(
                "gig {} is confirmed without a confirmed applicant",
                self.id
            )));
        }
        if self.status == BookingStatus::Open && !confirmed.is_empty() {
            return Err(GigError::InvalidState(format!(
                "gig {} is open but has a confirmed applicant",
                self.id
            )));
        }
        Ok(())
    }
}
