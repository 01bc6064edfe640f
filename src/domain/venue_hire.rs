use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::VenueHireError;
use super::gig::VenueId;

/// Unique identifier for a venue-hire opportunity
pub type OpportunityId = String;

/// Lifecycle status of a venue-hire opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HireStatus {
    #[default]
    Available,
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for HireStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for HireStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Ok(Self::Available),
        }
    }
}

/// Where a performer entry on a hire came from.
///
/// `Platform` requires a platform user or artist account. Contacts that only
/// exist in the venue's CRM book are `Manual` even though they carry a
/// contact id — downstream displays must not treat a CRM id as a platform
/// link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformerSource {
    Platform,
    Manual,
}

impl fmt::Display for PerformerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => write!(f, "platform"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A performer attached to a venue-hire booking by the hirer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HirePerformer {
    pub display_name: String,
    /// Platform user account, when the performer is on the platform.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Platform artist page, when linked.
    #[serde(default)]
    pub artist_id: Option<String>,
    /// Venue CRM contact entry, for manually-entered performers.
    #[serde(default)]
    pub contact_id: Option<String>,
}

impl HirePerformer {
    pub fn source(&self) -> PerformerSource {
        if self.user_id.is_some() || self.artist_id.is_some() {
            PerformerSource::Platform
        } else {
            PerformerSource::Manual
        }
    }
}

/// A booking of a venue's space itself, not tied to a specific performing
/// artist. The hirer is a plain name and not necessarily a platform account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueHireOpportunity {
    pub id: OpportunityId,
    pub venue_id: VenueId,
    pub venue_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Earliest load-in time, when it differs from the hire start.
    #[serde(default)]
    pub access_from: Option<NaiveTime>,
    #[serde(default)]
    pub curfew: Option<NaiveTime>,
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Advertised hire fee as entered by the venue.
    #[serde(default)]
    pub hire_fee: Option<String>,
    #[serde(default)]
    pub deposit_amount: Option<String>,
    #[serde(default)]
    pub deposit_required: bool,
    #[serde(default)]
    pub deposit_paid: bool,
    #[serde(default)]
    pub hire_fee_paid: bool,
    /// Name of whoever holds the booking. Present iff the hire is pending or
    /// confirmed.
    #[serde(default)]
    pub hirer_name: Option<String>,
    /// Platform account of the hirer, when the booking came through the
    /// platform's own conversation flow rather than manual entry.
    #[serde(default)]
    pub hirer_user_id: Option<String>,
    #[serde(default)]
    pub performers: Vec<HirePerformer>,
    #[serde(default)]
    pub status: HireStatus,
    #[serde(default)]
    pub private: bool,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
    /// Update timestamp in RFC3339 format.
    pub updated_at: String,
}

impl VenueHireOpportunity {
    /// Record a confirmed hirer on an available or pending opportunity.
    pub fn confirm_hire(
        &mut self,
        hirer_name: &str,
        hirer_user_id: Option<String>,
    ) -> Result<(), VenueHireError> {
        if matches!(self.status, HireStatus::Confirmed | HireStatus::Cancelled) {
            return Err(VenueHireError::InvalidState(format!(
                "cannot confirm hire while opportunity {} is {}",
                self.id, self.status
            )));
        }
        if hirer_name.trim().is_empty() {
            return Err(VenueHireError::InvalidState(format!(
                "opportunity {} cannot be confirmed without a hirer name",
                self.id
            )));
        }
        self.hirer_name = Some(hirer_name.to_string());
        self.hirer_user_id = hirer_user_id;
        self.status = HireStatus::Confirmed;
        Ok(())
    }

    /// Return a booked opportunity to the open market.
    pub fn release_hire(&mut self) -> Result<(), VenueHireError> {
        if !matches!(self.status, HireStatus::Pending | HireStatus::Confirmed) {
            return Err(VenueHireError::InvalidState(format!(
                "cannot release opportunity {} while {}",
                self.id, self.status
            )));
        }
        self.hirer_name = None;
        self.hirer_user_id = None;
        self.status = HireStatus::Available;
        Ok(())
    }

    /// Check record invariants. Called by the store before every write.
    pub fn validate(&self) -> Result<(), VenueHireError> {
        let has_hirer = self
            .hirer_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        match self.status {
            HireStatus::Available if has_hirer => Err(VenueHireError::InvalidState(format!(
                "opportunity {} is available but carries a hirer name",
                self.id
            ))),
            HireStatus::Pending | HireStatus::Confirmed if !has_hirer => {
                Err(VenueHireError::InvalidState(format!(
                    "opportunity {} is {} without a hirer name",
                    self.id, self.status
                )))
            }
            _ => Ok(()),
        }
    }
}
