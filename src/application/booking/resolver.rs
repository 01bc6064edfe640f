//! Pure projection of booking records into a normalized display view.
//!
//! Nothing here touches the store: every function is a plain projection of
//! its inputs, so display code and tests can call them freely. The stored
//! `status` field remains the source of truth for workflow decisions; the
//! projections exist for display and for classifying loosely-typed
//! imported records.

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::{
    BookingStatus, Gig, GigKind, GigSlot, HireStatus, PerformerSource, VenueHireOpportunity,
};

pub const CURRENCY_SYMBOL: &str = "£";
pub const NO_FEE_LABEL: &str = "No fee";

lazy_static! {
    static ref NON_MONETARY_RE: Regex = Regex::new(r"[^0-9.]").expect("monetary regex");
}

/// Which side of the marketplace a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingMode {
    ArtistBooking,
    VenueHire,
}

/// Who holds the booking, for venue hires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookedBy {
    pub name: String,
    /// Platform account, absent for manually-entered hirers.
    pub user_id: Option<String>,
}

impl BookedBy {
    pub fn source(&self) -> PerformerSource {
        if self.user_id.is_some() {
            PerformerSource::Platform
        } else {
            PerformerSource::Manual
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositSummary {
    pub amount: String,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformerEntry {
    pub name: String,
    pub source: PerformerSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerformerSummary {
    pub count: usize,
    pub entries: Vec<PerformerEntry>,
}

/// Normalized view of a booking record, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSummary {
    pub booking_mode: BookingMode,
    pub status: BookingStatus,
    pub date_label: String,
    pub time_range_label: String,
    /// `None` for ticket-based gigs, which never display a fee.
    pub fee_label: Option<String>,
    pub deposit: Option<DepositSummary>,
    pub booked_by: Option<BookedBy>,
    pub performers: PerformerSummary,
}

/// Derive a gig's lifecycle status from its side-channel fields.
///
/// Explicit cancelled/completed markers win; otherwise the presence of a
/// confirmed (or paid) applicant decides.
pub fn project_gig_status(gig: &Gig) -> BookingStatus {
    match gig.status {
        BookingStatus::Cancelled | BookingStatus::Completed => gig.status,
        _ if gig.confirmed_applicant().is_some() => BookingStatus::Confirmed,
        _ => BookingStatus::Open,
    }
}

/// Derive a venue hire's lifecycle status from its hirer field.
pub fn project_hire_status(opportunity: &VenueHireOpportunity) -> BookingStatus {
    if opportunity.status == HireStatus::Cancelled {
        return BookingStatus::Cancelled;
    }
    let has_hirer = opportunity
        .hirer_name
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty());
    if has_hirer {
        BookingStatus::Confirmed
    } else {
        BookingStatus::Open
    }
}

/// A gig record of the reserved venue-rental kind is a venue hire.
pub fn gig_booking_mode(gig: &Gig) -> BookingMode {
    if gig.kind == GigKind::VenueRental {
        BookingMode::VenueHire
    } else {
        BookingMode::ArtistBooking
    }
}

/// Combined `HH:MM–HH:MM` label across a gig's sibling slots.
///
/// Slots are sorted by start time; the label runs from the earliest start
/// to the end of the latest slot.
pub fn time_range_label(slots: &[GigSlot]) -> String {
    if slots.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&GigSlot> = slots.iter().collect();
    sorted.sort_by_key(|s| s.start_time);
    let first = sorted.first().expect("non-empty slots");
    let last = sorted.last().expect("non-empty slots");
    format_time_range(first.start_time, last.end_time())
}

fn format_time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!("{}–{}", start.format("%H:%M"), end.format("%H:%M"))
}

/// Fee label for an advertised budget.
///
/// Ticket-based kinds never display a fee. An absent budget, a bare
/// currency symbol, or a zero amount reads as "No fee"; anything else is
/// stripped to its numeric part and re-formatted.
pub fn fee_label(kind: GigKind, advertised: Option<&str>) -> Option<String> {
    if kind.is_ticket_based() {
        return None;
    }
    Some(money_label(advertised).unwrap_or_else(|| NO_FEE_LABEL.to_string()))
}

/// Normalise a raw money string ("£150", " 150 ") to `£n.nn`.
fn money_label(raw: Option<&str>) -> Option<String> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() || raw == CURRENCY_SYMBOL {
        return None;
    }
    let numeric = NON_MONETARY_RE.replace_all(raw, "");
    match numeric.parse::<f64>() {
        Ok(amount) if amount > 0.0 => Some(format!("{CURRENCY_SYMBOL}{amount:.2}")),
        _ => None,
    }
}

/// Normalized view of an artist-booking record.
///
/// `slots` is the full sibling-slot list for multi-set gigs; pass an empty
/// slice for single-set gigs and the record's own times are used.
pub fn summarise_gig(gig: &Gig, slots: &[GigSlot]) -> BookingSummary {
    let own = [gig.own_slot()];
    let slots = if slots.is_empty() { &own[..] } else { slots };

    let performers = match gig.confirmed_applicant() {
        Some(applicant) => PerformerSummary {
            count: 1,
            entries: vec![PerformerEntry {
                name: applicant.performer_id.clone(),
                source: PerformerSource::Platform,
            }],
        },
        None => PerformerSummary::default(),
    };

    BookingSummary {
        booking_mode: gig_booking_mode(gig),
        status: project_gig_status(gig),
        date_label: gig.date.format("%a %-d %b %Y").to_string(),
        time_range_label: time_range_label(slots),
        fee_label: fee_label(gig.kind, gig.budget.as_deref()),
        deposit: None,
        booked_by: None,
        performers,
    }
}

/// Normalized view of a venue-hire record.
pub fn summarise_hire(opportunity: &VenueHireOpportunity) -> BookingSummary {
    let deposit = if opportunity.deposit_required {
        money_label(opportunity.deposit_amount.as_deref()).map(|amount| DepositSummary {
            amount,
            paid: opportunity.deposit_paid,
        })
    } else {
        None
    };

    let booked_by = opportunity
        .hirer_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|name| BookedBy {
            name: name.to_string(),
            user_id: opportunity.hirer_user_id.clone(),
        });

    let entries: Vec<PerformerEntry> = opportunity
        .performers
        .iter()
        .map(|p| PerformerEntry {
            name: p.display_name.clone(),
            source: p.source(),
        })
        .collect();

    BookingSummary {
        booking_mode: BookingMode::VenueHire,
        status: project_hire_status(opportunity),
        date_label: opportunity.date.format("%a %-d %b %Y").to_string(),
        time_range_label: format_time_range(opportunity.start_time, opportunity.end_time),
        fee_label: fee_label(GigKind::VenueRental, opportunity.hire_fee.as_deref()),
        deposit,
        booked_by,
        performers: PerformerSummary {
            count: entries.len(),
            entries,
        },
    }
}
