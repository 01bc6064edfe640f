//! Booking lifecycle use-cases: state resolution, confirmation, and the
//! cancellation workflow.

pub mod cancellation;
pub mod confirmation;
pub mod resolver;

pub use cancellation::{CancellationActor, CancellationSaga, GIGS_UPDATE_PERMISSION};
pub use confirmation::BookingConfirmation;
pub use resolver::{
    BookedBy, BookingMode, BookingSummary, DepositSummary, PerformerEntry, PerformerSummary,
    fee_label, gig_booking_mode, project_gig_status, project_hire_status, summarise_gig,
    summarise_hire, time_range_label,
};

#[cfg(test)]
mod tests;
