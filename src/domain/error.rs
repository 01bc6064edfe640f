//! Domain error types for the booking lifecycle.
//!
//! These errors represent domain-level failures that can occur during
//! business operations. They are more specific than infrastructure errors
//! and can be handled appropriately at the application layer.

use thiserror::Error;

use super::gig::BookingStatus;

/// Domain errors related to gig records.
#[derive(Debug, Error)]
pub enum GigError {
    #[error("Gig not found: {0}")]
    NotFound(String),

    #[error("Applicant {performer_id} not found on gig {gig_id}")]
    ApplicantNotFound { gig_id: String, performer_id: String },

    #[error("Invalid gig state: {0}")]
    InvalidState(String),

    #[error("Gig operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Domain errors related to venue-hire opportunities.
#[derive(Debug, Error)]
pub enum VenueHireError {
    #[error("Venue hire opportunity not found: {0}")]
    NotFound(String),

    #[error("Invalid venue hire state: {0}")]
    InvalidState(String),

    #[error("Venue hire operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Errors from the scheduled-task registry.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduled task not found: {0}")]
    TaskNotFound(String),

    #[error("Scheduler operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Refund rejected for transaction {transaction_id}: {reason}")]
    RefundRejected {
        transaction_id: String,
        reason: String,
    },

    #[error("Charge rejected: {0}")]
    ChargeRejected(String),

    #[error("Payment operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Errors raised by the cancellation workflow.
///
/// The taxonomy matters to callers: precondition failures mean no step ran,
/// `RefundFailed` means money is in limbo and the attempt is parked, and
/// everything else is a store failure at or after the record rollback.
#[derive(Debug, Error)]
pub enum CancellationError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Booking {gig_id} is {status}, only confirmed bookings can be cancelled")]
    NotConfirmed {
        gig_id: String,
        status: BookingStatus,
    },

    #[error("Actor is not permitted to cancel this booking: {0}")]
    NotPermitted(String),

    #[error("Refund failed for transaction {transaction_id}")]
    RefundFailed {
        transaction_id: String,
        #[source]
        source: PaymentError,
    },

    #[error("Cancellation attempt not found: {0}")]
    AttemptNotFound(String),

    #[error(transparent)]
    Gig(#[from] GigError),

    #[error("Cancellation step failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Unified domain error type for application-level error handling.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Gig error: {0}")]
    Gig(#[from] GigError),

    #[error("Venue hire error: {0}")]
    VenueHire(#[from] VenueHireError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Cancellation error: {0}")]
    Cancellation(#[from] CancellationError),

    #[error("Unknown domain error: {0}")]
    Unknown(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Unknown(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::Unknown(s.to_string())
    }
}
