//! Domain types for the booking lifecycle
//! Defines the records and vocabulary used throughout the crate.

pub mod cancellation;
pub mod conversation;
pub mod error;
pub mod gig;
pub mod performer;
pub mod venue_hire;

pub use cancellation::*;
pub use conversation::*;
pub use error::*;
pub use gig::*;
pub use performer::*;
pub use venue_hire::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_booking_status_display_parse() {
        assert_eq!(BookingStatus::Open.to_string(), "open");
        assert_eq!(
            BookingStatus::from_str("CANCELLED").unwrap(),
            BookingStatus::Cancelled
        );
        assert_eq!(
            BookingStatus::from_str("past").unwrap(),
            BookingStatus::Completed
        );
        assert_eq!(
            BookingStatus::from_str("closed").unwrap(),
            BookingStatus::Cancelled
        );
    }

    #[test]
    fn test_applicant_status_confirmed() {
        assert!(ApplicantStatus::Confirmed.is_confirmed());
        assert!(ApplicantStatus::Paid.is_confirmed());
        assert!(!ApplicantStatus::Accepted.is_confirmed());
    }

    #[test]
    fn test_gig_kind_parse() {
        assert_eq!(GigKind::from_str("Venue Rental").unwrap(), GigKind::VenueRental);
        assert_eq!(GigKind::from_str("open mic").unwrap(), GigKind::OpenMic);
        assert!(GigKind::Ticketed.is_ticket_based());
        assert!(!GigKind::Wedding.is_ticket_based());
    }

    #[test]
    fn test_cancellation_reason_phrase_is_total() {
        assert_eq!(
            CancellationReason::from_str("illness").unwrap().phrase(),
            "of illness"
        );
        assert_eq!(
            CancellationReason::from_str("fee").unwrap().phrase(),
            "they're not happy with the fee"
        );
        // Unknown codes, the literal "other", and empty input all fall back.
        for raw in ["", "other", "no-show", "undefined"] {
            assert_eq!(
                CancellationReason::from_str(raw).unwrap().phrase(),
                "of other reasons"
            );
        }
    }

    #[test]
    fn test_artist_cancellation_policy_table() {
        // Every step appears exactly once, in execution order.
        let steps: Vec<SagaStep> = ARTIST_CANCELLATION_STEPS.iter().map(|(s, _)| *s).collect();
        let mut sorted = steps.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(steps, sorted);
        assert_eq!(steps.len(), 7);

        // Task cancellations and notification are best-effort; the refund
        // and every record write abort.
        for (step, policy) in ARTIST_CANCELLATION_STEPS {
            let expected = match step {
                SagaStep::CancelFeeRelease
                | SagaStep::CancelReminder
                | SagaStep::NotifyCounterparty => FailurePolicy::Continue,
                _ => FailurePolicy::Abort,
            };
            assert_eq!(policy, expected, "policy for {step}");
        }
    }

    #[test]
    fn test_hire_performer_source() {
        let linked = HirePerformer {
            display_name: "The Midnight Set".into(),
            user_id: Some("u1".into()),
            artist_id: None,
            contact_id: None,
        };
        assert_eq!(linked.source(), PerformerSource::Platform);

        // A CRM contact id alone is not a platform link.
        let crm_only = HirePerformer {
            display_name: "Covers Duo".into(),
            user_id: None,
            artist_id: None,
            contact_id: Some("crm-7".into()),
        };
        assert_eq!(crm_only.source(), PerformerSource::Manual);
    }
}
