use crate::application::booking::cancellation::{
    CancellationActor, CancellationSaga, GIGS_UPDATE_PERMISSION,
};
use crate::application::booking::confirmation::BookingConfirmation;
use crate::application::booking::resolver::*;
use crate::domain::*;
use crate::infra::db::Database;
use crate::infra::payments::{ChargeReceipt, ChargeRequest, PaymentGateway};
use crate::infra::scheduler::{InMemoryTaskRegistry, ScheduledTask, ScheduledTaskRegistry, TaskKind};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Gateway that records traffic and can be told to reject refunds.
#[derive(Default)]
struct RecordingGateway {
    charges: Mutex<Vec<ChargeRequest>>,
    refunds: Mutex<Vec<String>>,
    fail_refunds: AtomicBool,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        let mut charges = self.charges.lock().unwrap();
        charges.push(request);
        Ok(ChargeReceipt {
            transaction_id: format!("tx_{}", charges.len()),
        })
    }

    async fn refund(&self, transaction_id: &str) -> Result<(), PaymentError> {
        if self.fail_refunds.load(Ordering::SeqCst) {
            return Err(PaymentError::RefundRejected {
                transaction_id: transaction_id.to_string(),
                reason: "gateway declined".to_string(),
            });
        }
        self.refunds.lock().unwrap().push(transaction_id.to_string());
        Ok(())
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 14).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn applicant(performer_id: &str, status: ApplicantStatus) -> Applicant {
    Applicant {
        performer_id: performer_id.to_string(),
        fee: "£150".to_string(),
        status,
        applied_at: "2026-08-01T10:00:00+00:00".to_string(),
        viewed: false,
    }
}

fn open_gig(id: &str) -> Gig {
    Gig {
        id: id.to_string(),
        venue_id: "v1".to_string(),
        venue_name: "The Cellar Door".to_string(),
        date: date(),
        start_time: time(19, 30),
        duration_minutes: 90,
        sibling_slot_ids: vec![],
        kind: GigKind::LiveMusic,
        private: false,
        invite_token: None,
        budget: Some("£150".to_string()),
        agreed_fee: None,
        paid: false,
        applicants: vec![applicant("m1", ApplicantStatus::Pending)],
        status: BookingStatus::Open,
        clear_pending_fee_task: None,
        automatic_message_task: None,
        transaction_id: None,
        dispute_logged: false,
        dispute_clearing_time: None,
        musician_fee_status: None,
        payment_status: None,
        cancellation_reason: None,
        created_at: "2026-07-20T09:00:00+00:00".to_string(),
        updated_at: "2026-07-20T09:00:00+00:00".to_string(),
    }
}

fn confirmed_gig(id: &str) -> Gig {
    let mut gig = open_gig(id);
    gig.applicants = vec![applicant("m1", ApplicantStatus::Confirmed)];
    gig.agreed_fee = Some("£150".to_string());
    gig.status = BookingStatus::Confirmed;
    gig.transaction_id = Some("tx_1".to_string());
    gig.clear_pending_fee_task = Some(format!("fee-release-{id}"));
    gig.automatic_message_task = Some(format!("reminder-{id}"));
    gig
}

fn profile(performer_id: &str, name: &str, gig_id: &str) -> PerformerProfile {
    PerformerProfile {
        id: performer_id.to_string(),
        name: name.to_string(),
        gig_applications: vec![gig_id.to_string()],
        confirmed_gigs: vec![gig_id.to_string()],
        created_at: "2026-07-01T08:00:00+00:00".to_string(),
    }
}

fn hire_opportunity(id: &str) -> VenueHireOpportunity {
    VenueHireOpportunity {
        id: id.to_string(),
        venue_id: "v1".to_string(),
        venue_name: "The Cellar Door".to_string(),
        date: date(),
        start_time: time(18, 0),
        end_time: time(23, 0),
        access_from: Some(time(16, 0)),
        curfew: Some(time(23, 30)),
        capacity: Some(120),
        hire_fee: Some("£400".to_string()),
        deposit_amount: Some("£100".to_string()),
        deposit_required: true,
        deposit_paid: false,
        hire_fee_paid: false,
        hirer_name: None,
        hirer_user_id: None,
        performers: vec![],
        status: HireStatus::Available,
        private: false,
        created_at: "2026-07-20T09:00:00+00:00".to_string(),
        updated_at: "2026-07-20T09:00:00+00:00".to_string(),
    }
}

struct Harness {
    db: Arc<Database>,
    scheduler: Arc<InMemoryTaskRegistry>,
    gateway: Arc<RecordingGateway>,
    saga: CancellationSaga,
}

async fn harness_with_confirmed_gig(gig_id: &str) -> Harness {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let scheduler = Arc::new(InMemoryTaskRegistry::new());
    let gateway = Arc::new(RecordingGateway::default());

    let gig = confirmed_gig(gig_id);
    for (name, kind) in [
        (gig.clear_pending_fee_task.clone().unwrap(), TaskKind::FeeRelease),
        (gig.automatic_message_task.clone().unwrap(), TaskKind::Reminder),
    ] {
        scheduler
            .schedule(ScheduledTask {
                name,
                gig_id: gig.id.clone(),
                kind,
                fire_at: "2026-08-16T21:00:00+00:00".to_string(),
            })
            .await
            .unwrap();
    }
    db.gig_repo().save(&gig).unwrap();
    db.performer_repo()
        .save(&profile("m1", "Ada Quartet", gig_id))
        .unwrap();

    let saga = CancellationSaga::new(db.clone(), scheduler.clone(), gateway.clone());
    Harness {
        db,
        scheduler,
        gateway,
        saga,
    }
}

fn performer_actor(performer_id: &str) -> CancellationActor {
    CancellationActor::Performer {
        performer_id: performer_id.to_string(),
    }
}

fn venue_actor(member_id: &str, venue_id: &str) -> CancellationActor {
    CancellationActor::VenueMember {
        member_id: member_id.to_string(),
        venue_id: venue_id.to_string(),
        permissions: vec![GIGS_UPDATE_PERMISSION.to_string()],
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[test]
fn test_gig_status_confirmed_iff_confirmed_applicant() {
    let mut gig = open_gig("g1");
    assert_eq!(project_gig_status(&gig), BookingStatus::Open);

    gig.applicants[0].status = ApplicantStatus::Confirmed;
    assert_eq!(project_gig_status(&gig), BookingStatus::Confirmed);

    gig.applicants[0].status = ApplicantStatus::Paid;
    assert_eq!(project_gig_status(&gig), BookingStatus::Confirmed);

    gig.applicants[0].status = ApplicantStatus::Accepted;
    assert_eq!(project_gig_status(&gig), BookingStatus::Open);

    // An explicit terminal marker wins over the roster.
    gig.applicants[0].status = ApplicantStatus::Confirmed;
    gig.status = BookingStatus::Cancelled;
    assert_eq!(project_gig_status(&gig), BookingStatus::Cancelled);
    gig.status = BookingStatus::Completed;
    assert_eq!(project_gig_status(&gig), BookingStatus::Completed);
}

#[test]
fn test_hire_status_follows_hirer_name() {
    let mut opportunity = hire_opportunity("h1");
    assert_eq!(project_hire_status(&opportunity), BookingStatus::Open);

    opportunity.hirer_name = Some("Jane Doe".to_string());
    assert_eq!(project_hire_status(&opportunity), BookingStatus::Confirmed);

    opportunity.hirer_name = Some("   ".to_string());
    assert_eq!(project_hire_status(&opportunity), BookingStatus::Open);

    opportunity.hirer_name = Some("Jane Doe".to_string());
    opportunity.status = HireStatus::Cancelled;
    assert_eq!(project_hire_status(&opportunity), BookingStatus::Cancelled);
}

#[test]
fn test_time_range_label_sorts_sibling_slots() {
    let slots = vec![
        GigSlot {
            gig_id: "g2".into(),
            start_time: time(21, 30),
            duration_minutes: 30,
        },
        GigSlot {
            gig_id: "g1".into(),
            start_time: time(18, 30),
            duration_minutes: 45,
        },
        GigSlot {
            gig_id: "g3".into(),
            start_time: time(20, 0),
            duration_minutes: 60,
        },
    ];
    assert_eq!(time_range_label(&slots), "18:30–22:00");
}

#[test]
fn test_time_range_label_single_slot() {
    let gig = open_gig("g1");
    assert_eq!(time_range_label(&[gig.own_slot()]), "19:30–21:00");
}

#[test]
fn test_fee_label_policy() {
    assert_eq!(fee_label(GigKind::Ticketed, Some("£150")), None);
    assert_eq!(fee_label(GigKind::OpenMic, Some("£150")), None);
    assert_eq!(
        fee_label(GigKind::LiveMusic, Some("£150")),
        Some("£150.00".to_string())
    );
    assert_eq!(
        fee_label(GigKind::LiveMusic, Some("150.50")),
        Some("£150.50".to_string())
    );
    for empty in [None, Some(""), Some("£"), Some("  "), Some("0"), Some("£0")] {
        assert_eq!(
            fee_label(GigKind::LiveMusic, empty),
            Some("No fee".to_string()),
            "for {empty:?}"
        );
    }
}

#[test]
fn test_summarise_gig_basics() {
    let gig = confirmed_gig("g1");
    let summary = summarise_gig(&gig, &[]);
    assert_eq!(summary.booking_mode, BookingMode::ArtistBooking);
    assert_eq!(summary.status, BookingStatus::Confirmed);
    assert_eq!(summary.date_label, "Fri 14 Aug 2026");
    assert_eq!(summary.time_range_label, "19:30–21:00");
    assert_eq!(summary.fee_label, Some("£150.00".to_string()));
    assert_eq!(summary.performers.count, 1);
    assert_eq!(summary.performers.entries[0].source, PerformerSource::Platform);
}

#[test]
fn test_summarise_hire_sources_and_deposit() {
    let mut opportunity = hire_opportunity("h1");
    opportunity.hirer_name = Some("Jane Doe".to_string());
    opportunity.status = HireStatus::Confirmed;
    opportunity.performers = vec![
        HirePerformer {
            display_name: "The Midnight Set".into(),
            user_id: Some("u5".into()),
            artist_id: None,
            contact_id: None,
        },
        HirePerformer {
            display_name: "Covers Duo".into(),
            user_id: None,
            artist_id: None,
            contact_id: Some("crm-7".into()),
        },
    ];

    let summary = summarise_hire(&opportunity);
    assert_eq!(summary.booking_mode, BookingMode::VenueHire);
    assert_eq!(summary.status, BookingStatus::Confirmed);
    assert_eq!(summary.time_range_label, "18:00–23:00");
    assert_eq!(
        summary.deposit,
        Some(DepositSummary {
            amount: "£100.00".to_string(),
            paid: false,
        })
    );

    // Manual entry: no platform account behind the hirer name.
    let booked_by = summary.booked_by.unwrap();
    assert_eq!(booked_by.source(), PerformerSource::Manual);

    assert_eq!(summary.performers.count, 2);
    assert_eq!(summary.performers.entries[0].source, PerformerSource::Platform);
    // A CRM contact id alone must not read as a platform link.
    assert_eq!(summary.performers.entries[1].source, PerformerSource::Manual);
}

#[test]
fn test_venue_rental_kind_is_venue_hire_mode() {
    let mut gig = open_gig("g1");
    assert_eq!(gig_booking_mode(&gig), BookingMode::ArtistBooking);
    gig.kind = GigKind::VenueRental;
    assert_eq!(gig_booking_mode(&gig), BookingMode::VenueHire);
}

// ---------------------------------------------------------------------------
// Cancellation workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cancel_booking_unwinds_confirmed_gig() {
    let h = harness_with_confirmed_gig("g1").await;

    let attempt = h
        .saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::Illness)
        .await
        .unwrap();
    assert_eq!(attempt.state, AttemptState::Completed);

    let gig = h.db.gig_repo().find_by_id(&"g1".to_string()).unwrap().unwrap();
    assert_eq!(gig.status, BookingStatus::Open);
    assert_eq!(project_gig_status(&gig), BookingStatus::Open);
    assert!(gig.applicants.is_empty());
    assert!(gig.agreed_fee.is_none());
    assert!(gig.clear_pending_fee_task.is_none());
    assert!(gig.automatic_message_task.is_none());
    assert!(!gig.paid);
    assert_eq!(gig.cancellation_reason, Some(CancellationReason::Illness));

    // Both scheduled tasks gone, the payment refunded.
    assert!(h.scheduler.pending().is_empty());
    assert_eq!(*h.gateway.refunds.lock().unwrap(), vec!["tx_1".to_string()]);

    // The venue heard about it, with the mapped reason phrase.
    let conversation = h
        .db
        .conversation_repo()
        .find_by_participant_and_gig("m1", "g1")
        .unwrap()
        .unwrap();
    let messages = h.db.message_repo().list_for_conversation(&conversation.id).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].kind, MessageKind::Announcement);
    assert!(messages[0].text.contains("of illness"));
    assert!(messages[0].text.contains("Ada Quartet"));

    // The performer's lists no longer reference the gig.
    let profile = h.db.performer_repo().find_by_id(&"m1".to_string()).unwrap().unwrap();
    assert!(!profile.confirmed_gigs.contains(&"g1".to_string()));
    assert!(!profile.gig_applications.contains(&"g1".to_string()));

    // Exactly one audit row.
    let audit = h.db.cancellation_repo().list_for_gig("g1").unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].performer_id, "m1");
    assert_eq!(audit[0].reason, CancellationReason::Illness);
}

#[tokio::test]
async fn test_cancel_booking_rejects_open_gig() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.gig_repo().save(&open_gig("g1")).unwrap();
    let scheduler = Arc::new(InMemoryTaskRegistry::new());
    let gateway = Arc::new(RecordingGateway::default());
    let saga = CancellationSaga::new(db.clone(), scheduler, gateway.clone());

    let err = saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::Other)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CancellationError::NotConfirmed {
            status: BookingStatus::Open,
            ..
        }
    ));

    // Rejected before any step ran.
    assert!(gateway.refunds.lock().unwrap().is_empty());
    assert!(db.cancellation_repo().list_for_gig("g1").unwrap().is_empty());
    assert!(db.cancellation_repo().attempts_for_gig("g1").unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_booking_rejects_wrong_actor() {
    let h = harness_with_confirmed_gig("g1").await;

    let err = h
        .saga
        .cancel_booking("g1", &performer_actor("m2"), CancellationReason::Fee)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::NotPermitted(_)));

    let err = h
        .saga
        .cancel_booking("g1", &venue_actor("staff-1", "v1"), CancellationReason::Fee)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::NotPermitted(_)));

    // Still confirmed, nothing touched.
    let gig = h.db.gig_repo().find_by_id(&"g1".to_string()).unwrap().unwrap();
    assert_eq!(gig.status, BookingStatus::Confirmed);
    assert_eq!(h.scheduler.pending().len(), 2);
}

#[tokio::test]
async fn test_cancel_booking_is_not_repeatable() {
    let h = harness_with_confirmed_gig("g1").await;

    h.saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::Availability)
        .await
        .unwrap();

    // The second invocation fails the status precondition: no duplicate
    // refunds and no duplicate audit rows.
    let err = h
        .saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::Availability)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::NotConfirmed { .. }));
    assert_eq!(h.gateway.refunds.lock().unwrap().len(), 1);
    assert_eq!(h.db.cancellation_repo().list_for_gig("g1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_refund_failure_parks_attempt_and_leaves_record() {
    let h = harness_with_confirmed_gig("g1").await;
    h.gateway.fail_refunds.store(true, Ordering::SeqCst);

    let err = h
        .saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::Illness)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::RefundFailed { .. }));

    // The record rollback never ran.
    let gig = h.db.gig_repo().find_by_id(&"g1".to_string()).unwrap().unwrap();
    assert_eq!(gig.status, BookingStatus::Confirmed);
    assert_eq!(gig.applicants.len(), 1);
    assert!(gig.agreed_fee.is_some());

    // But the best-effort task cancellations had already happened.
    assert!(h.scheduler.pending().is_empty());

    // No message, no audit row, and a parked attempt at the refund step.
    assert!(
        h.db.conversation_repo()
            .find_by_participant_and_gig("m1", "g1")
            .unwrap()
            .is_none()
    );
    assert!(h.db.cancellation_repo().list_for_gig("g1").unwrap().is_empty());
    let attempts = h.db.cancellation_repo().attempts_for_gig("g1").unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].state, AttemptState::PendingRefund);
    assert_eq!(attempts[0].cursor, SagaStep::RefundPayment);
}

#[tokio::test]
async fn test_resume_retries_refund_without_repeating_task_steps() {
    let h = harness_with_confirmed_gig("g1").await;
    h.gateway.fail_refunds.store(true, Ordering::SeqCst);
    h.saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::Illness)
        .await
        .unwrap_err();

    // The task names are still on the gig but the registry no longer holds
    // them; resuming must skip those steps or it would fail them again.
    h.gateway.fail_refunds.store(false, Ordering::SeqCst);
    let attempt_id = h.db.cancellation_repo().attempts_for_gig("g1").unwrap()[0]
        .id
        .clone();
    let attempt = h.saga.resume(&attempt_id).await.unwrap();
    assert_eq!(attempt.state, AttemptState::Completed);

    let gig = h.db.gig_repo().find_by_id(&"g1".to_string()).unwrap().unwrap();
    assert_eq!(gig.status, BookingStatus::Open);
    assert!(gig.applicants.is_empty());
    assert_eq!(*h.gateway.refunds.lock().unwrap(), vec!["tx_1".to_string()]);
    assert_eq!(h.db.cancellation_repo().list_for_gig("g1").unwrap().len(), 1);

    // Resuming a completed attempt is a no-op.
    let again = h.saga.resume(&attempt_id).await.unwrap();
    assert_eq!(again.state, AttemptState::Completed);
    assert_eq!(h.gateway.refunds.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_scheduled_tasks_do_not_abort() {
    let h = harness_with_confirmed_gig("g1").await;
    // Simulate tasks that already fired: the registry no longer holds them.
    h.scheduler.cancel("fee-release-g1").await.unwrap();
    h.scheduler.cancel("reminder-g1").await.unwrap();

    let attempt = h
        .saga
        .cancel_booking("g1", &performer_actor("m1"), CancellationReason::DoubleBooking)
        .await
        .unwrap();
    assert_eq!(attempt.state, AttemptState::Completed);
    assert_eq!(*h.gateway.refunds.lock().unwrap(), vec!["tx_1".to_string()]);

    let gig = h.db.gig_repo().find_by_id(&"g1".to_string()).unwrap().unwrap();
    assert_eq!(gig.status, BookingStatus::Open);
}

// ---------------------------------------------------------------------------
// Venue-hire cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cancel_venue_hire_notifies_platform_hirer() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let mut opportunity = hire_opportunity("h1");
    opportunity.confirm_hire("Jane Doe", Some("u9".to_string())).unwrap();
    db.venue_hire_repo().save(&opportunity).unwrap();

    // The booking came through the platform: a thread already exists.
    let conversation = Conversation {
        id: "c1".to_string(),
        participants: vec!["u9".to_string(), "v1".to_string()],
        account_names: vec![],
        gig_id: "h1".to_string(),
        last_message: None,
        last_message_timestamp: None,
        last_message_sender_id: None,
        archived: Default::default(),
        last_viewed: Default::default(),
        created_at: "2026-07-22T12:00:00+00:00".to_string(),
    };
    db.conversation_repo().save(&conversation).unwrap();

    let saga = CancellationSaga::new(
        db.clone(),
        Arc::new(InMemoryTaskRegistry::new()),
        Arc::new(RecordingGateway::default()),
    );
    saga.cancel_venue_hire("h1", &venue_actor("staff-1", "v1"), CancellationReason::Other, true)
        .await
        .unwrap();

    let opportunity = db.venue_hire_repo().find_by_id(&"h1".to_string()).unwrap().unwrap();
    assert_eq!(opportunity.status, HireStatus::Available);
    assert!(opportunity.hirer_name.is_none());
    assert!(opportunity.hirer_user_id.is_none());

    let messages = db.message_repo().list_for_conversation("c1").unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].text.contains("of other reasons"));

    assert_eq!(db.cancellation_repo().list_for_gig("h1").unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_venue_hire_manual_hirer_sends_nothing() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let mut opportunity = hire_opportunity("h1");
    opportunity.confirm_hire("Jane Doe", None).unwrap();
    db.venue_hire_repo().save(&opportunity).unwrap();

    let saga = CancellationSaga::new(
        db.clone(),
        Arc::new(InMemoryTaskRegistry::new()),
        Arc::new(RecordingGateway::default()),
    );
    saga.cancel_venue_hire("h1", &venue_actor("staff-1", "v1"), CancellationReason::Other, true)
        .await
        .unwrap();

    let opportunity = db.venue_hire_repo().find_by_id(&"h1".to_string()).unwrap().unwrap();
    assert_eq!(opportunity.status, HireStatus::Available);
    assert!(opportunity.hirer_name.is_none());

    // No thread was ever created, so nothing was sent.
    assert!(
        db.conversation_repo()
            .find_by_participant_and_gig("u9", "h1")
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_cancel_venue_hire_requires_permission() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let mut opportunity = hire_opportunity("h1");
    opportunity.confirm_hire("Jane Doe", None).unwrap();
    db.venue_hire_repo().save(&opportunity).unwrap();

    let saga = CancellationSaga::new(
        db.clone(),
        Arc::new(InMemoryTaskRegistry::new()),
        Arc::new(RecordingGateway::default()),
    );

    let unauthorised = CancellationActor::VenueMember {
        member_id: "staff-2".to_string(),
        venue_id: "v1".to_string(),
        permissions: vec![],
    };
    let err = saga
        .cancel_venue_hire("h1", &unauthorised, CancellationReason::Other, false)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::NotPermitted(_)));

    let other_venue = venue_actor("staff-1", "v2");
    let err = saga
        .cancel_venue_hire("h1", &other_venue, CancellationReason::Other, false)
        .await
        .unwrap_err();
    assert!(matches!(err, CancellationError::NotPermitted(_)));
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_confirm_booking_sets_up_what_cancellation_unwinds() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let scheduler = Arc::new(InMemoryTaskRegistry::new());
    let gateway = Arc::new(RecordingGateway::default());
    db.gig_repo().save(&open_gig("g1")).unwrap();
    db.performer_repo()
        .save(&PerformerProfile {
            id: "m1".to_string(),
            name: "Ada Quartet".to_string(),
            gig_applications: vec!["g1".to_string()],
            confirmed_gigs: vec![],
            created_at: "2026-07-01T08:00:00+00:00".to_string(),
        })
        .unwrap();

    let confirmation = BookingConfirmation::new(db.clone(), scheduler.clone(), gateway.clone());
    let gig = confirmation.confirm_booking("g1", "m1", "£175").await.unwrap();

    assert_eq!(gig.status, BookingStatus::Confirmed);
    assert_eq!(gig.agreed_fee, Some("£175".to_string()));
    assert_eq!(gig.transaction_id, Some("tx_1".to_string()));
    assert!(gig.clear_pending_fee_task.is_some());
    assert!(gig.automatic_message_task.is_some());
    assert_eq!(scheduler.pending().len(), 2);
    assert_eq!(gateway.charges.lock().unwrap().len(), 1);

    let profile = db.performer_repo().find_by_id(&"m1".to_string()).unwrap().unwrap();
    assert!(profile.confirmed_gigs.contains(&"g1".to_string()));

    // Confirming twice is rejected by the gig's own transition guard.
    assert!(confirmation.confirm_booking("g1", "m1", "£175").await.is_err());
}
