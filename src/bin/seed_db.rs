use chrono::{NaiveDate, NaiveTime, Utc};

use bandstand::domain::{
    Applicant, ApplicantStatus, BookingStatus, Conversation, Gig, GigKind, HirePerformer,
    HireStatus, PerformerProfile, VenueHireOpportunity,
};
use bandstand::infra::db::Database;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Determine database path
    let db_path = if let Ok(path) = std::env::var("BANDSTAND_DB_PATH") {
        std::path::PathBuf::from(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        cwd.join(".bandstand").join("db.sqlite")
    };

    println!("Connecting to database at: {}", db_path.display());
    let db = Database::open_at(db_path)?;
    let now = Utc::now().to_rfc3339();

    // An open Friday-night slot with two applications waiting on the venue.
    let open_gig = Gig {
        id: "gig-friday-night".to_string(),
        venue_id: "venue-cellar-door".to_string(),
        venue_name: "The Cellar Door".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 11).unwrap(),
        start_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        duration_minutes: 120,
        sibling_slot_ids: vec![],
        kind: GigKind::LiveMusic,
        private: false,
        invite_token: None,
        budget: Some("£200".to_string()),
        agreed_fee: None,
        paid: false,
        applicants: vec![
            Applicant {
                performer_id: "performer-ada-quartet".to_string(),
                fee: "£200".to_string(),
                status: ApplicantStatus::Pending,
                applied_at: now.clone(),
                viewed: false,
            },
            Applicant {
                performer_id: "performer-covers-duo".to_string(),
                fee: "£180".to_string(),
                status: ApplicantStatus::Pending,
                applied_at: now.clone(),
                viewed: true,
            },
        ],
        status: BookingStatus::Open,
        clear_pending_fee_task: None,
        automatic_message_task: None,
        transaction_id: None,
        dispute_logged: false,
        dispute_clearing_time: None,
        musician_fee_status: None,
        payment_status: None,
        cancellation_reason: None,
        created_at: now.clone(),
        updated_at: now.clone(),
    };
    db.gig_repo().save(&open_gig)?;
    println!("Seeded open gig: {}", open_gig.id);

    // A confirmed booking, complete with the bookkeeping the cancellation
    // workflow unwinds.
    let confirmed_gig = Gig {
        id: "gig-saturday-wedding".to_string(),
        venue_id: "venue-cellar-door".to_string(),
        venue_name: "The Cellar Door".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 19).unwrap(),
        start_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        duration_minutes: 180,
        sibling_slot_ids: vec![],
        kind: GigKind::Wedding,
        private: true,
        invite_token: Some("inv-7c2d".to_string()),
        budget: Some("£450".to_string()),
        agreed_fee: Some("£450".to_string()),
        paid: false,
        applicants: vec![Applicant {
            performer_id: "performer-ada-quartet".to_string(),
            fee: "£450".to_string(),
            status: ApplicantStatus::Confirmed,
            applied_at: now.clone(),
            viewed: true,
        }],
        status: BookingStatus::Confirmed,
        clear_pending_fee_task: Some("fee-release-5f0a".to_string()),
        automatic_message_task: Some("reminder-5f0a".to_string()),
        transaction_id: Some("tx-seed-0001".to_string()),
        dispute_logged: false,
        dispute_clearing_time: None,
        musician_fee_status: Some("held".to_string()),
        payment_status: Some("charged".to_string()),
        cancellation_reason: None,
        created_at: now.clone(),
        updated_at: now.clone(),
    };
    db.gig_repo().save(&confirmed_gig)?;
    println!("Seeded confirmed gig: {}", confirmed_gig.id);

    // A venue hire confirmed through the platform, with one CRM-only act.
    let hire = VenueHireOpportunity {
        id: "hire-album-launch".to_string(),
        venue_id: "venue-cellar-door".to_string(),
        venue_name: "The Cellar Door".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
        start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        access_from: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
        curfew: Some(NaiveTime::from_hms_opt(23, 30, 0).unwrap()),
        capacity: Some(120),
        hire_fee: Some("£400".to_string()),
        deposit_amount: Some("£100".to_string()),
        deposit_required: true,
        deposit_paid: true,
        hire_fee_paid: false,
        hirer_name: Some("Jane Doe".to_string()),
        hirer_user_id: Some("user-jane-doe".to_string()),
        performers: vec![HirePerformer {
            display_name: "Covers Duo".to_string(),
            user_id: None,
            artist_id: None,
            contact_id: Some("crm-0042".to_string()),
        }],
        status: HireStatus::Confirmed,
        private: false,
        created_at: now.clone(),
        updated_at: now.clone(),
    };
    db.venue_hire_repo().save(&hire)?;
    println!("Seeded venue hire: {}", hire.id);

    // The thread that confirmed the hire came through.
    db.conversation_repo().save(&Conversation {
        id: "conv-album-launch".to_string(),
        participants: vec!["user-jane-doe".to_string(), "venue-cellar-door".to_string()],
        account_names: vec![],
        gig_id: hire.id.clone(),
        last_message: Some("See you on the 2nd!".to_string()),
        last_message_timestamp: Some(now.clone()),
        last_message_sender_id: Some("user-jane-doe".to_string()),
        archived: Default::default(),
        last_viewed: Default::default(),
        created_at: now.clone(),
    })?;
    println!("Seeded conversation: conv-album-launch");

    for (id, name, applications, confirmed) in [
        (
            "performer-ada-quartet",
            "Ada Quartet",
            vec!["gig-friday-night", "gig-saturday-wedding"],
            vec!["gig-saturday-wedding"],
        ),
        (
            "performer-covers-duo",
            "Covers Duo",
            vec!["gig-friday-night"],
            vec![],
        ),
    ] {
        db.performer_repo().save(&PerformerProfile {
            id: id.to_string(),
            name: name.to_string(),
            gig_applications: applications.iter().map(|s| s.to_string()).collect(),
            confirmed_gigs: confirmed.iter().map(|s| s.to_string()).collect(),
            created_at: now.clone(),
        })?;
        println!("Seeded performer: {name}");
    }

    println!("\nDone.");
    Ok(())
}
