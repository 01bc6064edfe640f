//! Bandstand CLI entry point.
//!
//! Terminal interface for inspecting and driving the booking lifecycle
//! against the local store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use bandstand::application::booking::{
    BookingConfirmation, CancellationActor, CancellationSaga, GIGS_UPDATE_PERMISSION,
    summarise_gig, summarise_hire,
};
use bandstand::domain::CancellationReason;
use bandstand::infra::db::Database;
use bandstand::infra::payments::SandboxPaymentGateway;
use bandstand::infra::scheduler::InMemoryTaskRegistry;

#[derive(Parser, Debug)]
#[command(name = "bandstand")]
#[command(about = "Booking lifecycle tool for the venue/artist marketplace", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List gigs and venue hires with their resolved status
    List,

    /// Confirm an applicant on an open gig
    Confirm {
        /// Gig id
        gig: String,
        /// Performer id of the applicant
        performer: String,
        /// Agreed fee, e.g. "£150"
        #[arg(short, long)]
        fee: String,
    },

    /// Cancel a confirmed booking as its performer
    Cancel {
        /// Gig id
        gig: String,
        /// Performer id of the confirmed applicant
        performer: String,
        /// Reason code (fee, availability, double-booking, personal-reasons,
        /// illness, information, other)
        #[arg(short, long, default_value = "other")]
        reason: String,
    },

    /// Cancel a confirmed venue hire as a venue member
    CancelHire {
        /// Opportunity id
        opportunity: String,
        /// Acting venue member id
        #[arg(long)]
        member: String,
        /// Venue id the member acts for
        #[arg(long)]
        venue: String,
        #[arg(short, long, default_value = "other")]
        reason: String,
        /// Notify the hirer when the booking came through the platform
        #[arg(long)]
        notify: bool,
    },

    /// Resume a parked cancellation attempt
    Resume {
        /// Attempt id
        attempt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let db = Arc::new(Database::open()?);
    let scheduler = Arc::new(InMemoryTaskRegistry::new());
    let payments = Arc::new(SandboxPaymentGateway::new());

    match args.command {
        Commands::List => {
            for gig in db.gig_repo().list_all()? {
                let summary = summarise_gig(&gig, &[]);
                println!(
                    "{}  {}  {}  {}  {}",
                    gig.id,
                    summary.date_label,
                    summary.time_range_label,
                    summary.status,
                    summary.fee_label.unwrap_or_default()
                );
            }
            for opportunity in db.venue_hire_repo().list_all()? {
                let summary = summarise_hire(&opportunity);
                let booked_by = summary
                    .booked_by
                    .map(|b| b.name)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {}  {}  hire  {}",
                    opportunity.id,
                    summary.date_label,
                    summary.time_range_label,
                    summary.status,
                    booked_by
                );
            }
        }
        Commands::Confirm {
            gig,
            performer,
            fee,
        } => {
            let confirmation = BookingConfirmation::new(db, scheduler, payments);
            let gig = confirmation.confirm_booking(&gig, &performer, &fee).await?;
            println!(
                "Confirmed {performer} on gig {} for {}",
                gig.id,
                gig.agreed_fee.unwrap_or_default()
            );
        }
        Commands::Cancel {
            gig,
            performer,
            reason,
        } => {
            let saga = CancellationSaga::new(db, scheduler, payments);
            let actor = CancellationActor::Performer {
                performer_id: performer,
            };
            let reason: CancellationReason = reason.parse().unwrap_or_default();
            let attempt = saga.cancel_booking(&gig, &actor, reason).await?;
            println!("Cancelled gig {gig} (attempt {})", attempt.id);
        }
        Commands::CancelHire {
            opportunity,
            member,
            venue,
            reason,
            notify,
        } => {
            let saga = CancellationSaga::new(db, scheduler, payments);
            let actor = CancellationActor::VenueMember {
                member_id: member,
                venue_id: venue,
                permissions: vec![GIGS_UPDATE_PERMISSION.to_string()],
            };
            let reason: CancellationReason = reason.parse().unwrap_or_default();
            saga.cancel_venue_hire(&opportunity, &actor, reason, notify)
                .await?;
            println!("Venue hire {opportunity} returned to available");
        }
        Commands::Resume { attempt } => {
            let saga = CancellationSaga::new(db, scheduler, payments);
            let attempt = saga.resume(&attempt).await?;
            println!("Attempt {} is now {}", attempt.id, attempt.state);
        }
    }

    Ok(())
}
