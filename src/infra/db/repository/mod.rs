//! Repository implementations for data access in Bandstand.
//!
//! Provides database operations for gigs, venue hires, performer profiles,
//! conversations, and cancellation records.

mod cancellation;
mod conversation;
mod gig;
mod performer;
mod venue_hire;

pub use cancellation::CancellationRepository;
pub use conversation::{ConversationRepository, MessageRepository};
pub use gig::GigRepository;
pub use performer::PerformerRepository;
pub use venue_hire::VenueHireRepository;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub(super) type DbConn = Arc<Mutex<Connection>>;
