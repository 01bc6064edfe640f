//! Booking lifecycle core for a venue/artist marketplace.
//!
//! The crate covers the life of a booking record — open, confirmed,
//! cancelled, completed — for both artist bookings and venue hires: a pure
//! resolver that projects raw records into display summaries, the
//! confirmation flow that sets up the charge and scheduled tasks, and the
//! cancellation workflow that unwinds them.

pub mod application;
pub mod domain;
pub mod infra;
