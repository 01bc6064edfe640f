use serde::{Deserialize, Serialize};

use super::gig::{GigId, PerformerId};

/// A performer's platform profile, as far as the booking lifecycle is
/// concerned: display name plus the gig id lists the saga rolls back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformerProfile {
    pub id: PerformerId,
    pub name: String,
    /// Gigs the performer has applied to.
    #[serde(default)]
    pub gig_applications: Vec<GigId>,
    /// Gigs the performer is confirmed on.
    #[serde(default)]
    pub confirmed_gigs: Vec<GigId>,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
}

impl PerformerProfile {
    /// Record a confirmed booking on the profile.
    pub fn add_confirmed_gig(&mut self, gig_id: &str) {
        if !self.confirmed_gigs.iter().any(|g| g == gig_id) {
            self.confirmed_gigs.push(gig_id.to_string());
        }
    }

    /// Drop a gig from both the application and confirmed lists.
    pub fn withdraw_from_gig(&mut self, gig_id: &str) {
        self.gig_applications.retain(|g| g != gig_id);
        self.confirmed_gigs.retain(|g| g != gig_id);
    }
}
