use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::gig::GigId;

/// Unique identifier for a conversation
pub type ConversationId = String;

/// Role a participant plays in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Venue,
    Musician,
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Venue => write!(f, "venue"),
            Self::Musician => write!(f, "musician"),
        }
    }
}

/// Display name of a participant, per role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountName {
    pub role: ParticipantRole,
    pub participant_id: String,
    pub account_name: String,
}

/// A message thread between two parties about one booking.
///
/// Created lazily on first contact, keyed by participant and gig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    /// Account ids of both parties.
    pub participants: Vec<String>,
    #[serde(default)]
    pub account_names: Vec<AccountName>,
    /// Booking this thread is about.
    pub gig_id: GigId,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_timestamp: Option<String>,
    #[serde(default)]
    pub last_message_sender_id: Option<String>,
    /// Per-user archived flag.
    #[serde(default)]
    pub archived: HashMap<String, bool>,
    /// Per-user timestamp of the last read.
    #[serde(default)]
    pub last_viewed: HashMap<String, String>,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
}

/// Kind of message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Chat,
    /// System-generated notice, e.g. a cancellation announcement.
    Announcement,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Announcement => write!(f, "announcement"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "announcement" => Ok(Self::Announcement),
            _ => Ok(Self::Chat),
        }
    }
}

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Sent,
    Read,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Read => write!(f, "read"),
        }
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            _ => Ok(Self::Sent),
        }
    }
}

/// A single message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: ConversationId,
    pub sender_id: String,
    pub text: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub status: MessageStatus,
    /// RFC3339 timestamp.
    pub timestamp: String,
}
