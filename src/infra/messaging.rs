//! Messaging over conversation threads.
//!
//! A conversation between a performer and a venue is created lazily on
//! first contact, keyed by participant and gig. Appending a message keeps
//! the thread's denormalised `last_message*` fields in step.

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    AccountName, Conversation, Gig, Message, MessageKind, MessageStatus, ParticipantRole,
};
use crate::infra::db::repository::{ConversationRepository, MessageRepository};

pub struct MessagingService {
    conversations: ConversationRepository,
    messages: MessageRepository,
}

impl MessagingService {
    pub fn new(conversations: ConversationRepository, messages: MessageRepository) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    pub fn find_conversation(
        &self,
        participant_id: &str,
        gig_id: &str,
    ) -> Result<Option<Conversation>> {
        self.conversations
            .find_by_participant_and_gig(participant_id, gig_id)
    }

    /// The thread between a performer and the gig's venue, created if this
    /// is their first contact about the booking.
    pub fn find_or_create_conversation(
        &self,
        performer_id: &str,
        performer_name: &str,
        gig: &Gig,
    ) -> Result<Conversation> {
        if let Some(existing) = self
            .conversations
            .find_by_participant_and_gig(performer_id, &gig.id)?
        {
            return Ok(existing);
        }

        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            participants: vec![performer_id.to_string(), gig.venue_id.clone()],
            account_names: vec![
                AccountName {
                    role: ParticipantRole::Musician,
                    participant_id: performer_id.to_string(),
                    account_name: performer_name.to_string(),
                },
                AccountName {
                    role: ParticipantRole::Venue,
                    participant_id: gig.venue_id.clone(),
                    account_name: gig.venue_name.clone(),
                },
            ],
            gig_id: gig.id.clone(),
            last_message: None,
            last_message_timestamp: None,
            last_message_sender_id: None,
            archived: Default::default(),
            last_viewed: Default::default(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.conversations.save(&conversation)?;
        Ok(conversation)
    }

    /// Append a system announcement to a thread.
    pub fn append_announcement(
        &self,
        conversation: &Conversation,
        sender_id: &str,
        text: &str,
    ) -> Result<Message> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation.id.clone(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            kind: MessageKind::Announcement,
            status: MessageStatus::Sent,
            timestamp: Utc::now().to_rfc3339(),
        };
        self.messages.save(&message)?;

        let mut updated = conversation.clone();
        updated.last_message = Some(message.text.clone());
        updated.last_message_timestamp = Some(message.timestamp.clone());
        updated.last_message_sender_id = Some(message.sender_id.clone());
        self.conversations.save(&updated)?;

        Ok(message)
    }

    pub fn messages_for(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.messages.list_for_conversation(conversation_id)
    }
}
