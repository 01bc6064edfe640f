use super::DbConn;
use crate::domain::{AccountName, Conversation, ConversationId, Message};
use anyhow::Result;
use rusqlite::Row;
use std::collections::HashMap;

/// Repository for conversation threads.
pub struct ConversationRepository {
    conn: DbConn,
}

impl ConversationRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, conversation: &Conversation) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO conversations (
                id, gig_id, participants, account_names, last_message,
                last_message_timestamp, last_message_sender_id, archived, last_viewed, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            (
                &conversation.id,
                &conversation.gig_id,
                serde_json::to_string(&conversation.participants)?,
                serde_json::to_string(&conversation.account_names)?,
                &conversation.last_message,
                &conversation.last_message_timestamp,
                &conversation.last_message_sender_id,
                serde_json::to_string(&conversation.archived)?,
                serde_json::to_string(&conversation.last_viewed)?,
                &conversation.created_at,
            ),
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], row_to_conversation)?;

        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    /// The thread between a participant and the counterparty about one gig,
    /// if one was ever started.
    pub fn find_by_participant_and_gig(
        &self,
        participant_id: &str,
        gig_id: &str,
    ) -> Result<Option<Conversation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE gig_id = ?1"
        ))?;
        let rows = stmt.query_map([gig_id], row_to_conversation)?;
        for row in rows {
            let conversation = row?;
            if conversation.participants.iter().any(|p| p == participant_id) {
                return Ok(Some(conversation));
            }
        }
        Ok(None)
    }
}

const CONVERSATION_COLUMNS: &str = "id, gig_id, participants, account_names, last_message, \
     last_message_timestamp, last_message_sender_id, archived, last_viewed, created_at";

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    let participants_json: String = row.get(2)?;
    let account_names_json: String = row.get(3)?;
    let archived_json: String = row.get(7)?;
    let last_viewed_json: String = row.get(8)?;
    let participants: Vec<String> = serde_json::from_str(&participants_json).unwrap_or_default();
    let account_names: Vec<AccountName> =
        serde_json::from_str(&account_names_json).unwrap_or_default();
    let archived: HashMap<String, bool> = serde_json::from_str(&archived_json).unwrap_or_default();
    let last_viewed: HashMap<String, String> =
        serde_json::from_str(&last_viewed_json).unwrap_or_default();
    Ok(Conversation {
        id: row.get(0)?,
        gig_id: row.get(1)?,
        participants,
        account_names,
        last_message: row.get(4)?,
        last_message_timestamp: row.get(5)?,
        last_message_sender_id: row.get(6)?,
        archived,
        last_viewed,
        created_at: row.get(9)?,
    })
}

/// Repository for messages within conversations.
pub struct MessageRepository {
    conn: DbConn,
}

impl MessageRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, message: &Message) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO messages (id, conversation_id, sender_id, text, kind, status, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            (
                &message.id,
                &message.conversation_id,
                &message.sender_id,
                &message.text,
                message.kind.to_string(),
                message.status.to_string(),
                &message.timestamp,
            ),
        )?;
        Ok(())
    }

    pub fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, conversation_id, sender_id, text, kind, status, timestamp \
             FROM messages WHERE conversation_id = ?1 ORDER BY timestamp",
        )?;
        let rows = stmt.query_map([conversation_id], |row| {
            Ok(Message {
                id: row.get(0)?,
                conversation_id: row.get(1)?,
                sender_id: row.get(2)?,
                text: row.get(3)?,
                kind: row.get::<_, String>(4)?.parse().unwrap_or_default(),
                status: row.get::<_, String>(5)?.parse().unwrap_or_default(),
                timestamp: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
