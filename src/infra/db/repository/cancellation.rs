use super::DbConn;
use crate::domain::{CancellationAttempt, CancellationRecord};
use anyhow::Result;
use rusqlite::Row;
use uuid::Uuid;

/// Repository for the cancellation audit trail and the persisted workflow
/// attempts. Audit rows are append-only.
pub struct CancellationRepository {
    conn: DbConn,
}

impl CancellationRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn append(&self, record: &CancellationRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO cancellations (id, gig_id, performer_id, reason, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            (
                Uuid::new_v4().to_string(),
                &record.gig_id,
                &record.performer_id,
                record.reason.to_string(),
                &record.timestamp,
            ),
        )?;
        Ok(())
    }

    pub fn list_for_gig(&self, gig_id: &str) -> Result<Vec<CancellationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT gig_id, performer_id, reason, timestamp FROM cancellations \
             WHERE gig_id = ?1 ORDER BY timestamp",
        )?;
        let rows = stmt.query_map([gig_id], |row| {
            Ok(CancellationRecord {
                gig_id: row.get(0)?,
                performer_id: row.get(1)?,
                reason: row.get::<_, String>(2)?.parse().unwrap_or_default(),
                timestamp: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn save_attempt(&self, attempt: &CancellationAttempt) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO cancellation_attempts (
                id, gig_id, performer_id, reason, cursor, state, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            (
                &attempt.id,
                &attempt.gig_id,
                &attempt.performer_id,
                attempt.reason.to_string(),
                attempt.cursor.to_string(),
                attempt.state.to_string(),
                &attempt.created_at,
                &attempt.updated_at,
            ),
        )?;
        Ok(())
    }

    pub fn find_attempt(&self, id: &str) -> Result<Option<CancellationAttempt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM cancellation_attempts WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], row_to_attempt)?;

        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    pub fn attempts_for_gig(&self, gig_id: &str) -> Result<Vec<CancellationAttempt>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM cancellation_attempts WHERE gig_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt.query_map([gig_id], row_to_attempt)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

const ATTEMPT_COLUMNS: &str =
    "id, gig_id, performer_id, reason, cursor, state, created_at, updated_at";

fn row_to_attempt(row: &Row<'_>) -> rusqlite::Result<CancellationAttempt> {
    let cursor: String = row.get(4)?;
    let state: String = row.get(5)?;
    Ok(CancellationAttempt {
        id: row.get(0)?,
        gig_id: row.get(1)?,
        performer_id: row.get(2)?,
        reason: row.get::<_, String>(3)?.parse().unwrap_or_default(),
        cursor: cursor.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
        })?,
        state: state.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
        })?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
