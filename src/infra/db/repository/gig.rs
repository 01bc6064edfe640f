use super::DbConn;
use crate::domain::{Applicant, Gig, GigId};
use anyhow::Result;
use rusqlite::{Row, params};

/// Repository for gig records.
pub struct GigRepository {
    conn: DbConn,
}

impl GigRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, gig: &Gig) -> Result<()> {
        gig.validate()?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO gigs (
                id, venue_id, venue_name, date, start_time, duration_minutes,
                sibling_slot_ids, kind, private, invite_token, budget, agreed_fee,
                paid, applicants, status, clear_pending_fee_task, automatic_message_task,
                transaction_id, dispute_logged, dispute_clearing_time, musician_fee_status,
                payment_status, cancellation_reason, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)
            "#,
            params![
                &gig.id,
                &gig.venue_id,
                &gig.venue_name,
                &gig.date,
                &gig.start_time,
                gig.duration_minutes,
                serde_json::to_string(&gig.sibling_slot_ids)?,
                gig.kind.to_string(),
                gig.private,
                &gig.invite_token,
                &gig.budget,
                &gig.agreed_fee,
                gig.paid,
                serde_json::to_string(&gig.applicants)?,
                gig.status.to_string(),
                &gig.clear_pending_fee_task,
                &gig.automatic_message_task,
                &gig.transaction_id,
                gig.dispute_logged,
                &gig.dispute_clearing_time,
                &gig.musician_fee_status,
                &gig.payment_status,
                gig.cancellation_reason.map(|r| r.to_string()),
                &gig.created_at,
                &gig.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &GigId) -> Result<Option<Gig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], row_to_gig)?;

        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    pub fn list_all(&self) -> Result<Vec<Gig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs ORDER BY date, start_time"
        ))?;
        let rows = stmt.query_map([], row_to_gig)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_for_venue(&self, venue_id: &str) -> Result<Vec<Gig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE venue_id = ?1 ORDER BY date, start_time"
        ))?;
        let rows = stmt.query_map([venue_id], row_to_gig)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn delete(&self, id: &GigId) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute("DELETE FROM gigs WHERE id = ?1", [id])?;
        Ok(affected)
    }
}

const GIG_COLUMNS: &str = "id, venue_id, venue_name, date, start_time, duration_minutes, \
     sibling_slot_ids, kind, private, invite_token, budget, agreed_fee, paid, applicants, \
     status, clear_pending_fee_task, automatic_message_task, transaction_id, dispute_logged, \
     dispute_clearing_time, musician_fee_status, payment_status, cancellation_reason, \
     created_at, updated_at";

fn row_to_gig(row: &Row<'_>) -> rusqlite::Result<Gig> {
    let sibling_json: String = row.get(6)?;
    let applicants_json: String = row.get(13)?;
    let applicants: Vec<Applicant> = serde_json::from_str(&applicants_json).unwrap_or_default();
    Ok(Gig {
        id: row.get(0)?,
        venue_id: row.get(1)?,
        venue_name: row.get(2)?,
        date: row.get(3)?,
        start_time: row.get(4)?,
        duration_minutes: row.get(5)?,
        sibling_slot_ids: serde_json::from_str(&sibling_json).unwrap_or_default(),
        kind: row.get::<_, String>(7)?.parse().unwrap_or_default(),
        private: row.get(8)?,
        invite_token: row.get(9)?,
        budget: row.get(10)?,
        agreed_fee: row.get(11)?,
        paid: row.get(12)?,
        applicants,
        status: row.get::<_, String>(14)?.parse().unwrap_or_default(),
        clear_pending_fee_task: row.get(15)?,
        automatic_message_task: row.get(16)?,
        transaction_id: row.get(17)?,
        dispute_logged: row.get(18)?,
        dispute_clearing_time: row.get(19)?,
        musician_fee_status: row.get(20)?,
        payment_status: row.get(21)?,
        cancellation_reason: row
            .get::<_, Option<String>>(22)?
            .map(|r| r.parse().unwrap_or_default()),
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
    })
}
