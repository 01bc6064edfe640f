use super::DbConn;
use crate::domain::{HirePerformer, OpportunityId, VenueHireOpportunity};
use anyhow::Result;
use rusqlite::{Row, params};

/// Repository for venue-hire opportunities.
pub struct VenueHireRepository {
    conn: DbConn,
}

impl VenueHireRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, opportunity: &VenueHireOpportunity) -> Result<()> {
        opportunity.validate()?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO venue_hires (
                id, venue_id, venue_name, date, start_time, end_time, access_from,
                curfew, capacity, hire_fee, deposit_amount, deposit_required,
                deposit_paid, hire_fee_paid, hirer_name, hirer_user_id, performers,
                status, private, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20, ?21)
            "#,
            params![
                &opportunity.id,
                &opportunity.venue_id,
                &opportunity.venue_name,
                &opportunity.date,
                &opportunity.start_time,
                &opportunity.end_time,
                &opportunity.access_from,
                &opportunity.curfew,
                opportunity.capacity,
                &opportunity.hire_fee,
                &opportunity.deposit_amount,
                opportunity.deposit_required,
                opportunity.deposit_paid,
                opportunity.hire_fee_paid,
                &opportunity.hirer_name,
                &opportunity.hirer_user_id,
                serde_json::to_string(&opportunity.performers)?,
                opportunity.status.to_string(),
                opportunity.private,
                &opportunity.created_at,
                &opportunity.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &OpportunityId) -> Result<Option<VenueHireOpportunity>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {HIRE_COLUMNS} FROM venue_hires WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map([id], row_to_opportunity)?;

        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    pub fn list_all(&self) -> Result<Vec<VenueHireOpportunity>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {HIRE_COLUMNS} FROM venue_hires ORDER BY date, start_time"
        ))?;
        let rows = stmt.query_map([], row_to_opportunity)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_for_venue(&self, venue_id: &str) -> Result<Vec<VenueHireOpportunity>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {HIRE_COLUMNS} FROM venue_hires WHERE venue_id = ?1 ORDER BY date, start_time"
        ))?;
        let rows = stmt.query_map([venue_id], row_to_opportunity)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

const HIRE_COLUMNS: &str = "id, venue_id, venue_name, date, start_time, end_time, access_from, \
     curfew, capacity, hire_fee, deposit_amount, deposit_required, deposit_paid, hire_fee_paid, \
     hirer_name, hirer_user_id, performers, status, private, created_at, updated_at";

fn row_to_opportunity(row: &Row<'_>) -> rusqlite::Result<VenueHireOpportunity> {
    let performers_json: String = row.get(16)?;
    let performers: Vec<HirePerformer> = serde_json::from_str(&performers_json).unwrap_or_default();
    Ok(VenueHireOpportunity {
        id: row.get(0)?,
        venue_id: row.get(1)?,
        venue_name: row.get(2)?,
        date: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        access_from: row.get(6)?,
        curfew: row.get(7)?,
        capacity: row.get(8)?,
        hire_fee: row.get(9)?,
        deposit_amount: row.get(10)?,
        deposit_required: row.get(11)?,
        deposit_paid: row.get(12)?,
        hire_fee_paid: row.get(13)?,
        hirer_name: row.get(14)?,
        hirer_user_id: row.get(15)?,
        performers,
        status: row.get::<_, String>(17)?.parse().unwrap_or_default(),
        private: row.get(18)?,
        created_at: row.get(19)?,
        updated_at: row.get(20)?,
    })
}
