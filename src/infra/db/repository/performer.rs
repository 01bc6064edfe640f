use super::DbConn;
use crate::domain::{PerformerId, PerformerProfile};
use anyhow::Result;

/// Repository for performer profiles.
pub struct PerformerRepository {
    conn: DbConn,
}

impl PerformerRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, profile: &PerformerProfile) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO performers (id, name, gig_applications, confirmed_gigs, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            (
                &profile.id,
                &profile.name,
                serde_json::to_string(&profile.gig_applications)?,
                serde_json::to_string(&profile.confirmed_gigs)?,
                &profile.created_at,
            ),
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &PerformerId) -> Result<Option<PerformerProfile>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, gig_applications, confirmed_gigs, created_at FROM performers WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], |row| {
            let applications_json: String = row.get(2)?;
            let confirmed_json: String = row.get(3)?;
            Ok(PerformerProfile {
                id: row.get(0)?,
                name: row.get(1)?,
                gig_applications: serde_json::from_str(&applications_json).unwrap_or_default(),
                confirmed_gigs: serde_json::from_str(&confirmed_json).unwrap_or_default(),
                created_at: row.get(4)?,
            })
        })?;

        match rows.next() {
            Some(row) => row.map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }
}
