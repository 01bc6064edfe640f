//! SQLite database setup and connection management for Bandstand
//! Handles database initialization, schema creation, and connection management.

use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Database wrapper that manages SQLite connections
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path();
        Self::open_at(path)
    }

    /// Create an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Create or open the database at a specific path
    pub fn open_at(path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Get the default database path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("BANDSTAND_DB_PATH") {
            return PathBuf::from(path);
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = home::home_dir() {
                return home
                    .join("Library")
                    .join("Application Support")
                    .join("Bandstand")
                    .join("db.sqlite");
            }
        }

        #[cfg(target_os = "windows")]
        {
            if let Some(appdata) = std::env::var_os("APPDATA") {
                return PathBuf::from(appdata).join("Bandstand").join("db.sqlite");
            }
        }

        #[cfg(target_os = "linux")]
        {
            if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
                return PathBuf::from(xdg).join("bandstand").join("db.sqlite");
            }
            if let Some(home) = home::home_dir() {
                return home
                    .join(".local")
                    .join("share")
                    .join("bandstand")
                    .join("db.sqlite");
            }
        }

        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".bandstand")
            .join("db.sqlite")
    }

    /// Initialize database schema
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        const SCHEMA_VERSION: i32 = 1;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if existing_version < SCHEMA_VERSION {
            Self::create_schema(&conn)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn gig_repo(&self) -> crate::infra::db::repository::GigRepository {
        crate::infra::db::repository::GigRepository::new(self.connection())
    }

    pub fn venue_hire_repo(&self) -> crate::infra::db::repository::VenueHireRepository {
        crate::infra::db::repository::VenueHireRepository::new(self.connection())
    }

    pub fn performer_repo(&self) -> crate::infra::db::repository::PerformerRepository {
        crate::infra::db::repository::PerformerRepository::new(self.connection())
    }

    pub fn conversation_repo(&self) -> crate::infra::db::repository::ConversationRepository {
        crate::infra::db::repository::ConversationRepository::new(self.connection())
    }

    pub fn message_repo(&self) -> crate::infra::db::repository::MessageRepository {
        crate::infra::db::repository::MessageRepository::new(self.connection())
    }

    pub fn cancellation_repo(&self) -> crate::infra::db::repository::CancellationRepository {
        crate::infra::db::repository::CancellationRepository::new(self.connection())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS gigs (
                id TEXT PRIMARY KEY,
                venue_id TEXT NOT NULL,
                venue_name TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                sibling_slot_ids TEXT NOT NULL DEFAULT '[]',
                kind TEXT NOT NULL DEFAULT 'live_music',
                private INTEGER NOT NULL DEFAULT 0,
                invite_token TEXT,
                budget TEXT,
                agreed_fee TEXT,
                paid INTEGER NOT NULL DEFAULT 0,
                applicants TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open','confirmed','cancelled','completed')),
                clear_pending_fee_task TEXT,
                automatic_message_task TEXT,
                transaction_id TEXT,
                dispute_logged INTEGER NOT NULL DEFAULT 0,
                dispute_clearing_time TEXT,
                musician_fee_status TEXT,
                payment_status TEXT,
                cancellation_reason TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS venue_hires (
                id TEXT PRIMARY KEY,
                venue_id TEXT NOT NULL,
                venue_name TEXT NOT NULL,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                access_from TEXT,
                curfew TEXT,
                capacity INTEGER,
                hire_fee TEXT,
                deposit_amount TEXT,
                deposit_required INTEGER NOT NULL DEFAULT 0,
                deposit_paid INTEGER NOT NULL DEFAULT 0,
                hire_fee_paid INTEGER NOT NULL DEFAULT 0,
                hirer_name TEXT,
                hirer_user_id TEXT,
                performers TEXT NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'available' CHECK (status IN ('available','pending','confirmed','cancelled')),
                private INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS performers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                gig_applications TEXT NOT NULL DEFAULT '[]',
                confirmed_gigs TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                gig_id TEXT NOT NULL,
                participants TEXT NOT NULL,
                account_names TEXT NOT NULL DEFAULT '[]',
                last_message TEXT,
                last_message_timestamp TEXT,
                last_message_sender_id TEXT,
                archived TEXT NOT NULL DEFAULT '{}',
                last_viewed TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                conversation_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                text TEXT NOT NULL,
                kind TEXT NOT NULL DEFAULT 'chat',
                status TEXT NOT NULL DEFAULT 'sent',
                timestamp TEXT NOT NULL,
                FOREIGN KEY(conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS cancellations (
                id TEXT PRIMARY KEY,
                gig_id TEXT NOT NULL,
                performer_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cancellation_attempts (
                id TEXT PRIMARY KEY,
                gig_id TEXT NOT NULL,
                performer_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                cursor TEXT NOT NULL,
                state TEXT NOT NULL CHECK (state IN ('running','pending_refund','completed')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_gigs_venue_id ON gigs(venue_id);
            CREATE INDEX IF NOT EXISTS idx_venue_hires_venue_id ON venue_hires(venue_id);
            CREATE INDEX IF NOT EXISTS idx_conversations_gig_id ON conversations(gig_id);
            CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id);
            CREATE INDEX IF NOT EXISTS idx_cancellations_gig_id ON cancellations(gig_id);
            CREATE INDEX IF NOT EXISTS idx_attempts_gig_id ON cancellation_attempts(gig_id);
            "#,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_default_path() {
        let path = Database::default_path();
        assert!(path.to_string_lossy().contains("db.sqlite"));
    }

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.connection();
        let guard = conn.lock().unwrap();
        let res: i32 = guard.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
        assert_eq!(res, 1);
    }
}
