use rusqlite::Connection;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run()
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Determine database path
    let db_path = if let Ok(path) = std::env::var("BANDSTAND_DB_PATH") {
        std::path::PathBuf::from(path)
    } else {
        let cwd = std::env::current_dir().unwrap_or_default();
        cwd.join(".bandstand").join("db.sqlite")
    };

    if !db_path.exists() {
        println!("Database does not exist at: {}", db_path.display());
        println!("No reset needed.");
        return Ok(());
    }

    println!("Connecting to database at: {}", db_path.display());

    let conn = Connection::open(&db_path)?;

    let tables_exist: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='gigs'",
        [],
        |row| row.get(0),
    )?;

    if tables_exist == 0 {
        println!("Tables do not exist. No reset needed.");
        return Ok(());
    }

    let tables = [
        "messages",
        "conversations",
        "cancellation_attempts",
        "cancellations",
        "performers",
        "venue_hires",
        "gigs",
    ];

    println!("Current record counts:");
    for table in tables {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })?;
        println!("  {table}: {count}");
    }

    for table in tables {
        conn.execute(&format!("DELETE FROM {table}"), [])?;
        println!("Cleared {table} table");
    }

    let mut remaining = 0i64;
    for table in tables {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })?;
        remaining += count;
    }

    if remaining == 0 {
        println!("\nDatabase successfully reset! All records have been deleted.");
    } else {
        eprintln!("\nWarning: Some records still exist in the database.");
    }

    println!("Database location: {}", db_path.display());

    Ok(())
}
