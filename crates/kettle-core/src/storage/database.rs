//! SQLite-based message store.
//!
//! Every recorded kettle event lands in the `messages` table together with
//! the local time it happened. The table is created on first open.

use std::path::Path;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::logs_dir;
use crate::error::DatabaseError;
use crate::ports::Recorder;

/// Timestamp layout of the `date` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Database file name inside the logs directory.
pub const DATABASE_FILE: &str = "kettle_logs.sqlite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub message: String,
    pub date: Option<String>,
}

/// SQLite database for kettle messages.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/logs/kettle_logs.sqlite`.
    ///
    /// # Errors
    /// Returns an error if the logs directory cannot be created or the
    /// database cannot be opened.
    pub fn open() -> crate::error::Result<Self> {
        let path = logs_dir()?.join(DATABASE_FILE);
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS messages (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                message TEXT NOT NULL,
                date    TEXT
            );",
        )?;
        Ok(())
    }

    /// Append a message row.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn insert_message(&self, message: &str, date: &str) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO messages (message, date) VALUES (?1, ?2)",
            params![message, date],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent messages first. `None` returns everything.
    pub fn messages(&self, limit: Option<u32>) -> Result<Vec<MessageRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, message, date FROM messages
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = stmt.query_map(params![limit], |row| {
            Ok(MessageRecord {
                id: row.get(0)?,
                message: row.get(1)?,
                date: row.get(2)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn message_count(&self) -> Result<u64, DatabaseError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get::<_, u64>(0))?;
        Ok(count)
    }

    /// Delete all messages. Returns the number of rows removed.
    pub fn clear(&self) -> Result<usize, DatabaseError> {
        Ok(self.conn.execute("DELETE FROM messages", [])?)
    }
}

impl Recorder for Database {
    fn record(&mut self, message: &str, timestamp: &str) -> Result<(), DatabaseError> {
        self.insert_message(message, timestamp).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_query() {
        let mut db = Database::open_memory().unwrap();
        db.record("Kettle is on.", "2024-01-01 10:00:00").unwrap();
        db.record("Kettle is off.", "2024-01-01 10:00:05").unwrap();

        let rows = db.messages(None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message, "Kettle is off.");
        assert_eq!(rows[1].date.as_deref(), Some("2024-01-01 10:00:00"));
        assert!(rows[0].id > rows[1].id);
    }

    #[test]
    fn limit_returns_newest() {
        let db = Database::open_memory().unwrap();
        for i in 0..5 {
            db.insert_message(&format!("Temperature: {i}.0"), "2024-01-01 10:00:00")
                .unwrap();
        }
        let rows = db.messages(Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].message, "Temperature: 4.0");
        assert_eq!(db.message_count().unwrap(), 5);
    }

    #[test]
    fn clear_removes_everything() {
        let db = Database::open_memory().unwrap();
        db.insert_message("Kettle is on.", "2024-01-01 10:00:00")
            .unwrap();
        assert_eq!(db.clear().unwrap(), 1);
        assert_eq!(db.message_count().unwrap(), 0);
    }

    #[test]
    fn ids_keep_increasing_after_clear() {
        let db = Database::open_memory().unwrap();
        let first = db.insert_message("a", "2024-01-01 10:00:00").unwrap();
        db.clear().unwrap();
        let second = db.insert_message("b", "2024-01-01 10:00:01").unwrap();
        assert!(second > first);
    }
}
