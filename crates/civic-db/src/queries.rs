use crate::Database;
use crate::models::RecordRow;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Records --

    pub fn get_record(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get_record_row(key)?.map(|row| row.value))
    }

    pub fn get_record_row(&self, key: &str) -> Result<Option<RecordRow>> {
        self.with_conn(|conn| query_record(conn, key))
    }

    /// Replace the whole document stored under `key`.
    pub fn put_record(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                (key, value),
            )?;
            Ok(())
        })
    }

    /// Returns true if a record was removed.
    pub fn delete_record(&self, key: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM records WHERE key = ?1", [key])?;
            Ok(removed > 0)
        })
    }
}

fn query_record(conn: &Connection, key: &str) -> Result<Option<RecordRow>> {
    let mut stmt = conn.prepare("SELECT key, value, updated_at FROM records WHERE key = ?1")?;

    let row = stmt
        .query_row([key], |row| {
            Ok(RecordRow {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
