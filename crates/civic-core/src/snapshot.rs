//! Whole-snapshot load and write-back against the keyed record store.

use civic_db::Database;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::Result;

/// Outcome of reading one keyed record.
pub(crate) enum Loaded<T> {
    Present(T),
    Absent,
    /// Stored but unreadable. Treated as absent by every caller.
    Corrupt,
}

pub(crate) fn load<T: DeserializeOwned>(db: &Database, key: &str) -> Loaded<T> {
    let raw = match db.get_record(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::Absent,
        Err(e) => {
            warn!("Failed to read '{}' record: {}", key, e);
            return Loaded::Corrupt;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Loaded::Present(value),
        Err(e) => {
            warn!("Discarding unparseable '{}' record: {}", key, e);
            Loaded::Corrupt
        }
    }
}

/// Serialize and store the complete value under `key`.
pub(crate) fn save<T: Serialize + ?Sized>(db: &Database, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).map_err(anyhow::Error::from)?;
    db.put_record(key, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_and_absent_are_distinguished() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(load::<Vec<u32>>(&db, "numbers"), Loaded::Absent));

        db.put_record("numbers", "[1, 2,").unwrap();
        assert!(matches!(load::<Vec<u32>>(&db, "numbers"), Loaded::Corrupt));

        save(&db, "numbers", &vec![1u32, 2]).unwrap();
        match load::<Vec<u32>>(&db, "numbers") {
            Loaded::Present(v) => assert_eq!(v, vec![1, 2]),
            _ => panic!("expected stored numbers"),
        }
    }
}
