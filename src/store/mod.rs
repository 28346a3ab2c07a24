//! SQLite-backed document stores for villages and alerts.
//!
//! Two collections live in one database file: `villages` and `alerts`.
//! Embedded sequences (sensor history, alert summaries) are stored as JSON
//! text columns; timestamps are ISO 8601 text.
//!
//! # Thread Safety
//! The connection is wrapped in a Mutex for safe concurrent access; SQLite
//! itself is thread-safe with serialized mode.

mod alert;
mod village;

pub use alert::AlertStore;
pub use village::VillageStore;

use crate::model::Alert;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Handle to the backing database.
///
/// Cheap to clone; all clones (and the stores derived from them) share one
/// connection, which lets multi-collection writes run in a single
/// transaction.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens (or creates) the database and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open database")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS villages (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                district        TEXT NOT NULL,
                state           TEXT NOT NULL,
                crop            TEXT NOT NULL,
                lat             REAL NOT NULL,
                lon             REAL NOT NULL,
                population      INTEGER NOT NULL,
                area_hectares   REAL NOT NULL,
                soil_type       TEXT NOT NULL,
                irrigation_type TEXT NOT NULL,
                history_json    TEXT NOT NULL,
                alerts_json     TEXT NOT NULL,
                last_updated    TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS alerts (
                id         TEXT PRIMARY KEY,
                village_id TEXT NOT NULL,
                alert_type TEXT NOT NULL,
                message    TEXT NOT NULL,
                severity   TEXT NOT NULL,
                timestamp  TEXT NOT NULL,
                is_active  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_alerts_village ON alerts(village_id);
            "#,
        )
        .context("Failed to create schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Store handle for the `villages` collection.
    pub fn villages(&self) -> VillageStore {
        VillageStore::new(Arc::clone(&self.conn))
    }

    /// Store handle for the `alerts` collection.
    pub fn alerts(&self) -> AlertStore {
        AlertStore::new(Arc::clone(&self.conn))
    }

    /// Persists a simulation alert and pushes its message onto the referenced
    /// village's alert list, refreshing the village's `last_updated`.
    ///
    /// Both writes run in one transaction, so the alert record and the
    /// village's denormalized summary list cannot diverge.
    ///
    /// # Returns
    /// * `Ok(true)` - Alert recorded, village updated
    /// * `Ok(false)` - No village with `alert.village_id`; nothing written
    /// * `Err` - If a database operation fails
    pub fn record_simulation(&self, alert: &Alert) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .context("Failed to begin simulation transaction")?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT alerts_json FROM villages WHERE id = ?1",
                params![alert.village_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read village alert list")?;

        let Some(alerts_json) = existing else {
            return Ok(false);
        };

        let mut summaries: Vec<String> =
            serde_json::from_str(&alerts_json).context("Failed to parse village alert list")?;
        summaries.push(alert.message.clone());
        let updated =
            serde_json::to_string(&summaries).context("Failed to serialize village alert list")?;

        alert::insert_alert(&tx, alert).context("Failed to insert alert")?;
        tx.execute(
            "UPDATE villages SET alerts_json = ?1, last_updated = ?2 WHERE id = ?3",
            params![updated, Utc::now().to_rfc3339(), alert.village_id],
        )
        .context("Failed to update village alert list")?;

        tx.commit().context("Failed to commit simulation write")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Village, VillageCreate};

    fn in_memory_db() -> Database {
        Database::open(":memory:").expect("in-memory database failed")
    }

    fn sample_village(name: &str) -> Village {
        Village::new(VillageCreate {
            name: name.to_string(),
            district: "Mandya".to_string(),
            state: "Karnataka".to_string(),
            crop: "paddy".to_string(),
            coords: [12.5, 76.9],
            population: 1500,
            area_hectares: 250.0,
            soil_type: "clayey".to_string(),
            irrigation_type: "canal".to_string(),
        })
    }

    #[test]
    fn test_reopen_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sarpanch.db");

        {
            let db = Database::open(&path).unwrap();
            db.villages().insert(&sample_village("Persisted")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.villages().count().unwrap(), 1);
        assert_eq!(db.villages().list().unwrap()[0].name, "Persisted");
    }

    #[test]
    fn test_record_simulation_writes_both_collections() {
        let db = in_memory_db();
        let villages = db.villages();
        let village = sample_village("Kirangur");
        villages.insert(&village).unwrap();

        let alert = Alert::new(&village.id, "drought", "DROUGHT ALERT: test", "high");
        let recorded = db.record_simulation(&alert).unwrap();
        assert!(recorded);

        let stored = db.alerts().list_by_village(&village.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, alert.id);

        let updated = villages.get(&village.id).unwrap().unwrap();
        assert_eq!(updated.alerts, vec!["DROUGHT ALERT: test".to_string()]);
        assert!(updated.last_updated >= village.last_updated);
    }

    #[test]
    fn test_record_simulation_unknown_village_writes_nothing() {
        let db = in_memory_db();

        let alert = Alert::new("no-such-village", "flood", "FLOOD WARNING: test", "medium");
        let recorded = db.record_simulation(&alert).unwrap();
        assert!(!recorded);

        // The alert must not exist either - the write is all-or-nothing
        let all = db.alerts().list_all(false).unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_record_simulation_appends_in_order() {
        let db = in_memory_db();
        let village = sample_village("Kovil");
        db.villages().insert(&village).unwrap();

        let first = Alert::new(&village.id, "drought", "first", "low");
        let second = Alert::new(&village.id, "flood", "second", "low");
        db.record_simulation(&first).unwrap();
        db.record_simulation(&second).unwrap();

        let updated = db.villages().get(&village.id).unwrap().unwrap();
        assert_eq!(updated.alerts, vec!["first".to_string(), "second".to_string()]);
    }
}
