//! Village collection access.

use crate::model::{SensorReading, Village, VillageCreate};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// Caller-visible cap on list results; excess rows are silently truncated.
const LIST_LIMIT: i64 = 1000;

/// Repository for village records.
#[derive(Clone)]
pub struct VillageStore {
    conn: Arc<Mutex<Connection>>,
}

impl VillageStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Returns all villages in store order, capped at 1000.
    pub fn list(&self) -> Result<Vec<Village>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!("{SELECT_VILLAGE} LIMIT {LIST_LIMIT}"))
            .context("Failed to prepare village list query")?;

        let villages = stmt
            .query_map([], row_to_village)
            .context("Failed to execute village list query")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read village rows")?;

        Ok(villages)
    }

    /// Returns a single village by id, or `None` if not found.
    pub fn get(&self, id: &str) -> Result<Option<Village>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{SELECT_VILLAGE} WHERE id = ?1"),
            params![id],
            row_to_village,
        )
        .optional()
        .context("Failed to query village")
    }

    /// Constructs a village from the create request and persists it.
    pub fn create(&self, fields: VillageCreate) -> Result<Village> {
        let village = Village::new(fields);
        self.insert(&village)?;
        Ok(village)
    }

    /// Inserts a fully-formed village record. Used by `create` and by the
    /// startup seed, which carries fixed ids and pre-filled history.
    pub fn insert(&self, village: &Village) -> Result<()> {
        let history_json = serde_json::to_string(&village.history)
            .context("Failed to serialize sensor history")?;
        let alerts_json =
            serde_json::to_string(&village.alerts).context("Failed to serialize alert list")?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO villages
                (id, name, district, state, crop, lat, lon, population,
                 area_hectares, soil_type, irrigation_type, history_json,
                 alerts_json, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                village.id,
                village.name,
                village.district,
                village.state,
                village.crop,
                village.coords[0],
                village.coords[1],
                village.population as i64,
                village.area_hectares,
                village.soil_type,
                village.irrigation_type,
                history_json,
                alerts_json,
                village.last_updated.to_rfc3339(),
            ],
        )
        .context("Failed to insert village")?;
        Ok(())
    }

    /// Appends a summary line to the village's alert list and refreshes
    /// `last_updated`.
    ///
    /// # Returns
    /// * `Ok(true)` - Summary appended
    /// * `Ok(false)` - No village with that id
    pub fn append_alert_summary(&self, id: &str, text: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .context("Failed to begin append transaction")?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT alerts_json FROM villages WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read village alert list")?;

        let Some(alerts_json) = existing else {
            return Ok(false);
        };

        let mut summaries: Vec<String> =
            serde_json::from_str(&alerts_json).context("Failed to parse village alert list")?;
        summaries.push(text.to_string());
        let updated =
            serde_json::to_string(&summaries).context("Failed to serialize village alert list")?;

        tx.execute(
            "UPDATE villages SET alerts_json = ?1, last_updated = ?2 WHERE id = ?3",
            params![updated, Utc::now().to_rfc3339(), id],
        )
        .context("Failed to update village alert list")?;
        tx.commit().context("Failed to commit append")?;
        Ok(true)
    }

    /// Total number of villages.
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM villages", [], |row| row.get(0))
            .context("Failed to count villages")?;
        Ok(count as u64)
    }

    /// Number of villages whose alert list contains an entry matching the
    /// substring "critical", case-insensitively.
    pub fn count_with_critical_alerts(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM villages WHERE alerts_json LIKE '%critical%'",
                [],
                |row| row.get(0),
            )
            .context("Failed to count critical villages")?;
        Ok(count as u64)
    }
}

const SELECT_VILLAGE: &str = "SELECT id, name, district, state, crop, lat, lon, population, \
     area_hectares, soil_type, irrigation_type, history_json, alerts_json, \
     last_updated FROM villages";

fn row_to_village(row: &rusqlite::Row<'_>) -> rusqlite::Result<Village> {
    let history_json: String = row.get(11)?;
    let alerts_json: String = row.get(12)?;
    let last_updated_str: String = row.get(13)?;

    let history: Vec<SensorReading> = serde_json::from_str(&history_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;
    let alerts: Vec<String> = serde_json::from_str(&alerts_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?;
    let last_updated: DateTime<Utc> = last_updated_str
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(13, Type::Text, Box::new(e)))?;

    let population: i64 = row.get(7)?;

    Ok(Village {
        id: row.get(0)?,
        name: row.get(1)?,
        district: row.get(2)?,
        state: row.get(3)?,
        crop: row.get(4)?,
        coords: [row.get(5)?, row.get(6)?],
        population: population as u64,
        area_hectares: row.get(8)?,
        soil_type: row.get(9)?,
        irrigation_type: row.get(10)?,
        history,
        alerts,
        last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    fn in_memory_store() -> VillageStore {
        Database::open(":memory:")
            .expect("in-memory database failed")
            .villages()
    }

    fn sample_create(name: &str) -> VillageCreate {
        VillageCreate {
            name: name.to_string(),
            district: "Mandya".to_string(),
            state: "Karnataka".to_string(),
            crop: "paddy".to_string(),
            coords: [12.522, 76.899],
            population: 1500,
            area_hectares: 250.0,
            soil_type: "clayey".to_string(),
            irrigation_type: "canal".to_string(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = in_memory_store();

        let created = store.create(sample_create("Kirangur")).expect("create failed");
        let fetched = store
            .get(&created.id)
            .expect("get failed")
            .expect("village not found");

        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_nonexistent_returns_none() {
        let store = in_memory_store();
        let result = store.get("no-such-id").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_list_returns_all() {
        let store = in_memory_store();
        store.create(sample_create("One")).unwrap();
        store.create(sample_create("Two")).unwrap();
        store.create(sample_create("Three")).unwrap();

        let villages = store.list().unwrap();
        assert_eq!(villages.len(), 3);
        let names: Vec<&str> = villages.iter().map(|v| v.name.as_str()).collect();
        assert!(names.contains(&"One"));
        assert!(names.contains(&"Two"));
        assert!(names.contains(&"Three"));
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let store = in_memory_store();
        let a = store.create(sample_create("Same")).unwrap();
        let b = store.create(sample_create("Same")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_append_alert_summary() {
        let store = in_memory_store();
        let village = store.create(sample_create("Kirangur")).unwrap();

        let appended = store
            .append_alert_summary(&village.id, "Low soil moisture detected")
            .unwrap();
        assert!(appended);

        let updated = store.get(&village.id).unwrap().unwrap();
        assert_eq!(updated.alerts, vec!["Low soil moisture detected".to_string()]);
        assert!(updated.last_updated >= village.last_updated);
    }

    #[test]
    fn test_append_alert_summary_unknown_village() {
        let store = in_memory_store();
        let appended = store.append_alert_summary("ghost", "text").unwrap();
        assert!(!appended);
    }

    #[test]
    fn test_count() {
        let store = in_memory_store();
        assert_eq!(store.count().unwrap(), 0);

        store.create(sample_create("One")).unwrap();
        store.create(sample_create("Two")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_count_with_critical_alerts_is_case_insensitive() {
        let store = in_memory_store();

        let calm = store.create(sample_create("Calm")).unwrap();
        store
            .append_alert_summary(&calm.id, "Optimal conditions")
            .unwrap();

        let dry = store.create(sample_create("Dry")).unwrap();
        store
            .append_alert_summary(&dry.id, "CRITICAL: Drought conditions")
            .unwrap();

        let wet = store.create(sample_create("Wet")).unwrap();
        store
            .append_alert_summary(&wet.id, "critical flooding expected")
            .unwrap();

        assert_eq!(store.count_with_critical_alerts().unwrap(), 2);
    }

    #[test]
    fn test_history_round_trips_through_storage() {
        let store = in_memory_store();
        let mut village = Village::new(sample_create("Historied"));
        village.history.push(SensorReading {
            day: "Day 1".to_string(),
            soil_moisture: 28.5,
            temperature: 32.1,
            humidity: 78.2,
            ph_level: 6.8,
            timestamp: "2024-01-01T10:00:00Z".to_string(),
        });

        store.insert(&village).unwrap();

        let fetched = store.get(&village.id).unwrap().unwrap();
        assert_eq!(fetched.history.len(), 1);
        assert_eq!(fetched.history[0].day, "Day 1");
        assert_eq!(fetched.history[0].soil_moisture, 28.5);
    }
}
