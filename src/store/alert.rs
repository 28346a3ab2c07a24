//! Alert collection access.

use crate::model::Alert;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// Caller-visible cap on list results; excess rows are silently truncated.
const LIST_LIMIT: i64 = 100;

/// Repository for alert records.
#[derive(Clone)]
pub struct AlertStore {
    conn: Arc<Mutex<Connection>>,
}

impl AlertStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Constructs an active alert and persists it.
    ///
    /// Does not verify `village_id` resolves to a village; a dangling
    /// reference is accepted at write time.
    pub fn create(
        &self,
        village_id: &str,
        alert_type: &str,
        message: &str,
        severity: &str,
    ) -> Result<Alert> {
        let alert = Alert::new(village_id, alert_type, message, severity);
        let conn = self.conn.lock().unwrap();
        insert_alert(&conn, &alert).context("Failed to insert alert")?;
        Ok(alert)
    }

    /// Returns alerts newest-first, capped at 100.
    ///
    /// With `active_only`, restricts to alerts that have not been dismissed.
    pub fn list_all(&self, active_only: bool) -> Result<Vec<Alert>> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_ALERT} {filter} ORDER BY timestamp DESC, rowid DESC LIMIT {LIST_LIMIT}"
            ))
            .context("Failed to prepare alert list query")?;

        let alerts = stmt
            .query_map([], row_to_alert)
            .context("Failed to execute alert list query")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read alert rows")?;

        Ok(alerts)
    }

    /// Returns alerts for one village newest-first, capped at 100.
    pub fn list_by_village(&self, village_id: &str) -> Result<Vec<Alert>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "{SELECT_ALERT} WHERE village_id = ?1 \
                 ORDER BY timestamp DESC, rowid DESC LIMIT {LIST_LIMIT}"
            ))
            .context("Failed to prepare village alert query")?;

        let alerts = stmt
            .query_map(params![village_id], row_to_alert)
            .context("Failed to execute village alert query")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read alert rows")?;

        Ok(alerts)
    }

    /// Deactivates an alert. Idempotent: dismissing an already-dismissed
    /// alert succeeds silently.
    ///
    /// # Returns
    /// * `Ok(true)` - Alert exists (now inactive)
    /// * `Ok(false)` - No alert with that id
    pub fn dismiss(&self, alert_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let matched = conn
            .execute(
                "UPDATE alerts SET is_active = 0 WHERE id = ?1",
                params![alert_id],
            )
            .context("Failed to dismiss alert")?;
        Ok(matched > 0)
    }

    /// Number of alerts that have not been dismissed.
    pub fn count_active(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM alerts WHERE is_active = 1",
                [],
                |row| row.get(0),
            )
            .context("Failed to count active alerts")?;
        Ok(count as u64)
    }

    /// Number of active alerts with severity "critical".
    pub fn count_active_critical(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM alerts WHERE is_active = 1 AND severity = 'critical'",
                [],
                |row| row.get(0),
            )
            .context("Failed to count critical alerts")?;
        Ok(count as u64)
    }
}

/// Raw insert shared with the transactional simulation write.
pub(crate) fn insert_alert(conn: &Connection, alert: &Alert) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO alerts (id, village_id, alert_type, message, severity, timestamp, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            alert.id,
            alert.village_id,
            alert.alert_type,
            alert.message,
            alert.severity,
            alert.timestamp.to_rfc3339(),
            alert.is_active as i64,
        ],
    )
}

const SELECT_ALERT: &str =
    "SELECT id, village_id, alert_type, message, severity, timestamp, is_active FROM alerts";

fn row_to_alert(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alert> {
    let timestamp_str: String = row.get(5)?;
    let timestamp: DateTime<Utc> = timestamp_str
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    let is_active: i64 = row.get(6)?;

    Ok(Alert {
        id: row.get(0)?,
        village_id: row.get(1)?,
        alert_type: row.get(2)?,
        message: row.get(3)?,
        severity: row.get(4)?,
        timestamp,
        is_active: is_active != 0,
    })
}
