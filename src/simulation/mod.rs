//! Simulation dispatcher.
//!
//! Maps an emergency scenario tag to a canned alert for a village: resolves
//! the village, synthesizes the message, persists the alert, and pushes the
//! message onto the village's denormalized alert list. The alert insert and
//! the village update run in one store transaction.

use crate::model::{Alert, Scenario};
use crate::store::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

/// Composite acknowledgment for a triggered simulation.
#[derive(Clone, Debug)]
pub struct TriggerOutcome {
    /// Human-readable summary of what was triggered
    pub message: String,
    /// The alert that was created
    pub alert: Alert,
    pub timestamp: DateTime<Utc>,
}

/// Dispatches simulation scenarios against the village and alert collections.
#[derive(Clone)]
pub struct Simulator {
    db: Database,
}

impl Simulator {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Triggers a scenario for a village.
    ///
    /// Unrecognized scenario tags still succeed with a generic message;
    /// severity is accepted as-is, unvalidated.
    ///
    /// # Returns
    /// * `Ok(Some(outcome))` - Alert created and village updated
    /// * `Ok(None)` - No village with that id
    /// * `Err` - If a store operation fails
    pub fn trigger(
        &self,
        scenario: &str,
        village_id: &str,
        severity: &str,
    ) -> Result<Option<TriggerOutcome>> {
        let Some(village) = self
            .db
            .villages()
            .get(village_id)
            .context("Failed to resolve village")?
        else {
            return Ok(None);
        };

        let scenario = Scenario::parse(scenario);
        let alert = Alert::new(
            village_id,
            scenario.as_str(),
            &scenario.message(&village),
            severity,
        );

        // Village confirmed above; false here means it vanished mid-flight,
        // which no exposed operation can cause
        if !self.db.record_simulation(&alert)? {
            return Ok(None);
        }

        info!(
            village_id = %village_id,
            scenario = %scenario.as_str(),
            severity = %severity,
            alert_id = %alert.id,
            "Simulation triggered"
        );

        Ok(Some(TriggerOutcome {
            message: format!(
                "Simulation '{}' triggered for village {}",
                scenario.as_str(),
                village_id
            ),
            alert,
            timestamp: Utc::now(),
        }))
    }
}
