use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;


/// A single sensor observation embedded in a village's history.
///
/// Readings are not independently addressable; they only exist inside
/// `Village::history`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Label for the observation window (e.g., "Day 3")
    pub day: String,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph_level: f64,
    /// ISO 8601 string; defaults to creation time if unset
    #[serde(default = "default_reading_timestamp")]
    pub timestamp: String,
}

fn default_reading_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// A monitored village with its sensor history and alert log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Village {
    /// Opaque unique identifier (UUIDv4 unless seeded with a fixed id)
    pub id: String,
    pub name: String,
    pub district: String,
    pub state: String,
    pub crop: String,
    /// [latitude, longitude]
    pub coords: [f64; 2],
    pub population: u64,
    pub area_hectares: f64,
    pub soil_type: String,
    pub irrigation_type: String,
    /// Append-only sensor history; no endpoint currently mutates it
    #[serde(default)]
    pub history: Vec<SensorReading>,
    /// Free-text alert summaries, grown by simulation triggers
    #[serde(default)]
    pub alerts: Vec<String>,
    /// Refreshed whenever `alerts` changes
    pub last_updated: DateTime<Utc>,
}

/// Request body for creating a village.
///
/// Only `name`, `district`, `state`, `crop`, and `coords` are required;
/// the rest fall back to conventional defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct VillageCreate {
    pub name: String,
    pub district: String,
    pub state: String,
    pub crop: String,
    pub coords: [f64; 2],
    #[serde(default = "default_population")]
    pub population: u64,
    #[serde(default = "default_area_hectares")]
    pub area_hectares: f64,
    #[serde(default = "default_soil_type")]
    pub soil_type: String,
    #[serde(default = "default_irrigation_type")]
    pub irrigation_type: String,
}

fn default_population() -> u64 {
    1000
}

fn default_area_hectares() -> f64 {
    100.0
}

fn default_soil_type() -> String {
    "loam".to_string()
}

fn default_irrigation_type() -> String {
    "canal".to_string()
}

impl Village {
    /// Builds a new village from a create request: fresh UUIDv4 id,
    /// empty history and alerts, `last_updated` set to now.
    pub fn new(fields: VillageCreate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            district: fields.district,
            state: fields.state,
            crop: fields.crop,
            coords: fields.coords,
            population: fields.population,
            area_hectares: fields.area_hectares,
            soil_type: fields.soil_type,
            irrigation_type: fields.irrigation_type,
            history: Vec::new(),
            alerts: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

/// A time-stamped notification tied to a village.
///
/// `village_id` is a plain reference with no enforced integrity; a dangling
/// reference is possible and not treated as an error at write time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub village_id: String,
    /// Open vocabulary; "drought", "flood", "pest", "disease" are recognized
    pub alert_type: String,
    pub message: String,
    /// Open vocabulary; "low", "medium", "high", "critical" by convention
    pub severity: String,
    pub timestamp: DateTime<Utc>,
    /// True at creation; set to false exactly once via dismiss
    pub is_active: bool,
}

impl Alert {
    /// Builds a new active alert with a fresh UUIDv4 id and current timestamp.
    pub fn new(village_id: &str, alert_type: &str, message: &str, severity: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            village_id: village_id.to_string(),
            alert_type: alert_type.to_string(),
            message: message.to_string(),
            severity: severity.to_string(),
            timestamp: Utc::now(),
            is_active: true,
        }
    }
}

/// Recognized simulation scenarios, with an explicit fallback arm.
///
/// Unrecognized scenario tags are accepted and carried through as
/// `Other` — the permissive fallback is deliberate policy, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Scenario {
    Drought,
    Flood,
    Pest,
    Disease,
    Other(String),
}

impl Scenario {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "drought" => Scenario::Drought,
            "flood" => Scenario::Flood,
            "pest" => Scenario::Pest,
            "disease" => Scenario::Disease,
            other => Scenario::Other(other.to_string()),
        }
    }

    /// The raw tag, used as the created alert's `alert_type`.
    pub fn as_str(&self) -> &str {
        match self {
            Scenario::Drought => "drought",
            Scenario::Flood => "flood",
            Scenario::Pest => "pest",
            Scenario::Disease => "disease",
            Scenario::Other(tag) => tag,
        }
    }

    /// Canned alert message for this scenario, addressed to a village.
    pub fn message(&self, village: &Village) -> String {
        match self {
            Scenario::Drought => format!(
                "DROUGHT ALERT: Critical water shortage detected in {}. Immediate irrigation required.",
                village.name
            ),
            Scenario::Flood => format!(
                "FLOOD WARNING: Heavy rainfall predicted for {}. Prepare drainage systems.",
                village.name
            ),
            Scenario::Pest => format!(
                "PEST ALERT: Pest infestation detected in {} {} fields.",
                village.name, village.crop
            ),
            Scenario::Disease => format!(
                "DISEASE WARNING: Crop disease outbreak in {}. Contact agricultural officer.",
                village.name
            ),
            Scenario::Other(_) => format!("Alert triggered for {}", village.name),
        }
    }
}
