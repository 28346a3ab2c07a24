//! Startup sample data.
//!
//! The stores themselves never seed anything; the process boundary calls
//! `initialize_sample_data` once at startup so a fresh deployment has
//! villages to look at.

use crate::model::{SensorReading, Village};
use crate::store::VillageStore;
use anyhow::Result;
use chrono::Utc;
use tracing::info;

/// Seeds the villages collection with sample records if it is empty.
///
/// Returns `true` if seeding happened, `false` if villages already existed.
pub fn initialize_sample_data(villages: &VillageStore) -> Result<bool> {
    if villages.count()? > 0 {
        return Ok(false);
    }

    for village in sample_villages() {
        villages.insert(&village)?;
    }

    info!("Sample village data initialized");
    Ok(true)
}

fn reading(day: &str, soil_moisture: f64, temperature: f64, humidity: f64, ph_level: f64, timestamp: &str) -> SensorReading {
    SensorReading {
        day: day.to_string(),
        soil_moisture,
        temperature,
        humidity,
        ph_level,
        timestamp: timestamp.to_string(),
    }
}

fn sample_villages() -> Vec<Village> {
    vec![
        Village {
            id: "mandya-kirangur".to_string(),
            name: "Kirangur".to_string(),
            district: "Mandya".to_string(),
            state: "Karnataka".to_string(),
            crop: "paddy".to_string(),
            coords: [12.522, 76.899],
            population: 1500,
            area_hectares: 250.0,
            soil_type: "clayey".to_string(),
            irrigation_type: "canal".to_string(),
            history: vec![
                reading("Day 1", 28.5, 32.1, 78.2, 6.8, "2024-01-01T10:00:00Z"),
                reading("Day 2", 25.2, 33.4, 76.1, 6.7, "2024-01-02T10:00:00Z"),
                reading("Day 3", 22.8, 34.2, 74.5, 6.6, "2024-01-03T10:00:00Z"),
                reading("Day 4", 20.1, 35.8, 71.2, 6.5, "2024-01-04T10:00:00Z"),
                reading("Day 5", 18.4, 36.5, 68.9, 6.4, "2024-01-05T10:00:00Z"),
            ],
            alerts: vec![
                "Low soil moisture detected".to_string(),
                "Temperature rising".to_string(),
            ],
            last_updated: Utc::now(),
        },
        Village {
            id: "thanjavur-kovil".to_string(),
            name: "Kovil".to_string(),
            district: "Thanjavur".to_string(),
            state: "Tamil Nadu".to_string(),
            crop: "sugarcane".to_string(),
            coords: [10.786, 79.138],
            population: 2200,
            area_hectares: 400.0,
            soil_type: "alluvial".to_string(),
            irrigation_type: "drip".to_string(),
            history: vec![
                reading("Day 1", 60.2, 29.8, 82.1, 7.2, "2024-01-01T10:00:00Z"),
                reading("Day 2", 58.5, 30.4, 80.8, 7.1, "2024-01-02T10:00:00Z"),
                reading("Day 3", 55.8, 31.2, 79.4, 7.0, "2024-01-03T10:00:00Z"),
                reading("Day 4", 53.2, 32.1, 77.9, 6.9, "2024-01-04T10:00:00Z"),
                reading("Day 5", 51.4, 32.8, 76.2, 6.8, "2024-01-05T10:00:00Z"),
            ],
            alerts: vec!["Optimal conditions".to_string()],
            last_updated: Utc::now(),
        },
        Village {
            id: "washim-manjari".to_string(),
            name: "Manjari".to_string(),
            district: "Washim".to_string(),
            state: "Maharashtra".to_string(),
            crop: "soybean".to_string(),
            coords: [20.125, 76.103],
            population: 800,
            area_hectares: 180.0,
            soil_type: "sandy loam".to_string(),
            irrigation_type: "rainfed".to_string(),
            history: vec![
                reading("Day 1", 15.2, 38.5, 45.2, 6.2, "2024-01-01T10:00:00Z"),
                reading("Day 2", 14.1, 39.2, 43.8, 6.1, "2024-01-02T10:00:00Z"),
                reading("Day 3", 13.5, 40.1, 41.5, 6.0, "2024-01-03T10:00:00Z"),
                reading("Day 4", 12.8, 41.2, 39.2, 5.9, "2024-01-04T10:00:00Z"),
                reading("Day 5", 11.9, 42.1, 36.8, 5.8, "2024-01-05T10:00:00Z"),
            ],
            alerts: vec![
                "CRITICAL: Drought conditions".to_string(),
                "Immediate irrigation required".to_string(),
            ],
            last_updated: Utc::now(),
        },
        Village {
            id: "payyanur-kerala".to_string(),
            name: "Payyanur".to_string(),
            district: "Kannur".to_string(),
            state: "Kerala".to_string(),
            crop: "coconut+paddy".to_string(),
            coords: [12.093, 75.198],
            population: 3200,
            area_hectares: 320.0,
            soil_type: "laterite".to_string(),
            irrigation_type: "mixed".to_string(),
            history: vec![
                reading("Day 1", 70.5, 28.2, 88.5, 6.5, "2024-01-01T10:00:00Z"),
                reading("Day 2", 68.8, 29.1, 87.2, 6.4, "2024-01-02T10:00:00Z"),
                reading("Day 3", 66.2, 29.8, 85.8, 6.3, "2024-01-03T10:00:00Z"),
                reading("Day 4", 65.1, 30.5, 84.1, 6.2, "2024-01-04T10:00:00Z"),
                reading("Day 5", 64.3, 31.2, 82.5, 6.1, "2024-01-05T10:00:00Z"),
            ],
            alerts: vec!["High humidity - monitor for fungal diseases".to_string()],
            last_updated: Utc::now(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    #[test]
    fn test_seed_empty_store() {
        let db = Database::open(":memory:").unwrap();
        let villages = db.villages();

        let seeded = initialize_sample_data(&villages).unwrap();
        assert!(seeded);
        assert_eq!(villages.count().unwrap(), 4);

        let kirangur = villages.get("mandya-kirangur").unwrap().unwrap();
        assert_eq!(kirangur.name, "Kirangur");
        assert_eq!(kirangur.history.len(), 5);
        assert_eq!(kirangur.alerts.len(), 2);
    }

    #[test]
    fn test_seed_skips_populated_store() {
        let db = Database::open(":memory:").unwrap();
        let villages = db.villages();

        initialize_sample_data(&villages).unwrap();
        let seeded_again = initialize_sample_data(&villages).unwrap();

        assert!(!seeded_again);
        assert_eq!(villages.count().unwrap(), 4);
    }

    #[test]
    fn test_seed_includes_a_critical_village() {
        let db = Database::open(":memory:").unwrap();
        let villages = db.villages();

        initialize_sample_data(&villages).unwrap();
        assert_eq!(villages.count_with_critical_alerts().unwrap(), 1);
    }
}
