//! Leader-relative anomaly classification.
//!
//! A pure function of the current tick's readings and the static roster: no
//! history is consulted, so a unit may flap between ticks. The expectation
//! is scaled from the nearest leader's *current* reading, which couples a
//! unit's status to the leader's noise draw; kept intentionally, it is how
//! this model has always behaved.

use crate::entity::{Entity, EntityId};
use crate::population::Population;
use crate::readings::Reading;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification result for one unit at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyStatus {
    pub entity_id: EntityId,

    pub is_anomalous: bool,

    /// Distance to the authoritative leader; absent when no leader is in
    /// range.
    pub distance_to_leader_km: Option<f64>,

    /// The authoritative leader; absent when no leader is in range.
    pub leader_id: Option<EntityId>,
}

/// Classifier thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Maximum distance at which a leader is authoritative for a unit.
    pub radius_km: f64,

    /// A unit is anomalous when its reading falls strictly below this
    /// fraction of the leader-derived expectation.
    pub low_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            radius_km: 100.0,
            low_threshold: 0.7,
        }
    }
}

/// Classifies every unit against its nearest leader.
///
/// The returned map is keyed by unit ids only; leaders are never anomalous
/// and carry no status. A unit whose nearest leader is beyond `radius_km`
/// (or has no usable reading or capacity) is out of range: not anomalous,
/// leader and distance absent. In range,
/// `expected = leader_reading * unit.capacity / leader.capacity` and the
/// unit is anomalous iff `reading < expected * low_threshold` - a reading
/// exactly at the threshold is NOT anomalous.
pub fn classify(
    population: &Population,
    readings: &HashMap<EntityId, Reading>,
    config: &ClassifierConfig,
) -> HashMap<EntityId, AnomalyStatus> {
    let threshold = config.low_threshold.clamp(0.0, 1.0);
    let leaders: Vec<&Entity> = population.leaders().collect();

    let mut statuses = HashMap::new();
    for unit in population.units() {
        let nearest = leaders
            .iter()
            .map(|leader| (*leader, leader.location.distance_km(&unit.location)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let status = match nearest {
            Some((leader, distance)) if distance <= config.radius_km => {
                authoritative_status(unit, leader, distance, readings, threshold)
            }
            _ => out_of_range(unit),
        };
        statuses.insert(unit.id.clone(), status);
    }
    statuses
}

fn authoritative_status(
    unit: &Entity,
    leader: &Entity,
    distance: f64,
    readings: &HashMap<EntityId, Reading>,
    threshold: f64,
) -> AnomalyStatus {
    // A leader with no reading this tick or a zero capacity cannot anchor
    // an expectation; treat the unit as out of range.
    let (unit_reading, leader_reading) = match (readings.get(&unit.id), readings.get(&leader.id)) {
        (Some(u), Some(l)) if leader.capacity_kw > 0.0 => (u.value, l.value),
        _ => return out_of_range(unit),
    };

    let expected = leader_reading * (unit.capacity_kw / leader.capacity_kw);
    AnomalyStatus {
        entity_id: unit.id.clone(),
        is_anomalous: unit_reading < expected * threshold,
        distance_to_leader_km: Some(distance),
        leader_id: Some(leader.id.clone()),
    }
}

fn out_of_range(unit: &Entity) -> AnomalyStatus {
    AnomalyStatus {
        entity_id: unit.id.clone(),
        is_anomalous: false,
        distance_to_leader_km: None,
        leader_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::population::Population;
    use proptest::prelude::*;

    fn entity(id: &str, lat: f64, lon: f64, capacity: f64, is_leader: bool) -> Entity {
        Entity::new(
            id.into(),
            id.into(),
            GeoPoint::new(lat, lon),
            capacity,
            0.95,
            is_leader,
            1000,
            "0".repeat(64),
        )
    }

    fn reading(id: &str, value: f64) -> (EntityId, Reading) {
        (
            id.to_string(),
            Reading {
                entity_id: id.to_string(),
                tick: 0,
                value,
            },
        )
    }

    /// One leader at Madrid, one unit ~28 km away.
    fn two_entity_population(leader_capacity: f64, unit_capacity: f64) -> Population {
        Population::new(vec![
            entity("LEADER-001", 40.4168, -3.7038, leader_capacity, true),
            entity("UNIT-002", 40.65, -3.60, unit_capacity, false),
        ])
    }

    #[test]
    fn test_threshold_is_strict_less_than() {
        let population = two_entity_population(400.0, 100.0);
        let config = ClassifierConfig::default();

        // expected = 400 * (100/400) = 100; threshold value = 70.
        let below: HashMap<_, _> =
            [reading("LEADER-001", 400.0), reading("UNIT-002", 69.9)].into();
        let statuses = classify(&population, &below, &config);
        assert!(statuses["UNIT-002"].is_anomalous);

        let at: HashMap<_, _> = [reading("LEADER-001", 400.0), reading("UNIT-002", 70.0)].into();
        let statuses = classify(&population, &at, &config);
        assert!(!statuses["UNIT-002"].is_anomalous);
    }

    #[test]
    fn test_in_range_status_names_the_leader() {
        let population = two_entity_population(400.0, 100.0);
        let readings: HashMap<_, _> =
            [reading("LEADER-001", 400.0), reading("UNIT-002", 95.0)].into();

        let statuses = classify(&population, &readings, &ClassifierConfig::default());
        let status = &statuses["UNIT-002"];
        assert_eq!(status.leader_id.as_deref(), Some("LEADER-001"));
        let d = status.distance_to_leader_km.unwrap();
        assert!((20.0..40.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_out_of_range_unit_is_never_anomalous() {
        // Unit in Vigo, leader in Madrid: ~470 km apart.
        let population = Population::new(vec![
            entity("LEADER-001", 40.4168, -3.7038, 400.0, true),
            entity("UNIT-002", 42.2406, -8.7207, 100.0, false),
        ]);
        let readings: HashMap<_, _> =
            [reading("LEADER-001", 400.0), reading("UNIT-002", 0.0)].into();

        let statuses = classify(&population, &readings, &ClassifierConfig::default());
        let status = &statuses["UNIT-002"];
        assert!(!status.is_anomalous);
        assert!(status.leader_id.is_none());
        assert!(status.distance_to_leader_km.is_none());
    }

    #[test]
    fn test_map_contains_units_only() {
        let population = two_entity_population(400.0, 100.0);
        let readings: HashMap<_, _> =
            [reading("LEADER-001", 400.0), reading("UNIT-002", 95.0)].into();

        let statuses = classify(&population, &readings, &ClassifierConfig::default());
        assert_eq!(statuses.len(), 1);
        assert!(!statuses.contains_key("LEADER-001"));
    }

    #[test]
    fn test_zero_capacity_leader_cannot_anchor() {
        let population = two_entity_population(0.0, 100.0);
        let readings: HashMap<_, _> =
            [reading("LEADER-001", 0.0), reading("UNIT-002", 0.0)].into();

        let statuses = classify(&population, &readings, &ClassifierConfig::default());
        assert!(!statuses["UNIT-002"].is_anomalous);
        assert!(statuses["UNIT-002"].leader_id.is_none());
    }

    #[test]
    fn test_missing_leader_reading_is_out_of_range() {
        let population = two_entity_population(400.0, 100.0);
        let readings: HashMap<_, _> = [reading("UNIT-002", 95.0)].into();

        let statuses = classify(&population, &readings, &ClassifierConfig::default());
        assert!(!statuses["UNIT-002"].is_anomalous);
        assert!(statuses["UNIT-002"].leader_id.is_none());
    }

    #[test]
    fn test_nearest_leader_wins() {
        let population = Population::new(vec![
            entity("LEADER-001", 40.4168, -3.7038, 400.0, true), // Madrid
            entity("LEADER-002", 39.8628, -4.0273, 400.0, true), // Toledo
            entity("UNIT-003", 39.90, -4.00, 100.0, false),      // near Toledo
        ]);
        let readings: HashMap<_, _> = [
            reading("LEADER-001", 400.0),
            reading("LEADER-002", 400.0),
            reading("UNIT-003", 95.0),
        ]
        .into();

        let statuses = classify(&population, &readings, &ClassifierConfig::default());
        assert_eq!(statuses["UNIT-003"].leader_id.as_deref(), Some("LEADER-002"));
    }

    proptest! {
        /// Classification is a pure function: identical inputs, identical maps.
        #[test]
        fn prop_classify_is_idempotent(
            unit_value in 0.0f64..500.0,
            leader_value in 0.0f64..500.0,
        ) {
            let population = two_entity_population(400.0, 100.0);
            let readings: HashMap<_, _> = [
                reading("LEADER-001", leader_value),
                reading("UNIT-002", unit_value),
            ]
            .into();
            let config = ClassifierConfig::default();

            let first = classify(&population, &readings, &config);
            let second = classify(&population, &readings, &config);
            prop_assert_eq!(first, second);
        }
    }
}
