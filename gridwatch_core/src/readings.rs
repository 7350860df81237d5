//! Per-tick reading generation.
//!
//! Readings are ephemeral: one per entity per tick, replaced wholesale on
//! the next tick. Generation never fails; bad parameters are clamped so the
//! simulation keeps running.

use crate::entity::EntityId;
use crate::environment::EnvironmentModel;
use crate::population::Population;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entity's output for one tick, in kWh. Never negative, never NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub entity_id: EntityId,
    pub tick: u64,
    pub value: f64,
}

/// Noise and fault parameters for reading generation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReadingConfig {
    /// Multiplicative noise band for leaders. Narrower and higher than the
    /// unit band: leaders anchor the classifier's expectations.
    pub leader_noise: (f64, f64),

    /// Multiplicative noise band for units.
    pub unit_noise: (f64, f64),

    /// Per-entity per-tick probability of a transient fault.
    pub fault_probability: f64,

    /// Output multiplier applied when a fault fires.
    pub degradation: f64,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            leader_noise: (0.9, 1.1),
            unit_noise: (0.8, 1.2),
            fault_probability: 0.15,
            degradation: 0.7,
        }
    }
}

/// Generates one reading per entity for `tick`.
///
/// `raw = capacity * efficiency * intensity(tick, lat) * noise`, degraded
/// with the configured probability. Entities are visited in roster order, so
/// a fixed RNG seed reproduces the identical map.
pub fn generate(
    population: &Population,
    tick: u64,
    env: &EnvironmentModel,
    config: &ReadingConfig,
    rng: &mut impl Rng,
) -> HashMap<EntityId, Reading> {
    // clamp propagates NaN, and gen_bool panics on it.
    let fault_probability = finite_or(config.fault_probability, 0.0).clamp(0.0, 1.0);
    let degradation = finite_or(config.degradation, 1.0).clamp(0.0, 1.0);

    let mut readings = HashMap::with_capacity(population.len());
    for entity in population.entities() {
        let band = if entity.is_leader {
            config.leader_noise
        } else {
            config.unit_noise
        };
        let noise = sample_band(rng, band);
        let intensity = env.intensity(tick, entity.location.lat);

        let mut value = entity.capacity_kw * entity.efficiency * intensity * noise;
        if rng.gen_bool(fault_probability) {
            value *= degradation;
        }
        if !value.is_finite() {
            value = 0.0;
        }

        readings.insert(
            entity.id.clone(),
            Reading {
                entity_id: entity.id.clone(),
                tick,
                value: value.max(0.0),
            },
        );
    }
    readings
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn sample_band(rng: &mut impl Rng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
