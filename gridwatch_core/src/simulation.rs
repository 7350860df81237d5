//! The pure per-tick pipeline.
//!
//! One call produces everything a tick publishes, with no hidden state:
//! scheduling, snapshot swapping and presentation all live outside the core.

use crate::anomaly::{self, AnomalyStatus, ClassifierConfig};
use crate::entity::EntityId;
use crate::environment::EnvironmentModel;
use crate::population::Population;
use crate::readings::{self, Reading, ReadingConfig};
use rand::Rng;
use std::collections::HashMap;

/// Everything one tick produces.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub readings: HashMap<EntityId, Reading>,
    pub anomalies: HashMap<EntityId, AnomalyStatus>,
}

/// Runs one simulation tick: reading generation, then classification of the
/// fresh readings. Deterministic for a fixed RNG state.
pub fn step(
    population: &Population,
    tick: u64,
    env: &EnvironmentModel,
    reading_config: &ReadingConfig,
    classifier_config: &ClassifierConfig,
    rng: &mut impl Rng,
) -> TickOutput {
    let readings = readings::generate(population, tick, env, reading_config, rng);
    let anomalies = anomaly::classify(population, &readings, classifier_config);
    TickOutput {
        readings,
        anomalies,
    }
}
