//! The stateful simulation engine.

use gridwatch_core::{
    build, step, AcceptAll, AnomalyStatus, BuildError, ClassifierConfig, EntityId,
    EnvironmentModel, NamedSite, Population, PopulationConfig, Reading, ReadingConfig,
    RegionValidator,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// Recognized (re)configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    /// Master seed. The build and tick RNG streams are derived from it.
    pub seed: u64,

    pub units_requested: usize,
    pub leader_sites: Vec<NamedSite>,
    pub unit_sites: Vec<NamedSite>,

    /// Scheduler period.
    pub tick_interval: Duration,

    /// Authoritative-leader radius for classification.
    pub radius_km: f64,

    /// Anomaly threshold fraction.
    pub low_threshold: f64,

    /// Transient fault probability per entity per tick.
    pub fault_probability: f64,

    /// First ledger sequence number of a build.
    pub sequence_base: u64,

    /// Time component of the chain-hash seeds.
    pub time_seed: u64,

    pub environment: EnvironmentModel,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            seed: 42,
            units_requested: 90,
            leader_sites: gridwatch_core::sites::capital_sites(),
            unit_sites: gridwatch_core::sites::default_unit_sites(),
            tick_interval: Duration::from_secs(5),
            radius_km: 100.0,
            low_threshold: 0.7,
            fault_probability: 0.15,
            sequence_base: 1000,
            time_seed: 0,
            environment: EnvironmentModel::default(),
        }
    }
}

impl SimParams {
    fn population_config(&self) -> PopulationConfig {
        PopulationConfig {
            leader_sites: self.leader_sites.clone(),
            unit_sites: self.unit_sites.clone(),
            units_requested: self.units_requested,
            sequence_base: self.sequence_base,
            time_seed: self.time_seed,
            ..PopulationConfig::default()
        }
    }

    fn reading_config(&self) -> ReadingConfig {
        ReadingConfig {
            fault_probability: self.fault_probability,
            ..ReadingConfig::default()
        }
    }

    fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            radius_km: self.radius_km,
            low_threshold: self.low_threshold,
        }
    }

    /// Tick RNG stream seed, kept separate from the build stream so
    /// reconfiguring sites does not perturb reading noise.
    fn tick_seed(&self) -> u64 {
        self.seed.wrapping_mul(0x9e3779b97f4a7c15)
    }
}

/// Owns the current roster and the per-tick result maps.
///
/// The roster is immutable after a build, so accessors hand out `Arc`
/// clones. Readings and anomalies are recomputed each tick and the whole
/// map `Arc` is swapped in; concurrent readers keep whatever snapshot they
/// already hold.
pub struct SimulationEngine {
    params: RwLock<SimParams>,
    validator: Box<dyn RegionValidator + Send + Sync>,
    population: RwLock<Arc<Population>>,
    readings: RwLock<Arc<HashMap<EntityId, Reading>>>,
    anomalies: RwLock<Arc<HashMap<EntityId, AnomalyStatus>>>,
    rng: Mutex<ChaCha8Rng>,
    tick_count: AtomicU64,
}

impl SimulationEngine {
    /// Builds the initial population with no regional restrictions.
    pub fn new(params: SimParams) -> Result<Self, BuildError> {
        Self::with_validator(params, Box::new(AcceptAll))
    }

    /// Builds the initial population under the given region validator.
    pub fn with_validator(
        params: SimParams,
        validator: Box<dyn RegionValidator + Send + Sync>,
    ) -> Result<Self, BuildError> {
        let population = build_population(&params, validator.as_ref())?;
        info!(
            "population built: {} leaders, {} units (seed={})",
            population.leaders().count(),
            population.units().count(),
            params.seed
        );

        let rng = ChaCha8Rng::seed_from_u64(params.tick_seed());
        Ok(Self {
            params: RwLock::new(params),
            validator,
            population: RwLock::new(Arc::new(population)),
            readings: RwLock::new(Arc::new(HashMap::new())),
            anomalies: RwLock::new(Arc::new(HashMap::new())),
            rng: Mutex::new(rng),
            tick_count: AtomicU64::new(0),
        })
    }

    /// Runs one tick and atomically publishes the fresh maps.
    pub fn tick(&self) {
        let tick = self.tick_count.fetch_add(1, Ordering::SeqCst);
        let population = self.current_population();
        let params = self.params.read().unwrap().clone();

        let output = {
            let mut rng = self.rng.lock().unwrap();
            step(
                &population,
                tick,
                &params.environment,
                &params.reading_config(),
                &params.classifier_config(),
                &mut *rng,
            )
        };

        let anomalous = output.anomalies.values().filter(|s| s.is_anomalous).count();
        debug!(
            "tick {tick}: {} readings, {anomalous} anomalous units",
            output.readings.len()
        );

        *self.readings.write().unwrap() = Arc::new(output.readings);
        *self.anomalies.write().unwrap() = Arc::new(output.anomalies);
    }

    /// The immutable roster snapshot.
    pub fn current_population(&self) -> Arc<Population> {
        self.population.read().unwrap().clone()
    }

    /// Last published tick's readings.
    pub fn current_readings(&self) -> Arc<HashMap<EntityId, Reading>> {
        self.readings.read().unwrap().clone()
    }

    /// Last published tick's anomaly statuses (units only).
    pub fn current_anomalies(&self) -> Arc<HashMap<EntityId, AnomalyStatus>> {
        self.anomalies.read().unwrap().clone()
    }

    /// Ticks executed since the last (re)build.
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::SeqCst)
    }

    pub fn tick_interval(&self) -> Duration {
        self.params.read().unwrap().tick_interval
    }

    /// Rebuilds the population under `params`, resetting the sequence
    /// counter, tick counter and RNG streams. The old maps are cleared; the
    /// first new tick repopulates them. On error the engine keeps its
    /// previous state.
    pub fn reconfigure(&self, params: SimParams) -> Result<(), BuildError> {
        let population = build_population(&params, self.validator.as_ref())?;
        info!(
            "reconfigured: {} leaders, {} units (seed={})",
            population.leaders().count(),
            population.units().count(),
            params.seed
        );

        *self.rng.lock().unwrap() = ChaCha8Rng::seed_from_u64(params.tick_seed());
        *self.population.write().unwrap() = Arc::new(population);
        *self.readings.write().unwrap() = Arc::new(HashMap::new());
        *self.anomalies.write().unwrap() = Arc::new(HashMap::new());
        self.tick_count.store(0, Ordering::SeqCst);
        *self.params.write().unwrap() = params;
        Ok(())
    }
}

fn build_population(
    params: &SimParams,
    validator: &dyn RegionValidator,
) -> Result<Population, BuildError> {
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    build(&params.population_config(), validator, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> SimParams {
        SimParams {
            units_requested: 12,
            environment: EnvironmentModel::new(6, 13),
            ..Default::default()
        }
    }

    #[test]
    fn test_engine_publishes_after_tick() {
        let engine = SimulationEngine::new(small_params()).unwrap();
        assert!(engine.current_readings().is_empty());

        engine.tick();

        let population = engine.current_population();
        assert_eq!(engine.current_readings().len(), population.len());
        assert_eq!(
            engine.current_anomalies().len(),
            population.units().count()
        );
        assert_eq!(engine.tick_count(), 1);
    }

    #[test]
    fn test_snapshot_held_by_reader_survives_next_tick() {
        let engine = SimulationEngine::new(small_params()).unwrap();
        engine.tick();

        let held = engine.current_readings();
        engine.tick();

        // The older Arc is intact; the engine now serves a fresh map.
        assert_eq!(held.len(), engine.current_readings().len());
        assert!(!Arc::ptr_eq(&held, &engine.current_readings()));
    }

    #[test]
    fn test_same_seed_same_first_tick() {
        let a = SimulationEngine::new(small_params()).unwrap();
        let b = SimulationEngine::new(small_params()).unwrap();
        a.tick();
        b.tick();

        let ra = a.current_readings();
        let rb = b.current_readings();
        assert_eq!(ra.len(), rb.len());
        for (id, reading) in ra.iter() {
            assert_eq!(reading.value, rb[id].value);
        }
    }

    #[test]
    fn test_reconfigure_resets_counters_and_roster() {
        let engine = SimulationEngine::new(small_params()).unwrap();
        engine.tick();
        engine.tick();
        assert_eq!(engine.tick_count(), 2);

        let mut params = small_params();
        params.units_requested = 5;
        params.sequence_base = 5000;
        engine.reconfigure(params).unwrap();

        assert_eq!(engine.tick_count(), 0);
        assert!(engine.current_readings().is_empty());

        let population = engine.current_population();
        assert_eq!(population.units().count(), 5);
        assert_eq!(population.entities()[0].sequence_number, 5000);
    }

    #[test]
    fn test_failed_reconfigure_keeps_previous_roster() {
        let engine = SimulationEngine::new(small_params()).unwrap();
        let before = engine.current_population();

        let mut params = small_params();
        params.leader_sites = Vec::new();
        assert!(engine.reconfigure(params).is_err());

        assert!(Arc::ptr_eq(&before, &engine.current_population()));
    }
}
