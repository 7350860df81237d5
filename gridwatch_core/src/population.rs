//! Entity population builder.
//!
//! Runs once per (re)configuration: places one leader per valid leader site,
//! distributes the requested units as evenly as possible across valid unit
//! sites, and assigns every entity its ledger sequence number and chain hash
//! at creation. The returned [`Population`] is an immutable snapshot; the
//! builder keeps no state.

use crate::entity::{Entity, Extension, ParcelDetail};
use crate::error::BuildError;
use crate::geo::RegionValidator;
use crate::ledger::{chain_hash, SequenceCounter};
use crate::sites::{self, NamedSite};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::warn;

const LEADER_ID_PREFIX: &str = "LEADER";
const UNIT_ID_PREFIX: &str = "UNIT";

/// Parameters for one population build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub leader_sites: Vec<NamedSite>,
    pub unit_sites: Vec<NamedSite>,
    pub units_requested: usize,

    /// First ledger sequence number handed out.
    pub sequence_base: u64,
    /// Time component of every chain-hash seed for this build.
    pub time_seed: u64,

    /// Capacity bands in kW-peak, sampled uniformly per entity.
    pub leader_capacity_kw: (f64, f64),
    pub unit_capacity_kw: (f64, f64),

    /// Efficiency bands; leaders run near-maximal as the calibration anchor.
    pub leader_efficiency: (f64, f64),
    pub unit_efficiency: (f64, f64),

    /// Units land this many km from their site, at a uniform random bearing.
    pub scatter_km: (f64, f64),
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            leader_sites: sites::capital_sites(),
            unit_sites: sites::default_unit_sites(),
            units_requested: 90,
            sequence_base: 1000,
            time_seed: 0,
            leader_capacity_kw: (300.0, 500.0),
            unit_capacity_kw: (50.0, 500.0),
            leader_efficiency: (0.90, 1.00),
            unit_efficiency: (0.75, 0.95),
            scatter_km: (50.0, 150.0),
        }
    }
}

/// Immutable roster snapshot. Safe to share read-only across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    entities: Vec<Entity>,
}

impl Population {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn leaders(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.is_leader)
    }

    pub fn units(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| !e.is_leader)
    }

    /// Attaches freshly sampled registry parcel details to every unit,
    /// producing the property-ledger flavored roster. Leaders stay bare.
    pub fn with_parcel_extensions(mut self, rng: &mut impl Rng) -> Self {
        for entity in self.entities.iter_mut().filter(|e| !e.is_leader) {
            entity.extension = Some(Extension::Parcel(ParcelDetail::generate(rng)));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Builds a population snapshot.
///
/// Sites rejected by `validator` are skipped with a warning; the build only
/// fails (`InsufficientSites`) when no valid leader site or no valid unit
/// site remains. Creation order is leaders first (site order), then units in
/// site-iteration order, with the remainder of an uneven split going to the
/// first sites.
pub fn build(
    config: &PopulationConfig,
    validator: &dyn RegionValidator,
    rng: &mut impl Rng,
) -> Result<Population, BuildError> {
    let leader_sites = retain_valid(&config.leader_sites, validator);
    let unit_sites = retain_valid(&config.unit_sites, validator);
    if leader_sites.is_empty() || unit_sites.is_empty() {
        return Err(BuildError::InsufficientSites);
    }

    let mut sequence = SequenceCounter::new(config.sequence_base);
    let mut index = 0usize;

    let mut leaders = Vec::with_capacity(leader_sites.len());
    for site in &leader_sites {
        index += 1;
        let seq = sequence.advance(rng);
        let display_name = format!("Leader {}", site.name);
        let hash = chain_hash(&display_name, seq, config.time_seed);
        leaders.push(Entity::new(
            format!("{LEADER_ID_PREFIX}-{index:03}"),
            display_name,
            site.location,
            sample_band(rng, config.leader_capacity_kw),
            sample_band(rng, config.leader_efficiency),
            true,
            seq,
            hash,
        ));
    }

    let per_site = config.units_requested / unit_sites.len();
    let remainder = config.units_requested % unit_sites.len();

    let mut units = Vec::with_capacity(config.units_requested);
    for (site_idx, site) in unit_sites.iter().enumerate() {
        let count = per_site + usize::from(site_idx < remainder);
        for n in 0..count {
            index += 1;
            let bearing = rng.gen_range(0.0..TAU);
            let distance = sample_band(rng, config.scatter_km);
            let location = site.location.offset_km(bearing, distance);

            let seq = sequence.advance(rng);
            let display_name = format!("{} {}", site.name, n + 1);
            let hash = chain_hash(&display_name, seq, config.time_seed);

            let mut unit = Entity::new(
                format!("{UNIT_ID_PREFIX}-{index:03}"),
                display_name,
                location,
                sample_band(rng, config.unit_capacity_kw),
                sample_band(rng, config.unit_efficiency),
                false,
                seq,
                hash,
            );
            unit.nearest_leader_id = nearest_leader(&leaders, &unit).map(|l| l.id.clone());
            units.push(unit);
        }
    }

    let mut entities = leaders;
    entities.append(&mut units);
    Ok(Population::new(entities))
}

fn retain_valid(sites: &[NamedSite], validator: &dyn RegionValidator) -> Vec<NamedSite> {
    sites
        .iter()
        .filter(|site| {
            let valid = validator.contains(site.location);
            if !valid {
                warn!(
                    "{}",
                    BuildError::InvalidSite {
                        name: site.name.clone(),
                        lat: site.location.lat,
                        lon: site.location.lon,
                    }
                );
            }
            valid
        })
        .cloned()
        .collect()
}

fn nearest_leader<'a>(leaders: &'a [Entity], unit: &Entity) -> Option<&'a Entity> {
    leaders.iter().min_by(|a, b| {
        let da = a.location.distance_km(&unit.location);
        let db = b.location.distance_km(&unit.location);
        da.total_cmp(&db)
    })
}

fn sample_band(rng: &mut impl Rng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}
