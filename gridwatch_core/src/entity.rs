//! The unified entity roster type.
//!
//! One `Entity` covers both historical demo views (generation units and
//! registry-tracked parcels); view-specific fields ride in an optional
//! [`Extension`] payload so the simulation algorithms never fork.

use crate::geo::GeoPoint;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opaque entity identifier (e.g. `"LEADER-001"`, `"UNIT-014"`).
pub type EntityId = String;

/// A member of the simulated population, leader or unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,

    pub display_name: String,

    pub location: GeoPoint,

    /// Nameplate capacity in kW-peak. Never negative.
    pub capacity_kw: f64,

    /// Efficiency factor in [0, 1].
    pub efficiency: f64,

    pub is_leader: bool,

    /// Monotonic ledger sequence number, assigned at creation.
    pub sequence_number: u64,

    /// Deterministic 64-hex-char pseudo-hash, assigned at creation.
    pub chain_hash: String,

    /// Nearest leader at build time. Always `None` for leaders; stable for
    /// units until the population is rebuilt.
    pub nearest_leader_id: Option<EntityId>,

    /// Optional view-specific payload.
    pub extension: Option<Extension>,
}

impl Entity {
    /// Creates an entity. Negative capacity becomes 0 and efficiency is
    /// clamped to [0, 1]. Sequence number and chain hash are assigned by
    /// the builder.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        display_name: String,
        location: GeoPoint,
        capacity_kw: f64,
        efficiency: f64,
        is_leader: bool,
        sequence_number: u64,
        chain_hash: String,
    ) -> Self {
        Self {
            id,
            display_name,
            location,
            capacity_kw: capacity_kw.max(0.0),
            efficiency: efficiency.clamp(0.0, 1.0),
            is_leader,
            sequence_number,
            chain_hash,
            nearest_leader_id: None,
            extension: None,
        }
    }
}

/// View-specific entity payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Extension {
    /// Property-ledger fields from the land-registry view.
    Parcel(ParcelDetail),
}

/// Registry attributes of a parcel entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelDetail {
    pub soil: SoilClass,
    pub area_m2: f64,
    pub buildable_m2: f64,
    pub encumbrances: Vec<String>,
    /// Fields where the attested value disagrees with the recorded one.
    pub discrepancies: Vec<Discrepancy>,
}

/// The registry fields audited for attested-vs-recorded mismatches.
const AUDITED_FIELDS: [&str; 5] = ["area_m2", "buildable_m2", "soil", "holder", "boundary"];

impl ParcelDetail {
    /// Samples registry attributes for one parcel. Each audited field
    /// carries a mismatch with 20% probability, so a parcel shows zero to
    /// five discrepancies.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let soil = match rng.gen_range(0..4) {
            0 => SoilClass::Urban,
            1 => SoilClass::Rural,
            2 => SoilClass::Mixed,
            _ => SoilClass::Industrial,
        };
        let area_m2 = rng.gen_range(60.0..600.0);
        let buildable_m2 = area_m2 * rng.gen_range(0.5..2.5);

        let mut encumbrances = Vec::new();
        if rng.gen_bool(0.3) {
            encumbrances.push("bank mortgage".to_string());
        }
        if rng.gen_bool(0.15) {
            encumbrances.push("usufruct".to_string());
        }

        let discrepancies = AUDITED_FIELDS
            .iter()
            .filter(|_| rng.gen_bool(0.2))
            .map(|field| {
                let recorded: u32 = rng.gen_range(50..950);
                let skew: u32 = rng.gen_range(1..50);
                Discrepancy {
                    field: (*field).to_string(),
                    attested: (recorded + skew).to_string(),
                    recorded: recorded.to_string(),
                }
            })
            .collect();

        Self {
            soil,
            area_m2,
            buildable_m2,
            encumbrances,
            discrepancies,
        }
    }
}

/// Soil classification of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClass {
    Urban,
    Rural,
    Mixed,
    Industrial,
}

/// One attested-vs-recorded mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discrepancy {
    pub field: String,
    pub attested: String,
    pub recorded: String,
}
