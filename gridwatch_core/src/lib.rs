//! GridWatch simulation core.
//!
//! A deterministic, leader-relative anomaly simulation for a geographically
//! distributed fleet of generation units. A fixed roster of entities is built
//! once (regional "leader" sites plus units scattered around named
//! localities), then a discrete clock drives the model:
//!
//! - every tick, each entity produces one numeric reading under a shared
//!   environmental model (seasonal, latitudinal and diurnal factors plus
//!   stochastic noise and transient fault injection),
//! - every non-leader unit is compared against an expectation derived from
//!   its nearest leader's current reading and flagged anomalous when it
//!   falls materially short,
//! - every entity carries a deterministic pseudo-hash and monotonic
//!   sequence number assigned at creation, simulating ledger traceability.
//!
//! # Determinism
//!
//! All sources of randomness are injected (`&mut impl Rng`), so a fixed
//! ChaCha8 seed reproduces an identical population, identical readings and
//! identical anomaly maps. The per-tick pipeline is exposed as the pure
//! [`simulation::step`] function; scheduling and state publication live in
//! the `gridwatch_sim` crate.

pub mod anomaly;
pub mod entity;
pub mod environment;
pub mod error;
pub mod geo;
pub mod ledger;
pub mod population;
pub mod readings;
pub mod simulation;
pub mod sites;

pub use anomaly::{classify, AnomalyStatus, ClassifierConfig};
pub use entity::{Discrepancy, Entity, EntityId, Extension, ParcelDetail, SoilClass};
pub use environment::{EnvironmentModel, Forecast, SkyCondition};
pub use error::BuildError;
pub use geo::{AcceptAll, Bounds, BoundsValidator, GeoPoint, RegionValidator};
pub use ledger::{chain_hash, SequenceCounter, CHAIN_HASH_LEN};
pub use population::{build, Population, PopulationConfig};
pub use readings::{generate, Reading, ReadingConfig};
pub use simulation::{step, TickOutput};
pub use sites::NamedSite;
