//! Error types for population construction.

use thiserror::Error;

/// Errors surfaced while building a population.
///
/// `InvalidSite` is a per-site degradation: the builder logs a warning and
/// skips the site. `InsufficientSites` is fatal; no partial population is
/// returned.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A configured site failed the region validity check.
    #[error("site {name} at ({lat:.4}, {lon:.4}) failed region validation")]
    InvalidSite { name: String, lat: f64, lon: f64 },

    /// No valid leader or unit sites remain after validation.
    #[error("no valid sites remain after region validation")]
    InsufficientSites,
}
