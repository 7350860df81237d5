//! Built-in site catalogs for the demo deployment (Spanish cities).

use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// A named location a leader or unit group can be anchored to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedSite {
    pub name: String,
    pub location: GeoPoint,
}

impl NamedSite {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            location: GeoPoint::new(lat, lon),
        }
    }
}

/// The ten provincial capitals hosting leader entities.
pub fn capital_sites() -> Vec<NamedSite> {
    vec![
        NamedSite::new("Madrid", 40.4168, -3.7038),
        NamedSite::new("Barcelona", 41.3851, 2.1734),
        NamedSite::new("Valencia", 39.4699, -0.3763),
        NamedSite::new("Sevilla", 37.3891, -5.9845),
        NamedSite::new("Bilbao", 43.2627, -2.9253),
        NamedSite::new("Málaga", 36.7213, -4.4214),
        NamedSite::new("Zaragoza", 41.6488, -0.8891),
        NamedSite::new("Murcia", 37.9922, -1.1307),
        NamedSite::new("Valladolid", 41.6523, -4.7245),
        NamedSite::new("Córdoba", 37.8882, -4.7794),
    ]
}

/// Secondary cities units are scattered around.
pub fn locality_sites() -> Vec<NamedSite> {
    vec![
        NamedSite::new("Alicante", 38.3452, -0.4810),
        NamedSite::new("Granada", 37.1773, -3.5986),
        NamedSite::new("Vigo", 42.2406, -8.7207),
        NamedSite::new("Gijón", 43.5322, -5.6611),
        NamedSite::new("Palma", 39.5696, 2.6502),
        NamedSite::new("Santander", 43.4623, -3.8099),
        NamedSite::new("Toledo", 39.8628, -4.0273),
        NamedSite::new("Salamanca", 40.9701, -5.6635),
        NamedSite::new("León", 42.5987, -5.5671),
        NamedSite::new("Badajoz", 38.8794, -6.9707),
    ]
}

/// Default unit distribution targets: capitals plus secondary cities.
pub fn default_unit_sites() -> Vec<NamedSite> {
    let mut sites = capital_sites();
    sites.extend(locality_sites());
    sites
}
