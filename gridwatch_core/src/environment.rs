//! Deterministic environmental model.
//!
//! Maps (tick, latitude) to an irradiance intensity factor in [0, 1], plus
//! derived temperature and sky-condition estimates. The intensity function
//! is pure and total, so fixed tick/latitude pairs make exact unit tests.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// First hour of the productive window (inclusive).
pub const WINDOW_START_HOUR: u32 = 6;
/// Last hour of the productive window (inclusive).
pub const WINDOW_END_HOUR: u32 = 20;

/// Seasonal factor, peaking mid-year. `month` is zero-based (0 = January).
pub fn seasonal_factor(month: u32) -> f64 {
    0.7 + 0.3 * ((month as f64 - 6.0) * PI / 6.0).cos()
}

/// Latitudinal factor, maximal at 40 degrees and falling off with
/// |lat - 40| / 50, clamped to [0, 1].
pub fn latitudinal_factor(lat: f64) -> f64 {
    (1.0 - (lat - 40.0).abs() / 50.0).clamp(0.0, 1.0)
}

/// Diurnal factor: zero at the window edges, 1 at hour 13.
pub fn diurnal_factor(hour: u32) -> f64 {
    let normalized = (hour as f64 - WINDOW_START_HOUR as f64) / 14.0;
    (normalized * PI).sin()
}

/// The simulation's environmental clock and intensity model.
///
/// A tick advances the simulated clock by `hours_per_tick` hours; the month
/// is fixed for a run. Defaults put the clock at midnight on a July day so
/// hour-of-day equals `tick % 24` and the seasonal factor is at its peak.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvironmentModel {
    /// Zero-based month (0 = January). Stored modulo 12.
    pub month: u32,

    /// Hour of day at tick 0.
    pub start_hour: u32,

    /// Simulated hours elapsed per tick. Zero freezes the clock.
    pub hours_per_tick: u32,
}

impl Default for EnvironmentModel {
    fn default() -> Self {
        Self {
            month: 6,
            start_hour: 0,
            hours_per_tick: 1,
        }
    }
}

impl EnvironmentModel {
    pub fn new(month: u32, start_hour: u32) -> Self {
        Self {
            month: month % 12,
            start_hour: start_hour % 24,
            ..Self::default()
        }
    }

    /// Simulated hour of day at `tick`.
    pub fn hour_of_day(&self, tick: u64) -> u32 {
        ((self.start_hour as u64 + tick * self.hours_per_tick as u64) % 24) as u32
    }

    /// Intensity factor in [0, 1] at `tick` for the given latitude.
    ///
    /// Exactly 0 outside the [6, 20] hour window; otherwise the product of
    /// the seasonal, latitudinal and diurnal factors.
    pub fn intensity(&self, tick: u64, lat: f64) -> f64 {
        Self::intensity_at(self.hour_of_day(tick), self.month, lat)
    }

    /// Intensity for an explicit hour/month pair.
    pub fn intensity_at(hour: u32, month: u32, lat: f64) -> f64 {
        if !(WINDOW_START_HOUR..=WINDOW_END_HOUR).contains(&hour) {
            return 0.0;
        }
        seasonal_factor(month) * latitudinal_factor(lat) * diurnal_factor(hour)
    }

    /// Estimated air temperature in degrees Celsius, rounded.
    pub fn temperature_c(&self, tick: u64, lat: f64) -> f64 {
        let hour = self.hour_of_day(tick);
        let base = 20.0 - (lat - 40.0) * 0.5;
        let seasonal = 10.0 * ((self.month as f64 - 6.0) * PI / 6.0).cos();
        let daily = 5.0 * (((hour as f64 - 6.0) / 14.0) * PI).sin();
        (base + seasonal + daily).round()
    }

    /// Regional sky forecast with cloud-adjusted intensity.
    ///
    /// Northern latitudes (> 42) run cloudier, southern ones (< 38) clearer;
    /// cloud cover scales the base intensity by the historical multipliers.
    pub fn forecast(&self, tick: u64, lat: f64, rng: &mut impl Rng) -> Forecast {
        let temperature_c = self.temperature_c(tick, lat);
        let hour = self.hour_of_day(tick);

        if !(WINDOW_START_HOUR..=WINDOW_END_HOUR).contains(&hour) {
            return Forecast {
                condition: SkyCondition::Night,
                cloud_cover: 0,
                intensity: 0.0,
                temperature_c,
            };
        }

        let base = self.intensity(tick, lat);
        let (condition, cloud_cover, intensity) = if lat > 42.0 {
            let cover: f64 = 50.0 + rng.gen_range(0.0..30.0);
            if cover > 70.0 {
                (SkyCondition::Showers, cover, base * 0.5)
            } else {
                (SkyCondition::PartlyCloudy, cover, base * 0.7)
            }
        } else if lat < 38.0 {
            let cover: f64 = 10.0 + rng.gen_range(0.0..20.0);
            if cover < 20.0 {
                (SkyCondition::Clear, cover, base * 1.1)
            } else {
                (SkyCondition::PartlyCloudy, cover, base)
            }
        } else {
            (SkyCondition::PartlyCloudy, 30.0, base)
        };

        Forecast {
            condition,
            cloud_cover: cloud_cover.round() as u8,
            intensity: intensity.clamp(0.0, 1.0),
            temperature_c,
        }
    }
}

/// Coarse sky condition classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyCondition {
    Night,
    Clear,
    PartlyCloudy,
    Showers,
}

/// A point-in-time estimate for one location.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Forecast {
    pub condition: SkyCondition,
    pub cloud_cover: u8,
    pub intensity: f64,
    pub temperature_c: f64,
}
