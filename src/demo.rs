//! Synthetic demonstration dataset.
//!
//! Produces hourly readings with a bell-shaped PV curve peaking at 13:00, a
//! bimodal household load with morning and evening peaks, and a time-of-use
//! tariff with an evening surcharge and an overnight discount. A small
//! uniform jitter is drawn from a seeded RNG so a seed always reproduces the
//! same dataset.

use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::audit::kpi::{PROFILE_DECIMALS, round_to};
use crate::reading::Reading;

/// Length of the default demo dataset (two days, hourly).
pub const DEMO_HOURS: usize = 48;

/// PV peak (kWh per hour) of the clear-sky curve.
const PV_PEAK_KWH: f64 = 3.0;
const PV_PEAK_HOUR: f64 = 13.0;
const PV_SPREAD_HOURS: f64 = 3.5;
const PV_JITTER: f64 = 0.1;

const LOAD_FLOOR_KWH: f64 = 0.3;
const LOAD_JITTER: f64 = 0.1;

const PRICE_BASE: f64 = 0.14;
const PRICE_EVENING_SURCHARGE: f64 = 0.08;
const PRICE_NIGHT_DISCOUNT: f64 = 0.03;
const PRICE_JITTER: f64 = 0.005;

/// Noise-free PV generation for an hour of day (kWh).
pub fn solar_shape(hour: u32) -> f64 {
    let d = f64::from(hour) - PV_PEAK_HOUR;
    PV_PEAK_KWH * (-(d * d) / (2.0 * PV_SPREAD_HOURS * PV_SPREAD_HOURS)).exp()
}

/// Noise-free household load for an hour of day (kWh).
///
/// A slow sinusoidal base plus Gaussian bumps around 09:00 and 20:00.
pub fn load_shape(hour: u32) -> f64 {
    let h = f64::from(hour);
    let base = 0.6 + 0.15 * (h / 24.0 * 2.0 * std::f64::consts::PI).sin();
    let morning = 0.8 * (-((h - 9.0).powi(2)) / (2.0 * 2.0)).exp();
    let evening = 1.2 * (-((h - 20.0).powi(2)) / (2.0 * 2.5)).exp();
    base + morning + evening
}

/// Noise-free time-of-use tariff for an hour of day (EUR/kWh).
pub fn tariff(hour: u32) -> f64 {
    let mut price = PRICE_BASE;
    if (19..=23).contains(&hour) {
        price += PRICE_EVENING_SURCHARGE;
    }
    if (2..=5).contains(&hour) {
        price -= PRICE_NIGHT_DISCOUNT;
    }
    price
}

/// Generates `hours` hourly readings starting at midnight of `start`.
///
/// # Arguments
///
/// * `start` - First day of the dataset (readings start at 00:00)
/// * `hours` - Number of hourly readings
/// * `seed` - Random seed for the jitter
pub fn synthetic_readings(start: NaiveDate, hours: usize, seed: u64) -> Vec<Reading> {
    let mut rng = StdRng::seed_from_u64(seed);
    let Some(midnight) = start.and_hms_opt(0, 0, 0) else {
        return Vec::new();
    };

    (0..hours)
        .map(|i| {
            let timestamp = midnight + Duration::hours(i as i64);
            let hour = (i % 24) as u32;

            let pv = (solar_shape(hour) + rng.random_range(-PV_JITTER..PV_JITTER)).max(0.0);
            let load =
                (load_shape(hour) + rng.random_range(-LOAD_JITTER..LOAD_JITTER)).max(LOAD_FLOOR_KWH);
            let price = tariff(hour) + rng.random_range(-PRICE_JITTER..PRICE_JITTER);

            Reading::new(timestamp, round_to(load, PROFILE_DECIMALS))
                .with_pv(round_to(pv, PROFILE_DECIMALS))
                .with_price(round_to(price, PROFILE_DECIMALS))
        })
        .collect()
}
