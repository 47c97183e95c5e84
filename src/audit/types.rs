//! Rollup types shared by the aggregator, KPI calculator, and report builder.

use serde::Serialize;

/// Number of hour-of-day buckets in an hourly profile.
pub const HOURS_PER_DAY: usize = 24;

/// Energy totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRollup {
    /// ISO date key, e.g. `"2024-03-02"`.
    pub day: String,
    /// Summed load (kWh).
    pub load: f64,
    /// Summed PV generation (kWh), absent values read as zero.
    pub pv: f64,
    /// Summed import cost (EUR) over readings that carry a price.
    pub cost: f64,
    /// Number of readings folded into this day.
    pub pts: usize,
}

impl DailyRollup {
    pub(crate) fn empty(day: String) -> Self {
        Self {
            day,
            load: 0.0,
            pv: 0.0,
            cost: 0.0,
            pts: 0,
        }
    }
}

/// Mean energy for one hour of day across all days in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyBucket {
    /// Hour of day (0-23).
    pub hour: u32,
    /// Mean load (kWh), 0 when no reading fell in this hour.
    pub load: f64,
    /// Mean PV generation (kWh), 0 when no reading fell in this hour.
    pub pv: f64,
}

/// Unrounded aggregation outputs for one reading sequence.
///
/// Produced by [`super::aggregate::aggregate`]. Only the hourly profile is
/// rounded here (3 decimals); totals are rounded by the KPI calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Number of readings aggregated.
    pub count: usize,
    /// Total load (kWh).
    pub energy_kwh: f64,
    /// Total PV generation (kWh).
    pub solar_kwh: f64,
    /// Total grid import (kWh).
    pub import_kwh: f64,
    /// Total grid export (kWh).
    pub export_kwh: f64,
    /// Total import cost (EUR).
    pub cost_eur: f64,
    /// Mean load over readings between 02:00 and 05:59.
    pub base_load_kw: f64,
    /// Highest single-reading load.
    pub peak_kw: f64,
    /// PV energy consumed on site (kWh).
    pub pv_used: f64,
    /// Hour-of-day profile; always [`HOURS_PER_DAY`] entries in hour order.
    pub hourly_profile: Vec<HourlyBucket>,
    /// Per-day totals in ascending date order.
    pub daily: Vec<DailyRollup>,
}
