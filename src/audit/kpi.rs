//! KPI computation from aggregated readings.

use serde::Serialize;

use super::aggregate::aggregate;
use super::types::{Aggregation, DailyRollup, HourlyBucket};
use crate::reading::Reading;

/// Decimals kept for energies, costs, power, EUI, and the peak/valley ratio.
pub const ENERGY_DECIMALS: u32 = 2;
/// Decimals kept for the self-consumption percentage.
pub const PERCENT_DECIMALS: u32 = 1;
/// Decimals kept for hourly-profile means.
pub const PROFILE_DECIMALS: u32 = 3;

/// Rounds `value` half away from zero to `decimals` places.
///
/// # Examples
///
/// ```
/// use energy_audit::audit::kpi::round_to;
///
/// assert_eq!(round_to(33.333_333, 1), 33.3);
/// assert_eq!(round_to(1.0, 2), 1.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Energy-efficiency indicators for one analysis run.
///
/// Every value is rounded for display. Optional fields distinguish "not
/// applicable" from zero: no PV system, no floor area, or a profile with an
/// empty valley.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSet {
    /// Total consumption (kWh).
    pub energy_kwh: f64,
    /// Total PV generation (kWh).
    pub solar_kwh: f64,
    /// Grid import (kWh).
    pub import_kwh: f64,
    /// Grid export / surplus (kWh).
    pub export_kwh: f64,
    /// Estimated cost of imported energy (EUR).
    pub cost_eur: f64,
    /// Mean overnight load (kW).
    pub base_load_kw: f64,
    /// Highest hourly load (kW).
    pub peak_kw: f64,
    /// PV energy consumed on site (kWh).
    pub pv_used_kwh: f64,
    /// Average 24-hour profile.
    pub hourly_profile: Vec<HourlyBucket>,
    /// Per-day totals in date order, unrounded; exporters format them.
    pub daily: Vec<DailyRollup>,
    /// Share of PV consumed on site (%), `None` without generation.
    pub autoconsumo_pct: Option<f64>,
    /// Energy use intensity (kWh/m²), `None` without a floor area.
    pub eui: Option<f64>,
    /// Highest over lowest hourly-profile mean, `None` when the valley is 0.
    pub ratio_peak_valley: Option<f64>,
}

impl KpiSet {
    /// Computes the KPI set for a reading sequence.
    ///
    /// # Arguments
    ///
    /// * `readings` - Readings in any order
    /// * `area_m2` - Floor area; ignored unless positive and finite
    ///
    /// # Returns
    ///
    /// `None` when `readings` is empty ("no data"), never a zeroed set.
    pub fn compute(readings: &[Reading], area_m2: Option<f64>) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        Self::from_aggregation(&aggregate(readings), area_m2)
    }

    /// Derives the KPI set from aggregator output.
    ///
    /// Returns `None` when the aggregation covered no readings.
    pub fn from_aggregation(agg: &Aggregation, area_m2: Option<f64>) -> Option<Self> {
        if agg.count == 0 {
            return None;
        }

        let autoconsumo_pct = (agg.solar_kwh > 0.0)
            .then(|| round_to(agg.pv_used / agg.solar_kwh * 100.0, PERCENT_DECIMALS));

        let eui = area_m2
            .filter(|a| a.is_finite() && *a > 0.0)
            .map(|a| round_to(agg.energy_kwh / a, ENERGY_DECIMALS));

        Some(Self {
            energy_kwh: round_to(agg.energy_kwh, ENERGY_DECIMALS),
            solar_kwh: round_to(agg.solar_kwh, ENERGY_DECIMALS),
            import_kwh: round_to(agg.import_kwh, ENERGY_DECIMALS),
            export_kwh: round_to(agg.export_kwh, ENERGY_DECIMALS),
            cost_eur: round_to(agg.cost_eur, ENERGY_DECIMALS),
            base_load_kw: round_to(agg.base_load_kw, ENERGY_DECIMALS),
            peak_kw: round_to(agg.peak_kw, ENERGY_DECIMALS),
            pv_used_kwh: round_to(agg.pv_used, ENERGY_DECIMALS),
            hourly_profile: agg.hourly_profile.clone(),
            daily: agg.daily.clone(),
            autoconsumo_pct,
            eui,
            ratio_peak_valley: peak_valley_ratio(&agg.hourly_profile),
        })
    }
}

/// Ratio of the highest to the lowest hourly-profile load.
///
/// Works on the averaged profile, not on raw readings, so single-day
/// extremes are smoothed out. `None` when the lowest bucket is 0.
pub fn peak_valley_ratio(profile: &[HourlyBucket]) -> Option<f64> {
    let peak = profile.iter().fold(0.0_f64, |m, b| m.max(b.load));
    let valley = profile.iter().fold(f64::INFINITY, |m, b| m.min(b.load));
    (valley.is_finite() && valley > 0.0).then(|| round_to(peak / valley, ENERGY_DECIMALS))
}
