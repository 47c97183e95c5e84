//! Totals, daily rollups, and the 24-hour profile for a reading sequence.

use std::collections::BTreeMap;

use super::kpi::{PROFILE_DECIMALS, round_to};
use super::types::{Aggregation, DailyRollup, HOURS_PER_DAY, HourlyBucket};
use crate::reading::Reading;

/// Overnight hours (inclusive) used to estimate the always-on base load.
pub const BASE_LOAD_HOURS: std::ops::RangeInclusive<u32> = 2..=5;

/// Aggregates a reading sequence.
///
/// The input need not be sorted: a sorted view by timestamp is built first so
/// that accumulation order, and with it the floating-point result, depends
/// only on the data. An empty input yields zero totals, an all-zero profile,
/// and no daily rows; the KPI calculator turns that into "no data".
pub fn aggregate(readings: &[Reading]) -> Aggregation {
    let mut sorted: Vec<&Reading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut energy_kwh = 0.0_f64;
    let mut solar_kwh = 0.0_f64;
    let mut import_kwh = 0.0_f64;
    let mut export_kwh = 0.0_f64;
    let mut cost_eur = 0.0_f64;
    let mut pv_used = 0.0_f64;
    let mut peak_kw = 0.0_f64;
    let mut night_sum = 0.0_f64;
    let mut night_count = 0_usize;

    for r in &sorted {
        energy_kwh += r.load_kwh;
        solar_kwh += r.pv_or_zero();
        import_kwh += r.grid_import_kwh();
        export_kwh += r.grid_export_kwh();
        cost_eur += r.import_cost_eur();
        pv_used += r.self_consumed_kwh();
        peak_kw = peak_kw.max(r.load_kwh);

        if BASE_LOAD_HOURS.contains(&r.hour()) {
            night_sum += r.load_kwh;
            night_count += 1;
        }
    }

    let base_load_kw = if night_count > 0 {
        night_sum / night_count as f64
    } else {
        0.0
    };

    Aggregation {
        count: sorted.len(),
        energy_kwh,
        solar_kwh,
        import_kwh,
        export_kwh,
        cost_eur,
        base_load_kw,
        peak_kw,
        pv_used,
        hourly_profile: hourly_profile(&sorted),
        daily: daily_rollup(&sorted),
    }
}

/// Mean load and PV per hour of day, rounded to 3 decimals.
///
/// Always returns [`HOURS_PER_DAY`] buckets in hour order; empty buckets
/// report 0.
pub fn hourly_profile(readings: &[&Reading]) -> Vec<HourlyBucket> {
    let mut sums = [(0.0_f64, 0.0_f64, 0_usize); HOURS_PER_DAY];
    for r in readings {
        let slot = &mut sums[r.hour() as usize % HOURS_PER_DAY];
        slot.0 += r.load_kwh;
        slot.1 += r.pv_or_zero();
        slot.2 += 1;
    }

    sums.iter()
        .zip(0_u32..)
        .map(|(&(load, pv, n), hour)| {
            let (load, pv) = if n > 0 {
                (load / n as f64, pv / n as f64)
            } else {
                (0.0, 0.0)
            };
            HourlyBucket {
                hour,
                load: round_to(load, PROFILE_DECIMALS),
                pv: round_to(pv, PROFILE_DECIMALS),
            }
        })
        .collect()
}

/// Per-day totals keyed by ISO date, in ascending date order.
///
/// Only days present in the input appear; gaps are not filled.
pub fn daily_rollup(readings: &[&Reading]) -> Vec<DailyRollup> {
    let mut days: BTreeMap<String, DailyRollup> = BTreeMap::new();
    for r in readings {
        let key = r.day_key();
        let day = days
            .entry(key.clone())
            .or_insert_with(|| DailyRollup::empty(key));
        day.load += r.load_kwh;
        day.pv += r.pv_or_zero();
        day.cost += r.import_cost_eur();
        day.pts += 1;
    }
    days.into_values().collect()
}
