//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use energy_audit::reading::{RawRecord, RawValue, Reading};

/// Floating-point tolerance for rounded KPI comparisons.
pub const EPS: f64 = 1e-9;

/// Parses a `YYYY-MM-DD HH:MM` test timestamp.
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("valid test timestamp")
}

/// Reading with load only.
pub fn at(s: &str, load: f64) -> Reading {
    Reading::new(ts(s), load)
}

/// Raw record built from string cells, as the CSV importer would produce.
pub fn raw(cells: &[(&str, &str)]) -> RawRecord {
    cells
        .iter()
        .map(|(k, v)| ((*k).to_string(), RawValue::from_cell(v)))
        .collect()
}

/// One day of hourly readings with an evening peak, midday PV, and a flat tariff.
///
/// Load is 0.5 kWh before 07:00, 1.0 until 17:00, 2.0 afterwards. PV is
/// 1.5 kWh from 10:00 to 14:00. Price is 0.2 EUR/kWh.
pub fn office_day(day: NaiveDate) -> Vec<Reading> {
    (0..24)
        .map(|h| {
            let timestamp = day.and_hms_opt(h, 0, 0).expect("valid hour");
            let load = match h {
                0..=6 => 0.5,
                7..=17 => 1.0,
                _ => 2.0,
            };
            let pv = if (10..=14).contains(&h) { 1.5 } else { 0.0 };
            Reading::new(timestamp, load).with_pv(pv).with_price(0.2)
        })
        .collect()
}

/// Flat 0.2 kWh load at every hour of `days` consecutive days, no PV.
pub fn flat_days(start: NaiveDate, days: u32) -> Vec<Reading> {
    (0..days)
        .flat_map(|d| {
            let date = start + chrono::Days::new(u64::from(d));
            (0..24).map(move |h| {
                Reading::new(date.and_hms_opt(h, 0, 0).expect("valid hour"), 0.2)
            })
        })
        .collect()
}

/// Path of a fixture under the crate's `data/` directory.
pub fn data_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(name)
}
