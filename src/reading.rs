//! Canonical energy readings and the row normalizer that produces them.
//!
//! A tabular parser hands over one [`RawRecord`] per data row: a mapping of
//! column name to a loosely typed [`RawValue`]. [`normalize_record`] turns a
//! record into a [`Reading`] or rejects it. Rejection is silent; callers only
//! observe a shorter sequence.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// Columns checked for the timestamp, in fallback order.
pub const TIMESTAMP_COLUMNS: &[&str] = &["datetime", "date", "timestamp"];
/// Columns checked for consumed energy, in fallback order.
pub const LOAD_COLUMNS: &[&str] = &["load_kwh", "load", "kwh"];
/// Columns checked for on-site generation, in fallback order.
pub const PV_COLUMNS: &[&str] = &["pv_kwh", "solar_kwh"];
/// Columns checked for the energy price, in fallback order.
pub const PRICE_COLUMNS: &[&str] = &["price_eur_per_kwh", "price"];

/// Naive datetime layouts accepted besides RFC 3339 and bare dates.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// One raw cell as produced by a header-based tabular parser.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A cell the parser already recognised as numeric.
    Number(f64),
    /// Any other non-empty cell.
    Text(String),
    /// An empty cell. The column exists but carries no value.
    Empty,
}

impl RawValue {
    /// Classifies a raw cell the way a parser with dynamic typing would.
    ///
    /// Blank cells become [`RawValue::Empty`], cells that parse as a plain
    /// number become [`RawValue::Number`], everything else stays text.
    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Returns `true` for an empty cell.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Best-effort numeric coercion.
    ///
    /// Text is trimmed and parsed; a value such as `"1,25"` with a single
    /// comma and no dot is read with the comma as decimal separator. The
    /// result may be non-finite (`"inf"`, `"NaN"`); callers decide how to
    /// treat that.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_number_text(s),
            Self::Empty => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

/// One tabular row keyed by column name.
pub type RawRecord = BTreeMap<String, RawValue>;

fn parse_number_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }
    if s.matches(',').count() == 1 && !s.contains('.') {
        return s.replace(',', ".").parse::<f64>().ok();
    }
    None
}

/// Parses a raw timestamp cell.
///
/// Text accepts RFC 3339 (the clock time as written is kept, the offset is
/// dropped), the layouts in `DATETIME_FORMATS` and bare `YYYY-MM-DD`
/// (midnight). Numbers are epoch milliseconds.
pub fn parse_timestamp(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::Number(ms) => {
            if !ms.is_finite() {
                return None;
            }
            DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.naive_utc())
        }
        RawValue::Text(s) => parse_timestamp_text(s.trim()),
        RawValue::Empty => None,
    }
}

fn parse_timestamp_text(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// One time-sampled energy observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Start of the sampling interval, on the caller's local clock.
    pub timestamp: NaiveDateTime,
    /// Energy consumed in the interval (kWh, finite, >= 0).
    pub load_kwh: f64,
    /// Energy generated on site (kWh). `None` means no PV system.
    pub pv_kwh: Option<f64>,
    /// Energy price for the interval (EUR/kWh). `None` disables cost.
    pub price_eur_per_kwh: Option<f64>,
}

impl Reading {
    /// Creates a load-only reading.
    pub fn new(timestamp: NaiveDateTime, load_kwh: f64) -> Self {
        Self {
            timestamp,
            load_kwh,
            pv_kwh: None,
            price_eur_per_kwh: None,
        }
    }

    /// Sets the on-site generation for this interval.
    pub fn with_pv(mut self, pv_kwh: f64) -> Self {
        self.pv_kwh = Some(pv_kwh);
        self
    }

    /// Sets the energy price for this interval.
    pub fn with_price(mut self, price_eur_per_kwh: f64) -> Self {
        self.price_eur_per_kwh = Some(price_eur_per_kwh);
        self
    }

    /// Hour of day (0-23) on the timestamp's own clock.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// ISO calendar date key, e.g. `"2024-03-02"`.
    pub fn day_key(&self) -> String {
        self.timestamp.date().format("%Y-%m-%d").to_string()
    }

    /// Generation with an absent value read as zero.
    pub fn pv_or_zero(&self) -> f64 {
        self.pv_kwh.unwrap_or(0.0)
    }

    /// Energy drawn from the grid: `max(load - pv, 0)`.
    pub fn grid_import_kwh(&self) -> f64 {
        (self.load_kwh - self.pv_or_zero()).max(0.0)
    }

    /// Surplus fed to the grid: `max(pv - load, 0)`.
    pub fn grid_export_kwh(&self) -> f64 {
        (self.pv_or_zero() - self.load_kwh).max(0.0)
    }

    /// Generation consumed on site: `min(pv, load)`.
    pub fn self_consumed_kwh(&self) -> f64 {
        self.pv_or_zero().min(self.load_kwh)
    }

    /// Cost of the imported energy, zero when the interval has no price.
    pub fn import_cost_eur(&self) -> f64 {
        self.price_eur_per_kwh
            .map_or(0.0, |price| self.grid_import_kwh() * price)
    }
}

/// First column from `keys` holding a non-empty cell.
fn first_filled<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a RawValue> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_empty())
}

/// First column from `keys` that exists in the record, blank or not.
fn first_column<'a>(record: &'a RawRecord, keys: &[&str]) -> Option<&'a RawValue> {
    keys.iter().find_map(|k| record.get(*k))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|n| n.is_finite())
}

/// Converts one raw record into a [`Reading`].
///
/// The timestamp comes from the first filled timestamp column; the record is
/// rejected when that value does not parse. Load falls back to 0 when
/// missing or non-numeric. A PV column that exists marks a PV system even
/// when its cell is blank (read as 0). Price follows the same column rule
/// but a blank or non-finite cell leaves it absent.
pub fn normalize_record(record: &RawRecord) -> Option<Reading> {
    let timestamp = first_filled(record, TIMESTAMP_COLUMNS).and_then(parse_timestamp)?;

    let load_kwh = first_filled(record, LOAD_COLUMNS)
        .and_then(|v| finite(v.as_number()))
        .unwrap_or(0.0)
        .max(0.0);
    if !load_kwh.is_finite() {
        return None;
    }

    let pv_kwh =
        first_column(record, PV_COLUMNS).map(|v| finite(v.as_number()).unwrap_or(0.0));

    let price_eur_per_kwh =
        first_column(record, PRICE_COLUMNS).and_then(|v| finite(v.as_number()));

    Some(Reading {
        timestamp,
        load_kwh,
        pv_kwh,
        price_eur_per_kwh,
    })
}

/// Normalizes every record, silently dropping the rejected ones.
pub fn normalize_records<'a, I>(records: I) -> Vec<Reading>
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    records.into_iter().filter_map(normalize_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[(&str, RawValue)]) -> RawRecord {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid test timestamp")
    }

    #[test]
    fn from_cell_classifies_values() {
        assert_eq!(RawValue::from_cell("  "), RawValue::Empty);
        assert_eq!(RawValue::from_cell("1.5"), RawValue::Number(1.5));
        assert_eq!(
            RawValue::from_cell("2024-03-02"),
            RawValue::Text("2024-03-02".to_string())
        );
    }

    #[test]
    fn decimal_comma_is_accepted() {
        assert_eq!(RawValue::from("1,25").as_number(), Some(1.25));
        assert_eq!(RawValue::from("1,234.5").as_number(), None);
        assert_eq!(RawValue::from("abc").as_number(), None);
    }

    #[test]
    fn timestamp_formats() {
        let expected = ts("2024-03-02 13:00:00");
        for s in [
            "2024-03-02 13:00:00",
            "2024-03-02T13:00:00",
            "2024-03-02 13:00",
            "2024-03-02T13:00",
            "2024/03/02 13:00",
            "2024-03-02T13:00:00+02:00",
            "2024-03-02T13:00:00Z",
        ] {
            assert_eq!(parse_timestamp(&RawValue::from(s)), Some(expected), "{s}");
        }
        assert_eq!(
            parse_timestamp(&RawValue::from("2024-03-02")),
            Some(ts("2024-03-02 00:00:00"))
        );
        assert_eq!(parse_timestamp(&RawValue::from("not a date")), None);
    }

    #[test]
    fn epoch_millis_timestamp() {
        let parsed = parse_timestamp(&RawValue::Number(0.0));
        assert_eq!(parsed, Some(ts("1970-01-01 00:00:00")));
    }

    #[test]
    fn blank_timestamp_column_falls_through() {
        let r = record(&[
            ("datetime", RawValue::Empty),
            ("date", RawValue::from("2024-03-02 05:00")),
            ("load_kwh", RawValue::Number(1.0)),
        ]);
        let reading = normalize_record(&r).expect("date column should be used");
        assert_eq!(reading.hour(), 5);
    }

    #[test]
    fn garbage_in_first_timestamp_column_rejects_record() {
        let r = record(&[
            ("datetime", RawValue::from("garbage")),
            ("date", RawValue::from("2024-03-02 05:00")),
            ("load_kwh", RawValue::from("2")),
        ]);
        assert!(normalize_record(&r).is_none());
    }

    #[test]
    fn unparseable_timestamp_rejects_record() {
        let r = record(&[
            ("datetime", RawValue::from("31/31/2024")),
            ("load_kwh", RawValue::Number(1.0)),
        ]);
        assert!(normalize_record(&r).is_none());
        assert!(normalize_record(&RawRecord::new()).is_none());
    }

    #[test]
    fn load_defaults_to_zero() {
        let r = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("load_kwh", RawValue::from("n/a")),
        ]);
        let reading = normalize_record(&r).expect("record kept");
        assert_eq!(reading.load_kwh, 0.0);

        let r = record(&[("datetime", RawValue::from("2024-03-02 10:00"))]);
        assert_eq!(normalize_record(&r).map(|x| x.load_kwh), Some(0.0));
    }

    #[test]
    fn load_uses_first_filled_column() {
        let r = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("load_kwh", RawValue::Empty),
            ("kwh", RawValue::Number(2.5)),
        ]);
        assert_eq!(normalize_record(&r).map(|x| x.load_kwh), Some(2.5));
    }

    #[test]
    fn pv_absent_differs_from_zero() {
        let without = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("load_kwh", RawValue::Number(1.0)),
        ]);
        assert_eq!(normalize_record(&without).and_then(|r| r.pv_kwh), None);

        let zero = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("load_kwh", RawValue::Number(1.0)),
            ("pv_kwh", RawValue::Number(0.0)),
        ]);
        assert_eq!(normalize_record(&zero).and_then(|r| r.pv_kwh), Some(0.0));

        let blank = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("pv_kwh", RawValue::Empty),
        ]);
        assert_eq!(normalize_record(&blank).and_then(|r| r.pv_kwh), Some(0.0));

        let solar = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("solar_kwh", RawValue::from("x")),
        ]);
        assert_eq!(normalize_record(&solar).and_then(|r| r.pv_kwh), Some(0.0));
    }

    #[test]
    fn price_zero_is_kept_and_garbage_is_absent() {
        let zero = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("price_eur_per_kwh", RawValue::Number(0.0)),
        ]);
        assert_eq!(
            normalize_record(&zero).and_then(|r| r.price_eur_per_kwh),
            Some(0.0)
        );

        let garbage = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("price_eur_per_kwh", RawValue::from("free")),
        ]);
        assert_eq!(
            normalize_record(&garbage).and_then(|r| r.price_eur_per_kwh),
            None
        );

        let fallback = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("price", RawValue::from("0,15")),
        ]);
        assert_eq!(
            normalize_record(&fallback).and_then(|r| r.price_eur_per_kwh),
            Some(0.15)
        );
    }

    #[test]
    fn blank_price_column_does_not_fall_back() {
        let r = record(&[
            ("datetime", RawValue::from("2024-03-02 10:00")),
            ("load_kwh", RawValue::from("2")),
            ("price_eur_per_kwh", RawValue::from("")),
            ("price", RawValue::from("0.5")),
        ]);
        let reading = normalize_record(&r).expect("record kept");
        assert_eq!(reading.price_eur_per_kwh, None);
        assert_eq!(reading.import_cost_eur(), 0.0);
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let rows = vec![
            record(&[
                ("datetime", RawValue::from("yesterday")),
                ("load_kwh", RawValue::Number(9.0)),
            ]),
            record(&[
                ("datetime", RawValue::from("2024-03-02 10:00")),
                ("load_kwh", RawValue::Number(1.0)),
            ]),
        ];
        let readings = normalize_records(&rows);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].load_kwh, 1.0);
    }

    #[test]
    fn reading_energy_split() {
        let r = Reading::new(ts("2024-03-02 13:00:00"), 1.0)
            .with_pv(3.0)
            .with_price(0.2);
        assert_eq!(r.grid_import_kwh(), 0.0);
        assert_eq!(r.grid_export_kwh(), 2.0);
        assert_eq!(r.self_consumed_kwh(), 1.0);
        assert_eq!(r.import_cost_eur(), 0.0);
        assert_eq!(r.day_key(), "2024-03-02");
    }
}
