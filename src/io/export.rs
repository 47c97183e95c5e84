//! CSV, JSON, and text export of analysis results.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::audit::report::ReportData;
use crate::audit::types::{DailyRollup, HourlyBucket};
use crate::error::AppError;
use crate::runner::AuditRun;

/// Column header of the daily rollup CSV.
const DAILY_HEADER: &str = "day,load_kwh,pv_kwh,cost_eur,points";
/// Column header of the hourly profile CSV.
const HOURLY_HEADER: &str = "hour,load_kwh,pv_kwh";

fn create(path: &Path) -> Result<io::BufWriter<File>, AppError> {
    let file = File::create(path).map_err(|source| AppError::Io {
        context: format!("cannot create \"{}\"", path.display()),
        source,
    })?;
    Ok(io::BufWriter::new(file))
}

/// Writes daily rollups as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_daily_csv(rows: &[DailyRollup], writer: impl Write) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(DAILY_HEADER.split(','))?;
    for d in rows {
        wtr.write_record(&[
            d.day.clone(),
            format!("{:.2}", d.load),
            format!("{:.2}", d.pv),
            format!("{:.2}", d.cost),
            d.pts.to_string(),
        ])?;
    }
    wtr.flush().map_err(|source| AppError::Io {
        context: "cannot flush daily CSV".to_string(),
        source,
    })
}

/// Writes the hourly profile as CSV to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_hourly_csv(buckets: &[HourlyBucket], writer: impl Write) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HOURLY_HEADER.split(','))?;
    for b in buckets {
        wtr.write_record(&[
            b.hour.to_string(),
            format!("{:.3}", b.load),
            format!("{:.3}", b.pv),
        ])?;
    }
    wtr.flush().map_err(|source| AppError::Io {
        context: "cannot flush hourly CSV".to_string(),
        source,
    })
}

/// Exports daily rollups to a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_daily_csv(rows: &[DailyRollup], path: &Path) -> Result<(), AppError> {
    write_daily_csv(rows, create(path)?)?;
    info!(path = %path.display(), days = rows.len(), "daily rollup written");
    Ok(())
}

/// Exports the hourly profile to a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_hourly_csv(buckets: &[HourlyBucket], path: &Path) -> Result<(), AppError> {
    write_hourly_csv(buckets, create(path)?)?;
    info!(path = %path.display(), "hourly profile written");
    Ok(())
}

/// Exports the full run (KPIs, recommendations, report bundle) as JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn export_json(run: &AuditRun, path: &Path) -> Result<(), AppError> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, run)?;
    writer.flush().map_err(|source| AppError::Io {
        context: format!("cannot write \"{}\"", path.display()),
        source,
    })?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Writes the rendered text report to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn export_report_text(report: &ReportData, path: &Path) -> Result<(), AppError> {
    fs::write(path, format!("{report}\n")).map_err(|source| AppError::Io {
        context: format!("cannot write \"{}\"", path.display()),
        source,
    })?;
    info!(path = %path.display(), "text report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(key: &str, load: f64) -> DailyRollup {
        DailyRollup {
            day: key.to_string(),
            load,
            pv: 0.5,
            cost: 0.123,
            pts: 24,
        }
    }

    fn lines(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn daily_csv_layout() {
        let mut buf = Vec::new();
        write_daily_csv(&[day("2024-03-01", 10.0), day("2024-03-02", 12.345)], &mut buf)
            .expect("write should succeed");
        let lines = lines(buf);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], DAILY_HEADER);
        assert_eq!(lines[1], "2024-03-01,10.00,0.50,0.12,24");
    }

    #[test]
    fn hourly_csv_has_24_rows() {
        let buckets: Vec<HourlyBucket> = (0..24)
            .map(|hour| HourlyBucket {
                hour,
                load: 0.5,
                pv: 0.0,
            })
            .collect();
        let mut buf = Vec::new();
        write_hourly_csv(&buckets, &mut buf).expect("write should succeed");
        let lines = lines(buf);
        assert_eq!(lines.len(), 25);
        assert_eq!(lines[0], HOURLY_HEADER);
        assert_eq!(lines[24], "23,0.500,0.000");
    }

    #[test]
    fn csv_output_is_deterministic() {
        let rows = vec![day("2024-03-01", 1.0)];
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_daily_csv(&rows, &mut a).expect("first write");
        write_daily_csv(&rows, &mut b).expect("second write");
        assert_eq!(a, b);
    }
}
