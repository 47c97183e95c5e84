//! CSV import into raw records.
//!
//! Header-based: each data row becomes a [`RawRecord`] keyed by the header
//! names. Cells are typed best-effort with [`RawValue::from_cell`]. Rows the
//! CSV reader cannot decode are skipped and counted; semantic validation is
//! left to the row normalizer.

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::reading::{RawRecord, RawValue, Reading, normalize_records};

/// Field separator of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Pick `,` or `;` from the header line.
    Auto,
    Comma,
    Semicolon,
}

impl Delimiter {
    /// Accepted configuration spellings.
    pub const NAMES: &[&str] = &["auto", ",", ";"];

    /// Parses a configuration value (`"auto"`, `","` or `";"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(Self::Auto),
            "," | "comma" => Some(Self::Comma),
            ";" | "semicolon" => Some(Self::Semicolon),
            _ => None,
        }
    }

    /// Resolves `Auto` against the first line of the input.
    pub fn resolve(self, content: &str) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Semicolon => b';',
            Self::Auto => detect_delimiter(content.lines().next().unwrap_or("")),
        }
    }
}

/// Chooses `;` when the header line has more semicolons than commas.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let commas = header_line.matches(',').count();
    let semicolons = header_line.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Parses CSV text into raw records.
///
/// # Errors
///
/// Returns an error if the header row cannot be read.
pub fn parse_records(content: &str, delimiter: Delimiter) -> Result<Vec<RawRecord>, AppError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter.resolve(content))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    let mut skipped = 0_usize;

    for (i, row) in rdr.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!(row = i + 1, error = %e, "skipping undecodable CSV row");
                skipped += 1;
                continue;
            }
        };
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, cell)| (name.to_string(), RawValue::from_cell(cell)))
            .collect();
        records.push(record);
    }

    if skipped > 0 {
        warn!(skipped, "some CSV rows could not be decoded");
    }
    Ok(records)
}

/// Reads CSV from any reader into raw records.
///
/// # Errors
///
/// Returns an error if reading fails or the header row is invalid.
pub fn read_records(mut reader: impl Read, delimiter: Delimiter) -> Result<Vec<RawRecord>, AppError> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|source| AppError::Io {
            context: "cannot read CSV input".to_string(),
            source,
        })?;
    parse_records(&content, delimiter)
}

/// Loads a CSV file and normalizes it into readings.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its header is invalid.
pub fn load_readings(path: &Path, delimiter: Delimiter) -> Result<Vec<Reading>, AppError> {
    let content = fs::read_to_string(path).map_err(|source| AppError::Io {
        context: format!("cannot read \"{}\"", path.display()),
        source,
    })?;
    let records = parse_records(&content, delimiter)?;
    let readings = normalize_records(&records);
    info!(
        path = %path.display(),
        rows = records.len(),
        readings = readings.len(),
        dropped = records.len() - readings.len(),
        "loaded energy readings"
    );
    Ok(readings)
}
