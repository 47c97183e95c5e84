//! File input and output around the audit engine.

/// Result export: CSV rollups, JSON bundle, text report.
pub mod export;
/// CSV input into raw records.
pub mod import;
