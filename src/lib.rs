//! Energy-consumption KPI engine: normalizes meter readings, aggregates them,
//! derives KPIs and rule-based recommendations, and builds the report bundle.

/// Aggregation, KPI, recommendation, and report-building stages.
pub mod audit;
pub mod config;
pub mod demo;
pub mod error;
/// CSV/JSON input and output.
pub mod io;
pub mod reading;
pub mod runner;

/// Read-only HTTP API over a completed run.
#[cfg(feature = "api")]
pub mod api;
