//! One complete analysis run, from readings to report bundle.

use serde::Serialize;

use crate::audit::{KpiSet, Recommendation, ReportData, SiteInfo, build_report, recommend};
use crate::reading::{RawRecord, Reading, normalize_records};

/// Output of one analysis run.
///
/// `kpis` is `None` when no reading survived normalization; the report then
/// carries placeholders and the recommendation list is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRun {
    /// Number of readings analysed.
    pub reading_count: usize,
    pub kpis: Option<KpiSet>,
    pub recommendations: Vec<Recommendation>,
    pub report: ReportData,
}

impl AuditRun {
    /// Returns `true` when the run had at least one valid reading.
    pub fn has_data(&self) -> bool {
        self.kpis.is_some()
    }
}

/// Analyses an already normalized reading sequence.
pub fn run_audit(readings: &[Reading], site: &SiteInfo) -> AuditRun {
    let kpis = KpiSet::compute(readings, site.usable_area());
    let recommendations = kpis.as_ref().map(recommend).unwrap_or_default();
    let report = build_report(site, kpis.as_ref(), &recommendations);

    AuditRun {
        reading_count: readings.len(),
        kpis,
        recommendations,
        report,
    }
}

/// Normalizes raw records and analyses the surviving readings.
pub fn run_audit_records(records: &[RawRecord], site: &SiteInfo) -> AuditRun {
    let readings = normalize_records(records);
    run_audit(&readings, site)
}
