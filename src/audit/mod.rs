//! Energy audit engine: aggregation, KPIs, recommendations, and report data.

/// Totals, daily rollups, and hourly profile.
pub mod aggregate;
pub mod kpi;
/// Rule table mapping KPIs to recommendations.
pub mod recommend;
pub mod report;
pub mod types;

pub use aggregate::aggregate;
pub use kpi::KpiSet;
pub use recommend::{Recommendation, recommend};
pub use report::{ReportData, SiteInfo, build_report};
pub use types::{Aggregation, DailyRollup, HourlyBucket};
