//! API query and error types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Optional date range for the daily endpoint, both bounds inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DailyQuery {
    /// Returns `true` if `day` (a `YYYY-MM-DD` key) lies inside the range.
    ///
    /// Keys that do not parse as dates are kept only when no bound is set.
    pub fn contains(&self, day: &str) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
            return false;
        };
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn unbounded_query_keeps_everything() {
        assert!(DailyQuery::default().contains("2024-03-01"));
        assert!(DailyQuery::default().contains("garbage"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let q = DailyQuery {
            from: date(2024, 3, 2),
            to: date(2024, 3, 3),
        };
        assert!(!q.contains("2024-03-01"));
        assert!(q.contains("2024-03-02"));
        assert!(q.contains("2024-03-03"));
        assert!(!q.contains("2024-03-04"));
    }

    #[test]
    fn open_upper_bound() {
        let q = DailyQuery {
            from: date(2024, 3, 2),
            to: None,
        };
        assert!(q.contains("2024-12-31"));
        assert!(!q.contains("2024-03-01"));
    }
}
