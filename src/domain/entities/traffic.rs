use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single ad-traffic row as stored in the tenant database.
///
/// Counters and investment are nullable at the storage level; every
/// aggregation treats a missing value as zero. `start_date`/`end_date`
/// describe the inclusive calendar range the row covers, with
/// `created_at` as the fallback anchor when neither is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrafficRecord {
    pub id: i64,
    pub partner_id: Option<i64>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub leads: Option<i64>,
    pub ad_investment: Option<f64>,
    pub roas: Option<f64>,
    pub observation: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
}

impl TrafficRecord {
    /// The calendar date a record is anchored to for time bucketing:
    /// `start_date`, else `end_date`, else the `created_at` date.
    /// Records with none of these carry no anchor and are dropped from
    /// bucketed output.
    pub fn entry_date(&self) -> Option<NaiveDate> {
        self.start_date
            .or(self.end_date)
            .or_else(|| self.created_at.map(|ts| ts.date()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_entry_date_prefers_start_date() {
        let record = TrafficRecord {
            start_date: Some(date(2025, 3, 3)),
            end_date: Some(date(2025, 3, 9)),
            created_at: date(2025, 4, 1).and_hms_opt(12, 0, 0),
            ..Default::default()
        };
        assert_eq!(record.entry_date(), Some(date(2025, 3, 3)));
    }

    #[test]
    fn test_entry_date_falls_back_to_end_date() {
        let record = TrafficRecord {
            end_date: Some(date(2025, 3, 9)),
            created_at: date(2025, 4, 1).and_hms_opt(12, 0, 0),
            ..Default::default()
        };
        assert_eq!(record.entry_date(), Some(date(2025, 3, 9)));
    }

    #[test]
    fn test_entry_date_falls_back_to_created_at() {
        let record = TrafficRecord {
            created_at: date(2025, 4, 1).and_hms_opt(12, 30, 0),
            ..Default::default()
        };
        assert_eq!(record.entry_date(), Some(date(2025, 4, 1)));
    }

    #[test]
    fn test_entry_date_none_when_no_anchor() {
        let record = TrafficRecord::default();
        assert_eq!(record.entry_date(), None);
    }
}
