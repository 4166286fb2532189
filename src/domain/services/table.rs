//! Per-partner breakdown of a traffic record set into ordered time buckets.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::traffic::TrafficRecord;
use crate::domain::services::metrics::round2;

/// One time bucket within a partner row. The wire field is `week` even
/// when bucketing monthly; the key is the bucket's first day as
/// `YYYY-MM-DD`. A bucket with zero leads reports both fields as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub week: String,
    pub leads: Option<i64>,
    pub cpl: Option<f64>,
}

/// One row of the partner table: the partner's buckets in ascending key
/// order plus the whole-period CPL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerRow {
    pub partner_id: i64,
    pub partner_name: String,
    pub weeks: Vec<TimeBucket>,
    pub month_cpl: Option<f64>,
}

/// Group records by partner, in the order each partner is first seen.
/// Records without a partner id are excluded entirely; partners missing
/// from `partner_names` render as "Unknown Partner".
pub fn partner_table(
    records: &[TrafficRecord],
    partner_names: &HashMap<i64, String>,
    group_by_week: bool,
) -> Vec<PartnerRow> {
    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<&TrafficRecord>> = HashMap::new();

    for record in records {
        let Some(partner_id) = record.partner_id else {
            continue;
        };
        if !groups.contains_key(&partner_id) {
            order.push(partner_id);
        }
        groups.entry(partner_id).or_default().push(record);
    }

    debug!(
        record_count = records.len(),
        partner_count = order.len(),
        group_by_week,
        "building partner table"
    );

    order
        .into_iter()
        .map(|partner_id| {
            let items = &groups[&partner_id];
            let partner_name = partner_names
                .get(&partner_id)
                .cloned()
                .unwrap_or_else(|| "Unknown Partner".to_string());

            let total_investment: f64 = items.iter().map(|r| r.ad_investment.unwrap_or(0.0)).sum();
            let total_leads: i64 = items.iter().map(|r| r.leads.unwrap_or(0)).sum();
            let month_cpl = if total_leads > 0 {
                Some(round2(total_investment / total_leads as f64))
            } else {
                None
            };

            PartnerRow {
                partner_id,
                partner_name,
                weeks: time_buckets(items, group_by_week),
                month_cpl,
            }
        })
        .collect()
}

/// Bucket records by their entry date, weekly (Monday start) or monthly
/// (first of month), sorted ascending by key. Records without any entry
/// date are dropped, not an error.
pub fn time_buckets(records: &[&TrafficRecord], group_by_week: bool) -> Vec<TimeBucket> {
    let mut buckets: BTreeMap<String, (i64, f64)> = BTreeMap::new();

    for record in records {
        let Some(date) = record.entry_date() else {
            continue;
        };
        let key = bucket_key(date, group_by_week).format("%Y-%m-%d").to_string();
        let entry = buckets.entry(key).or_insert((0, 0.0));
        entry.0 += record.leads.unwrap_or(0);
        entry.1 += record.ad_investment.unwrap_or(0.0);
    }

    buckets
        .into_iter()
        .map(|(week, (leads, investment))| TimeBucket {
            week,
            // Zero leads is suppressed to null in the bucket output.
            leads: (leads > 0).then_some(leads),
            cpl: (leads > 0).then(|| round2(investment / leads as f64)),
        })
        .collect()
}

fn bucket_key(date: NaiveDate, group_by_week: bool) -> NaiveDate {
    if group_by_week {
        date.week(Weekday::Mon).first_day()
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
    }
}
