//! Summary and secondary metric aggregation over a traffic record set.
//!
//! Every ratio is null-guarded: a zero denominator yields `None`, never an
//! error or an infinite value, and the functions here are total over any
//! record set however sparse.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::traffic::TrafficRecord;

/// Headline figures for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_investment: f64,
    pub total_leads: i64,
    pub avg_cpl: Option<f64>,
    pub roas: Option<f64>,
}

/// Percentage deltas against the comparison period, one per summary field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDeltas {
    pub total_investment_pct: Option<f64>,
    pub total_leads_pct: Option<f64>,
    pub avg_cpl_pct: Option<f64>,
    pub roas_pct: Option<f64>,
}

impl SummaryDeltas {
    /// All-null deltas, used when the comparison period is disabled.
    pub fn empty() -> Self {
        SummaryDeltas {
            total_investment_pct: None,
            total_leads_pct: None,
            avg_cpl_pct: None,
            roas_pct: None,
        }
    }
}

/// Funnel figures for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryMetrics {
    pub impressions_total: i64,
    pub cpm: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub clicks_to_leads_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryDeltas {
    pub impressions_total_pct: Option<f64>,
    pub cpm_pct: Option<f64>,
    pub ctr_pct: Option<f64>,
    pub cpc_pct: Option<f64>,
    pub clicks_to_leads_ratio_pct: Option<f64>,
}

impl SecondaryDeltas {
    pub fn empty() -> Self {
        SecondaryDeltas {
            impressions_total_pct: None,
            cpm_pct: None,
            ctr_pct: None,
            cpc_pct: None,
            clicks_to_leads_ratio_pct: None,
        }
    }
}

/// Request-level ROAS overrides, already coerced from the query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoasOverrides {
    /// Direct ROAS value, wins over everything.
    pub explicit: Option<f64>,
    /// Revenue figure divided by total investment when investment > 0.
    pub revenue: Option<f64>,
}

pub fn summary_metrics(records: &[TrafficRecord], overrides: &RoasOverrides) -> SummaryMetrics {
    let total_investment: f64 = records.iter().map(|r| r.ad_investment.unwrap_or(0.0)).sum();
    let total_leads: i64 = records.iter().map(|r| r.leads.unwrap_or(0)).sum();

    let avg_cpl = if total_leads > 0 {
        Some(round2(total_investment / total_leads as f64))
    } else {
        None
    };
    let roas = resolve_roas(records, total_investment, overrides).map(round2);

    debug!(
        record_count = records.len(),
        total_investment,
        total_leads,
        "built summary metrics"
    );

    SummaryMetrics {
        total_investment: round2(total_investment),
        total_leads,
        avg_cpl,
        roas,
    }
}

pub fn secondary_metrics(records: &[TrafficRecord]) -> SecondaryMetrics {
    let total_impressions: i64 = records.iter().map(|r| r.impressions.unwrap_or(0)).sum();
    let total_clicks: i64 = records.iter().map(|r| r.clicks.unwrap_or(0)).sum();
    let total_leads: i64 = records.iter().map(|r| r.leads.unwrap_or(0)).sum();
    let total_investment: f64 = records.iter().map(|r| r.ad_investment.unwrap_or(0.0)).sum();

    let cpm = if total_impressions > 0 {
        Some(round2(total_investment / total_impressions as f64 * 1000.0))
    } else {
        None
    };
    let ctr = if total_impressions > 0 {
        Some(round2(total_clicks as f64 / total_impressions as f64 * 100.0))
    } else {
        None
    };
    let cpc = if total_clicks > 0 {
        Some(round2(total_investment / total_clicks as f64))
    } else {
        None
    };
    let clicks_to_leads_ratio = if total_leads > 0 {
        Some(round2(total_clicks as f64 / total_leads as f64))
    } else {
        None
    };

    SecondaryMetrics {
        impressions_total: total_impressions,
        cpm,
        ctr,
        cpc,
        clicks_to_leads_ratio,
    }
}

/// Resolve ROAS for a period, first match wins: the explicit override,
/// the revenue override divided by investment (investment > 0 only),
/// the mean of per-record ROAS values, then nothing.
fn resolve_roas(
    records: &[TrafficRecord],
    total_investment: f64,
    overrides: &RoasOverrides,
) -> Option<f64> {
    if let Some(explicit) = overrides.explicit {
        return Some(explicit);
    }

    if let Some(revenue) = overrides.revenue {
        if total_investment > 0.0 {
            return Some(revenue / total_investment);
        }
    }

    let values: Vec<f64> = records.iter().filter_map(|r| r.roas).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn summary_deltas(current: &SummaryMetrics, previous: &SummaryMetrics) -> SummaryDeltas {
    SummaryDeltas {
        total_investment_pct: calculate_delta(
            Some(current.total_investment),
            Some(previous.total_investment),
        ),
        total_leads_pct: calculate_delta(
            Some(current.total_leads as f64),
            Some(previous.total_leads as f64),
        ),
        avg_cpl_pct: calculate_delta(current.avg_cpl, previous.avg_cpl),
        roas_pct: calculate_delta(current.roas, previous.roas),
    }
}

pub fn secondary_deltas(current: &SecondaryMetrics, previous: &SecondaryMetrics) -> SecondaryDeltas {
    SecondaryDeltas {
        impressions_total_pct: calculate_delta(
            Some(current.impressions_total as f64),
            Some(previous.impressions_total as f64),
        ),
        cpm_pct: calculate_delta(current.cpm, previous.cpm),
        ctr_pct: calculate_delta(current.ctr, previous.ctr),
        cpc_pct: calculate_delta(current.cpc, previous.cpc),
        clicks_to_leads_ratio_pct: calculate_delta(
            current.clicks_to_leads_ratio,
            previous.clicks_to_leads_ratio,
        ),
    }
}

/// Percentage change of `current` against `previous`, rounded to one
/// decimal. A missing or zero baseline has no meaningful delta and yields
/// `None`, as does a missing current value.
pub fn calculate_delta(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let previous = previous?;
    let current = current?;
    if previous == 0.0 {
        return None;
    }
    Some(round1((current - previous) / previous.abs() * 100.0))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
