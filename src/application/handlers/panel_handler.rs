//! Manager panel report endpoint.
//!
//! Thin assembly over the domain services: resolve the period, load
//! current (and optionally comparison) traffic, aggregate, attach deltas
//! and the partner table. Malformed query values are coerced, never
//! rejected; only storage failures surface as errors.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::Query;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::errors::PanelError;
use crate::domain::services::metrics::{
    secondary_deltas, secondary_metrics, summary_deltas, summary_metrics, RoasOverrides,
    SecondaryDeltas, SecondaryMetrics, SummaryDeltas, SummaryMetrics,
};
use crate::domain::services::params::{boolean_value, float_param, normalize_partner_ids};
use crate::domain::services::period::{resolve_period, PeriodParams};
use crate::domain::services::table::{partner_table, PartnerRow};
use crate::persistence::repository::{PartnerRepository, TrafficRepository};
use crate::persistence::DatabaseError;
use crate::AppState;

/// Query parameters for the manager panel endpoint. Everything arrives as
/// an optional raw string and is coerced downstream, so a malformed value
/// can never fail extraction.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PanelQuery {
    pub month_year: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Partner id filter: repeated keys, a comma-separated string, or both
    #[serde(default)]
    pub partner_ids: Vec<String>,
    /// Same filter in the bracketed array rendition
    #[serde(default, rename = "partner_ids[]")]
    pub partner_ids_array: Vec<String>,
    /// Bucket granularity (default true = weekly)
    pub group_by_week: Option<String>,
    /// Enables the comparison period and deltas (default true)
    pub include_comparison: Option<String>,
    pub roas: Option<String>,
    pub comparison_roas: Option<String>,
    pub total_revenue: Option<String>,
    pub revenue: Option<String>,
    pub comparison_total_revenue: Option<String>,
    pub comparison_revenue: Option<String>,
    pub total_revenue_previous: Option<String>,
}

/// Summary block with its deltas nested under `deltas`.
#[derive(Debug, Serialize)]
pub struct SummarySection {
    #[serde(flatten)]
    pub metrics: SummaryMetrics,
    pub deltas: SummaryDeltas,
}

#[derive(Debug, Serialize)]
pub struct SecondarySection {
    #[serde(flatten)]
    pub metrics: SecondaryMetrics,
    pub deltas: SecondaryDeltas,
}

/// Full manager panel report.
#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub summary: SummarySection,
    pub table: Vec<PartnerRow>,
    pub secondary_metrics: SecondarySection,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /manager-panel
pub async fn manager_panel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PanelQuery>,
) -> Result<Json<PanelResponse>, (StatusCode, Json<ErrorResponse>)> {
    let report = build_report(&state, &params, Local::now().date_naive()).await?;
    Ok(Json(report))
}

/// Report assembly with an injectable "today" so period defaults are
/// testable.
pub async fn build_report(
    state: &AppState,
    params: &PanelQuery,
    today: chrono::NaiveDate,
) -> Result<PanelResponse, (StatusCode, Json<ErrorResponse>)> {
    let period = resolve_period(
        &PeriodParams {
            month_year: params.month_year.clone(),
            month: params.month.clone(),
            year: params.year.clone(),
            date_from: params.date_from.clone(),
            date_to: params.date_to.clone(),
        },
        today,
    );
    let partner_ids = normalize_partner_ids(
        params
            .partner_ids
            .iter()
            .chain(&params.partner_ids_array)
            .map(String::as_str),
    );
    let group_by_week = boolean_value(params.group_by_week.as_deref(), true);
    let include_comparison = boolean_value(params.include_comparison.as_deref(), true);

    debug!(
        from = %period.from,
        to = %period.to,
        partner_count = partner_ids.len(),
        group_by_week,
        include_comparison,
        "assembling manager panel report"
    );

    let traffic_repo = TrafficRepository::new(state.pool.clone());
    let partner_repo = PartnerRepository::new(state.pool.clone());

    let current_overrides = RoasOverrides {
        explicit: float_param(params.roas.as_deref()),
        revenue: float_param(params.total_revenue.as_deref())
            .or_else(|| float_param(params.revenue.as_deref())),
    };
    let comparison_overrides = RoasOverrides {
        explicit: float_param(params.comparison_roas.as_deref()),
        revenue: float_param(params.comparison_total_revenue.as_deref())
            .or_else(|| float_param(params.comparison_revenue.as_deref()))
            .or_else(|| float_param(params.total_revenue_previous.as_deref())),
    };

    // The comparison fetch is independent of the primary one, so the two
    // run concurrently when comparison is requested.
    let (current, comparison) = if include_comparison {
        let comparison_period = period.comparison();
        let (current, comparison) = tokio::join!(
            traffic_repo.find_active(&period, &partner_ids),
            traffic_repo.find_active(&comparison_period, &partner_ids),
        );
        (
            current.map_err(storage_error)?,
            Some(comparison.map_err(storage_error)?),
        )
    } else {
        (
            traffic_repo
                .find_active(&period, &partner_ids)
                .await
                .map_err(storage_error)?,
            None,
        )
    };

    let current_summary = summary_metrics(&current, &current_overrides);
    let current_secondary = secondary_metrics(&current);

    let (summary, secondary) = match &comparison {
        Some(records) => {
            let previous_summary = summary_metrics(records, &comparison_overrides);
            let previous_secondary = secondary_metrics(records);
            (
                SummarySection {
                    deltas: summary_deltas(&current_summary, &previous_summary),
                    metrics: current_summary,
                },
                SecondarySection {
                    deltas: secondary_deltas(&current_secondary, &previous_secondary),
                    metrics: current_secondary,
                },
            )
        }
        None => (
            SummarySection {
                deltas: SummaryDeltas::empty(),
                metrics: current_summary,
            },
            SecondarySection {
                deltas: SecondaryDeltas::empty(),
                metrics: current_secondary,
            },
        ),
    };

    let mut table_partner_ids: Vec<i64> = current.iter().filter_map(|r| r.partner_id).collect();
    table_partner_ids.sort_unstable();
    table_partner_ids.dedup();
    let partner_names = partner_repo
        .names_by_ids(&table_partner_ids)
        .await
        .map_err(storage_error)?;

    let table = partner_table(&current, &partner_names, group_by_week);

    Ok(PanelResponse {
        summary,
        table,
        secondary_metrics: secondary,
    })
}

fn storage_error(err: DatabaseError) -> (StatusCode, Json<ErrorResponse>) {
    let err = PanelError::from(err);
    error!("Manager panel request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // The query extractor is backed by serde_html_form, so these exercise
    // the exact deserialization the endpoint sees.
    fn parse(query: &str) -> PanelQuery {
        serde_html_form::from_str(query).unwrap()
    }

    fn folded_ids(query: &PanelQuery) -> Vec<i64> {
        normalize_partner_ids(
            query
                .partner_ids
                .iter()
                .chain(&query.partner_ids_array)
                .map(String::as_str),
        )
    }

    #[test]
    fn test_partner_ids_comma_string() {
        let query = parse("partner_ids=1,2");
        assert_eq!(query.partner_ids, vec!["1,2"]);
        assert_eq!(folded_ids(&query), vec![1, 2]);
    }

    #[test]
    fn test_partner_ids_repeated_keys() {
        let query = parse("partner_ids=1&partner_ids=2");
        assert_eq!(query.partner_ids, vec!["1", "2"]);
        assert_eq!(folded_ids(&query), vec![1, 2]);
    }

    #[test]
    fn test_partner_ids_bracketed_keys() {
        let query = parse("partner_ids%5B%5D=2&partner_ids%5B%5D=5");
        assert!(query.partner_ids.is_empty());
        assert_eq!(query.partner_ids_array, vec!["2", "5"]);
        assert_eq!(folded_ids(&query), vec![2, 5]);
    }

    #[test]
    fn test_partner_ids_mixed_forms_fold_and_dedupe() {
        let query = parse("partner_ids=1,2&partner_ids%5B%5D=2&partner_ids%5B%5D=3");
        assert_eq!(folded_ids(&query), vec![1, 2, 3]);
    }

    #[test]
    fn test_partner_ids_absent_means_no_filter() {
        let query = parse("month_year=2025-03");
        assert!(query.partner_ids.is_empty());
        assert!(query.partner_ids_array.is_empty());
        assert!(folded_ids(&query).is_empty());
    }
}
