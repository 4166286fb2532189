//! Database Repository
//!
//! Data access layer for traffic records and partner reference data. The
//! traffic query implements the active-interval predicate the panel
//! aggregation is defined over.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, error};

use super::models::{NewPartner, NewTraffic};
use super::{DatabaseError, DbPool};
use crate::domain::entities::partner::Partner;
use crate::domain::entities::traffic::TrafficRecord;
use crate::domain::services::period::Period;

/// Traffic repository
pub struct TrafficRepository {
    pool: DbPool,
}

impl TrafficRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a traffic record.
    pub async fn create(&self, traffic: NewTraffic) -> Result<TrafficRecord, DatabaseError> {
        let created_at = traffic.created_at.unwrap_or_else(|| Utc::now().naive_utc());
        let record = sqlx::query_as::<_, TrafficRecord>(
            r#"
            INSERT INTO traffic (
                partner_id, impressions, clicks, leads, ad_investment,
                roas, observation, start_date, end_date, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING *
            "#,
        )
        .bind(traffic.partner_id)
        .bind(traffic.impressions)
        .bind(traffic.clicks)
        .bind(traffic.leads)
        .bind(traffic.ad_investment)
        .bind(traffic.roas)
        .bind(&traffic.observation)
        .bind(traffic.start_date)
        .bind(traffic.end_date)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create traffic record: {}", e);
            DatabaseError::QueryError(format!("Failed to create traffic record: {}", e))
        })?;

        debug!("Created traffic record: {}", record.id);
        Ok(record)
    }

    /// Fetch every traffic record active within the given period,
    /// optionally filtered to a partner id set. A record is active when
    /// its explicit date range overlaps the period, when an open-ended
    /// range starts before the period ends, or when it has no dates and
    /// was created inside the period. No pagination; the aggregation
    /// consumes the complete set.
    pub async fn find_active(
        &self,
        period: &Period,
        partner_ids: &[i64],
    ) -> Result<Vec<TrafficRecord>, DatabaseError> {
        let mut sql = String::from(
            r#"
            SELECT * FROM traffic
            WHERE (
                (start_date IS NOT NULL AND end_date IS NOT NULL
                    AND start_date <= ? AND end_date >= ?)
                OR (start_date IS NOT NULL AND end_date IS NULL AND start_date <= ?)
                OR (start_date IS NULL AND date(created_at) BETWEEN ? AND ?)
            )
            "#,
        );
        if !partner_ids.is_empty() {
            let placeholders = vec!["?"; partner_ids.len()].join(", ");
            sql.push_str(&format!(" AND partner_id IN ({})", placeholders));
        }
        sql.push_str(" ORDER BY id");

        let start = period.from.date();
        let end = period.to.date();

        let mut query = sqlx::query_as::<_, TrafficRecord>(&sql)
            .bind(end)
            .bind(start)
            .bind(end)
            .bind(start)
            .bind(end);
        for id in partner_ids {
            query = query.bind(*id);
        }

        let records = query.fetch_all(&self.pool).await.map_err(|e| {
            error!("Failed to load traffic for {} - {}: {}", start, end, e);
            DatabaseError::QueryError(format!("Failed to load traffic: {}", e))
        })?;

        debug!(
            "Loaded {} traffic records for {} - {}",
            records.len(),
            start,
            end
        );
        Ok(records)
    }
}

/// Partner repository
pub struct PartnerRepository {
    pool: DbPool,
}

impl PartnerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a partner.
    pub async fn create(&self, partner: NewPartner) -> Result<Partner, DatabaseError> {
        let now = Utc::now().naive_utc();
        let record = sqlx::query_as::<_, Partner>(
            r#"
            INSERT INTO partners (description, email, phone, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING *
            "#,
        )
        .bind(&partner.description)
        .bind(&partner.email)
        .bind(&partner.phone)
        .bind(&partner.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create partner: {}", e);
            DatabaseError::QueryError(format!("Failed to create partner: {}", e))
        })?;

        debug!("Created partner: {}", record.id);
        Ok(record)
    }

    /// Resolve display names for a set of partner ids. Missing partners
    /// are simply absent from the map.
    pub async fn names_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, String>, DatabaseError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM partners WHERE id IN ({})", placeholders);

        let mut query = sqlx::query_as::<_, Partner>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        let partners = query.fetch_all(&self.pool).await.map_err(|e| {
            error!("Failed to load partners: {}", e);
            DatabaseError::QueryError(format!("Failed to load partners: {}", e))
        })?;

        Ok(partners
            .into_iter()
            .map(|p| (p.id, p.display_name()))
            .collect())
    }
}
