//! Insert payloads for the write path. Read models live in
//! `domain::entities` and are mapped straight off the rows.

use chrono::{NaiveDate, NaiveDateTime};

/// Payload for inserting a partner.
#[derive(Debug, Clone, Default)]
pub struct NewPartner {
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

/// Payload for inserting a traffic record.
#[derive(Debug, Clone, Default)]
pub struct NewTraffic {
    pub partner_id: Option<i64>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub leads: Option<i64>,
    pub ad_investment: Option<f64>,
    pub roas: Option<f64>,
    pub observation: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Insertion timestamp; `None` uses the current time.
    pub created_at: Option<NaiveDateTime>,
}
