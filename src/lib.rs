//! ADPANEL Manager Panel Service Library
//!
//! This library provides the metrics-aggregation core behind the manager
//! panel dashboard: period resolution, traffic loading, summary and
//! secondary metric computation, and the per-partner time-bucket breakdown.

pub mod application;
pub mod config;
pub mod domain;
pub mod persistence;

use persistence::DbPool;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}
