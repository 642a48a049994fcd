//! Data types produced by the opportunity analysis.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scores for a single state, one CSV row in the exported ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateOpportunity {
    pub state_name: String,
    pub total_revenue_k: f64,
    pub library_count: f64,
    pub nslp_rate: f64,
    /// E-Rate rows filed from the state, when E-Rate data was supplied.
    pub erate_applications: Option<usize>,
    pub capacity_score: f64,
    pub market_size_score: f64,
    pub opportunity_score: f64,
}

/// Complete result of one scoring run.
#[derive(Debug, Serialize)]
pub struct OpportunityReport {
    pub generated_at: DateTime<Utc>,
    pub poverty_rate: f64,
    /// Ranked best first.
    pub states: Vec<StateOpportunity>,
    /// States above the median on both library count and revenue.
    pub high_priority: Vec<String>,
    pub mean_score: f64,
    pub min_score: f64,
    pub max_score: f64,
}
