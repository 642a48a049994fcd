use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use crate::analysis::states::state_name;
use crate::analysis::types::{OpportunityReport, StateOpportunity};
use crate::analysis::utility::{mean, median, normalize};
use crate::table::{Table, as_number, cell_text};

pub const STATE_NAME_COLUMN: &str = "State Name";
pub const REVENUE_COLUMN: &str = "Total Revenue In Thousands";
pub const LIBRARY_COUNT_COLUMN: &str = "Public Library Count";

/// Poverty rate assumed when school data cannot provide one.
pub const NATIONAL_POVERTY_RATE: f64 = 35.0;

/// Poverty component applied uniformly to every state; school coverage is
/// too thin to rank states on it.
const POVERTY_BASE_SCORE: f64 = 50.0;

/// Weights of each component in the composite opportunity score.
static WEIGHTS: &[(&str, f64)] = &[
    ("capacity", 0.5),
    ("market_size", 0.3),
    ("poverty", 0.2),
];

fn weight(name: &str) -> f64 {
    WEIGHTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// Share of directly certified students across all schools, in percent.
///
/// Falls back to [`NATIONAL_POVERTY_RATE`] when either column is missing or
/// total enrollment is zero.
pub fn poverty_rate(schools: &Table) -> f64 {
    if !schools.has_column("direct_certification") || !schools.has_column("enrollment") {
        return NATIONAL_POVERTY_RATE;
    }

    let certified: f64 = schools.numeric_column("direct_certification").flatten().sum();
    let enrolled: f64 = schools.numeric_column("enrollment").flatten().sum();
    if enrolled <= 0.0 {
        return NATIONAL_POVERTY_RATE;
    }

    let rate = certified / enrolled * 100.0;
    debug!(rate, "Poverty rate from school data");
    rate
}

/// Number of E-Rate rows per full state name.
fn erate_counts(erate: &Table) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for value in erate.column("state").flatten() {
        if let Some(name) = state_name(&cell_text(value)) {
            *counts.entry(name.to_uppercase()).or_insert(0) += 1;
        }
    }
    counts
}

/// Scores every state in a state-level library summary and ranks them.
///
/// Rows without positive revenue and the `NATIONAL` aggregate row are
/// dropped. A missing library count counts as zero.
pub fn score_states(
    libraries: &Table,
    erate: Option<&Table>,
    poverty_rate: f64,
) -> Vec<StateOpportunity> {
    let counts = erate.map(erate_counts);

    let mut rows = Vec::new();
    for i in 0..libraries.len() {
        let Some(name) = libraries.get(i, STATE_NAME_COLUMN).map(cell_text) else {
            continue;
        };
        let name = name.trim().to_string();
        let revenue = libraries
            .get(i, REVENUE_COLUMN)
            .and_then(as_number)
            .unwrap_or(0.0);
        if revenue <= 0.0 || name.is_empty() || name.eq_ignore_ascii_case("NATIONAL") {
            continue;
        }
        let library_count = libraries
            .get(i, LIBRARY_COUNT_COLUMN)
            .and_then(as_number)
            .unwrap_or(0.0);
        rows.push((name, revenue, library_count));
    }

    let revenues: Vec<f64> = rows.iter().map(|(_, r, _)| *r).collect();
    let library_counts: Vec<f64> = rows.iter().map(|(_, _, c)| *c).collect();
    let capacity = normalize(&revenues);
    let market_size = normalize(&library_counts);

    let mut states: Vec<StateOpportunity> = rows
        .into_iter()
        .enumerate()
        .map(|(i, (name, revenue, library_count))| {
            let opportunity = capacity[i] * weight("capacity")
                + market_size[i] * weight("market_size")
                + POVERTY_BASE_SCORE * weight("poverty");
            let erate_applications = counts
                .as_ref()
                .map(|c| c.get(&name.to_uppercase()).copied().unwrap_or(0));

            StateOpportunity {
                state_name: name,
                total_revenue_k: revenue,
                library_count,
                nslp_rate: poverty_rate,
                erate_applications,
                capacity_score: capacity[i],
                market_size_score: market_size[i],
                opportunity_score: opportunity,
            }
        })
        .collect();

    states.sort_by(|a, b| b.opportunity_score.total_cmp(&a.opportunity_score));
    states
}

/// States strictly above the median on both library count and revenue.
pub fn high_priority(states: &[StateOpportunity]) -> Vec<&StateOpportunity> {
    let counts: Vec<f64> = states.iter().map(|s| s.library_count).collect();
    let revenues: Vec<f64> = states.iter().map(|s| s.total_revenue_k).collect();
    let median_count = median(&counts);
    let median_revenue = median(&revenues);

    states
        .iter()
        .filter(|s| s.library_count > median_count && s.total_revenue_k > median_revenue)
        .collect()
}

/// Runs the full scoring pass and collects the headline figures.
pub fn build_report(
    libraries: &Table,
    erate: Option<&Table>,
    schools: Option<&Table>,
) -> OpportunityReport {
    let poverty_rate = schools.map(poverty_rate).unwrap_or(NATIONAL_POVERTY_RATE);
    let states = score_states(libraries, erate, poverty_rate);

    let scores: Vec<f64> = states.iter().map(|s| s.opportunity_score).collect();
    let priority: Vec<String> = high_priority(&states)
        .into_iter()
        .map(|s| s.state_name.clone())
        .collect();
    let min_score = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    info!(
        states = states.len(),
        high_priority = priority.len(),
        top = states.first().map(|s| s.state_name.as_str()).unwrap_or("-"),
        "Opportunity scores calculated"
    );

    OpportunityReport {
        generated_at: Utc::now(),
        poverty_rate,
        mean_score: mean(&scores),
        min_score: if scores.is_empty() { 0.0 } else { min_score },
        max_score: if scores.is_empty() { 0.0 } else { max_score },
        high_priority: priority,
        states,
    }
}
