// Dashboard result models - what the aggregator hands to the presentation layer
use super::funnel::{FunnelCounts, FunnelMetric};
use super::identifiers::{ProgramId, RepId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramInfo {
    pub id: ProgramId,
    pub title: String,
    pub cohort_count: usize,
}

/// Mean and population variance of one representative's present rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepStats {
    pub rep: RepId,
    pub mean: f64,
    pub variance: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortAverage {
    pub cohort: String,
    pub average: f64,
}

/// Mean of the per-representative means, or `NotAvailable` when nobody has data
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ProgramAverage {
    Available(f64),
    NotAvailable,
}

impl ProgramAverage {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Available(v) => Some(*v),
            Self::NotAvailable => None,
        }
    }
}

/// Summary cards. Ranking fields are `None` when no representative in the
/// selection has rate data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
    pub top_performer: Option<RepStats>,
    pub most_consistent: Option<RepStats>,
    pub best_cohort: Option<CohortAverage>,
    pub program_average: ProgramAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepConversion {
    pub rep: RepId,
    pub lead_to_enroll: f64,
    pub enroll_to_start: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepShare {
    pub rep: RepId,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelShares {
    pub leads: Vec<RepShare>,
    pub enrollments: Vec<RepShare>,
    pub starts: Vec<RepShare>,
}

/// A computed sum that disagrees with the total declared alongside the data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalMismatch {
    pub metric: FunnelMetric,
    pub declared: u64,
    pub computed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelSummary {
    pub per_rep: Vec<RepConversion>,
    pub shares: FunnelShares,
    pub totals: FunnelCounts,
    pub warnings: Vec<TotalMismatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortVolumeTotal {
    pub cohort: String,
    pub enrollments: u64,
    pub starts: u64,
    /// `None` when the cohort had no enrollments
    pub start_rate: Option<f64>,
}
