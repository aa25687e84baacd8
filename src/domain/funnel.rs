// Lead -> enrollment -> start funnel counters
use super::error::{AnalyticsError, AnalyticsResult};
use super::identifiers::RepId;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelMetric {
    Leads,
    Enrollments,
    Starts,
}

impl FunnelMetric {
    pub const ALL: [FunnelMetric; 3] = [Self::Leads, Self::Enrollments, Self::Starts];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Enrollments => "enrollments",
            Self::Starts => "starts",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FunnelCounts {
    pub leads: u64,
    pub enrollments: u64,
    pub starts: u64,
}

impl FunnelCounts {
    pub fn new(leads: u64, enrollments: u64, starts: u64) -> Self {
        Self {
            leads,
            enrollments,
            starts,
        }
    }

    pub fn get(&self, metric: FunnelMetric) -> u64 {
        match metric {
            FunnelMetric::Leads => self.leads,
            FunnelMetric::Enrollments => self.enrollments,
            FunnelMetric::Starts => self.starts,
        }
    }

    fn checked_add(self, other: FunnelCounts) -> Option<FunnelCounts> {
        Some(FunnelCounts {
            leads: self.leads.checked_add(other.leads)?,
            enrollments: self.enrollments.checked_add(other.enrollments)?,
            starts: self.starts.checked_add(other.starts)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepFunnel {
    pub rep: RepId,
    pub counts: FunnelCounts,
}

/// Lifetime funnel counters per representative plus the totals declared with them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelTotals {
    reps: Vec<RepFunnel>,
    declared: FunnelCounts,
    computed: FunnelCounts,
}

impl FunnelTotals {
    pub fn new(reps: Vec<RepFunnel>, declared: FunnelCounts) -> AnalyticsResult<Self> {
        let mut seen = HashSet::new();
        let mut computed = FunnelCounts::default();
        for entry in &reps {
            if !seen.insert(&entry.rep) {
                return Err(AnalyticsError::inconsistent(format!(
                    "funnel lists '{}' twice",
                    entry.rep
                )));
            }
            computed = computed.checked_add(entry.counts).ok_or_else(|| {
                AnalyticsError::inconsistent(format!(
                    "funnel counters overflow when adding '{}'",
                    entry.rep
                ))
            })?;
        }
        Ok(Self {
            reps,
            declared,
            computed,
        })
    }

    pub fn reps(&self) -> &[RepFunnel] {
        &self.reps
    }

    pub fn declared(&self) -> FunnelCounts {
        self.declared
    }

    /// Sum over representatives, independent of the declared totals
    pub fn computed(&self) -> FunnelCounts {
        self.computed
    }
}
