// Program reference data - cohorts, rate series and volume series
use super::error::{AnalyticsError, AnalyticsResult};
use super::funnel::FunnelTotals;
use super::identifiers::{ProgramId, RepId};
use serde::Serialize;
use std::collections::HashSet;

/// Start-rate series of one representative, aligned with the program's cohorts.
///
/// `total` is the lifetime rate supplied with the data. It is not derived from
/// `rates` and is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepresentativeSeries {
    pub rep: RepId,
    pub rates: Vec<Option<f64>>,
    pub total: f64,
}

impl RepresentativeSeries {
    pub fn new(rep: RepId, rates: Vec<Option<f64>>, total: f64) -> Self {
        Self { rep, rates, total }
    }

    /// Rates with missing positions dropped
    pub fn present_rates(&self) -> impl Iterator<Item = f64> + '_ {
        self.rates.iter().flatten().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSeries {
    pub rep: RepId,
    pub enrollments: Vec<u32>,
    pub starts: Vec<u32>,
}

impl VolumeSeries {
    pub fn new(rep: RepId, enrollments: Vec<u32>, starts: Vec<u32>) -> Self {
        Self {
            rep,
            enrollments,
            starts,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramData {
    id: ProgramId,
    title: String,
    cohorts: Vec<String>,
    reps: Vec<RepresentativeSeries>,
    volumes: Vec<VolumeSeries>,
}

impl ProgramData {
    /// Builds a program, checking that every series lines up with the cohorts
    pub fn new(
        id: ProgramId,
        title: String,
        cohorts: Vec<String>,
        reps: Vec<RepresentativeSeries>,
        volumes: Vec<VolumeSeries>,
    ) -> AnalyticsResult<Self> {
        if cohorts.is_empty() {
            return Err(AnalyticsError::inconsistent(format!(
                "program '{id}' has no cohorts"
            )));
        }

        let mut seen = HashSet::new();
        for cohort in &cohorts {
            if !seen.insert(cohort.as_str()) {
                return Err(AnalyticsError::inconsistent(format!(
                    "program '{id}' lists cohort '{cohort}' twice"
                )));
            }
        }

        let expected = cohorts.len();
        let mut seen = HashSet::new();
        for series in &reps {
            if !seen.insert(&series.rep) {
                return Err(AnalyticsError::inconsistent(format!(
                    "program '{id}' has two rate series for '{}'",
                    series.rep
                )));
            }
            check_len(&id, &series.rep, "rates", series.rates.len(), expected)?;
            let finite = series.present_rates().all(f64::is_finite) && series.total.is_finite();
            if !finite {
                return Err(AnalyticsError::inconsistent(format!(
                    "program '{id}' has a non-finite rate for '{}'",
                    series.rep
                )));
            }
        }

        let mut seen = HashSet::new();
        for series in &volumes {
            if !seen.insert(&series.rep) {
                return Err(AnalyticsError::inconsistent(format!(
                    "program '{id}' has two volume series for '{}'",
                    series.rep
                )));
            }
            check_len(&id, &series.rep, "enrollments", series.enrollments.len(), expected)?;
            check_len(&id, &series.rep, "starts", series.starts.len(), expected)?;
        }

        Ok(Self {
            id,
            title,
            cohorts,
            reps,
            volumes,
        })
    }

    pub fn id(&self) -> &ProgramId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cohorts(&self) -> &[String] {
        &self.cohorts
    }

    pub fn reps(&self) -> &[RepresentativeSeries] {
        &self.reps
    }

    pub fn volumes(&self) -> &[VolumeSeries] {
        &self.volumes
    }
}

fn check_len(
    program: &ProgramId,
    rep: &RepId,
    series: &str,
    actual: usize,
    expected: usize,
) -> AnalyticsResult<()> {
    if actual != expected {
        return Err(AnalyticsError::inconsistent(format!(
            "program '{program}': {series} series for '{rep}' has {actual} entries, expected {expected}"
        )));
    }
    Ok(())
}

/// The whole immutable reference dataset, loaded once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    programs: Vec<ProgramData>,
    funnel: Option<FunnelTotals>,
}

impl Dataset {
    pub fn new(programs: Vec<ProgramData>, funnel: Option<FunnelTotals>) -> AnalyticsResult<Self> {
        let mut seen = HashSet::new();
        for program in &programs {
            if !seen.insert(program.id()) {
                return Err(AnalyticsError::inconsistent(format!(
                    "program '{}' is defined twice",
                    program.id()
                )));
            }
        }
        Ok(Self { programs, funnel })
    }

    pub fn programs(&self) -> &[ProgramData] {
        &self.programs
    }

    pub fn funnel(&self) -> Option<&FunnelTotals> {
        self.funnel.as_ref()
    }

    pub fn program(&self, id: &ProgramId) -> AnalyticsResult<&ProgramData> {
        self.programs
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| AnalyticsError::program_not_found(id.as_str()))
    }
}
