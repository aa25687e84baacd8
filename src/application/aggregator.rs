// Aggregator - descriptive statistics over views and funnel counters
//
// Every function here is pure. Ties are always resolved in favour of the
// leftmost candidate in dataset order.
use crate::domain::dashboard::{
    CohortAverage, CohortVolumeTotal, FunnelShares, FunnelSummary, ProgramAverage,
    ProgramSummary, RepConversion, RepShare, RepStats, TotalMismatch,
};
use crate::domain::error::{AnalyticsError, AnalyticsResult};
use crate::domain::funnel::{FunnelMetric, FunnelTotals};
use crate::domain::program::ProgramData;
use crate::domain::view::View;

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean and population variance per representative. Representatives with no
/// present rate are left out entirely.
pub fn rep_stats(view: &View) -> Vec<RepStats> {
    view.reps
        .iter()
        .filter_map(|series| {
            let values: Vec<f64> = series.present_rates().collect();
            if values.is_empty() {
                return None;
            }
            let avg = mean(&values);
            let variance =
                values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
            Some(RepStats {
                rep: series.rep.clone(),
                mean: avg,
                variance,
                samples: values.len(),
            })
        })
        .collect()
}

/// Left fold that only replaces the current pick when `better` holds
fn select<'a>(
    stats: &'a [RepStats],
    better: impl Fn(&RepStats, &RepStats) -> bool,
) -> AnalyticsResult<&'a RepStats> {
    let mut iter = stats.iter();
    let first = iter.next().ok_or(AnalyticsError::EmptyInput {
        what: "representatives with rate data",
    })?;
    Ok(iter.fold(first, |best, candidate| {
        if better(candidate, best) { candidate } else { best }
    }))
}

pub fn top_performer(stats: &[RepStats]) -> AnalyticsResult<&RepStats> {
    select(stats, |candidate, best| candidate.mean > best.mean)
}

pub fn most_consistent(stats: &[RepStats]) -> AnalyticsResult<&RepStats> {
    select(stats, |candidate, best| candidate.variance < best.variance)
}

/// Cohort of `view` with the highest cross-representative mean.
///
/// Means are taken over every representative of the unfiltered `program`, so a
/// single-representative view still reports the program-wide best cohort.
pub fn best_cohort(program: &ProgramData, view: &View) -> AnalyticsResult<CohortAverage> {
    let mut best: Option<CohortAverage> = None;

    for cohort in &view.cohorts {
        let index = program
            .cohorts()
            .iter()
            .position(|c| c == cohort)
            .ok_or_else(|| {
                AnalyticsError::inconsistent(format!(
                    "cohort '{cohort}' is not part of program '{}'",
                    program.id()
                ))
            })?;

        let values: Vec<f64> = program
            .reps()
            .iter()
            .filter_map(|series| series.rates[index])
            .collect();
        let average = if values.is_empty() { 0.0 } else { mean(&values) };

        let replace = match &best {
            Some(current) => average > current.average,
            None => true,
        };
        if replace {
            best = Some(CohortAverage {
                cohort: cohort.clone(),
                average,
            });
        }
    }

    best.ok_or(AnalyticsError::EmptyInput { what: "cohorts" })
}

pub fn program_average(stats: &[RepStats]) -> ProgramAverage {
    if stats.is_empty() {
        return ProgramAverage::NotAvailable;
    }
    let means: Vec<f64> = stats.iter().map(|s| s.mean).collect();
    ProgramAverage::Available(mean(&means))
}

/// `EmptyInput` becomes `None`; any other condition is still an error
fn unless_empty<T>(result: AnalyticsResult<T>) -> AnalyticsResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AnalyticsError::EmptyInput { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn summarize(program: &ProgramData, view: &View) -> AnalyticsResult<ProgramSummary> {
    let stats = rep_stats(view);
    Ok(ProgramSummary {
        top_performer: unless_empty(top_performer(&stats))?.cloned(),
        most_consistent: unless_empty(most_consistent(&stats))?.cloned(),
        best_cohort: unless_empty(best_cohort(program, view))?,
        program_average: program_average(&stats),
    })
}

fn percent(
    numerator: u64,
    denominator: u64,
    rep: &str,
    metric: &'static str,
) -> AnalyticsResult<f64> {
    if denominator == 0 {
        return Err(AnalyticsError::DivisionByZero {
            representative: rep.to_string(),
            metric,
        });
    }
    Ok(numerator as f64 / denominator as f64 * 100.0)
}

/// Conversion rates per representative, shares of the computed totals, and a
/// warning for every total that disagrees with the declared figure.
pub fn funnel_summary(funnel: &FunnelTotals) -> AnalyticsResult<FunnelSummary> {
    if funnel.reps().is_empty() {
        return Err(AnalyticsError::EmptyInput {
            what: "funnel representatives",
        });
    }

    let per_rep = funnel
        .reps()
        .iter()
        .map(|entry| {
            let rep = entry.rep.as_str();
            Ok(RepConversion {
                rep: entry.rep.clone(),
                lead_to_enroll: percent(
                    entry.counts.enrollments,
                    entry.counts.leads,
                    rep,
                    "lead_to_enroll",
                )?,
                enroll_to_start: percent(
                    entry.counts.starts,
                    entry.counts.enrollments,
                    rep,
                    "enroll_to_start",
                )?,
            })
        })
        .collect::<AnalyticsResult<Vec<_>>>()?;

    let totals = funnel.computed();
    let shares_for = |metric: FunnelMetric| -> AnalyticsResult<Vec<RepShare>> {
        let total = totals.get(metric);
        funnel
            .reps()
            .iter()
            .map(|entry| {
                let count = entry.counts.get(metric);
                Ok(RepShare {
                    rep: entry.rep.clone(),
                    count,
                    percent: percent(count, total, entry.rep.as_str(), metric.as_str())?,
                })
            })
            .collect()
    };
    let shares = FunnelShares {
        leads: shares_for(FunnelMetric::Leads)?,
        enrollments: shares_for(FunnelMetric::Enrollments)?,
        starts: shares_for(FunnelMetric::Starts)?,
    };

    let declared = funnel.declared();
    let warnings: Vec<TotalMismatch> = FunnelMetric::ALL
        .into_iter()
        .filter(|metric| declared.get(*metric) != totals.get(*metric))
        .map(|metric| TotalMismatch {
            metric,
            declared: declared.get(metric),
            computed: totals.get(metric),
        })
        .collect();
    for mismatch in &warnings {
        tracing::warn!(
            "Funnel {} total declared as {} but representatives sum to {}",
            mismatch.metric.as_str(),
            mismatch.declared,
            mismatch.computed
        );
    }

    Ok(FunnelSummary {
        per_rep,
        shares,
        totals,
        warnings,
    })
}

/// Enrollments and starts summed across representatives for each cohort
pub fn cohort_totals(program: &ProgramData) -> Vec<CohortVolumeTotal> {
    program
        .cohorts()
        .iter()
        .enumerate()
        .map(|(index, cohort)| {
            let enrollments: u64 = program
                .volumes()
                .iter()
                .map(|v| u64::from(v.enrollments[index]))
                .sum();
            let starts: u64 = program
                .volumes()
                .iter()
                .map(|v| u64::from(v.starts[index]))
                .sum();
            let start_rate = (enrollments > 0).then(|| starts as f64 / enrollments as f64 * 100.0);
            CohortVolumeTotal {
                cohort: cohort.clone(),
                enrollments,
                starts,
                start_rate,
            }
        })
        .collect()
}
