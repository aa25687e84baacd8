// Per-cohort, per-rep summary rows and their conversion into the dataset
use crate::application::dataset_source::DatasetSource;
use crate::domain::error::{AnalyticsError, AnalyticsResult};
use crate::domain::identifiers::{ProgramId, RepId};
use crate::domain::program::{Dataset, ProgramData, RepresentativeSeries, VolumeSeries};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// One row of the processed summary: a representative's volume in one cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryRow {
    pub cohort: String,
    pub program: String,
    pub rep: String,
    pub enrollments: u32,
    pub starts: u32,
    pub start_rate: f64,
    pub new: u32,
    pub transfer: u32,
    pub reenroll: u32,
}

const COMBINED: (&str, &str) = ("combined", "Combined Programs (NDT + UDT)");

/// Summary program code -> (dashboard key, title)
const PROGRAMS: [(&str, &str, &str); 4] = [
    ("NDT", "ndt-day", "NDT Day Classes"),
    ("NDT-NC", "ndt-night", "NDT Night Classes"),
    ("UDT", "udt", "UDT Classes"),
    ("UDT-NC", "udt-night", "UDT Night Classes"),
];

/// One decimal, ties to even on the exact binary value (2.25 -> 2.2)
pub fn round1(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Start rate in percent, one decimal, zero without enrollments
pub fn start_rate(starts: u64, enrollments: u64) -> f64 {
    if enrollments == 0 {
        return 0.0;
    }
    round1(starts as f64 / enrollments as f64 * 100.0)
}

/// Numeric part of a cohort label ("NDT560NC" -> 560), zero when there is none
pub fn cohort_number(label: &str) -> u32 {
    label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

#[derive(Default)]
struct ProgramRows {
    cohorts: BTreeSet<(u32, String)>,
    cells: HashMap<(String, String), (u32, u32)>,
}

impl ProgramRows {
    fn add(
        &mut self,
        cohort: String,
        rep: &str,
        enrollments: u32,
        starts: u32,
    ) -> AnalyticsResult<()> {
        self.cohorts.insert((cohort_number(&cohort), cohort.clone()));
        let cell = self.cells.entry((cohort.clone(), rep.to_string())).or_default();
        match (cell.0.checked_add(enrollments), cell.1.checked_add(starts)) {
            (Some(enrolled), Some(started)) => {
                *cell = (enrolled, started);
                Ok(())
            }
            _ => Err(AnalyticsError::inconsistent(format!(
                "volume for '{rep}' in cohort {cohort} overflows"
            ))),
        }
    }

    fn into_program(self, id: &str, title: &str) -> anyhow::Result<ProgramData> {
        let cohorts: Vec<String> = self.cohorts.into_iter().map(|(_, label)| label).collect();
        let reps: BTreeSet<&str> = self.cells.keys().map(|(_, rep)| rep.as_str()).collect();

        let mut rates = Vec::new();
        let mut volumes = Vec::new();
        for rep in reps {
            let rep_id = RepId::parse(rep)?;
            let mut values = Vec::with_capacity(cohorts.len());
            let mut enrollments = Vec::with_capacity(cohorts.len());
            let mut starts = Vec::with_capacity(cohorts.len());
            for cohort in &cohorts {
                match self.cells.get(&(cohort.clone(), rep.to_string())) {
                    Some(&(enrolled, started)) => {
                        values.push(Some(start_rate(started.into(), enrolled.into())));
                        enrollments.push(enrolled);
                        starts.push(started);
                    }
                    None => {
                        values.push(None);
                        enrollments.push(0);
                        starts.push(0);
                    }
                }
            }
            let total = start_rate(
                starts.iter().copied().map(u64::from).sum(),
                enrollments.iter().copied().map(u64::from).sum(),
            );
            rates.push(RepresentativeSeries::new(rep_id.clone(), values, total));
            volumes.push(VolumeSeries::new(rep_id, enrollments, starts));
        }

        Ok(ProgramData::new(
            ProgramId::parse(id)?,
            title.to_string(),
            cohorts,
            rates,
            volumes,
        )?)
    }
}

/// Builds the dashboard dataset from summary rows.
///
/// Lifetime totals are derived from the summed volumes since the summary
/// carries no separately sourced figure. No funnel counters are produced.
pub fn dataset_from_summary(rows: &[SummaryRow]) -> anyhow::Result<Dataset> {
    let mut combined = ProgramRows::default();
    let mut by_program: BTreeMap<&str, ProgramRows> = BTreeMap::new();

    for row in rows {
        let Some(&(code, _, _)) = PROGRAMS.iter().find(|(code, _, _)| *code == row.program) else {
            tracing::warn!(
                "Skipping summary row for cohort {} with unmapped program {}",
                row.cohort,
                row.program
            );
            continue;
        };

        by_program
            .entry(code)
            .or_default()
            .add(row.cohort.clone(), &row.rep, row.enrollments, row.starts)?;

        if code == "NDT" || code == "UDT" {
            match cohort_number(&row.cohort) {
                0 => tracing::warn!("Cohort {} has no number, left out of combined", row.cohort),
                number => {
                    combined.add(number.to_string(), &row.rep, row.enrollments, row.starts)?
                }
            }
        }
    }

    let mut programs = Vec::new();
    if !combined.cells.is_empty() {
        programs.push(combined.into_program(COMBINED.0, COMBINED.1)?);
    }
    for (code, id, title) in PROGRAMS {
        if let Some(rows) = by_program.remove(code) {
            programs.push(rows.into_program(id, title)?);
        }
    }

    Ok(Dataset::new(programs, None)?)
}

pub fn read_summary(path: &Path) -> anyhow::Result<Vec<SummaryRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open summary {}", path.display()))?;
    let mut rows = Vec::new();
    for result in reader.deserialize::<SummaryRow>() {
        rows.push(result.with_context(|| format!("Bad summary row in {}", path.display()))?);
    }
    Ok(rows)
}

pub fn write_summary(path: &Path, rows: &[SummaryRow]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create summary {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SummaryCsvDataset {
    path: PathBuf,
}

impl SummaryCsvDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for SummaryCsvDataset {
    fn describe(&self) -> String {
        format!("summary CSV {}", self.path.display())
    }

    fn load(&self) -> anyhow::Result<Dataset> {
        dataset_from_summary(&read_summary(&self.path)?)
    }
}
