// JSON dataset format and the file-backed source
use crate::application::dataset_source::DatasetSource;
use crate::domain::funnel::{FunnelCounts, FunnelTotals, RepFunnel};
use crate::domain::identifiers::{ProgramId, RepId};
use crate::domain::program::{Dataset, ProgramData, RepresentativeSeries, VolumeSeries};
use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct DatasetFile {
    programs: Vec<ProgramRecord>,
    #[serde(default)]
    funnel: Option<FunnelRecord>,
}

#[derive(Debug, Deserialize)]
struct ProgramRecord {
    id: String,
    title: String,
    cohorts: Vec<String>,
    rates: Vec<RateRecord>,
    #[serde(default)]
    volume: Vec<VolumeRecord>,
}

#[derive(Debug, Deserialize)]
struct RateRecord {
    rep: String,
    values: Vec<Option<f64>>,
    total: f64,
}

#[derive(Debug, Deserialize)]
struct VolumeRecord {
    rep: String,
    enrollments: Vec<u32>,
    starts: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct FunnelRecord {
    reps: Vec<FunnelRepRecord>,
    totals: CountsRecord,
}

#[derive(Debug, Deserialize)]
struct FunnelRepRecord {
    rep: String,
    #[serde(flatten)]
    counts: CountsRecord,
}

#[derive(Debug, Deserialize)]
struct CountsRecord {
    leads: u64,
    enrollments: u64,
    starts: u64,
}

impl From<CountsRecord> for FunnelCounts {
    fn from(record: CountsRecord) -> Self {
        FunnelCounts::new(record.leads, record.enrollments, record.starts)
    }
}

fn program_from_record(record: ProgramRecord) -> anyhow::Result<ProgramData> {
    let id = ProgramId::parse(&record.id)?;

    let reps = record
        .rates
        .into_iter()
        .map(|r| -> anyhow::Result<_> {
            Ok(RepresentativeSeries::new(RepId::parse(&r.rep)?, r.values, r.total))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let volumes = record
        .volume
        .into_iter()
        .map(|v| -> anyhow::Result<_> {
            Ok(VolumeSeries::new(RepId::parse(&v.rep)?, v.enrollments, v.starts))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    ProgramData::new(id, record.title, record.cohorts, reps, volumes)
        .with_context(|| format!("invalid program '{}'", record.id))
}

fn funnel_from_record(record: FunnelRecord) -> anyhow::Result<FunnelTotals> {
    let reps = record
        .reps
        .into_iter()
        .map(|r| -> anyhow::Result<_> {
            Ok(RepFunnel {
                rep: RepId::parse(&r.rep)?,
                counts: r.counts.into(),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(FunnelTotals::new(reps, record.totals.into())?)
}

/// Parses and validates a dataset document
pub fn parse_dataset(json: &str) -> anyhow::Result<Dataset> {
    let file: DatasetFile = serde_json::from_str(json).context("Failed to parse dataset JSON")?;

    let programs = file
        .programs
        .into_iter()
        .map(program_from_record)
        .collect::<anyhow::Result<Vec<_>>>()?;
    let funnel = file.funnel.map(funnel_from_record).transpose()?;

    Ok(Dataset::new(programs, funnel)?)
}

#[derive(Debug, Clone)]
pub struct JsonFileDataset {
    path: PathBuf,
}

impl JsonFileDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for JsonFileDataset {
    fn describe(&self) -> String {
        format!("JSON file {}", self.path.display())
    }

    fn load(&self) -> anyhow::Result<Dataset> {
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        parse_dataset(&json).with_context(|| format!("Invalid dataset in {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AnalyticsError;
    use std::io::Write;

    const SMALL: &str = r#"{
        "programs": [{
            "id": "udt",
            "title": "UDT Classes",
            "cohorts": ["UDT551", "UDT552"],
            "rates": [{ "rep": "Sue", "values": [null, 2.7], "total": 5.8 }],
            "volume": [{ "rep": "Sue", "enrollments": [0, 37], "starts": [0, 1] }]
        }]
    }"#;

    #[test]
    fn test_parse_dataset() {
        let dataset = parse_dataset(SMALL).unwrap();
        let program = dataset.program(&ProgramId::parse("udt").unwrap()).unwrap();
        assert_eq!(program.reps()[0].rates, vec![None, Some(2.7)]);
        assert_eq!(program.volumes()[0].enrollments, vec![0, 37]);
        assert!(dataset.funnel().is_none());
    }

    #[test]
    fn volume_length_mismatch_is_a_consistency_error() {
        let json = SMALL.replace("\"starts\": [0, 1]", "\"starts\": [0, 1, 4]");
        let err = parse_dataset(&json).unwrap_err();
        let cause = err.downcast_ref::<AnalyticsError>().unwrap();
        assert!(matches!(cause, AnalyticsError::DataConsistency { .. }));
    }

    #[test]
    fn funnel_section_is_read() {
        let json = r#"{
            "programs": [],
            "funnel": {
                "reps": [{ "rep": "Thomas", "leads": 2933, "enrollments": 312, "starts": 53 }],
                "totals": { "leads": 2933, "enrollments": 312, "starts": 53 }
            }
        }"#;
        let dataset = parse_dataset(json).unwrap();
        let funnel = dataset.funnel().unwrap();
        assert_eq!(funnel.reps()[0].counts, FunnelCounts::new(2933, 312, 53));
        assert_eq!(funnel.declared(), funnel.computed());
    }

    #[test]
    fn overflowing_funnel_is_rejected_at_load() {
        let json = r#"{
            "programs": [],
            "funnel": {
                "reps": [
                    { "rep": "Randy", "leads": 10000000000000000000, "enrollments": 1, "starts": 1 },
                    { "rep": "Cori", "leads": 10000000000000000000, "enrollments": 1, "starts": 1 }
                ],
                "totals": { "leads": 1, "enrollments": 2, "starts": 2 }
            }
        }"#;
        let err = parse_dataset(json).unwrap_err();
        let cause = err.downcast_ref::<AnalyticsError>().unwrap();
        assert!(matches!(cause, AnalyticsError::DataConsistency { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();

        let source = JsonFileDataset::new(file.path());
        assert_eq!(source.load().unwrap().programs().len(), 1);

        let missing = JsonFileDataset::new("/nonexistent/dataset.json");
        assert!(missing.load().is_err());
    }
}
