// Raw CCS admissions exports -> summary rows
use crate::application::dataset_source::DatasetSource;
use crate::domain::program::Dataset;
use crate::infrastructure::summary_csv::{
    SummaryRow, cohort_number, dataset_from_summary, start_rate, write_summary,
};
use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Metadata lines the admissions system writes above the column headers
const HEADER_ROWS_TO_SKIP: usize = 6;
/// Statuses that count as a start
const START_STATUSES: [&str; 3] = ["Active", "Drop", "Grad"];

const COL_REP: &str = "Lead Rep";
const COL_COHORT: &str = "CCS Cohort";
const COL_STATUS: &str = "CCS Status";
const COL_ENROLL_TYPE: &str = "Enroll Type";
const COL_ID: &str = "ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub id: Option<String>,
    pub rep: String,
    pub cohort: String,
    pub status: String,
    pub enroll_type: String,
}

/// Program code from a cohort label: NDT560 -> NDT, UDT559NC -> UDT-NC
pub fn program_code(cohort: &str) -> &'static str {
    let name = cohort.trim().to_uppercase();
    if name.is_empty() {
        return "Unknown";
    }
    let ndt = name.contains("NDT");
    let udt = name.contains("UDT");
    if name.contains("NC") {
        if ndt {
            return "NDT-NC";
        }
        if udt {
            return "UDT-NC";
        }
        return "Other";
    }
    match (ndt, udt) {
        (true, _) => "NDT",
        (false, true) => "UDT",
        _ => "Other",
    }
}

/// Parses one export. Returns `None` when a required column is missing.
pub fn parse_export(text: &str) -> anyhow::Result<Option<Vec<ExportRecord>>> {
    let body: String = text
        .lines()
        .skip(HEADER_ROWS_TO_SKIP)
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("Export has no header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let (Some(rep_idx), Some(cohort_idx), Some(status_idx), Some(type_idx)) = (
        column(COL_REP),
        column(COL_COHORT),
        column(COL_STATUS),
        column(COL_ENROLL_TYPE),
    ) else {
        tracing::warn!(
            "Export needs columns {:?}, found {:?}",
            [COL_REP, COL_COHORT, COL_STATUS, COL_ENROLL_TYPE],
            headers
        );
        return Ok(None);
    };
    let id_idx = column(COL_ID);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.context("Malformed export row")?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let cohort = field(cohort_idx);
        if cohort.is_empty() {
            continue;
        }
        let rep = match field(rep_idx) {
            "" => "Unassigned",
            rep => rep,
        };
        let enroll_type = match field(type_idx) {
            "" => "NEW".to_string(),
            kind => kind.to_uppercase(),
        };

        records.push(ExportRecord {
            id: id_idx.map(field).filter(|id| !id.is_empty()).map(str::to_string),
            rep: rep.to_string(),
            cohort: cohort.to_string(),
            status: field(status_idx).to_string(),
            enroll_type,
        });
    }

    Ok(Some(records))
}

/// Keeps the last record per (student ID, cohort); records without an ID are kept
pub fn dedupe(records: Vec<ExportRecord>) -> Vec<ExportRecord> {
    let mut last: HashMap<(String, String), usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        if let Some(id) = &record.id {
            last.insert((id.clone(), record.cohort.clone()), idx);
        }
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(idx, record)| match &record.id {
            Some(id) => last.get(&(id.clone(), record.cohort.clone())) == Some(idx),
            None => true,
        })
        .map(|(_, record)| record)
        .collect()
}

fn is_start(record: &ExportRecord) -> bool {
    START_STATUSES.contains(&record.status.as_str()) && record.enroll_type != "REENROLL"
}

/// Groups records by (cohort, rep). Rows come out ordered by program, then
/// cohort number descending, then rep.
pub fn aggregate(records: &[ExportRecord]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(&str, &str), Vec<&ExportRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.cohort.as_str(), record.rep.as_str()))
            .or_default()
            .push(record);
    }

    let mut rows: Vec<SummaryRow> = groups
        .into_iter()
        .map(|((cohort, rep), group)| {
            let count_type =
                |kind: &str| group.iter().filter(|r| r.enroll_type == kind).count() as u32;
            let enrollments = group.len() as u32;
            let starts = group.iter().filter(|r| is_start(r)).count() as u32;
            SummaryRow {
                cohort: cohort.to_string(),
                program: program_code(cohort).to_string(),
                rep: rep.to_string(),
                enrollments,
                starts,
                start_rate: start_rate(starts.into(), enrollments.into()),
                new: count_type("NEW"),
                transfer: count_type("TRANSFER"),
                reenroll: count_type("REENROLL"),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.program
            .cmp(&b.program)
            .then_with(|| cohort_number(&b.cohort).cmp(&cohort_number(&a.cohort)))
            .then_with(|| a.rep.cmp(&b.rep))
    });
    rows
}

/// Processes every `*.csv` export in `dir`, in file-name order
pub fn process_directory(dir: &Path) -> anyhow::Result<Vec<SummaryRow>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list exports in {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    files.sort();

    let mut records = Vec::new();
    for path in &files {
        let parsed = std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| parse_export(&text));
        match parsed {
            Ok(Some(mut file_records)) => {
                tracing::info!("Processed {} ({} records)", path.display(), file_records.len());
                records.append(&mut file_records);
            }
            Ok(None) => tracing::warn!("Skipped {}: missing required columns", path.display()),
            Err(e) => tracing::warn!("Skipped {}: {:#}", path.display(), e),
        }
    }

    let before = records.len();
    let records = dedupe(records);
    if records.len() < before {
        tracing::info!("Removed {} duplicate records", before - records.len());
    }

    Ok(aggregate(&records))
}

#[derive(Debug, Clone)]
pub struct CcsExportDataset {
    dir: PathBuf,
    summary_out: Option<PathBuf>,
}

impl CcsExportDataset {
    pub fn new(dir: impl Into<PathBuf>, summary_out: Option<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            summary_out,
        }
    }
}

impl DatasetSource for CcsExportDataset {
    fn describe(&self) -> String {
        format!("CCS exports in {}", self.dir.display())
    }

    fn load(&self) -> anyhow::Result<Dataset> {
        let rows = process_directory(&self.dir)?;
        if rows.is_empty() {
            anyhow::bail!("No usable CCS export records in {}", self.dir.display());
        }
        if let Some(path) = &self.summary_out {
            write_summary(path, &rows)?;
            tracing::info!("Summary saved to {} ({} rows)", path.display(), rows.len());
        }
        dataset_from_summary(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifiers::ProgramId;

    const METADATA: &str = "STARS Export\nReport: CCS\nRun by: admin\nDate: 2025-01-01\n\n,,,\n";

    fn export(rows: &str) -> String {
        format!("{METADATA}ID, Lead Rep ,CCS Cohort,CCS Status,Enroll Type\n{rows}")
    }

    fn record(id: &str, rep: &str, cohort: &str, status: &str, kind: &str) -> ExportRecord {
        ExportRecord {
            id: Some(id.to_string()),
            rep: rep.to_string(),
            cohort: cohort.to_string(),
            status: status.to_string(),
            enroll_type: kind.to_string(),
        }
    }

    #[test]
    fn test_program_code() {
        assert_eq!(program_code("NDT560"), "NDT");
        assert_eq!(program_code("ndt560nc"), "NDT-NC");
        assert_eq!(program_code("UDT559"), "UDT");
        assert_eq!(program_code("UDT559NC"), "UDT-NC");
        assert_eq!(program_code("XYZ1"), "Other");
        assert_eq!(program_code(""), "Unknown");
    }

    #[test]
    fn parses_after_metadata_and_fills_blanks() {
        let text = export("1,Cori,NDT551,Active,new\n2,,NDT551,Drop,\n3,Randy,,Active,NEW\n");
        let records = parse_export(&text).unwrap().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].enroll_type, "NEW");
        assert_eq!(records[1].rep, "Unassigned");
        assert_eq!(records[1].enroll_type, "NEW");
    }

    #[test]
    fn missing_columns_skip_the_file() {
        let text = format!("{METADATA}Lead Rep,CCS Cohort\nCori,NDT551\n");
        assert_eq!(parse_export(&text).unwrap(), None);
    }

    #[test]
    fn columns_are_found_by_name() {
        let text = format!(
            "{METADATA}Enroll Type,CCS Status,Campus,CCS Cohort,Lead Rep\ntransfer,Grad,North,UDT551NC,Thomas\n"
        );
        let records = parse_export(&text).unwrap().unwrap();
        assert_eq!(records[0].rep, "Thomas");
        assert_eq!(records[0].cohort, "UDT551NC");
        assert_eq!(records[0].enroll_type, "TRANSFER");
        assert_eq!(records[0].id, None);
    }

    #[test]
    fn reenrollments_do_not_count_as_starts() {
        let records = vec![
            record("1", "Cori", "NDT551", "Active", "NEW"),
            record("2", "Cori", "NDT551", "Grad", "REENROLL"),
            record("3", "Cori", "NDT551", "Pending", "TRANSFER"),
            record("4", "Cori", "NDT551", "Drop", "NEW"),
        ];
        let rows = aggregate(&records);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.enrollments, 4);
        assert_eq!(row.starts, 2);
        assert_eq!(row.start_rate, 50.0);
        assert_eq!((row.new, row.transfer, row.reenroll), (2, 1, 1));
    }

    #[test]
    fn rows_sorted_by_program_then_cohort_descending() {
        let records = vec![
            record("1", "Randy", "UDT551", "Active", "NEW"),
            record("2", "Randy", "NDT551", "Active", "NEW"),
            record("3", "Cori", "NDT552", "Active", "NEW"),
            record("4", "Randy", "NDT552", "Active", "NEW"),
        ];
        let order: Vec<(String, String)> = aggregate(&records)
            .into_iter()
            .map(|r| (r.cohort, r.rep))
            .collect();
        assert_eq!(
            order,
            vec![
                ("NDT552".to_string(), "Cori".to_string()),
                ("NDT552".to_string(), "Randy".to_string()),
                ("NDT551".to_string(), "Randy".to_string()),
                ("UDT551".to_string(), "Randy".to_string()),
            ]
        );
    }

    #[test]
    fn dedupe_keeps_last_occurrence() {
        let records = vec![
            record("7", "Cori", "NDT551", "Pending", "NEW"),
            record("8", "Sue", "NDT551", "Active", "NEW"),
            record("7", "Cori", "NDT551", "Active", "NEW"),
            record("7", "Cori", "NDT552", "Active", "NEW"),
        ];
        let kept = dedupe(records);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[1].status, "Active");
        assert_eq!(kept[1].rep, "Cori");
    }

    #[test]
    fn records_without_id_are_all_kept() {
        let mut first = record("", "Sue", "NDT551", "Active", "NEW");
        first.id = None;
        let mut second = first.clone();
        second.status = "Pending".to_string();
        assert_eq!(dedupe(vec![first, second]).len(), 2);
    }

    #[test]
    fn directory_becomes_a_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("CCS-N551.csv"),
            export("1,Cori,NDT551,Pending,NEW\n2,Cori,NDT551,Active,NEW\n"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("CCS-N552.csv"),
            export("1,Cori,NDT551,Active,NEW\n5,Sue,UDT551,Grad,NEW\n"),
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let summary = dir.path().join("summary.csv");
        let dataset = CcsExportDataset::new(dir.path(), Some(summary.clone()))
            .load()
            .unwrap();
        assert!(summary.exists());

        let day = dataset.program(&ProgramId::parse("ndt-day").unwrap()).unwrap();
        // student 1 appears in both exports; the later one wins
        assert_eq!(day.volumes()[0].enrollments, vec![2]);
        assert_eq!(day.volumes()[0].starts, vec![2]);

        let combined = dataset.program(&ProgramId::parse("combined").unwrap()).unwrap();
        assert_eq!(combined.cohorts(), ["551"]);
        assert_eq!(combined.reps().len(), 2);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CcsExportDataset::new(dir.path(), None).load().is_err());
    }
}
