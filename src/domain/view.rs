// Filtered snapshots of a program handed to the presentation layer
use super::identifiers::ProgramId;
use super::program::{RepresentativeSeries, VolumeSeries};
use serde::Serialize;

/// A program's cohorts with the rate series of one or all representatives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub program: ProgramId,
    pub title: String,
    pub cohorts: Vec<String>,
    pub reps: Vec<RepresentativeSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeView {
    pub program: ProgramId,
    pub title: String,
    pub cohorts: Vec<String>,
    pub reps: Vec<VolumeSeries>,
}
