// Dashboard service - Use cases behind each dashboard filter change
use crate::application::aggregator;
use crate::application::dataset_source::DatasetSource;
use crate::application::filter;
use crate::domain::dashboard::{CohortVolumeTotal, FunnelSummary, ProgramInfo, ProgramSummary};
use crate::domain::error::{AnalyticsError, AnalyticsResult};
use crate::domain::identifiers::{ProgramId, RepFilter};
use crate::domain::program::{Dataset, ProgramData};
use crate::domain::view::{View, VolumeView};
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    dataset: Arc<Dataset>,
}

impl DashboardService {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn from_source(source: &dyn DatasetSource) -> anyhow::Result<Self> {
        let dataset = source.load()?;
        tracing::info!(
            "Loaded {} programs from {}",
            dataset.programs().len(),
            source.describe()
        );
        Ok(Self::new(Arc::new(dataset)))
    }

    fn program(&self, program: &str) -> AnalyticsResult<&ProgramData> {
        self.dataset.program(&ProgramId::parse(program)?)
    }

    pub fn list_programs(&self) -> Vec<ProgramInfo> {
        self.dataset
            .programs()
            .iter()
            .map(|p| ProgramInfo {
                id: p.id().clone(),
                title: p.title().to_string(),
                cohort_count: p.cohorts().len(),
            })
            .collect()
    }

    pub fn get_view(&self, program: &str, rep_filter: &str) -> AnalyticsResult<View> {
        let data = self.program(program)?;
        let filter = RepFilter::parse(rep_filter)?;
        let view = filter::reduce(data, &filter)?;
        tracing::debug!(
            "View for {} ({}): {} cohorts, {} reps",
            program,
            rep_filter,
            view.cohorts.len(),
            view.reps.len()
        );
        Ok(view)
    }

    /// Summary cards for a view. The best cohort is measured against the
    /// unfiltered program the view was cut from.
    pub fn summarize(&self, view: &View) -> AnalyticsResult<ProgramSummary> {
        let data = self.dataset.program(&view.program)?;
        let summary = aggregator::summarize(data, view)?;
        match summary.program_average.value() {
            Some(average) => {
                tracing::debug!("Summary for {}: average {:.1}", view.program, average)
            }
            None => tracing::debug!("Summary for {}: no rate data", view.program),
        }
        Ok(summary)
    }

    pub fn funnel_summary(&self) -> AnalyticsResult<FunnelSummary> {
        let funnel = self.dataset.funnel().ok_or(AnalyticsError::EmptyInput {
            what: "funnel counters",
        })?;
        aggregator::funnel_summary(funnel)
    }

    pub fn volume_view(&self, program: &str, rep_filter: &str) -> AnalyticsResult<VolumeView> {
        let data = self.program(program)?;
        filter::reduce_volume(data, &RepFilter::parse(rep_filter)?)
    }

    pub fn cohort_totals(&self, program: &str) -> AnalyticsResult<Vec<CohortVolumeTotal>> {
        Ok(aggregator::cohort_totals(self.program(program)?))
    }
}
