// HTTP request handlers
use crate::domain::dashboard::{CohortVolumeTotal, FunnelSummary, ProgramInfo, ProgramSummary};
use crate::domain::identifiers::ALL_REPS;
use crate::domain::view::{View, VolumeView};
use crate::infrastructure::http_response::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct RepQuery {
    pub rep: Option<String>,
}

impl RepQuery {
    fn filter(&self) -> &str {
        self.rep.as_deref().unwrap_or(ALL_REPS)
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_programs(State(state): State<Arc<AppState>>) -> Json<Vec<ProgramInfo>> {
    Json(state.dashboard.list_programs())
}

/// Chart data for one program, optionally narrowed to a representative
pub async fn get_view(
    Path(program): Path<String>,
    Query(query): Query<RepQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<View>, ApiError> {
    Ok(Json(state.dashboard.get_view(&program, query.filter())?))
}

/// Summary cards for the same selection as `get_view`
pub async fn get_summary(
    Path(program): Path<String>,
    Query(query): Query<RepQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProgramSummary>, ApiError> {
    let view = state.dashboard.get_view(&program, query.filter())?;
    Ok(Json(state.dashboard.summarize(&view)?))
}

pub async fn get_volume(
    Path(program): Path<String>,
    Query(query): Query<RepQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<VolumeView>, ApiError> {
    Ok(Json(state.dashboard.volume_view(&program, query.filter())?))
}

pub async fn get_cohort_totals(
    Path(program): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CohortVolumeTotal>>, ApiError> {
    Ok(Json(state.dashboard.cohort_totals(&program)?))
}

pub async fn get_funnel(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FunnelSummary>, ApiError> {
    Ok(Json(state.dashboard.funnel_summary()?))
}
