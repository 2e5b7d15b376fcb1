use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{AppError, ErrorBody};
use crate::jobs::{self, DateRangeParams, JobsById, PublicJobView};
use crate::AppState;

static DATE_FROM_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+_a-zA-Z0-9]+$").expect("date_from pattern compiles"));

/// The upper bound takes neither `_` nor `+`, so relative expressions only work as lower bounds.
static DATE_TO_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9]+$").expect("date_to pattern compiles"));

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct JobPath {
    /// Post id of the job listing, digits only
    pub id: String,
}

impl JobPath {
    /// Non-digit ids never match the route; ids too large for a post id match
    /// but cannot name a job.
    pub fn post_id(&self) -> Result<u64, AppError> {
        if self.id.is_empty() || !self.id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::RouteNotFound);
        }
        self.id.parse::<u64>().map_err(|_| AppError::InvalidJob)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct JobsFromPath {
    /// Lower bound, inclusive. A date such as `2017`, `2017-06` or `2017-06-01`,
    /// or a relative expression with underscores for spaces, e.g. `last_month`
    pub date_from: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct JobsRangePath {
    /// Lower bound, inclusive
    pub date_from: String,
    /// Upper bound, inclusive. Letters, digits and `-` only, e.g. `2017` or `2017-06-30`
    pub date_to: String,
}

fn date_segment<'a>(pattern: &Regex, segment: &'a str) -> Result<&'a str, AppError> {
    if pattern.is_match(segment) {
        Ok(segment)
    } else {
        Err(AppError::RouteNotFound)
    }
}

/// Fetch a single public job listing
#[utoipa::path(
    get,
    path = "/wp-json/wpjm_public/v1/job/{id}",
    params(JobPath),
    responses(
        (status = 200, description = "The job listing", body = PublicJobView),
        (status = 404, description = "No published or expired job listing with this id", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_job(
    State(state): State<AppState>,
    Path(path): Path<JobPath>,
) -> Result<Json<PublicJobView>, AppError> {
    let id = path.post_id()?;
    let job = jobs::get_job(state.store.as_ref(), &state.filter, id).await?;
    Ok(Json(job))
}

/// Latest job listings, without a date filter
#[utoipa::path(
    get,
    path = "/wp-json/wpjm_public/v1/jobs",
    responses(
        (status = 200, description = "Up to 1000 job listings keyed by post id, newest first", body = HashMap<String, PublicJobView>)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_jobs(State(state): State<AppState>) -> Result<Json<JobsById>, AppError> {
    let jobs = jobs::get_jobs(state.store.as_ref(), &state.filter, DateRangeParams::default()).await?;
    Ok(Json(jobs))
}

/// Job listings published on or after a date
#[utoipa::path(
    get,
    path = "/wp-json/wpjm_public/v1/jobs/{date_from}",
    params(JobsFromPath),
    responses(
        (status = 200, description = "Matching job listings keyed by post id, newest first", body = HashMap<String, PublicJobView>),
        (status = 404, description = "Malformed date segment", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_jobs_from(
    State(state): State<AppState>,
    Path(path): Path<JobsFromPath>,
) -> Result<Json<JobsById>, AppError> {
    let date_from = date_segment(&DATE_FROM_SEGMENT, &path.date_from)?;
    let params = DateRangeParams::from_segments(Some(date_from), None);
    let jobs = jobs::get_jobs(state.store.as_ref(), &state.filter, params).await?;
    Ok(Json(jobs))
}

/// Job listings published within an inclusive date range
#[utoipa::path(
    get,
    path = "/wp-json/wpjm_public/v1/jobs/{date_from}/{date_to}",
    params(JobsRangePath),
    responses(
        (status = 200, description = "Matching job listings keyed by post id, newest first", body = HashMap<String, PublicJobView>),
        (status = 404, description = "Malformed date segment", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_jobs_range(
    State(state): State<AppState>,
    Path(path): Path<JobsRangePath>,
) -> Result<Json<JobsById>, AppError> {
    let params = DateRangeParams::from_segments(
        Some(date_segment(&DATE_FROM_SEGMENT, &path.date_from)?),
        Some(date_segment(&DATE_TO_SEGMENT, &path.date_to)?),
    );
    let jobs = jobs::get_jobs(state.store.as_ref(), &state.filter, params).await?;
    Ok(Json(jobs))
}
