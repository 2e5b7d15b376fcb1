//! Job listing lookups shared by the public routes.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use crate::date_query::DateQuery;
use crate::entities::JobRecord;
use crate::error::AppError;
use crate::store::{JobQuery, PostStore};

pub const JOB_LISTING_POST_TYPE: &str = "job_listing";
/// Expired jobs stay visible, they were public once.
pub const PUBLIC_POST_STATUSES: [&str; 2] = ["publish", "expired"];
/// No pagination beyond the first page.
pub const POSTS_PER_PAGE: u64 = 1000;

pub const APPLICATION_DEADLINE_META_KEY: &str = "_application_deadline";
pub const JOB_EXPIRES_META_KEY: &str = "_job_expires";

/// Which posts the public routes may expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFilter {
    pub post_type: String,
    pub post_statuses: Vec<String>,
    pub posts_per_page: u64,
}

impl Default for JobFilter {
    fn default() -> Self {
        Self {
            post_type: JOB_LISTING_POST_TYPE.to_string(),
            post_statuses: PUBLIC_POST_STATUSES.iter().map(|s| s.to_string()).collect(),
            posts_per_page: POSTS_PER_PAGE,
        }
    }
}

impl JobFilter {
    pub fn admits(&self, record: &JobRecord) -> bool {
        record.post_type == self.post_type && self.post_statuses.contains(&record.post_status)
    }

    pub fn query(&self, date_query: Option<DateQuery>) -> JobQuery {
        JobQuery {
            post_type: self.post_type.clone(),
            post_statuses: self.post_statuses.clone(),
            posts_per_page: self.posts_per_page,
            date_query,
        }
    }
}

/// Optional date bounds for a listing request, already normalised for the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeParams {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl DateRangeParams {
    /// Builds params from raw path segments. Underscores stand in for spaces,
    /// which the routes cannot carry.
    pub fn from_segments(date_from: Option<&str>, date_to: Option<&str>) -> Self {
        let normalise = |segment: &str| Some(segment.replace('_', " ")).filter(|s| !s.is_empty());
        Self {
            date_from: date_from.and_then(normalise),
            date_to: date_to.and_then(normalise),
        }
    }

    pub fn into_date_query(self) -> Option<DateQuery> {
        DateQuery::inclusive(self.date_from, self.date_to)
    }
}

/// Public representation of a job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PublicJobView {
    pub post_id: u64,
    pub post_title: String,
    pub post_name: String,
    pub post_type: String,
    pub permalink: String,
    /// Publication date, `YYYY-MM-DD HH:MM:SS` UTC
    pub post_date_gmt: String,
    pub post_status: String,
    pub guid: String,
    /// Empty when the listing has no deadline
    pub application_deadline_date: String,
    /// Empty when the listing has no expiry date
    pub listing_expiry_date: String,
}

/// Listing response: job views keyed by post id, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobsById(pub Vec<PublicJobView>);

impl JobsById {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.0.iter().map(|job| job.post_id).collect()
    }
}

impl Serialize for JobsById {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for job in &self.0 {
            map.serialize_entry(&job.post_id.to_string(), job)?;
        }
        map.end()
    }
}

fn job_view(
    store: &dyn PostStore,
    record: JobRecord,
    application_deadline_date: Option<String>,
    listing_expiry_date: Option<String>,
) -> PublicJobView {
    let permalink = store.canonical_url(&record);

    PublicJobView {
        post_id: record.id,
        post_title: record.post_title,
        post_name: record.post_name,
        post_type: record.post_type,
        permalink,
        post_date_gmt: record.post_date_gmt,
        post_status: record.post_status,
        guid: record.guid,
        application_deadline_date: application_deadline_date.unwrap_or_default(),
        listing_expiry_date: listing_expiry_date.unwrap_or_default(),
    }
}

pub async fn format_job(store: &dyn PostStore, record: JobRecord) -> Result<PublicJobView, AppError> {
    let application_deadline_date = store
        .get_metadata(record.id, APPLICATION_DEADLINE_META_KEY)
        .await?;
    let listing_expiry_date = store.get_metadata(record.id, JOB_EXPIRES_META_KEY).await?;

    Ok(job_view(store, record, application_deadline_date, listing_expiry_date))
}

/// Formats a page of records with a single metadata read for all of them.
pub async fn format_jobs(store: &dyn PostStore, records: Vec<JobRecord>) -> Result<JobsById, AppError> {
    if records.is_empty() {
        return Ok(JobsById::default());
    }

    let ids: Vec<u64> = records.iter().map(|record| record.id).collect();
    let mut meta = store
        .get_metadata_batch(&ids, &[APPLICATION_DEADLINE_META_KEY, JOB_EXPIRES_META_KEY])
        .await?;

    let jobs = records
        .into_iter()
        .map(|record| {
            let deadline = meta.remove(&(record.id, APPLICATION_DEADLINE_META_KEY.to_string()));
            let expires = meta.remove(&(record.id, JOB_EXPIRES_META_KEY.to_string()));
            job_view(store, record, deadline, expires)
        })
        .collect();
    Ok(JobsById(jobs))
}

pub async fn get_job(
    store: &dyn PostStore,
    filter: &JobFilter,
    id: u64,
) -> Result<PublicJobView, AppError> {
    match store.fetch_by_id(id).await? {
        Some(record) if filter.admits(&record) => format_job(store, record).await,
        Some(record) => {
            tracing::debug!(
                id,
                post_type = %record.post_type,
                post_status = %record.post_status,
                "post is not a public job listing"
            );
            Err(AppError::InvalidJob)
        }
        None => {
            tracing::debug!(id, "no post with this id");
            Err(AppError::InvalidJob)
        }
    }
}

pub async fn get_jobs(
    store: &dyn PostStore,
    filter: &JobFilter,
    params: DateRangeParams,
) -> Result<JobsById, AppError> {
    let query = filter.query(params.into_date_query());
    let records = store.query(&query).await?;
    tracing::info!(count = records.len(), date_query = ?query.date_query, "loaded job listings");

    format_jobs(store, records).await
}
