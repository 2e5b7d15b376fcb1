//! The post store the job routes read from.
//!
//! The host application owns the data; the service only needs the four reads in
//! [`PostStore`]. Production deployments point [`SqlPostStore`] at the WordPress
//! database, while [`MemoryPostStore`] serves fixtures for local runs and tests.

pub mod memory;
pub mod sql;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Settings;
use crate::date_query::DateQuery;
use crate::entities::JobRecord;
use crate::error::AppError;

pub use memory::MemoryPostStore;
pub use sql::SqlPostStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub post_type: String,
    pub post_statuses: Vec<String>,
    pub posts_per_page: u64,
    pub date_query: Option<DateQuery>,
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn fetch_by_id(&self, id: u64) -> Result<Option<JobRecord>, AppError>;

    /// Matching posts, newest `post_date_gmt` first, at most `posts_per_page` of them.
    ///
    /// The date filter also runs against `post_date_gmt`. WordPress date queries
    /// default to the site-local `post_date`; the UTC column is used on purpose so the
    /// bounds agree with the `post_date_gmt` value every job view carries.
    async fn query(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError>;

    /// First stored value for `key`, like `get_post_meta($id, $key, true)`.
    async fn get_metadata(&self, post_id: u64, key: &str) -> Result<Option<String>, AppError>;

    /// `get_metadata` for every pairing of `post_ids` and `keys` in one read.
    /// Pairs with no stored value are absent from the map.
    async fn get_metadata_batch(
        &self,
        post_ids: &[u64],
        keys: &[&str],
    ) -> Result<MetaValues, AppError>;

    fn canonical_url(&self, record: &JobRecord) -> String;
}

/// Metadata values keyed by `(post_id, meta_key)`.
pub type MetaValues = HashMap<(u64, String), String>;

/// How the host site builds public job URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permalinks {
    pub site_url: String,
    /// Rewrite slug for job listings; empty means plain `?p=` links.
    pub job_base: String,
}

impl Permalinks {
    pub fn new(site_url: impl Into<String>, job_base: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            job_base: job_base.into().trim_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.site_url, &settings.job_permalink_base)
    }

    pub fn job_url(&self, record: &JobRecord) -> String {
        if self.job_base.is_empty() || record.post_name.is_empty() {
            format!(
                "{}/?post_type={}&p={}",
                self.site_url, record.post_type, record.id
            )
        } else {
            format!("{}/{}/{}/", self.site_url, self.job_base, record.post_name)
        }
    }
}

/// Picks the store named by the settings: the database when `DATABASE_URL` is
/// set, otherwise the `JOBS_FIXTURE` file.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn PostStore>, AppError> {
    let permalinks = Permalinks::from_settings(settings);

    if let Some(url) = &settings.database_url {
        let store = SqlPostStore::connect(url, &settings.table_prefix, permalinks).await?;
        tracing::info!(table_prefix = %settings.table_prefix, "using database post store");
        return Ok(Arc::new(store));
    }

    if let Some(path) = &settings.jobs_fixture {
        let store = MemoryPostStore::from_json_file(path, permalinks)?;
        tracing::info!(fixture = %path, posts = store.len(), "using fixture post store");
        return Ok(Arc::new(store));
    }

    Err(AppError::InternalError(
        "either DATABASE_URL or JOBS_FIXTURE must be set".to_string(),
    ))
}
