use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;

use super::{JobQuery, MetaValues, Permalinks, PostStore};
use crate::date_query::MYSQL_DATETIME_FORMAT;
use crate::entities::JobRecord;
use crate::error::AppError;

/// Post store held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryPostStore {
    posts: Vec<JobRecord>,
    meta: HashMap<(u64, String), String>,
    permalinks: Permalinks,
}

/// One entry of a fixture file: the post columns plus its metadata.
#[derive(Debug, Deserialize)]
struct FixturePost {
    #[serde(flatten)]
    record: JobRecord,
    #[serde(default)]
    meta: HashMap<String, String>,
}

impl MemoryPostStore {
    pub fn new(permalinks: Permalinks) -> Self {
        Self {
            posts: Vec::new(),
            meta: HashMap::new(),
            permalinks,
        }
    }

    pub fn with_post(mut self, record: JobRecord) -> Self {
        self.insert(record);
        self
    }

    pub fn with_meta(mut self, post_id: u64, key: &str, value: &str) -> Self {
        self.meta
            .insert((post_id, key.to_string()), value.to_string());
        self
    }

    /// Adds a post, replacing any stored post with the same id.
    pub fn insert(&mut self, record: JobRecord) {
        self.posts.retain(|existing| existing.id != record.id);
        self.posts.push(record);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Parses a JSON array of posts, each optionally carrying a `meta` object.
    pub fn from_json_str(json: &str, permalinks: Permalinks) -> Result<Self, AppError> {
        let fixtures: Vec<FixturePost> = serde_json::from_str(json)?;
        let mut store = Self::new(permalinks);
        for fixture in fixtures {
            let id = fixture.record.id;
            for (key, value) in fixture.meta {
                store.meta.insert((id, key), value);
            }
            store.insert(fixture.record);
        }
        Ok(store)
    }

    pub fn from_json_file(path: impl AsRef<Path>, permalinks: Permalinks) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::InternalError(format!("failed to read fixture {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json, permalinks)
    }
}

fn posted_at(record: &JobRecord) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&record.post_date_gmt, MYSQL_DATETIME_FORMAT).ok()
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn fetch_by_id(&self, id: u64) -> Result<Option<JobRecord>, AppError> {
        Ok(self.posts.iter().find(|post| post.id == id).cloned())
    }

    async fn query(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        let range = match &query.date_query {
            Some(date_query) => match date_query.resolve(Utc::now().naive_utc()) {
                Some(range) => Some(range),
                None => {
                    tracing::debug!(?date_query, "unresolvable date filter, nothing matches");
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        let mut matches: Vec<JobRecord> = self
            .posts
            .iter()
            .filter(|post| post.post_type == query.post_type)
            .filter(|post| query.post_statuses.contains(&post.post_status))
            .filter(|post| match range {
                Some(range) => posted_at(post).is_some_and(|at| range.contains(at)),
                None => true,
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.post_date_gmt
                .cmp(&a.post_date_gmt)
                .then_with(|| b.id.cmp(&a.id))
        });
        matches.truncate(usize::try_from(query.posts_per_page).unwrap_or(usize::MAX));

        Ok(matches)
    }

    async fn get_metadata(&self, post_id: u64, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.meta.get(&(post_id, key.to_string())).cloned())
    }

    async fn get_metadata_batch(
        &self,
        post_ids: &[u64],
        keys: &[&str],
    ) -> Result<MetaValues, AppError> {
        let mut values = MetaValues::new();
        for &post_id in post_ids {
            for &key in keys {
                let pair = (post_id, key.to_string());
                if let Some(value) = self.meta.get(&pair) {
                    values.insert(pair, value.clone());
                }
            }
        }
        Ok(values)
    }

    fn canonical_url(&self, record: &JobRecord) -> String {
        self.permalinks.job_url(record)
    }
}
