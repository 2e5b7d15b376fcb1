#![allow(dead_code)]

use std::sync::{Arc, Once};

use wpjm_public_api::entities::JobRecord;
use wpjm_public_api::store::{MemoryPostStore, Permalinks};
use wpjm_public_api::{create_app, AppState};

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

pub fn permalinks() -> Permalinks {
    Permalinks::new("https://jobs.example.com", "job")
}

pub fn record(id: u64, post_type: &str, post_status: &str, post_date_gmt: &str) -> JobRecord {
    JobRecord {
        id,
        post_title: format!("Job {}", id),
        post_name: format!("job-{}", id),
        post_type: post_type.to_string(),
        post_status: post_status.to_string(),
        guid: format!("https://jobs.example.com/?post_type=job_listing&p={}", id),
        post_date_gmt: post_date_gmt.to_string(),
    }
}

pub fn job(id: u64, post_date_gmt: &str) -> JobRecord {
    record(id, "job_listing", "publish", post_date_gmt)
}

/// A small site: public jobs across 2016-2018 plus posts that must never be exposed.
pub fn sample_store() -> MemoryPostStore {
    MemoryPostStore::new(permalinks())
        .with_post(job(10, "2016-12-31 23:59:59"))
        .with_post(job(11, "2017-01-01 00:00:00"))
        .with_post(job(12, "2017-06-15 08:30:00"))
        .with_post(record(13, "job_listing", "expired", "2017-09-01 12:00:00"))
        .with_post(job(14, "2017-12-31 23:59:59"))
        .with_post(job(15, "2018-01-01 00:00:00"))
        .with_post(record(20, "job_listing", "draft", "2017-05-01 09:00:00"))
        .with_post(record(21, "job_listing", "private", "2017-05-02 09:00:00"))
        .with_post(record(30, "post", "publish", "2017-05-03 09:00:00"))
        .with_meta(12, "_application_deadline", "2017-07-01")
        .with_meta(12, "_job_expires", "2017-07-15")
        .with_meta(13, "_job_expires", "2017-09-30")
}

pub fn sample_app() -> axum::Router {
    create_app(AppState::new(Arc::new(sample_store())))
}
