use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod config;
pub mod date_query;
pub mod entities;
pub mod error;
pub mod jobs;
pub mod routes;
pub mod store;

use error::{ErrorBody, ErrorData};
use jobs::{JobFilter, PublicJobView};
use store::PostStore;

/// Where WordPress mounts its REST API.
pub const REST_ROOT: &str = "/wp-json";
pub const API_NAMESPACE: &str = "wpjm_public/v1";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PostStore>,
    pub filter: JobFilter,
}

impl AppState {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self {
            store,
            filter: JobFilter::default(),
        }
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    )
)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Service is healthy")
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WP Job Manager Public API",
        version = "1.1.1",
        description = "Non-sensitive job listing details, published and expired listings only."
    ),
    paths(
        health_check,
        routes::jobs::get_job,
        routes::jobs::list_jobs,
        routes::jobs::list_jobs_from,
        routes::jobs::list_jobs_range
    ),
    components(schemas(PublicJobView, ErrorBody, ErrorData))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn api_base() -> String {
    format!("{}/{}", REST_ROOT, API_NAMESPACE)
}

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let job_routes = Router::new()
        .route("/job/{id}", get(routes::jobs::get_job))
        .route("/jobs", get(routes::jobs::list_jobs))
        .route("/jobs/{date_from}", get(routes::jobs::list_jobs_from))
        .route("/jobs/{date_from}/{date_to}", get(routes::jobs::list_jobs_range));

    Router::new()
        .nest(&api_base(), job_routes)
        .route("/health", get(health_check))
        .route("/api-doc/openapi.json", get(openapi_json))
        .fallback(routes::no_route)
        .method_not_allowed_fallback(routes::no_route)
        .layer(TraceLayer::new_for_http())
        // Public, read-only data: any origin may read it.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
