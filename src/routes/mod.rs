pub mod jobs;

use crate::error::AppError;

/// Fallback for anything outside the registered routes.
pub async fn no_route() -> AppError {
    AppError::RouteNotFound
}
