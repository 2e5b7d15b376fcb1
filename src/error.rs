use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug)]
pub enum AppError {
    InvalidJob,
    RouteNotFound,
    DatabaseError(String),
    SerializationError(String),
    InternalError(String),
}

impl AppError {
    /// Machine-readable code placed in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidJob => "invalid_job",
            AppError::RouteNotFound => "rest_no_route",
            AppError::DatabaseError(_) => "db_error",
            AppError::SerializationError(_) => "serialization_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJob | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::SerializationError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidJob => write!(f, "Invalid job"),
            AppError::RouteNotFound => {
                write!(f, "No route was found matching the URL and request method")
            }
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

/// Error payload in the shape WordPress REST clients already understand.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code, e.g. `invalid_job`
    pub code: String,
    /// Human-readable message
    pub message: String,
    pub data: ErrorData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorData {
    /// HTTP status the error was returned with
    pub status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            data: ErrorData {
                status: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
