use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::RowNotFound) {
            return ApiError::NotFound("Record");
        }
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return ApiError::conflict("Record already exists");
            }
            if db.is_foreign_key_violation() {
                return ApiError::conflict("Record is referenced by other records");
            }
            if db.is_check_violation() {
                return ApiError::bad_request("Record violates a data constraint");
            }
            if db.code().is_some_and(|code| is_busy_code(&code)) {
                return ApiError::conflict("Record is being changed by another request");
            }
        }
        ApiError::Database(err)
    }
}

/// SQLITE_BUSY and its extended codes (BUSY_RECOVERY, BUSY_SNAPSHOT, ...).
fn is_busy_code(code: &str) -> bool {
    code.parse::<i32>().is_ok_and(|code| code & 0xff == 5)
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => HttpResponse::BadRequest().json(errors),
            ApiError::Database(err) => {
                log::error!("database error: {err}");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Database error".to_string(),
                })
            }
            other => HttpResponse::build(other.status_code()).json(ErrorResponse {
                error: other.to_string(),
            }),
        }
    }
}
