use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::report::ValidationReport;
use crate::schedule::types::SlotId;

/// Time text that does not match `HH:MM`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed time {input:?}, expected HH:MM")]
pub struct MalformedTimeError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("slot store unavailable: {0}")]
    Unavailable(String),

    #[error("slot {0} not found")]
    SlotNotFound(SlotId),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),

    #[error("invalid rate {0:?}")]
    InvalidRate(String),

    #[error("end time must be after start time in {0}")]
    InvalidRange(String),

    #[error("could not load existing schedule: {0}")]
    ScheduleUnavailable(#[source] StoreError),

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a booking attempt that did not produce a reservation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("booking rejected")]
    Rejected(ValidationReport),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("malformed token: {0}")]
    MalformedToken(String),

    #[error("unknown role {0}")]
    UnknownRole(u8),

    #[error("token expired")]
    Expired,
}

/// Errors surfaced by the HTTP layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed")]
    Invalid(ValidationReport),

    #[error("could not load existing schedule")]
    ScheduleUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotNotFound(id) => AppError::NotFound(format!("slot {}", id)),
            StoreError::Unavailable(reason) => {
                tracing::error!("slot store unavailable: {}", reason);
                AppError::ScheduleUnavailable
            }
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::ScheduleUnavailable(source) => {
                tracing::error!("could not load existing schedule: {}", source);
                AppError::ScheduleUnavailable
            }
            ScheduleError::MalformedTime(_)
            | ScheduleError::InvalidRate(_)
            | ScheduleError::InvalidRange(_) => {
                // A draft that passed validation must convert cleanly
                tracing::error!("validated draft failed to convert: {}", err);
                AppError::Internal(err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Rejected(report) => AppError::Invalid(report),
            BookingError::Store(err) => AppError::from(err),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        tracing::debug!("rejecting session: {}", err);
        AppError::Unauthorized
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ScheduleUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Invalid(report) => json!({ "valid": false, "errors": report }),
            AppError::Internal(_) => json!({ "error": "An internal error occurred" }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Field;
    use actix_web::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn unavailable_schedule_is_a_503() {
        let err = ScheduleError::ScheduleUnavailable(StoreError::Unavailable("store lock poisoned".into()));
        let (status, body) = body_json(AppError::from(err)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "error": "could not load existing schedule" }));
    }

    #[actix_web::test]
    async fn store_failures_do_not_leak_as_not_found() {
        let (status, _) = body_json(AppError::from(StoreError::Unavailable("down".into()))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = body_json(AppError::from(StoreError::SlotNotFound(3))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn rejected_booking_carries_the_report() {
        let mut report = ValidationReport::new();
        report.insert(Field::Start, "Already booked (09:00-10:00)");
        let (status, body) = body_json(AppError::from(BookingError::Rejected(report))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"]["start"], "Already booked (09:00-10:00)");
    }
}
