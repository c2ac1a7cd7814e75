use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::{
    AccessError, BoardError, DashboardError, DirectoryError, SessionError, StoreError,
    TimeLogError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EngineerNotLinked,
    MoveInFlight,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unauthorized => Self::unauthorized(err.to_string()),
            StoreError::NotFound(_) => Self::not_found(err.to_string()),
            // The store's own message is what the user gets to see.
            StoreError::Rejected(ref message) => {
                tracing::error!("Store rejected request: {}", message);
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, message.clone())
            }
            StoreError::Unavailable(ref message) => {
                tracing::error!("Store unavailable: {}", message);
                Self::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::UnlinkedEngineer => {
                Self::forbidden(err.to_string()).with_code(ErrorCode::EngineerNotLinked)
            }
            AccessError::Forbidden(_) => Self::forbidden(err.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials | SessionError::NotAuthenticated => {
                Self::unauthorized(err.to_string())
            }
            SessionError::ProfileMissing => Self::forbidden(err.to_string()),
            SessionError::Store(e) => e.into(),
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::TaskNotFound(_) => Self::not_found(err.to_string()),
            BoardError::MoveInFlight(_) => {
                Self::conflict(err.to_string()).with_code(ErrorCode::MoveInFlight)
            }
            BoardError::InvalidTask(_) => Self::bad_request(err.to_string()),
            BoardError::Access(e) => e.into(),
            BoardError::Store(e) => e.into(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::ProjectNotFound(_) => Self::not_found(err.to_string()),
            DashboardError::Access(e) => e.into(),
            DashboardError::Store(e) => e.into(),
        }
    }
}

impl From<TimeLogError> for ApiError {
    fn from(err: TimeLogError) -> Self {
        match err {
            TimeLogError::EngineerUnresolved
            | TimeLogError::InvalidHours
            | TimeLogError::InvalidDateRange => Self::bad_request(err.to_string()),
            TimeLogError::Access(e) => e.into(),
            TimeLogError::Store(e) => e.into(),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::InvalidInput(_) => Self::bad_request(err.to_string()),
            DirectoryError::Access(e) => e.into(),
            DirectoryError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskId;

    #[test]
    fn rejected_writes_keep_the_store_message() {
        let err = ApiError::from(BoardError::Store(StoreError::Rejected(
            "permission denied".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message, "permission denied");
    }

    #[test]
    fn access_errors_are_forbidden() {
        let err = ApiError::from(TimeLogError::Access(AccessError::UnlinkedEngineer));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code, Some(ErrorCode::EngineerNotLinked));
    }

    #[test]
    fn second_move_is_a_conflict() {
        let err = ApiError::from(BoardError::MoveInFlight(TaskId::new("t1")));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
