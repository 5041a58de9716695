//! Mapping of core errors to HTTP responses.

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use stagebook_core::{FailureReason, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    Repo(RepoError),
    /// No route matches the request.
    RouteNotFound(String),
    /// The blocking pool dropped store work before it finished.
    WorkerUnavailable,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Repo(err) => err.code(),
            Self::RouteNotFound(_) => "route_not_found",
            Self::WorkerUnavailable => "worker_unavailable",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::RouteNotFound(path) => write!(f, "no route for `{path}`"),
            Self::WorkerUnavailable => f.write_str("store worker unavailable"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::RouteNotFound(_) | Self::WorkerUnavailable => None,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BlockingError> for ApiError {
    fn from(_: BlockingError) -> Self {
        Self::WorkerUnavailable
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Repo(err) => status_for(FailureReason::of(err)),
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::WorkerUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                "event=http_error module=web status=error error_code={} error={self}",
                self.code()
            );
            return HttpResponse::build(status).json(json!({ "error": "internal server error" }));
        }
        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}

/// HTTP status for a failed query or mutation.
pub fn status_for(reason: FailureReason) -> StatusCode {
    match reason {
        FailureReason::Validation => StatusCode::BAD_REQUEST,
        FailureReason::NotFound => StatusCode::NOT_FOUND,
        FailureReason::ConstraintViolation => StatusCode::CONFLICT,
        FailureReason::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
