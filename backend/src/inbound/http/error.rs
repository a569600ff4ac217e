//! HTTP rendering of [`Error`].
//!
//! Handlers convert [`LendingError`] with [`map_lending_error`], which keeps
//! the `details.reason` discriminator; this module picks the status code,
//! echoes the trace id header, and redacts server-side faults.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, LendingError, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body actually sent to the client.
///
/// Internal errors lose their message and every detail except the stable
/// `reason`, so clients can still branch on it while storage diagnostics
/// stay in the logs.
fn client_body(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let mut body = Error::internal("Internal server error");
    if let Some(reason) = error.details().and_then(|details| details.get("reason")) {
        body = body.with_details(json!({ "reason": reason }));
    }
    match error.trace_id() {
        Some(id) => body.with_trace_id(id),
        None => body,
    }
}

/// Convert a lending failure, logging server-side faults before the
/// message is redacted.
pub(crate) fn map_lending_error(err: LendingError) -> Error {
    match &err {
        LendingError::Transactional { message } => {
            error!(reason = err.reason(), %message, "lending operation failed");
        }
        LendingError::StoreUnavailable { message } | LendingError::ConcurrentUpdate { message } => {
            warn!(reason = err.reason(), %message, "lending operation rolled back");
        }
        _ => {}
    }
    Error::from(err)
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(client_body(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
