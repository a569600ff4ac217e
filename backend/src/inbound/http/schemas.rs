//! OpenAPI shapes for the error envelope.
//!
//! [`crate::domain::Error`] serialises through a private DTO and carries no
//! utoipa derive, so the documented shape of every non-2xx body lives here.
//! Keep these in step with `domain::error` and `LendingError::reason`.

use utoipa::ToSchema;

/// Failure category, mirrored from [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode, rename_all = "snake_case")]
pub enum ErrorCodeSchema {
    /// Malformed path id or request body.
    InvalidRequest,
    /// No member session, or the login was rejected.
    Unauthorized,
    /// The record belongs to another member.
    Forbidden,
    /// Unknown book, borrow, reservation, or notification.
    NotFound,
    /// A lending rule refused the transition, or a concurrent request won.
    Conflict,
    /// The lending store cannot be reached.
    ServiceUnavailable,
    /// Anything else; the message is redacted.
    InternalError,
}

/// Stable `details.reason` discriminator for lending failures.
#[derive(ToSchema)]
#[schema(as = LendingReason, rename_all = "snake_case")]
pub enum LendingReasonSchema {
    Validation,
    AlreadyBorrowed,
    Unavailable,
    BookAvailable,
    DuplicateReservation,
    AlreadyQueued,
    QueueNonEmpty,
    AlreadyReturned,
    NotActive,
    ReservationClosed,
    BookNotFound,
    BorrowNotFound,
    ReservationNotFound,
    NotificationNotFound,
    Forbidden,
    StoreUnavailable,
    ConcurrentUpdate,
    TransactionFailed,
}

/// Structured error details.
///
/// Path validation failures also name the offending `field`, its `value`,
/// and a validation `code`.
#[derive(ToSchema)]
#[schema(as = ErrorDetails)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorDetailsSchema {
    reason: LendingReasonSchema,
    #[schema(example = "bookId")]
    field: Option<String>,
    #[schema(example = "not-a-uuid")]
    value: Option<String>,
    #[schema(example = "invalid_uuid")]
    code: Option<String>,
}

/// Error body returned with every non-2xx response.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    #[schema(example = "someone is waiting for this book")]
    message: String,
    details: Option<ErrorDetailsSchema>,
    /// Matches the `trace-id` response header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}
