//! Domain primitives, aggregates, and lending services.
//!
//! Purpose: Define the strongly typed lending model (books, borrows, wait
//! lists, reservations, notifications) and the services that move it between
//! states. Adapters talk to this module only through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - LendingError: domain failure taxonomy for lending operations.
//! - LendingService / LendingQueryService: driving port implementations.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod lending_error;
pub mod lending_query_service;
pub mod lending_service;
pub mod notification;
pub mod ports;
pub mod reminders;
pub mod reservation;
pub mod trace_id;
pub mod wait_list;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::catalog::{Availability, Book};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{BookId, BorrowId, IdValidationError, NotificationId, ReservationId, UserId};
pub use self::ledger::{
    BorrowRecord, BorrowStatus, DEFAULT_EXTENSION_DAYS, DEFAULT_LOAN_DAYS,
    DEFAULT_PICKUP_WINDOW_DAYS, HistoryEntry, LedgerError, LoanPolicy, UnknownStatus,
};
pub use self::lending_error::{LendingError, LendingErrorKind};
pub use self::lending_query_service::LendingQueryService;
pub use self::lending_service::LendingService;
pub use self::notification::{Notification, NotificationEmitter, NotificationKind};
pub use self::reminders::{ReminderSummary, send_due_reminders};
pub use self::reservation::{Reservation, ReservationStatus, ReservationTransitionError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::wait_list::{QueuePosition, WaitList, WaitListEntry, WaitListError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use lending::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
