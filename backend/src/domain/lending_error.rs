//! Typed failures of lending operations.
//!
//! Callers branch on [`LendingError::reason`] (stable snake_case strings) or
//! on the variant itself; the message text is for humans only.

use serde_json::json;

use super::ports::LendingStoreError;
use super::{Error, ErrorCode};

/// Failure category, mirroring how callers are expected to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LendingErrorKind {
    /// Malformed input, rejected before storage is touched.
    Validation,
    /// A lending rule forbids the request in the current state. Do not retry.
    Conflict,
    /// Unknown identifier.
    NotFound,
    /// The record belongs to another member.
    Forbidden,
    /// Storage failed; nothing was applied and the caller may retry.
    Transactional,
}

/// Lending operation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingError {
    /// Input failed validation.
    #[error("{message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },
    /// The member already holds an active borrow of this book.
    #[error("book is already borrowed by this user")]
    AlreadyBorrowed,
    /// The book is not available to this member.
    #[error("book is not available")]
    Unavailable,
    /// The book is free; borrow it instead of reserving.
    #[error("book is available to borrow; reservation is not needed")]
    BookAvailable,
    /// The member already has an open reservation for this book.
    #[error("book is already reserved by this user")]
    DuplicateReservation,
    /// The member already has a wait list entry for this book.
    #[error("user is already in the wait list for this book")]
    AlreadyQueued,
    /// Other members are waiting, so the loan cannot be extended.
    #[error("cannot extend: other users are waiting for this book")]
    QueueNonEmpty,
    /// The borrow record is closed.
    #[error("this book has already been returned")]
    AlreadyReturned,
    /// The borrow record is not active.
    #[error("borrow record is not active")]
    NotActive,
    /// The reservation has been cancelled.
    #[error("reservation is no longer active")]
    ReservationClosed,
    /// No such book.
    #[error("book not found")]
    BookNotFound,
    /// No such borrow record.
    #[error("borrow record not found")]
    BorrowNotFound,
    /// No such reservation.
    #[error("reservation not found")]
    ReservationNotFound,
    /// No such notification for this member.
    #[error("notification not found")]
    NotificationNotFound,
    /// The record belongs to another member.
    #[error("you can only manage your own records")]
    Forbidden,
    /// Storage is unreachable.
    #[error("lending store unavailable: {message}")]
    StoreUnavailable {
        /// Adapter-level description, not shown to clients.
        message: String,
    },
    /// A concurrent request changed the same records first; the unit of work
    /// was rolled back and may be retried.
    #[error("lending transaction lost a race: {message}")]
    ConcurrentUpdate {
        /// Constraint or isolation failure, not shown to clients.
        message: String,
    },
    /// Storage rejected or failed the unit of work; it was rolled back.
    #[error("lending transaction failed: {message}")]
    Transactional {
        /// Adapter-level description, not shown to clients.
        message: String,
    },
}

impl LendingError {
    /// Convenience constructor for [`LendingError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`LendingError::Transactional`].
    pub fn transactional(message: impl Into<String>) -> Self {
        Self::Transactional {
            message: message.into(),
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> LendingErrorKind {
        match self {
            Self::Validation { .. } => LendingErrorKind::Validation,
            Self::AlreadyBorrowed
            | Self::Unavailable
            | Self::BookAvailable
            | Self::DuplicateReservation
            | Self::AlreadyQueued
            | Self::QueueNonEmpty
            | Self::AlreadyReturned
            | Self::NotActive
            | Self::ReservationClosed => LendingErrorKind::Conflict,
            Self::BookNotFound
            | Self::BorrowNotFound
            | Self::ReservationNotFound
            | Self::NotificationNotFound => LendingErrorKind::NotFound,
            Self::Forbidden => LendingErrorKind::Forbidden,
            Self::StoreUnavailable { .. }
            | Self::ConcurrentUpdate { .. }
            | Self::Transactional { .. } => LendingErrorKind::Transactional,
        }
    }

    /// Stable machine-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::AlreadyBorrowed => "already_borrowed",
            Self::Unavailable => "unavailable",
            Self::BookAvailable => "book_available",
            Self::DuplicateReservation => "duplicate_reservation",
            Self::AlreadyQueued => "already_queued",
            Self::QueueNonEmpty => "queue_non_empty",
            Self::AlreadyReturned => "already_returned",
            Self::NotActive => "not_active",
            Self::ReservationClosed => "reservation_closed",
            Self::BookNotFound => "book_not_found",
            Self::BorrowNotFound => "borrow_not_found",
            Self::ReservationNotFound => "reservation_not_found",
            Self::NotificationNotFound => "notification_not_found",
            Self::Forbidden => "forbidden",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::ConcurrentUpdate { .. } => "concurrent_update",
            Self::Transactional { .. } => "transaction_failed",
        }
    }
}

impl From<LendingStoreError> for LendingError {
    fn from(error: LendingStoreError) -> Self {
        match error {
            LendingStoreError::Connection { message } => Self::StoreUnavailable { message },
            LendingStoreError::Conflict { message } => Self::ConcurrentUpdate { message },
            LendingStoreError::Query { message } => Self::Transactional { message },
        }
    }
}

impl From<LendingError> for Error {
    fn from(error: LendingError) -> Self {
        let reason = error.reason();
        let mapped = match &error {
            LendingError::StoreUnavailable { .. } => {
                Error::service_unavailable("lending store unavailable")
            }
            LendingError::ConcurrentUpdate { .. } => Error::conflict(
                "another request changed these records first; no changes were applied",
            ),
            LendingError::Transactional { .. } => {
                Error::internal("lending transaction failed; no changes were applied")
            }
            LendingError::Forbidden => Error::forbidden(error.to_string()),
            other => {
                let code = match other.kind() {
                    LendingErrorKind::Validation => ErrorCode::InvalidRequest,
                    LendingErrorKind::NotFound => ErrorCode::NotFound,
                    _ => ErrorCode::Conflict,
                };
                Error::new(code, other.to_string())
            }
        };
        mapped.with_details(json!({ "reason": reason }))
    }
}
