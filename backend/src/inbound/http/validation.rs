//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{BookId, BorrowId, Error, NotificationId, ReservationId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) const BOOK_ID: FieldName = FieldName::new("bookId");
pub(crate) const BORROW_ID: FieldName = FieldName::new("borrowId");
pub(crate) const RESERVATION_ID: FieldName = FieldName::new("reservationId");
pub(crate) const NOTIFICATION_ID: FieldName = FieldName::new("notificationId");

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
        "reason": "validation",
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_book_id(value: &str) -> Result<BookId, Error> {
    parse_uuid(value, BOOK_ID).map(BookId::from_uuid)
}

pub(crate) fn parse_borrow_id(value: &str) -> Result<BorrowId, Error> {
    parse_uuid(value, BORROW_ID).map(BorrowId::from_uuid)
}

pub(crate) fn parse_reservation_id(value: &str) -> Result<ReservationId, Error> {
    parse_uuid(value, RESERVATION_ID).map(ReservationId::from_uuid)
}

pub(crate) fn parse_notification_id(value: &str) -> Result<NotificationId, Error> {
    parse_uuid(value, NOTIFICATION_ID).map(NotificationId::from_uuid)
}
