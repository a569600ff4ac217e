//! Response bodies for the lending endpoints.
//!
//! Bodies never carry another member's id: a book reports only whether it
//! is held for the caller, reservation listings omit their owners, and a
//! book's wait list shows reservation ids to their owner alone.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{
    BorrowBookResponse, CancelReservationResponse, ExtendBorrowResponse, ReservationView,
    ReserveBookResponse, ReturnBookResponse,
};
use crate::domain::{Book, BorrowRecord, HistoryEntry, Notification, Reservation, UserId};

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Catalogue entry as seen by the calling member.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[schema(format = "date")]
    pub publication_date: Option<String>,
    /// Whether anyone may borrow the copy right now.
    pub available: bool,
    /// Whether the copy is held for the caller's pickup.
    pub held_for_you: bool,
}

impl BookBody {
    /// Render a book for `viewer`.
    pub fn for_member(book: Book, viewer: &UserId) -> Self {
        Self {
            id: book.id.to_string(),
            available: book.availability.is_available(),
            held_for_you: book.availability.reserved_for() == Some(viewer),
            title: book.title,
            author: book.author,
            publication_date: book
                .publication_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// A loan.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub book_id: String,
    #[schema(format = "date-time")]
    pub borrowed_at: String,
    #[schema(format = "date-time")]
    pub due_at: String,
    #[schema(format = "date-time")]
    pub returned_at: Option<String>,
    #[schema(example = "active")]
    pub status: String,
}

impl From<BorrowRecord> for BorrowBody {
    fn from(record: BorrowRecord) -> Self {
        Self {
            id: record.id().to_string(),
            book_id: record.book_id().to_string(),
            borrowed_at: timestamp(record.borrowed_at()),
            due_at: timestamp(record.due_at()),
            returned_at: record.returned_at().map(timestamp),
            status: record.status().as_str().to_owned(),
        }
    }
}

impl From<BorrowBookResponse> for BorrowBody {
    fn from(response: BorrowBookResponse) -> Self {
        response.borrow.into()
    }
}

impl From<ExtendBorrowResponse> for BorrowBody {
    fn from(response: ExtendBorrowResponse) -> Self {
        response.borrow.into()
    }
}

/// A closed loan.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryBody {
    #[schema(format = "uuid")]
    pub book_id: String,
    #[schema(format = "date-time")]
    pub borrowed_at: String,
    #[schema(format = "date-time")]
    pub returned_at: String,
}

impl From<HistoryEntry> for HistoryEntryBody {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            book_id: entry.book_id.to_string(),
            borrowed_at: timestamp(entry.borrowed_at),
            returned_at: timestamp(entry.returned_at),
        }
    }
}

/// Outcome of returning a book.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBody {
    pub history: HistoryEntryBody,
    /// Whether the copy passed straight to the next member in line.
    pub handed_over: bool,
}

impl From<ReturnBookResponse> for ReturnBody {
    fn from(response: ReturnBookResponse) -> Self {
        Self {
            history: response.history.into(),
            handed_over: response.held_for.is_some(),
        }
    }
}

/// A reservation with its queue position.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub book_id: String,
    #[schema(format = "date-time")]
    pub reserved_at: String,
    #[schema(example = "pending")]
    pub status: String,
    /// One-based place in the wait list, absent once the member left it.
    #[schema(minimum = 1)]
    pub position: Option<u32>,
}

impl ReservationBody {
    fn new(reservation: &Reservation, position: Option<u32>) -> Self {
        Self {
            id: reservation.id().to_string(),
            book_id: reservation.book_id().to_string(),
            reserved_at: timestamp(reservation.reserved_at()),
            status: reservation.status().as_str().to_owned(),
            position,
        }
    }
}

impl From<ReservationView> for ReservationBody {
    fn from(view: ReservationView) -> Self {
        Self::new(&view.reservation, view.position.map(|position| position.get()))
    }
}

impl From<ReserveBookResponse> for ReservationBody {
    fn from(response: ReserveBookResponse) -> Self {
        Self::new(&response.reservation, Some(response.position.get()))
    }
}

/// One place in a book's wait list as another member sees it.
///
/// Only the caller's own entry carries a reservation id; everyone else's
/// entries show just where they stand.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryBody {
    /// One-based place in the wait list; absent for a held copy.
    #[schema(minimum = 1)]
    pub position: Option<u32>,
    #[schema(example = "pending")]
    pub status: String,
    /// True for the caller's own reservation.
    pub own: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "uuid")]
    pub reservation_id: Option<String>,
}

impl QueueEntryBody {
    /// Render `view` for `viewer`, hiding other members' reservation ids.
    pub fn for_viewer(view: &ReservationView, viewer: &UserId) -> Self {
        let own = view.reservation.is_owned_by(viewer);
        Self {
            position: view.position.map(|position| position.get()),
            status: view.reservation.status().as_str().to_owned(),
            own,
            reservation_id: own.then(|| view.reservation.id().to_string()),
        }
    }
}

/// Outcome of cancelling a reservation.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationBody {
    pub reservation: ReservationBody,
    /// Whether a released hold passed to the next member in line.
    pub handed_over: bool,
}

impl From<CancelReservationResponse> for CancelReservationBody {
    fn from(response: CancelReservationResponse) -> Self {
        Self {
            reservation: ReservationBody::new(&response.reservation, None),
            handed_over: response.held_for.is_some(),
        }
    }
}

/// An inbox message.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub message: String,
    #[schema(format = "date-time")]
    pub sent_at: String,
    #[schema(example = "availability")]
    pub kind: String,
}

impl From<Notification> for NotificationBody {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            message: notification.message,
            sent_at: timestamp(notification.sent_at),
            kind: notification.kind.as_str().to_owned(),
        }
    }
}
