//! Conversions between lending rows and domain types.
//!
//! Every conversion out of the database goes through a validating domain
//! constructor; malformed rows surface as query errors instead of panics.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::ports::{LendingStoreError, ReservationView};
use crate::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, BorrowStatus, HistoryEntry, Notification,
    NotificationId, NotificationKind, QueuePosition, Reservation, ReservationId,
    ReservationStatus, UserId, WaitList, WaitListEntry,
};

use super::models::{
    BookRow, BorrowRow, HistoryRow, NewHistoryRow, NotificationRow, ReservationRow, WaitListRow,
};

const AVAILABLE: &str = "available";
const UNAVAILABLE: &str = "unavailable";

/// Column values for an availability flag.
pub(crate) fn availability_columns(availability: &Availability) -> (&'static str, Option<Uuid>) {
    match availability {
        Availability::Available => (AVAILABLE, None),
        Availability::Unavailable { reserved_for } => {
            (UNAVAILABLE, reserved_for.map(|user| *user.as_uuid()))
        }
    }
}

pub(crate) fn book_from_row(row: BookRow) -> Result<Book, LendingStoreError> {
    let availability = match (row.availability_status.as_str(), row.reserved_for) {
        (AVAILABLE, None) => Availability::Available,
        (UNAVAILABLE, reserved_for) => Availability::Unavailable {
            reserved_for: reserved_for.map(UserId::from_uuid),
        },
        (status, reserved_for) => {
            return Err(LendingStoreError::query(format!(
                "book {}: inconsistent availability {status} / {reserved_for:?}",
                row.id
            )));
        }
    };
    Ok(Book {
        id: BookId::from_uuid(row.id),
        title: row.title,
        author: row.author,
        publication_date: row.publication_date,
        availability,
    })
}

pub(crate) fn borrow_to_row(record: &BorrowRecord) -> BorrowRow {
    BorrowRow {
        id: *record.id().as_uuid(),
        user_id: *record.user_id().as_uuid(),
        book_id: *record.book_id().as_uuid(),
        borrowed_at: record.borrowed_at(),
        due_at: record.due_at(),
        returned_at: record.returned_at(),
        status: record.status().as_str().to_owned(),
        reminded_at: record.reminded_at(),
    }
}

pub(crate) fn borrow_from_row(row: BorrowRow) -> Result<BorrowRecord, LendingStoreError> {
    let status: BorrowStatus = row
        .status
        .parse()
        .map_err(|err| LendingStoreError::query(format!("borrow {}: {err}", row.id)))?;
    BorrowRecord::restore(
        BorrowId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        BookId::from_uuid(row.book_id),
        row.borrowed_at,
        row.due_at,
        row.returned_at,
        status,
    )
    .map(|record| record.with_reminded_at(row.reminded_at))
    .ok_or_else(|| {
        LendingStoreError::query(format!(
            "borrow {}: status and return timestamp disagree",
            row.id
        ))
    })
}

pub(crate) fn history_to_row(entry: &HistoryEntry) -> NewHistoryRow {
    NewHistoryRow {
        user_id: *entry.user_id.as_uuid(),
        book_id: *entry.book_id.as_uuid(),
        borrowed_at: entry.borrowed_at,
        returned_at: entry.returned_at,
    }
}

pub(crate) fn history_from_row(row: HistoryRow) -> HistoryEntry {
    HistoryEntry {
        user_id: UserId::from_uuid(row.user_id),
        book_id: BookId::from_uuid(row.book_id),
        borrowed_at: row.borrowed_at,
        returned_at: row.returned_at,
    }
}

pub(crate) fn reservation_to_row(reservation: &Reservation) -> ReservationRow {
    ReservationRow {
        id: *reservation.id().as_uuid(),
        user_id: *reservation.user_id().as_uuid(),
        book_id: *reservation.book_id().as_uuid(),
        reserved_at: reservation.reserved_at(),
        status: reservation.status().as_str().to_owned(),
    }
}

pub(crate) fn reservation_from_row(row: ReservationRow) -> Result<Reservation, LendingStoreError> {
    let status: ReservationStatus = row
        .status
        .parse()
        .map_err(|err| LendingStoreError::query(format!("reservation {}: {err}", row.id)))?;
    Ok(Reservation::restore(
        ReservationId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        BookId::from_uuid(row.book_id),
        row.reserved_at,
        status,
    ))
}

/// Attach queue positions, keyed by `(book, member)`, to reservation rows.
pub(crate) fn reservation_views(
    rows: Vec<ReservationRow>,
    queue_rows: &[WaitListRow],
) -> Result<Vec<ReservationView>, LendingStoreError> {
    let positions: HashMap<(Uuid, Uuid), i32> = queue_rows
        .iter()
        .map(|row| ((row.book_id, row.user_id), row.position))
        .collect();
    rows.into_iter()
        .map(|row| {
            let position = positions
                .get(&(row.book_id, row.user_id))
                .copied()
                .map(position_from_column)
                .transpose()?;
            Ok(ReservationView {
                reservation: reservation_from_row(row)?,
                position,
            })
        })
        .collect()
}

fn position_from_column(position: i32) -> Result<QueuePosition, LendingStoreError> {
    u32::try_from(position)
        .ok()
        .and_then(QueuePosition::new)
        .ok_or_else(|| LendingStoreError::query(format!("invalid queue position {position}")))
}

pub(crate) fn wait_list_from_rows(
    book_id: BookId,
    rows: Vec<WaitListRow>,
) -> Result<WaitList, LendingStoreError> {
    let entries = rows
        .into_iter()
        .map(|row| {
            Ok(WaitListEntry {
                book_id: BookId::from_uuid(row.book_id),
                user_id: UserId::from_uuid(row.user_id),
                position: position_from_column(row.position)?,
                joined_at: row.joined_at,
            })
        })
        .collect::<Result<Vec<_>, LendingStoreError>>()?;
    WaitList::from_entries(book_id, entries)
        .map_err(|err| LendingStoreError::query(format!("wait list for {book_id}: {err}")))
}

pub(crate) fn wait_list_to_rows(wait_list: &WaitList) -> Result<Vec<WaitListRow>, LendingStoreError> {
    wait_list
        .entries()
        .iter()
        .map(|entry| {
            let position = i32::try_from(entry.position.get()).map_err(|_| {
                LendingStoreError::query(format!("queue position {} overflows", entry.position))
            })?;
            Ok(WaitListRow {
                book_id: *entry.book_id.as_uuid(),
                user_id: *entry.user_id.as_uuid(),
                position,
                joined_at: entry.joined_at,
            })
        })
        .collect()
}

pub(crate) fn notification_to_row(notification: &Notification) -> NotificationRow {
    NotificationRow {
        id: *notification.id.as_uuid(),
        user_id: *notification.user_id.as_uuid(),
        message: notification.message.clone(),
        sent_at: notification.sent_at,
        kind: notification.kind.as_str().to_owned(),
    }
}

pub(crate) fn notification_from_row(row: NotificationRow) -> Result<Notification, LendingStoreError> {
    let kind: NotificationKind = row
        .kind
        .parse()
        .map_err(|err| LendingStoreError::query(format!("notification {}: {err}", row.id)))?;
    Ok(Notification {
        id: NotificationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        message: row.message,
        sent_at: row.sent_at,
        kind,
    })
}
