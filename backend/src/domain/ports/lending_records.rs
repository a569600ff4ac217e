//! Driven port for lending read models and inbox housekeeping.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Book, BookId, BorrowRecord, HistoryEntry, Notification, NotificationId, QueuePosition,
    Reservation, UserId,
};

use super::LendingStoreError;

/// A reservation together with the member's current queue position.
///
/// `position` is `None` once the member has left the queue, for example
/// when the reservation became available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    /// The reservation record.
    pub reservation: Reservation,
    /// Position in the book's wait list, if still queued.
    pub position: Option<QueuePosition>,
}

/// Read access to lending records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingRecords: Send + Sync {
    /// Fetch a book without locking it.
    async fn find_book(&self, book_id: &BookId) -> Result<Option<Book>, LendingStoreError>;

    /// Active borrows of a member, earliest due date first.
    async fn active_borrows(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BorrowRecord>, LendingStoreError>;

    /// Closed loans of a member, most recently returned first.
    async fn history(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, LendingStoreError>;

    /// Open reservations of a member, newest first.
    async fn reservations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationView>, LendingStoreError>;

    /// Open reservations for a book, oldest first.
    async fn book_reservations(
        &self,
        book_id: &BookId,
    ) -> Result<Vec<ReservationView>, LendingStoreError>;

    /// A member's notifications, newest first.
    async fn notifications(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, LendingStoreError>;

    /// Delete one of the member's notifications. Returns `false` when the
    /// member has no notification with that id.
    async fn delete_notification(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<bool, LendingStoreError>;

    /// Active borrows due strictly before `cutoff` that have not been
    /// reminded of their current due date, earliest first.
    async fn borrows_due_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BorrowRecord>, LendingStoreError>;
}
