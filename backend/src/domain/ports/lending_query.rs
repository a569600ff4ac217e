//! Driving port for lending reads.

use async_trait::async_trait;

use crate::domain::{
    Book, BookId, BorrowRecord, HistoryEntry, LendingError, Notification, NotificationId, UserId,
};

use super::ReservationView;

/// Read-side lending use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingQuery: Send + Sync {
    /// Fetch a book with its availability.
    async fn get_book(&self, book_id: &BookId) -> Result<Book, LendingError>;

    /// The member's active borrows.
    async fn active_borrows(&self, user_id: &UserId) -> Result<Vec<BorrowRecord>, LendingError>;

    /// The member's closed loans.
    async fn borrow_history(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, LendingError>;

    /// The member's open reservations with queue positions.
    async fn reservations(&self, user_id: &UserId) -> Result<Vec<ReservationView>, LendingError>;

    /// Open reservations for a book in queue order.
    async fn book_reservations(
        &self,
        book_id: &BookId,
    ) -> Result<Vec<ReservationView>, LendingError>;

    /// The member's notifications.
    async fn notifications(&self, user_id: &UserId) -> Result<Vec<Notification>, LendingError>;

    /// Delete one of the member's notifications.
    async fn dismiss_notification(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<(), LendingError>;
}
