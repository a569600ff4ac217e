//! Read-side lending service.
//!
//! Translates [`LendingRecords`] lookups into the [`LendingQuery`] driving
//! port, turning missing rows into domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::domain::ports::{LendingQuery, LendingRecords, LendingStoreError, ReservationView};
use crate::domain::{
    Book, BookId, BorrowRecord, HistoryEntry, LendingError, Notification, NotificationId, UserId,
};

/// Lending query service implementing [`LendingQuery`].
#[derive(Clone)]
pub struct LendingQueryService<R> {
    records: Arc<R>,
}

impl<R> LendingQueryService<R> {
    /// Create a new service over `records`.
    pub fn new(records: Arc<R>) -> Self {
        Self { records }
    }
}

fn map_records_error(operation: &'static str, err: LendingStoreError) -> LendingError {
    error!(operation, error = %err, "lending records lookup failed");
    LendingError::from(err)
}

#[async_trait]
impl<R> LendingQuery for LendingQueryService<R>
where
    R: LendingRecords,
{
    async fn get_book(&self, book_id: &BookId) -> Result<Book, LendingError> {
        self.records
            .find_book(book_id)
            .await
            .map_err(|err| map_records_error("get_book", err))?
            .ok_or(LendingError::BookNotFound)
    }

    async fn active_borrows(&self, user_id: &UserId) -> Result<Vec<BorrowRecord>, LendingError> {
        self.records
            .active_borrows(user_id)
            .await
            .map_err(|err| map_records_error("active_borrows", err))
    }

    async fn borrow_history(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, LendingError> {
        self.records
            .history(user_id)
            .await
            .map_err(|err| map_records_error("borrow_history", err))
    }

    async fn reservations(&self, user_id: &UserId) -> Result<Vec<ReservationView>, LendingError> {
        self.records
            .reservations(user_id)
            .await
            .map_err(|err| map_records_error("reservations", err))
    }

    async fn book_reservations(
        &self,
        book_id: &BookId,
    ) -> Result<Vec<ReservationView>, LendingError> {
        // An unknown book has no queue, but callers expect a 404 rather than
        // an empty list.
        self.get_book(book_id).await?;
        self.records
            .book_reservations(book_id)
            .await
            .map_err(|err| map_records_error("book_reservations", err))
    }

    async fn notifications(&self, user_id: &UserId) -> Result<Vec<Notification>, LendingError> {
        self.records
            .notifications(user_id)
            .await
            .map_err(|err| map_records_error("notifications", err))
    }

    async fn dismiss_notification(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<(), LendingError> {
        let deleted = self
            .records
            .delete_notification(user_id, notification_id)
            .await
            .map_err(|err| map_records_error("dismiss_notification", err))?;
        if !deleted {
            return Err(LendingError::NotificationNotFound);
        }
        debug!(%user_id, %notification_id, "notification dismissed");
        Ok(())
    }
}
