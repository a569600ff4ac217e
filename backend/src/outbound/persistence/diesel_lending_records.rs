//! PostgreSQL-backed `LendingRecords` implementation using Diesel ORM.
//!
//! Reads run outside any lending transaction, so they may observe a state
//! between two commits but never a partially applied one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LendingRecords, LendingStoreError, ReservationView};
use crate::domain::{
    Book, BookId, BorrowRecord, BorrowStatus, HistoryEntry, Notification, NotificationId,
    ReservationStatus, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::lending_rows::{
    book_from_row, borrow_from_row, history_from_row, notification_from_row, reservation_views,
};
use super::models::{BookRow, BorrowRow, HistoryRow, NotificationRow, ReservationRow, WaitListRow};
use super::pool::DbPool;
use super::schema::{books, borrow_history, borrows, notifications, reservations, wait_list_entries};

const OPEN_RESERVATION_STATUSES: [&str; 2] = [
    ReservationStatus::Pending.as_str(),
    ReservationStatus::Available.as_str(),
];

/// Diesel-backed implementation of the lending records port.
#[derive(Clone)]
pub struct DieselLendingRecords {
    pool: DbPool,
}

impl DieselLendingRecords {
    /// Create a new reader with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn collect_borrows(rows: Vec<BorrowRow>) -> Result<Vec<BorrowRecord>, LendingStoreError> {
    rows.into_iter().map(borrow_from_row).collect()
}

#[async_trait]
impl LendingRecords for DieselLendingRecords {
    async fn find_book(&self, book_id: &BookId) -> Result<Option<Book>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = books::table
            .find(book_id.as_uuid())
            .select(BookRow::as_select())
            .first::<BookRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(book_from_row).transpose()
    }

    async fn active_borrows(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BorrowRecord>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BorrowRow> = borrows::table
            .filter(
                borrows::user_id
                    .eq(user_id.as_uuid())
                    .and(borrows::status.eq(BorrowStatus::Active.as_str())),
            )
            .order((borrows::due_at.asc(), borrows::id.asc()))
            .select(BorrowRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_borrows(rows)
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HistoryRow> = borrow_history::table
            .filter(borrow_history::user_id.eq(user_id.as_uuid()))
            .order((borrow_history::returned_at.desc(), borrow_history::id.desc()))
            .select(HistoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(history_from_row).collect())
    }

    async fn reservations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationView>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReservationRow> = reservations::table
            .filter(
                reservations::user_id
                    .eq(user_id.as_uuid())
                    .and(reservations::status.eq_any(OPEN_RESERVATION_STATUSES)),
            )
            .order((reservations::reserved_at.desc(), reservations::id.desc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let queue: Vec<WaitListRow> = wait_list_entries::table
            .filter(wait_list_entries::user_id.eq(user_id.as_uuid()))
            .select(WaitListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        reservation_views(rows, &queue)
    }

    async fn book_reservations(
        &self,
        book_id: &BookId,
    ) -> Result<Vec<ReservationView>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ReservationRow> = reservations::table
            .filter(
                reservations::book_id
                    .eq(book_id.as_uuid())
                    .and(reservations::status.eq_any(OPEN_RESERVATION_STATUSES)),
            )
            .order((reservations::reserved_at.asc(), reservations::id.asc()))
            .select(ReservationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let queue: Vec<WaitListRow> = wait_list_entries::table
            .filter(wait_list_entries::book_id.eq(book_id.as_uuid()))
            .select(WaitListRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        reservation_views(rows, &queue)
    }

    async fn notifications(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .order((notifications::sent_at.desc(), notifications::id.desc()))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(notification_from_row).collect()
    }

    async fn delete_notification(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<bool, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            notifications::table.filter(
                notifications::id
                    .eq(notification_id.as_uuid())
                    .and(notifications::user_id.eq(user_id.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn borrows_due_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BorrowRecord>, LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BorrowRow> = borrows::table
            .filter(
                borrows::status
                    .eq(BorrowStatus::Active.as_str())
                    .and(borrows::reminded_at.is_null())
                    .and(borrows::due_at.lt(cutoff)),
            )
            .order((borrows::due_at.asc(), borrows::id.asc()))
            .select(BorrowRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_borrows(rows)
    }
}
