//! PostgreSQL-backed `LendingStore` implementation using Diesel ORM.
//!
//! A transaction owns one pooled connection and drives Diesel's
//! `AnsiTransactionManager` directly, because the lending coordinator keeps
//! the unit of work open across several port calls. `lock_book` issues
//! `SELECT ... FOR UPDATE`, so every write to a book's ledger, queue, and
//! reservations is serialised behind that row lock until commit.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::domain::ports::{LendingStore, LendingStoreError, LendingTransaction};
use crate::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, BorrowStatus, HistoryEntry, Notification,
    Reservation, ReservationId, ReservationStatus, UserId, WaitList,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::lending_rows::{
    availability_columns, book_from_row, borrow_from_row, borrow_to_row, history_to_row,
    notification_to_row, reservation_from_row, reservation_to_row, wait_list_from_rows,
    wait_list_to_rows,
};
use super::models::{
    AvailabilityUpdate, BookRow, BorrowRow, BorrowUpdate, NewBookRow, ReservationRow, WaitListRow,
};
use super::pool::DbPool;
use super::schema::{books, borrow_history, borrows, notifications, reservations, wait_list_entries};

const OPEN_RESERVATION_STATUSES: [&str; 2] = [
    ReservationStatus::Pending.as_str(),
    ReservationStatus::Available.as_str(),
];

/// Diesel-backed implementation of the lending store port.
#[derive(Clone)]
pub struct DieselLendingStore {
    pool: DbPool,
}

impl DieselLendingStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a catalogue row, or refresh the descriptive columns of an
    /// existing one. Availability of an existing row is left untouched so
    /// reseeding never releases a copy that is on loan or held.
    ///
    /// # Errors
    ///
    /// Returns a [`LendingStoreError`] when the pool or the insert fails.
    pub async fn seed_book(&self, book: &Book) -> Result<(), LendingStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (availability_status, reserved_for) = availability_columns(&book.availability);
        let row = NewBookRow {
            id: *book.id.as_uuid(),
            title: &book.title,
            author: &book.author,
            publication_date: book.publication_date,
            availability_status,
            reserved_for,
        };
        diesel::insert_into(books::table)
            .values(&row)
            .on_conflict(books::id)
            .do_update()
            .set((
                books::title.eq(row.title),
                books::author.eq(row.author),
                books::publication_date.eq(row.publication_date),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[async_trait]
impl LendingStore for DieselLendingStore {
    async fn begin(&self) -> Result<Box<dyn LendingTransaction>, LendingStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselLendingTransaction { conn, open: true }))
    }
}

/// One open PostgreSQL transaction.
///
/// Dropping it while open leaves the connection mid-transaction;
/// `diesel-async` then reports the connection broken and the pool discards
/// it, which rolls the work back server-side.
struct DieselLendingTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
    open: bool,
}

impl DieselLendingTransaction {
    fn conn(&mut self) -> Result<&mut AsyncPgConnection, LendingStoreError> {
        if self.open {
            Ok(&mut *self.conn)
        } else {
            Err(LendingStoreError::query("transaction already closed"))
        }
    }
}

#[async_trait]
impl LendingTransaction for DieselLendingTransaction {
    async fn lock_book(&mut self, book_id: &BookId) -> Result<Option<Book>, LendingStoreError> {
        let conn = self.conn()?;
        let row = books::table
            .find(book_id.as_uuid())
            .select(BookRow::as_select())
            .for_update()
            .get_result::<BookRow>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(book_from_row).transpose()
    }

    async fn set_availability(
        &mut self,
        book_id: &BookId,
        availability: &Availability,
    ) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        let (availability_status, reserved_for) = availability_columns(availability);
        let updated = diesel::update(books::table.find(book_id.as_uuid()))
            .set(&AvailabilityUpdate {
                availability_status,
                reserved_for,
            })
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(LendingStoreError::query(format!("book {book_id} not found")));
        }
        Ok(())
    }

    async fn find_borrow(
        &mut self,
        borrow_id: &BorrowId,
    ) -> Result<Option<BorrowRecord>, LendingStoreError> {
        let conn = self.conn()?;
        let row = borrows::table
            .find(borrow_id.as_uuid())
            .select(BorrowRow::as_select())
            .first::<BorrowRow>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(borrow_from_row).transpose()
    }

    async fn find_active_borrow(
        &mut self,
        book_id: &BookId,
    ) -> Result<Option<BorrowRecord>, LendingStoreError> {
        let conn = self.conn()?;
        let row = borrows::table
            .filter(
                borrows::book_id
                    .eq(book_id.as_uuid())
                    .and(borrows::status.eq(BorrowStatus::Active.as_str())),
            )
            .select(BorrowRow::as_select())
            .first::<BorrowRow>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(borrow_from_row).transpose()
    }

    async fn insert_borrow(&mut self, record: &BorrowRecord) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(borrows::table)
            .values(&borrow_to_row(record))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_borrow(&mut self, record: &BorrowRecord) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        let updated = diesel::update(borrows::table.find(record.id().as_uuid()))
            .set(&BorrowUpdate {
                due_at: record.due_at(),
                returned_at: record.returned_at(),
                status: record.status().as_str(),
                reminded_at: record.reminded_at(),
            })
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(LendingStoreError::query(format!(
                "borrow {} not found",
                record.id()
            )));
        }
        Ok(())
    }

    async fn append_history(&mut self, entry: &HistoryEntry) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(borrow_history::table)
            .values(&history_to_row(entry))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn load_wait_list(&mut self, book_id: &BookId) -> Result<WaitList, LendingStoreError> {
        let conn = self.conn()?;
        let rows: Vec<WaitListRow> = wait_list_entries::table
            .filter(wait_list_entries::book_id.eq(book_id.as_uuid()))
            .order(wait_list_entries::position.asc())
            .select(WaitListRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        wait_list_from_rows(*book_id, rows)
    }

    async fn save_wait_list(&mut self, wait_list: &WaitList) -> Result<(), LendingStoreError> {
        let rows = wait_list_to_rows(wait_list)?;
        let book_id = wait_list.book_id();
        let conn = self.conn()?;
        // Rewrite the whole queue; the deferred unique constraint on
        // (book_id, position) is checked once at commit.
        diesel::delete(
            wait_list_entries::table.filter(wait_list_entries::book_id.eq(book_id.as_uuid())),
        )
        .execute(&mut *conn)
        .await
        .map_err(map_diesel_error)?;
        if !rows.is_empty() {
            diesel::insert_into(wait_list_entries::table)
                .values(&rows)
                .execute(conn)
                .await
                .map_err(map_diesel_error)?;
        }
        debug!(%book_id, length = rows.len(), "wait list saved");
        Ok(())
    }

    async fn find_reservation(
        &mut self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, LendingStoreError> {
        let conn = self.conn()?;
        let row = reservations::table
            .find(reservation_id.as_uuid())
            .select(ReservationRow::as_select())
            .first::<ReservationRow>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(reservation_from_row).transpose()
    }

    async fn find_open_reservation(
        &mut self,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<Option<Reservation>, LendingStoreError> {
        let conn = self.conn()?;
        let row = reservations::table
            .filter(
                reservations::user_id
                    .eq(user_id.as_uuid())
                    .and(reservations::book_id.eq(book_id.as_uuid()))
                    .and(reservations::status.eq_any(OPEN_RESERVATION_STATUSES)),
            )
            .select(ReservationRow::as_select())
            .first::<ReservationRow>(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(reservation_from_row).transpose()
    }

    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(reservations::table)
            .values(&reservation_to_row(reservation))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        let updated = diesel::update(reservations::table.find(reservation.id().as_uuid()))
            .set(reservations::status.eq(reservation.status().as_str()))
            .execute(conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(LendingStoreError::query(format!(
                "reservation {} not found",
                reservation.id()
            )));
        }
        Ok(())
    }

    async fn insert_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        diesel::insert_into(notifications::table)
            .values(&notification_to_row(notification))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn commit(&mut self) -> Result<(), LendingStoreError> {
        let conn = self.conn()?;
        let result = AnsiTransactionManager::commit_transaction(conn)
            .await
            .map_err(map_diesel_error);
        // A failed COMMIT leaves the transaction aborted; only rollback may
        // follow.
        if result.is_ok() {
            self.open = false;
        }
        result
    }

    async fn rollback(&mut self) -> Result<(), LendingStoreError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }
}
