//! Driven port for the transactional side of lending.
//!
//! One [`LendingTransaction`] is one atomic unit of work. Adapters must make
//! [`LendingTransaction::lock_book`] take an exclusive per-book lock held
//! until commit or rollback; every lending operation locks the book before
//! reading anything else about it, which serialises concurrent borrows,
//! returns, reservations, and queue renumbering for the same book.

use async_trait::async_trait;

use crate::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, HistoryEntry, Notification, Reservation,
    ReservationId, UserId, WaitList,
};

/// Errors raised by lending store adapters.
///
/// The coordinator only distinguishes an unreachable store from everything
/// else; `Conflict` exists so adapters can report a lost race precisely in
/// logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingStoreError {
    /// The store could not be reached.
    #[error("lending store connection failed: {message}")]
    Connection { message: String },
    /// A statement failed or returned malformed data.
    #[error("lending store query failed: {message}")]
    Query { message: String },
    /// A uniqueness or serialisation constraint rejected the write.
    #[error("lending store conflict: {message}")]
    Conflict { message: String },
}

impl LendingStoreError {
    /// The store could not be reached.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// A statement failed or returned malformed data.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// A constraint rejected the write.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Opens lending transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingStore: Send + Sync {
    /// Start a new unit of work.
    async fn begin(&self) -> Result<Box<dyn LendingTransaction>, LendingStoreError>;
}

/// Reads and writes inside one open transaction.
///
/// Dropping a transaction without calling [`LendingTransaction::commit`]
/// discards its writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingTransaction: Send {
    /// Lock the book row for the rest of the transaction and return it.
    async fn lock_book(&mut self, book_id: &BookId) -> Result<Option<Book>, LendingStoreError>;

    /// Overwrite the cached availability flag.
    async fn set_availability(
        &mut self,
        book_id: &BookId,
        availability: &Availability,
    ) -> Result<(), LendingStoreError>;

    /// Fetch a borrow record by id.
    async fn find_borrow(
        &mut self,
        borrow_id: &BorrowId,
    ) -> Result<Option<BorrowRecord>, LendingStoreError>;

    /// Fetch the active borrow of a book, whoever holds it.
    async fn find_active_borrow(
        &mut self,
        book_id: &BookId,
    ) -> Result<Option<BorrowRecord>, LendingStoreError>;

    /// Persist a newly opened borrow record.
    async fn insert_borrow(&mut self, record: &BorrowRecord) -> Result<(), LendingStoreError>;

    /// Persist status, due date, and return timestamp changes.
    async fn update_borrow(&mut self, record: &BorrowRecord) -> Result<(), LendingStoreError>;

    /// Append a closed loan to the history log.
    async fn append_history(&mut self, entry: &HistoryEntry) -> Result<(), LendingStoreError>;

    /// Load the book's wait list in position order.
    async fn load_wait_list(&mut self, book_id: &BookId) -> Result<WaitList, LendingStoreError>;

    /// Replace the book's stored wait list with `wait_list`.
    async fn save_wait_list(&mut self, wait_list: &WaitList) -> Result<(), LendingStoreError>;

    /// Fetch a reservation by id.
    async fn find_reservation(
        &mut self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, LendingStoreError>;

    /// Fetch the member's pending or available reservation for a book.
    async fn find_open_reservation(
        &mut self,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<Option<Reservation>, LendingStoreError>;

    /// Persist a new reservation.
    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), LendingStoreError>;

    /// Persist a reservation status change.
    async fn update_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), LendingStoreError>;

    /// Persist a notification.
    async fn insert_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<(), LendingStoreError>;

    /// Make every write visible atomically.
    async fn commit(&mut self) -> Result<(), LendingStoreError>;

    /// Discard every write.
    async fn rollback(&mut self) -> Result<(), LendingStoreError>;
}
