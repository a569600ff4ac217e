//! In-process lending store.
//!
//! Implements both [`LendingStore`] and [`LendingRecords`] over a single
//! mutex-guarded state. A transaction holds the mutex for its whole lifetime
//! and works on a staged copy, so commit swaps the copy in and rollback (or
//! drop) discards it. Holding the lock serialises every transaction, which
//! is a stronger guarantee than the per-book lock the port asks for.
//!
//! Used for local development without PostgreSQL and by behaviour tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::ports::{
    LendingRecords, LendingStore, LendingStoreError, LendingTransaction, ReservationView,
};
use crate::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, HistoryEntry, Notification,
    NotificationId, Reservation, ReservationId, UserId, WaitList,
};

#[derive(Debug, Default, Clone)]
struct LendingState {
    books: BTreeMap<BookId, Book>,
    borrows: BTreeMap<BorrowId, BorrowRecord>,
    history: Vec<HistoryEntry>,
    wait_lists: HashMap<BookId, WaitList>,
    reservations: BTreeMap<ReservationId, Reservation>,
    notifications: Vec<Notification>,
}

impl LendingState {
    fn open_reservation(&self, user_id: &UserId, book_id: &BookId) -> Option<&Reservation> {
        self.reservations.values().find(|reservation| {
            reservation.is_owned_by(user_id)
                && &reservation.book_id() == book_id
                && reservation.status().is_open()
        })
    }

    fn view(&self, reservation: &Reservation) -> ReservationView {
        let position = self
            .wait_lists
            .get(&reservation.book_id())
            .and_then(|queue| queue.position_of(&reservation.user_id()));
        ReservationView {
            reservation: reservation.clone(),
            position,
        }
    }
}

/// Mutex-backed lending store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLendingStore {
    state: Arc<Mutex<LendingState>>,
}

impl InMemoryLendingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a catalogue entry.
    pub async fn seed_book(&self, book: Book) {
        let mut state = self.state.lock().await;
        state.books.insert(book.id, book);
    }
}

struct InMemoryTransaction {
    guard: OwnedMutexGuard<LendingState>,
    staged: LendingState,
    open: bool,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> Result<(), LendingStoreError> {
        if self.open {
            Ok(())
        } else {
            Err(LendingStoreError::query("transaction already closed"))
        }
    }
}

#[async_trait]
impl LendingStore for InMemoryLendingStore {
    async fn begin(&self) -> Result<Box<dyn LendingTransaction>, LendingStoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            staged,
            open: true,
        }))
    }
}

#[async_trait]
impl LendingTransaction for InMemoryTransaction {
    async fn lock_book(&mut self, book_id: &BookId) -> Result<Option<Book>, LendingStoreError> {
        self.ensure_open()?;
        Ok(self.staged.books.get(book_id).cloned())
    }

    async fn set_availability(
        &mut self,
        book_id: &BookId,
        availability: &Availability,
    ) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        let book = self
            .staged
            .books
            .get_mut(book_id)
            .ok_or_else(|| LendingStoreError::query(format!("book {book_id} not found")))?;
        book.availability = *availability;
        Ok(())
    }

    async fn find_borrow(
        &mut self,
        borrow_id: &BorrowId,
    ) -> Result<Option<BorrowRecord>, LendingStoreError> {
        self.ensure_open()?;
        Ok(self.staged.borrows.get(borrow_id).cloned())
    }

    async fn find_active_borrow(
        &mut self,
        book_id: &BookId,
    ) -> Result<Option<BorrowRecord>, LendingStoreError> {
        self.ensure_open()?;
        Ok(self
            .staged
            .borrows
            .values()
            .find(|borrow| &borrow.book_id() == book_id && borrow.is_active())
            .cloned())
    }

    async fn insert_borrow(&mut self, record: &BorrowRecord) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        let clash = self
            .staged
            .borrows
            .values()
            .any(|borrow| borrow.book_id() == record.book_id() && borrow.is_active());
        if clash {
            return Err(LendingStoreError::conflict("book already has an active borrow"));
        }
        self.staged.borrows.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update_borrow(&mut self, record: &BorrowRecord) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        let slot = self
            .staged
            .borrows
            .get_mut(&record.id())
            .ok_or_else(|| LendingStoreError::query(format!("borrow {} not found", record.id())))?;
        *slot = record.clone();
        Ok(())
    }

    async fn append_history(&mut self, entry: &HistoryEntry) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        self.staged.history.push(entry.clone());
        Ok(())
    }

    async fn load_wait_list(&mut self, book_id: &BookId) -> Result<WaitList, LendingStoreError> {
        self.ensure_open()?;
        Ok(self
            .staged
            .wait_lists
            .get(book_id)
            .cloned()
            .unwrap_or_else(|| WaitList::empty(*book_id)))
    }

    async fn save_wait_list(&mut self, wait_list: &WaitList) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        if wait_list.is_empty() {
            self.staged.wait_lists.remove(&wait_list.book_id());
        } else {
            self.staged
                .wait_lists
                .insert(wait_list.book_id(), wait_list.clone());
        }
        Ok(())
    }

    async fn find_reservation(
        &mut self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, LendingStoreError> {
        self.ensure_open()?;
        Ok(self.staged.reservations.get(reservation_id).cloned())
    }

    async fn find_open_reservation(
        &mut self,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<Option<Reservation>, LendingStoreError> {
        self.ensure_open()?;
        Ok(self.staged.open_reservation(user_id, book_id).cloned())
    }

    async fn insert_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        if self
            .staged
            .open_reservation(&reservation.user_id(), &reservation.book_id())
            .is_some()
        {
            return Err(LendingStoreError::conflict(
                "member already holds an open reservation for this book",
            ));
        }
        self.staged
            .reservations
            .insert(reservation.id(), reservation.clone());
        Ok(())
    }

    async fn update_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        let slot = self
            .staged
            .reservations
            .get_mut(&reservation.id())
            .ok_or_else(|| {
                LendingStoreError::query(format!("reservation {} not found", reservation.id()))
            })?;
        *slot = reservation.clone();
        Ok(())
    }

    async fn insert_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        self.staged.notifications.push(notification.clone());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), LendingStoreError> {
        self.ensure_open()?;
        *self.guard = std::mem::take(&mut self.staged);
        self.open = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), LendingStoreError> {
        self.open = false;
        Ok(())
    }
}

#[async_trait]
impl LendingRecords for InMemoryLendingStore {
    async fn find_book(&self, book_id: &BookId) -> Result<Option<Book>, LendingStoreError> {
        Ok(self.state.lock().await.books.get(book_id).cloned())
    }

    async fn active_borrows(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<BorrowRecord>, LendingStoreError> {
        let state = self.state.lock().await;
        let mut borrows: Vec<_> = state
            .borrows
            .values()
            .filter(|borrow| borrow.is_owned_by(user_id) && borrow.is_active())
            .cloned()
            .collect();
        borrows.sort_by_key(BorrowRecord::due_at);
        Ok(borrows)
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, LendingStoreError> {
        let state = self.state.lock().await;
        let mut entries: Vec<_> = state
            .history
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.returned_at.cmp(&a.returned_at));
        Ok(entries)
    }

    async fn reservations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ReservationView>, LendingStoreError> {
        let state = self.state.lock().await;
        let mut open: Vec<_> = state
            .reservations
            .values()
            .filter(|reservation| reservation.is_owned_by(user_id) && reservation.status().is_open())
            .collect();
        open.sort_by(|a, b| b.reserved_at().cmp(&a.reserved_at()));
        Ok(open.into_iter().map(|reservation| state.view(reservation)).collect())
    }

    async fn book_reservations(
        &self,
        book_id: &BookId,
    ) -> Result<Vec<ReservationView>, LendingStoreError> {
        let state = self.state.lock().await;
        let mut open: Vec<_> = state
            .reservations
            .values()
            .filter(|reservation| {
                &reservation.book_id() == book_id && reservation.status().is_open()
            })
            .collect();
        open.sort_by_key(|reservation| reservation.reserved_at());
        Ok(open.into_iter().map(|reservation| state.view(reservation)).collect())
    }

    async fn notifications(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, LendingStoreError> {
        let state = self.state.lock().await;
        let mut notices: Vec<_> = state
            .notifications
            .iter()
            .filter(|notice| &notice.user_id == user_id)
            .cloned()
            .collect();
        notices.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(notices)
    }

    async fn delete_notification(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<bool, LendingStoreError> {
        let mut state = self.state.lock().await;
        let before = state.notifications.len();
        state
            .notifications
            .retain(|notice| !(&notice.id == notification_id && &notice.user_id == user_id));
        Ok(state.notifications.len() < before)
    }

    async fn borrows_due_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BorrowRecord>, LendingStoreError> {
        let state = self.state.lock().await;
        let mut due: Vec<_> = state
            .borrows
            .values()
            .filter(|borrow| {
                borrow.is_active() && borrow.reminded_at().is_none() && borrow.due_at() < cutoff
            })
            .cloned()
            .collect();
        due.sort_by_key(BorrowRecord::due_at);
        Ok(due)
    }
}
