//! Lending coordinator.
//!
//! Each command opens one [`LendingTransaction`], locks the affected book,
//! applies every ledger, queue, reservation, and notification change, and
//! commits. Any failure rolls the whole unit of work back, so callers never
//! observe a borrow without its availability flip or a queue with gaps.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    BorrowBookRequest, BorrowBookResponse, CancelReservationRequest, CancelReservationResponse,
    ExtendBorrowRequest, ExtendBorrowResponse, LendingCommand, LendingStore, LendingTransaction,
    ReserveBookRequest, ReserveBookResponse, ReturnBookRequest, ReturnBookResponse,
    SendReturnReminderRequest,
};
use crate::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, LendingError, LoanPolicy, Notification,
    NotificationEmitter, Reservation, ReservationId, ReservationStatus, UserId,
};

/// Coordinates borrow, return, extend, reserve, and cancel transitions.
pub struct LendingService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    policy: LoanPolicy,
    emitter: NotificationEmitter,
}

impl<S> LendingService<S>
where
    S: LendingStore,
{
    /// Create a coordinator over `store`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, policy: LoanPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            emitter: NotificationEmitter::new(&policy),
        }
    }

    async fn begin(&self, operation: &'static str) -> Result<Box<dyn LendingTransaction>, LendingError> {
        self.store.begin().await.map_err(|err| {
            error!(operation, error = %err, "failed to open lending transaction");
            LendingError::from(err)
        })
    }

    async fn finish<T>(
        &self,
        mut tx: Box<dyn LendingTransaction>,
        operation: &'static str,
        outcome: Result<T, LendingError>,
    ) -> Result<T, LendingError> {
        match outcome {
            Ok(value) => match tx.commit().await {
                Ok(()) => Ok(value),
                Err(err) => {
                    error!(operation, error = %err, "lending commit failed");
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(operation, error = %rollback_err, "rollback after failed commit failed");
                    }
                    Err(LendingError::from(err))
                }
            },
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(operation, error = %rollback_err, "lending rollback failed");
                }
                warn!(operation, reason = err.reason(), "lending operation rolled back");
                Err(err)
            }
        }
    }

    async fn locked_borrow(
        &self,
        tx: &mut dyn LendingTransaction,
        borrow_id: &BorrowId,
    ) -> Result<(BorrowRecord, Book), LendingError> {
        let unlocked = tx
            .find_borrow(borrow_id)
            .await?
            .ok_or(LendingError::BorrowNotFound)?;
        let book = tx
            .lock_book(&unlocked.book_id())
            .await?
            .ok_or(LendingError::BookNotFound)?;
        // Re-read now that the book lock serialises writers.
        let borrow = tx
            .find_borrow(borrow_id)
            .await?
            .ok_or(LendingError::BorrowNotFound)?;
        Ok((borrow, book))
    }

    async fn locked_reservation(
        &self,
        tx: &mut dyn LendingTransaction,
        reservation_id: &ReservationId,
    ) -> Result<(Reservation, Book), LendingError> {
        let unlocked = tx
            .find_reservation(reservation_id)
            .await?
            .ok_or(LendingError::ReservationNotFound)?;
        let book = tx
            .lock_book(&unlocked.book_id())
            .await?
            .ok_or(LendingError::BookNotFound)?;
        let reservation = tx
            .find_reservation(reservation_id)
            .await?
            .ok_or(LendingError::ReservationNotFound)?;
        Ok((reservation, book))
    }

    /// Close the member's open reservation for `book_id`, if any, and drop
    /// their queue entry.
    async fn consume_reservation(
        &self,
        tx: &mut dyn LendingTransaction,
        user_id: &UserId,
        book_id: &BookId,
    ) -> Result<(), LendingError> {
        let Some(mut reservation) = tx.find_open_reservation(user_id, book_id).await? else {
            return Ok(());
        };
        reservation
            .cancel()
            .map_err(|_| LendingError::ReservationClosed)?;
        tx.update_reservation(&reservation).await?;

        let mut wait_list = tx.load_wait_list(book_id).await?;
        if wait_list.remove(user_id).is_some() {
            tx.save_wait_list(&wait_list).await?;
        }
        debug!(reservation_id = %reservation.id(), "reservation consumed by borrow");
        Ok(())
    }

    /// Pass the copy to the first waiting member with an open reservation,
    /// or release it when nobody is waiting.
    async fn hand_over(
        &self,
        tx: &mut dyn LendingTransaction,
        book: &Book,
    ) -> Result<Option<UserId>, LendingError> {
        let now = self.clock.utc();
        let mut wait_list = tx.load_wait_list(&book.id).await?;

        while let Some(entry) = wait_list.dequeue_front() {
            let Some(mut reservation) = tx.find_open_reservation(&entry.user_id, &book.id).await?
            else {
                warn!(
                    book_id = %book.id,
                    user_id = %entry.user_id,
                    "dropping wait list entry without an open reservation"
                );
                continue;
            };
            reservation
                .mark_available()
                .map_err(|_| LendingError::ReservationClosed)?;
            tx.update_reservation(&reservation).await?;
            tx.save_wait_list(&wait_list).await?;
            tx.set_availability(&book.id, &Availability::held_for(entry.user_id))
                .await?;
            let notice = self.emitter.availability(entry.user_id, &book.title, now);
            tx.insert_notification(&notice).await?;
            return Ok(Some(entry.user_id));
        }

        tx.save_wait_list(&wait_list).await?;
        tx.set_availability(&book.id, &Availability::Available)
            .await?;
        Ok(None)
    }

    async fn borrow_in(
        &self,
        tx: &mut dyn LendingTransaction,
        request: &BorrowBookRequest,
    ) -> Result<BorrowBookResponse, LendingError> {
        let book = tx.lock_book(&request.book_id).await?;
        let active = tx.find_active_borrow(&request.book_id).await?;
        if active
            .as_ref()
            .is_some_and(|borrow| borrow.is_owned_by(&request.user_id))
        {
            return Err(LendingError::AlreadyBorrowed);
        }
        let book = book.ok_or(LendingError::BookNotFound)?;
        if active.is_some() || !book.availability.admits(&request.user_id) {
            return Err(LendingError::Unavailable);
        }

        let now = self.clock.utc();
        let borrow = BorrowRecord::open(
            BorrowId::random(),
            request.user_id,
            book.id,
            now,
            self.policy.due_date_from(now),
        );
        tx.insert_borrow(&borrow).await?;
        tx.set_availability(&book.id, &Availability::on_loan())
            .await?;
        self.consume_reservation(tx, &request.user_id, &book.id)
            .await?;
        Ok(BorrowBookResponse { borrow })
    }

    async fn return_in(
        &self,
        tx: &mut dyn LendingTransaction,
        request: &ReturnBookRequest,
    ) -> Result<ReturnBookResponse, LendingError> {
        let (mut borrow, book) = self.locked_borrow(tx, &request.borrow_id).await?;
        if !borrow.is_owned_by(&request.user_id) {
            return Err(LendingError::Forbidden);
        }
        let now = self.clock.utc();
        let history = borrow
            .mark_returned(now)
            .map_err(|_| LendingError::AlreadyReturned)?;
        tx.update_borrow(&borrow).await?;
        tx.append_history(&history).await?;

        let receipt = self
            .emitter
            .return_confirmation(request.user_id, &book.title, now);
        tx.insert_notification(&receipt).await?;

        let held_for = self.hand_over(tx, &book).await?;
        Ok(ReturnBookResponse { history, held_for })
    }

    async fn extend_in(
        &self,
        tx: &mut dyn LendingTransaction,
        request: &ExtendBorrowRequest,
    ) -> Result<ExtendBorrowResponse, LendingError> {
        let (mut borrow, book) = self.locked_borrow(tx, &request.borrow_id).await?;
        if !borrow.is_owned_by(&request.user_id) {
            return Err(LendingError::Forbidden);
        }
        if !borrow.is_active() {
            return Err(LendingError::NotActive);
        }
        let wait_list = tx.load_wait_list(&book.id).await?;
        if !wait_list.is_empty() {
            return Err(LendingError::QueueNonEmpty);
        }

        let due_at = self.policy.extended_due_date(borrow.due_at());
        borrow
            .extend_due_date(due_at)
            .map_err(|_| LendingError::NotActive)?;
        tx.update_borrow(&borrow).await?;
        Ok(ExtendBorrowResponse { borrow })
    }

    async fn reserve_in(
        &self,
        tx: &mut dyn LendingTransaction,
        request: &ReserveBookRequest,
    ) -> Result<ReserveBookResponse, LendingError> {
        let book = tx
            .lock_book(&request.book_id)
            .await?
            .ok_or(LendingError::BookNotFound)?;
        if tx
            .find_open_reservation(&request.user_id, &book.id)
            .await?
            .is_some()
        {
            return Err(LendingError::DuplicateReservation);
        }
        let active = tx.find_active_borrow(&book.id).await?;
        if active.is_some_and(|borrow| borrow.is_owned_by(&request.user_id)) {
            return Err(LendingError::AlreadyBorrowed);
        }

        let mut wait_list = tx.load_wait_list(&book.id).await?;
        if book.availability.is_available() && wait_list.is_empty() {
            return Err(LendingError::BookAvailable);
        }

        let now = self.clock.utc();
        let position = wait_list
            .enqueue(request.user_id, now)
            .map_err(|_| LendingError::AlreadyQueued)?;
        let reservation = Reservation::pending(ReservationId::random(), request.user_id, book.id, now);
        tx.insert_reservation(&reservation).await?;
        tx.save_wait_list(&wait_list).await?;
        Ok(ReserveBookResponse {
            reservation,
            position,
        })
    }

    async fn cancel_in(
        &self,
        tx: &mut dyn LendingTransaction,
        request: &CancelReservationRequest,
    ) -> Result<CancelReservationResponse, LendingError> {
        let (mut reservation, book) = self
            .locked_reservation(tx, &request.reservation_id)
            .await?;
        if !reservation.is_owned_by(&request.user_id) {
            return Err(LendingError::Forbidden);
        }
        let was_holding = reservation.status() == ReservationStatus::Available
            && book.availability.reserved_for() == Some(&request.user_id);
        reservation
            .cancel()
            .map_err(|_| LendingError::ReservationClosed)?;
        tx.update_reservation(&reservation).await?;

        let mut wait_list = tx.load_wait_list(&book.id).await?;
        if wait_list.remove(&request.user_id).is_some() {
            tx.save_wait_list(&wait_list).await?;
        }

        let held_for = if was_holding {
            self.hand_over(tx, &book).await?
        } else {
            None
        };
        Ok(CancelReservationResponse {
            reservation,
            held_for,
        })
    }

    async fn remind_in(
        &self,
        tx: &mut dyn LendingTransaction,
        request: &SendReturnReminderRequest,
    ) -> Result<Notification, LendingError> {
        let (mut borrow, book) = self.locked_borrow(tx, &request.borrow_id).await?;
        let now = self.clock.utc();
        borrow
            .mark_reminded(now)
            .map_err(|_| LendingError::NotActive)?;
        let notice =
            self.emitter
                .return_reminder(borrow.user_id(), &book.title, borrow.due_at(), now);
        tx.update_borrow(&borrow).await?;
        tx.insert_notification(&notice).await?;
        Ok(notice)
    }
}

#[async_trait]
impl<S> LendingCommand for LendingService<S>
where
    S: LendingStore,
{
    async fn borrow_book(
        &self,
        request: BorrowBookRequest,
    ) -> Result<BorrowBookResponse, LendingError> {
        const OPERATION: &str = "borrow_book";
        let mut tx = self.begin(OPERATION).await?;
        let outcome = self.borrow_in(tx.as_mut(), &request).await;
        let response = self.finish(tx, OPERATION, outcome).await?;
        info!(
            user_id = %request.user_id,
            book_id = %request.book_id,
            borrow_id = %response.borrow.id(),
            due_at = %response.borrow.due_at(),
            "book borrowed"
        );
        Ok(response)
    }

    async fn return_book(
        &self,
        request: ReturnBookRequest,
    ) -> Result<ReturnBookResponse, LendingError> {
        const OPERATION: &str = "return_book";
        let mut tx = self.begin(OPERATION).await?;
        let outcome = self.return_in(tx.as_mut(), &request).await;
        let response = self.finish(tx, OPERATION, outcome).await?;
        info!(
            user_id = %request.user_id,
            borrow_id = %request.borrow_id,
            book_id = %response.history.book_id,
            held_for = ?response.held_for,
            "book returned"
        );
        Ok(response)
    }

    async fn extend_borrow(
        &self,
        request: ExtendBorrowRequest,
    ) -> Result<ExtendBorrowResponse, LendingError> {
        const OPERATION: &str = "extend_borrow";
        let mut tx = self.begin(OPERATION).await?;
        let outcome = self.extend_in(tx.as_mut(), &request).await;
        let response = self.finish(tx, OPERATION, outcome).await?;
        info!(
            user_id = %request.user_id,
            borrow_id = %request.borrow_id,
            due_at = %response.borrow.due_at(),
            "borrow extended"
        );
        Ok(response)
    }

    async fn reserve_book(
        &self,
        request: ReserveBookRequest,
    ) -> Result<ReserveBookResponse, LendingError> {
        const OPERATION: &str = "reserve_book";
        let mut tx = self.begin(OPERATION).await?;
        let outcome = self.reserve_in(tx.as_mut(), &request).await;
        let response = self.finish(tx, OPERATION, outcome).await?;
        info!(
            user_id = %request.user_id,
            book_id = %request.book_id,
            reservation_id = %response.reservation.id(),
            position = %response.position,
            "book reserved"
        );
        Ok(response)
    }

    async fn cancel_reservation(
        &self,
        request: CancelReservationRequest,
    ) -> Result<CancelReservationResponse, LendingError> {
        const OPERATION: &str = "cancel_reservation";
        let mut tx = self.begin(OPERATION).await?;
        let outcome = self.cancel_in(tx.as_mut(), &request).await;
        let response = self.finish(tx, OPERATION, outcome).await?;
        info!(
            user_id = %request.user_id,
            reservation_id = %request.reservation_id,
            held_for = ?response.held_for,
            "reservation cancelled"
        );
        Ok(response)
    }

    async fn send_return_reminder(
        &self,
        request: SendReturnReminderRequest,
    ) -> Result<Notification, LendingError> {
        const OPERATION: &str = "send_return_reminder";
        let mut tx = self.begin(OPERATION).await?;
        let outcome = self.remind_in(tx.as_mut(), &request).await;
        let notice = self.finish(tx, OPERATION, outcome).await?;
        info!(
            borrow_id = %request.borrow_id,
            user_id = %notice.user_id,
            "return reminder created"
        );
        Ok(notice)
    }
}

#[cfg(test)]
#[path = "lending_service_tests.rs"]
mod tests;
