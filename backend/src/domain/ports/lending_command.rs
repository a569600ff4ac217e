//! Driving port for lending state transitions.
//!
//! Every request carries the acting member's id explicitly; the core never
//! reads ambient session state.

use async_trait::async_trait;

use crate::domain::{
    BookId, BorrowId, BorrowRecord, HistoryEntry, LendingError, Notification, QueuePosition,
    Reservation, ReservationId, UserId,
};

/// Borrow a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowBookRequest {
    /// Borrowing member.
    pub user_id: UserId,
    /// Book to borrow.
    pub book_id: BookId,
}

/// Outcome of a successful borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowBookResponse {
    /// The new active borrow; `due_at` is the due date.
    pub borrow: BorrowRecord,
}

/// Return a borrowed book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnBookRequest {
    /// Borrow record to close.
    pub borrow_id: BorrowId,
    /// Member asking to return it.
    pub user_id: UserId,
}

/// Outcome of a return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnBookResponse {
    /// History entry appended for the closed loan.
    pub history: HistoryEntry,
    /// Member the copy is now held for, when someone was waiting.
    pub held_for: Option<UserId>,
}

/// Extend an active loan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendBorrowRequest {
    /// Borrow record to extend.
    pub borrow_id: BorrowId,
    /// Member asking for the extension.
    pub user_id: UserId,
}

/// Outcome of an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendBorrowResponse {
    /// The borrow record with its new due date.
    pub borrow: BorrowRecord,
}

/// Join a book's wait list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveBookRequest {
    /// Reserving member.
    pub user_id: UserId,
    /// Book to wait for.
    pub book_id: BookId,
}

/// Outcome of a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveBookResponse {
    /// The pending reservation.
    pub reservation: Reservation,
    /// Position assigned in the wait list.
    pub position: QueuePosition,
}

/// Withdraw a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReservationRequest {
    /// Reservation to cancel.
    pub reservation_id: ReservationId,
    /// Member asking to cancel it.
    pub user_id: UserId,
}

/// Outcome of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelReservationResponse {
    /// The cancelled reservation.
    pub reservation: Reservation,
    /// Next member the copy passed to, when the cancelled hold was active.
    pub held_for: Option<UserId>,
}

/// Remind a borrower that a loan is coming due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReturnReminderRequest {
    /// Active borrow to remind about.
    pub borrow_id: BorrowId,
}

/// Lending use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LendingCommand: Send + Sync {
    /// Borrow a book that is available, or held for the caller.
    async fn borrow_book(
        &self,
        request: BorrowBookRequest,
    ) -> Result<BorrowBookResponse, LendingError>;

    /// Return a book and pass it to the next member in line.
    async fn return_book(
        &self,
        request: ReturnBookRequest,
    ) -> Result<ReturnBookResponse, LendingError>;

    /// Extend a loan while nobody is waiting.
    async fn extend_borrow(
        &self,
        request: ExtendBorrowRequest,
    ) -> Result<ExtendBorrowResponse, LendingError>;

    /// Reserve an unavailable book.
    async fn reserve_book(
        &self,
        request: ReserveBookRequest,
    ) -> Result<ReserveBookResponse, LendingError>;

    /// Cancel a reservation and leave the wait list.
    async fn cancel_reservation(
        &self,
        request: CancelReservationRequest,
    ) -> Result<CancelReservationResponse, LendingError>;

    /// Emit a due-date reminder for an active borrow.
    async fn send_return_reminder(
        &self,
        request: SendReturnReminderRequest,
    ) -> Result<Notification, LendingError>;
}
