//! Reservation tracker entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::UnknownStatus;
use super::{BookId, ReservationId, UserId};

/// Reservation lifecycle.
///
/// `Pending -> Available -> (consumed by borrowing)` or
/// `Pending | Available -> Cancelled`. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Waiting in the queue.
    Pending,
    /// The copy is held for this member.
    Available,
    /// Withdrawn or consumed.
    Cancelled,
}

impl ReservationStatus {
    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Available => "available",
            Self::Cancelled => "cancelled",
        }
    }

    /// Pending and Available reservations are open.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "available" => Ok(Self::Available),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus::new(other)),
        }
    }
}

/// Illegal reservation transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReservationTransitionError {
    /// Only pending reservations can become available.
    #[error("reservation is not pending")]
    NotPending,
    /// Cancelled reservations cannot change.
    #[error("reservation is already cancelled")]
    AlreadyCancelled,
}

/// A member's claim on the next turn with a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    id: ReservationId,
    user_id: UserId,
    book_id: BookId,
    reserved_at: DateTime<Utc>,
    status: ReservationStatus,
}

impl Reservation {
    /// Create a pending reservation.
    pub fn pending(
        id: ReservationId,
        user_id: UserId,
        book_id: BookId,
        reserved_at: DateTime<Utc>,
    ) -> Self {
        Self::restore(id, user_id, book_id, reserved_at, ReservationStatus::Pending)
    }

    /// Rebuild a reservation loaded from storage.
    pub fn restore(
        id: ReservationId,
        user_id: UserId,
        book_id: BookId,
        reserved_at: DateTime<Utc>,
        status: ReservationStatus,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            reserved_at,
            status,
        }
    }

    /// Reservation identifier.
    pub fn id(&self) -> ReservationId {
        self.id
    }

    /// Reserving member.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Reserved book.
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// When the member joined the queue.
    pub fn reserved_at(&self) -> DateTime<Utc> {
        self.reserved_at
    }

    /// Current status.
    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    /// True when `user` owns this reservation.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    /// Pending to Available, once the member reaches the front of the queue.
    pub fn mark_available(&mut self) -> Result<(), ReservationTransitionError> {
        match self.status {
            ReservationStatus::Pending => {
                self.status = ReservationStatus::Available;
                Ok(())
            }
            ReservationStatus::Available => Err(ReservationTransitionError::NotPending),
            ReservationStatus::Cancelled => Err(ReservationTransitionError::AlreadyCancelled),
        }
    }

    /// Close the reservation.
    pub fn cancel(&mut self) -> Result<(), ReservationTransitionError> {
        match self.status {
            ReservationStatus::Pending | ReservationStatus::Available => {
                self.status = ReservationStatus::Cancelled;
                Ok(())
            }
            ReservationStatus::Cancelled => Err(ReservationTransitionError::AlreadyCancelled),
        }
    }
}
