//! Per-book FIFO wait list.
//!
//! A [`WaitList`] is loaded for one book inside a lending transaction,
//! mutated in memory, and written back whole. Positions are always the
//! contiguous sequence `1..=len` in join order; every mutation renumbers
//! before returning, so callers never observe gaps or duplicates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, UserId};

/// One-based position in a wait list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QueuePosition(u32);

impl QueuePosition {
    /// Front of the queue.
    pub const FIRST: Self = Self(1);

    /// Validate a raw position. Zero is rejected.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
        Self(raw)
    }

    /// Raw one-based value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for QueuePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<QueuePosition> for u32 {
    fn from(value: QueuePosition) -> Self {
        value.0
    }
}

impl TryFrom<u32> for QueuePosition {
    type Error = WaitListError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(WaitListError::ZeroPosition)
    }
}

/// A member's place in a book's queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitListEntry {
    /// Queued book.
    pub book_id: BookId,
    /// Waiting member.
    pub user_id: UserId,
    /// Current position.
    pub position: QueuePosition,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// Wait list failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WaitListError {
    /// The member already has an entry for this book.
    #[error("user is already queued for this book")]
    AlreadyQueued,
    /// Persisted positions are not exactly `1..=n`.
    #[error("wait list positions are not contiguous")]
    NonContiguous,
    /// An entry for a different book was supplied.
    #[error("wait list entry belongs to another book")]
    ForeignEntry,
    /// Position zero is never valid.
    #[error("queue positions start at 1")]
    ZeroPosition,
}

/// Ordered queue for a single book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitList {
    book_id: BookId,
    entries: Vec<WaitListEntry>,
}

impl WaitList {
    /// An empty queue.
    #[must_use]
    pub fn empty(book_id: BookId) -> Self {
        Self {
            book_id,
            entries: Vec::new(),
        }
    }

    /// Rebuild a queue from stored entries, validating the invariants.
    pub fn from_entries(
        book_id: BookId,
        mut entries: Vec<WaitListEntry>,
    ) -> Result<Self, WaitListError> {
        if entries.iter().any(|entry| entry.book_id != book_id) {
            return Err(WaitListError::ForeignEntry);
        }
        entries.sort_by_key(|entry| entry.position);
        for (index, entry) in entries.iter().enumerate() {
            if entry.position != QueuePosition::from_index(index) {
                return Err(WaitListError::NonContiguous);
            }
        }
        for (index, entry) in entries.iter().enumerate() {
            let duplicate = entries
                .iter()
                .skip(index + 1)
                .any(|other| other.user_id == entry.user_id);
            if duplicate {
                return Err(WaitListError::AlreadyQueued);
            }
        }
        Ok(Self { book_id, entries })
    }

    /// Book this queue belongs to.
    #[must_use]
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// Entries in position order.
    #[must_use]
    pub fn entries(&self) -> &[WaitListEntry] {
        &self.entries
    }

    /// Number of waiting members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nobody is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at position 1.
    #[must_use]
    pub fn front(&self) -> Option<&WaitListEntry> {
        self.entries.first()
    }

    /// Append `user` at `max position + 1` (or 1 when empty).
    pub fn enqueue(
        &mut self,
        user_id: UserId,
        joined_at: DateTime<Utc>,
    ) -> Result<QueuePosition, WaitListError> {
        if self.position_of(&user_id).is_some() {
            return Err(WaitListError::AlreadyQueued);
        }
        let position = QueuePosition::from_index(self.entries.len());
        self.entries.push(WaitListEntry {
            book_id: self.book_id,
            user_id,
            position,
            joined_at,
        });
        Ok(position)
    }

    /// Remove and return the entry with the lowest position.
    pub fn dequeue_front(&mut self) -> Option<WaitListEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let front = self.entries.remove(0);
        self.renumber();
        Some(front)
    }

    /// Remove `user`'s entry; everyone behind moves up one place.
    pub fn remove(&mut self, user_id: &UserId) -> Option<WaitListEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| &entry.user_id == user_id)?;
        let removed = self.entries.remove(index);
        self.renumber();
        Some(removed)
    }

    /// Current position of `user`, if queued.
    #[must_use]
    pub fn position_of(&self, user_id: &UserId) -> Option<QueuePosition> {
        self.entries
            .iter()
            .find(|entry| &entry.user_id == user_id)
            .map(|entry| entry.position)
    }

    fn renumber(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.position = QueuePosition::from_index(index);
        }
    }
}
