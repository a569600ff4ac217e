//! Catalogue records and the availability flag the lending rules maintain.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, UserId};

/// Whether the single copy of a book can be borrowed.
///
/// `Unavailable { reserved_for: Some(user) }` is the hold placed on a returned
/// book for the member at the front of its wait list. Only that member may
/// borrow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    /// No active borrow and nobody holds the copy.
    Available,
    /// On loan, or held for the next member in line.
    Unavailable {
        /// Member the copy is held for after a return.
        #[serde(rename = "reservedFor", skip_serializing_if = "Option::is_none", default)]
        reserved_for: Option<UserId>,
    },
}

impl Availability {
    /// The copy is out on loan.
    #[must_use]
    pub const fn on_loan() -> Self {
        Self::Unavailable { reserved_for: None }
    }

    /// The copy is held for `user` until they borrow it or cancel.
    #[must_use]
    pub const fn held_for(user: UserId) -> Self {
        Self::Unavailable {
            reserved_for: Some(user),
        }
    }

    /// True when anybody may borrow the copy.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Member the copy is held for, if any.
    #[must_use]
    pub const fn reserved_for(&self) -> Option<&UserId> {
        match self {
            Self::Unavailable { reserved_for } => reserved_for.as_ref(),
            Self::Available => None,
        }
    }

    /// True when `user` may borrow the copy right now.
    #[must_use]
    pub fn admits(&self, user: &UserId) -> bool {
        match self {
            Self::Available => true,
            Self::Unavailable { reserved_for } => reserved_for.as_ref() == Some(user),
        }
    }
}

/// A catalogue book. The library owns exactly one copy of each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Stable identifier.
    pub id: BookId,
    /// Title used in notification messages.
    pub title: String,
    /// Author as catalogued.
    pub author: String,
    /// Publication date when known.
    pub publication_date: Option<NaiveDate>,
    /// Cached availability, kept in step with the borrow ledger.
    pub availability: Availability,
}

impl Book {
    /// Build an available book.
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            publication_date: None,
            availability: Availability::Available,
        }
    }

    /// Attach a publication date.
    #[must_use]
    pub fn with_publication_date(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    /// Replace the availability flag.
    #[must_use]
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }
}
