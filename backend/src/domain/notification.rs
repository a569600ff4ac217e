//! Notification records and the emitter that renders them.
//!
//! Delivery (email, push) is handled elsewhere; this module only creates the
//! rows members read from their inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::UnknownStatus;
use super::{LoanPolicy, NotificationId, UserId};

/// Why a notification was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A held copy is ready for pickup.
    Availability,
    /// A loan is coming due.
    Reminder,
    /// A loan was closed.
    Return,
}

impl NotificationKind {
    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Availability => "availability",
            Self::Reminder => "reminder",
            Self::Return => "return",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "availability" => Ok(Self::Availability),
            "reminder" => Ok(Self::Reminder),
            "return" => Ok(Self::Return),
            other => Err(UnknownStatus::new(other)),
        }
    }
}

/// A message in a member's inbox. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Rendered message.
    pub message: String,
    /// Creation time.
    pub sent_at: DateTime<Utc>,
    /// Category.
    pub kind: NotificationKind,
}

/// Renders notification messages for lending events.
#[derive(Debug, Clone, Copy)]
pub struct NotificationEmitter {
    pickup_window_days: u32,
}

impl NotificationEmitter {
    /// Emitter quoting the pickup window from `policy`.
    #[must_use]
    pub const fn new(policy: &LoanPolicy) -> Self {
        Self {
            pickup_window_days: policy.pickup_window_days(),
        }
    }

    /// The held copy of `book_title` is ready for `user_id`.
    pub fn availability(&self, user_id: UserId, book_title: &str, now: DateTime<Utc>) -> Notification {
        let message = format!(
            "The book '{book_title}' that you reserved is now available for pickup. \
             You have {} days to borrow this book before your reservation expires.",
            self.pickup_window_days
        );
        Self::build(user_id, message, now, NotificationKind::Availability)
    }

    /// `book_title` is due back on `due_at`.
    pub fn return_reminder(
        &self,
        user_id: UserId,
        book_title: &str,
        due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Notification {
        let message = format!(
            "Reminder: The book '{book_title}' is due to be returned on {}. Please return it on time.",
            due_at.format("%Y-%m-%d")
        );
        Self::build(user_id, message, now, NotificationKind::Reminder)
    }

    /// `user_id` returned `book_title`.
    pub fn return_confirmation(
        &self,
        user_id: UserId,
        book_title: &str,
        now: DateTime<Utc>,
    ) -> Notification {
        let message = format!("Thank you for returning '{book_title}'.");
        Self::build(user_id, message, now, NotificationKind::Return)
    }

    fn build(
        user_id: UserId,
        message: String,
        sent_at: DateTime<Utc>,
        kind: NotificationKind,
    ) -> Notification {
        Notification {
            id: NotificationId::random(),
            user_id,
            message,
            sent_at,
            kind,
        }
    }
}
