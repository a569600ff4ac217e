//! Borrow ledger entities: active loans, the history log, and loan policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowId, UserId};

/// Lifecycle state of a borrow record. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowStatus {
    /// The member currently holds the copy.
    Active,
    /// The copy came back; the record is closed.
    Returned,
}

impl BorrowStatus {
    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Returned => "returned",
        }
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "returned" => Ok(Self::Returned),
            other => Err(UnknownStatus::new(other)),
        }
    }
}

/// Raised when a persisted status string has no matching variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status value: {value}")]
pub struct UnknownStatus {
    value: String,
}

impl UnknownStatus {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Ledger transition failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The record is not `Active`.
    #[error("borrow record is not active")]
    NotActive,
}

/// Immutable log line appended when a loan closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Member who held the copy.
    pub user_id: UserId,
    /// Book that was loaned.
    pub book_id: BookId,
    /// Start of the loan.
    pub borrowed_at: DateTime<Utc>,
    /// When the copy came back.
    pub returned_at: DateTime<Utc>,
}

/// A loan of a book to a member.
///
/// ## Invariants
/// - `returned_at` is set if and only if `status` is [`BorrowStatus::Returned`].
/// - `reminded_at` refers to the current due date; extending the loan
///   clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    id: BorrowId,
    user_id: UserId,
    book_id: BookId,
    borrowed_at: DateTime<Utc>,
    due_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
    status: BorrowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reminded_at: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    /// Open a new active loan.
    pub fn open(
        id: BorrowId,
        user_id: UserId,
        book_id: BookId,
        borrowed_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            borrowed_at,
            due_at,
            returned_at: None,
            status: BorrowStatus::Active,
            reminded_at: None,
        }
    }

    /// Rebuild a record loaded from storage.
    ///
    /// Returns `None` when the status and return timestamp disagree.
    pub fn restore(
        id: BorrowId,
        user_id: UserId,
        book_id: BookId,
        borrowed_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
        returned_at: Option<DateTime<Utc>>,
        status: BorrowStatus,
    ) -> Option<Self> {
        let consistent = match status {
            BorrowStatus::Active => returned_at.is_none(),
            BorrowStatus::Returned => returned_at.is_some(),
        };
        consistent.then_some(Self {
            id,
            user_id,
            book_id,
            borrowed_at,
            due_at,
            returned_at,
            status,
            reminded_at: None,
        })
    }

    /// Attach the time a due-date reminder was last sent, as loaded from
    /// storage.
    #[must_use]
    pub fn with_reminded_at(mut self, reminded_at: Option<DateTime<Utc>>) -> Self {
        self.reminded_at = reminded_at;
        self
    }

    /// Record identifier.
    pub fn id(&self) -> BorrowId {
        self.id
    }

    /// Borrowing member.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Borrowed book.
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// Start of the loan.
    pub fn borrowed_at(&self) -> DateTime<Utc> {
        self.borrowed_at
    }

    /// Current due date.
    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    /// Return timestamp once closed.
    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.returned_at
    }

    /// When the member was last reminded of the current due date.
    pub fn reminded_at(&self) -> Option<DateTime<Utc>> {
        self.reminded_at
    }

    /// Lifecycle state.
    pub fn status(&self) -> BorrowStatus {
        self.status
    }

    /// True while the member still holds the copy.
    pub fn is_active(&self) -> bool {
        matches!(self.status, BorrowStatus::Active)
    }

    /// True when `user` owns this record.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    /// Close the loan and produce the matching history entry.
    pub fn mark_returned(&mut self, returned_at: DateTime<Utc>) -> Result<HistoryEntry, LedgerError> {
        if !self.is_active() {
            return Err(LedgerError::NotActive);
        }
        self.status = BorrowStatus::Returned;
        self.returned_at = Some(returned_at);
        Ok(HistoryEntry {
            user_id: self.user_id,
            book_id: self.book_id,
            borrowed_at: self.borrowed_at,
            returned_at,
        })
    }

    /// Move the due date of an active loan.
    pub fn extend_due_date(&mut self, new_due_at: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.is_active() {
            return Err(LedgerError::NotActive);
        }
        self.due_at = new_due_at;
        self.reminded_at = None;
        Ok(())
    }

    /// Note that the member was reminded of the current due date.
    pub fn mark_reminded(&mut self, reminded_at: DateTime<Utc>) -> Result<(), LedgerError> {
        if !self.is_active() {
            return Err(LedgerError::NotActive);
        }
        self.reminded_at = Some(reminded_at);
        Ok(())
    }
}

/// Loan timing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    loan_period: Duration,
    extension: Duration,
    pickup_window_days: u32,
}

/// Default loan length in days.
pub const DEFAULT_LOAN_DAYS: u32 = 14;
/// Default extension length in days.
pub const DEFAULT_EXTENSION_DAYS: u32 = 7;
/// Days a held copy is advertised as waiting for pickup.
pub const DEFAULT_PICKUP_WINDOW_DAYS: u32 = 3;

impl Default for LoanPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_LOAN_DAYS,
            DEFAULT_EXTENSION_DAYS,
            DEFAULT_PICKUP_WINDOW_DAYS,
        )
    }
}

impl LoanPolicy {
    /// Build a policy from day counts.
    #[must_use]
    pub fn new(loan_days: u32, extension_days: u32, pickup_window_days: u32) -> Self {
        Self {
            loan_period: Duration::days(i64::from(loan_days)),
            extension: Duration::days(i64::from(extension_days)),
            pickup_window_days,
        }
    }

    /// Due date for a loan starting at `borrowed_at`.
    #[must_use]
    pub fn due_date_from(&self, borrowed_at: DateTime<Utc>) -> DateTime<Utc> {
        borrowed_at + self.loan_period
    }

    /// Due date after one extension; counted from the current due date.
    #[must_use]
    pub fn extended_due_date(&self, current_due_at: DateTime<Utc>) -> DateTime<Utc> {
        current_due_at + self.extension
    }

    /// Pickup window quoted to members whose hold becomes available.
    #[must_use]
    pub const fn pickup_window_days(&self) -> u32 {
        self.pickup_window_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn active() -> BorrowRecord {
        BorrowRecord::open(
            BorrowId::random(),
            UserId::random(),
            BookId::random(),
            at(1),
            at(15),
        )
    }

    #[rstest]
    fn returning_produces_matching_history(mut active: BorrowRecord) {
        let history = active.mark_returned(at(10)).expect("active record");

        assert_eq!(active.status(), BorrowStatus::Returned);
        assert_eq!(active.returned_at(), Some(at(10)));
        assert_eq!(history.user_id, active.user_id());
        assert_eq!(history.book_id, active.book_id());
        assert_eq!(history.borrowed_at, active.borrowed_at());
        assert_eq!(history.returned_at, at(10));
    }

    #[rstest]
    fn closed_records_reject_transitions(mut active: BorrowRecord) {
        active.mark_returned(at(10)).expect("first return");

        assert_eq!(active.mark_returned(at(11)), Err(LedgerError::NotActive));
        assert_eq!(active.extend_due_date(at(20)), Err(LedgerError::NotActive));
    }

    #[rstest]
    fn extension_rearms_the_reminder(mut active: BorrowRecord) {
        active.mark_reminded(at(13)).expect("active record");
        assert_eq!(active.reminded_at(), Some(at(13)));

        active.extend_due_date(at(22)).expect("active record");

        assert_eq!(active.reminded_at(), None);
    }

    #[rstest]
    fn closed_records_cannot_be_reminded(mut active: BorrowRecord) {
        active.mark_returned(at(10)).expect("first return");
        assert_eq!(active.mark_reminded(at(11)), Err(LedgerError::NotActive));
    }

    #[rstest]
    fn restore_rejects_inconsistent_rows() {
        let restored = BorrowRecord::restore(
            BorrowId::random(),
            UserId::random(),
            BookId::random(),
            at(1),
            at(15),
            None,
            BorrowStatus::Returned,
        );
        assert!(restored.is_none());
    }

    #[rstest]
    fn policy_counts_extension_from_current_due_date() {
        let policy = LoanPolicy::default();

        assert_eq!(policy.due_date_from(at(1)), at(15));
        assert_eq!(policy.extended_due_date(at(15)), at(22));
        assert_eq!(policy.pickup_window_days(), 3);
    }

    #[rstest]
    #[case("active", BorrowStatus::Active)]
    #[case("returned", BorrowStatus::Returned)]
    fn status_parses_persisted_values(#[case] raw: &str, #[case] expected: BorrowStatus) {
        assert_eq!(raw.parse::<BorrowStatus>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn status_rejects_legacy_strings() {
        assert!("En cours".parse::<BorrowStatus>().is_err());
    }
}
