//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    books, borrow_history, borrows, notifications, reservations, wait_list_entries,
};

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Row struct for reading from the books table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
    pub availability_status: String,
    pub reserved_for: Option<Uuid>,
}

/// Insertable struct for seeding catalogue rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub author: &'a str,
    pub publication_date: Option<NaiveDate>,
    pub availability_status: &'a str,
    pub reserved_for: Option<Uuid>,
}

/// Changeset for the cached availability flag.
///
/// `reserved_for` must be cleared explicitly, so `None` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AvailabilityUpdate<'a> {
    pub availability_status: &'a str,
    pub reserved_for: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Borrow ledger
// ---------------------------------------------------------------------------

/// Row struct for the borrows table; also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = borrows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BorrowRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: String,
    pub reminded_at: Option<DateTime<Utc>>,
}

/// Changeset for due date extension, reminders, and return.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = borrows)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BorrowUpdate<'a> {
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: &'a str,
    pub reminded_at: Option<DateTime<Utc>>,
}

/// Row struct for reading closed loans.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = borrow_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HistoryRow {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
}

/// Insertable struct for the history log; `id` is a database sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = borrow_history)]
pub(crate) struct NewHistoryRow {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reservations and wait lists
// ---------------------------------------------------------------------------

/// Row struct for the reservations table; also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReservationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub reserved_at: DateTime<Utc>,
    pub status: String,
}

/// Row struct for wait list entries; also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = wait_list_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WaitListRow {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub position: i32,
    pub joined_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Row struct for member notifications; also used for inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub kind: String,
}
