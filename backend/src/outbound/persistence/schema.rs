//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Catalogue entries. One physical copy per row.
    books (id) {
        id -> Uuid,
        title -> Varchar,
        author -> Varchar,
        publication_date -> Nullable<Date>,
        /// `available` or `unavailable`.
        availability_status -> Varchar,
        /// Member the copy is held for while unavailable.
        reserved_for -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Borrow ledger. A partial unique index allows one active row per book.
    borrows (id) {
        id -> Uuid,
        user_id -> Uuid,
        book_id -> Uuid,
        borrowed_at -> Timestamptz,
        due_at -> Timestamptz,
        returned_at -> Nullable<Timestamptz>,
        /// `active` or `returned`.
        status -> Varchar,
        /// Last due-date reminder for the current due date.
        reminded_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Append-only log of closed loans.
    borrow_history (id) {
        id -> Int8,
        user_id -> Uuid,
        book_id -> Uuid,
        borrowed_at -> Timestamptz,
        returned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reservations. A partial unique index allows one open row per member
    /// and book.
    reservations (id) {
        id -> Uuid,
        user_id -> Uuid,
        book_id -> Uuid,
        reserved_at -> Timestamptz,
        /// `pending`, `available`, or `cancelled`.
        status -> Varchar,
    }
}

diesel::table! {
    /// Per-book FIFO queues. `(book_id, position)` is unique, checked at
    /// commit.
    wait_list_entries (book_id, user_id) {
        book_id -> Uuid,
        user_id -> Uuid,
        position -> Int4,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Member inboxes.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        message -> Text,
        sent_at -> Timestamptz,
        /// `availability`, `reminder`, or `return`.
        kind -> Varchar,
    }
}

diesel::joinable!(borrows -> books (book_id));
diesel::joinable!(borrow_history -> books (book_id));
diesel::joinable!(reservations -> books (book_id));
diesel::joinable!(wait_list_entries -> books (book_id));

diesel::allow_tables_to_appear_in_same_query!(
    books,
    borrows,
    borrow_history,
    reservations,
    wait_list_entries,
    notifications,
);
