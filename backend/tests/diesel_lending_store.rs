//! Integration tests for the Diesel lending adapters.
//!
//! These run against the PostgreSQL database named by
//! `LENDING_TEST_DATABASE_URL` and are skipped when it is unset. Every test
//! stocks its own books, so runs can share one database.

use std::sync::{Arc, Mutex};

use chrono::{Duration, DurationRound, TimeDelta, Utc};
use futures::future::{join, join_all};
use lending::domain::ports::{
    BorrowBookRequest, CancelReservationRequest, ExtendBorrowRequest, LendingCommand,
    LendingQuery, LendingRecords, LendingStore, LendingTransaction, ReserveBookRequest,
    ReturnBookRequest, SendReturnReminderRequest,
};
use lending::domain::{
    Availability, Book, BookId, BorrowId, BorrowRecord, LendingError, LendingQueryService, LendingService, LoanPolicy,
    ReservationStatus, UserId,
};
use lending::outbound::persistence::{
    DbPool, DieselLendingRecords, DieselLendingStore, PoolConfig, run_pending_migrations,
};
use rstest::rstest;

#[path = "support/library.rs"]
mod library;

use library::FrozenClock;

const DATABASE_URL_ENV: &str = "LENDING_TEST_DATABASE_URL";

/// Serialises migration runs across concurrently executing tests.
static MIGRATION_LOCK: Mutex<()> = Mutex::new(());

struct PgLibrary {
    store: DieselLendingStore,
    records: DieselLendingRecords,
    lending: LendingService<DieselLendingStore>,
    query: LendingQueryService<DieselLendingRecords>,
}

impl PgLibrary {
    async fn stock(&self) -> BookId {
        let book = Book::new(BookId::random(), "The Dispossessed", "Ursula K. Le Guin");
        self.store.seed_book(&book).await.expect("seed book");
        book.id
    }
}

fn due_ids(due: &[BorrowRecord]) -> Vec<BorrowId> {
    due.iter().map(BorrowRecord::id).collect()
}

async fn connect() -> Option<PgLibrary> {
    let Ok(database_url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-DATABASE: {DATABASE_URL_ENV} is not set");
        return None;
    };
    let url = database_url.clone();
    tokio::task::spawn_blocking(move || {
        let _guard = MIGRATION_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        run_pending_migrations(&url)
    })
        .await
        .expect("migration task")
        .expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(4))
        .await
        .expect("create pool");
    let store = DieselLendingStore::new(pool.clone());
    // PostgreSQL keeps microseconds; whole seconds survive the round trip.
    let now = Utc::now()
        .duration_trunc(TimeDelta::seconds(1))
        .expect("truncate timestamp");
    Some(PgLibrary {
        lending: LendingService::new(
            Arc::new(store.clone()),
            Arc::new(FrozenClock::at(now)),
            LoanPolicy::default(),
        ),
        query: LendingQueryService::new(Arc::new(DieselLendingRecords::new(pool.clone()))),
        records: DieselLendingRecords::new(pool),
        store,
    })
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn borrow_and_return_round_trip() {
    let Some(library) = connect().await else {
        return;
    };
    let book_id = library.stock().await;
    let member = UserId::random();

    let borrow = library
        .lending
        .borrow_book(BorrowBookRequest {
            user_id: member,
            book_id,
        })
        .await
        .expect("borrow")
        .borrow;
    let book = library.query.get_book(&book_id).await.expect("book");
    assert!(!book.availability.is_available());
    let active = library.query.active_borrows(&member).await.expect("active");
    assert_eq!(active, vec![borrow.clone()]);

    let extended = library
        .lending
        .extend_borrow(ExtendBorrowRequest {
            borrow_id: borrow.id(),
            user_id: member,
        })
        .await
        .expect("extend")
        .borrow;
    assert_eq!(
        extended.due_at(),
        LoanPolicy::default().extended_due_date(borrow.due_at())
    );

    let returned = library
        .lending
        .return_book(ReturnBookRequest {
            borrow_id: borrow.id(),
            user_id: member,
        })
        .await
        .expect("return");
    assert_eq!(returned.held_for, None);
    let history = library.query.borrow_history(&member).await.expect("history");
    assert_eq!(history, vec![returned.history]);
    let book = library.query.get_book(&book_id).await.expect("book");
    assert!(book.availability.is_available());
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn return_hands_the_copy_to_the_queue() {
    let Some(library) = connect().await else {
        return;
    };
    let book_id = library.stock().await;
    let holder = UserId::random();
    let first = UserId::random();
    let second = UserId::random();
    let borrow = library
        .lending
        .borrow_book(BorrowBookRequest {
            user_id: holder,
            book_id,
        })
        .await
        .expect("borrow")
        .borrow;
    for user_id in [first, second] {
        library
            .lending
            .reserve_book(ReserveBookRequest { user_id, book_id })
            .await
            .expect("reserve");
    }

    let returned = library
        .lending
        .return_book(ReturnBookRequest {
            borrow_id: borrow.id(),
            user_id: holder,
        })
        .await
        .expect("return");

    assert_eq!(returned.held_for, Some(first));
    let book = library.query.get_book(&book_id).await.expect("book");
    assert_eq!(book.availability.reserved_for(), Some(&first));
    let held = library.query.reservations(&first).await.expect("held");
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].reservation.status(), ReservationStatus::Available);
    assert_eq!(held[0].position, None);
    let waiting = library.query.reservations(&second).await.expect("waiting");
    assert_eq!(waiting[0].position.map(u32::from), Some(1));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn row_lock_admits_one_concurrent_borrower() {
    let Some(library) = connect().await else {
        return;
    };
    let book_id = library.stock().await;

    let outcomes = join_all((0..4).map(|_| {
        library.lending.borrow_book(BorrowBookRequest {
            user_id: UserId::random(),
            book_id,
        })
    }))
    .await;

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(|err| *err == LendingError::Unavailable)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queue_changes_renumber_contiguously() {
    let Some(library) = connect().await else {
        return;
    };
    let book_id = library.stock().await;
    library
        .lending
        .borrow_book(BorrowBookRequest {
            user_id: UserId::random(),
            book_id,
        })
        .await
        .expect("borrow");
    let mut queued = Vec::new();
    for _ in 0..4 {
        let user_id = UserId::random();
        let reservation = library
            .lending
            .reserve_book(ReserveBookRequest { user_id, book_id })
            .await
            .expect("reserve")
            .reservation;
        queued.push((user_id, reservation.id()));
    }
    let leaving = [queued[0], queued[2]];
    let arriving = [UserId::random(), UserId::random()];

    let (cancelled, reserved) = join(
        join_all(leaving.iter().map(|(user_id, reservation_id)| {
            library.lending.cancel_reservation(CancelReservationRequest {
                reservation_id: *reservation_id,
                user_id: *user_id,
            })
        })),
        join_all(arriving.iter().map(|user_id| {
            library.lending.reserve_book(ReserveBookRequest {
                user_id: *user_id,
                book_id,
            })
        })),
    )
    .await;

    assert!(cancelled.iter().all(Result::is_ok));
    assert!(reserved.iter().all(Result::is_ok));
    let mut positions: Vec<u32> = library
        .query
        .book_reservations(&book_id)
        .await
        .expect("book reservations")
        .iter()
        .filter_map(|view| view.position.map(u32::from))
        .collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![1, 2, 3, 4]);
    for (expected, (user_id, _)) in (1_u32..).zip([queued[1], queued[3]].iter()) {
        let views = library.query.reservations(user_id).await.expect("views");
        assert_eq!(views[0].position.map(u32::from), Some(expected));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reminded_borrow_leaves_the_due_scan() {
    let Some(library) = connect().await else {
        return;
    };
    let book_id = library.stock().await;
    let borrow = library
        .lending
        .borrow_book(BorrowBookRequest {
            user_id: UserId::random(),
            book_id,
        })
        .await
        .expect("borrow")
        .borrow;
    let cutoff = borrow.due_at() + Duration::days(1);
    let before = library.records.borrows_due_before(cutoff).await.expect("scan");
    assert!(due_ids(&before).contains(&borrow.id()));

    library
        .lending
        .send_return_reminder(SendReturnReminderRequest {
            borrow_id: borrow.id(),
        })
        .await
        .expect("remind");

    let after = library.records.borrows_due_before(cutoff).await.expect("scan");
    assert!(!due_ids(&after).contains(&borrow.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rolled_back_transaction_leaves_no_trace() {
    let Some(library) = connect().await else {
        return;
    };
    let book_id = library.stock().await;

    {
        let mut tx = library.store.begin().await.expect("begin");
        let book = tx.lock_book(&book_id).await.expect("lock").expect("book");
        tx.set_availability(&book.id, &Availability::on_loan())
            .await
            .expect("flip availability");
        tx.rollback().await.expect("rollback");
    }

    let book = library.query.get_book(&book_id).await.expect("book");
    assert!(book.availability.is_available());
}
