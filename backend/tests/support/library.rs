//! In-memory library fixture shared by the lending integration tests.
//!
//! Integration tests compile as separate crates, so each one pulls this file
//! in with `#[path = "support/library.rs"]`.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use lending::domain::{Book, BookId, LendingQueryService, LendingService, LoanPolicy};
use lending::outbound::memory::InMemoryLendingStore;
use mockable::Clock;

/// Clock frozen at one instant.
pub struct FrozenClock {
    utc_now: DateTime<Utc>,
}

impl FrozenClock {
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Ten in the morning, UTC, on `date`.
pub fn opening_time(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(10, 0, 0)
        .expect("valid opening time")
        .and_utc()
}

/// Both lending services over one shared in-memory store.
#[derive(Clone)]
pub struct Library {
    pub store: InMemoryLendingStore,
    pub lending: Arc<LendingService<InMemoryLendingStore>>,
    pub query: Arc<LendingQueryService<InMemoryLendingStore>>,
}

impl Library {
    pub fn open(now: DateTime<Utc>) -> Self {
        let store = InMemoryLendingStore::new();
        let shared = Arc::new(store.clone());
        Self {
            lending: Arc::new(LendingService::new(
                Arc::clone(&shared),
                Arc::new(FrozenClock::at(now)),
                LoanPolicy::default(),
            )),
            query: Arc::new(LendingQueryService::new(shared)),
            store,
        }
    }

    /// Add one available copy of a book and return its id.
    pub async fn stock(&self, title: &str, author: &str) -> BookId {
        let book = Book::new(BookId::random(), title, author);
        let id = book.id;
        self.store.seed_book(book).await;
        id
    }
}
