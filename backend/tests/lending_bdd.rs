//! Behaviour tests for the lending rules over the in-memory store.
//!
//! Members are named in the feature file and mapped to fresh user ids the
//! first time a step mentions them.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use lending::domain::ports::{
    BorrowBookRequest, CancelReservationRequest, ExtendBorrowRequest, LendingCommand,
    LendingQuery, ReserveBookRequest, ReservationView, ReturnBookRequest,
};
use lending::domain::{
    BookId, BorrowId, LendingError, NotificationKind, ReservationId, ReservationStatus, UserId,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

#[path = "support/library.rs"]
mod library;

use library::{Library, opening_time};

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

/// Wrapper for non-Clone types to enable storage in `Slot`.
#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct LendingWorld {
    runtime: Slot<RuntimeHandle>,
    library: Slot<Library>,
    book_id: Slot<BookId>,
    members: Slot<HashMap<String, UserId>>,
    borrow_id: Slot<BorrowId>,
    due_at: Slot<DateTime<Utc>>,
    reservations: Slot<HashMap<String, ReservationId>>,
    last_error: Slot<LendingError>,
}

impl LendingWorld {
    fn open_library(&self, date: NaiveDate) {
        let runtime = Runtime::new().expect("create runtime");
        let library = Library::open(opening_time(date));
        let book_id = runtime.block_on(library.stock("Solaris", "Stanisław Lem"));

        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.library.set(library);
        self.book_id.set(book_id);
    }

    fn block_on<T>(&self, operation: impl std::future::Future<Output = T>) -> T {
        let runtime = self.runtime.get().expect("library should be open");
        runtime.0.block_on(operation)
    }

    fn library(&self) -> Library {
        self.library.get().expect("library should be open")
    }

    fn book_id(&self) -> BookId {
        self.book_id.get().expect("book should be stocked")
    }

    fn member(&self, name: &str) -> UserId {
        let mut members = self.members.take().unwrap_or_default();
        let id = *members.entry(name.to_owned()).or_insert_with(UserId::random);
        self.members.set(members);
        id
    }

    fn borrow(&self, name: &str) -> Result<(), LendingError> {
        let request = BorrowBookRequest {
            user_id: self.member(name),
            book_id: self.book_id(),
        };
        let library = self.library();
        let response = self.block_on(library.lending.borrow_book(request))?;
        self.borrow_id.set(response.borrow.id());
        self.due_at.set(response.borrow.due_at());
        Ok(())
    }

    fn reserve(&self, name: &str) -> Result<(), LendingError> {
        let request = ReserveBookRequest {
            user_id: self.member(name),
            book_id: self.book_id(),
        };
        let library = self.library();
        let response = self.block_on(library.lending.reserve_book(request))?;
        let mut reservations = self.reservations.take().unwrap_or_default();
        reservations.insert(name.to_owned(), response.reservation.id());
        self.reservations.set(reservations);
        Ok(())
    }

    fn record(&self, outcome: Result<(), LendingError>) {
        if let Err(err) = outcome {
            self.last_error.set(err);
        }
    }

    fn reservation_view(&self, name: &str) -> ReservationView {
        let user_id = self.member(name);
        let book_id = self.book_id();
        let library = self.library();
        let views = self
            .block_on(library.query.reservations(&user_id))
            .expect("reservations should load");
        views
            .into_iter()
            .find(|view| view.reservation.book_id() == book_id)
            .unwrap_or_else(|| panic!("member {name} has no open reservation"))
    }
}

#[fixture]
fn world() -> LendingWorld {
    LendingWorld::default()
}

fn parse_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("ISO date")
}

// -----------------------------------------------------------------------------
// Given Steps
// -----------------------------------------------------------------------------

#[given("a library holding a single copy of a book on {date}")]
fn a_library_holding_a_single_copy(world: &LendingWorld, date: String) {
    world.open_library(parse_date(&date));
}

#[given("member {member} has borrowed the book")]
fn member_has_borrowed_the_book(world: &LendingWorld, member: String) {
    world.borrow(&member).expect("borrow should succeed");
}

#[given("member {member} has reserved the book")]
fn member_has_reserved_the_book(world: &LendingWorld, member: String) {
    world.reserve(&member).expect("reservation should succeed");
}

// -----------------------------------------------------------------------------
// When Steps
// -----------------------------------------------------------------------------

#[when("member {member} borrows the book")]
fn member_borrows_the_book(world: &LendingWorld, member: String) {
    world.record(world.borrow(&member));
}

#[when("member {member} reserves the book")]
fn member_reserves_the_book(world: &LendingWorld, member: String) {
    world.record(world.reserve(&member));
}

#[when("member {member} returns the book")]
fn member_returns_the_book(world: &LendingWorld, member: String) {
    let request = ReturnBookRequest {
        borrow_id: world.borrow_id.get().expect("a borrow should exist"),
        user_id: world.member(&member),
    };
    let library = world.library();
    let outcome = world
        .block_on(library.lending.return_book(request))
        .map(|_| ());
    world.record(outcome);
}

#[when("member {member} extends the borrow")]
fn member_extends_the_borrow(world: &LendingWorld, member: String) {
    let request = ExtendBorrowRequest {
        borrow_id: world.borrow_id.get().expect("a borrow should exist"),
        user_id: world.member(&member),
    };
    let library = world.library();
    let outcome = world
        .block_on(library.lending.extend_borrow(request))
        .map(|response| world.due_at.set(response.borrow.due_at()));
    world.record(outcome);
}

#[when("member {member} cancels the reservation")]
fn member_cancels_the_reservation(world: &LendingWorld, member: String) {
    let reservation_id = world
        .reservations
        .get()
        .and_then(|reservations| reservations.get(&member).copied())
        .expect("member should hold a reservation");
    let request = CancelReservationRequest {
        reservation_id,
        user_id: world.member(&member),
    };
    let library = world.library();
    let outcome = world
        .block_on(library.lending.cancel_reservation(request))
        .map(|_| ());
    world.record(outcome);
}

// -----------------------------------------------------------------------------
// Then Steps
// -----------------------------------------------------------------------------

#[then("the borrow is due on {date}")]
fn the_borrow_is_due_on(world: &LendingWorld, date: String) {
    let due_at = world.due_at.get().expect("a due date should be recorded");
    assert_eq!(due_at.date_naive(), parse_date(&date));
}

#[then("the book is unavailable")]
fn the_book_is_unavailable(world: &LendingWorld) {
    let library = world.library();
    let book = world
        .block_on(library.query.get_book(&world.book_id()))
        .expect("book should load");
    assert!(!book.availability.is_available());
}

#[then("member {member} is at position {position}")]
fn member_is_at_position(world: &LendingWorld, member: String, position: String) {
    let expected: u32 = position.parse().expect("numeric position");
    let view = world.reservation_view(&member);
    assert_eq!(view.position.map(u32::from), Some(expected));
}

#[then("the reservation of member {member} is pending")]
fn the_reservation_is_pending(world: &LendingWorld, member: String) {
    let view = world.reservation_view(&member);
    assert_eq!(view.reservation.status(), ReservationStatus::Pending);
}

#[then("the reservation of member {member} is available")]
fn the_reservation_is_available(world: &LendingWorld, member: String) {
    let view = world.reservation_view(&member);
    assert_eq!(view.reservation.status(), ReservationStatus::Available);
    assert_eq!(view.position, None);
}

#[then("member {member} has an availability notification")]
fn member_has_an_availability_notification(world: &LendingWorld, member: String) {
    let user_id = world.member(&member);
    let library = world.library();
    let notifications = world
        .block_on(library.query.notifications(&user_id))
        .expect("notifications should load");
    assert!(
        notifications
            .iter()
            .any(|notice| notice.kind == NotificationKind::Availability),
        "expected an availability notification, got {notifications:?}"
    );
}

#[then("the book is held for member {member}")]
fn the_book_is_held_for(world: &LendingWorld, member: String) {
    let user_id = world.member(&member);
    let library = world.library();
    let book = world
        .block_on(library.query.get_book(&world.book_id()))
        .expect("book should load");
    assert_eq!(book.availability.reserved_for(), Some(&user_id));
}

#[then("the request fails with {reason}")]
fn the_request_fails_with(world: &LendingWorld, reason: String) {
    let error = world.last_error.get().expect("the request should have failed");
    assert_eq!(error.reason(), reason);
}

// -----------------------------------------------------------------------------
// Scenario Bindings
// -----------------------------------------------------------------------------

#[scenario(
    path = "tests/features/lending.feature",
    name = "Borrowing an available book"
)]
fn borrowing_an_available_book(world: LendingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/lending.feature",
    name = "Reserving a book that is on loan"
)]
fn reserving_a_book_that_is_on_loan(world: LendingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/lending.feature",
    name = "Returning a book passes it to the first member in line"
)]
fn returning_a_book_passes_it_on(world: LendingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/lending.feature",
    name = "Extending a loan only while nobody is waiting"
)]
fn extending_a_loan_only_while_nobody_is_waiting(world: LendingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/lending.feature",
    name = "Cancelling a reservation renumbers the queue"
)]
fn cancelling_a_reservation_renumbers_the_queue(world: LendingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/lending.feature",
    name = "Borrowing a book twice is rejected"
)]
fn borrowing_a_book_twice_is_rejected(world: LendingWorld) {
    let _ = world;
}
