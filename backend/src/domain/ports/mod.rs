//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`LendingCommand`, `LendingQuery`, `LoginService`) are what
//! inbound adapters call. Driven ports (`LendingStore`, `LendingRecords`) are
//! what persistence adapters implement.

mod lending_command;
mod lending_query;
mod lending_records;
mod lending_store;
mod login_service;

#[cfg(test)]
pub use lending_command::MockLendingCommand;
pub use lending_command::{
    BorrowBookRequest, BorrowBookResponse, CancelReservationRequest, CancelReservationResponse,
    ExtendBorrowRequest, ExtendBorrowResponse, LendingCommand, ReserveBookRequest,
    ReserveBookResponse, ReturnBookRequest, ReturnBookResponse, SendReturnReminderRequest,
};
#[cfg(test)]
pub use lending_query::MockLendingQuery;
pub use lending_query::LendingQuery;
#[cfg(test)]
pub use lending_records::MockLendingRecords;
pub use lending_records::{LendingRecords, ReservationView};
#[cfg(test)]
pub use lending_store::{MockLendingStore, MockLendingTransaction};
pub use lending_store::{LendingStore, LendingStoreError, LendingTransaction};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_USER_ID, FixtureLoginService, LoginService};
