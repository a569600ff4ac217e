//! Builders wiring the lending services onto the configured store.

use std::sync::Arc;

use mockable::DefaultClock;

use lending::domain::ports::{LendingRecords, LendingStore, LoginService};
use lending::domain::{LendingQueryService, LendingService, LoanPolicy};
use lending::inbound::http::state::HttpState;
use lending::outbound::persistence::{DieselLendingRecords, DieselLendingStore};

use super::config::LendingBackend;

fn lending_state<S, R>(
    login: Arc<dyn LoginService>,
    store: Arc<S>,
    records: Arc<R>,
    policy: LoanPolicy,
) -> HttpState
where
    S: LendingStore + 'static,
    R: LendingRecords + 'static,
{
    HttpState::new(
        login,
        Arc::new(LendingService::new(store, Arc::new(DefaultClock), policy)),
        Arc::new(LendingQueryService::new(records)),
    )
}

/// Build HTTP state for the selected backend.
///
/// The in-memory store serves both the transactional and the read port, so
/// reads observe the same state the coordinator commits.
pub(super) fn build_http_state(
    backend: &LendingBackend,
    policy: LoanPolicy,
    login: Arc<dyn LoginService>,
) -> HttpState {
    match backend {
        LendingBackend::Postgres(pool) => lending_state(
            login,
            Arc::new(DieselLendingStore::new(pool.clone())),
            Arc::new(DieselLendingRecords::new(pool.clone())),
            policy,
        ),
        LendingBackend::Memory(store) => {
            let store = Arc::new(store.clone());
            lending_state(login, store.clone(), store, policy)
        }
    }
}
