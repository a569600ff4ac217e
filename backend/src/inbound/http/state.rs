//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LendingCommand, LendingQuery, LoginService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub lending: Arc<dyn LendingCommand>,
    pub lending_query: Arc<dyn LendingQuery>,
}

impl HttpState {
    /// Construct state from port implementations.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use lending::domain::ports::FixtureLoginService;
    /// use lending::domain::{LendingQueryService, LendingService, LoanPolicy};
    /// use lending::inbound::http::state::HttpState;
    /// use lending::outbound::memory::InMemoryLendingStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryLendingStore::new());
    /// let state = HttpState::new(
    ///     Arc::new(FixtureLoginService),
    ///     Arc::new(LendingService::new(
    ///         store.clone(),
    ///         Arc::new(DefaultClock),
    ///         LoanPolicy::default(),
    ///     )),
    ///     Arc::new(LendingQueryService::new(store)),
    /// );
    /// let _lending = state.lending.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        lending: Arc<dyn LendingCommand>,
        lending_query: Arc<dyn LendingQuery>,
    ) -> Self {
        Self {
            login,
            lending,
            lending_query,
        }
    }
}
