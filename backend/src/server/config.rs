//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use lending::domain::LoanPolicy;
use lending::domain::ports::{FixtureLoginService, LoginService};
use lending::outbound::memory::InMemoryLendingStore;
use lending::outbound::persistence::DbPool;

/// Store backing the lending ports.
#[derive(Clone)]
pub enum LendingBackend {
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
    /// Process-local store; state is lost on restart.
    Memory(InMemoryLendingStore),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend: LendingBackend,
    pub(crate) loan_policy: LoanPolicy,
    pub(crate) login: Arc<dyn LoginService>,
}

impl ServerConfig {
    /// Construct a configuration backed by an in-memory store, the default
    /// loan policy, and the development login.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            backend: LendingBackend::Memory(InMemoryLendingStore::new()),
            loan_policy: LoanPolicy::default(),
            login: Arc::new(FixtureLoginService),
        }
    }

    /// Select the store backing the lending ports.
    #[must_use]
    pub fn with_backend(mut self, backend: LendingBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Override the loan policy.
    #[must_use]
    pub fn with_loan_policy(mut self, loan_policy: LoanPolicy) -> Self {
        self.loan_policy = loan_policy;
        self
    }

    /// Select how members sign in.
    #[must_use]
    pub fn with_login(mut self, login: Arc<dyn LoginService>) -> Self {
        self.login = login;
        self
    }
}
