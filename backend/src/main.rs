//! Lending server entry-point: loads settings, prepares the store, and serves
//! the REST API.

mod server;

use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lending::domain::Book;
use lending::domain::ports::{FixtureLoginService, LoginService};
use lending::inbound::http::health::HealthState;
use lending::outbound::catalog_file::load_catalog;
use lending::outbound::member_accounts::MemberAccounts;
use lending::outbound::memory::InMemoryLendingStore;
use lending::outbound::persistence::{
    DbPool, DieselLendingStore, PoolConfig, run_pending_migrations,
};
use lending::settings::LendingSettings;
use server::{LendingBackend, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = LendingSettings::load().wrap_err("failed to load settings")?;
    let key = session_key(&settings)?;
    let catalog = match &settings.catalog_file {
        Some(path) => load_catalog(path)?,
        None => Vec::new(),
    };
    let backend = prepare_backend(&settings, catalog).await?;

    let config = ServerConfig::new(key, settings.cookie_secure, SameSite::Lax, settings.bind_addr())
        .with_backend(backend)
        .with_loan_policy(settings.loan_policy())
        .with_login(login_service(&settings)?);

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %settings.bind_addr(), "starting lending server");
    let server = create_server(health_state, config)?;
    server.await.wrap_err("server terminated with an error")
}

fn session_key(settings: &LendingSettings) -> Result<Key> {
    let path = settings.session_key_file();
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) if settings.session_allow_ephemeral || cfg!(debug_assertions) => {
            warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(e) => Err(eyre!("failed to read session key at {}: {e}", path.display())),
    }
}

fn login_service(settings: &LendingSettings) -> Result<Arc<dyn LoginService>> {
    let Some(path) = &settings.member_accounts_file else {
        warn!("no member accounts file configured; only the development account can sign in");
        return Ok(Arc::new(FixtureLoginService));
    };
    let accounts = MemberAccounts::load(path)?;
    if accounts.is_empty() {
        warn!(path = %path.display(), "member accounts file lists nobody");
    }
    info!(members = accounts.len(), "member accounts loaded");
    Ok(Arc::new(accounts))
}

async fn prepare_backend(settings: &LendingSettings, catalog: Vec<Book>) -> Result<LendingBackend> {
    let Some(database_url) = settings.database_url.clone() else {
        warn!("no database URL configured; lending state is kept in memory");
        let store = InMemoryLendingStore::new();
        for book in catalog {
            store.seed_book(book).await;
        }
        return Ok(LendingBackend::Memory(store));
    };

    let url = database_url.clone();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
        .await
        .wrap_err("migration task panicked")??;
    info!(applied, "database migrations complete");

    let mut pool_config = PoolConfig::new(database_url);
    if let Some(size) = settings.database_pool_size {
        pool_config = pool_config.with_max_size(size);
    }
    let pool = DbPool::new(pool_config).await?;
    seed_catalog(&DieselLendingStore::new(pool.clone()), &catalog).await?;
    Ok(LendingBackend::Postgres(pool))
}

async fn seed_catalog(store: &DieselLendingStore, catalog: &[Book]) -> Result<()> {
    for book in catalog {
        store
            .seed_book(book)
            .await
            .wrap_err_with(|| format!("failed to seed book {}", book.id))?;
    }
    if !catalog.is_empty() {
        info!(books = catalog.len(), "catalogue seeded");
    }
    Ok(())
}
