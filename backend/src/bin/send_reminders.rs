//! Send due-date reminders for loans coming due.
//!
//! Meant to be run by an external scheduler such as cron; each run sweeps
//! once and exits.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use lending::domain::{LendingService, send_due_reminders};
use lending::outbound::persistence::{DbPool, DieselLendingRecords, DieselLendingStore, PoolConfig};
use lending::settings::LendingSettings;

/// `send-reminders` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "send-reminders",
    about = "Notify members whose loans fall due within the reminder horizon",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `LENDING_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Days ahead to look for due loans. Falls back to
    /// `LENDING_REMINDER_HORIZON_DAYS`.
    #[arg(long = "horizon-days", value_name = "days")]
    horizon_days: Option<u32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = LendingSettings::load_from_iter([OsString::from("send-reminders")])
        .wrap_err("failed to load settings")?;
    let database_url = args
        .database_url
        .or_else(|| settings.database_url.clone())
        .ok_or_else(|| eyre!("a database URL is required (--database-url or LENDING_DATABASE_URL)"))?;
    let horizon = args
        .horizon_days
        .map(|days| Duration::days(i64::from(days)))
        .unwrap_or_else(|| settings.reminder_horizon());

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("failed to create database pool")?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let lending = LendingService::new(
        Arc::new(DieselLendingStore::new(pool.clone())),
        clock.clone(),
        settings.loan_policy(),
    );
    let records = DieselLendingRecords::new(pool);

    let summary = send_due_reminders(&records, &lending, clock.utc(), horizon).await?;
    println!(
        "sent {} reminder(s), skipped {}, failed {}",
        summary.sent, summary.skipped, summary.failed
    );
    if summary.failed > 0 {
        return Err(eyre!("{} reminder(s) failed", summary.failed));
    }
    Ok(())
}
