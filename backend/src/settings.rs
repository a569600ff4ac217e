//! Lending settings loaded via OrthoConfig.
//!
//! Shared by the HTTP server and the `send-reminders` binary. Every field can
//! be set with a `LENDING_`-prefixed environment variable, a CLI flag, or a
//! configuration file.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_EXTENSION_DAYS, DEFAULT_LOAN_DAYS, DEFAULT_PICKUP_WINDOW_DAYS, LoanPolicy,
};

const DEFAULT_REMINDER_HORIZON_DAYS: u32 = 2;
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Configuration for the lending server and its maintenance binaries.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LENDING")]
pub struct LendingSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub database_pool_size: Option<u32>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Fall back to a generated session key when the key file is missing.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// JSON catalogue loaded into the store at startup.
    pub catalog_file: Option<PathBuf>,
    /// JSON list of member accounts with bcrypt password hashes. Without it
    /// only the development account can sign in.
    pub member_accounts_file: Option<PathBuf>,
    /// Loan length in days.
    pub loan_days: Option<u32>,
    /// Days added by one extension.
    pub extension_days: Option<u32>,
    /// Days a held copy waits for pickup, quoted in availability notices.
    pub pickup_window_days: Option<u32>,
    /// How far ahead `send-reminders` looks for due loans, in days.
    pub reminder_horizon_days: Option<u32>,
}

impl LendingSettings {
    /// Address to bind, falling back to all interfaces on port 8080.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Session key path, falling back to the mounted secret.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Loan policy with any configured overrides applied.
    pub fn loan_policy(&self) -> LoanPolicy {
        LoanPolicy::new(
            self.loan_days.unwrap_or(DEFAULT_LOAN_DAYS),
            self.extension_days.unwrap_or(DEFAULT_EXTENSION_DAYS),
            self.pickup_window_days.unwrap_or(DEFAULT_PICKUP_WINDOW_DAYS),
        )
    }

    /// Window ahead of now in which active loans get a reminder.
    pub fn reminder_horizon(&self) -> Duration {
        Duration::days(i64::from(
            self.reminder_horizon_days
                .unwrap_or(DEFAULT_REMINDER_HORIZON_DAYS),
        ))
    }
}
