//! Member accounts file backing the `LoginService` port.
//!
//! ```json
//! [{"username": "alice", "memberId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
//!   "passwordHash": "$2b$12$..."}]
//! ```
//!
//! Passwords are stored as bcrypt hashes only. Verification runs on the
//! blocking pool so a login never stalls an Actix worker.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::ports::LoginService;
use crate::domain::{Error, LoginCredentials, UserId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AccountEntry {
    username: String,
    member_id: UserId,
    password_hash: String,
}

struct Account {
    member_id: UserId,
    password_hash: String,
}

/// Why an accounts document was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AccountsFormatError {
    /// Not a JSON array of account entries.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Two entries share a username.
    #[error("username {username} is listed more than once")]
    DuplicateUsername { username: String },
    /// The stored hash is not a bcrypt hash.
    #[error("password hash for {username} is not a bcrypt hash")]
    InvalidHash { username: String },
}

/// Errors raised while loading an accounts file.
#[derive(Debug, thiserror::Error)]
pub enum MemberAccountsError {
    /// The file could not be read.
    #[error("failed to read member accounts at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid accounts document.
    #[error("invalid member accounts at {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: AccountsFormatError,
    },
}

/// Username to member mapping checked against bcrypt hashes.
#[derive(Clone)]
pub struct MemberAccounts {
    accounts: Arc<HashMap<String, Account>>,
}

impl MemberAccounts {
    /// Parse an accounts document.
    ///
    /// # Errors
    ///
    /// Returns [`AccountsFormatError`] for malformed JSON, a repeated
    /// username, or a hash bcrypt cannot read.
    pub fn parse(raw: &str) -> Result<Self, AccountsFormatError> {
        let entries: Vec<AccountEntry> = serde_json::from_str(raw)?;
        let mut accounts = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.password_hash.parse::<bcrypt::HashParts>().is_err() {
                return Err(AccountsFormatError::InvalidHash {
                    username: entry.username,
                });
            }
            if accounts.contains_key(&entry.username) {
                return Err(AccountsFormatError::DuplicateUsername {
                    username: entry.username,
                });
            }
            accounts.insert(
                entry.username,
                Account {
                    member_id: entry.member_id,
                    password_hash: entry.password_hash,
                },
            );
        }
        Ok(Self {
            accounts: Arc::new(accounts),
        })
    }

    /// Read and parse an accounts file.
    ///
    /// # Errors
    ///
    /// Returns [`MemberAccountsError`] when the file is unreadable or invalid.
    pub fn load(path: &Path) -> Result<Self, MemberAccountsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| MemberAccountsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| MemberAccountsError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of configured members.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no member can sign in.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl fmt::Debug for MemberAccounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberAccounts")
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LoginService for MemberAccounts {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let account = self.accounts.get(credentials.username());
        // Unknown usernames still pay for one hash check.
        let Some(checked) = account.or_else(|| self.accounts.values().next()) else {
            return Err(Error::unauthorized("invalid credentials"));
        };
        let hash = checked.password_hash.clone();
        let password = Zeroizing::new(credentials.password().to_owned());
        let verified =
            tokio::task::spawn_blocking(move || bcrypt::verify(password.as_bytes(), &hash))
                .await
                .map_err(|err| Error::internal(format!("password check aborted: {err}")))?
                .map_err(|err| Error::internal(format!("password check failed: {err}")))?;
        match (verified, account) {
            (true, Some(account)) => Ok(account.member_id),
            _ => Err(Error::unauthorized("invalid credentials")),
        }
    }
}
