//! Credentials a member signs in with.
//!
//! Verification belongs to whatever sits behind
//! [`crate::domain::ports::LoginService`]; this module only guarantees the
//! shape and keeps the password out of logs and freed memory.

use std::fmt;

use zeroize::Zeroizing;

/// Errors returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// The username is trimmed; the password is kept verbatim, wiped on drop,
/// and redacted from `Debug` output.
///
/// # Examples
/// ```
/// use lending::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("reader", "secret").expect("valid");
/// assert_eq!(creds.username(), "reader");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw form input.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        match (username.trim(), password) {
            ("", _) => Err(LoginValidationError::EmptyUsername),
            (_, "") => Err(LoginValidationError::EmptyPassword),
            (username, password) => Ok(Self {
                username: username.to_owned(),
                password: Zeroizing::new(password.to_owned()),
            }),
        }
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password exactly as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
