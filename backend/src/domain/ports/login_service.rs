//! Driving port for the identity collaborator.
//!
//! Credential verification lives outside the lending core. Inbound adapters
//! call this port to turn credentials into a [`UserId`] and then pass that id
//! into every lending call.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Authentication use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated member id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}

/// Development authenticator: `admin` / `password` maps to a fixed member.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

/// Member id issued by [`FixtureLoginService`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.username() == "admin" && credentials.password() == "password" {
            UserId::new(FIXTURE_USER_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin", "password", true)]
    #[case("admin", "wrong", false)]
    #[case("reader", "password", false)]
    #[tokio::test]
    async fn fixture_accepts_only_the_development_account(
        #[case] username: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = LoginCredentials::try_from_parts(username, password).expect("credentials shape");
        let result = FixtureLoginService.authenticate(&creds).await;

        match (should_succeed, result) {
            (true, Ok(id)) => assert_eq!(id.to_string(), FIXTURE_USER_ID),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (expected, other) => panic!("expected success={expected}, got {other:?}"),
        }
    }
}
