//! Member identity carried in the session cookie.
//!
//! Handlers extract [`MemberSession`] and pass the resulting [`UserId`] into
//! every port call; the domain never sees the cookie.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const MEMBER_KEY: &str = "member_id";

/// The acting member's session.
#[derive(Clone)]
pub struct MemberSession(Session);

impl MemberSession {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record `member` as signed in.
    ///
    /// The session id is renewed first so a cookie issued before login
    /// cannot be replayed as the member.
    pub fn sign_in(&self, member: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(MEMBER_KEY, member.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Forget the member and expire the cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// The signed-in member, if any.
    ///
    /// A value that no longer parses as a member id is treated as a missing
    /// login rather than a server fault.
    pub fn member(&self) -> Result<Option<UserId>, Error> {
        let Some(raw) = self
            .0
            .get::<String>(MEMBER_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
        else {
            return Ok(None);
        };
        Ok(UserId::new(&raw)
            .inspect_err(|error| warn!(%error, "discarding malformed member id in session"))
            .ok())
    }

    /// The signed-in member, or `401 Unauthorized`.
    pub fn require_member(&self) -> Result<UserId, Error> {
        self.member()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for MemberSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(Self::new) })
    }
}
