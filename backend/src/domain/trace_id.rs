//! Correlation id for one inbound request.
//!
//! The id sits in a Tokio task-local, so the lending services and the error
//! type can read it without threading a parameter through every port. Spawned
//! tasks do not inherit it; wrap their futures in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Header that carries the id in both directions.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Request correlation id.
///
/// # Examples
/// ```
/// use lending::TraceId;
///
/// let id = TraceId::adopt_or_generate(Some("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// A fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse an upstream id when it is a UUID, otherwise start a new one.
    ///
    /// Anything else a client sends is ignored rather than echoed back.
    #[must_use]
    pub fn adopt_or_generate(upstream: Option<&str>) -> Self {
        upstream
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(Self::generate)
    }

    /// The id of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const UPSTREAM: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    #[rstest]
    #[tokio::test]
    async fn scope_sets_and_clears_the_current_id() {
        let id = TraceId::generate();
        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
        assert_eq!(TraceId::current(), None);
    }

    #[rstest]
    #[case(Some(UPSTREAM))]
    #[case(Some(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 "))]
    fn uuid_headers_are_adopted(#[case] upstream: Option<&str>) {
        assert_eq!(TraceId::adopt_or_generate(upstream).to_string(), UPSTREAM);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("<script>"))]
    fn other_headers_are_replaced(#[case] upstream: Option<&str>) {
        let id = TraceId::adopt_or_generate(upstream);
        assert_ne!(Some(id.to_string().as_str()), upstream);
    }
}
