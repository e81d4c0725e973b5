//! The query-execution boundary the paginator drives.
//!
//! The paginator never touches a data source directly. It composes
//! [`Queryable::skip`] / [`Queryable::take`] onto an already ordered query and
//! hands the result to a [`QueryExecuter`], which runs it against whatever
//! store backs the query (an in-memory slice, SQLite, ...).

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::error::{PagingError, PagingResult};

/// An ordered, composable query.
///
/// Implementations must keep whatever ordering was applied before paging and
/// compose windows the usual way: `skip(a).take(b)` selects rows `a..a + b`;
/// `take` only ever narrows; a `skip` after a `take` shrinks the remaining take.
pub trait Queryable: Clone + Send + Sync {
    type Item: Send;

    fn skip(self, count: i64) -> Self;

    fn take(self, count: i64) -> Self;
}

/// Diagnostic name of an executed step, for tracing only.
///
/// A lazy name is only rendered when something actually formats it, so
/// building an expensive label costs nothing while debug logging is off.
#[derive(Clone, Copy)]
pub enum StepName<'a> {
    Fixed(&'a str),
    Lazy(&'a (dyn Fn() -> String + Send + Sync)),
}

impl fmt::Display for StepName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepName::Fixed(name) => f.write_str(name),
            StepName::Lazy(render) => f.write_str(&render()),
        }
    }
}

impl fmt::Debug for StepName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StepName({self})")
    }
}

impl<'a> From<&'a str> for StepName<'a> {
    fn from(name: &'a str) -> Self {
        StepName::Fixed(name)
    }
}

/// Executes queries against the underlying store.
///
/// Every method must preserve the ordering already present in `query`.
#[async_trait]
pub trait QueryExecuter<Q: Queryable>: Send + Sync {
    /// Materialize the query fully.
    async fn to_list(&self, query: Q, step: StepName<'_>) -> PagingResult<Vec<Q::Item>>;

    /// Count the rows the query would return.
    async fn count(&self, query: Q, step: StepName<'_>) -> PagingResult<i64>;

    /// Lazily stream the query. Nothing may run until the stream is polled.
    fn stream<'a>(&'a self, query: Q, step: StepName<'a>) -> BoxStream<'a, PagingResult<Q::Item>>
    where
        Q: 'a;
}

/// Request-scoped state shared by every query a single connection resolution
/// issues.
#[derive(Debug, Clone, Default)]
pub struct PagingContext {
    cancel: Option<CancellationToken>,
}

impl PagingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inherit the surrounding request's cancellation token.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    /// Checked only at query boundaries; an in-flight query is never interrupted.
    pub fn ensure_active(&self) -> PagingResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(PagingError::Cancelled),
            _ => Ok(()),
        }
    }
}
