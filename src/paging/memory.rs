//! In-memory queryable and executer.
//!
//! Useful for sources already loaded into memory (e.g. rows returned by a
//! DataLoader batch) and as the reference executer in tests: every executed
//! step is recorded so callers can assert on round-trips.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use parking_lot::Mutex;

use crate::error::{PagingError, PagingResult};
use crate::paging::executer::{QueryExecuter, Queryable, StepName};

/// A window over an already ordered, shared slice of rows.
#[derive(Debug, Clone)]
pub struct VecQuery<T> {
    rows: Arc<[T]>,
    offset: usize,
    limit: Option<usize>,
}

impl<T> VecQuery<T> {
    pub fn new(rows: impl Into<Arc<[T]>>) -> Self {
        Self {
            rows: rows.into(),
            offset: 0,
            limit: None,
        }
    }

    /// Rows currently selected by the window.
    pub fn window(&self) -> &[T] {
        let len = self.rows.len();
        let start = self.offset.min(len);
        let end = match self.limit {
            Some(limit) => start.saturating_add(limit).min(len),
            None => len,
        };
        &self.rows[start..end]
    }
}

impl<T: Clone + Send + Sync> Queryable for VecQuery<T> {
    type Item = T;

    fn skip(mut self, count: i64) -> Self {
        let count = usize::try_from(count).unwrap_or(0);
        self.offset = self.offset.saturating_add(count);
        self.limit = self.limit.map(|limit| limit.saturating_sub(count));
        self
    }

    fn take(mut self, count: i64) -> Self {
        let count = usize::try_from(count).unwrap_or(0);
        self.limit = Some(self.limit.map_or(count, |limit| limit.min(count)));
        self
    }
}

/// Executes [`VecQuery`] windows and keeps a log of what ran.
#[derive(Debug, Default)]
pub struct MemoryExecuter {
    steps: Mutex<Vec<String>>,
    fetched: Mutex<usize>,
    failure: Option<String>,
}

impl MemoryExecuter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An executer whose every query fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Names of the steps executed so far, in order.
    pub fn executed_steps(&self) -> Vec<String> {
        self.steps.lock().clone()
    }

    /// Total rows handed back by `to_list` and `stream` so far.
    pub fn fetched_rows(&self) -> usize {
        *self.fetched.lock()
    }

    pub fn reset(&self) {
        self.steps.lock().clear();
        *self.fetched.lock() = 0;
    }

    fn run<T: Clone>(&self, query: &VecQuery<T>, step: StepName<'_>) -> PagingResult<Vec<T>> {
        self.record(step)?;
        let rows = query.window().to_vec();
        *self.fetched.lock() += rows.len();
        tracing::trace!(step = %step, rows = rows.len(), "In-memory query");
        Ok(rows)
    }

    fn record(&self, step: StepName<'_>) -> PagingResult<()> {
        self.steps.lock().push(step.to_string());
        match &self.failure {
            Some(message) => Err(PagingError::source(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<T> QueryExecuter<VecQuery<T>> for MemoryExecuter
where
    T: Clone + Send + Sync + 'static,
{
    async fn to_list(&self, query: VecQuery<T>, step: StepName<'_>) -> PagingResult<Vec<T>> {
        self.run(&query, step)
    }

    async fn count(&self, query: VecQuery<T>, step: StepName<'_>) -> PagingResult<i64> {
        self.record(step)?;
        Ok(query.window().len() as i64)
    }

    fn stream<'a>(&'a self, query: VecQuery<T>, step: StepName<'a>) -> BoxStream<'a, PagingResult<T>>
    where
        VecQuery<T>: 'a,
    {
        stream::once(async move {
            let rows = self.run(&query, step)?;
            Ok::<_, PagingError>(stream::iter(rows.into_iter().map(Ok::<T, PagingError>)))
        })
        .try_flatten()
        .boxed()
    }
}
