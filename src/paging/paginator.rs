//! Windowed page materialization.
//!
//! [`materialize`] turns a [`PagePlan`] into at most two queries:
//!
//! 1. The window query. It fetches one sentinel row past the requested page
//!    (is there a next page?) and, when a cursor skip is active, starts one
//!    row early so the cursor's own row comes back too (does the cursor
//!    exist, i.e. is there a previous page?). A page of `n` rows therefore
//!    costs at most `n + 2` rows.
//! 2. The probe. Only when a skip returned nothing at all: the cursor row is
//!    missing, which means either the sequence is empty or the cursor points
//!    past its end. A short `take` against the unskipped source tells the two
//!    apart. When it comes back short it yields the exact total for free;
//!    when it comes back full the sequence continues past a page, which is
//!    reported as a next page.
//!    This bounded extra round-trip replaces a `COUNT` on every page fetch.

use std::fmt;

use futures::TryStreamExt;
use futures::stream::BoxStream;

use crate::error::PagingResult;
use crate::paging::executer::{PagingContext, QueryExecuter, Queryable, StepName};
use crate::paging::plan::PagePlan;

/// Rows of a materialized page.
pub enum Page<'a, T> {
    /// Already fetched.
    Loaded(Vec<T>),
    /// Unwindowed fast path; nothing has been executed yet.
    Deferred(BoxStream<'a, PagingResult<T>>),
}

impl<T> Page<'_, T> {
    /// Fetch the remaining rows, running the deferred query if needed.
    pub async fn collect(self) -> PagingResult<Vec<T>> {
        match self {
            Page::Loaded(rows) => Ok(rows),
            Page::Deferred(stream) => stream.try_collect().await,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Page::Loaded(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for Page<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Loaded(rows) => f.debug_tuple("Loaded").field(rows).finish(),
            Page::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Outcome of one [`materialize`] call.
#[derive(Debug)]
pub struct PaginatorResult<'a, T> {
    /// Absolute offset of the first page row; `None` when the page is empty.
    pub start_offset: Option<i64>,
    /// Absolute offset of the last page row; `None` when empty or not yet known.
    pub end_offset: Option<i64>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    pub page: Page<'a, T>,
    /// Length of the whole sequence, when it fell out of the window query.
    pub total_count: Option<i64>,
}

/// Execute `plan` against `source`.
pub async fn materialize<'a, Q, X>(
    plan: PagePlan,
    source: Q,
    executer: &'a X,
    ctx: &PagingContext,
) -> PagingResult<PaginatorResult<'a, Q::Item>>
where
    Q: Queryable + 'a,
    X: QueryExecuter<Q> + ?Sized,
{
    if plan.is_passthrough() {
        ctx.ensure_active()?;
        tracing::debug!("No window requested, streaming sequence");
        return Ok(PaginatorResult {
            start_offset: Some(0),
            end_offset: None,
            has_previous_page: false,
            has_next_page: false,
            page: Page::Deferred(executer.stream(source, StepName::Fixed("page.stream"))),
            total_count: None,
        });
    }

    // Start one row early: the cursor row doubles as the previous-page sentinel.
    let live_skip = if plan.skip_requested {
        plan.skip_count.saturating_sub(1)
    } else {
        0
    };
    // One row past the page for the next-page sentinel, plus the cursor row.
    let live_take = plan
        .take_count
        .saturating_add(1)
        .saturating_add(i64::from(plan.skip_requested));

    let mut query = source.clone();
    if plan.skip_requested {
        query = query.skip(live_skip);
    }
    if plan.take_requested {
        query = query.take(live_take);
    }

    ctx.ensure_active()?;
    let mut rows = executer
        .to_list(query, StepName::Fixed("page.window"))
        .await?;
    let fetched = rows.len() as i64;

    tracing::debug!(
        skip = plan.skip_requested.then_some(live_skip),
        take = plan.take_requested.then_some(live_take),
        fetched,
        "Executed page window"
    );

    let mut has_next_page = false;
    let mut has_previous_page = false;
    let mut total_count = None;
    // Rows dropped from the front of the window: the cursor row, then take-last excess.
    let mut front = 0;

    if plan.skip_requested && fetched == 0 {
        let probe_size = if plan.take_requested {
            plan.take_count.saturating_add(1)
        } else {
            1
        };

        ctx.ensure_active()?;
        let probe = executer
            .to_list(source.take(probe_size), StepName::Fixed("page.probe"))
            .await?;
        let probed = probe.len() as i64;
        if probed < probe_size {
            total_count = Some(probed);
        } else if plan.take_requested {
            // The skip consumed a sequence longer than the page: rows remain
            // that the cursor could not reach.
            has_next_page = true;
        }

        tracing::debug!(
            probe_size,
            probed,
            has_next_page,
            "Cursor row missing, probed unskipped sequence"
        );
        // The cursor could not be located, so no previous page is claimed.
        rows.clear();
    } else {
        if plan.take_requested && fetched == live_take {
            // Hitting the sentinel only means "more rows" when `before` left budget.
            has_next_page = !plan.before_budget_exhausted();
            rows.pop();
        } else {
            total_count = Some(live_skip.saturating_add(fetched));
        }

        if plan.skip_requested {
            front = 1;
            has_previous_page = true;
        }
    }

    let mut trimmed = 0;
    if plan.take_last_requested {
        let excess = (rows.len() - front) as i64 - plan.take_last_count;
        if excess > 0 {
            trimmed = excess;
            has_previous_page = plan.take_last_count > 0 || plan.take_before_requested;
        }
    }
    rows.drain(..front + trimmed as usize);

    let skipped = if plan.skip_requested { plan.skip_count } else { 0 };
    let first_offset = skipped.saturating_add(trimmed);
    let (start_offset, end_offset) = if rows.is_empty() {
        (None, None)
    } else {
        (
            Some(first_offset),
            Some(first_offset + rows.len() as i64 - 1),
        )
    };

    Ok(PaginatorResult {
        start_offset,
        end_offset,
        has_previous_page,
        has_next_page,
        page: Page::Loaded(rows),
        total_count,
    })
}
