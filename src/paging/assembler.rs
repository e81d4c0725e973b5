//! Relay connection assembly.
//!
//! Turns `first` / `last` / `before` / `after` into one or two page plans,
//! runs them through [`materialize`], and folds the outcome into a
//! [`Connection`], computing only what [`ComputationFlags`] asks for.

use futures::{StreamExt, TryStreamExt};

use crate::config::PagingConfig;
use crate::error::PagingResult;
use crate::graphql::pagination::{Connection, Edge, PageInfo, encode_cursor};
use crate::paging::executer::{PagingContext, QueryExecuter, Queryable, StepName};
use crate::paging::paginator::{Page, PaginatorResult, materialize};
use crate::paging::plan::PagePlan;
use crate::paging::request::{ComputationFlags, PageWindowRequest};

/// Builds connections against one executer.
pub struct ConnectionAssembler<'x, X: ?Sized> {
    executer: &'x X,
    config: PagingConfig,
    ctx: PagingContext,
}

impl<'x, X: ?Sized> ConnectionAssembler<'x, X> {
    pub fn new(executer: &'x X) -> Self {
        Self {
            executer,
            config: PagingConfig::default(),
            ctx: PagingContext::default(),
        }
    }

    pub fn with_config(mut self, config: PagingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_context(mut self, ctx: PagingContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Resolve one connection field.
    ///
    /// `query` must already be filtered and deterministically ordered.
    /// Argument errors are returned before anything is executed; executer
    /// errors are returned unchanged.
    pub async fn assemble<Q>(
        &self,
        query: Q,
        request: PageWindowRequest,
        flags: ComputationFlags,
    ) -> PagingResult<Connection<Q::Item>>
    where
        Q: Queryable,
        Q::Item: Clone,
        X: QueryExecuter<Q>,
    {
        let request = self.config.apply_page_size(request.validate()?);
        let result = self.window(query.clone(), request, flags).await?;
        self.fold(query, result, flags).await
    }

    async fn window<'a, Q>(
        &'a self,
        query: Q,
        request: PageWindowRequest,
        flags: ComputationFlags,
    ) -> PagingResult<PaginatorResult<'a, Q::Item>>
    where
        Q: Queryable + 'a,
        X: QueryExecuter<Q>,
    {
        let force = flags.needs_end_offset;

        if !request.is_degenerate() {
            let plan = PagePlan::new()
                .skip_including(request.after)?
                .take_before(request.before)
                .take(request.first)
                .take_last(request.last)
                .force_materialize(force);
            return materialize(plan, query, self.executer, &self.ctx).await;
        }

        // `after` sits at or past `before`: trust `after` if it can be found.
        let plan = PagePlan::new()
            .skip_including(request.after)?
            .take(request.first)
            .take_last(request.last)
            .force_materialize(force);
        let result = materialize(plan, query.clone(), self.executer, &self.ctx).await?;
        if result.has_previous_page {
            return Ok(result);
        }

        // The after cursor ran off the sequence; an empty page would be wrong
        // when `before` still bounds real rows.
        tracing::debug!(
            after = request.after,
            before = request.before,
            "After cursor not found, retrying bounded by before"
        );
        let plan = PagePlan::new()
            .take_before(request.before)
            .take(request.first)
            .take_last(request.last)
            .force_materialize(force);
        materialize(plan, query, self.executer, &self.ctx).await
    }

    async fn fold<Q>(
        &self,
        query: Q,
        result: PaginatorResult<'_, Q::Item>,
        flags: ComputationFlags,
    ) -> PagingResult<Connection<Q::Item>>
    where
        Q: Queryable,
        Q::Item: Clone,
        X: QueryExecuter<Q>,
    {
        let PaginatorResult {
            mut start_offset,
            mut end_offset,
            has_previous_page,
            has_next_page,
            page,
            mut total_count,
        } = result;

        let deferred = !page.is_loaded();
        let base = start_offset.unwrap_or(0);

        let (row_count, edges, items) = match (flags.needs_edges, flags.needs_items) {
            (true, true) => {
                let rows = page.collect().await?;
                let edges = to_edges(rows.clone(), base);
                (Some(rows.len()), Some(edges), Some(rows))
            }
            (true, false) => {
                let edges = match page {
                    Page::Loaded(rows) => to_edges(rows, base),
                    Page::Deferred(stream) => {
                        stream
                            .enumerate()
                            .map(|(i, row)| row.map(|node| Edge::new(node, base + i as i64)))
                            .try_collect()
                            .await?
                    }
                };
                (Some(edges.len()), Some(edges), None)
            }
            (false, true) => {
                let rows = page.collect().await?;
                (Some(rows.len()), None, Some(rows))
            }
            (false, false) => match page {
                Page::Loaded(rows) => (Some(rows.len()), None, None),
                Page::Deferred(_) => (None, None, None),
            },
        };

        if deferred {
            // The unwindowed stream was the whole sequence.
            match row_count {
                Some(0) | None => {
                    start_offset = None;
                    end_offset = None;
                }
                Some(len) => {
                    start_offset = Some(0);
                    end_offset = Some(len as i64 - 1);
                }
            }
            if let Some(len) = row_count {
                total_count = total_count.or(Some(len as i64));
            }
        }

        if flags.needs_count && total_count.is_none() {
            self.ctx.ensure_active()?;
            total_count = Some(
                self.executer
                    .count(query, StepName::Fixed("connection.count"))
                    .await?,
            );
        }

        tracing::debug!(
            start = start_offset,
            end = end_offset,
            has_previous_page,
            has_next_page,
            total = total_count,
            "Assembled connection"
        );

        Ok(Connection {
            total_count: if flags.needs_count { total_count } else { None },
            page_info: PageInfo {
                has_next_page,
                has_previous_page,
                start_cursor: start_offset.map(encode_cursor),
                end_cursor: end_offset.map(encode_cursor),
            },
            edges,
            items,
        })
    }
}

fn to_edges<T>(rows: Vec<T>, base: i64) -> Vec<Edge<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, node)| Edge::new(node, base + i as i64))
        .collect()
}

/// Resolve one connection with the default configuration and no cancellation.
pub async fn assemble_connection<Q, X>(
    executer: &X,
    query: Q,
    request: PageWindowRequest,
    flags: ComputationFlags,
) -> PagingResult<Connection<Q::Item>>
where
    Q: Queryable,
    Q::Item: Clone,
    X: QueryExecuter<Q> + ?Sized,
{
    ConnectionAssembler::new(executer)
        .assemble(query, request, flags)
        .await
}
