//! Glue between async-graphql resolvers and the connection assembler.
//!
//! A connection field takes the four Relay arguments, works out from the
//! selection set which parts of the connection the client asked for, and
//! hands everything to [`resolve_connection`]:
//!
//! ```ignore
//! async fn books(
//!     &self,
//!     ctx: &Context<'_>,
//!     first: Option<i32>,
//!     after: Option<String>,
//!     last: Option<i32>,
//!     before: Option<String>,
//! ) -> Result<BookConnection> {
//!     let args = ConnectionArgs::new(first, last, before, after);
//!     let conn = resolve_connection(ctx, executer, books_query(), &args).await?;
//!     Ok(conn.into())
//! }
//! ```

use async_graphql::{Context, ErrorExtensions, InputObject, Lookahead};
use tokio_util::sync::CancellationToken;

use crate::config::PagingConfig;
use crate::error::{PagingError, PagingResult};
use crate::graphql::pagination::{Connection, decode_cursor};
use crate::paging::{
    ComputationFlags, ConnectionAssembler, PageWindowRequest, PagingContext, QueryExecuter,
    Queryable,
};

/// Relay connection arguments as received from the client.
#[derive(InputObject, Default, Clone, Debug, PartialEq, Eq)]
#[graphql(name = "ConnectionInput")]
pub struct ConnectionArgs {
    /// Number of rows after `after`
    pub first: Option<i32>,
    /// Number of rows before `before`
    pub last: Option<i32>,
    /// Cursor the page must end before
    pub before: Option<String>,
    /// Cursor the page must start after
    pub after: Option<String>,
}

impl ConnectionArgs {
    pub fn new(
        first: Option<i32>,
        last: Option<i32>,
        before: Option<String>,
        after: Option<String>,
    ) -> Self {
        Self {
            first,
            last,
            before,
            after,
        }
    }

    /// Decode the cursors. Range checks happen later, in
    /// [`PageWindowRequest::validate`].
    pub fn to_request(&self) -> PagingResult<PageWindowRequest> {
        Ok(PageWindowRequest::new(
            self.first.map(i64::from),
            self.last.map(i64::from),
            cursor_argument("before", self.before.as_deref())?,
            cursor_argument("after", self.after.as_deref())?,
        ))
    }
}

fn cursor_argument(argument: &'static str, cursor: Option<&str>) -> PagingResult<Option<i64>> {
    match cursor {
        None => Ok(None),
        Some(raw) => decode_cursor(raw).map(Some).ok_or_else(|| {
            PagingError::invalid_argument(argument, format!("'{raw}' is not a valid cursor"))
        }),
    }
}

impl ComputationFlags {
    /// Derive the flags from the connection field's selection set.
    ///
    /// `pageInfo.hasNextPage` / `hasPreviousPage` are always computed; only
    /// the cursors force the page to be materialized.
    pub fn from_lookahead(lookahead: &Lookahead<'_>) -> Self {
        let page_info = lookahead.field("pageInfo");
        Self {
            needs_count: lookahead.field("totalCount").exists(),
            needs_end_offset: page_info.field("startCursor").exists()
                || page_info.field("endCursor").exists(),
            needs_edges: lookahead.field("edges").exists(),
            needs_items: lookahead.field("items").exists(),
        }
    }
}

/// Convert a paging failure into a GraphQL error.
///
/// Argument errors name the offending argument in the `argument` extension.
/// Anything else is logged and reported without details.
pub fn graphql_error(err: PagingError) -> async_graphql::Error {
    match err {
        PagingError::InvalidArgument { argument, message } => {
            async_graphql::Error::new(format!("Invalid argument '{argument}': {message}"))
                .extend_with(|_, e| {
                    e.set("code", "BAD_USER_INPUT");
                    e.set("argument", argument);
                })
        }
        PagingError::Cancelled => async_graphql::Error::new("Request cancelled")
            .extend_with(|_, e| e.set("code", "CANCELLED")),
        other => {
            tracing::error!(error = %other, "Connection resolution failed");
            async_graphql::Error::new("Internal server error")
                .extend_with(|_, e| e.set("code", "INTERNAL"))
        }
    }
}

/// Resolve a connection field.
///
/// Reads [`PagingConfig`] and a [`CancellationToken`] from the schema or
/// request data when present.
pub async fn resolve_connection<Q, X>(
    ctx: &Context<'_>,
    executer: &X,
    query: Q,
    args: &ConnectionArgs,
) -> async_graphql::Result<Connection<Q::Item>>
where
    Q: Queryable,
    Q::Item: Clone,
    X: QueryExecuter<Q> + ?Sized,
{
    let flags = ComputationFlags::from_lookahead(&ctx.look_ahead());
    let request = args.to_request().map_err(graphql_error)?;

    let config = ctx.data_opt::<PagingConfig>().cloned().unwrap_or_default();
    let paging_ctx = ctx
        .data_opt::<CancellationToken>()
        .cloned()
        .map(PagingContext::with_cancellation)
        .unwrap_or_default();

    ConnectionAssembler::new(executer)
        .with_config(config)
        .with_context(paging_ctx)
        .assemble(query, request, flags)
        .await
        .map_err(graphql_error)
}
