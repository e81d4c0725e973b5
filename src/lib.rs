//! Relay cursor pagination for GraphQL over ordered, ORM-backed sources.
//!
//! A resolver applies filtering and ordering to a query, then hands it to a
//! [`ConnectionAssembler`] together with the Relay `first` / `last` /
//! `before` / `after` arguments and the [`ComputationFlags`] derived from the
//! selection set. The assembler plans the window, runs it through a
//! [`QueryExecuter`] with at most two row queries (plus a `COUNT` only when
//! `totalCount` is selected and could not be inferred), and folds the result
//! into a [`Connection`].

pub mod config;
pub mod error;
pub mod graphql;
pub mod logging;
pub mod paging;

pub use config::{LogFormat, LoggingConfig, PagingConfig};
pub use error::{PagingError, PagingResult};
pub use graphql::{Connection, ConnectionArgs, Edge, PageInfo, resolve_connection};
pub use paging::{
    ComputationFlags, ConnectionAssembler, MemoryExecuter, PagePlan, PageWindowRequest,
    PagingContext, QueryExecuter, Queryable, StepName, VecQuery, assemble_connection,
    materialize,
};
