//! GraphQL surface of the paging layer
//!
//! - [`pagination`] - connection, edge and page info types plus
//!   [`define_connection!`](crate::define_connection)
//! - [`resolve`] - resolver helpers mapping field arguments and selections
//!   onto the assembler
//! - [`orm`] - SQLite-backed queries (feature `sqlite`)

#[cfg(feature = "sqlite")]
pub mod orm;
pub mod pagination;
pub mod resolve;

pub use pagination::{Connection, Edge, PageInfo, decode_cursor, encode_cursor};
pub use resolve::{ConnectionArgs, graphql_error, resolve_connection};
