//! Relay connection types.
//!
//! Usage: Use the `define_connection!` macro to create type-specific GraphQL
//! connections from the generic [`Connection`].
//!
//! Cursors are the decimal string form of a row's zero-based offset in the
//! filtered, sorted sequence. They are only meaningful against the same data
//! they were produced from; rows inserted or removed between requests shift
//! them.

use serde::{Deserialize, Serialize};

/// Relay page info.
#[derive(async_graphql::SimpleObject, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether more rows follow this page
    pub has_next_page: bool,
    /// Whether rows precede this page
    pub has_previous_page: bool,
    /// Cursor of the first row; null when the page is empty
    pub start_cursor: Option<String>,
    /// Cursor of the last row; null when the page is empty
    pub end_cursor: Option<String>,
}

/// A node together with its cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

impl<T> Edge<T> {
    pub fn new(node: T, offset: i64) -> Self {
        Self {
            node,
            cursor: encode_cursor(offset),
        }
    }
}

/// A page of rows plus everything the caller asked to know about it.
///
/// `edges`, `items` and `total_count` are `None` when they were not requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection<T> {
    pub total_count: Option<i64>,
    pub page_info: PageInfo,
    pub edges: Option<Vec<Edge<T>>>,
    pub items: Option<Vec<T>>,
}

impl<T> Connection<T> {
    /// Page rows, from `items` if present, otherwise from `edges`.
    pub fn nodes(&self) -> Vec<&T> {
        match (&self.items, &self.edges) {
            (Some(items), _) => items.iter().collect(),
            (None, Some(edges)) => edges.iter().map(|e| &e.node).collect(),
            (None, None) => Vec::new(),
        }
    }
}

/// Macro to define a GraphQL connection type for a specific node type
///
/// Usage:
/// ```ignore
/// define_connection!(BookConnection, BookEdge, Book);
/// ```
///
/// The calling crate must depend on `async-graphql`.
#[macro_export]
macro_rules! define_connection {
    ($conn_name:ident, $edge_name:ident, $node_type:ty) => {
        /// Edge containing a node and cursor
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $edge_name {
            /// The item at the end of the edge
            pub node: $node_type,
            /// A cursor for pagination
            pub cursor: String,
        }

        /// Connection containing edges, items and page info
        #[derive(async_graphql::SimpleObject, Debug, Clone)]
        pub struct $conn_name {
            /// Number of rows in the whole filtered sequence
            pub total_count: Option<i64>,
            /// Pagination information
            pub page_info: $crate::graphql::pagination::PageInfo,
            /// The edges in this page
            pub edges: Option<Vec<$edge_name>>,
            /// The nodes in this page, without cursors
            pub items: Option<Vec<$node_type>>,
        }

        impl From<$crate::graphql::pagination::Connection<$node_type>> for $conn_name {
            fn from(conn: $crate::graphql::pagination::Connection<$node_type>) -> Self {
                Self {
                    total_count: conn.total_count,
                    page_info: conn.page_info,
                    edges: conn.edges.map(|edges| {
                        edges
                            .into_iter()
                            .map(|e| $edge_name {
                                node: e.node,
                                cursor: e.cursor,
                            })
                            .collect()
                    }),
                    items: conn.items,
                }
            }
        }
    };
}

/// Encode an absolute offset as a cursor.
pub fn encode_cursor(offset: i64) -> String {
    offset.to_string()
}

/// Decode a cursor produced by [`encode_cursor`]. Returns `None` for anything
/// that is not an integer.
pub fn decode_cursor(cursor: &str) -> Option<i64> {
    cursor.trim().parse().ok()
}
