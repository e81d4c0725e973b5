//! SQLite connection source
//!
//! Entities describe their table through [`DatabaseEntity`] and decode rows
//! through [`FromSqlRow`]. A resolver builds an [`EntityQuery`] with its
//! filters and ordering, and the paginator runs it through
//! [`SqliteExecuter`]:
//!
//! ```rust,ignore
//! let query = EntityQuery::<Book>::new()
//!     .filter(&where_input)
//!     .order_by(&order_by_input);
//! let conn = resolve_connection(ctx, &SqliteExecuter::new(pool), query, &args).await?;
//! ```

mod builder;
mod executer;
mod traits;

pub use builder::*;
pub use executer::*;
pub use traits::*;
