//! Cursor pagination over ordered queries
//!
//! - [`request`] - Relay arguments and the outputs a caller selected
//! - [`plan`] - immutable skip / take / take-last / take-before intents
//! - [`paginator`] - executes a plan with the fewest queries possible
//! - [`assembler`] - turns Relay arguments into plans and connections
//! - [`executer`] - the boundary to the data source
//! - [`memory`] - in-memory data source

pub mod assembler;
pub mod executer;
pub mod memory;
pub mod paginator;
pub mod plan;
pub mod request;

pub use assembler::{ConnectionAssembler, assemble_connection};
pub use executer::{PagingContext, QueryExecuter, Queryable, StepName};
pub use memory::{MemoryExecuter, VecQuery};
pub use paginator::{Page, PaginatorResult, materialize};
pub use plan::PagePlan;
pub use request::{ComputationFlags, PageWindowRequest};
