//! # liteorm
//!
//! The SQLite dialect core of a small ORM: statement assembly with `?`
//! placeholders, execution, result decoding and primary-key write-back.
//!
//! ## Features
//!
//! - **Lock-step arguments**: clause fragments carry their own arguments; the
//!   assembler appends them in canonical clause order, so argument *i* always
//!   binds placeholder *i*
//! - **Concurrent clause building**: one task per clause kind, joined in
//!   canonical order rather than completion order
//! - **Shape-resolved decoding**: decode into a record, a `ValueMap`, a `Vec`
//!   of either, or through `Option`/`Box`, without saying which
//! - **Key write-back**: batch inserts assign a contiguous block of generated
//!   ids back onto the inserted records
//! - **SQL logging**: `TracingExecutor` emits every statement under the
//!   `liteorm.sql` target
//!
//! ## Example
//!
//! ```ignore
//! use liteorm::{Dialect, Expr, QueryPlan, SqliteExecutor};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! liteorm::impl_record!(User, table = "users", {
//!     id [primary_key],
//!     name,
//! });
//!
//! let dialect = Dialect::new(SqliteExecutor::open_in_memory()?);
//!
//! // INSERT, ids written back
//! let mut users = vec![User { id: 0, name: "alice".into() }, User { id: 0, name: "bob".into() }];
//! dialect.create(&mut users).await?;
//!
//! // SELECT
//! let mut found: Vec<User> = Vec::new();
//! dialect
//!     .query(QueryPlan::table("users").filter(Expr::like("name", "a%")), &mut found)
//!     .await?;
//!
//! // UPDATE
//! dialect
//!     .update(QueryPlan::table("users").set("name", "carol").eq("id", users[1].id))
//!     .await?;
//!
//! // DELETE
//! dialect.delete(QueryPlan::table("users").eq("id", users[0].id)).await?;
//! ```

pub mod assign;
pub mod clause;
pub mod config;
pub mod decode;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod monitor;
pub mod plan;
pub mod quote;
pub mod record;
pub mod statement;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use assign::{AssignmentField, AssignmentGroup, GeneratedKey};
pub use clause::{ClauseFragment, ClauseSource, Expr, PlanClauses};
pub use config::{DialectConfig, LogConfig, LogLevel};
pub use decode::{Destination, decode_rows};
pub use dialect::{Dialect, InsertOutcome, InsertReport};
pub use error::{OrmError, OrmResult};
pub use executor::{ExecResult, Executor, Rows};
pub use monitor::TracingExecutor;
pub use plan::QueryPlan;
pub use quote::{QuoteStyle, quote};
pub use record::{Bindable, ColumnMeta, Record};
pub use statement::Statement;
pub use value::{FromValue, ToValue, Value, ValueMap};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteExecutor;
