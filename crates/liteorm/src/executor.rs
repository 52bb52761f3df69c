//! Execution adapter: the seam between assembled statements and the engine.

use crate::error::OrmResult;
use crate::value::Value;
use std::future::Future;

/// Outcome of a mutating statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Last identifier generated on the connection (rowid for SQLite).
    pub last_insert_id: i64,
}

/// A materialized result set: ordered column names plus row tuples.
///
/// Rows are consumed front to back through [`IntoIterator`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Rows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

impl IntoIterator for Rows {
    type Item = Vec<Value>;
    type IntoIter = std::vec::IntoIter<Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// Submits SQL with positional `?` arguments to the engine.
///
/// Implementations execute one statement at a time per call; connection and
/// transaction management live behind this trait.
pub trait Executor: Send + Sync {
    /// Execute a mutating statement.
    fn exec(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute a query and return its result set.
    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<Rows>> + Send;
}

impl<E: Executor> Executor for &E {
    fn exec(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send {
        (**self).exec(sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<Rows>> + Send {
        (**self).query(sql, args)
    }
}

impl<E: Executor> Executor for std::sync::Arc<E> {
    fn exec(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send {
        (**self).exec(sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<Rows>> + Send {
        (**self).query(sql, args)
    }
}
