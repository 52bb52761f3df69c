//! SQLite execution adapter backed by `rusqlite`.
//!
//! The connection is shared behind a mutex and every statement runs on the
//! blocking pool, so an executor can be cloned freely across tasks.

use crate::error::{OrmError, OrmResult};
use crate::executor::{ExecResult, Executor, Rows};
use crate::value::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// An [`Executor`] over a single SQLite connection.
#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor").finish_non_exhaustive()
    }
}

impl SqliteExecutor {
    pub fn open_in_memory() -> OrmResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| OrmError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn open(path: impl AsRef<Path>) -> OrmResult<Self> {
        let conn = rusqlite::Connection::open(path).map_err(|e| OrmError::Connection(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run several `;`-separated statements without arguments (schema setup).
    pub async fn execute_batch(&self, sql: &str) -> OrmResult<()> {
        let sql = sql.to_string();
        self.with_connection(move |conn| conn.execute_batch(&sql).map_err(OrmError::from_sqlite))
            .await
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn with_connection<T, F>(&self, f: F) -> OrmResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut rusqlite::Connection) -> OrmResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| OrmError::Connection("sqlite connection mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await?
    }
}

impl Executor for SqliteExecutor {
    fn exec(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send {
        let sql = sql.to_string();
        let params = to_sql_values(args);
        self.with_connection(move |conn| {
            let affected = conn
                .execute(&sql, rusqlite::params_from_iter(params.iter()))
                .map_err(OrmError::from_sqlite)?;
            Ok(ExecResult {
                rows_affected: affected as u64,
                last_insert_id: conn.last_insert_rowid(),
            })
        })
    }

    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<Rows>> + Send {
        let sql = sql.to_string();
        let params = to_sql_values(args);
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql).map_err(OrmError::from_sqlite)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
            let width = columns.len();

            let mut out = Vec::new();
            let mut rows = stmt
                .query(rusqlite::params_from_iter(params.iter()))
                .map_err(OrmError::from_sqlite)?;
            while let Some(row) = rows.next().map_err(OrmError::from_sqlite)? {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(value_from_ref(row.get_ref(i).map_err(OrmError::from_sqlite)?));
                }
                out.push(values);
            }
            Ok(Rows::new(columns, out))
        })
    }
}

fn to_sql_values(args: &[Value]) -> Vec<SqlValue> {
    args.iter()
        .map(|value| match value {
            Value::Null => SqlValue::Null,
            Value::Integer(v) => SqlValue::Integer(*v),
            Value::Real(v) => SqlValue::Real(*v),
            Value::Text(v) => SqlValue::Text(v.clone()),
            Value::Blob(v) => SqlValue::Blob(v.clone()),
        })
        .collect()
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exec_reports_rowid_and_query_keeps_storage_classes() {
        let db = SqliteExecutor::open_in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, r REAL, s TEXT, b BLOB)")
            .await
            .unwrap();

        let res = db
            .exec(
                "INSERT INTO t (r, s, b) VALUES (?, ?, ?)",
                &[Value::Real(1.5), Value::Text("x".into()), Value::Blob(vec![1, 2])],
            )
            .await
            .unwrap();
        assert_eq!(res.rows_affected, 1);
        assert_eq!(res.last_insert_id, 1);

        let rows = db.query("SELECT id, r, s, b, NULL AS n FROM t", &[]).await.unwrap();
        assert_eq!(rows.columns(), ["id", "r", "s", "b", "n"]);
        let row = rows.into_iter().next().unwrap();
        assert_eq!(
            row,
            vec![
                Value::Integer(1),
                Value::Real(1.5),
                Value::Text("x".into()),
                Value::Blob(vec![1, 2]),
                Value::Null,
            ]
        );
    }

    #[tokio::test]
    async fn syntax_errors_surface_as_query_errors() {
        let db = SqliteExecutor::open_in_memory().unwrap();
        let err = db.query("SELEC 1", &[]).await.unwrap_err();
        assert!(matches!(err, OrmError::Query(_)));
    }
}
