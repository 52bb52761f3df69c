//! SQL logging through `tracing`.
//!
//! [`TracingExecutor`] wraps any [`Executor`] and emits one event per statement
//! under the `liteorm.sql` target before it runs, plus a completion event with
//! the elapsed time. Statements slower than the configured threshold are
//! reported at `warn`.

use crate::config::LogConfig;
use crate::error::{OrmError, OrmResult};
use crate::executor::{ExecResult, Executor, Rows};
use crate::value::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// Statement kind reported in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Exec,
    Query,
}

/// An [`Executor`] that logs every statement it forwards.
#[derive(Debug, Clone)]
pub struct TracingExecutor<E> {
    inner: E,
    config: LogConfig,
}

impl<E> TracingExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self::with_config(inner, LogConfig::default())
    }

    pub fn with_config(inner: E, config: LogConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    fn truncate_sql<'s>(&self, sql: &'s str) -> std::borrow::Cow<'s, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    fn before(&self, kind: StatementKind, sql: &str, param_count: usize) {
        let sql = self.truncate_sql(sql);
        emit_at_level!(
            Level::from(self.config.level),
            target: "liteorm.sql",
            kind = ?kind,
            param_count,
            sql = %sql,
        );
    }

    fn after(
        &self,
        kind: StatementKind,
        sql: &str,
        elapsed: Duration,
        outcome: Result<u64, &OrmError>,
    ) {
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        let sql = self.truncate_sql(sql);
        match outcome {
            Ok(rows) => {
                let slow = self
                    .config
                    .slow_query_threshold_duration()
                    .is_some_and(|threshold| elapsed > threshold);
                if slow {
                    tracing::warn!(
                        target: "liteorm.sql",
                        kind = ?kind,
                        elapsed_ms,
                        rows,
                        sql = %sql,
                        "slow statement"
                    );
                } else {
                    emit_at_level!(
                        Level::from(self.config.level),
                        target: "liteorm.sql",
                        kind = ?kind,
                        elapsed_ms,
                        rows,
                        "statement finished"
                    );
                }
            }
            Err(error) => tracing::warn!(
                target: "liteorm.sql",
                kind = ?kind,
                elapsed_ms,
                error = %error,
                sql = %sql,
                "statement failed"
            ),
        }
    }
}

impl<E: Executor> Executor for TracingExecutor<E> {
    fn exec(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send {
        async move {
            self.before(StatementKind::Exec, sql, args.len());
            let start = Instant::now();
            let result = self.inner.exec(sql, args).await;
            self.after(
                StatementKind::Exec,
                sql,
                start.elapsed(),
                result.as_ref().map(|r| r.rows_affected),
            );
            result
        }
    }

    fn query(&self, sql: &str, args: &[Value]) -> impl Future<Output = OrmResult<Rows>> + Send {
        async move {
            self.before(StatementKind::Query, sql, args.len());
            let start = Instant::now();
            let result = self.inner.query(sql, args).await;
            self.after(
                StatementKind::Query,
                sql,
                start.elapsed(),
                result.as_ref().map(|rows| rows.len() as u64),
            );
            result
        }
    }
}

/// Truncate at a char boundary no later than `max_bytes`.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Executor for Recorder {
        fn exec(&self, sql: &str, _args: &[Value]) -> impl Future<Output = OrmResult<ExecResult>> + Send {
            self.calls.lock().unwrap().push(sql.to_string());
            async move {
                Ok(ExecResult {
                    rows_affected: 3,
                    last_insert_id: 0,
                })
            }
        }

        fn query(&self, sql: &str, _args: &[Value]) -> impl Future<Output = OrmResult<Rows>> + Send {
            self.calls.lock().unwrap().push(sql.to_string());
            async move { Err(OrmError::not_found("no rows")) }
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("SELECT", 10), "SELECT");
        assert_eq!(truncate_sql_bytes("SELECT", 3), "SEL");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }

    #[test]
    fn truncate_sql_appends_ellipsis() {
        let exec = TracingExecutor::with_config(Recorder::default(), LogConfig::new().max_sql_length(6));
        assert_eq!(exec.truncate_sql("SELECT * FROM t"), "SELECT...");
        let exec = TracingExecutor::with_config(Recorder::default(), LogConfig::new().no_truncate());
        assert_eq!(exec.truncate_sql("SELECT * FROM t"), "SELECT * FROM t");
    }

    #[tokio::test]
    async fn forwards_results_unchanged() {
        let exec = TracingExecutor::new(Recorder::default());

        let result = exec.exec("DELETE FROM t", &[]).await.unwrap();
        assert_eq!(result.rows_affected, 3);

        let err = exec.query("SELECT 1", &[Value::Integer(1)]).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(
            *exec.inner().calls.lock().unwrap(),
            vec!["DELETE FROM t".to_string(), "SELECT 1".to_string()]
        );
    }
}
