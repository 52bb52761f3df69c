//! The SQLite dialect: assemble, execute, then decode or assign keys.
//!
//! Every operation fans out one task per clause kind and joins the task
//! handles strictly in canonical clause order, never in completion order:
//!
//! | operation | tasks, in join order |
//! |-----------|----------------------|
//! | insert    | table, assignments |
//! | query     | table, join, conditions, group, order, limit |
//! | update    | table, assignments, conditions, order, limit |
//! | delete    | table, conditions, order, limit |
//!
//! # Example
//!
//! ```ignore
//! use liteorm::{Dialect, QueryPlan, SqliteExecutor};
//!
//! let dialect = Dialect::new(SqliteExecutor::open_in_memory()?);
//! let mut users: Vec<User> = Vec::new();
//! dialect
//!     .query(QueryPlan::table("users").eq("active", true).order_by("id"), &mut users)
//!     .await?;
//! ```


use crate::assign::{GeneratedKey, assign_keys, contiguous_keys};
use crate::clause::{ClauseSource, PlanClauses};
use crate::config::DialectConfig;
use crate::decode::{Destination, decode_rows};
use crate::error::{OrmError, OrmResult};
use crate::executor::{ExecResult, Executor};
use crate::plan::QueryPlan;
use crate::record::{Bindable, Record};
use crate::statement::{self, FilterClauses, InsertStatement, QueryClauses, Statement};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A spawned clause task. Dropping it before completion aborts the task, so an
/// early error during assembly does not leave siblings running.
struct ClauseTask<T>(JoinHandle<OrmResult<T>>);

impl<T> ClauseTask<T> {
    async fn join(mut self) -> OrmResult<T> {
        (&mut self.0).await?
    }
}

impl<T> Drop for ClauseTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

macro_rules! spawn_clause {
    ($clauses:expr, $plan:expr, $method:ident) => {{
        let clauses = Arc::clone($clauses);
        let plan = Arc::clone($plan);
        ClauseTask(tokio::spawn(async move { clauses.$method(&plan).await }))
    }};
}

/// Outcome of an INSERT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
    /// Identifiers attributed to inserted rows; empty when the contiguous
    /// block could not be established.
    pub keys: Vec<GeneratedKey>,
}

impl InsertOutcome {
    /// Write the generated keys back onto `records`, in insertion order.
    pub fn assign_to<B: Bindable>(&self, records: &mut [B]) -> Vec<OrmError> {
        assign_keys(&self.keys, records)
    }
}

/// Outcome of [`Dialect::create`]. Key assignment failures never hide the
/// engine's row count.
#[derive(Debug, Default)]
pub struct InsertReport {
    pub rows_affected: u64,
    pub last_insert_id: i64,
    /// Number of records that received a generated key.
    pub assigned: usize,
    pub errors: Vec<OrmError>,
}

impl InsertReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// CRUD entry point over an [`Executor`] and a [`ClauseSource`].
#[derive(Debug)]
pub struct Dialect<E, S = PlanClauses> {
    executor: E,
    clauses: Arc<S>,
    config: DialectConfig,
}

impl<E: Executor> Dialect<E> {
    /// A dialect that renders clauses from the plan's own descriptors.
    pub fn new(executor: E) -> Self {
        Self::with_clauses(executor, PlanClauses)
    }
}

impl<E: Executor, S: ClauseSource> Dialect<E, S> {
    pub fn with_clauses(executor: E, clauses: S) -> Self {
        Self {
            executor,
            clauses: Arc::new(clauses),
            config: DialectConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DialectConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Quote an identifier in this dialect's style.
    pub fn quote(&self, name: &str) -> String {
        self.config.quote_style.quote(name)
    }

    // ==================== Assembly ====================

    /// Assemble the INSERT for `plan` without executing it.
    pub async fn insert_statement(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<InsertStatement> {
        let plan = plan.into();
        let table = spawn_clause!(&self.clauses, &plan, table);
        let assignments = spawn_clause!(&self.clauses, &plan, assignments);

        let table = table.join().await?;
        let group = assignments.join().await?;
        Ok(statement::build_insert(
            self.config.quote_style,
            &self.config.id_column,
            &table,
            &group,
        ))
    }

    /// Assemble the SELECT for `plan` without executing it.
    pub async fn select_statement(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<Statement> {
        let plan = plan.into();
        let table = spawn_clause!(&self.clauses, &plan, table);
        let join = spawn_clause!(&self.clauses, &plan, join);
        let conditions = spawn_clause!(&self.clauses, &plan, conditions);
        let group = spawn_clause!(&self.clauses, &plan, group);
        let order = spawn_clause!(&self.clauses, &plan, order);
        let limit = spawn_clause!(&self.clauses, &plan, limit);

        let table = table.join().await?;
        let clauses = QueryClauses {
            join: join.join().await?,
            conditions: conditions.join().await?,
            group: group.join().await?,
            order: order.join().await?,
            limit: limit.join().await?,
        };
        statement::build_select(self.config.quote_style, &table, &plan.select, clauses)
    }

    /// Assemble the UPDATE for `plan` without executing it.
    pub async fn update_statement(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<Statement> {
        let plan = plan.into();
        let table = spawn_clause!(&self.clauses, &plan, table);
        let assignments = spawn_clause!(&self.clauses, &plan, assignments);
        let conditions = spawn_clause!(&self.clauses, &plan, conditions);
        let order = spawn_clause!(&self.clauses, &plan, order);
        let limit = spawn_clause!(&self.clauses, &plan, limit);

        let table = table.join().await?;
        let group = assignments.join().await?;
        let clauses = FilterClauses {
            conditions: conditions.join().await?,
            order: order.join().await?,
            limit: limit.join().await?,
        };
        statement::build_update(self.config.quote_style, &table, &group, clauses)
    }

    /// Assemble the DELETE for `plan` without executing it.
    pub async fn delete_statement(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<Statement> {
        let plan = plan.into();
        let table = spawn_clause!(&self.clauses, &plan, table);
        let conditions = spawn_clause!(&self.clauses, &plan, conditions);
        let order = spawn_clause!(&self.clauses, &plan, order);
        let limit = spawn_clause!(&self.clauses, &plan, limit);

        let table = table.join().await?;
        let clauses = FilterClauses {
            conditions: conditions.join().await?,
            order: order.join().await?,
            limit: limit.join().await?,
        };
        statement::build_delete(self.config.quote_style, &table, clauses)
    }

    // ==================== Execution ====================

    /// Insert every assignment row of `plan` in one statement.
    ///
    /// Generated keys are computed only when the engine reports exactly one
    /// affected row per inserted row; they assume a single contiguous block
    /// of identifiers, which does not hold when other writers share the
    /// connection or sequence.
    pub async fn insert(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<InsertOutcome> {
        let InsertStatement {
            statement,
            primary_keys,
        } = self.insert_statement(plan).await?;
        let result = self.executor.exec(statement.sql(), statement.args()).await?;

        Ok(InsertOutcome {
            rows_affected: result.rows_affected,
            last_insert_id: result.last_insert_id,
            keys: generated_keys(&primary_keys, result),
        })
    }

    /// Insert `records` and write generated keys back onto them.
    ///
    /// An empty slice inserts nothing.
    pub async fn create<R: Record>(&self, records: &mut [R]) -> OrmResult<InsertReport> {
        if records.is_empty() {
            return Ok(InsertReport::default());
        }

        let outcome = self.insert(QueryPlan::records(records)).await?;
        let errors = outcome.assign_to(records);
        for error in &errors {
            tracing::debug!(table = R::table_name(), error = %error, "key assignment failed");
        }

        Ok(InsertReport {
            rows_affected: outcome.rows_affected,
            last_insert_id: outcome.last_insert_id,
            assigned: outcome.keys.len().saturating_sub(errors.len()),
            errors,
        })
    }

    /// Run the SELECT for `plan` and decode the rows into `dest`.
    ///
    /// Returns the number of rows decoded.
    pub async fn query<D>(&self, plan: impl Into<Arc<QueryPlan>>, dest: &mut D) -> OrmResult<usize>
    where
        D: Destination + ?Sized,
    {
        let statement = self.select_statement(plan).await?;
        let rows = self.executor.query(statement.sql(), statement.args()).await?;
        decode_rows(rows, dest)
    }

    /// Run the UPDATE for `plan`; returns the number of rows affected.
    pub async fn update(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<u64> {
        let statement = self.update_statement(plan).await?;
        let result = self.executor.exec(statement.sql(), statement.args()).await?;
        Ok(result.rows_affected)
    }

    /// Run the DELETE for `plan`; returns the number of rows affected.
    pub async fn delete(&self, plan: impl Into<Arc<QueryPlan>>) -> OrmResult<u64> {
        let statement = self.delete_statement(plan).await?;
        let result = self.executor.exec(statement.sql(), statement.args()).await?;
        Ok(result.rows_affected)
    }
}

fn generated_keys(primary_keys: &[Option<String>], result: ExecResult) -> Vec<GeneratedKey> {
    if primary_keys.iter().all(Option::is_none) {
        return Vec::new();
    }
    match contiguous_keys(primary_keys, result.rows_affected, result.last_insert_id) {
        Some(keys) => keys,
        None => {
            tracing::debug!(
                rows = primary_keys.len(),
                rows_affected = result.rows_affected,
                last_insert_id = result.last_insert_id,
                "skipping key assignment: affected rows do not match inserted rows"
            );
            Vec::new()
        }
    }
}
