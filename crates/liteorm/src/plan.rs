//! The resolved description of one CRUD operation.
//!
//! # Example
//!
//! ```ignore
//! use liteorm::{Expr, QueryPlan};
//!
//! let plan = QueryPlan::table("users")
//!     .filter(Expr::gt("age", 18))
//!     .order_by_desc("id")
//!     .limit(10);
//! ```

use crate::assign::{AssignmentField, AssignmentGroup};
use crate::clause::Expr;
use crate::record::Record;
use crate::value::{ToValue, Value};

/// Output columns of a SELECT.
///
/// Empty `columns` selects `*`. Column expressions are emitted verbatim and
/// `args` bind the placeholders they contain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub columns: Vec<String>,
    pub args: Vec<Value>,
}

impl Selection {
    pub fn is_all(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Cross,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    /// Table expression, emitted verbatim (may carry an alias).
    pub table: String,
    pub on: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub expr: String,
    pub descending: bool,
}

/// Caller-owned description of one operation.
///
/// A plan is immutable while an operation runs; the dialect shares it with
/// its clause tasks behind an `Arc`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryPlan {
    pub table: String,
    pub select: Selection,
    pub assignments: AssignmentGroup,
    pub joins: Vec<Join>,
    pub conditions: Vec<Expr>,
    pub group_by: Vec<String>,
    pub having: Vec<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl QueryPlan {
    /// Start a plan targeting `table` (unquoted).
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Plan an insert of `records` into their table.
    pub fn records<R: Record>(records: &[R]) -> Self {
        Self::table(R::table_name()).assignments(AssignmentGroup::from_records(records))
    }

    // ==================== SELECT columns ====================

    /// Set output columns, emitted verbatim.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add an output expression with its own `?` arguments.
    pub fn select_expr<T: ToValue>(mut self, expr: &str, args: impl IntoIterator<Item = T>) -> Self {
        self.select.columns.push(expr.to_string());
        self.select.args.extend(args.into_iter().map(|v| v.to_value()));
        self
    }

    // ==================== Assignments ====================

    pub fn assignments(mut self, group: AssignmentGroup) -> Self {
        self.assignments = group;
        self
    }

    /// Append one assignment row.
    pub fn assign_row(mut self, fields: Vec<AssignmentField>) -> Self {
        self.assignments.push_row(fields);
        self
    }

    /// Append a single-field assignment to the first row, creating it if needed.
    pub fn set(mut self, column: &str, value: impl ToValue) -> Self {
        self.assignments.push_field(AssignmentField::new(column, value.to_value()));
        self
    }

    // ==================== JOIN ====================

    pub fn inner_join(mut self, table: &str, on: Expr) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Inner,
            table: table.to_string(),
            on: Some(on),
        });
        self
    }

    pub fn left_join(mut self, table: &str, on: Expr) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Left,
            table: table.to_string(),
            on: Some(on),
        });
        self
    }

    pub fn cross_join(mut self, table: &str) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            table: table.to_string(),
            on: None,
        });
        self
    }

    // ==================== WHERE ====================

    /// Add a condition; conditions are ANDed.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.conditions.push(expr);
        self
    }

    /// Add WHERE: column = value
    pub fn eq(self, column: &str, value: impl ToValue) -> Self {
        self.filter(Expr::eq(column, value))
    }

    // ==================== GROUP / ORDER / LIMIT ====================

    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group_by = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn having(mut self, expr: Expr) -> Self {
        self.having.push(expr);
        self
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by.push(OrderBy {
            expr: expr.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_by_desc(mut self, expr: &str) -> Self {
        self.order_by.push(OrderBy {
            expr: expr.to_string(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}
