//! Condition expressions for WHERE/HAVING/JOIN ON clauses.
//!
//! `Expr` renders straight into a [`ClauseFragment`], so every `?` it writes is
//! paired with the argument pushed at the same moment.

use super::ClauseFragment;
use crate::value::{ToValue, Value};

/// Expression node for building WHERE/HAVING/ON conditions.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// NOT: negate the inner expression.
    Not(Box<Expr>),

    /// Simple comparison: column op ?
    Compare {
        column: String,
        op: &'static str,
        value: Value,
    },

    /// NULL check: column IS NULL or column IS NOT NULL
    NullCheck { column: String, is_null: bool },

    /// IN list: column IN (?, ?, ...) or column NOT IN (...)
    InList {
        column: String,
        values: Vec<Value>,
        negated: bool,
    },

    /// BETWEEN: column BETWEEN ? AND ?
    Between {
        column: String,
        from: Value,
        to: Value,
        negated: bool,
    },

    /// SQL text with its own `?` placeholders and matching arguments.
    Template { sql: String, args: Vec<Value> },

    /// Raw SQL fragment without arguments.
    Raw(String),

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

impl Expr {
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    fn compare(column: impl Into<String>, op: &'static str, value: impl ToValue) -> Self {
        Expr::Compare {
            column: column.into(),
            op,
            value: value.to_value(),
        }
    }

    /// column = ?
    pub fn eq(column: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(column, "=", value)
    }

    /// column != ?
    pub fn ne(column: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(column, "!=", value)
    }

    /// column > ?
    pub fn gt(column: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(column, ">", value)
    }

    /// column >= ?
    pub fn gte(column: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(column, ">=", value)
    }

    /// column < ?
    pub fn lt(column: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(column, "<", value)
    }

    /// column <= ?
    pub fn lte(column: impl Into<String>, value: impl ToValue) -> Self {
        Self::compare(column, "<=", value)
    }

    /// column LIKE ?
    pub fn like(column: impl Into<String>, pattern: impl ToValue) -> Self {
        Self::compare(column, "LIKE", pattern)
    }

    /// column NOT LIKE ?
    pub fn not_like(column: impl Into<String>, pattern: impl ToValue) -> Self {
        Self::compare(column, "NOT LIKE", pattern)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: true,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Expr::NullCheck {
            column: column.into(),
            is_null: false,
        }
    }

    /// column IN (?, ...). An empty list never matches.
    pub fn in_list<T: ToValue>(column: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(|v| v.to_value()).collect();
        if values.is_empty() {
            return Expr::False;
        }
        Expr::InList {
            column: column.into(),
            values,
            negated: false,
        }
    }

    /// column NOT IN (?, ...). An empty list always matches.
    pub fn not_in<T: ToValue>(column: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(|v| v.to_value()).collect();
        if values.is_empty() {
            return Expr::True;
        }
        Expr::InList {
            column: column.into(),
            values,
            negated: true,
        }
    }

    pub fn between(column: impl Into<String>, from: impl ToValue, to: impl ToValue) -> Self {
        Expr::Between {
            column: column.into(),
            from: from.to_value(),
            to: to.to_value(),
            negated: false,
        }
    }

    pub fn not_between(column: impl Into<String>, from: impl ToValue, to: impl ToValue) -> Self {
        Expr::Between {
            column: column.into(),
            from: from.to_value(),
            to: to.to_value(),
            negated: true,
        }
    }

    /// SQL with `?` placeholders, e.g. `Expr::template("a = ? OR b = ?", [1, 2])`.
    pub fn template<T: ToValue>(sql: impl Into<String>, args: impl IntoIterator<Item = T>) -> Self {
        Expr::Template {
            sql: sql.into(),
            args: args.into_iter().map(|v| v.to_value()).collect(),
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    /// Check if this expression is empty (contains no conditions).
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(Expr::is_empty),
            Expr::Not(inner) => inner.is_empty(),
            _ => false,
        }
    }

    /// Render into a standalone fragment.
    pub fn to_fragment(&self) -> ClauseFragment {
        let mut out = ClauseFragment::empty();
        self.write_to(&mut out);
        out
    }

    /// Append this expression's text and arguments to `out`.
    pub fn write_to(&self, out: &mut ClauseFragment) {
        match self {
            Expr::And(exprs) => Self::write_group(out, exprs, " AND ", |e| matches!(e, Expr::Or(_))),
            Expr::Or(exprs) => Self::write_group(out, exprs, " OR ", |e| matches!(e, Expr::And(_))),
            Expr::Not(inner) => {
                if inner.is_empty() {
                    return;
                }
                out.push("NOT (");
                inner.write_to(out);
                out.push(")");
            }
            Expr::Compare { column, op, value } => {
                out.push(column).push(" ").push(op).push(" ");
                out.push_bind_value(value.clone());
            }
            Expr::NullCheck { column, is_null } => {
                out.push(column);
                out.push(if *is_null { " IS NULL" } else { " IS NOT NULL" });
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                out.push(column);
                out.push(if *negated { " NOT IN (" } else { " IN (" });
                out.push_bind_list(values.iter().cloned());
                out.push(")");
            }
            Expr::Between {
                column,
                from,
                to,
                negated,
            } => {
                out.push(column);
                out.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                out.push_bind_value(from.clone());
                out.push(" AND ");
                out.push_bind_value(to.clone());
            }
            Expr::Template { sql, args } => {
                out.push_fragment(ClauseFragment::with_args(sql.clone(), args.clone()));
            }
            Expr::Raw(sql) => {
                out.push(sql);
            }
            Expr::True => {
                out.push("1=1");
            }
            Expr::False => {
                out.push("1=0");
            }
        }
    }

    fn write_group(
        out: &mut ClauseFragment,
        exprs: &[Expr],
        separator: &str,
        needs_parens: impl Fn(&Expr) -> bool,
    ) {
        let members = exprs.iter().filter(|e| !e.is_empty()).count();
        let mut first = true;
        for expr in exprs.iter().filter(|e| !e.is_empty()) {
            if !first {
                out.push(separator);
            }
            first = false;
            // Opaque SQL may carry its own AND/OR; keep it grouped.
            let opaque = matches!(expr, Expr::Template { .. } | Expr::Raw(_));
            if needs_parens(expr) || (opaque && members > 1) {
                out.push("(");
                expr.write_to(out);
                out.push(")");
            } else {
                expr.write_to(out);
            }
        }
    }
}
