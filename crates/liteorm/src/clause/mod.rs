//! Clause fragments and the sources that produce them.
//!
//! A [`ClauseFragment`] is a piece of SQL text plus the arguments for the `?`
//! placeholders it contains, in order. Fragments compose by appending text and
//! arguments together, so the i-th argument always belongs to the i-th `?`.
//!
//! A [`ClauseSource`] produces the fragments for one operation. Each method is
//! independent of the others; the dialect runs them as concurrent tasks and
//! assembles the results in canonical clause order.

mod expr;

#[cfg(test)]
mod tests;

pub use expr::Expr;

use crate::assign::AssignmentGroup;
use crate::error::{OrmError, OrmResult};
use crate::plan::{JoinKind, QueryPlan};
use crate::value::{ToValue, Value};
use std::future::Future;

/// SQL text plus positionally bound arguments.
///
/// The text of a clause fragment is the whole clause, keyword included
/// (`WHERE a = ?`, `ORDER BY id DESC`, `LEFT JOIN t ON ...`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClauseFragment {
    text: String,
    args: Vec<Value>,
}

impl ClauseFragment {
    /// A fragment without arguments.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            args: Vec::new(),
        }
    }

    /// A fragment whose text already contains one `?` per argument.
    pub fn with_args(text: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            args,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.args.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.args)
    }

    /// Append raw SQL (no arguments).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.text.push_str(sql);
        self
    }

    /// Append a `?` placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl ToValue) -> &mut Self {
        self.push_bind_value(value.to_value())
    }

    pub fn push_bind_value(&mut self, value: Value) -> &mut Self {
        self.text.push('?');
        self.args.push(value);
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// An empty list renders as `NULL`, which keeps `IN (...)` valid SQL.
    pub fn push_bind_list(&mut self, values: impl IntoIterator<Item = Value>) -> &mut Self {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("NULL");
        };
        self.push_bind_value(first);
        for value in iter {
            self.push(", ");
            self.push_bind_value(value);
        }
        self
    }

    /// Append another fragment: its text, then its arguments.
    pub fn push_fragment(&mut self, other: ClauseFragment) -> &mut Self {
        self.text.push_str(&other.text);
        self.args.extend(other.args);
        self
    }

    /// Number of `?` markers outside string literals and quoted identifiers.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.text)
    }

    /// Check that the fragment has exactly one argument per placeholder.
    pub fn validate(&self) -> OrmResult<()> {
        let placeholders = self.placeholder_count();
        if placeholders != self.args.len() {
            return Err(OrmError::validation(format!(
                "fragment {:?} has {placeholders} placeholder(s) but {} argument(s)",
                self.text,
                self.args.len()
            )));
        }
        Ok(())
    }
}

fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut closing: Option<char> = None;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match closing {
            Some(close) if ch == close => {
                // A doubled quote inside a literal is an escape, not the end.
                if (close == '\'' || close == '"') && chars.peek() == Some(&close) {
                    chars.next();
                } else {
                    closing = None;
                }
            }
            Some(_) => {}
            None => match ch {
                '\'' | '"' | '`' => closing = Some(ch),
                '[' => closing = Some(']'),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

/// Produces the table name, assignments and clause fragments of one operation.
///
/// Every method may run concurrently with the others and must not depend on
/// another method's output. The default implementations render the structured
/// descriptors carried by the [`QueryPlan`]; override a method to supply a
/// fragment from elsewhere.
pub trait ClauseSource: Send + Sync + 'static {
    /// Unquoted target table name.
    fn table(&self, plan: &QueryPlan) -> impl Future<Output = OrmResult<String>> + Send {
        async move { Ok(plan.table.clone()) }
    }

    /// Assignment rows for INSERT/UPDATE.
    fn assignments(&self, plan: &QueryPlan) -> impl Future<Output = OrmResult<AssignmentGroup>> + Send {
        async move { Ok(plan.assignments.clone()) }
    }

    /// JOIN clauses.
    fn join(&self, plan: &QueryPlan) -> impl Future<Output = OrmResult<Option<ClauseFragment>>> + Send {
        async move { Ok(render_join(plan)) }
    }

    /// WHERE clause.
    fn conditions(
        &self,
        plan: &QueryPlan,
    ) -> impl Future<Output = OrmResult<Option<ClauseFragment>>> + Send {
        async move { Ok(render_conditions(plan)) }
    }

    /// GROUP BY (and HAVING) clause.
    fn group(&self, plan: &QueryPlan) -> impl Future<Output = OrmResult<Option<ClauseFragment>>> + Send {
        async move { Ok(render_group(plan)) }
    }

    /// ORDER BY clause.
    fn order(&self, plan: &QueryPlan) -> impl Future<Output = OrmResult<Option<ClauseFragment>>> + Send {
        async move { Ok(render_order(plan)) }
    }

    /// LIMIT/OFFSET clause.
    fn limit(&self, plan: &QueryPlan) -> impl Future<Output = OrmResult<Option<ClauseFragment>>> + Send {
        async move { Ok(render_limit(plan)) }
    }
}

/// The default clause source: renders everything from the plan's descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanClauses;

impl ClauseSource for PlanClauses {}

/// `INNER JOIN t ON ...` for each join, space separated.
pub fn render_join(plan: &QueryPlan) -> Option<ClauseFragment> {
    if plan.joins.is_empty() {
        return None;
    }
    let mut out = ClauseFragment::empty();
    for (i, join) in plan.joins.iter().enumerate() {
        if i > 0 {
            out.push(" ");
        }
        out.push(match join.kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
            JoinKind::Cross => "CROSS JOIN ",
        });
        out.push(&join.table);
        if let Some(on) = join.on.as_ref().filter(|on| !on.is_empty()) {
            out.push(" ON ");
            on.write_to(&mut out);
        }
    }
    Some(out)
}

/// `WHERE c1 AND c2 ...`
pub fn render_conditions(plan: &QueryPlan) -> Option<ClauseFragment> {
    let all = Expr::And(plan.conditions.clone());
    if all.is_empty() {
        return None;
    }
    let mut out = ClauseFragment::new("WHERE ");
    all.write_to(&mut out);
    Some(out)
}

/// `GROUP BY a, b [HAVING ...]`
pub fn render_group(plan: &QueryPlan) -> Option<ClauseFragment> {
    if plan.group_by.is_empty() {
        return None;
    }
    let mut out = ClauseFragment::new("GROUP BY ");
    out.push(&plan.group_by.join(", "));
    let having = Expr::And(plan.having.clone());
    if !having.is_empty() {
        out.push(" HAVING ");
        having.write_to(&mut out);
    }
    Some(out)
}

/// `ORDER BY a ASC, b DESC`
pub fn render_order(plan: &QueryPlan) -> Option<ClauseFragment> {
    if plan.order_by.is_empty() {
        return None;
    }
    let mut out = ClauseFragment::new("ORDER BY ");
    for (i, order) in plan.order_by.iter().enumerate() {
        if i > 0 {
            out.push(", ");
        }
        out.push(&order.expr);
        out.push(if order.descending { " DESC" } else { " ASC" });
    }
    Some(out)
}

/// `LIMIT ? [OFFSET ?]`. SQLite requires a LIMIT before OFFSET, so an offset
/// on its own renders `LIMIT -1 OFFSET ?`.
pub fn render_limit(plan: &QueryPlan) -> Option<ClauseFragment> {
    let mut out = match (plan.limit, plan.offset) {
        (None, None) => return None,
        (Some(limit), _) => {
            let mut out = ClauseFragment::new("LIMIT ");
            out.push_bind(limit);
            out
        }
        (None, Some(_)) => ClauseFragment::new("LIMIT -1"),
    };
    if let Some(offset) = plan.offset {
        out.push(" OFFSET ");
        out.push_bind(offset);
    }
    Some(out)
}
