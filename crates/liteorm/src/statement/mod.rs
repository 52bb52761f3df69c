//! Statement assembly for INSERT/SELECT/UPDATE/DELETE.
//!
//! Assembly is a pure function of already-produced fragments. Each clause's
//! text is appended in canonical order and its arguments are appended right
//! after it, so argument *i* always binds placeholder *i*.

use crate::assign::{AssignmentGroup, primary_key_column};
use crate::clause::ClauseFragment;
use crate::error::{OrmError, OrmResult};
use crate::plan::Selection;
use crate::quote::QuoteStyle;
use crate::value::Value;

/// Final SQL text plus its ordered arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statement {
    sql: String,
    args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }

    fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    fn push_quoted(&mut self, style: QuoteStyle, ident: &str) -> &mut Self {
        style.write_quoted(&mut self.sql, ident);
        self
    }

    fn push_bind(&mut self, value: Value) -> &mut Self {
        self.sql.push('?');
        self.args.push(value);
        self
    }

    /// Append ` <fragment text>` and then the fragment's arguments.
    fn push_clause(&mut self, clause: Option<ClauseFragment>) -> OrmResult<&mut Self> {
        let Some(clause) = clause else {
            return Ok(self);
        };
        clause.validate()?;
        let (text, args) = clause.into_parts();
        if !text.is_empty() {
            self.sql.push(' ');
            self.sql.push_str(&text);
        }
        self.args.extend(args);
        Ok(self)
    }
}

/// Fragments for a SELECT, in canonical order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryClauses {
    pub join: Option<ClauseFragment>,
    pub conditions: Option<ClauseFragment>,
    pub group: Option<ClauseFragment>,
    pub order: Option<ClauseFragment>,
    pub limit: Option<ClauseFragment>,
}

/// Fragments for an UPDATE or DELETE, in canonical order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterClauses {
    pub conditions: Option<ClauseFragment>,
    pub order: Option<ClauseFragment>,
    pub limit: Option<ClauseFragment>,
}

/// An assembled INSERT plus the primary-key column tracked for each row.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertStatement {
    pub statement: Statement,
    pub primary_keys: Vec<Option<String>>,
}

/// `INSERT INTO "t" ("a", "b") VALUES (?, ?), (?, ?)`, or
/// `INSERT INTO "t" DEFAULT VALUES` for an empty group.
///
/// The first row's field order defines the column list. Rows with a different
/// column order are a caller error; they are emitted as given.
pub fn build_insert(
    style: QuoteStyle,
    id_column: &str,
    table: &str,
    group: &AssignmentGroup,
) -> InsertStatement {
    let mut stmt = Statement::new("INSERT INTO ");
    stmt.push_quoted(style, table);

    let Some(first) = group.rows().first() else {
        stmt.push(" DEFAULT VALUES");
        return InsertStatement {
            statement: stmt,
            primary_keys: Vec::new(),
        };
    };

    stmt.push(" (");
    for (i, field) in first.iter().enumerate() {
        if i > 0 {
            stmt.push(", ");
        }
        stmt.push_quoted(style, &field.column);
    }
    stmt.push(") VALUES ");

    let mut primary_keys = Vec::with_capacity(group.len());
    for (row_idx, fields) in group.rows().iter().enumerate() {
        if row_idx > 0 {
            stmt.push(", ");
        }
        stmt.push("(");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                stmt.push(", ");
            }
            stmt.push_bind(field.insert_value());
        }
        stmt.push(")");
        primary_keys.push(primary_key_column(fields, id_column).map(str::to_string));
    }

    InsertStatement {
        statement: stmt,
        primary_keys,
    }
}

/// `SELECT <cols> FROM "t" [join] [WHERE] [GROUP BY] [ORDER BY] [LIMIT]`.
pub fn build_select(
    style: QuoteStyle,
    table: &str,
    selection: &Selection,
    clauses: QueryClauses,
) -> OrmResult<Statement> {
    let mut stmt = Statement::new("SELECT ");
    if selection.is_all() {
        stmt.push("*");
    } else {
        let columns = ClauseFragment::with_args(selection.columns.join(", "), selection.args.clone());
        columns.validate()?;
        let (text, args) = columns.into_parts();
        stmt.push(&text);
        stmt.args.extend(args);
    }

    stmt.push(" FROM ");
    stmt.push_quoted(style, table);

    let QueryClauses {
        join,
        conditions,
        group,
        order,
        limit,
    } = clauses;
    stmt.push_clause(join)?
        .push_clause(conditions)?
        .push_clause(group)?
        .push_clause(order)?
        .push_clause(limit)?;
    Ok(stmt)
}

/// `UPDATE "t" SET "a" = ?, "b" = ? [WHERE] [ORDER BY] [LIMIT]`.
///
/// Only single-row assignment groups are supported; a multi-row group is
/// rejected rather than applying the first row to every match.
pub fn build_update(
    style: QuoteStyle,
    table: &str,
    group: &AssignmentGroup,
    clauses: FilterClauses,
) -> OrmResult<Statement> {
    let fields = match group.rows() {
        [] => return Err(OrmError::validation("UPDATE requires at least one assignment")),
        [fields] => fields,
        rows => {
            return Err(OrmError::validation(format!(
                "UPDATE with {} assignment rows is not supported; update one record at a time",
                rows.len()
            )));
        }
    };
    if fields.is_empty() {
        return Err(OrmError::validation("UPDATE requires at least one assignment"));
    }

    let mut stmt = Statement::new("UPDATE ");
    stmt.push_quoted(style, table).push(" SET ");
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            stmt.push(", ");
        }
        stmt.push_quoted(style, &field.column).push(" = ");
        stmt.push_bind(field.value.clone());
    }

    push_filters(&mut stmt, clauses)?;
    Ok(stmt)
}

/// `DELETE FROM "t" [WHERE] [ORDER BY] [LIMIT]`.
pub fn build_delete(style: QuoteStyle, table: &str, clauses: FilterClauses) -> OrmResult<Statement> {
    let mut stmt = Statement::new("DELETE FROM ");
    stmt.push_quoted(style, table);
    push_filters(&mut stmt, clauses)?;
    Ok(stmt)
}

fn push_filters(stmt: &mut Statement, clauses: FilterClauses) -> OrmResult<()> {
    let FilterClauses {
        conditions,
        order,
        limit,
    } = clauses;
    stmt.push_clause(conditions)?
        .push_clause(order)?
        .push_clause(limit)?;
    Ok(())
}
