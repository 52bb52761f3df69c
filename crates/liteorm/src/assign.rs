//! Assignment rows for INSERT/UPDATE and post-insert key assignment.

use crate::error::OrmError;
use crate::record::{Bindable, ColumnMeta, Record};
use crate::value::Value;

/// A column/value pair destined for an INSERT or UPDATE.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentField {
    pub column: String,
    pub value: Value,
    pub is_primary_key: bool,
    pub has_default: bool,
    pub is_blank: bool,
}

impl AssignmentField {
    /// A plain field; blankness is derived from the value.
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        let is_blank = value.is_blank();
        Self {
            column: column.into(),
            value,
            is_primary_key: false,
            has_default: false,
            is_blank,
        }
    }

    /// A field described by record metadata.
    pub fn from_meta(meta: &ColumnMeta, value: Value) -> Self {
        Self {
            is_primary_key: meta.is_primary_key,
            has_default: meta.has_default,
            ..Self::new(meta.name, value)
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// The value to bind on insert: NULL for a blank primary-key or
    /// has-default field, so the engine generates it.
    pub fn insert_value(&self) -> Value {
        if (self.is_primary_key || self.has_default) && self.is_blank {
            Value::Null
        } else {
            self.value.clone()
        }
    }
}

/// One row of assignment fields per record being written.
///
/// For an insert, every row must carry the same columns in the same order; the
/// first row defines the column list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssignmentGroup {
    rows: Vec<Vec<AssignmentField>>,
}

impl AssignmentGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<AssignmentField>>) -> Self {
        Self { rows }
    }

    pub fn from_records<R: Record>(records: &[R]) -> Self {
        Self {
            rows: records.iter().map(Record::assignment_fields).collect(),
        }
    }

    pub fn push_row(&mut self, fields: Vec<AssignmentField>) {
        self.rows.push(fields);
    }

    /// Append a field to the first row, creating the row if the group is empty.
    pub fn push_field(&mut self, field: AssignmentField) {
        match self.rows.first_mut() {
            Some(row) => row.push(field),
            None => self.rows.push(vec![field]),
        }
    }

    pub fn rows(&self) -> &[Vec<AssignmentField>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The primary-key field tracked for one inserted row.
///
/// That is the first field flagged as primary key, or a field named after the
/// identifier column, whichever comes first in the row.
pub fn primary_key_column<'a>(fields: &'a [AssignmentField], id_column: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.is_primary_key || f.column == id_column)
        .map(|f| f.column.as_str())
}

/// A generated identifier destined for one inserted row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedKey {
    pub row: usize,
    pub column: String,
    pub id: i64,
}

/// Compute the keys for a batch insert.
///
/// Assumes the engine allocated one contiguous ascending block of identifiers
/// that ends at `last_insert_id`. The assumption only holds when no other
/// writer shares the connection or sequence; when `rows_affected` differs from
/// the number of inserted rows nothing is attributed.
pub fn contiguous_keys(
    primary_keys: &[Option<String>],
    rows_affected: u64,
    last_insert_id: i64,
) -> Option<Vec<GeneratedKey>> {
    let affected = i64::try_from(rows_affected).ok()?;
    if primary_keys.len() as u64 != rows_affected || affected == 0 {
        return None;
    }
    let first = last_insert_id - affected + 1;
    let keys = primary_keys
        .iter()
        .enumerate()
        .filter_map(|(row, column)| {
            column.as_ref().map(|column| GeneratedKey {
                row,
                column: column.clone(),
                id: first + row as i64,
            })
        })
        .collect();
    Some(keys)
}

/// Write generated keys back onto the inserted records.
///
/// Failures are collected per row; one failing row never stops the others.
pub fn assign_keys<B: Bindable>(keys: &[GeneratedKey], records: &mut [B]) -> Vec<OrmError> {
    let mut errors = Vec::new();
    for key in keys {
        let Some(record) = records.get_mut(key.row) else {
            errors.push(OrmError::KeyAssignment {
                row: key.row,
                column: key.column.clone(),
                message: "no record at this position".to_string(),
            });
            continue;
        };
        let mut fields = record.fields_by_column();
        let result = match fields.get_mut(&key.column) {
            Some(slot) => slot.scan(&Value::Integer(key.id)).map_err(|e| e.to_string()),
            None => Err("record has no such field".to_string()),
        };
        if let Err(message) = result {
            errors.push(OrmError::KeyAssignment {
                row: key.row,
                column: key.column.clone(),
                message,
            });
        }
    }
    errors
}
