//! Record metadata: column names, key flags and field storage by column.
//!
//! The [`impl_record!`](crate::impl_record) macro implements everything a
//! plain struct needs to be inserted, updated and decoded into:
//!
//! ```ignore
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     role: String,
//! }
//!
//! liteorm::impl_record!(User, table = "users", {
//!     id [primary_key],
//!     name,
//!     role [with_default],
//! });
//! ```

use crate::assign::AssignmentField;
use crate::value::{FromValue, Value, ValueConversionError};
use std::collections::HashMap;

/// Static description of one record column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: &'static str,
    pub is_primary_key: bool,
    pub has_default: bool,
}

impl ColumnMeta {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            is_primary_key: false,
            has_default: false,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub const fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// A writable slot a single column value is decoded into.
pub trait Scan: Send {
    fn scan(&mut self, value: &Value) -> Result<(), ValueConversionError>;
}

impl<T: FromValue + Send> Scan for T {
    fn scan(&mut self, value: &Value) -> Result<(), ValueConversionError> {
        *self = T::from_value(value)?;
        Ok(())
    }
}

/// Column name to field storage for one record value.
#[derive(Default)]
pub struct FieldIndex<'a> {
    slots: HashMap<&'static str, &'a mut (dyn Scan + 'a)>,
}

impl<'a> FieldIndex<'a> {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Bind `column` to a field.
    pub fn bind<T: Scan + 'a>(&mut self, column: &'static str, slot: &'a mut T) -> &mut Self {
        self.slots.insert(column, slot);
        self
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut (dyn Scan + 'a)> {
        self.slots.get_mut(column).map(|slot| &mut **slot)
    }

    /// Remove and return the slot for `column`.
    pub fn take(&mut self, column: &str) -> Option<&'a mut (dyn Scan + 'a)> {
        self.slots.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.slots.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Resolves a record value's fields by column name.
pub trait Bindable {
    fn fields_by_column(&mut self) -> FieldIndex<'_>;
}

/// A struct mapped to a table.
pub trait Record: Bindable + Default + Send {
    fn table_name() -> &'static str;

    /// Columns in declaration order.
    fn columns() -> &'static [ColumnMeta];

    /// One assignment field per column, in declaration order.
    fn assignment_fields(&self) -> Vec<AssignmentField>;

    /// The primary-key column, if one is flagged.
    fn primary_key() -> Option<&'static str> {
        Self::columns()
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name)
    }
}

/// Implement [`Bindable`], [`Record`] and
/// [`Destination`](crate::decode::Destination) for a struct whose field names
/// are its column names.
///
/// Field flags: `primary_key`, `with_default`.
#[macro_export]
macro_rules! impl_record {
    ($ty:ty, table = $table:literal, { $($field:ident $([$($flag:ident),* $(,)?])?),* $(,)? }) => {
        impl $crate::record::Bindable for $ty {
            fn fields_by_column(&mut self) -> $crate::record::FieldIndex<'_> {
                let mut index = $crate::record::FieldIndex::new();
                $( index.bind(stringify!($field), &mut self.$field); )*
                index
            }
        }

        impl $crate::record::Record for $ty {
            fn table_name() -> &'static str {
                $table
            }

            fn columns() -> &'static [$crate::record::ColumnMeta] {
                const COLUMNS: &[$crate::record::ColumnMeta] = &[
                    $( $crate::record::ColumnMeta::new(stringify!($field)) $($(.$flag())*)? ),*
                ];
                COLUMNS
            }

            fn assignment_fields(&self) -> Vec<$crate::assign::AssignmentField> {
                let values = [ $( $crate::value::ToValue::to_value(&self.$field) ),* ];
                <Self as $crate::record::Record>::columns()
                    .iter()
                    .zip(values)
                    .map(|(meta, value)| $crate::assign::AssignmentField::from_meta(meta, value))
                    .collect()
            }
        }

        impl $crate::decode::Destination for $ty {
            fn resolve(&mut self) -> $crate::decode::ScanTarget<'_> {
                $crate::decode::ScanTarget::Single($crate::decode::Binding::Record(self))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        id: i64,
        email: String,
        plan: Option<String>,
    }

    crate::impl_record!(Account, table = "accounts", {
        id [primary_key],
        email,
        plan [with_default],
    });

    #[test]
    fn columns_follow_declaration_order() {
        let names: Vec<_> = Account::columns().iter().map(|c| c.name).collect();
        assert_eq!(names, ["id", "email", "plan"]);
        assert_eq!(Account::primary_key(), Some("id"));
        assert_eq!(Account::table_name(), "accounts");
    }

    #[test]
    fn assignment_fields_carry_flags() {
        let account = Account {
            id: 0,
            email: "a@example.com".into(),
            plan: None,
        };
        let fields = account.assignment_fields();
        assert!(fields[0].is_primary_key && fields[0].is_blank);
        assert!(!fields[1].is_blank);
        assert!(fields[2].has_default && fields[2].is_blank);
        assert_eq!(fields[2].insert_value(), Value::Null);
    }

    #[test]
    fn field_index_writes_through() {
        let mut account = Account::default();
        {
            let mut fields = account.fields_by_column();
            fields.get_mut("id").unwrap().scan(&Value::Integer(9)).unwrap();
            fields.get_mut("plan").unwrap().scan(&Value::Text("pro".into())).unwrap();
            assert!(fields.get_mut("missing").is_none());
        }
        assert_eq!(account.id, 9);
        assert_eq!(account.plan.as_deref(), Some("pro"));
    }
}
