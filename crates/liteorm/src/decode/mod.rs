//! Result decoding into destinations whose shape is resolved at run time.
//!
//! A destination resolves once, up front, into a [`ScanTarget`]:
//!
//! - `Single(Binding::Record)`: a struct implementing [`Bindable`]
//! - `Single(Binding::Map)`: a [`ValueMap`]
//! - `Sequence`: a `Vec` of either, reset to empty and grown one row at a time
//! - `Unsupported`: anything else; decoding fails before touching a row
//!
//! `Option<T>` and `Box<T>` are indirections: they resolve to their inner
//! destination, allocating a default value when the option is `None`.


use crate::error::{OrmError, OrmResult};
use crate::executor::Rows;
use crate::record::{Bindable, Scan};
use crate::value::{Value, ValueMap};
use std::any::type_name;

/// A single row destination.
pub enum Binding<'a> {
    Record(&'a mut dyn Bindable),
    Map(&'a mut ValueMap),
}

/// A destination with its shape resolved.
pub enum ScanTarget<'a> {
    Single(Binding<'a>),
    Sequence(&'a mut dyn Sequence),
    Unsupported(&'static str),
}

/// Shape of the elements of a sequence destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Record,
    Map,
    Unsupported(&'static str),
}

/// Anything query results can be decoded into.
pub trait Destination: Send {
    fn resolve(&mut self) -> ScanTarget<'_>;
}

/// A growable sequence of row destinations.
pub trait Sequence: Send {
    /// Shape of a freshly created element.
    fn element_kind(&self) -> ElementKind;

    /// Drop all elements.
    fn reset(&mut self);

    /// Decode one row into a fresh element and append it.
    fn decode_row(&mut self, columns: &[String], row: &[Value]) -> OrmResult<()>;
}

impl Destination for ValueMap {
    fn resolve(&mut self) -> ScanTarget<'_> {
        ScanTarget::Single(Binding::Map(self))
    }
}

impl<T: Destination + Default> Destination for Vec<T> {
    fn resolve(&mut self) -> ScanTarget<'_> {
        ScanTarget::Sequence(self)
    }
}

impl<T: Destination + Default> Destination for Option<T> {
    fn resolve(&mut self) -> ScanTarget<'_> {
        if self.is_none() {
            // Only allocate once the inner shape is known to be decodable.
            let mut fresh = T::default();
            if let Some(name) = unsupported_shape(&mut fresh) {
                return ScanTarget::Unsupported(name);
            }
            *self = Some(fresh);
        }
        match self {
            Some(inner) => inner.resolve(),
            None => ScanTarget::Unsupported(type_name::<T>()),
        }
    }
}

/// The offending type name if `dest` cannot be decoded into.
fn unsupported_shape<D: Destination + ?Sized>(dest: &mut D) -> Option<&'static str> {
    match dest.resolve() {
        ScanTarget::Single(_) => None,
        ScanTarget::Sequence(sequence) => match sequence.element_kind() {
            ElementKind::Unsupported(name) => Some(name),
            ElementKind::Record | ElementKind::Map => None,
        },
        ScanTarget::Unsupported(name) => Some(name),
    }
}

impl<T: Destination + ?Sized> Destination for Box<T> {
    fn resolve(&mut self) -> ScanTarget<'_> {
        (**self).resolve()
    }
}

macro_rules! unsupported_destination {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Destination for $ty {
                fn resolve(&mut self) -> ScanTarget<'_> {
                    ScanTarget::Unsupported(type_name::<$ty>())
                }
            }
        )*
    };
}

unsupported_destination!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool, String, Value);

impl<T: Destination + Default> Sequence for Vec<T> {
    fn element_kind(&self) -> ElementKind {
        let mut sample = T::default();
        match sample.resolve() {
            ScanTarget::Single(Binding::Record(_)) => ElementKind::Record,
            ScanTarget::Single(Binding::Map(_)) => ElementKind::Map,
            ScanTarget::Sequence(_) => ElementKind::Unsupported(type_name::<T>()),
            ScanTarget::Unsupported(name) => ElementKind::Unsupported(name),
        }
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn decode_row(&mut self, columns: &[String], row: &[Value]) -> OrmResult<()> {
        let mut element = T::default();
        match element.resolve() {
            ScanTarget::Single(mut binding) => scan_row(&mut binding, columns, row)?,
            ScanTarget::Sequence(_) => {
                return Err(OrmError::unsupported_destination(type_name::<T>()));
            }
            ScanTarget::Unsupported(name) => return Err(OrmError::unsupported_destination(name)),
        }
        self.push(element);
        Ok(())
    }
}

/// Decode `rows` into `dest`, returning the number of rows scanned.
///
/// A sequence destination ends with exactly one element per row. A single
/// destination is scanned once per row in cursor order, so the last row wins.
/// A scan failure aborts the decode; rows already appended stay appended.
pub fn decode_rows<D: Destination + ?Sized>(rows: Rows, dest: &mut D) -> OrmResult<usize> {
    let (columns, rows) = rows.into_parts();
    match dest.resolve() {
        ScanTarget::Unsupported(name) => Err(OrmError::unsupported_destination(name)),
        ScanTarget::Single(mut binding) => {
            for row in &rows {
                scan_row(&mut binding, &columns, row)?;
            }
            Ok(rows.len())
        }
        ScanTarget::Sequence(sequence) => {
            if let ElementKind::Unsupported(name) = sequence.element_kind() {
                return Err(OrmError::unsupported_destination(name));
            }
            sequence.reset();
            for row in &rows {
                sequence.decode_row(&columns, row)?;
            }
            Ok(rows.len())
        }
    }
}

/// Bind one scan target per column, then scan the row into them.
fn scan_row(binding: &mut Binding<'_>, columns: &[String], row: &[Value]) -> OrmResult<()> {
    if row.len() != columns.len() {
        return Err(OrmError::decode(
            "*",
            format!("row has {} values for {} columns", row.len(), columns.len()),
        ));
    }

    match binding {
        Binding::Map(map) => {
            for (column, value) in columns.iter().zip(row) {
                let mut slot = Value::Null;
                slot.scan(value)
                    .map_err(|e| OrmError::decode(column.as_str(), e.to_string()))?;
                map.insert(column.clone(), slot);
            }
        }
        Binding::Record(record) => {
            let mut fields = record.fields_by_column();
            // Unknown columns are skipped; a repeated column overwrites the
            // field, so its last occurrence wins.
            for (column, value) in columns.iter().zip(row) {
                if let Some(target) = fields.get_mut(column) {
                    target
                        .scan(value)
                        .map_err(|e| OrmError::decode(column.as_str(), e.to_string()))?;
                }
            }
        }
    }
    Ok(())
}
