use sqlx::{Row, any::AnyRow};

use super::ColumnDescriptor;
use crate::error::{Error, Result};

/// A single SQL value as it is bound into a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// The state of one template field.
///
/// `Absent` means "no value": it is not filtered on by a select and not written by an update.
/// `Null` is an explicit SQL NULL, which can be filtered on but never written.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    #[default]
    Absent,
    Null,
    Present(Value),
}

impl Slot {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Present(e) => Some(e),
            Self::Absent | Self::Null => None,
        }
    }
}

/// A rust type that can be stored in an entity field.
///
/// Plain types are always present. `Option<T>` is absent when `None`, which also is what a SQL
/// NULL reads back as. `Option<Option<T>>` tells absent (`None`) and NULL (`Some(None)`) apart.
pub trait FieldValue: Sized {
    fn to_slot(&self) -> Slot;

    /// Read the value of `column` from `row`.
    ///
    /// # Errors
    ///
    /// With [`Error::MissingColumn`] if the row has no such column, or with
    /// [`Error::TypeConversion`] if the value cannot be converted into `Self`.
    fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self>;
}

pub(crate) fn read_error(column: &ColumnDescriptor, error: sqlx::Error) -> Error {
    match error {
        sqlx::Error::ColumnNotFound(_) => Error::MissingColumn {
            column: column.column_name.to_owned(),
        },
        sqlx::Error::ColumnDecode { source, .. } | sqlx::Error::Decode(source) => {
            Error::TypeConversion {
                field: column.field_name,
                source,
            }
        }
        other => other.into(),
    }
}

macro_rules! field_values {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl FieldValue for $ty {
                fn to_slot(&self) -> Slot {
                    Slot::Present(Value::$variant(self.clone()))
                }

                fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self> {
                    row.try_get::<$ty, _>(column.column_name)
                        .map_err(|e| read_error(column, e))
                }
            }

            impl FieldValue for Option<$ty> {
                fn to_slot(&self) -> Slot {
                    self.as_ref().map_or(Slot::Absent, <$ty as FieldValue>::to_slot)
                }

                fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self> {
                    row.try_get::<Option<$ty>, _>(column.column_name)
                        .map_err(|e| read_error(column, e))
                }
            }

            impl FieldValue for Option<Option<$ty>> {
                fn to_slot(&self) -> Slot {
                    match self {
                        None => Slot::Absent,
                        Some(None) => Slot::Null,
                        Some(Some(e)) => e.to_slot(),
                    }
                }

                fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self> {
                    <Option<$ty> as FieldValue>::read(row, column).map(Some)
                }
            }
        )*
    };
}

field_values! {
    bool => Bool,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f64 => Double,
    String => Text,
    Vec<u8> => Blob,
}

/// Drivers report floating point columns as double precision, so `f32` is read as `f64` and
/// narrowed. Finite values outside the `f32` range fail to convert.
fn narrow(column: &ColumnDescriptor, wide: f64) -> Result<f32> {
    #[allow(clippy::cast_possible_truncation)]
    let narrow = wide as f32;

    if narrow.is_finite() || !wide.is_finite() {
        Ok(narrow)
    } else {
        Err(Error::TypeConversion {
            field: column.field_name,
            source: format!("{wide} does not fit into f32").into(),
        })
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Real(value)
    }
}

impl FieldValue for f32 {
    fn to_slot(&self) -> Slot {
        Slot::Present(Value::Real(*self))
    }

    fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self> {
        narrow(column, f64::read(row, column)?)
    }
}

impl FieldValue for Option<f32> {
    fn to_slot(&self) -> Slot {
        self.as_ref().map_or(Slot::Absent, f32::to_slot)
    }

    fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self> {
        <Option<f64> as FieldValue>::read(row, column)?
            .map(|e| narrow(column, e))
            .transpose()
    }
}

impl FieldValue for Option<Option<f32>> {
    fn to_slot(&self) -> Slot {
        match self {
            None => Slot::Absent,
            Some(None) => Slot::Null,
            Some(Some(e)) => e.to_slot(),
        }
    }

    fn read(row: &AnyRow, column: &ColumnDescriptor) -> Result<Self> {
        <Option<f32> as FieldValue>::read(row, column).map(Some)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
