pub mod descriptor;
pub mod value;

use std::sync::Arc;

use descriptor::EntityDescriptor;
use sqlx::any::AnyRow;
use value::Slot;

use crate::error::Result;

/// Static mapping between one struct field and one table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// The name of the field on the rust struct.
    pub field_name: &'static str,
    /// The name this column has in the database.
    pub column_name: &'static str,
    pub is_primary_key: bool,
}

impl ColumnDescriptor {
    #[must_use]
    pub const fn new(field_name: &'static str, column_name: &'static str) -> Self {
        Self {
            field_name,
            column_name,
            is_primary_key: false,
        }
    }

    #[must_use]
    pub const fn primary_key(field_name: &'static str, column_name: &'static str) -> Self {
        Self {
            field_name,
            column_name,
            is_primary_key: true,
        }
    }
}

/// A record shape mapped to exactly one table.
///
/// Usually implemented through `#[derive(Entity)]`, but a manual implementation is just a table
/// name, a column list and two accessors:
///
/// ```rust,ignore
/// impl Entity for AppKey {
///     const TABLE_NAME: &'static str = "AppIds";
///     const COLUMNS: &'static [ColumnDescriptor] =
///         &[ColumnDescriptor::primary_key("app_key", "app_key")];
///
///     fn slots(&self) -> Vec<Slot> {
///         vec![self.app_key.to_slot()]
///     }
///
///     fn assign(&mut self, index: usize, row: &AnyRow, column: &ColumnDescriptor) -> Result<()> {
///         match index {
///             0 => self.app_key = FieldValue::read(row, column)?,
///             _ => return Err(unknown_column::<Self>(index)),
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: Default + Send + Sync + 'static {
    /// The name of this entity's table in the database.
    const TABLE_NAME: &'static str;

    /// All persisted fields, in declaration order.
    const COLUMNS: &'static [ColumnDescriptor];

    /// The state of every field, in the same order as [`Entity::COLUMNS`].
    fn slots(&self) -> Vec<Slot>;

    /// Populate the field at `index` (an index into [`Entity::COLUMNS`]) from `row`.
    ///
    /// # Errors
    ///
    /// If the column is missing from the row, or its value cannot be converted into the field's
    /// type.
    fn assign(&mut self, index: usize, row: &AnyRow, column: &ColumnDescriptor) -> Result<()>;

    /// The validated, cached descriptor of this entity.
    ///
    /// # Errors
    ///
    /// If the declaration is invalid, see [`descriptor::describe`].
    fn describe() -> Result<Arc<EntityDescriptor>> {
        descriptor::describe::<Self>()
    }
}

/// The error an [`Entity::assign`] implementation returns for an index it does not know.
#[must_use]
pub fn unknown_column<E: Entity>(index: usize) -> crate::Error {
    crate::Error::invalid_entity(
        std::any::type_name::<E>(),
        format!("no field at column index {index}"),
    )
}
