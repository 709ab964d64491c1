use sqlx::any::AnyRow;

use crate::{
    entity::{Entity, descriptor::EntityDescriptor},
    error::Result,
};

/// Turn one result row into a fresh instance of `E`.
///
/// Starts from `E::default()` and assigns every column of `descriptor` in order, converting the
/// row's value into the field's declared type. SQL NULLs read back into optional fields as
/// their `None` state.
///
/// # Errors
///
/// With [`Error::MissingColumn`](crate::Error::MissingColumn) if a column is missing from the
/// row, or with [`Error::TypeConversion`](crate::Error::TypeConversion) naming the field whose
/// value could not be converted.
pub fn materialize<E: Entity>(descriptor: &EntityDescriptor, row: &AnyRow) -> Result<E> {
    let mut instance = E::default();

    for (index, column) in descriptor.columns().iter().enumerate() {
        instance.assign(index, row, column)?;
    }

    Ok(instance)
}
