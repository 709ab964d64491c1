use crate::{
    entity::{Entity, descriptor::EntityDescriptor, value::Slot},
    error::{Error, Result},
};

use super::{PushToQuery, Statement, conjunction, equals, template_slots};

/// Build `DELETE FROM {table} WHERE {key} = ? AND ...`. Non-key fields are ignored.
///
/// # Errors
///
/// With [`Error::InvalidEntityDeclaration`] if the entity has no primary key, and with
/// [`Error::NoPrimaryKeyValue`] if a primary key field is absent or null.
pub fn build_delete<E: Entity>(descriptor: &EntityDescriptor, template: &E) -> Result<Statement> {
    descriptor.require_primary_key()?;

    let conditions = template_slots(descriptor, template)?
        .into_iter()
        .filter(|(column, _)| column.is_primary_key)
        .map(|(column, slot)| match slot {
            Slot::Present(value) => Ok(equals(column, &value)),
            Slot::Absent | Slot::Null => Err(Error::NoPrimaryKeyValue {
                field: column.field_name,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut statement = Statement::new("DELETE FROM ");
    statement.push(descriptor.table_name());

    if let Some(condition) = conjunction(conditions) {
        statement.push(" WHERE ");
        condition.push_to(&mut statement);
    }

    Ok(statement)
}
