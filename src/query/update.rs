use crate::{
    entity::{Entity, descriptor::EntityDescriptor, value::Slot},
    error::{Error, Result},
};

use super::{ListExpr, PushToQuery, Statement, conjunction, equals, template_slots};

/// Build `UPDATE {table} SET {column} = ?, ... WHERE {key} = ? AND ...`.
///
/// The primary key fields select the rows to update, every other present field is written and
/// absent fields are left untouched.
///
/// # Errors
///
/// - [`Error::InvalidEntityDeclaration`] if the entity has no primary key.
/// - [`Error::NoPrimaryKeyValue`] if a primary key field is absent or null.
/// - [`Error::NullNotWritable`] if a non-key field is explicitly null.
/// - [`Error::NoFieldsToUpdate`] if no non-key field is present.
pub fn build_update<E: Entity>(descriptor: &EntityDescriptor, template: &E) -> Result<Statement> {
    descriptor.require_primary_key()?;

    let mut assignments = vec![];
    let mut conditions = vec![];

    for (column, slot) in template_slots(descriptor, template)? {
        match (column.is_primary_key, slot) {
            (true, Slot::Present(value)) => conditions.push(equals(column, &value)),
            (true, Slot::Absent | Slot::Null) => {
                return Err(Error::NoPrimaryKeyValue {
                    field: column.field_name,
                });
            }
            (false, Slot::Present(value)) => assignments.push(equals(column, &value)),
            (false, Slot::Null) => {
                return Err(Error::NullNotWritable {
                    field: column.field_name,
                });
            }
            (false, Slot::Absent) => {}
        }
    }

    if assignments.is_empty() {
        return Err(Error::NoFieldsToUpdate {
            table: descriptor.table_name(),
        });
    }

    let mut statement = Statement::new("UPDATE ");
    statement.push(descriptor.table_name()).push(" SET ");
    ListExpr::new(assignments).push_to(&mut statement);

    if let Some(condition) = conjunction(conditions) {
        statement.push(" WHERE ");
        condition.push_to(&mut statement);
    }

    Ok(statement)
}
