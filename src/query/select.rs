use crate::{
    entity::{Entity, descriptor::EntityDescriptor, value::Slot},
    error::Result,
};

use super::{PushToQuery, Statement, conjunction, equals, is_null, template_slots};

/// Build `SELECT * FROM {table}`, filtered by every field of `template` that is not absent.
///
/// Present fields become `{column} = ?` and explicitly null fields `{column} IS NULL`, glued
/// together with `AND` in column order. An all-absent template selects every row.
///
/// # Errors
///
/// Only if the template's field count does not match the descriptor.
pub fn build_select<E: Entity>(descriptor: &EntityDescriptor, template: &E) -> Result<Statement> {
    let conditions = template_slots(descriptor, template)?
        .into_iter()
        .filter_map(|(column, slot)| match slot {
            Slot::Absent => None,
            Slot::Null => Some(is_null(column)),
            Slot::Present(value) => Some(equals(column, &value)),
        })
        .collect::<Vec<_>>();

    let mut statement = Statement::new("SELECT * FROM ");
    statement.push(descriptor.table_name());

    if let Some(condition) = conjunction(conditions) {
        statement.push(" WHERE ");
        condition.push_to(&mut statement);
    }

    Ok(statement)
}
