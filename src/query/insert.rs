use crate::{
    entity::{Entity, descriptor::EntityDescriptor, value::Slot},
    error::{Error, Result},
};

use super::{BracketsExpr, ColumnName, ListExpr, PushToQuery, Statement, template_slots};

/// Build `INSERT INTO {table} ({columns}) VALUES ({placeholders})` over every column.
///
/// # Errors
///
/// With [`Error::MissingRequiredField`] if any field of `template` is absent, and with
/// [`Error::NullNotWritable`] if any field is explicitly null.
pub fn build_insert<E: Entity>(descriptor: &EntityDescriptor, template: &E) -> Result<Statement> {
    let (columns, values): (Vec<_>, Vec<_>) = template_slots(descriptor, template)?
        .into_iter()
        .map(|(column, slot)| match slot {
            Slot::Absent => Err(Error::MissingRequiredField {
                field: column.field_name,
            }),
            Slot::Null => Err(Error::NullNotWritable {
                field: column.field_name,
            }),
            Slot::Present(value) => Ok((ColumnName::new(column), value)),
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();

    let mut statement = Statement::new("INSERT INTO ");
    statement.push(descriptor.table_name()).push(" ");
    BracketsExpr::new(ListExpr::new(columns)).push_to(&mut statement);
    statement.push(" VALUES ");
    BracketsExpr::new(ListExpr::new(values)).push_to(&mut statement);

    Ok(statement)
}
