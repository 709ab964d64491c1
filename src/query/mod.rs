pub mod delete;
pub mod insert;
pub mod parse;
pub mod select;
pub mod update;

use std::{fmt::Display, ops::Deref};

use sqlx::{Any, QueryBuilder};

use crate::{
    entity::{
        ColumnDescriptor, Entity,
        descriptor::EntityDescriptor,
        value::{Slot, Value},
    },
    error::{Error, Result},
};

/// This trait represents anything that can be pushed into a [`Statement`], i.e. any kind of
/// query fragment, like a condition or a list of values.
pub trait PushToQuery {
    /// Push the object's contents into a statement.
    fn push_to(&self, statement: &mut Statement);
}

impl PushToQuery for Box<dyn PushToQuery> {
    fn push_to(&self, statement: &mut Statement) {
        self.deref().push_to(statement);
    }
}

impl PushToQuery for &'static str {
    fn push_to(&self, statement: &mut Statement) {
        statement.push(self);
    }
}

/// Values are never spliced into the SQL text, they always end up as bound parameters.
impl PushToQuery for Value {
    fn push_to(&self, statement: &mut Statement) {
        statement.push_bind(self.clone());
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Fragment {
    Sql(String),
    Bind(usize),
}

/// A built SQL statement: its text plus the values bound to its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    fragments: Vec<Fragment>,
    params: Vec<Value>,
}

impl Statement {
    pub(crate) fn new(init: impl Into<String>) -> Self {
        Self {
            fragments: vec![Fragment::Sql(init.into())],
            params: vec![],
        }
    }

    pub(crate) fn push(&mut self, sql: impl Display) -> &mut Self {
        self.fragments.push(Fragment::Sql(sql.to_string()));
        self
    }

    pub(crate) fn push_bind(&mut self, value: Value) -> &mut Self {
        self.fragments.push(Fragment::Bind(self.params.len()));
        self.params.push(value);
        self
    }

    /// The values bound to this statement, in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Replay the statement into a sqlx [`QueryBuilder`], binding every parameter.
    #[must_use]
    pub fn to_query_builder<'args>(&self) -> QueryBuilder<'args, Any> {
        let mut builder = QueryBuilder::new("");

        for fragment in &self.fragments {
            match fragment {
                Fragment::Sql(sql) => {
                    builder.push(sql);
                }
                Fragment::Bind(index) => bind(&mut builder, &self.params[*index]),
            }
        }

        builder
    }

    /// Return the raw SQL of this statement, with `?` as placeholder for every parameter.
    #[must_use]
    pub fn sql(&self) -> String {
        self.to_query_builder().into_sql()
    }
}

fn bind(builder: &mut QueryBuilder<'_, Any>, value: &Value) {
    match value {
        Value::Null => builder.push_bind(None::<String>),
        Value::Bool(e) => builder.push_bind(*e),
        Value::SmallInt(e) => builder.push_bind(*e),
        Value::Int(e) => builder.push_bind(*e),
        Value::BigInt(e) => builder.push_bind(*e),
        Value::Real(e) => builder.push_bind(*e),
        Value::Double(e) => builder.push_bind(*e),
        Value::Text(e) => builder.push_bind(e.clone()),
        Value::Blob(e) => builder.push_bind(e.clone()),
    };
}

/// The name of a column, as it appears in a statement.
pub(crate) struct ColumnName(&'static str);

impl ColumnName {
    pub(crate) const fn new(column: &ColumnDescriptor) -> Self {
        Self(column.column_name)
    }
}

impl Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PushToQuery for ColumnName {
    fn push_to(&self, statement: &mut Statement) {
        statement.push(self);
    }
}

pub(crate) struct BracketsExpr<T: PushToQuery>(T);

impl<T: PushToQuery> BracketsExpr<T> {
    pub(crate) const fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T: PushToQuery> PushToQuery for BracketsExpr<T> {
    fn push_to(&self, statement: &mut Statement) {
        statement.push("(");
        self.0.push_to(statement);
        statement.push(")");
    }
}

/// A comma separated list of query fragments.
pub(crate) struct ListExpr<T: PushToQuery>(Vec<T>);

impl<T: PushToQuery> ListExpr<T> {
    pub(crate) const fn new(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: PushToQuery> PushToQuery for ListExpr<T> {
    fn push_to(&self, statement: &mut Statement) {
        self.0.iter().enumerate().for_each(|(i, e)| {
            if i > 0 {
                statement.push(", ");
            }
            e.push_to(statement);
        });
    }
}

pub(crate) enum BinaryExprOperand {
    Equals,
    And,
}

impl Display for BinaryExprOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Equals => "=",
                Self::And => "AND",
            }
        )
    }
}

/// A binary SQL expression, glued together with an operator.
///
/// Example: `left-side [operator] right-side`
pub(crate) struct BinaryExpr<T, C>
where
    T: PushToQuery,
    C: PushToQuery,
{
    a: T,
    b: C,
    operand: BinaryExprOperand,
}

impl<T, C> BinaryExpr<T, C>
where
    T: PushToQuery,
    C: PushToQuery,
{
    pub(crate) const fn new(left: T, right: C, operand: BinaryExprOperand) -> Self {
        Self {
            a: left,
            b: right,
            operand,
        }
    }
}

impl<T, C> PushToQuery for BinaryExpr<T, C>
where
    T: PushToQuery,
    C: PushToQuery,
{
    fn push_to(&self, statement: &mut Statement) {
        self.a.push_to(statement);
        statement.push(format_args!(" {} ", self.operand));
        self.b.push_to(statement);
    }
}

pub(crate) enum SingletonExprOperand {
    IsNull,
}

impl Display for SingletonExprOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::IsNull => "IS NULL",
            }
        )
    }
}

pub(crate) struct SingletonExpr<T>
where
    T: PushToQuery,
{
    inner: T,
    operand: SingletonExprOperand,
}

impl<T> SingletonExpr<T>
where
    T: PushToQuery,
{
    pub(crate) const fn new(inner: T, operand: SingletonExprOperand) -> Self {
        Self { inner, operand }
    }
}

impl<T> PushToQuery for SingletonExpr<T>
where
    T: PushToQuery,
{
    fn push_to(&self, statement: &mut Statement) {
        self.inner.push_to(statement);
        statement.push(format_args!(" {}", self.operand));
    }
}

/// `column = ?`, bound to `value`.
pub(crate) fn equals(column: &ColumnDescriptor, value: &Value) -> Box<dyn PushToQuery> {
    Box::new(BinaryExpr::new(
        ColumnName::new(column),
        value.clone(),
        BinaryExprOperand::Equals,
    ))
}

/// `column IS NULL`.
pub(crate) fn is_null(column: &ColumnDescriptor) -> Box<dyn PushToQuery> {
    Box::new(SingletonExpr::new(
        ColumnName::new(column),
        SingletonExprOperand::IsNull,
    ))
}

/// Glue conditions together with `AND`, returning `None` if there are none.
pub(crate) fn conjunction(conditions: Vec<Box<dyn PushToQuery>>) -> Option<Box<dyn PushToQuery>> {
    conditions.into_iter().reduce(|acc, curr| {
        Box::new(BinaryExpr::new(acc, curr, BinaryExprOperand::And)) as Box<dyn PushToQuery>
    })
}

/// Pair every column of `descriptor` with the state of the matching field of `template`.
///
/// A present [`Value::Null`] is treated as [`Slot::Null`].
pub(crate) fn template_slots<E: Entity>(
    descriptor: &EntityDescriptor,
    template: &E,
) -> Result<Vec<(&'static ColumnDescriptor, Slot)>> {
    let slots = template.slots();

    if slots.len() != descriptor.columns().len() {
        return Err(Error::invalid_entity(
            descriptor.entity(),
            format!(
                "{} field values for {} columns",
                slots.len(),
                descriptor.columns().len()
            ),
        ));
    }

    Ok(descriptor
        .columns()
        .iter()
        .zip(slots)
        .map(|(column, slot)| match slot {
            Slot::Present(Value::Null) => (column, Slot::Null),
            other => (column, other),
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod test {
    use sqlx::any::AnyRow;

    use super::{PushToQuery, Statement, conjunction, equals, is_null, template_slots};
    use crate::{
        Error, Result,
        entity::{
            ColumnDescriptor, Entity,
            value::{FieldValue, Slot, Value},
        },
    };

    /// Hand-written entity shaped like an event record.
    #[derive(Default, Debug, Clone, PartialEq)]
    pub(crate) struct Meeting {
        pub(crate) id: Option<String>,
        pub(crate) title: Option<String>,
        pub(crate) start: Option<i64>,
        pub(crate) room: Option<Option<String>>,
    }

    impl Entity for Meeting {
        const TABLE_NAME: &'static str = "meetings";
        const COLUMNS: &'static [ColumnDescriptor] = &[
            ColumnDescriptor::primary_key("id", "meeting_id"),
            ColumnDescriptor::new("title", "title"),
            ColumnDescriptor::new("start", "start_time"),
            ColumnDescriptor::new("room", "room"),
        ];

        fn slots(&self) -> Vec<Slot> {
            vec![
                self.id.to_slot(),
                self.title.to_slot(),
                self.start.to_slot(),
                self.room.to_slot(),
            ]
        }

        fn assign(&mut self, index: usize, row: &AnyRow, column: &ColumnDescriptor) -> Result<()> {
            match index {
                0 => self.id = FieldValue::read(row, column)?,
                1 => self.title = FieldValue::read(row, column)?,
                2 => self.start = FieldValue::read(row, column)?,
                3 => self.room = FieldValue::read(row, column)?,
                _ => return Err(crate::entity::unknown_column::<Self>(index)),
            }
            Ok(())
        }
    }

    /// Keyless entity, only usable for selects and inserts.
    #[derive(Default)]
    pub(crate) struct Tally {
        pub(crate) count: Option<i32>,
    }

    impl Entity for Tally {
        const TABLE_NAME: &'static str = "tallies";
        const COLUMNS: &'static [ColumnDescriptor] = &[ColumnDescriptor::new("count", "count")];

        fn slots(&self) -> Vec<Slot> {
            vec![self.count.to_slot()]
        }

        fn assign(&mut self, index: usize, row: &AnyRow, column: &ColumnDescriptor) -> Result<()> {
            match index {
                0 => self.count = FieldValue::read(row, column)?,
                _ => return Err(crate::entity::unknown_column::<Self>(index)),
            }
            Ok(())
        }
    }

    /// Hand-written entity with raw slots, as a manual implementation may produce them.
    #[derive(Default)]
    pub(crate) struct Raw {
        pub(crate) slots: Vec<Slot>,
    }

    impl Entity for Raw {
        const TABLE_NAME: &'static str = "raw";
        const COLUMNS: &'static [ColumnDescriptor] = &[
            ColumnDescriptor::primary_key("id", "id"),
            ColumnDescriptor::new("note", "note"),
        ];

        fn slots(&self) -> Vec<Slot> {
            self.slots.clone()
        }

        fn assign(&mut self, index: usize, _: &AnyRow, _: &ColumnDescriptor) -> Result<()> {
            Err(crate::entity::unknown_column::<Self>(index))
        }
    }

    /// Entity keyed by two columns.
    #[derive(Default)]
    pub(crate) struct Booking {
        pub(crate) room: Option<String>,
        pub(crate) day: Option<i64>,
        pub(crate) guest: Option<String>,
    }

    impl Entity for Booking {
        const TABLE_NAME: &'static str = "bookings";
        const COLUMNS: &'static [ColumnDescriptor] = &[
            ColumnDescriptor::primary_key("room", "room"),
            ColumnDescriptor::primary_key("day", "day"),
            ColumnDescriptor::new("guest", "guest"),
        ];

        fn slots(&self) -> Vec<Slot> {
            vec![self.room.to_slot(), self.day.to_slot(), self.guest.to_slot()]
        }

        fn assign(&mut self, index: usize, row: &AnyRow, column: &ColumnDescriptor) -> Result<()> {
            match index {
                0 => self.room = FieldValue::read(row, column)?,
                1 => self.day = FieldValue::read(row, column)?,
                2 => self.guest = FieldValue::read(row, column)?,
                _ => return Err(crate::entity::unknown_column::<Self>(index)),
            }
            Ok(())
        }
    }

    #[test]
    fn test_template_slots_normalize_bound_null() {
        let descriptor = Raw::describe().expect("valid declaration");
        let template = Raw {
            slots: vec![
                Slot::Present(Value::from("r1")),
                Slot::Present(Value::from(None::<String>)),
            ],
        };

        let slots = template_slots(&descriptor, &template).expect("slot count matches");

        assert_eq!(slots[0].1, Slot::Present(Value::from("r1")));
        assert_eq!(slots[1].1, Slot::Null);
    }

    #[test]
    fn test_template_slots_count_mismatch() {
        let descriptor = Raw::describe().expect("valid declaration");
        let template = Raw {
            slots: vec![Slot::Present(Value::from("r1"))],
        };

        assert!(matches!(
            template_slots(&descriptor, &template),
            Err(Error::InvalidEntityDeclaration { reason, .. })
                if reason == "1 field values for 2 columns"
        ));
    }

    #[test]
    fn test_statement_binds_values() {
        let mut statement = Statement::new("SELECT * FROM meetings WHERE ");
        statement.push("title = ").push_bind(Value::from("x'; --"));

        assert_eq!(statement.sql(), "SELECT * FROM meetings WHERE title = ?");
        assert_eq!(statement.params(), [Value::from("x'; --")]);
    }

    #[test]
    fn test_conjunction() {
        let title = &Meeting::COLUMNS[1];
        let room = &Meeting::COLUMNS[3];

        assert!(conjunction(vec![]).is_none());

        let mut statement = Statement::default();
        conjunction(vec![equals(title, &Value::from("a")), is_null(room)])
            .expect("two conditions")
            .push_to(&mut statement);

        assert_eq!(statement.sql(), "title = ? AND room IS NULL");
        assert_eq!(statement.params(), [Value::from("a")]);
    }
}
