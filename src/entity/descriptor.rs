use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use itertools::Itertools;
use tracing::debug;

use super::{ColumnDescriptor, Entity};
use crate::error::{Error, Result};

/// Validated metadata of an entity type: its table and its ordered column mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    entity: &'static str,
    table_name: &'static str,
    columns: &'static [ColumnDescriptor],
}

impl EntityDescriptor {
    /// Validate a static declaration and turn it into a descriptor.
    ///
    /// # Errors
    ///
    /// With [`Error::InvalidEntityDeclaration`] if the table name is empty or not a plain
    /// identifier, if there are no columns, or if any column name is empty, not a plain identifier
    /// or declared twice.
    pub fn new(
        entity: &'static str,
        table_name: &'static str,
        columns: &'static [ColumnDescriptor],
    ) -> Result<Self> {
        if table_name.is_empty() {
            return Err(Error::invalid_entity(entity, "missing table name"));
        }

        if !is_identifier(table_name) {
            return Err(Error::invalid_entity(
                entity,
                format!("table name \"{table_name}\" is not a plain identifier"),
            ));
        }

        if columns.is_empty() {
            return Err(Error::invalid_entity(entity, "no columns declared"));
        }

        if let Some(column) = columns.iter().find(|e| e.column_name.is_empty()) {
            return Err(Error::invalid_entity(
                entity,
                format!("field `{}` has no column name", column.field_name),
            ));
        }

        if let Some(column) = columns.iter().find(|e| !is_identifier(e.column_name)) {
            return Err(Error::invalid_entity(
                entity,
                format!(
                    "column name \"{}\" of field `{}` is not a plain identifier",
                    column.column_name, column.field_name
                ),
            ));
        }

        if let Some(duplicate) = columns.iter().map(|e| e.column_name).duplicates().next() {
            return Err(Error::invalid_entity(
                entity,
                format!("duplicate column definition \"{duplicate}\""),
            ));
        }

        Ok(Self {
            entity,
            table_name,
            columns,
        })
    }

    /// The rust type name this descriptor was derived from.
    #[must_use]
    pub const fn entity(&self) -> &'static str {
        self.entity
    }

    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        self.table_name
    }

    #[must_use]
    pub const fn columns(&self) -> &'static [ColumnDescriptor] {
        self.columns
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &'static ColumnDescriptor> {
        self.columns.iter().filter(|e| e.is_primary_key)
    }

    pub fn non_keys(&self) -> impl Iterator<Item = &'static ColumnDescriptor> {
        self.columns.iter().filter(|e| !e.is_primary_key)
    }

    /// Look up a column by its field name.
    #[must_use]
    pub fn column(&self, field_name: &str) -> Option<&'static ColumnDescriptor> {
        self.columns.iter().find(|e| e.field_name == field_name)
    }

    /// Fail unless at least one column is a primary key.
    ///
    /// # Errors
    ///
    /// With [`Error::InvalidEntityDeclaration`] if no column is marked as primary key.
    pub fn require_primary_key(&self) -> Result<()> {
        if self.primary_keys().next().is_none() {
            return Err(Error::invalid_entity(
                self.entity,
                "no primary key column declared",
            ));
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    chars
        .next()
        .is_some_and(|e| e.is_ascii_alphabetic() || e == '_')
        && chars.all(|e| e.is_ascii_alphanumeric() || e == '_')
}

type Registry = RwLock<HashMap<TypeId, Arc<EntityDescriptor>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Derive the descriptor of `E`, validating its declaration on first use.
///
/// Valid descriptors are cached for the lifetime of the process; invalid declarations are
/// re-checked (and fail again) on every call.
///
/// # Errors
///
/// With [`Error::InvalidEntityDeclaration`], see [`EntityDescriptor::new`].
pub fn describe<E: Entity>() -> Result<Arc<EntityDescriptor>> {
    let id = TypeId::of::<E>();

    {
        let cache = registry().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(descriptor) = cache.get(&id) {
            return Ok(descriptor.clone());
        }
    }

    let descriptor = Arc::new(EntityDescriptor::new(
        type_name::<E>(),
        E::TABLE_NAME,
        E::COLUMNS,
    )?);

    debug!(
        "Registered entity {} ({} columns) for table {}",
        descriptor.entity(),
        descriptor.columns().len(),
        descriptor.table_name()
    );

    let mut cache = registry().write().unwrap_or_else(PoisonError::into_inner);
    Ok(cache.entry(id).or_insert(descriptor).clone())
}
