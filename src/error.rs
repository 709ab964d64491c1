use thiserror::Error;

/// Result type alias used throughout docket.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while describing, building, executing or materializing.
#[derive(Error, Debug)]
pub enum Error {
    /// The entity's static declaration is unusable (missing table, bad identifiers, duplicate
    /// columns, no primary key for an operation that needs one, ...).
    #[error("invalid entity declaration for `{entity}`: {reason}")]
    InvalidEntityDeclaration { entity: String, reason: String },

    /// An insert template left a field absent.
    #[error("field `{field}` must be set to insert a row")]
    MissingRequiredField { field: &'static str },

    /// An update or delete template left a primary key field absent.
    #[error("primary key field `{field}` has no value")]
    NoPrimaryKeyValue { field: &'static str },

    /// An update template carried nothing but its primary key.
    #[error("no fields to update in table `{table}`")]
    NoFieldsToUpdate { table: &'static str },

    /// A template tried to write an explicit NULL, which the mapper does not allow.
    #[error("field `{field}` is explicitly null, which cannot be written")]
    NullNotWritable { field: &'static str },

    /// A row value could not be converted into the declared field type.
    #[error("failed to convert column value into field `{field}`: {source}")]
    TypeConversion {
        field: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// A column declared by the entity is missing from the result row.
    #[error("column `{column}` is missing from the result row")]
    MissingColumn { column: String },

    /// The store could not be reached, or the connection broke down.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] sqlx::Error),

    /// The store rejected or failed the statement.
    #[error("statement execution failed: {0}")]
    Execution(#[source] sqlx::Error),
}

impl Error {
    pub(crate) fn invalid_entity(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEntityDeclaration {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from the caller's template rather than the store or declaration.
    #[must_use]
    pub const fn is_template_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField { .. }
                | Self::NoPrimaryKeyValue { .. }
                | Self::NoFieldsToUpdate { .. }
                | Self::NullNotWritable { .. }
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(_)
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::StorageUnavailable(value),
            sqlx::Error::ColumnNotFound(column) => Self::MissingColumn { column },
            other => Self::Execution(other),
        }
    }
}
