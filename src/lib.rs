pub mod entity;
pub mod error;
pub mod mapper;
pub mod query;

/// Derive macro to implement [`Entity`](entity::Entity).
pub use docket_macros::Entity;
pub use entity::{
    ColumnDescriptor, Entity,
    descriptor::{EntityDescriptor, describe},
    value::{FieldValue, Slot, Value},
};
pub use error::{Error, Result};
pub use mapper::DataMapper;

pub use sqlx;
