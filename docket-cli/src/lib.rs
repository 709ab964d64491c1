pub mod calendar;
pub mod config;
pub mod models;
pub mod timestamp;

/// Statements creating the tables the calendar expects.
pub const SCHEMA: &str = include_str!("../schema.sql");
