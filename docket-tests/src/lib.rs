#![allow(clippy::expect_used)]

use docket::{
    DataMapper, Entity,
    sqlx::{AnyConnection, Connection, Executor},
};
use tempfile::TempDir;

pub mod readings {
    use docket::Entity;

    pub const SCHEMA: &str = "CREATE TABLE readings (
      id INTEGER NOT NULL PRIMARY KEY,
      label TEXT,
      value REAL,
      note TEXT
    )";

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[docket(table = "readings")]
    pub struct Reading {
        #[docket(primary_key)]
        pub id: Option<i64>,
        pub label: Option<String>,
        pub value: Option<f64>,
        pub note: Option<Option<String>>,
    }

    pub const GAUGES: &str = "CREATE TABLE gauges (
      id INTEGER NOT NULL PRIMARY KEY,
      small INTEGER,
      level REAL
    )";

    /// Narrow numeric fields, stored in wider columns.
    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    #[docket(table = "gauges")]
    pub struct Gauge {
        #[docket(primary_key)]
        pub id: Option<i64>,
        pub small: Option<i16>,
        pub level: Option<f32>,
    }

    /// Declares `label` as a number while the table stores text.
    #[derive(Entity, Default, Debug)]
    #[docket(table = "readings")]
    pub struct MislabeledReading {
        #[docket(primary_key)]
        pub id: Option<i64>,
        #[docket(column = "label")]
        pub label_number: Option<i64>,
    }

    /// Declares a column the table does not have.
    #[derive(Entity, Default, Debug)]
    #[docket(table = "readings")]
    pub struct ReadingWithUnit {
        #[docket(primary_key)]
        pub id: Option<i64>,
        pub unit: Option<String>,
    }
}

/// A file backed SQLite database living in a temporary directory. Each mapper call opens its
/// own connection, so an in-memory database would be empty for every one of them.
pub struct TestDatabase {
    _dir: TempDir,
    url: String,
}

impl TestDatabase {
    /// Create an empty database and run every `;` separated statement of `schemas` on it.
    pub async fn new(schemas: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("docket.db").display());

        let this = Self { _dir: dir, url };

        // installs the sqlx drivers
        let _ = this.mapper();

        for statement in schemas
            .iter()
            .flat_map(|e| e.split(';'))
            .filter(|e| !e.trim().is_empty())
        {
            this.execute(statement).await;
        }

        this
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn mapper(&self) -> DataMapper {
        DataMapper::new(self.url.clone())
    }

    /// Run raw SQL, bypassing the mapper.
    pub async fn execute(&self, sql: &str) {
        let mut connection = AnyConnection::connect(&self.url)
            .await
            .expect("Failed to connect to test database");

        connection
            .execute(sql)
            .await
            .expect("Failed to execute raw SQL");

        connection
            .close()
            .await
            .expect("Failed to close test database connection");
    }

    /// Count the rows of `E`'s table, bypassing the mapper.
    pub async fn count<E: Entity>(&self) -> i64 {
        use docket::sqlx::Row;

        let mut connection = AnyConnection::connect(&self.url)
            .await
            .expect("Failed to connect to test database");

        let row = connection
            .fetch_one(format!("SELECT COUNT(*) AS total FROM {}", E::TABLE_NAME).as_str())
            .await
            .expect("Failed to count rows");

        row.try_get("total").expect("Failed to read row count")
    }
}
