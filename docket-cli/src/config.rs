use std::path::{Path, PathBuf};

use dotenvy::dotenv;

/// Name of the secret file holding the connection string.
pub const DATABASE_URL_SECRET: &str = "docket_database_url";

/// Where secret files are mounted unless `DOCKET_SECRETS_DIR` says otherwise.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

pub enum DbType {
    MySql,
    Sqlite,
}

impl DbType {
    /// Determine the store from a connection string. Only stores using `?` placeholders are
    /// recognized.
    #[must_use]
    pub fn from_connection_string(input: &str) -> Option<Self> {
        let lower = input.to_lowercase();

        if lower.starts_with("sqlite") {
            Some(Self::Sqlite)
        } else if lower.starts_with("mysql") || lower.starts_with("mariadb") {
            Some(Self::MySql)
        } else {
            None
        }
    }
}

/// Attempt to retrieve the database URL from the `DATABASE_URL` environment variable, or from a
/// corresponding `.env` file.
#[must_use]
pub fn get_database_url() -> Option<String> {
    let _ = dotenv();

    std::env::var("DATABASE_URL")
        .ok()
        .filter(|e| !e.is_empty())
}

#[must_use]
pub fn secrets_dir() -> PathBuf {
    std::env::var_os("DOCKET_SECRETS_DIR")
        .map_or_else(|| PathBuf::from(DEFAULT_SECRETS_DIR), PathBuf::from)
}

/// Read the secret `name` from `dir`, without trailing whitespace. Missing, unreadable or empty
/// secrets yield `None`.
#[must_use]
pub fn read_secret(dir: &Path, name: &str) -> Option<String> {
    std::fs::read_to_string(dir.join(name))
        .ok()
        .map(|e| e.trim_end().to_owned())
        .filter(|e| !e.is_empty())
}

/// Resolve the connection string: an explicit value wins, then `DATABASE_URL` (or `.env`), then
/// the mounted secret.
#[must_use]
pub fn resolve_database_url(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|e| !e.is_empty())
        .or_else(get_database_url)
        .or_else(|| read_secret(&secrets_dir(), DATABASE_URL_SECRET))
}

#[cfg(test)]
mod test {
    use super::{DATABASE_URL_SECRET, DbType, read_secret, resolve_database_url};

    #[test]
    fn test_db_type() {
        assert!(matches!(
            DbType::from_connection_string("mysql://root@localhost/calendar"),
            Some(DbType::MySql)
        ));
        assert!(matches!(
            DbType::from_connection_string("SQLITE://calendar.db"),
            Some(DbType::Sqlite)
        ));
        assert!(DbType::from_connection_string("postgres://localhost/calendar").is_none());
    }

    #[test]
    fn test_read_secret() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(
            dir.path().join(DATABASE_URL_SECRET),
            "mysql://svc:hunter2@db/calendar\n",
        )
        .expect("Failed to write secret");

        assert_eq!(
            read_secret(dir.path(), DATABASE_URL_SECRET).as_deref(),
            Some("mysql://svc:hunter2@db/calendar")
        );
        assert!(read_secret(dir.path(), "missing").is_none());

        std::fs::write(dir.path().join("blank"), "  \n").expect("Failed to write secret");
        assert!(read_secret(dir.path(), "blank").is_none());
    }

    #[test]
    fn test_explicit_url_wins() {
        assert_eq!(
            resolve_database_url(Some("sqlite://explicit.db".to_owned())).as_deref(),
            Some("sqlite://explicit.db")
        );
    }
}
