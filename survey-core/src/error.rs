use crate::media::MediaError;

pub type Result<T> = std::result::Result<T, SurveyError>;

#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl SurveyError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        SurveyError::NotFound(format!("{entity} {id}"))
    }
}

impl From<rusqlite::Error> for SurveyError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                SurveyError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            _ => SurveyError::Database(err),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for SurveyError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        SurveyError::Lock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_failures_map_to_constraint_violation() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)", [])
            .unwrap();
        conn.execute("INSERT INTO t (name) VALUES ('a')", []).unwrap();

        let err: SurveyError = conn
            .execute("INSERT INTO t (name) VALUES ('a')", [])
            .unwrap_err()
            .into();

        assert!(matches!(err, SurveyError::ConstraintViolation(_)));
    }

    #[test]
    fn test_other_sqlite_errors_stay_database_errors() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: SurveyError = conn
            .execute("SELECT * FROM missing_table", [])
            .unwrap_err()
            .into();

        assert!(matches!(err, SurveyError::Database(_)));
    }
}
