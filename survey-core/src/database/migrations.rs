use refinery::embed_migrations;

// Embed migrations from the migrations directory
embed_migrations!("src/database/migrations");

/// Run the survey schema migrations on a database connection
///
/// Creates the catalog tables (`questions`, `options`), the response tables
/// (`respondents`, `answers`) and the aggregate `results` table. Already
/// applied migrations are skipped, so this is safe to call on every open.
///
/// # Example
/// ```no_run
/// use rusqlite::Connection;
/// use survey_core::database::migrations::run_survey_migrations;
///
/// let mut conn = Connection::open("survey.db")?;
/// run_survey_migrations(&mut conn)?;
/// # Ok::<(), survey_core::SurveyError>(())
/// ```
pub fn run_survey_migrations<C>(conn: &mut C) -> crate::Result<()>
where
    C: refinery::Migrate,
{
    let report = migrations::runner().run(conn)?;
    for migration in report.applied_migrations() {
        tracing::debug!("Applied migration {}", migration);
    }
    Ok(())
}

/// Check if the survey tables exist in a database
pub fn has_survey_schema(conn: &rusqlite::Connection) -> crate::Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='questions'")?;
    Ok(stmt.exists([])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_survey_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert!(!has_survey_schema(&conn).unwrap());
        run_survey_migrations(&mut conn).expect("Migrations should succeed");
        assert!(has_survey_schema(&conn).unwrap());

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for table in ["questions", "options", "respondents", "answers", "results"] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
        assert!(tables.contains(&"refinery_schema_history".to_string()));
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();

        run_survey_migrations(&mut conn).expect("First migration should succeed");
        run_survey_migrations(&mut conn).expect("Second migration should succeed");

        let migration_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                row.get(0)
            })
            .unwrap();

        assert_eq!(migration_count, 5);
    }

    #[test]
    fn test_blank_question_text_rejected_by_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_survey_migrations(&mut conn).unwrap();

        let result = conn.execute(
            "INSERT INTO questions (id, text, order_index, created_at) VALUES ('q1', '  ', 0, 0)",
            [],
        );
        assert!(result.is_err());
    }
}
