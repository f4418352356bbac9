use super::responses::fetch_respondent;
use super::{new_id, Database};
use crate::error::Result;
use crate::models::ScoreResult;
use crate::scoring::ResultPolicy;
use rusqlite::{params, Connection, Row};

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<ScoreResult> {
    Ok(ScoreResult {
        id: row.get(0)?,
        respondent_id: row.get(1)?,
        average_score: row.get(2)?,
        answer_count: row.get(3)?,
        evaluated_at: row.get(4)?,
    })
}

/// Aggregated result persistence
impl Database {
    /// The newest result of every respondent that has one, in respondent creation order.
    pub fn latest_results(&self) -> Result<Vec<ScoreResult>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.respondent_id, r.average_score, r.answer_count, r.evaluated_at
                FROM results r
                JOIN respondents p ON p.id = r.respondent_id
                WHERE r.rowid = (
                    SELECT latest.rowid FROM results latest
                    WHERE latest.respondent_id = r.respondent_id
                    ORDER BY latest.evaluated_at DESC, latest.rowid DESC
                    LIMIT 1
                )
                ORDER BY p.created_at ASC, p.rowid ASC",
        )?;
        let results = stmt.query_map([], result_from_row)?;

        let mut latest = Vec::new();
        for result in results {
            latest.push(result?);
        }

        Ok(latest)
    }

    /// Every stored result of one respondent, oldest first.
    pub fn result_history(&self, respondent_id: &str) -> Result<Vec<ScoreResult>> {
        let conn = self.conn()?;
        fetch_respondent(&conn, respondent_id)?;

        let mut stmt = conn.prepare(
            "SELECT id, respondent_id, average_score, answer_count, evaluated_at
                FROM results
                WHERE respondent_id = ?1
                ORDER BY evaluated_at ASC, rowid ASC",
        )?;
        let results = stmt.query_map([respondent_id], result_from_row)?;

        let mut history = Vec::new();
        for result in results {
            history.push(result?);
        }

        Ok(history)
    }

    pub fn count_results(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Scores of the options each respondent selected, one per answer.
/// Respondents without answers are included with an empty list; an answer
/// whose option has been deleted still counts, with a score of zero.
pub(crate) fn selected_scores(conn: &Connection) -> Result<Vec<(String, Vec<i64>)>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, CASE WHEN a.id IS NULL THEN NULL ELSE COALESCE(o.score, 0) END
            FROM respondents p
            LEFT JOIN answers a ON a.respondent_id = p.id
            LEFT JOIN options o ON o.id = a.option_id
            ORDER BY p.created_at ASC, p.rowid ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
    })?;

    let mut grouped: Vec<(String, Vec<i64>)> = Vec::new();
    for row in rows {
        let (respondent_id, score) = row?;
        match grouped.last_mut() {
            Some((current, scores)) if *current == respondent_id => scores.extend(score),
            _ => grouped.push((respondent_id, score.into_iter().collect())),
        }
    }

    Ok(grouped)
}

pub(crate) fn store_result(
    conn: &Connection,
    policy: ResultPolicy,
    respondent_id: &str,
    average_score: i64,
    answer_count: i64,
    evaluated_at: i64,
) -> Result<ScoreResult> {
    if policy == ResultPolicy::Upsert {
        conn.execute("DELETE FROM results WHERE respondent_id = ?1", [respondent_id])?;
    }

    let id = new_id();
    conn.execute(
        "INSERT INTO results (id, respondent_id, average_score, answer_count, evaluated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, respondent_id, average_score, answer_count, evaluated_at],
    )?;

    Ok(ScoreResult {
        id,
        respondent_id: respondent_id.to_string(),
        average_score,
        answer_count,
        evaluated_at,
    })
}
