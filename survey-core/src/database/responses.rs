use super::catalog::{fetch_option, fetch_question};
use super::{new_id, now, Database};
use crate::error::{Result, SurveyError};
use crate::models::{Answer, AnswerDetail, NewRespondent, Respondent};
use rusqlite::{params, Connection, OptionalExtension, Row};

const RESPONDENT_COLUMNS: &str = "id, name, age, affiliation, created_at";

fn respondent_from_row(row: &Row<'_>) -> rusqlite::Result<Respondent> {
    Ok(Respondent {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        affiliation: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn answer_from_row(row: &Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: row.get(0)?,
        respondent_id: row.get(1)?,
        question_id: row.get(2)?,
        option_id: row.get(3)?,
        answered_at: row.get(4)?,
    })
}

/// Respondent and answer operations
impl Database {
    pub fn create_respondent(&self, new_respondent: NewRespondent) -> Result<Respondent> {
        new_respondent.validate()?;
        let conn = self.conn()?;
        let id = new_id();

        conn.execute(
            "INSERT INTO respondents (id, name, age, affiliation, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                new_respondent.name.as_deref().map(str::trim),
                new_respondent.age,
                new_respondent.affiliation,
                now()
            ],
        )?;

        tracing::info!("Created respondent {}", id);
        fetch_respondent(&conn, &id)
    }

    pub fn get_respondent(&self, respondent_id: &str) -> Result<Respondent> {
        let conn = self.conn()?;
        fetch_respondent(&conn, respondent_id)
    }

    /// Respondents in creation order.
    pub fn list_respondents(&self) -> Result<Vec<Respondent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESPONDENT_COLUMNS} FROM respondents ORDER BY created_at ASC, rowid ASC"
        ))?;
        let respondents = stmt.query_map([], respondent_from_row)?;

        let mut result = Vec::new();
        for respondent in respondents {
            result.push(respondent?);
        }

        Ok(result)
    }

    /// Delete a respondent with all of their answers and results.
    pub fn delete_respondent(&self, respondent_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM respondents WHERE id = ?1", [respondent_id])?;
        if removed == 0 {
            return Err(SurveyError::not_found("respondent", respondent_id));
        }

        tracing::info!("Deleted respondent {}", respondent_id);
        Ok(())
    }

    /// Record the option a respondent chose for a question. Answering the same
    /// question again replaces the earlier selection.
    pub fn record_answer(
        &self,
        respondent_id: &str,
        question_id: &str,
        option_id: &str,
    ) -> Result<Answer> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        fetch_respondent(&tx, respondent_id)?;
        fetch_question(&tx, question_id)?;
        let option = fetch_option(&tx, option_id)?;
        if option.question_id != question_id {
            return Err(SurveyError::ConstraintViolation(format!(
                "option {option_id} does not belong to question {question_id}"
            )));
        }

        tx.execute(
            "INSERT INTO answers (id, respondent_id, question_id, option_id, answered_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT (respondent_id, question_id)
                DO UPDATE SET option_id = excluded.option_id, answered_at = excluded.answered_at",
            params![new_id(), respondent_id, question_id, option_id, now()],
        )?;

        let answer = tx.query_row(
            "SELECT id, respondent_id, question_id, option_id, answered_at
                FROM answers
                WHERE respondent_id = ?1 AND question_id = ?2",
            [respondent_id, question_id],
            answer_from_row,
        )?;
        tx.commit()?;

        tracing::info!(
            "Recorded answer {} (respondent {}, question {}, option {})",
            answer.id,
            respondent_id,
            question_id,
            option_id
        );
        Ok(answer)
    }

    pub fn get_answer(&self, respondent_id: &str, question_id: &str) -> Result<Option<Answer>> {
        let conn = self.conn()?;
        let answer = conn
            .query_row(
                "SELECT id, respondent_id, question_id, option_id, answered_at
                    FROM answers
                    WHERE respondent_id = ?1 AND question_id = ?2",
                [respondent_id, question_id],
                answer_from_row,
            )
            .optional()?;
        Ok(answer)
    }

    /// A respondent's answers joined with question and option text, in
    /// question ordering-index order. Answers whose option was deleted carry
    /// no option text or score.
    pub fn answers_for_respondent(&self, respondent_id: &str) -> Result<Vec<AnswerDetail>> {
        let conn = self.conn()?;
        fetch_respondent(&conn, respondent_id)?;

        let mut stmt = conn.prepare(
            "SELECT a.id, q.id, q.text, q.order_index, o.id, o.text, o.score, a.answered_at
                FROM answers a
                JOIN questions q ON q.id = a.question_id
                LEFT JOIN options o ON o.id = a.option_id
                WHERE a.respondent_id = ?1
                ORDER BY q.order_index ASC",
        )?;

        let answers = stmt.query_map([respondent_id], |row| {
            Ok(AnswerDetail {
                answer_id: row.get(0)?,
                question_id: row.get(1)?,
                question_text: row.get(2)?,
                question_order: row.get(3)?,
                option_id: row.get(4)?,
                option_text: row.get(5)?,
                score: row.get(6)?,
                answered_at: row.get(7)?,
            })
        })?;

        let mut result = Vec::new();
        for answer in answers {
            result.push(answer?);
        }

        Ok(result)
    }

    /// Number of answers referencing the given question.
    pub fn count_answers_for_question(&self, question_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM answers WHERE question_id = ?1",
            [question_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

pub(crate) fn fetch_respondent(conn: &Connection, respondent_id: &str) -> Result<Respondent> {
    conn.query_row(
        &format!("SELECT {RESPONDENT_COLUMNS} FROM respondents WHERE id = ?1"),
        [respondent_id],
        respondent_from_row,
    )
    .optional()?
    .ok_or_else(|| SurveyError::not_found("respondent", respondent_id))
}
