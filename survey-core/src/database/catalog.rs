use super::{new_id, now, Database};
use crate::error::{Result, SurveyError};
use crate::media::{validate_blob, MediaKind, MediaOwner, Recording};
use crate::models::{
    AnswerOption, NewOption, NewQuestion, OptionUpdate, Question, QuestionUpdate,
    QuestionWithOptions,
};
use crate::ordering;
use rusqlite::{params, Connection, OptionalExtension, Row};

const QUESTION_COLUMNS: &str =
    "id, text, image_data, audio_data, order_index, created_at, updated_at";
const OPTION_COLUMNS: &str =
    "id, question_id, text, score, image_data, audio_data, order_index, created_at, updated_at";

fn question_from_row(row: &Row<'_>) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        text: row.get(1)?,
        image_data: row.get(2)?,
        audio_data: row.get(3)?,
        order_index: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn option_from_row(row: &Row<'_>) -> rusqlite::Result<AnswerOption> {
    Ok(AnswerOption {
        id: row.get(0)?,
        question_id: row.get(1)?,
        text: row.get(2)?,
        score: row.get(3)?,
        image_data: row.get(4)?,
        audio_data: row.get(5)?,
        order_index: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// A group of rows sharing one ordering sequence.
enum Siblings<'a> {
    Questions,
    Options { question_id: &'a str },
}

impl Siblings<'_> {
    fn table(&self) -> &'static str {
        match self {
            Siblings::Questions => "questions",
            Siblings::Options { .. } => "options",
        }
    }

    fn load(&self, conn: &Connection) -> Result<Vec<String>> {
        let ids = match self {
            Siblings::Questions => {
                let mut stmt =
                    conn.prepare("SELECT id FROM questions ORDER BY order_index ASC, rowid ASC")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<Vec<String>>>()?
            }
            Siblings::Options { question_id } => {
                let mut stmt = conn.prepare(
                    "SELECT id FROM options WHERE question_id = ?1
                        ORDER BY order_index ASC, rowid ASC",
                )?;
                let rows = stmt.query_map([*question_id], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<Vec<String>>>()?
            }
        };
        Ok(ids)
    }

    /// Assign every id its rank. Existing indices are first shifted above the
    /// current maximum so the unique order index never collides mid-pass.
    fn store(&self, conn: &Connection, ids: &[String]) -> Result<()> {
        let table = self.table();
        let offset = self.next_index(conn)?;
        match self {
            Siblings::Questions => {
                conn.execute(
                    "UPDATE questions SET order_index = order_index + ?1",
                    [offset],
                )?;
            }
            Siblings::Options { question_id } => {
                conn.execute(
                    "UPDATE options SET order_index = order_index + ?1 WHERE question_id = ?2",
                    params![offset, question_id],
                )?;
            }
        }

        let sql = format!("UPDATE {table} SET order_index = ?1 WHERE id = ?2");
        let mut stmt = conn.prepare(&sql)?;
        for (rank, id) in ordering::ranked(ids) {
            stmt.execute(params![rank, id])?;
        }

        tracing::debug!("Re-indexed {} {}", ids.len(), table);
        Ok(())
    }

    fn reindex(&self, conn: &Connection) -> Result<()> {
        let ids = self.load(conn)?;
        self.store(conn, &ids)
    }

    fn next_index(&self, conn: &Connection) -> Result<i64> {
        let next = match self {
            Siblings::Questions => conn.query_row(
                "SELECT COALESCE(MAX(order_index), -1) + 1 FROM questions",
                [],
                |row| row.get(0),
            )?,
            Siblings::Options { question_id } => conn.query_row(
                "SELECT COALESCE(MAX(order_index), -1) + 1 FROM options WHERE question_id = ?1",
                [*question_id],
                |row| row.get(0),
            )?,
        };
        Ok(next)
    }

    /// Move `id` to position `to` and re-index all siblings. Returns the final position.
    fn move_to(&self, conn: &Connection, id: &str, to: usize) -> Result<usize> {
        let mut ids = self.load(conn)?;
        let from = ids
            .iter()
            .position(|candidate| candidate == id)
            .ok_or_else(|| SurveyError::not_found(self.table(), id))?;
        let position = ordering::move_item(&mut ids, from, to)
            .ok_or_else(|| SurveyError::not_found(self.table(), id))?;
        self.store(conn, &ids)?;
        Ok(position)
    }
}

/// Survey catalog operations: questions, their options, ordering and media
impl Database {
    pub fn add_question(&self, new_question: NewQuestion) -> Result<Question> {
        new_question.validate()?;
        self.check_media(MediaKind::Image, new_question.image_data.as_deref())?;
        self.check_media(MediaKind::Audio, new_question.audio_data.as_deref())?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = new_id();
        let created_at = now();
        let order_index = Siblings::Questions.next_index(&tx)?;

        tx.execute(
            "INSERT INTO questions (id, text, image_data, audio_data, order_index, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                new_question.text.trim(),
                new_question.image_data,
                new_question.audio_data,
                order_index,
                created_at
            ],
        )?;
        let question = fetch_question(&tx, &id)?;
        tx.commit()?;

        tracing::info!("Added question {} at position {}", question.id, order_index);
        Ok(question)
    }

    pub fn get_question(&self, question_id: &str) -> Result<Question> {
        let conn = self.conn()?;
        fetch_question(&conn, question_id)
    }

    /// All questions in ordering-index order.
    pub fn list_questions(&self) -> Result<Vec<Question>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY order_index ASC"
        ))?;
        let questions = stmt.query_map([], question_from_row)?;

        let mut result = Vec::new();
        for question in questions {
            result.push(question?);
        }

        Ok(result)
    }

    pub fn update_question(&self, question_id: &str, update: QuestionUpdate) -> Result<Question> {
        update.validate()?;
        let conn = self.conn()?;

        if let Some(text) = &update.text {
            let changed = conn.execute(
                "UPDATE questions SET text = ?1, updated_at = ?2 WHERE id = ?3",
                params![text.trim(), now(), question_id],
            )?;
            if changed == 0 {
                return Err(SurveyError::not_found("question", question_id));
            }
            tracing::info!("Updated question {}", question_id);
        }

        fetch_question(&conn, question_id)
    }

    /// Delete a question together with its options and every answer that refers to it.
    pub fn delete_question(&self, question_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM questions WHERE id = ?1", [question_id])?;
        if removed == 0 {
            return Err(SurveyError::not_found("question", question_id));
        }
        Siblings::Questions.reindex(&tx)?;
        tx.commit()?;

        tracing::info!("Deleted question {}", question_id);
        Ok(())
    }

    /// Move a question to position `to` (0-based, clamped). Returns the final position.
    pub fn move_question(&self, question_id: &str, to: usize) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let position = Siblings::Questions.move_to(&tx, question_id, to)?;
        tx.commit()?;

        tracing::info!("Moved question {} to position {}", question_id, position);
        Ok(position)
    }

    pub fn add_option(&self, question_id: &str, new_option: NewOption) -> Result<AnswerOption> {
        new_option.validate()?;
        self.check_media(MediaKind::Image, new_option.image_data.as_deref())?;
        self.check_media(MediaKind::Audio, new_option.audio_data.as_deref())?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        fetch_question(&tx, question_id)?;

        let id = new_id();
        let siblings = Siblings::Options { question_id };
        let order_index = siblings.next_index(&tx)?;

        tx.execute(
            "INSERT INTO options (id, question_id, text, score, image_data, audio_data, order_index, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                question_id,
                new_option.text.trim(),
                new_option.score,
                new_option.image_data,
                new_option.audio_data,
                order_index,
                now()
            ],
        )?;
        let option = fetch_option(&tx, &id)?;
        tx.commit()?;

        tracing::info!(
            "Added option {} to question {} (score {})",
            option.id,
            question_id,
            option.score
        );
        Ok(option)
    }

    pub fn get_option(&self, option_id: &str) -> Result<AnswerOption> {
        let conn = self.conn()?;
        fetch_option(&conn, option_id)
    }

    /// Options of one question in ordering-index order.
    pub fn list_options(&self, question_id: &str) -> Result<Vec<AnswerOption>> {
        let conn = self.conn()?;
        fetch_question(&conn, question_id)?;
        options_of(&conn, question_id)
    }

    pub fn update_option(&self, option_id: &str, update: OptionUpdate) -> Result<AnswerOption> {
        update.validate()?;
        let conn = self.conn()?;
        let current = fetch_option(&conn, option_id)?;

        if !update.is_empty() {
            let text = update.text.as_deref().map(str::trim).unwrap_or(current.text.as_str());
            let score = update.score.unwrap_or(current.score);
            conn.execute(
                "UPDATE options SET text = ?1, score = ?2, updated_at = ?3 WHERE id = ?4",
                params![text, score, now(), option_id],
            )?;
            tracing::info!("Updated option {}", option_id);
        }

        fetch_option(&conn, option_id)
    }

    /// Delete an option. Answers that selected it are kept with no option.
    pub fn delete_option(&self, option_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let option = fetch_option(&tx, option_id)?;

        tx.execute("DELETE FROM options WHERE id = ?1", [option_id])?;
        Siblings::Options {
            question_id: &option.question_id,
        }
        .reindex(&tx)?;
        tx.commit()?;

        tracing::info!(
            "Deleted option {} from question {}",
            option_id,
            option.question_id
        );
        Ok(())
    }

    /// Move an option to position `to` among its siblings. Returns the final position.
    pub fn move_option(&self, option_id: &str, to: usize) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let option = fetch_option(&tx, option_id)?;
        let position = Siblings::Options {
            question_id: &option.question_id,
        }
        .move_to(&tx, option_id, to)?;
        tx.commit()?;

        tracing::info!("Moved option {} to position {}", option_id, position);
        Ok(position)
    }

    pub fn question_with_options(&self, question_id: &str) -> Result<QuestionWithOptions> {
        let conn = self.conn()?;
        let question = fetch_question(&conn, question_id)?;
        let options = options_of(&conn, question_id)?;
        Ok(QuestionWithOptions { question, options })
    }

    /// The whole catalog: every question with its options, both in order.
    pub fn catalog(&self) -> Result<Vec<QuestionWithOptions>> {
        let questions = self.list_questions()?;
        let conn = self.conn()?;

        let mut result = Vec::with_capacity(questions.len());
        for question in questions {
            let options = options_of(&conn, &question.id)?;
            result.push(QuestionWithOptions { question, options });
        }

        Ok(result)
    }

    /// Set (`Some`) or clear (`None`) the image or audio blob of a question.
    pub fn set_question_media(
        &self,
        question_id: &str,
        kind: MediaKind,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.check_media(kind, data)?;
        let conn = self.conn()?;
        let changed = conn.execute(
            &format!(
                "UPDATE questions SET {} = ?1, updated_at = ?2 WHERE id = ?3",
                kind.column()
            ),
            params![data, now(), question_id],
        )?;
        if changed == 0 {
            return Err(SurveyError::not_found("question", question_id));
        }

        tracing::info!(
            "{} {} for question {}",
            if data.is_some() { "Stored" } else { "Cleared" },
            kind,
            question_id
        );
        Ok(())
    }

    /// Set (`Some`) or clear (`None`) the image or audio blob of an option.
    pub fn set_option_media(
        &self,
        option_id: &str,
        kind: MediaKind,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.check_media(kind, data)?;
        let conn = self.conn()?;
        let changed = conn.execute(
            &format!(
                "UPDATE options SET {} = ?1, updated_at = ?2 WHERE id = ?3",
                kind.column()
            ),
            params![data, now(), option_id],
        )?;
        if changed == 0 {
            return Err(SurveyError::not_found("option", option_id));
        }

        tracing::info!(
            "{} {} for option {}",
            if data.is_some() { "Stored" } else { "Cleared" },
            kind,
            option_id
        );
        Ok(())
    }

    /// Store a finished recording on the entity it was started for.
    pub fn attach_recording(&self, recording: &Recording) -> Result<()> {
        let data = Some(recording.data.as_slice());
        match &recording.target.owner {
            MediaOwner::Question(id) => self.set_question_media(id, recording.target.kind, data),
            MediaOwner::Option(id) => self.set_option_media(id, recording.target.kind, data),
        }
    }

    fn check_media(&self, kind: MediaKind, data: Option<&[u8]>) -> Result<()> {
        if let Some(bytes) = data {
            validate_blob(kind, bytes, self.max_media_bytes)?;
        }
        Ok(())
    }
}

pub(crate) fn fetch_question(conn: &Connection, question_id: &str) -> Result<Question> {
    conn.query_row(
        &format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1"),
        [question_id],
        question_from_row,
    )
    .optional()?
    .ok_or_else(|| SurveyError::not_found("question", question_id))
}

pub(crate) fn fetch_option(conn: &Connection, option_id: &str) -> Result<AnswerOption> {
    conn.query_row(
        &format!("SELECT {OPTION_COLUMNS} FROM options WHERE id = ?1"),
        [option_id],
        option_from_row,
    )
    .optional()?
    .ok_or_else(|| SurveyError::not_found("option", option_id))
}

fn options_of(conn: &Connection, question_id: &str) -> Result<Vec<AnswerOption>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {OPTION_COLUMNS} FROM options WHERE question_id = ?1 ORDER BY order_index ASC"
    ))?;
    let options = stmt.query_map([question_id], option_from_row)?;

    let mut result = Vec::new();
    for option in options {
        result.push(option?);
    }

    Ok(result)
}
