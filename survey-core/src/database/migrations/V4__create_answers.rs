/// Create the answers table linking a respondent, a question and the chosen option
///
/// Deleting an option keeps the answer row and clears `option_id`.
pub fn migration() -> String {
    r#"
CREATE TABLE answers (
    id TEXT PRIMARY KEY NOT NULL,
    respondent_id TEXT NOT NULL,
    question_id TEXT NOT NULL,
    option_id TEXT,
    answered_at INTEGER NOT NULL,
    UNIQUE (respondent_id, question_id),
    FOREIGN KEY (respondent_id) REFERENCES respondents (id) ON DELETE CASCADE,
    FOREIGN KEY (question_id) REFERENCES questions (id) ON DELETE CASCADE,
    FOREIGN KEY (option_id) REFERENCES options (id) ON DELETE SET NULL
);

CREATE INDEX idx_answers_option
    ON answers(option_id);
"#
    .to_string()
}
