/// Create the options table for scored answer choices of each question
pub fn migration() -> String {
    r#"
CREATE TABLE options (
    id TEXT PRIMARY KEY NOT NULL,
    question_id TEXT NOT NULL,
    text TEXT NOT NULL CHECK (length(trim(text)) > 0),
    score INTEGER NOT NULL,
    image_data BLOB,
    audio_data BLOB,
    order_index INTEGER NOT NULL CHECK (order_index >= 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    FOREIGN KEY (question_id) REFERENCES questions (id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX idx_options_question_order
    ON options(question_id, order_index);
"#
    .to_string()
}
