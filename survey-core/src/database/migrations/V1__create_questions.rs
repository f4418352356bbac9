/// Create the questions table holding the ordered survey catalog
pub fn migration() -> String {
    r#"
CREATE TABLE questions (
    id TEXT PRIMARY KEY NOT NULL,
    text TEXT NOT NULL CHECK (length(trim(text)) > 0),
    image_data BLOB,
    audio_data BLOB,
    order_index INTEGER NOT NULL CHECK (order_index >= 0),
    created_at INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE UNIQUE INDEX idx_questions_order
    ON questions(order_index);
"#
    .to_string()
}
