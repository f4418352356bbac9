/// Create the respondents table, one row per survey session
pub fn migration() -> String {
    r#"
CREATE TABLE respondents (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT,
    age INTEGER CHECK (age IS NULL OR age >= 0),
    affiliation TEXT,
    created_at INTEGER NOT NULL
);

CREATE INDEX idx_respondents_created
    ON respondents(created_at);
"#
    .to_string()
}
