/// Create the results table for aggregated respondent scores
pub fn migration() -> String {
    r#"
CREATE TABLE results (
    id TEXT PRIMARY KEY NOT NULL,
    respondent_id TEXT NOT NULL,
    average_score INTEGER NOT NULL,
    answer_count INTEGER NOT NULL,
    evaluated_at INTEGER NOT NULL,
    FOREIGN KEY (respondent_id) REFERENCES respondents (id) ON DELETE CASCADE
);

CREATE INDEX idx_results_respondent_evaluated
    ON results(respondent_id, evaluated_at);
"#
    .to_string()
}
