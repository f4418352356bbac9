#![allow(dead_code)]

use std::path::PathBuf;
use survey_core::{Database, NewOption, NewQuestion, QuestionWithOptions};
use tempfile::TempDir;

/// A file-backed survey database living in its own temporary directory.
pub struct TestSurvey {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
}

impl TestSurvey {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("data").join("survey.db");
        let db = Database::new(&db_path).expect("database should open");
        TestSurvey { dir, db_path, db }
    }

    pub fn reopen(&self) -> Database {
        Database::new(&self.db_path).expect("database should reopen")
    }

    pub fn out_path(&self, name: &str) -> PathBuf {
        self.dir.path().join("out").join(name)
    }
}

/// The three-question health questionnaire used across integration tests.
pub fn seed_health_catalog(db: &Database) -> Vec<QuestionWithOptions> {
    let catalog: [(&str, &[(&str, i64)]); 3] = [
        (
            "How many hours do you sleep?",
            &[("More than 8", 30), ("6 to 8", 20), ("Less than 6", 0)],
        ),
        (
            "Do you eat breakfast?",
            &[("Every day", 30), ("Sometimes", 10), ("Never", 0)],
        ),
        (
            "How often do you exercise?",
            &[("Daily", 30), ("Weekly", 20), ("Rarely", 0)],
        ),
    ];

    for (text, options) in catalog {
        let question = db.add_question(NewQuestion::new(text)).unwrap();
        for (label, score) in options {
            db.add_option(&question.id, NewOption::new(*label, *score))
                .unwrap();
        }
    }

    db.catalog().unwrap()
}

/// Id of the option labelled `label` on `question`.
pub fn option_named(question: &QuestionWithOptions, label: &str) -> String {
    question
        .options
        .iter()
        .find(|o| o.text == label)
        .unwrap_or_else(|| panic!("no option {label} on {}", question.question.text))
        .id
        .clone()
}
