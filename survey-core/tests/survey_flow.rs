mod common;

use common::{option_named, seed_health_catalog, TestSurvey};
use survey_core::export::{ANSWERS_HEADER, SCORES_HEADER};
use survey_core::{NewRespondent, ResultPolicy, SurveySession};

fn named(name: &str) -> NewRespondent {
    NewRespondent {
        name: Some(name.to_string()),
        age: Some(14),
        affiliation: Some("Class 2-B".to_string()),
    }
}

#[test]
fn test_full_survey_to_csv() {
    let survey = TestSurvey::new();
    let catalog = seed_health_catalog(&survey.db);

    let picks = [
        ("Aoi", ["More than 8", "Sometimes", "Daily"]),
        ("Ren", ["Less than 6", "Never", "Weekly"]),
    ];
    for (name, labels) in picks {
        let mut session = SurveySession::start(&survey.db, named(name)).unwrap();
        for (question, label) in catalog.iter().zip(labels) {
            session.select(&option_named(question, label)).unwrap();
            session.submit().unwrap();
        }
        assert!(session.is_complete());
    }

    let results = survey.db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    let averages: Vec<i64> = results.iter().map(|r| r.average_score).collect();
    // (30 + 10 + 30) / 3 and (0 + 0 + 20) / 3, truncated
    assert_eq!(averages, vec![23, 6]);

    let answers_path = survey.out_path("SurveyAnswers.csv");
    assert_eq!(survey.db.export_answers(&answers_path).unwrap(), 6);
    let text = std::fs::read_to_string(&answers_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], ANSWERS_HEADER.join(","));
    assert!(lines[1].ends_with(",Aoi,\"How many hours do you sleep?\",\"More than 8\",30"));
    assert!(lines[3].ends_with(",Aoi,\"How often do you exercise?\",\"Daily\",30"));
    assert!(lines[6].ends_with(",Ren,\"How often do you exercise?\",\"Weekly\",20"));

    let scores_path = survey.out_path("StudentScores.csv");
    assert_eq!(survey.db.export_scores(&scores_path).unwrap(), 2);
    let text = std::fs::read_to_string(&scores_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], SCORES_HEADER.join(","));
    assert!(lines[1].starts_with("Aoi,23,"));
    assert!(lines[2].starts_with("Ren,6,"));
}

#[test]
fn test_single_respondent_two_questions_exports_two_rows() {
    let survey = TestSurvey::new();
    let catalog = seed_health_catalog(&survey.db);
    let respondent = survey.db.create_respondent(named("Aoi")).unwrap();

    // Answer out of catalog order; export follows question order.
    survey
        .db
        .record_answer(
            &respondent.id,
            &catalog[1].question.id,
            &option_named(&catalog[1], "Every day"),
        )
        .unwrap();
    survey
        .db
        .record_answer(
            &respondent.id,
            &catalog[0].question.id,
            &option_named(&catalog[0], "6 to 8"),
        )
        .unwrap();

    let path = survey.out_path("answers.csv");
    assert_eq!(survey.db.export_answers(&path).unwrap(), 2);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("\"How many hours do you sleep?\""));
    assert!(lines[2].contains("\"Do you eat breakfast?\""));
}

#[test]
fn test_state_survives_reopen() {
    let survey = TestSurvey::new();
    let catalog = seed_health_catalog(&survey.db);
    survey
        .db
        .move_question(&catalog[2].question.id, 0)
        .unwrap();
    let respondent = survey.db.create_respondent(named("Aoi")).unwrap();
    survey.db.aggregate_scores(ResultPolicy::Append).unwrap();

    let reopened = survey.reopen();
    let questions = reopened.list_questions().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0].text, "How often do you exercise?");
    assert_eq!(
        questions.iter().map(|q| q.order_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(reopened.get_respondent(&respondent.id).unwrap().name.as_deref(), Some("Aoi"));
    assert_eq!(reopened.count_results().unwrap(), 1);
}

#[test]
fn test_resumed_session_finishes_survey() {
    let survey = TestSurvey::new();
    let catalog = seed_health_catalog(&survey.db);

    let respondent_id = {
        let mut session = SurveySession::start(&survey.db, named("Aoi")).unwrap();
        session
            .select(&option_named(&catalog[0], "6 to 8"))
            .unwrap();
        session.submit().unwrap();
        session.respondent().id.clone()
    };

    let mut session = SurveySession::resume(&survey.db, &respondent_id).unwrap();
    assert_eq!(session.progress(), (1, 3));
    for (index, label) in [(1, "Never"), (2, "Rarely")] {
        assert_eq!(session.current_index(), index);
        session
            .select(&option_named(&catalog[index], label))
            .unwrap();
        session.submit().unwrap();
    }

    assert!(session.is_complete());
    assert_eq!(session.running_score().unwrap(), 20);
    assert_eq!(session.average(), 6);
}
