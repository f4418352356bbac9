use super::Database;
use crate::error::SurveyError;
use crate::media::{MediaKind, MediaOwner, MediaRecorder, MediaTarget};
use crate::models::{NewOption, NewQuestion, NewRespondent, OptionUpdate, QuestionUpdate};
use crate::ordering::is_contiguous;
use crate::scoring::ResultPolicy;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

fn db() -> Database {
    Database::open_in_memory().expect("in-memory database should open")
}

fn question_indices(db: &Database) -> Vec<i64> {
    db.list_questions()
        .unwrap()
        .iter()
        .map(|q| q.order_index)
        .collect()
}

fn option_indices(db: &Database, question_id: &str) -> Vec<i64> {
    db.list_options(question_id)
        .unwrap()
        .iter()
        .map(|o| o.order_index)
        .collect()
}

fn respondent(db: &Database, name: &str) -> String {
    db.create_respondent(NewRespondent {
        name: Some(name.to_string()),
        ..Default::default()
    })
    .unwrap()
    .id
}

#[test]
fn test_questions_are_appended_in_order() {
    let db = db();
    let first = db.add_question(NewQuestion::new("Do you sleep well?")).unwrap();
    let second = db.add_question(NewQuestion::new("Do you exercise?")).unwrap();

    assert_eq!(first.order_index, 0);
    assert_eq!(second.order_index, 1);
    assert_eq!(
        db.list_questions()
            .unwrap()
            .iter()
            .map(|q| q.text.as_str())
            .collect::<Vec<_>>(),
        vec!["Do you sleep well?", "Do you exercise?"]
    );
}

#[test]
fn test_blank_question_is_rejected() {
    let db = db();
    assert!(matches!(
        db.add_question(NewQuestion::new("  ")),
        Err(SurveyError::Validation(_))
    ));
    assert!(db.list_questions().unwrap().is_empty());
}

#[test]
fn test_update_question_and_option() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    let option = db.add_option(&question.id, NewOption::new("Yes", 10)).unwrap();

    let updated = db
        .update_question(
            &question.id,
            QuestionUpdate {
                text: Some("Do you sleep well?".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.text, "Do you sleep well?");
    assert!(updated.updated_at.is_some());

    let updated = db
        .update_option(
            &option.id,
            OptionUpdate {
                text: None,
                score: Some(30),
            },
        )
        .unwrap();
    assert_eq!(updated.text, "Yes");
    assert_eq!(updated.score, 30);

    assert!(matches!(
        db.update_question("missing", QuestionUpdate { text: Some("x".into()) }),
        Err(SurveyError::NotFound(_))
    ));
}

#[test]
fn test_option_for_missing_question_is_not_found() {
    let db = db();
    assert!(matches!(
        db.add_option("missing", NewOption::new("Yes", 1)),
        Err(SurveyError::NotFound(_))
    ));
}

#[test]
fn test_question_moves_keep_indices_contiguous() {
    let db = db();
    let ids: Vec<String> = (0..5)
        .map(|i| db.add_question(NewQuestion::new(format!("Q{i}"))).unwrap().id)
        .collect();

    assert_eq!(db.move_question(&ids[4], 0).unwrap(), 0);
    assert_eq!(db.move_question(&ids[0], 99).unwrap(), 4);
    assert_eq!(db.move_question(&ids[2], 1).unwrap(), 1);

    let texts: Vec<String> = db.list_questions().unwrap().into_iter().map(|q| q.text).collect();
    assert_eq!(texts, vec!["Q4", "Q2", "Q1", "Q3", "Q0"]);
    assert!(is_contiguous(&question_indices(&db)));
}

#[test]
fn test_option_moves_keep_indices_contiguous() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Breakfast?")).unwrap();
    let other = db.add_question(NewQuestion::new("Exercise?")).unwrap();
    db.add_option(&other.id, NewOption::new("Untouched", 0)).unwrap();

    let ids: Vec<String> = ["Always", "Often", "Sometimes", "Never"]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            db.add_option(&question.id, NewOption::new(*text, 30 - 10 * i as i64))
                .unwrap()
                .id
        })
        .collect();

    // Deterministic pseudo-random walk over positions.
    let mut seed = 7usize;
    for step in 0..40 {
        seed = (seed * 31 + step) % 97;
        let id = &ids[seed % ids.len()];
        db.move_option(id, seed % 6).unwrap();
        assert_eq!(option_indices(&db, &question.id), vec![0, 1, 2, 3]);
    }

    assert_eq!(option_indices(&db, &other.id), vec![0]);
}

#[test]
fn test_move_unknown_item_is_not_found() {
    let db = db();
    db.add_question(NewQuestion::new("Q")).unwrap();
    assert!(matches!(
        db.move_question("missing", 0),
        Err(SurveyError::NotFound(_))
    ));
    assert!(matches!(
        db.move_option("missing", 0),
        Err(SurveyError::NotFound(_))
    ));
}

#[test]
fn test_deleting_question_cascades_and_reindexes() {
    let db = db();
    let first = db.add_question(NewQuestion::new("First")).unwrap();
    let second = db.add_question(NewQuestion::new("Second")).unwrap();
    let third = db.add_question(NewQuestion::new("Third")).unwrap();
    let option = db.add_option(&second.id, NewOption::new("Yes", 10)).unwrap();
    let respondent_id = respondent(&db, "Aoi");
    db.record_answer(&respondent_id, &second.id, &option.id).unwrap();

    db.delete_question(&second.id).unwrap();

    assert!(matches!(
        db.get_option(&option.id),
        Err(SurveyError::NotFound(_))
    ));
    assert_eq!(db.count_answers_for_question(&second.id).unwrap(), 0);
    assert!(db.answers_for_respondent(&respondent_id).unwrap().is_empty());

    let remaining: Vec<String> = db.list_questions().unwrap().into_iter().map(|q| q.id).collect();
    assert_eq!(remaining, vec![first.id, third.id]);
    assert_eq!(question_indices(&db), vec![0, 1]);
}

#[test]
fn test_deleting_option_nulls_answers_and_reindexes() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    let yes = db.add_option(&question.id, NewOption::new("Yes", 30)).unwrap();
    db.add_option(&question.id, NewOption::new("No", 0)).unwrap();
    let respondent_id = respondent(&db, "Aoi");
    db.record_answer(&respondent_id, &question.id, &yes.id).unwrap();

    db.delete_option(&yes.id).unwrap();

    let answer = db.get_answer(&respondent_id, &question.id).unwrap().unwrap();
    assert_eq!(answer.option_id, None);
    assert_eq!(option_indices(&db, &question.id), vec![0]);

    // The answer stays in the average with a score of zero but has no export row.
    let results = db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    assert_eq!(results[0].average_score, 0);
    assert_eq!(results[0].answer_count, 1);
    assert!(db.answer_rows().unwrap().is_empty());
}

#[test]
fn test_deleted_option_scores_zero_but_keeps_divisor() {
    let db = db();
    let sleep = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    let exercise = db.add_question(NewQuestion::new("Exercise?")).unwrap();
    let ten = db.add_option(&sleep.id, NewOption::new("Sometimes", 10)).unwrap();
    let twenty = db.add_option(&exercise.id, NewOption::new("Often", 20)).unwrap();
    let respondent_id = respondent(&db, "Aoi");
    db.record_answer(&respondent_id, &sleep.id, &ten.id).unwrap();
    db.record_answer(&respondent_id, &exercise.id, &twenty.id).unwrap();

    db.delete_option(&twenty.id).unwrap();

    let results = db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    assert_eq!(results[0].answer_count, 2);
    // (10 + 0) / 2
    assert_eq!(results[0].average_score, 5);
}

#[test]
fn test_out_of_range_score_is_rejected() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    assert!(matches!(
        db.add_option(&question.id, NewOption::new("Huge", i64::MAX)),
        Err(SurveyError::Validation(_))
    ));

    let option = db.add_option(&question.id, NewOption::new("Yes", 30)).unwrap();
    assert!(matches!(
        db.update_option(
            &option.id,
            OptionUpdate {
                text: None,
                score: Some(-40_000),
            },
        ),
        Err(SurveyError::Validation(_))
    ));
    assert_eq!(db.get_option(&option.id).unwrap().score, 30);
}

#[test]
fn test_answering_again_replaces_selection() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    let yes = db.add_option(&question.id, NewOption::new("Yes", 30)).unwrap();
    let no = db.add_option(&question.id, NewOption::new("No", 0)).unwrap();
    let respondent_id = respondent(&db, "Aoi");

    let first = db.record_answer(&respondent_id, &question.id, &yes.id).unwrap();
    let second = db.record_answer(&respondent_id, &question.id, &no.id).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.option_id.as_deref(), Some(no.id.as_str()));
    assert_eq!(db.count_answers_for_question(&question.id).unwrap(), 1);
}

#[test]
fn test_option_from_other_question_is_rejected() {
    let db = db();
    let sleep = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    let exercise = db.add_question(NewQuestion::new("Exercise?")).unwrap();
    let often = db.add_option(&exercise.id, NewOption::new("Often", 20)).unwrap();
    let respondent_id = respondent(&db, "Aoi");

    assert!(matches!(
        db.record_answer(&respondent_id, &sleep.id, &often.id),
        Err(SurveyError::ConstraintViolation(_))
    ));
    assert!(matches!(
        db.record_answer("missing", &exercise.id, &often.id),
        Err(SurveyError::NotFound(_))
    ));
}

#[test]
fn test_aggregation_averages_selected_scores() {
    let db = db();
    let respondent_id = respondent(&db, "Aoi");
    let idle_id = respondent(&db, "Ren");

    for (text, score) in [("Q1", 10), ("Q2", 20), ("Q3", 0)] {
        let question = db.add_question(NewQuestion::new(text)).unwrap();
        let option = db.add_option(&question.id, NewOption::new("Pick", score)).unwrap();
        db.record_answer(&respondent_id, &question.id, &option.id).unwrap();
    }

    let results = db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].respondent_id, respondent_id);
    assert_eq!(results[0].average_score, 10);
    assert_eq!(results[0].answer_count, 3);
    assert_eq!(results[1].respondent_id, idle_id);
    assert_eq!(results[1].average_score, 0);
    assert_eq!(results[1].answer_count, 0);
}

#[test]
fn test_result_policies() {
    let db = db();
    let respondent_id = respondent(&db, "Aoi");
    respondent(&db, "Ren");

    db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    assert_eq!(db.count_results().unwrap(), 2);

    db.aggregate_scores(ResultPolicy::Append).unwrap();
    db.aggregate_scores(ResultPolicy::Append).unwrap();
    assert_eq!(db.count_results().unwrap(), 6);
    assert_eq!(db.result_history(&respondent_id).unwrap().len(), 3);
    assert_eq!(db.latest_results().unwrap().len(), 2);

    db.aggregate_scores(ResultPolicy::Upsert).unwrap();
    assert_eq!(db.count_results().unwrap(), 2);
}

#[test]
fn test_deleting_respondent_removes_answers_and_results() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Sleep?")).unwrap();
    let option = db.add_option(&question.id, NewOption::new("Yes", 30)).unwrap();
    let respondent_id = respondent(&db, "Aoi");
    db.record_answer(&respondent_id, &question.id, &option.id).unwrap();
    db.aggregate_scores(ResultPolicy::Upsert).unwrap();

    db.delete_respondent(&respondent_id).unwrap();

    assert_eq!(db.count_answers_for_question(&question.id).unwrap(), 0);
    assert_eq!(db.count_results().unwrap(), 0);
    assert!(matches!(
        db.delete_respondent(&respondent_id),
        Err(SurveyError::NotFound(_))
    ));
}

#[test]
fn test_answer_rows_follow_question_order() {
    let db = db();
    let first = db.add_question(NewQuestion::new("First")).unwrap();
    let second = db.add_question(NewQuestion::new("Second")).unwrap();
    let a = db.add_option(&first.id, NewOption::new("A", 1)).unwrap();
    let b = db.add_option(&second.id, NewOption::new("B", 2)).unwrap();
    let respondent_id = respondent(&db, "Aoi");

    db.record_answer(&respondent_id, &second.id, &b.id).unwrap();
    db.record_answer(&respondent_id, &first.id, &a.id).unwrap();
    db.move_question(&second.id, 0).unwrap();

    let rows = db.answer_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].question, "Second");
    assert_eq!(rows[1].question, "First");
    assert!(rows.iter().all(|row| row.respondent == "Aoi"));
}

#[test]
fn test_media_is_stored_and_cleared() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Which is a fruit?")).unwrap();
    assert!(!question.has_image());

    db.set_question_media(&question.id, MediaKind::Image, Some(PNG))
        .unwrap();
    let stored = db.get_question(&question.id).unwrap();
    assert_eq!(stored.image_data.as_deref(), Some(PNG));

    db.set_question_media(&question.id, MediaKind::Image, None)
        .unwrap();
    assert!(!db.get_question(&question.id).unwrap().has_image());
}

#[test]
fn test_media_over_limit_is_rejected() {
    let db = db().with_media_limit(4);
    let question = db.add_question(NewQuestion::new("Q")).unwrap();

    assert!(matches!(
        db.set_question_media(&question.id, MediaKind::Image, Some(PNG)),
        Err(SurveyError::Media(_))
    ));
    assert!(!db.get_question(&question.id).unwrap().has_image());
}

#[test]
fn test_recording_is_attached_to_option() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Q")).unwrap();
    let option = db.add_option(&question.id, NewOption::new("A", 1)).unwrap();

    let mut recorder = MediaRecorder::new();
    recorder
        .start(MediaTarget {
            owner: MediaOwner::Option(option.id.clone()),
            kind: MediaKind::Audio,
        })
        .unwrap();
    recorder.write(b"RIFF").unwrap();
    recorder.write(&[0, 0, 0, 0]).unwrap();
    recorder.write(b"WAVEfmt ").unwrap();
    let recording = recorder.stop().unwrap();

    db.attach_recording(&recording).unwrap();
    let stored = db.get_option(&option.id).unwrap();
    assert!(stored.has_audio());
    assert_eq!(stored.audio_data.unwrap().len(), 16);
}

#[test]
fn test_catalog_nests_options_in_order() {
    let db = db();
    let question = db.add_question(NewQuestion::new("Q")).unwrap();
    let a = db.add_option(&question.id, NewOption::new("A", 1)).unwrap();
    db.add_option(&question.id, NewOption::new("B", 2)).unwrap();
    db.move_option(&a.id, 1).unwrap();

    let catalog = db.catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    let texts: Vec<&str> = catalog[0].options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, vec!["B", "A"]);
}
