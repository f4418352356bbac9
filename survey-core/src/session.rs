//! A respondent's walk through the survey.
//!
//! The session takes a snapshot of the catalog when it starts, remembers the
//! option picked on each question while the respondent moves back and forth,
//! and records an answer each time a selection is submitted.

use crate::database::Database;
use crate::error::{Result, SurveyError};
use crate::models::{Answer, NewRespondent, QuestionWithOptions, Respondent};
use crate::scoring::average_score;
use std::collections::HashMap;

pub struct SurveySession<'a> {
    db: &'a Database,
    respondent: Respondent,
    questions: Vec<QuestionWithOptions>,
    current: usize,
    /// question id -> option id picked but not necessarily submitted
    selections: HashMap<String, String>,
    /// question id -> score of the submitted option
    submitted: HashMap<String, i64>,
}

impl<'a> SurveySession<'a> {
    /// Create a respondent and begin at the first question.
    pub fn start(db: &'a Database, new_respondent: NewRespondent) -> Result<Self> {
        let respondent = db.create_respondent(new_respondent)?;
        let questions = db.catalog()?;
        tracing::info!(
            "Started survey for respondent {} with {} questions",
            respondent.id,
            questions.len()
        );

        let mut session = Self {
            db,
            respondent,
            questions,
            current: 0,
            selections: HashMap::new(),
            submitted: HashMap::new(),
        };
        session.current = session.next_unanswered_from(0).unwrap_or(0);
        Ok(session)
    }

    /// Continue an existing respondent's survey, restoring recorded answers.
    pub fn resume(db: &'a Database, respondent_id: &str) -> Result<Self> {
        let respondent = db.get_respondent(respondent_id)?;
        let questions = db.catalog()?;

        let mut selections = HashMap::new();
        let mut submitted = HashMap::new();
        for answer in db.answers_for_respondent(respondent_id)? {
            if let (Some(option_id), Some(score)) = (answer.option_id, answer.score) {
                selections.insert(answer.question_id.clone(), option_id);
                submitted.insert(answer.question_id, score);
            }
        }

        let mut session = Self {
            db,
            respondent,
            questions,
            current: 0,
            selections,
            submitted,
        };
        session.current = session.next_unanswered_from(0).unwrap_or(0);
        Ok(session)
    }

    pub fn respondent(&self) -> &Respondent {
        &self.respondent
    }

    pub fn questions(&self) -> &[QuestionWithOptions] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuestionWithOptions> {
        self.questions.get(self.current)
    }

    /// Pick an option of the current question without recording it yet.
    pub fn select(&mut self, option_id: &str) -> Result<()> {
        let question = self
            .current_question()
            .ok_or_else(|| SurveyError::Validation("survey has no questions".to_string()))?;
        if !question.options.iter().any(|option| option.id == option_id) {
            return Err(SurveyError::Validation(format!(
                "option {} is not a choice of question {}",
                option_id, question.question.id
            )));
        }

        let question_id = question.question.id.clone();
        self.selections.insert(question_id, option_id.to_string());
        Ok(())
    }

    pub fn selected_for(&self, question_id: &str) -> Option<&str> {
        self.selections.get(question_id).map(String::as_str)
    }

    pub fn go_to(&mut self, index: usize) -> Result<()> {
        if index >= self.questions.len() {
            return Err(SurveyError::Validation(format!(
                "question index {} out of range (survey has {} questions)",
                index,
                self.questions.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    /// Record the selection for the current question and move on to the
    /// next unanswered question. Submitting a question again replaces its answer.
    pub fn submit(&mut self) -> Result<Answer> {
        let question = self
            .current_question()
            .ok_or_else(|| SurveyError::Validation("survey has no questions".to_string()))?;
        let question_id = question.question.id.clone();
        let option_id = self.selections.get(&question_id).cloned().ok_or_else(|| {
            SurveyError::Validation(format!("no option selected for question {question_id}"))
        })?;
        let score = question
            .options
            .iter()
            .find(|option| option.id == option_id)
            .map(|option| option.score)
            .ok_or_else(|| SurveyError::not_found("option", &option_id))?;

        let answer = self
            .db
            .record_answer(&self.respondent.id, &question_id, &option_id)?;
        self.submitted.insert(question_id, score);

        if let Some(next) = self.next_unanswered_from(self.current + 1) {
            self.current = next;
        } else {
            tracing::info!("Respondent {} completed the survey", self.respondent.id);
        }
        Ok(answer)
    }

    pub fn is_answered(&self, index: usize) -> bool {
        self.questions
            .get(index)
            .is_some_and(|q| self.submitted.contains_key(&q.question.id))
    }

    /// A question without options cannot be answered and is skipped.
    pub fn is_answerable(&self, index: usize) -> bool {
        self.questions
            .get(index)
            .is_some_and(|q| !q.options.is_empty())
    }

    pub fn is_complete(&self) -> bool {
        (0..self.questions.len())
            .filter(|index| self.is_answerable(*index))
            .all(|index| self.is_answered(index))
    }

    /// (answered, answerable)
    pub fn progress(&self) -> (usize, usize) {
        let answerable: Vec<usize> = (0..self.questions.len())
            .filter(|index| self.is_answerable(*index))
            .collect();
        let answered = answerable
            .iter()
            .filter(|index| self.is_answered(**index))
            .count();
        (answered, answerable.len())
    }

    /// Sum of the scores of all submitted options.
    pub fn running_score(&self) -> Result<i64> {
        self.submitted
            .values()
            .try_fold(0i64, |total, score| total.checked_add(*score))
            .ok_or_else(|| SurveyError::Validation("running score overflows".to_string()))
    }

    pub fn average(&self) -> i64 {
        let scores: Vec<i64> = self.submitted.values().copied().collect();
        average_score(&scores)
    }

    /// First answerable, unanswered question at or after `start`, wrapping around.
    fn next_unanswered_from(&self, start: usize) -> Option<usize> {
        let total = self.questions.len();
        (0..total)
            .map(|offset| (start + offset) % total)
            .find(|index| self.is_answerable(*index) && !self.is_answered(*index))
    }
}
