use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};

/// Option scores are stored as 16-bit values.
pub const MIN_SCORE: i64 = i16::MIN as i64;
pub const MAX_SCORE: i64 = i16::MAX as i64;

/// A survey prompt. Options are loaded separately through the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
    #[serde(skip)]
    pub audio_data: Option<Vec<u8>>,
    pub order_index: i64,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl Question {
    pub fn has_image(&self) -> bool {
        self.image_data.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio_data.is_some()
    }
}

/// A scored answer choice. `question_id` is the owning question; there is no
/// pointer back into the question itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub question_id: String,
    pub text: String,
    pub score: i64,
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
    #[serde(skip)]
    pub audio_data: Option<Vec<u8>>,
    pub order_index: i64,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl AnswerOption {
    pub fn has_image(&self) -> bool {
        self.image_data.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio_data.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respondent {
    pub id: String,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub affiliation: Option<String>,
    pub created_at: i64,
}

impl Respondent {
    /// Name when one was given, otherwise the identifier.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: String,
    pub respondent_id: String,
    pub question_id: String,
    /// `None` once the selected option has been deleted.
    pub option_id: Option<String>,
    pub answered_at: i64,
}

/// An answer joined with the question and option it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub answer_id: String,
    pub question_id: String,
    pub question_text: String,
    pub question_order: i64,
    pub option_id: Option<String>,
    pub option_text: Option<String>,
    pub score: Option<i64>,
    pub answered_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub id: String,
    pub respondent_id: String,
    pub average_score: i64,
    pub answer_count: i64,
    pub evaluated_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
    pub text: String,
    pub image_data: Option<Vec<u8>>,
    pub audio_data: Option<Vec<u8>>,
}

impl NewQuestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("question text", &self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestionUpdate {
    pub text: Option<String>,
}

impl QuestionUpdate {
    pub fn validate(&self) -> Result<()> {
        match &self.text {
            Some(text) => require_text("question text", text),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewOption {
    pub text: String,
    pub score: i64,
    pub image_data: Option<Vec<u8>>,
    pub audio_data: Option<Vec<u8>>,
}

impl NewOption {
    pub fn new(text: impl Into<String>, score: i64) -> Self {
        Self {
            text: text.into(),
            score,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text("option text", &self.text)?;
        require_score(self.score)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OptionUpdate {
    pub text: Option<String>,
    pub score: Option<i64>,
}

impl OptionUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(text) = &self.text {
            require_text("option text", text)?;
        }
        match self.score {
            Some(score) => require_score(score),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.score.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewRespondent {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub affiliation: Option<String>,
}

impl NewRespondent {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("respondent name", name)?;
        }
        if let Some(age) = self.age {
            if age < 0 {
                return Err(SurveyError::Validation(format!(
                    "respondent age must not be negative, got {age}"
                )));
            }
        }
        Ok(())
    }
}

fn require_score(score: i64) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(SurveyError::Validation(format!(
            "option score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}"
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SurveyError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
