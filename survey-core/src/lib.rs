//! Storage and scoring for a scored health questionnaire: an ordered catalog
//! of questions and options, one answer per respondent and question,
//! per-respondent integer averages, and CSV export.

pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod media;
pub mod models;
pub mod ordering;
pub mod scoring;
pub mod session;

pub use config::SurveyConfig;
pub use database::Database;
pub use error::{Result, SurveyError};
pub use models::*;
pub use scoring::{average_score, ResultPolicy};
pub use session::SurveySession;
