use std::fmt;
use survey_core::SurveyError;

/// Main error type for the survey CLI
#[derive(Debug)]
pub enum CliError {
    /// Configuration-related errors
    Config(String),
    /// File I/O errors
    Io(std::io::Error),
    /// A referenced question, option or respondent does not exist
    NotFound(String),
    /// Input rejected by validation or a database constraint
    Invalid(String),
    /// Generic errors from anyhow
    Other(anyhow::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::NotFound(msg) => write!(f, "Not found: {msg}"),
            CliError::Invalid(msg) => write!(f, "Invalid input: {msg}"),
            CliError::Other(err) => write!(f, "Error: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(err) => Some(err),
            CliError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl CliError {
    /// Get the exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Io(_) => 3,
            CliError::NotFound(_) => 4,
            CliError::Invalid(_) => 5,
            CliError::Other(_) => 1,
        }
    }
}

impl From<SurveyError> for CliError {
    fn from(err: SurveyError) -> Self {
        match err {
            SurveyError::NotFound(msg) => CliError::NotFound(msg),
            SurveyError::ConstraintViolation(msg) | SurveyError::Validation(msg) => {
                CliError::Invalid(msg)
            }
            SurveyError::Media(err) => CliError::Invalid(err.to_string()),
            SurveyError::Config(err) => CliError::Config(err.to_string()),
            SurveyError::Io(err) => CliError::Io(err),
            other => CliError::Other(other.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Other(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other(err.into())
    }
}
