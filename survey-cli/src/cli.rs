use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use survey_core::media::MediaKind;
use survey_core::{Database, ResultPolicy};

use crate::commands::{self, Context};
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "survey")]
#[command(about = "Manage a scored health questionnaire, record answers and export results")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file path (overrides the configuration)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage survey questions
    Question {
        #[command(subcommand)]
        action: QuestionCommands,
    },

    /// Manage the answer options of a question
    #[command(name = "option")]
    AnswerOption {
        #[command(subcommand)]
        action: OptionCommands,
    },

    /// Manage respondents
    Respondent {
        #[command(subcommand)]
        action: RespondentCommands,
    },

    /// Record a respondent's choice for a question
    Answer {
        respondent: String,
        question: String,
        option: String,
    },

    /// Walk through the survey interactively on stdin
    Take {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<i64>,

        #[arg(long)]
        affiliation: Option<String>,

        /// Continue the survey of an existing respondent
        #[arg(long, conflicts_with_all = ["name", "age", "affiliation"])]
        resume: Option<String>,
    },

    /// Aggregate every respondent's average score and store the results
    Score {
        /// Result policy for this run (defaults to the configured one)
        #[arg(long)]
        policy: Option<ResultPolicy>,

        #[arg(long)]
        json: bool,
    },

    /// Show stored results
    Results {
        /// Show every stored result of one respondent
        #[arg(long)]
        history: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Export answers or scores as CSV
    Export {
        #[command(subcommand)]
        action: ExportCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum QuestionCommands {
    /// Append a question to the catalog
    Add {
        text: String,

        /// Image file to attach
        #[arg(long)]
        image: Option<PathBuf>,

        /// Audio file to attach
        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// List questions in order
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show a question with its options
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Change the text of a question
    Edit {
        id: String,

        #[arg(long)]
        text: String,
    },

    /// Delete a question, its options and its answers
    Delete { id: String },

    /// Move a question to a 0-based position
    Move { id: String, position: usize },

    /// Attach an image or audio file
    SetMedia {
        id: String,
        kind: MediaKindArg,
        file: PathBuf,
    },

    /// Remove an attached image or audio blob
    ClearMedia { id: String, kind: MediaKindArg },

    /// Write an attached blob to a file
    ExtractMedia {
        id: String,
        kind: MediaKindArg,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum OptionCommands {
    /// Append an option to a question
    Add {
        question: String,
        text: String,

        #[arg(long, allow_negative_numbers = true)]
        score: i64,

        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// List the options of a question in order
    List {
        question: String,

        #[arg(long)]
        json: bool,
    },

    /// Change the text or score of an option
    Edit {
        id: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        score: Option<i64>,
    },

    /// Delete an option; answers that chose it keep no option
    Delete { id: String },

    /// Move an option to a 0-based position among its siblings
    Move { id: String, position: usize },

    SetMedia {
        id: String,
        kind: MediaKindArg,
        file: PathBuf,
    },

    ClearMedia { id: String, kind: MediaKindArg },

    ExtractMedia {
        id: String,
        kind: MediaKindArg,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum RespondentCommands {
    /// Register a respondent
    Add {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<i64>,

        #[arg(long)]
        affiliation: Option<String>,
    },

    /// List respondents in creation order
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show a respondent with their answers
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Delete a respondent with their answers and results
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ExportCommands {
    /// Every answer with its question, option and score
    Answers {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// The latest aggregated score of every respondent
    Scores {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file location
    Path,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MediaKindArg {
    Image,
    Audio,
}

impl From<MediaKindArg> for MediaKind {
    fn from(kind: MediaKindArg) -> Self {
        match kind {
            MediaKindArg::Image => MediaKind::Image,
            MediaKindArg::Audio => MediaKind::Audio,
        }
    }
}

impl Cli {
    pub fn run(&self, input: &mut impl BufRead, out: &mut impl Write) -> Result<(), CliError> {
        if let Commands::Config { action } = &self.command {
            return commands::config::handle_config_command(action, self.config.as_deref(), out);
        }

        let config = commands::config::load(self.config.as_deref())?;

        let db_path = self
            .database
            .clone()
            .unwrap_or_else(|| config.database.path.clone());
        let db = Database::new(&db_path)?.with_media_limit(config.media.max_bytes);
        tracing::debug!("Using database {}", db_path.display());

        let ctx = Context { db, config };
        match &self.command {
            Commands::Question { action } => {
                commands::question::handle_question_command(&ctx, action, out)
            }
            Commands::AnswerOption { action } => {
                commands::option::handle_option_command(&ctx, action, out)
            }
            Commands::Respondent { action } => {
                commands::respondent::handle_respondent_command(&ctx, action, out)
            }
            Commands::Answer {
                respondent,
                question,
                option,
            } => commands::answer::record(&ctx, respondent, question, option, out),
            Commands::Take {
                name,
                age,
                affiliation,
                resume,
            } => {
                let start = match resume {
                    Some(id) => commands::answer::Start::Resume(id.clone()),
                    None => commands::answer::Start::New(survey_core::NewRespondent {
                        name: name.clone(),
                        age: *age,
                        affiliation: affiliation.clone(),
                    }),
                };
                commands::answer::take_survey(&ctx, start, input, out)
            }
            Commands::Score { policy, json } => {
                let policy = policy.unwrap_or(ctx.config.scoring.result_policy);
                commands::score::aggregate(&ctx, policy, *json, out)
            }
            Commands::Results { history, json } => {
                commands::score::show_results(&ctx, history.as_deref(), *json, out)
            }
            Commands::Export { action } => {
                commands::export::handle_export_command(&ctx, action, out)
            }
            Commands::Config { .. } => Ok(()),
        }
    }
}
