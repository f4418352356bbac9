//! Respondent commands

use super::{write_json, Context};
use crate::{cli::RespondentCommands, error::CliError};
use serde::Serialize;
use std::io::Write;
use survey_core::{AnswerDetail, NewRespondent, Respondent};

#[derive(Serialize)]
struct RespondentDetail {
    #[serde(flatten)]
    respondent: Respondent,
    answers: Vec<AnswerDetail>,
}

pub fn handle_respondent_command(
    ctx: &Context,
    action: &RespondentCommands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match action {
        RespondentCommands::Add {
            name,
            age,
            affiliation,
        } => {
            let respondent = ctx.db.create_respondent(NewRespondent {
                name: name.clone(),
                age: *age,
                affiliation: affiliation.clone(),
            })?;
            writeln!(out, "Added respondent {}", respondent.id)?;
        }
        RespondentCommands::List { json } => {
            let respondents = ctx.db.list_respondents()?;
            if *json {
                return write_json(out, &respondents);
            }
            for respondent in &respondents {
                writeln!(
                    out,
                    "{}  {}  age {}  {}",
                    respondent.id,
                    respondent.name.as_deref().unwrap_or("-"),
                    respondent
                        .age
                        .map(|age| age.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    respondent.affiliation.as_deref().unwrap_or("")
                )?;
            }
        }
        RespondentCommands::Show { id, json } => {
            let detail = RespondentDetail {
                respondent: ctx.db.get_respondent(id)?,
                answers: ctx.db.answers_for_respondent(id)?,
            };
            if *json {
                return write_json(out, &detail);
            }
            writeln!(out, "{} ({})", detail.respondent.label(), detail.respondent.id)?;
            for answer in &detail.answers {
                match (&answer.option_text, answer.score) {
                    (Some(text), Some(score)) => writeln!(
                        out,
                        "  {}. {} -> {} ({})",
                        answer.question_order + 1,
                        answer.question_text,
                        text,
                        score
                    )?,
                    _ => writeln!(
                        out,
                        "  {}. {} -> (option deleted)",
                        answer.question_order + 1,
                        answer.question_text
                    )?,
                }
            }
        }
        RespondentCommands::Delete { id } => {
            ctx.db.delete_respondent(id)?;
            writeln!(out, "Deleted respondent {id}")?;
        }
    }
    Ok(())
}
