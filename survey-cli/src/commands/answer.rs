//! Recording answers, one at a time or through an interactive walk

use super::Context;
use crate::error::CliError;
use std::io::{BufRead, Write};
use survey_core::{NewRespondent, SurveySession};

pub enum Start {
    New(NewRespondent),
    Resume(String),
}

pub fn record(
    ctx: &Context,
    respondent_id: &str,
    question_id: &str,
    option_id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let answer = ctx.db.record_answer(respondent_id, question_id, option_id)?;
    writeln!(out, "Recorded answer {}", answer.id)?;
    Ok(())
}

enum Reply {
    Choose(usize),
    Next,
    Previous,
    Quit,
    Unknown,
}

fn parse_reply(line: &str, option_count: usize) -> Reply {
    match line.trim() {
        "q" | "quit" => Reply::Quit,
        "n" | "next" => Reply::Next,
        "p" | "prev" => Reply::Previous,
        other => match other.parse::<usize>() {
            Ok(choice) if (1..=option_count).contains(&choice) => Reply::Choose(choice - 1),
            _ => Reply::Unknown,
        },
    }
}

/// Present each question on `out` and read the respondent's choices from
/// `input` until every question is answered, `q` is entered or input ends.
pub fn take_survey(
    ctx: &Context,
    start: Start,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut session = match start {
        Start::New(respondent) => SurveySession::start(&ctx.db, respondent)?,
        Start::Resume(respondent_id) => SurveySession::resume(&ctx.db, &respondent_id)?,
    };
    writeln!(out, "Respondent {}", session.respondent().id)?;

    let total = session.questions().len();
    let mut line = String::new();
    while !session.is_complete() {
        let index = session.current_index();
        let option_ids: Vec<String> = match session.current_question() {
            Some(current) => {
                writeln!(out, "\n[{}/{}] {}", index + 1, total, current.question.text)?;
                for (n, option) in current.options.iter().enumerate() {
                    writeln!(out, "  {}) {}", n + 1, option.text)?;
                }
                current.options.iter().map(|o| o.id.clone()).collect()
            }
            None => break,
        };
        if option_ids.is_empty() {
            writeln!(out, "This question has no options; skipped.")?;
            session.go_to((index + 1) % total)?;
            continue;
        }
        write!(out, "Choose 1-{}, n(ext), p(rev) or q(uit): ", option_ids.len())?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match parse_reply(&line, option_ids.len()) {
            Reply::Choose(choice) => {
                session.select(&option_ids[choice])?;
                session.submit()?;
            }
            Reply::Next => session.go_to((index + 1) % total)?,
            Reply::Previous => session.go_to((index + total - 1) % total)?,
            Reply::Quit => break,
            Reply::Unknown => writeln!(out, "Not a valid choice.")?,
        }
    }

    let (answered, total) = session.progress();
    if session.is_complete() {
        writeln!(
            out,
            "\nSurvey complete. Total score {}, average {}.",
            session.running_score()?,
            session.average()
        )?;
    } else {
        writeln!(
            out,
            "\nAnswered {answered} of {total}; resume with --resume {}",
            session.respondent().id
        )?;
    }
    Ok(())
}
