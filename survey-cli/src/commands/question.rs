//! Question catalog commands

use super::{extract_media, media_flags, read_media_file, write_json, Context};
use crate::{cli::QuestionCommands, error::CliError};
use std::io::Write;
use survey_core::media::MediaKind;
use survey_core::{NewQuestion, QuestionUpdate};

pub fn handle_question_command(
    ctx: &Context,
    action: &QuestionCommands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match action {
        QuestionCommands::Add { text, image, audio } => {
            let new_question = NewQuestion {
                text: text.clone(),
                image_data: image.as_deref().map(read_media_file).transpose()?,
                audio_data: audio.as_deref().map(read_media_file).transpose()?,
            };
            let question = ctx.db.add_question(new_question)?;
            writeln!(
                out,
                "Added question {} at position {}",
                question.id, question.order_index
            )?;
        }
        QuestionCommands::List { json } => {
            let questions = ctx.db.list_questions()?;
            if *json {
                return write_json(out, &questions);
            }
            if questions.is_empty() {
                writeln!(out, "No questions yet.")?;
            }
            for question in &questions {
                writeln!(
                    out,
                    "{:>3}  {}  {} {}",
                    question.order_index,
                    question.id,
                    question.text,
                    media_flags(question.has_image(), question.has_audio())
                )?;
            }
        }
        QuestionCommands::Show { id, json } => {
            let detail = ctx.db.question_with_options(id)?;
            if *json {
                return write_json(out, &detail);
            }
            let question = &detail.question;
            writeln!(out, "{}", question.text)?;
            writeln!(
                out,
                "  id {}  position {} {}",
                question.id,
                question.order_index,
                media_flags(question.has_image(), question.has_audio())
            )?;
            for option in &detail.options {
                writeln!(
                    out,
                    "  {:>3}) {}  (score {})  {} {}",
                    option.order_index + 1,
                    option.text,
                    option.score,
                    option.id,
                    media_flags(option.has_image(), option.has_audio())
                )?;
            }
        }
        QuestionCommands::Edit { id, text } => {
            let question = ctx.db.update_question(
                id,
                QuestionUpdate {
                    text: Some(text.clone()),
                },
            )?;
            writeln!(out, "Updated question {}", question.id)?;
        }
        QuestionCommands::Delete { id } => {
            let answers = ctx.db.count_answers_for_question(id)?;
            ctx.db.delete_question(id)?;
            writeln!(out, "Deleted question {id} and {answers} answers")?;
        }
        QuestionCommands::Move { id, position } => {
            let position = ctx.db.move_question(id, *position)?;
            writeln!(out, "Moved question {id} to position {position}")?;
        }
        QuestionCommands::SetMedia { id, kind, file } => {
            let data = read_media_file(file)?;
            ctx.db.set_question_media(id, (*kind).into(), Some(&data))?;
            writeln!(out, "Attached {} bytes to question {id}", data.len())?;
        }
        QuestionCommands::ClearMedia { id, kind } => {
            ctx.db.set_question_media(id, (*kind).into(), None)?;
            writeln!(out, "Cleared media of question {id}")?;
        }
        QuestionCommands::ExtractMedia { id, kind, output } => {
            let question = ctx.db.get_question(id)?;
            let kind: MediaKind = (*kind).into();
            let data = match kind {
                MediaKind::Image => question.image_data.as_deref(),
                MediaKind::Audio => question.audio_data.as_deref(),
            };
            extract_media(id, kind, data, output.as_deref(), out)?;
        }
    }
    Ok(())
}
