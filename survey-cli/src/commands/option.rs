//! Answer option commands

use super::{extract_media, media_flags, read_media_file, write_json, Context};
use crate::{cli::OptionCommands, error::CliError};
use std::io::Write;
use survey_core::media::MediaKind;
use survey_core::{NewOption, OptionUpdate};

pub fn handle_option_command(
    ctx: &Context,
    action: &OptionCommands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match action {
        OptionCommands::Add {
            question,
            text,
            score,
            image,
            audio,
        } => {
            let new_option = NewOption {
                text: text.clone(),
                score: *score,
                image_data: image.as_deref().map(read_media_file).transpose()?,
                audio_data: audio.as_deref().map(read_media_file).transpose()?,
            };
            let option = ctx.db.add_option(question, new_option)?;
            writeln!(
                out,
                "Added option {} to question {} at position {}",
                option.id, question, option.order_index
            )?;
        }
        OptionCommands::List { question, json } => {
            let options = ctx.db.list_options(question)?;
            if *json {
                return write_json(out, &options);
            }
            for option in &options {
                writeln!(
                    out,
                    "{:>3}  {}  {:>5}  {} {}",
                    option.order_index,
                    option.id,
                    option.score,
                    option.text,
                    media_flags(option.has_image(), option.has_audio())
                )?;
            }
        }
        OptionCommands::Edit { id, text, score } => {
            let update = OptionUpdate {
                text: text.clone(),
                score: *score,
            };
            if update.is_empty() {
                return Err(CliError::Invalid(
                    "nothing to change; pass --text and/or --score".to_string(),
                ));
            }
            let option = ctx.db.update_option(id, update)?;
            writeln!(
                out,
                "Updated option {} ({}, score {})",
                option.id, option.text, option.score
            )?;
        }
        OptionCommands::Delete { id } => {
            ctx.db.delete_option(id)?;
            writeln!(out, "Deleted option {id}")?;
        }
        OptionCommands::Move { id, position } => {
            let position = ctx.db.move_option(id, *position)?;
            writeln!(out, "Moved option {id} to position {position}")?;
        }
        OptionCommands::SetMedia { id, kind, file } => {
            let data = read_media_file(file)?;
            ctx.db.set_option_media(id, (*kind).into(), Some(&data))?;
            writeln!(out, "Attached {} bytes to option {id}", data.len())?;
        }
        OptionCommands::ClearMedia { id, kind } => {
            ctx.db.set_option_media(id, (*kind).into(), None)?;
            writeln!(out, "Cleared media of option {id}")?;
        }
        OptionCommands::ExtractMedia { id, kind, output } => {
            let option = ctx.db.get_option(id)?;
            let kind: MediaKind = (*kind).into();
            let data = match kind {
                MediaKind::Image => option.image_data.as_deref(),
                MediaKind::Audio => option.audio_data.as_deref(),
            };
            extract_media(id, kind, data, output.as_deref(), out)?;
        }
    }
    Ok(())
}
