//! CSV export commands

use super::Context;
use crate::{cli::ExportCommands, error::CliError};
use std::io::Write;

pub fn handle_export_command(
    ctx: &Context,
    action: &ExportCommands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match action {
        ExportCommands::Answers { output } => {
            let path = output
                .clone()
                .unwrap_or_else(|| ctx.config.answers_export_path());
            let rows = ctx.db.export_answers(&path)?;
            writeln!(out, "Exported {rows} answers to {}", path.display())?;
        }
        ExportCommands::Scores { output } => {
            let path = output
                .clone()
                .unwrap_or_else(|| ctx.config.scores_export_path());
            let rows = ctx.db.export_scores(&path)?;
            writeln!(out, "Exported {rows} scores to {}", path.display())?;
        }
    }
    Ok(())
}
