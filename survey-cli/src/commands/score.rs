//! Score aggregation and result display

use super::{write_json, Context};
use crate::error::CliError;
use std::io::Write;
use survey_core::export::format_timestamp;
use survey_core::{ResultPolicy, ScoreResult};

pub fn aggregate(
    ctx: &Context,
    policy: ResultPolicy,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let results = ctx.db.aggregate_scores(policy)?;
    if json {
        return write_json(out, &results);
    }
    if results.is_empty() {
        writeln!(out, "No respondents to score.")?;
        return Ok(());
    }
    print_results(ctx, &results, out)
}

pub fn show_results(
    ctx: &Context,
    history: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let results = match history {
        Some(respondent_id) => ctx.db.result_history(respondent_id)?,
        None => ctx.db.latest_results()?,
    };
    if json {
        return write_json(out, &results);
    }
    if results.is_empty() {
        writeln!(out, "No results yet; run `survey score` first.")?;
        return Ok(());
    }
    print_results(ctx, &results, out)
}

fn print_results(ctx: &Context, results: &[ScoreResult], out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{:<24} {:>7} {:>7}  {}", "Respondent", "Score", "Answers", "Evaluated")?;
    for result in results {
        let respondent = ctx.db.get_respondent(&result.respondent_id)?;
        writeln!(
            out,
            "{:<24} {:>7} {:>7}  {}",
            respondent.label(),
            result.average_score,
            result.answer_count,
            format_timestamp(result.evaluated_at)
        )?;
    }
    Ok(())
}
