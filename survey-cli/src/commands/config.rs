//! Configuration management command implementations

use crate::{cli::ConfigCommands, error::CliError};
use std::io::Write;
use std::path::Path;
use survey_core::config::{default_config_path, write_default_config};
use survey_core::SurveyConfig;

/// Load the configuration from `path`, or from the default location.
pub fn load(path: Option<&Path>) -> Result<SurveyConfig, CliError> {
    let config = match path {
        Some(path) => SurveyConfig::load_from(path)?,
        None => SurveyConfig::load()?.0,
    };
    Ok(config)
}

/// Handle configuration management operations
pub fn handle_config_command(
    action: &ConfigCommands,
    path: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    match action {
        ConfigCommands::Show => {
            let config = load(Some(&config_path))?;
            write!(out, "{}", config.to_toml()?)?;
        }
        ConfigCommands::Path => {
            writeln!(out, "{}", config_path.display())?;
        }
        ConfigCommands::Init { force } => init_config(&config_path, *force, out)?,
    }
    Ok(())
}

fn init_config(config_path: &Path, force: bool, out: &mut impl Write) -> Result<(), CliError> {
    if config_path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    write_default_config(config_path)?;
    writeln!(out, "Wrote default configuration to {}", config_path.display())?;
    Ok(())
}
