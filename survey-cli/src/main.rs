use clap::Parser;
use tracing::debug;

use survey_cli::logging::init_logging;
use survey_cli::{Cli, CliError};

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    debug!("CLI arguments: {:?}", cli);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match cli.run(&mut stdin.lock(), &mut stdout.lock()) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
