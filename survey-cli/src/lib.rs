//! Command-line front end for the health survey store.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::Cli;
pub use error::CliError;
