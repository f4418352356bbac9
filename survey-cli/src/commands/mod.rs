//! Command implementations for the survey CLI
//!
//! Every handler writes its output to the supplied writer; `main` passes
//! stdout, tests pass a buffer.

pub mod answer;
pub mod config;
pub mod export;
pub mod option;
pub mod question;
pub mod respondent;
pub mod score;

use crate::error::CliError;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use survey_core::media::{detect_format, MediaKind};
use survey_core::{Database, SurveyConfig};

/// What a command needs besides its own arguments.
pub struct Context {
    pub db: Database,
    pub config: SurveyConfig,
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    out: &mut impl Write,
    value: &T,
) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn read_media_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {e}", path.display()),
        ))
    })
}

/// Write a blob to `output`, or to `<id>.<ext>` in the current directory.
pub(crate) fn extract_media(
    id: &str,
    kind: MediaKind,
    data: Option<&[u8]>,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let data = data.ok_or_else(|| CliError::NotFound(format!("{kind} of {id}")))?;
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{id}.{}", detect_format(data).extension())),
    };
    std::fs::write(&path, data)?;
    writeln!(out, "Wrote {} bytes of {kind} to {}", data.len(), path.display())?;
    Ok(())
}

pub(crate) fn media_flags(has_image: bool, has_audio: bool) -> &'static str {
    match (has_image, has_audio) {
        (true, true) => "[image, audio]",
        (true, false) => "[image]",
        (false, true) => "[audio]",
        (false, false) => "",
    }
}
