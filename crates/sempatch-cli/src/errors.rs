//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use sempatch_core::PatchError;
use sempatch_syntax::SyntaxError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: Utf8PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: Utf8PathBuf, source: SyntaxError },
    #[error("failed to write {path}: {source}")]
    WriteFile { path: Utf8PathBuf, source: io::Error },
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(serde_json::Error),
    #[error("{0}")]
    Patch(#[from] PatchError),
}
