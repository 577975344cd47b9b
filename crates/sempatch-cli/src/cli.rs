//! CLI argument definitions for the sempatch tool.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Command-line interface for the sempatch semantic patch tool.
#[derive(Parser, Debug)]
#[command(name = "sempatch", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Commands offered by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Applies the changed function bodies of PROPOSED to ORIGINAL.
    Apply {
        /// The file to patch.
        #[arg(value_name = "ORIGINAL")]
        original: Utf8PathBuf,
        /// A file holding the complete proposed rewrite of ORIGINAL.
        #[arg(value_name = "PROPOSED")]
        proposed: Utf8PathBuf,
        /// Overwrites ORIGINAL instead of printing the patched text.
        #[arg(long, conflicts_with = "json")]
        write: bool,
        /// Prints the patch result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Lists the operations that turn ORIGINAL into PROPOSED.
    Diff {
        /// The file to patch.
        #[arg(value_name = "ORIGINAL")]
        original: Utf8PathBuf,
        /// A file holding the complete proposed rewrite of ORIGINAL.
        #[arg(value_name = "PROPOSED")]
        proposed: Utf8PathBuf,
        /// Prints the operations as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Lists the declarations and statements of FILE with their anchors.
    Anchors {
        /// The file to inspect.
        #[arg(value_name = "FILE")]
        file: Utf8PathBuf,
    },
}
