//! Execution of the parsed CLI commands.

use std::fs;
use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use sempatch_config::Config;
use sempatch_core::{
    AnchorIndex, AnchorTable, DiffStrategy, SemanticDiffStrategy, SemanticOperation, SourceRole,
    diff, significant_text,
};
use sempatch_syntax::{NodeKind, SyntaxNode, parse};

use crate::AppError;
use crate::cli::CliCommand;

/// Tracing target for CLI command events.
const COMMAND_TARGET: &str = "sempatch_cli::commands";

/// Hex digits of an anchor shown in human-readable listings.
const SHORT_ANCHOR_LEN: usize = 12;

/// One operation of a diff, as listed by `sempatch diff`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct OperationSummary {
    pub(crate) operation: &'static str,
    pub(crate) anchor: String,
    pub(crate) target: Option<String>,
}

pub(crate) fn execute<W: Write>(
    command: CliCommand,
    config: &Config,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    match command {
        CliCommand::Apply {
            original,
            proposed,
            write,
            json,
        } => apply(&original, &proposed, ApplyOutput::select(write, json), config, stdout),
        CliCommand::Diff {
            original,
            proposed,
            json,
        } => list_operations(&original, &proposed, json, config, stdout),
        CliCommand::Anchors { file } => list_anchors(&file, stdout),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApplyOutput {
    Stdout,
    InPlace,
    Json,
}

impl ApplyOutput {
    const fn select(write: bool, json: bool) -> Self {
        if json {
            Self::Json
        } else if write {
            Self::InPlace
        } else {
            Self::Stdout
        }
    }
}

fn apply<W: Write>(
    original_path: &Utf8Path,
    proposed_path: &Utf8Path,
    output: ApplyOutput,
    config: &Config,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    let original = read_source(original_path)?;
    let proposed = read_source(proposed_path)?;
    let strategy = SemanticDiffStrategy::new(config.strategy_options(original_path));

    if output == ApplyOutput::Json {
        let result = strategy.apply_diff(&original, &proposed.into());
        serde_json::to_writer(&mut *stdout, &result).map_err(AppError::SerialiseOutput)?;
        writeln!(stdout).map_err(AppError::WriteOutput)?;
        return Ok(if result.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let outcome = strategy.patch(&original, &proposed)?;
    if outcome.report.skipped > 0 {
        debug!(
            target: COMMAND_TARGET,
            skipped = outcome.report.skipped,
            "some operations matched nothing in the original"
        );
    }

    if output == ApplyOutput::InPlace {
        fs::write(original_path, outcome.content.as_bytes()).map_err(|source| {
            AppError::WriteFile {
                path: original_path.to_path_buf(),
                source,
            }
        })?;
        info!(
            target: COMMAND_TARGET,
            file = %original_path,
            applied = outcome.report.applied,
            "patched file written"
        );
        return Ok(ExitCode::SUCCESS);
    }

    stdout
        .write_all(outcome.content.as_bytes())
        .map_err(AppError::WriteOutput)?;
    Ok(ExitCode::SUCCESS)
}

fn list_operations<W: Write>(
    original_path: &Utf8Path,
    proposed_path: &Utf8Path,
    json: bool,
    config: &Config,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    let strategy = SemanticDiffStrategy::new(config.strategy_options(original_path));
    let original = strategy.parse(&read_source(original_path)?, SourceRole::Original)?;
    let proposed = strategy.parse(&read_source(proposed_path)?, SourceRole::Proposed)?;

    let intention = diff(&original, &proposed);
    let index = AnchorIndex::build(&original);
    let summaries: Vec<OperationSummary> = intention
        .operations()
        .iter()
        .map(|operation| summarise(operation, &index))
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut *stdout, &summaries)
            .map_err(AppError::SerialiseOutput)?;
        writeln!(stdout).map_err(AppError::WriteOutput)?;
        return Ok(ExitCode::SUCCESS);
    }

    for summary in &summaries {
        let anchor = summary.anchor.get(..SHORT_ANCHOR_LEN).unwrap_or(&summary.anchor);
        let target = summary.target.as_deref().unwrap_or("<unmatched>");
        writeln!(stdout, "{} {anchor} {target}", summary.operation)
            .map_err(AppError::WriteOutput)?;
    }
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn summarise(operation: &SemanticOperation, index: &AnchorIndex<'_>) -> OperationSummary {
    let anchor = operation.target_anchor();
    OperationSummary {
        operation: operation.name(),
        anchor: anchor.as_str().to_owned(),
        target: index.get(anchor).map(describe),
    }
}

fn describe(node: &SyntaxNode) -> String {
    let text = significant_text(node);
    if text.is_empty() {
        return node.grammar_kind().to_owned();
    }
    text
}

fn list_anchors<W: Write>(path: &Utf8Path, stdout: &mut W) -> Result<ExitCode, AppError> {
    let source = read_source(path)?;
    let tree = parse(&source, path).map_err(|source| AppError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = AnchorTable::build(tree.root());

    for node in tree.root().preorder() {
        if matches!(node.kind(), NodeKind::Other) {
            continue;
        }
        let Some(anchor) = table.get(node) else {
            continue;
        };
        writeln!(
            stdout,
            "{} {} {}",
            anchor.short(SHORT_ANCHOR_LEN),
            node.grammar_kind(),
            describe(node)
        )
        .map_err(AppError::WriteOutput)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn read_source(path: &Utf8Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: Utf8PathBuf::from(path),
        source,
    })
}
