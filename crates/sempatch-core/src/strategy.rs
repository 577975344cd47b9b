//! Host-facing diff strategy.
//!
//! An editing agent hands the strategy the current text of a file and the
//! full rewrite it proposes. The strategy parses both, derives an
//! [`IntentionDiff`](crate::IntentionDiff), replays it against the original
//! tree and prints the result. Failures are reported in the returned
//! [`PatchResult`]; nothing escapes as a panic or an `Err`.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{debug, info};

use sempatch_syntax::{IndentationStyle, SyntaxTree, detect_indentation_style, parse, print};

use crate::differ::diff;
use crate::error::{PatchError, SourceRole};
use crate::executor::{ApplyReport, TransactionalExecutor};

/// Tracing target for strategy events.
pub const STRATEGY_TARGET: &str = "sempatch_core::strategy";

/// File name assumed when the host does not say which file is patched.
pub const DEFAULT_TARGET_FILE: &str = "input.ts";

/// A hunk of a structured diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffItem {
    /// Replacement text of the hunk.
    pub content: String,
    /// One-based line the hunk starts at, when known.
    pub start_line: Option<usize>,
}

/// The change a host asks a strategy to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffContent {
    /// The complete proposed text of the file.
    Text(String),
    /// Structured hunks.
    Items(Vec<DiffItem>),
}

impl From<String> for DiffContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for DiffContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// Outcome of a patch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchResult {
    /// Whether the patch produced output.
    pub success: bool,
    /// Patched text on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PatchResult {
    /// A successful result carrying the patched text.
    #[must_use]
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// A failed result carrying an error message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }
}

impl From<PatchError> for PatchResult {
    fn from(error: PatchError) -> Self {
        Self::failure(error.to_string())
    }
}

/// Context supplied by the host when it asks for a tool description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolContext {
    /// Working directory of the host.
    pub cwd: Utf8PathBuf,
    /// Free-form options the host passes through.
    pub tool_options: BTreeMap<String, String>,
}

/// A way of applying a proposed change to a file.
pub trait DiffStrategy {
    /// Stable name of the strategy.
    fn name(&self) -> &'static str;

    /// Describes the strategy and its input contract to the host.
    fn tool_description(&self, context: &ToolContext) -> String;

    /// Applies `diff_content` to `original`.
    fn apply_diff(&self, original: &str, diff_content: &DiffContent) -> PatchResult;
}

/// Settings for [`SemanticDiffStrategy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOptions {
    /// File being patched; its extension selects the grammar.
    pub file: Utf8PathBuf,
    /// Forces tab (or space) indentation instead of the detected style.
    pub use_tabs: Option<bool>,
    /// Forces the indentation width instead of the detected width.
    pub tab_width: Option<usize>,
    /// Patches sources even when the parser had to recover from errors.
    pub allow_syntax_errors: bool,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            file: Utf8PathBuf::from(DEFAULT_TARGET_FILE),
            use_tabs: None,
            tab_width: None,
            allow_syntax_errors: false,
        }
    }
}

impl StrategyOptions {
    /// Options for patching `file` with every other setting at its default.
    #[must_use]
    pub fn for_file(file: impl Into<Utf8PathBuf>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    /// The printer style for `original`: the detected style with any
    /// configured overrides applied.
    #[must_use]
    pub fn indentation_for(&self, original: &str) -> IndentationStyle {
        let detected = detect_indentation_style(original);
        IndentationStyle {
            use_tabs: self.use_tabs.unwrap_or(detected.use_tabs),
            tab_width: self.tab_width.unwrap_or(detected.tab_width),
        }
    }
}

/// Patched text together with how much of the patch applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The printed, patched source.
    pub content: String,
    /// Operations found by the differ.
    pub operations: usize,
    /// What the executor did with them.
    pub report: ApplyReport,
}

/// Applies proposed rewrites as anchored function-body replacements.
#[derive(Debug, Clone, Default)]
pub struct SemanticDiffStrategy {
    options: StrategyOptions,
}

impl SemanticDiffStrategy {
    /// Creates a strategy with `options`.
    #[must_use]
    pub const fn new(options: StrategyOptions) -> Self {
        Self { options }
    }

    /// The options in effect.
    #[must_use]
    pub const fn options(&self) -> &StrategyOptions {
        &self.options
    }

    /// Patches `original` towards `proposed`, returning the patched text and
    /// the executor's report.
    ///
    /// Replacement bodies are moved into the original's indentation style
    /// level for level before they are spliced in.
    ///
    /// # Errors
    ///
    /// Returns an error if either source cannot be parsed, or parses only
    /// with syntax errors while those are not allowed.
    pub fn patch(&self, original: &str, proposed: &str) -> Result<PatchOutcome, PatchError> {
        let style = self.options.indentation_for(original);
        let original_tree = self.parse(original, SourceRole::Original)?;
        let proposed_tree = self
            .parse(proposed, SourceRole::Proposed)?
            .reindented(detect_indentation_style(proposed), style);

        let intention = diff(&original_tree, &proposed_tree);
        let (patched, report) =
            TransactionalExecutor::new(&original_tree).execute_with_report(&intention);
        let content = print(&patched, style);

        info!(
            target: STRATEGY_TARGET,
            file = %self.options.file,
            operations = intention.operations().len(),
            applied = report.applied,
            skipped = report.skipped,
            "semantic patch applied"
        );
        Ok(PatchOutcome {
            content,
            operations: intention.operations().len(),
            report,
        })
    }

    /// Parses one side of a request as the configured file.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` cannot be parsed, or parses only with
    /// syntax errors while those are not allowed.
    pub fn parse(&self, source: &str, role: SourceRole) -> Result<SyntaxTree, PatchError> {
        let tree = parse(source, &self.options.file)
            .map_err(|error| PatchError::parse(role, error))?;
        if self.options.allow_syntax_errors {
            return Ok(tree);
        }
        if let Some(first) = tree.errors().first() {
            return Err(PatchError::syntax_errors(
                role,
                tree.errors().len(),
                first.clone(),
            ));
        }
        Ok(tree)
    }
}

impl DiffStrategy for SemanticDiffStrategy {
    fn name(&self) -> &'static str {
        "SemanticDiffStrategy"
    }

    fn tool_description(&self, context: &ToolContext) -> String {
        let mut description = format!(
            "## {name}\n\
             Applies a proposed rewrite of a TypeScript or JavaScript file as a semantic patch.\n\
             Provide the complete new contents of the file, not a textual diff. Function bodies \
             that changed are located by content hash and replaced in the original file; \
             everything else is kept exactly as it was.\n\
             Working directory: {cwd}\n",
            name = self.name(),
            cwd = context.cwd,
        );
        for (key, value) in &context.tool_options {
            description.push_str(&format!("Option {key}: {value}\n"));
        }
        description
    }

    fn apply_diff(&self, original: &str, diff_content: &DiffContent) -> PatchResult {
        let DiffContent::Text(proposed) = diff_content else {
            debug!(
                target: STRATEGY_TARGET,
                "rejecting structured diff content"
            );
            return PatchError::UnsupportedInput.into();
        };
        self.patch(original, proposed).map_or_else(
            |error| {
                debug!(target: STRATEGY_TARGET, %error, "semantic patch failed");
                error.into()
            },
            |outcome| PatchResult::success(outcome.content),
        )
    }
}
