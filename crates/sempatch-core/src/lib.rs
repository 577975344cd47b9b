//! Anchored semantic patching.
//!
//! A proposed rewrite of a file is applied as a patch over syntax trees
//! rather than over text:
//!
//! - [`anchor`] hashes a subtree's kind, significant text and child anchors
//!   into a position-independent [`Anchor`]
//! - [`diff`] pairs two trees positionally and emits a
//!   [`SemanticOperation::ReplaceBody`] for every function whose body changed
//! - [`TransactionalExecutor`] rebuilds the original tree with the matched
//!   bodies swapped in, sharing every untouched subtree
//! - [`SemanticDiffStrategy`] wires parsing, diffing, execution and printing
//!   together behind the host-facing [`DiffStrategy`] trait
//!
//! Patches are best-effort: an operation whose anchor does not occur in the
//! original tree is dropped, and only the first operation for an anchor is
//! ever applied.
//!
//! # Example
//!
//! ```
//! use sempatch_core::{DiffContent, DiffStrategy, SemanticDiffStrategy};
//!
//! let strategy = SemanticDiffStrategy::default();
//! let result = strategy.apply_diff(
//!     "function add(a, b) { return a + b; }\n",
//!     &DiffContent::from("function add(a, b) { return a * b; }\n"),
//! );
//! assert_eq!(result.content.as_deref(), Some("function add(a, b) { return a * b; }\n"));
//! ```

mod anchor;
mod differ;
mod error;
mod executor;
mod index;
mod model;
mod strategy;

pub use anchor::{Anchor, AnchorTable, anchor, significant_text};
pub use differ::{DIFF_TARGET, diff};
pub use error::{PatchError, SourceRole};
pub use executor::{ApplyReport, EXECUTOR_TARGET, TransactionalExecutor, apply};
pub use index::AnchorIndex;
pub use model::{IntentionDiff, SemanticOperation};
pub use strategy::{
    DEFAULT_TARGET_FILE, DiffContent, DiffItem, DiffStrategy, PatchOutcome, PatchResult,
    STRATEGY_TARGET, SemanticDiffStrategy, StrategyOptions, ToolContext,
};

#[cfg(test)]
mod tests;
