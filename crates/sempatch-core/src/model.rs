//! Patch model shared by the differ and the executor.
//!
//! Payload subtrees are taken directly from the proposed tree; they are never
//! printed and re-parsed on the way to the executor.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use sempatch_syntax::SyntaxNode;

use crate::anchor::Anchor;

/// A single anchored edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SemanticOperation {
    /// Replace the body of the function declaration with `target_anchor`.
    ReplaceBody {
        /// Anchor of the function declaration in the original tree.
        target_anchor: Anchor,
        /// Body subtree from the proposed tree.
        new_body: Arc<SyntaxNode>,
    },
    /// Insert a node relative to `target_anchor`.
    ///
    /// Representable but not applied: the executor ignores it.
    AddNode {
        /// Anchor of the node the insertion is relative to.
        target_anchor: Anchor,
        /// Node to insert.
        new_node: Arc<SyntaxNode>,
    },
    /// Remove the node with `target_anchor`.
    ///
    /// Representable but not applied: the executor ignores it.
    RemoveNode {
        /// Anchor of the node to remove.
        target_anchor: Anchor,
    },
}

impl SemanticOperation {
    /// Creates a body replacement.
    #[must_use]
    pub const fn replace_body(target_anchor: Anchor, new_body: Arc<SyntaxNode>) -> Self {
        Self::ReplaceBody {
            target_anchor,
            new_body,
        }
    }

    /// Anchor the operation targets.
    #[must_use]
    pub const fn target_anchor(&self) -> &Anchor {
        match self {
            Self::ReplaceBody { target_anchor, .. }
            | Self::AddNode { target_anchor, .. }
            | Self::RemoveNode { target_anchor } => target_anchor,
        }
    }

    /// Short name of the operation kind, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReplaceBody { .. } => "replace_body",
            Self::AddNode { .. } => "add_node",
            Self::RemoveNode { .. } => "remove_node",
        }
    }
}

/// The edits that turn one version of a file into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentionDiff {
    target_file: Utf8PathBuf,
    operations: Vec<SemanticOperation>,
}

impl IntentionDiff {
    /// Creates a diff for `target_file`.
    #[must_use]
    pub const fn new(target_file: Utf8PathBuf, operations: Vec<SemanticOperation>) -> Self {
        Self {
            target_file,
            operations,
        }
    }

    /// File the operations apply to.
    #[must_use]
    pub fn target_file(&self) -> &Utf8Path {
        &self.target_file
    }

    /// Operations in discovery order.
    #[must_use]
    pub fn operations(&self) -> &[SemanticOperation] {
        &self.operations
    }

    /// Whether the diff contains no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
