//! Replays an [`IntentionDiff`] against the tree it was derived from.
//!
//! The rewrite builds a new tree in a single pre-order pass and never
//! mutates the original. Subtrees the patch does not touch are shared with
//! the original through their `Arc`s, so only the path from each rewritten
//! declaration up to the root is reallocated.
//!
//! Every node is looked up by its anchor in the original tree. The first
//! operation naming that anchor decides what happens to the node; later
//! operations with the same anchor are never consulted. Operations whose
//! anchor does not occur in the tree are dropped without error.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::debug;

use sempatch_syntax::{SyntaxNode, SyntaxTree};

use crate::anchor::{Anchor, AnchorTable};
use crate::model::{IntentionDiff, SemanticOperation};

/// Tracing target for executor events.
pub const EXECUTOR_TARGET: &str = "sempatch_core::executor";

/// Counts describing how much of a patch found its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Function declarations whose body was replaced.
    pub applied: usize,
    /// Operations that were never applied: unmatched anchors, operations
    /// shadowed by an earlier one with the same anchor, and operation kinds
    /// the executor does not implement.
    pub skipped: usize,
}

/// Applies patches to one original tree.
#[derive(Debug)]
pub struct TransactionalExecutor<'tree> {
    original: &'tree SyntaxTree,
    anchors: AnchorTable<'tree>,
}

impl<'tree> TransactionalExecutor<'tree> {
    /// Prepares an executor for `original`, computing its anchors once.
    #[must_use]
    pub fn new(original: &'tree SyntaxTree) -> Self {
        Self {
            original,
            anchors: AnchorTable::build(original.root()),
        }
    }

    /// Returns a new tree with the operations of `diff` applied.
    #[must_use]
    pub fn execute(&self, diff: &IntentionDiff) -> SyntaxTree {
        self.execute_with_report(diff).0
    }

    /// Like [`Self::execute`], also reporting how many operations applied.
    #[must_use]
    pub fn execute_with_report(&self, diff: &IntentionDiff) -> (SyntaxTree, ApplyReport) {
        let mut pass = Pass {
            anchors: &self.anchors,
            operations: first_operation_per_anchor(diff.operations()),
            used: vec![false; diff.operations().len()],
            applied: 0,
        };
        let new_root = pass.rewrite(self.original.root());

        let report = ApplyReport {
            applied: pass.applied,
            skipped: pass.used.iter().filter(|was_used| !**was_used).count(),
        };
        debug!(
            target: EXECUTOR_TARGET,
            file = %diff.target_file(),
            applied = report.applied,
            skipped = report.skipped,
            "patch executed"
        );
        (self.original.with_root(new_root), report)
    }
}

/// Applies `diff` to `original`, returning the rewritten tree.
#[must_use]
pub fn apply(original: &SyntaxTree, diff: &IntentionDiff) -> SyntaxTree {
    TransactionalExecutor::new(original).execute(diff)
}

/// What to do with a node of the original tree.
enum Step {
    Keep,
    Replaced(Arc<SyntaxNode>),
    Descend,
}

/// State of one execution.
struct Pass<'a> {
    anchors: &'a AnchorTable<'a>,
    operations: HashMap<&'a Anchor, (usize, &'a SemanticOperation)>,
    used: Vec<bool>,
    applied: usize,
}

impl Pass<'_> {
    fn rewrite(&mut self, root: &Arc<SyntaxNode>) -> Arc<SyntaxNode> {
        let mut stack = match self.step(root) {
            Step::Keep => return Arc::clone(root),
            Step::Replaced(replacement) => return replacement,
            Step::Descend => vec![Frame::new(root)],
        };
        let mut finished = Arc::clone(root);

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            if let Some(child) = node.children().get(frame.next) {
                frame.next = frame.next.saturating_add(1);
                match self.step(child) {
                    Step::Keep => frame.push(Arc::clone(child), false),
                    Step::Replaced(replacement) => frame.push(replacement, true),
                    Step::Descend => stack.push(Frame::new(child)),
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let (rebuilt, changed) = done.finish();
            match stack.last_mut() {
                Some(parent) => parent.push(rebuilt, changed),
                None => finished = rebuilt,
            }
        }
        finished
    }

    fn step(&mut self, node: &Arc<SyntaxNode>) -> Step {
        if let Some((position, replacement)) = self.replace(node) {
            if let Some(slot) = self.used.get_mut(position) {
                *slot = true;
            }
            self.applied = self.applied.saturating_add(1);
            return Step::Replaced(replacement);
        }
        if node.children().is_empty() {
            Step::Keep
        } else {
            Step::Descend
        }
    }

    /// Builds the replacement for `node` if the operation registered for its
    /// anchor applies to it, returning the operation's position in the diff.
    fn replace(&self, node: &SyntaxNode) -> Option<(usize, Arc<SyntaxNode>)> {
        let anchor = self.anchors.get(node)?;
        let (position, operation) = self.operations.get(anchor)?;
        match operation {
            SemanticOperation::ReplaceBody { new_body, .. } => {
                let Some(body_index) = node.as_function().and_then(|function| function.body)
                else {
                    debug!(
                        target: EXECUTOR_TARGET,
                        anchor = anchor.short(12),
                        kind = node.grammar_kind(),
                        "matched node has no body to replace"
                    );
                    return None;
                };
                let body = if new_body.is_block() {
                    Arc::clone(new_body)
                } else {
                    Arc::new(SyntaxNode::block_around(Arc::clone(new_body)))
                };
                let replaced = node.with_child(body_index, body)?;
                debug!(
                    target: EXECUTOR_TARGET,
                    anchor = anchor.short(12),
                    "replaced function body"
                );
                Some((*position, Arc::new(replaced)))
            }
            SemanticOperation::AddNode { .. } | SemanticOperation::RemoveNode { .. } => {
                debug!(
                    target: EXECUTOR_TARGET,
                    anchor = anchor.short(12),
                    operation = operation.name(),
                    "operation kind is not applied"
                );
                None
            }
        }
    }
}

/// A node whose children are being rewritten.
struct Frame<'tree> {
    node: &'tree Arc<SyntaxNode>,
    next: usize,
    children: Vec<Arc<SyntaxNode>>,
    changed: bool,
}

impl<'tree> Frame<'tree> {
    fn new(node: &'tree Arc<SyntaxNode>) -> Self {
        Self {
            node,
            next: 0,
            children: Vec::with_capacity(node.children().len()),
            changed: false,
        }
    }

    fn push(&mut self, child: Arc<SyntaxNode>, changed: bool) {
        self.children.push(child);
        self.changed |= changed;
    }

    fn finish(self) -> (Arc<SyntaxNode>, bool) {
        if self.changed {
            (Arc::new(self.node.with_children(self.children)), true)
        } else {
            (Arc::clone(self.node), false)
        }
    }
}

fn first_operation_per_anchor(
    operations: &[SemanticOperation],
) -> HashMap<&Anchor, (usize, &SemanticOperation)> {
    let mut first = HashMap::new();
    for (position, operation) in operations.iter().enumerate() {
        if let Entry::Vacant(slot) = first.entry(operation.target_anchor()) {
            slot.insert((position, operation));
        }
    }
    first
}
