//! Structural differ deriving anchored edits from two versions of a file.
//!
//! Nodes are paired positionally: the two roots unconditionally, then the
//! children of each pair by index up to the shorter child list. Children
//! past that common prefix are never compared, so an insertion or deletion
//! shifts every later sibling out of alignment. Pairs whose anchors match
//! are identical subtrees and are not descended into.

use tracing::debug;

use sempatch_syntax::{SyntaxNode, SyntaxTree};

use crate::anchor::AnchorTable;
use crate::model::{IntentionDiff, SemanticOperation};

/// Tracing target for differ events.
pub const DIFF_TARGET: &str = "sempatch_core::differ";

/// Compares `old` against `new` and returns the edits found, in pre-order
/// discovery order.
///
/// Only changed function bodies produce operations; every other difference
/// is walked past without emitting anything.
#[must_use]
pub fn diff(old: &SyntaxTree, new: &SyntaxTree) -> IntentionDiff {
    let old_anchors = AnchorTable::build(old.root());
    let new_anchors = AnchorTable::build(new.root());
    let mut operations = Vec::new();
    let mut pairs: Vec<(&SyntaxNode, &SyntaxNode)> = vec![(old.root(), new.root())];

    while let Some((old_node, new_node)) = pairs.pop() {
        let (Some(old_anchor), Some(new_anchor)) =
            (old_anchors.get(old_node), new_anchors.get(new_node))
        else {
            continue;
        };
        if old_anchor == new_anchor {
            continue;
        }

        let changed_body = old_node
            .body()
            .zip(new_node.body())
            .filter(|(old_body, new_body)| old_anchors.get(old_body) != new_anchors.get(new_body));
        if let Some((_, new_body)) = changed_body {
            debug!(
                target: DIFF_TARGET,
                anchor = old_anchor.short(12),
                function = function_name(old_node),
                "function body changed"
            );
            operations.push(SemanticOperation::replace_body(
                old_anchor.clone(),
                new_body.clone(),
            ));
        }

        let old_children = old_node.children();
        let new_children = new_node.children();
        if old_children.len() != new_children.len() {
            debug!(
                target: DIFF_TARGET,
                kind = old_node.grammar_kind(),
                old = old_children.len(),
                new = new_children.len(),
                "child counts differ; comparing common prefix only"
            );
        }
        let mut children: Vec<_> = old_children
            .iter()
            .zip(new_children)
            .map(|(old_child, new_child)| (old_child.as_ref(), new_child.as_ref()))
            .collect();
        children.reverse();
        pairs.extend(children);
    }

    debug!(
        target: DIFF_TARGET,
        file = %old.file(),
        operations = operations.len(),
        "diff complete"
    );
    IntentionDiff::new(old.file().to_path_buf(), operations)
}

fn function_name(node: &SyntaxNode) -> &str {
    node.as_function()
        .and_then(|function| function.name.as_deref())
        .unwrap_or("<anonymous>")
}
