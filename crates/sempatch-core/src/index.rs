//! Anchor-to-node lookup for a single tree.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use sempatch_syntax::{SyntaxNode, SyntaxTree};

use crate::anchor::{Anchor, AnchorTable};

/// Maps each anchor in a tree to the first node, in pre-order, that has it.
///
/// Identical subtrees collapse onto one entry: lookups only ever see the
/// earliest occurrence.
#[derive(Debug, Default)]
pub struct AnchorIndex<'tree> {
    entries: HashMap<Anchor, &'tree SyntaxNode>,
}

impl<'tree> AnchorIndex<'tree> {
    /// Indexes every node of `tree`.
    #[must_use]
    pub fn build(tree: &'tree SyntaxTree) -> Self {
        let table = AnchorTable::build(tree.root());
        Self::from_table(tree.root(), &table)
    }

    /// Indexes the subtree at `root` using anchors already computed in
    /// `table`.
    #[must_use]
    pub fn from_table(root: &'tree SyntaxNode, table: &AnchorTable<'_>) -> Self {
        let mut entries = HashMap::new();
        for node in root.preorder() {
            let Some(anchor) = table.get(node) else {
                continue;
            };
            if let Entry::Vacant(slot) = entries.entry(anchor.clone()) {
                slot.insert(node);
            }
        }
        Self { entries }
    }

    /// Node registered for `anchor`.
    #[must_use]
    pub fn get(&self, anchor: &Anchor) -> Option<&'tree SyntaxNode> {
        self.entries.get(anchor).copied()
    }

    /// Whether any node of the tree has `anchor`.
    #[must_use]
    pub fn contains(&self, anchor: &Anchor) -> bool {
        self.entries.contains_key(anchor)
    }

    /// Number of distinct anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Anchor, &'tree SyntaxNode)> {
        self.entries.iter().map(|(anchor, node)| (anchor, *node))
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use camino::Utf8Path;
    use sempatch_syntax::parse;

    use super::*;
    use crate::anchor::anchor;

    fn tree(source: &str) -> SyntaxTree {
        parse(source, Utf8Path::new("sample.ts")).expect("parse")
    }

    #[test]
    fn duplicate_subtrees_collapse_to_one_entry() {
        let parsed = tree("function f() { x(); }\nfunction f() { x(); }\n");
        let index = AnchorIndex::build(&parsed);

        let functions: Vec<&SyntaxNode> = parsed
            .root()
            .preorder()
            .filter(|node| node.as_function().is_some())
            .collect();
        let [first, second] = functions.as_slice() else {
            panic!("expected two functions, got {}", functions.len());
        };

        let shared = anchor(first);
        assert_eq!(shared, anchor(second));
        let indexed = index.get(&shared).expect("indexed function");
        assert!(ptr::eq(indexed, *first));
        assert_eq!(
            index.iter().filter(|(key, _)| **key == shared).count(),
            1
        );
    }

    #[test]
    fn index_is_smaller_than_the_tree_when_subtrees_repeat() {
        let parsed = tree("a(); a(); a();");
        let index = AnchorIndex::build(&parsed);
        assert!(index.len() < parsed.root().preorder().count());
        assert!(index.contains(&anchor(parsed.root())));
    }

    #[test]
    fn foreign_anchors_are_absent() {
        let parsed = tree("let a = 1;");
        let other = tree("let b = 2;");
        let index = AnchorIndex::build(&parsed);
        let foreign = other
            .root()
            .preorder()
            .find(|node| node.grammar_kind() == "variable_declarator")
            .map(anchor)
            .expect("declarator");
        assert!(!index.contains(&foreign));
        assert!(index.get(&foreign).is_none());
    }
}
