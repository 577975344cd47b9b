//! Content-addressed anchors for syntax subtrees.
//!
//! An anchor is the SHA-256 digest of a node's kind tag, its significant
//! text and the anchors of its children, concatenated in that order with no
//! separators. Anchors carry no position information: identical subtrees
//! anywhere, in any tree, share an anchor.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use serde::Serialize;
use sha2::{Digest, Sha256};

use sempatch_syntax::{NodeKind, SyntaxNode};

/// Fixed-width hexadecimal digest identifying a subtree by content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Anchor(String);

impl Anchor {
    /// Hashes a kind tag, significant text and ordered child anchors.
    #[must_use]
    pub fn digest<'a>(
        kind_tag: &str,
        significant_text: &str,
        child_anchors: impl IntoIterator<Item = &'a Self>,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(kind_tag.as_bytes());
        hasher.update(significant_text.as_bytes());
        for child in child_anchors {
            hasher.update(child.0.as_bytes());
        }
        Self(format!("{:x}", hasher.finalize()))
    }

    /// The anchor as lower-case hexadecimal.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters of the anchor, for log lines.
    #[must_use]
    pub fn short(&self, len: usize) -> &str {
        self.0.get(..len).unwrap_or(&self.0)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind-specific text that distinguishes otherwise similar nodes.
///
/// Nodes outside the recognised declarations and statements contribute
/// nothing, so their anchor depends only on their kind and children.
#[must_use]
pub fn significant_text(node: &SyntaxNode) -> String {
    match node.kind() {
        NodeKind::FunctionDeclaration(function) => labelled("Function", function.name.as_deref()),
        NodeKind::ClassDeclaration { name } => labelled("Class", name.as_deref()),
        NodeKind::MethodDeclaration { name } => labelled("Method", name.as_deref()),
        NodeKind::VariableDeclaration { name } => labelled("Variable", name.as_deref()),
        NodeKind::IfStatement { condition } => format!("If:{condition}"),
        NodeKind::WhileStatement { condition } => format!("While:{condition}"),
        NodeKind::ForStatement {
            initializer,
            condition,
            increment,
        } => format!(
            "For:{};{};{}",
            initializer.as_deref().unwrap_or_default(),
            condition.as_deref().unwrap_or_default(),
            increment.as_deref().unwrap_or_default(),
        ),
        NodeKind::Other => String::new(),
    }
}

fn labelled(label: &str, name: Option<&str>) -> String {
    name.map_or_else(String::new, |declared| format!("{label}:{declared}"))
}

/// Computes the anchor of `node`.
///
/// This walks the whole subtree; callers that need anchors for many nodes of
/// one tree should build an [`AnchorTable`] once instead.
#[must_use]
pub fn anchor(node: &SyntaxNode) -> Anchor {
    let table = AnchorTable::build(node);
    table.get(node).cloned().unwrap_or_else(|| leaf_anchor(node))
}

fn leaf_anchor(node: &SyntaxNode) -> Anchor {
    Anchor::digest(node.grammar_kind(), &significant_text(node), [])
}

/// Anchors for every node of one tree, keyed by node identity.
///
/// Built bottom-up with an explicit stack so deeply nested sources cannot
/// exhaust the call stack. The table borrows the tree so node identities
/// stay valid for as long as it is used.
#[derive(Debug, Default)]
pub struct AnchorTable<'tree> {
    anchors: HashMap<usize, Anchor>,
    tree: PhantomData<&'tree SyntaxNode>,
}

impl<'tree> AnchorTable<'tree> {
    /// Computes anchors for `root` and all of its descendants.
    #[must_use]
    pub fn build(root: &'tree SyntaxNode) -> Self {
        let mut anchors = HashMap::new();
        let mut pending: Vec<(&SyntaxNode, bool)> = vec![(root, false)];

        while let Some((node, children_done)) = pending.pop() {
            if children_done {
                let child_anchors: Vec<&Anchor> = node
                    .children()
                    .iter()
                    .filter_map(|child| anchors.get(&identity(child)))
                    .collect();
                let digest =
                    Anchor::digest(node.grammar_kind(), &significant_text(node), child_anchors);
                anchors.insert(identity(node), digest);
                continue;
            }
            pending.push((node, true));
            pending.extend(node.children().iter().map(|child| (child.as_ref(), false)));
        }

        Self {
            anchors,
            tree: PhantomData,
        }
    }

    /// Anchor of `node`, if it belongs to the tree this table was built from.
    #[must_use]
    pub fn get(&self, node: &SyntaxNode) -> Option<&Anchor> {
        self.anchors.get(&identity(node))
    }

    /// Number of nodes with a computed anchor.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

fn identity(node: &SyntaxNode) -> usize {
    ptr::from_ref(node).addr()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use camino::Utf8Path;
    use rstest::rstest;
    use sempatch_syntax::{SyntaxTree, parse};

    use super::*;

    fn tree(source: &str) -> SyntaxTree {
        parse(source, Utf8Path::new("sample.ts")).expect("parse")
    }

    fn first_function(tree: &SyntaxTree) -> &SyntaxNode {
        tree.root()
            .preorder()
            .find(|node| node.as_function().is_some())
            .expect("function node")
    }

    #[test]
    fn digest_is_a_fixed_width_hex_string() {
        let digest = Anchor::digest("identifier", "", []);
        assert_eq!(digest.as_str().len(), 64);
        assert!(digest.as_str().chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(digest.short(8).len(), 8);
    }

    #[test]
    fn digest_is_deterministic() {
        let child = Anchor::digest("identifier", "", []);
        let first = Anchor::digest("function_declaration", "Function:f", [&child]);
        let second = Anchor::digest("function_declaration", "Function:f", [&child]);
        assert_eq!(first, second);
    }

    #[test]
    fn digest_hashes_the_plain_concatenation() {
        let joined = Anchor::digest("ab", "", []);
        let split = Anchor::digest("a", "b", []);
        assert_eq!(joined, split);
    }

    #[test]
    fn identical_sources_share_root_anchors() {
        let source = "function add(a, b) { return a + b; }";
        assert_eq!(anchor(tree(source).root()), anchor(tree(source).root()));
    }

    #[test]
    fn whitespace_and_comments_do_not_change_anchors() {
        let compact = tree("function add(a,b){return a+b}");
        let spaced = tree("function add(a, b) {\n  // sum\n  return a + b\n}\n");
        assert_eq!(anchor(compact.root()), anchor(spaced.root()));
    }

    #[test]
    fn operators_change_anchors() {
        let sum = tree("function add(a, b) { return a + b; }");
        let product = tree("function add(a, b) { return a * b; }");
        assert_ne!(anchor(sum.root()), anchor(product.root()));
    }

    #[test]
    fn identifier_text_is_not_significant() {
        let left = tree("function f() { return a; }");
        let right = tree("function f() { return b; }");
        assert_eq!(anchor(left.root()), anchor(right.root()));
    }

    #[test]
    fn declared_names_are_significant() {
        let left = tree("function f() {}");
        let right = tree("function g() {}");
        assert_ne!(anchor(first_function(&left)), anchor(first_function(&right)));
    }

    #[rstest]
    #[case("function f() {}", "Function:f")]
    #[case("class Box {}", "Class:Box")]
    #[case("class A { go() {} }", "Method:go")]
    #[case("let total = 0;", "Variable:total")]
    #[case("if (a && b) {}", "If:a && b")]
    #[case("while (running) {}", "While:running")]
    #[case("for (let i = 0; i < 3; i++) {}", "For:let i = 0;i < 3;i++")]
    #[case("for (;;) {}", "For:;;")]
    fn significant_text_follows_the_kind_table(#[case] source: &str, #[case] expected: &str) {
        let parsed = tree(source);
        let texts: Vec<String> = parsed
            .root()
            .preorder()
            .map(significant_text)
            .filter(|text| !text.is_empty())
            .collect();
        assert!(
            texts.iter().any(|text| text == expected),
            "expected {expected:?} among {texts:?}"
        );
    }

    #[test]
    fn table_matches_single_node_computation() {
        let parsed = tree("function f() { if (x) { g(); } }\nconst y = 2;\n");
        let table = AnchorTable::build(parsed.root());

        assert!(!table.is_empty());
        for node in parsed.root().preorder() {
            assert_eq!(table.get(node), Some(&anchor(node)));
        }
    }

    #[test]
    fn table_does_not_know_foreign_nodes() {
        let parsed = tree("const a = 1;");
        let table = AnchorTable::build(parsed.root());
        let foreign = Arc::new(SyntaxNode::branch(NodeKind::Other, "program", Vec::new()));
        assert_eq!(table.get(&foreign), None);
        assert_eq!(table.len(), parsed.root().preorder().count());
    }
}
