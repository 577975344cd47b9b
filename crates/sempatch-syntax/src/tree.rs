//! Owned, immutable syntax trees.
//!
//! Tree-sitter trees borrow their source and cannot be rebuilt piecewise, so
//! parsed sources are lowered into [`SyntaxNode`] values. Children are held
//! behind [`Arc`] so a rewritten tree can reference every unchanged subtree of
//! the tree it was derived from instead of copying it.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::indentation::IndentationStyle;
use crate::language::SupportedLanguage;
use crate::parser::SyntaxErrorInfo;
use crate::printer::reindent_trivia;

/// Grammar kind of a braced statement block.
pub const BLOCK_KIND: &str = "statement_block";

/// Syntax categories the patcher distinguishes, with their kind-specific
/// text.
///
/// Every grammar node that is not one of the listed declarations or
/// statements lowers to [`NodeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A function declaration, overload signature or generator declaration.
    FunctionDeclaration(FunctionDeclaration),
    /// A class declaration.
    ClassDeclaration {
        /// Declared class name, absent for anonymous default exports.
        name: Option<String>,
    },
    /// A method definition inside a class or object literal.
    MethodDeclaration {
        /// Declared method name.
        name: Option<String>,
    },
    /// A single variable declarator (`x = 1` inside `let x = 1`).
    VariableDeclaration {
        /// Declared binding, including destructuring patterns.
        name: Option<String>,
    },
    /// An `if` statement.
    IfStatement {
        /// Condition expression without its surrounding parentheses.
        condition: String,
    },
    /// A C-style `for` statement.
    ForStatement {
        /// Initialiser clause text.
        initializer: Option<String>,
        /// Condition clause text.
        condition: Option<String>,
        /// Increment clause text.
        increment: Option<String>,
    },
    /// A `while` statement.
    WhileStatement {
        /// Condition expression without its surrounding parentheses.
        condition: String,
    },
    /// Any other grammar node or token.
    Other,
}

/// Fields of a function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    /// Declared function name, absent for anonymous default exports.
    pub name: Option<String>,
    /// Whether the declaration is a generator (`function*`).
    pub is_generator: bool,
    /// Index of the body among the node's children.
    pub body: Option<usize>,
}

/// A source token together with the trivia that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    leading: String,
    text: String,
}

impl Token {
    /// Creates a token from its leading trivia and text.
    #[must_use]
    pub fn new(leading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            leading: leading.into(),
            text: text.into(),
        }
    }

    /// Whitespace and comments between the previous token and this one.
    #[must_use]
    pub fn leading(&self) -> &str {
        &self.leading
    }

    /// The token text itself.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A node in a lowered syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: NodeKind,
    grammar_kind: &'static str,
    token: Option<Token>,
    children: Vec<Arc<Self>>,
}

impl SyntaxNode {
    /// Creates an interior node.
    #[must_use]
    pub const fn branch(
        kind: NodeKind,
        grammar_kind: &'static str,
        children: Vec<Arc<Self>>,
    ) -> Self {
        Self {
            kind,
            grammar_kind,
            token: None,
            children,
        }
    }

    /// Creates a leaf node for a single token.
    #[must_use]
    pub const fn leaf(grammar_kind: &'static str, token: Token) -> Self {
        Self {
            kind: NodeKind::Other,
            grammar_kind,
            token: Some(token),
            children: Vec::new(),
        }
    }

    /// Wraps `statement` in a braced block.
    #[must_use]
    pub fn block_around(statement: Arc<Self>) -> Self {
        let open = Arc::new(Self::leaf("{", Token::new(" ", "{")));
        let close = Arc::new(Self::leaf("}", Token::new("\n", "}")));
        Self::branch(NodeKind::Other, BLOCK_KIND, vec![open, statement, close])
    }

    /// The syntax category of this node.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The grammar's name for this node (for tokens, usually the token text).
    #[must_use]
    pub const fn grammar_kind(&self) -> &'static str {
        self.grammar_kind
    }

    /// The token carried by a leaf node.
    #[must_use]
    pub const fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Ordered children of this node.
    #[must_use]
    pub fn children(&self) -> &[Arc<Self>] {
        &self.children
    }

    /// Whether this node is a braced statement block.
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.grammar_kind == BLOCK_KIND
    }

    /// Returns the function fields when this node is a function declaration.
    #[must_use]
    pub const fn as_function(&self) -> Option<&FunctionDeclaration> {
        match &self.kind {
            NodeKind::FunctionDeclaration(function) => Some(function),
            _ => None,
        }
    }

    /// Body of a function declaration, if it has one.
    #[must_use]
    pub fn body(&self) -> Option<&Arc<Self>> {
        self.as_function()
            .and_then(|function| function.body)
            .and_then(|index| self.children.get(index))
    }

    /// Returns a copy of this node with the child at `index` replaced.
    ///
    /// All other fields and children are shared with `self`. Returns `None`
    /// when `index` is out of range.
    #[must_use]
    pub fn with_child(&self, index: usize, child: Arc<Self>) -> Option<Self> {
        let mut children = self.children.clone();
        let slot = children.get_mut(index)?;
        *slot = child;
        Some(self.with_children(children))
    }

    /// Returns a copy of this node with a new child list.
    #[must_use]
    pub fn with_children(&self, children: Vec<Arc<Self>>) -> Self {
        Self {
            kind: self.kind.clone(),
            grammar_kind: self.grammar_kind,
            token: self.token.clone(),
            children,
        }
    }

    /// Concatenated token text of this subtree, without any trivia.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for token in self.tokens() {
            if !out.is_empty() && !token.text().is_empty() {
                out.push(' ');
            }
            out.push_str(token.text());
        }
        out
    }

    /// Tokens of this subtree in source order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.preorder().filter_map(Self::token)
    }

    /// Nodes of this subtree in pre-order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

// The derived drop would recurse once per nesting level; children that are
// uniquely owned are detached onto a work list instead.
impl Drop for SyntaxNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(child) {
                pending.append(&mut node.children);
            }
        }
    }
}

/// Pre-order iterator over a subtree, driven by an explicit stack.
#[derive(Debug)]
pub struct Preorder<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(AsRef::as_ref));
        Some(node)
    }
}

/// A lowered source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: Arc<SyntaxNode>,
    trailing: String,
    file: Utf8PathBuf,
    language: SupportedLanguage,
    errors: Vec<SyntaxErrorInfo>,
}

impl SyntaxTree {
    pub(crate) const fn new(
        root: Arc<SyntaxNode>,
        trailing: String,
        file: Utf8PathBuf,
        language: SupportedLanguage,
        errors: Vec<SyntaxErrorInfo>,
    ) -> Self {
        Self {
            root,
            trailing,
            file,
            language,
            errors,
        }
    }

    /// Root node of the tree.
    #[must_use]
    pub const fn root(&self) -> &Arc<SyntaxNode> {
        &self.root
    }

    /// Trivia after the last token of the file.
    #[must_use]
    pub fn trailing_trivia(&self) -> &str {
        &self.trailing
    }

    /// File the tree was parsed from.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// Language the tree was parsed as.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Syntax errors reported while parsing.
    #[must_use]
    pub fn errors(&self) -> &[SyntaxErrorInfo] {
        &self.errors
    }

    /// Whether the parsed source contained syntax errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns this tree with its indentation converted from `from` to `to`,
    /// level for level.
    ///
    /// Only trivia changes: token text, including multi-line template
    /// literals, is copied as is. Diagnostics are kept because their
    /// positions refer to token text, not to indentation.
    #[must_use]
    pub fn reindented(&self, from: IndentationStyle, to: IndentationStyle) -> Self {
        if from == to {
            return self.clone();
        }
        let map = |token: &Token| {
            Token::new(reindent_trivia(token.leading(), from, to, true), token.text())
        };
        Self {
            root: map_tokens(&self.root, &map),
            trailing: reindent_trivia(&self.trailing, from, to, false),
            file: self.file.clone(),
            language: self.language,
            errors: self.errors.clone(),
        }
    }

    /// Returns a tree for the same file rooted at `root`.
    ///
    /// Parse diagnostics describe the original text, so the derived tree
    /// carries none.
    #[must_use]
    pub fn with_root(&self, root: Arc<SyntaxNode>) -> Self {
        Self {
            root,
            trailing: self.trailing.clone(),
            file: self.file.clone(),
            language: self.language,
            errors: Vec::new(),
        }
    }
}

/// A node whose children are being rebuilt.
struct Rebuild<'a> {
    node: &'a Arc<SyntaxNode>,
    children: Vec<Arc<SyntaxNode>>,
}

impl<'a> Rebuild<'a> {
    fn new(node: &'a Arc<SyntaxNode>) -> Self {
        Self {
            node,
            children: Vec::with_capacity(node.children.len()),
        }
    }

    fn finish<F>(self, map: &F) -> Arc<SyntaxNode>
    where
        F: Fn(&Token) -> Token,
    {
        let mut rebuilt = self.node.with_children(self.children);
        rebuilt.token = self.node.token.as_ref().map(map);
        Arc::new(rebuilt)
    }
}

/// Copies the subtree at `root`, passing every token through `map`.
fn map_tokens<F>(root: &Arc<SyntaxNode>, map: &F) -> Arc<SyntaxNode>
where
    F: Fn(&Token) -> Token,
{
    let mut stack = vec![Rebuild::new(root)];
    loop {
        let Some(frame) = stack.last_mut() else {
            return Arc::clone(root);
        };
        let node = frame.node;
        if let Some(child) = node.children.get(frame.children.len()) {
            stack.push(Rebuild::new(child));
            continue;
        }
        let Some(done) = stack.pop() else {
            return Arc::clone(root);
        };
        let rebuilt = done.finish(map);
        let Some(parent) = stack.last_mut() else {
            return rebuilt;
        };
        parent.children.push(rebuilt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: &'static str, leading: &str, text: &str) -> Arc<SyntaxNode> {
        Arc::new(SyntaxNode::leaf(kind, Token::new(leading, text)))
    }

    fn sample() -> SyntaxNode {
        let body = Arc::new(SyntaxNode::branch(
            NodeKind::Other,
            BLOCK_KIND,
            vec![token("{", " ", "{"), token("}", "", "}")],
        ));
        SyntaxNode::branch(
            NodeKind::FunctionDeclaration(FunctionDeclaration {
                name: Some("f".to_owned()),
                is_generator: false,
                body: Some(2),
            }),
            "function_declaration",
            vec![token("function", "", "function"), token("identifier", " ", "f"), body],
        )
    }

    #[test]
    fn body_resolves_through_child_index() {
        let node = sample();
        let body = node.body().expect("function has a body");
        assert!(body.is_block());
    }

    #[test]
    fn with_child_shares_untouched_children() {
        let node = sample();
        let replacement = Arc::new(SyntaxNode::block_around(token("identifier", " ", "x")));
        let rebuilt = node.with_child(2, replacement).expect("index in range");

        let (Some(before), Some(after)) = (node.children().first(), rebuilt.children().first())
        else {
            panic!("both nodes have children");
        };
        assert!(Arc::ptr_eq(before, after));
        assert_eq!(rebuilt.kind(), node.kind());
        assert_eq!(rebuilt.text(), "function f { x }");
    }

    #[test]
    fn with_child_rejects_out_of_range_index() {
        let node = sample();
        assert!(node.with_child(9, token("identifier", "", "x")).is_none());
    }

    #[test]
    fn preorder_visits_parents_before_children() {
        let node = sample();
        let kinds: Vec<_> = node.preorder().map(SyntaxNode::grammar_kind).collect();
        assert_eq!(
            kinds,
            vec!["function_declaration", "function", "identifier", BLOCK_KIND, "{", "}"]
        );
    }

    #[test]
    fn reindented_trees_keep_their_tokens() {
        let root = Arc::new(sample());
        let tree = SyntaxTree::new(
            Arc::clone(&root),
            "\n".to_owned(),
            Utf8PathBuf::from("a.ts"),
            SupportedLanguage::TypeScript,
            Vec::new(),
        );
        let converted = tree.reindented(IndentationStyle::spaces(2), IndentationStyle::tabs(4));

        assert_eq!(converted.root().text(), root.text());
        assert_eq!(converted.trailing_trivia(), "\n");
        assert!(!Arc::ptr_eq(converted.root(), &root));
    }

    #[test]
    fn deep_chains_drop_without_recursion() {
        let mut node = Arc::new(SyntaxNode::leaf("identifier", Token::new("", "x")));
        for _ in 0..200_000 {
            node = Arc::new(SyntaxNode::branch(
                NodeKind::Other,
                "parenthesized_expression",
                vec![node],
            ));
        }
        drop(node);
    }
}
