//! Lowering of Tree-sitter trees into owned [`SyntaxNode`] trees.
//!
//! Every token keeps the exact text between it and the previous token as
//! leading trivia, so printing the lowered tree reproduces the source. Extra
//! nodes (comments) are not lowered; their text ends up in the trivia of the
//! following token.

use std::sync::Arc;

use crate::tree::{FunctionDeclaration, NodeKind, SyntaxNode, Token};

/// Lowers the tree rooted at `root`, returning the root node and the trivia
/// after the last token.
pub(crate) fn lower(root: tree_sitter::Node<'_>, source: &str) -> (Arc<SyntaxNode>, String) {
    let mut trivia = TriviaCursor::new(source);
    let mut stack = vec![Frame::new(root)];
    let mut finished = None;

    while let Some(frame) = stack.last_mut() {
        if let Some(child) = frame.children.get(frame.next).copied() {
            frame.next = frame.next.saturating_add(1);
            if child.child_count() == 0 {
                frame.lowered.push(Arc::new(trivia.leaf(child)));
            } else {
                stack.push(Frame::new(child));
            }
            continue;
        }

        let Some(done) = stack.pop() else {
            break;
        };
        let node = Arc::new(done.finish(source));
        match stack.last_mut() {
            Some(parent) => parent.lowered.push(node),
            None => finished = Some(node),
        }
    }

    let lowered_root = finished
        .unwrap_or_else(|| Arc::new(SyntaxNode::branch(NodeKind::Other, root.kind(), Vec::new())));
    (lowered_root, trivia.rest())
}

/// A grammar node whose children are being lowered.
struct Frame<'tree> {
    node: tree_sitter::Node<'tree>,
    children: Vec<tree_sitter::Node<'tree>>,
    next: usize,
    lowered: Vec<Arc<SyntaxNode>>,
}

impl<'tree> Frame<'tree> {
    fn new(node: tree_sitter::Node<'tree>) -> Self {
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        Self {
            node,
            lowered: Vec::with_capacity(children.len()),
            children,
            next: 0,
        }
    }

    fn finish(self, source: &str) -> SyntaxNode {
        let kind = classify(self.node, &self.children, source);
        SyntaxNode::branch(kind, self.node.kind(), self.lowered)
    }
}

/// Tracks how much of the source has been attributed to tokens.
struct TriviaCursor<'src> {
    source: &'src str,
    offset: usize,
}

impl<'src> TriviaCursor<'src> {
    const fn new(source: &'src str) -> Self {
        Self { source, offset: 0 }
    }

    fn leaf(&mut self, node: tree_sitter::Node<'_>) -> SyntaxNode {
        let range = node.byte_range();
        let leading = if range.start >= self.offset {
            self.source.get(self.offset..range.start).unwrap_or_default()
        } else {
            ""
        };
        let text = self.source.get(range.clone()).unwrap_or_default();
        self.offset = self.offset.max(range.end);
        SyntaxNode::leaf(node.kind(), Token::new(leading, text))
    }

    fn rest(&self) -> String {
        self.source
            .get(self.offset..)
            .unwrap_or_default()
            .to_owned()
    }
}

/// Maps a grammar node onto the patcher's syntax categories.
fn classify(node: tree_sitter::Node<'_>, children: &[tree_sitter::Node<'_>], source: &str) -> NodeKind {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" | "function_signature" => {
            NodeKind::FunctionDeclaration(FunctionDeclaration {
                name: field_text(node, "name", source),
                is_generator: node.kind() == "generator_function_declaration",
                body: node.child_by_field_name("body").and_then(|body| {
                    children.iter().position(|child| child.id() == body.id())
                }),
            })
        }
        "class_declaration" | "abstract_class_declaration" => NodeKind::ClassDeclaration {
            name: field_text(node, "name", source),
        },
        "method_definition" | "abstract_method_signature" => NodeKind::MethodDeclaration {
            name: field_text(node, "name", source),
        },
        "variable_declarator" => NodeKind::VariableDeclaration {
            name: field_text(node, "name", source),
        },
        "if_statement" => NodeKind::IfStatement {
            condition: condition_text(node, source),
        },
        "while_statement" => NodeKind::WhileStatement {
            condition: condition_text(node, source),
        },
        "for_statement" => NodeKind::ForStatement {
            initializer: clause_text(node, "initializer", source),
            condition: clause_text(node, "condition", source),
            increment: clause_text(node, "increment", source),
        },
        _ => NodeKind::Other,
    }
}

fn field_text(node: tree_sitter::Node<'_>, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|child| source.get(child.byte_range()))
        .map(str::to_owned)
}

/// Condition of an `if` or `while` statement without the parentheses the
/// grammar folds into the field.
fn condition_text(node: tree_sitter::Node<'_>, source: &str) -> String {
    let Some(text) = field_text(node, "condition", source) else {
        return String::new();
    };
    let trimmed = text.trim();
    trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .map_or(trimmed, str::trim)
        .to_owned()
}

/// Clause of a `for` header without its terminating semicolon.
fn clause_text(node: tree_sitter::Node<'_>, field: &str, source: &str) -> Option<String> {
    let text = field_text(node, field, source)?;
    let trimmed = text.trim();
    let clause = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    (!clause.is_empty()).then(|| clause.to_owned())
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use rstest::rstest;

    use crate::parser::parse;
    use crate::tree::{NodeKind, SyntaxNode};

    fn kinds_in(source: &str) -> Vec<NodeKind> {
        let tree = parse(source, Utf8Path::new("sample.ts")).expect("parse");
        tree.root()
            .preorder()
            .map(SyntaxNode::kind)
            .filter(|kind| !matches!(kind, NodeKind::Other))
            .cloned()
            .collect()
    }

    #[test]
    fn lowering_preserves_every_byte() {
        let source = "// header\nfunction add(a, b) {\n    return a + b; // sum\n}\n\n/* tail */\n";
        let tree = parse(source, Utf8Path::new("sample.ts")).expect("parse");

        let mut rebuilt = String::new();
        for token in tree.root().tokens() {
            rebuilt.push_str(token.leading());
            rebuilt.push_str(token.text());
        }
        rebuilt.push_str(tree.trailing_trivia());
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn comments_are_not_children() {
        let tree = parse("/* a */ let x = 1;", Utf8Path::new("sample.ts")).expect("parse");
        assert!(tree.root().preorder().all(|node| node.grammar_kind() != "comment"));
    }

    #[test]
    fn function_declaration_records_name_and_body() {
        let tree =
            parse("function add(a, b) { return a + b; }", Utf8Path::new("sample.ts")).expect("parse");
        let function = tree
            .root()
            .preorder()
            .find(|node| node.as_function().is_some())
            .expect("function node");
        let fields = function.as_function().expect("function fields");

        assert_eq!(fields.name.as_deref(), Some("add"));
        assert!(!fields.is_generator);
        assert!(function.body().is_some_and(|body| body.is_block()));
    }

    #[test]
    fn generator_and_overload_signatures_are_functions() {
        let kinds = kinds_in("function* gen() { yield 1; }\nfunction over(a: string): void;\n");
        let [NodeKind::FunctionDeclaration(generator), NodeKind::FunctionDeclaration(overload)] =
            kinds.as_slice()
        else {
            panic!("expected two function declarations, got {kinds:?}");
        };
        assert!(generator.is_generator);
        assert!(generator.body.is_some());
        assert_eq!(overload.name.as_deref(), Some("over"));
        assert!(overload.body.is_none());
    }

    #[rstest]
    #[case("if (a > b) { x(); }", NodeKind::IfStatement { condition: "a > b".to_owned() })]
    #[case("while ((busy)) { x(); }", NodeKind::WhileStatement { condition: "(busy)".to_owned() })]
    #[case(
        "for (let i = 0; i < n; i++) { x(); }",
        NodeKind::ForStatement {
            initializer: Some("let i = 0".to_owned()),
            condition: Some("i < n".to_owned()),
            increment: Some("i++".to_owned()),
        }
    )]
    #[case(
        "for (;;) { x(); }",
        NodeKind::ForStatement { initializer: None, condition: None, increment: None }
    )]
    fn statements_record_their_header_text(#[case] source: &str, #[case] expected: NodeKind) {
        assert_eq!(kinds_in(source).into_iter().next(), Some(expected));
    }

    #[test]
    fn declarations_record_declared_names() {
        let kinds = kinds_in("class Box { open() {} }\nconst { a, b } = pair;\n");
        assert_eq!(
            kinds,
            vec![
                NodeKind::ClassDeclaration { name: Some("Box".to_owned()) },
                NodeKind::MethodDeclaration { name: Some("open".to_owned()) },
                NodeKind::VariableDeclaration { name: Some("{ a, b }".to_owned()) },
            ]
        );
    }
}
