//! Tree-sitter powered parsing and printing for semantic patching.
//!
//! This crate turns TypeScript and JavaScript sources into owned, immutable
//! syntax trees and back:
//!
//! - **Parsing** via [`parse`] (or [`Parser`] for direct access to the
//!   Tree-sitter result and its syntax errors)
//! - **Lowering** into [`SyntaxTree`] / [`SyntaxNode`] values whose children
//!   are shared behind `Arc`, so rewritten trees reuse unchanged subtrees
//! - **Printing** via [`print`], which reproduces untouched source byte for
//!   byte and only re-renders line indentation
//! - **Indentation detection** via [`detect_indentation_style`]
//!
//! # Supported Languages
//!
//! - TypeScript and JavaScript (`.ts`, `.mts`, `.cts`, `.js`, `.mjs`, `.cjs`)
//! - TSX and JSX (`.tsx`, `.jsx`)
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use sempatch_syntax::{detect_indentation_style, parse, print};
//!
//! let source = "function add(a, b) {\n    return a + b;\n}\n";
//! let tree = parse(source, Utf8Path::new("math.ts"))?;
//! assert!(!tree.has_errors());
//!
//! let printed = print(&tree, detect_indentation_style(source));
//! assert_eq!(printed, source);
//! # Ok::<(), sempatch_syntax::SyntaxError>(())
//! ```

mod error;
mod indentation;
mod language;
mod lower;
mod parser;
mod position;
mod printer;
mod tree;

pub use error::SyntaxError;
pub use indentation::{DEFAULT_TAB_WIDTH, IndentationStyle, detect_indentation_style};
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo, parse};
pub use printer::print;
pub use tree::{BLOCK_KIND, FunctionDeclaration, NodeKind, Preorder, SyntaxNode, SyntaxTree, Token};
