//! Printing of lowered syntax trees back to source text.
//!
//! Tokens are emitted with the trivia they were parsed with, so any region
//! of a tree that came straight from a parse prints exactly as it was read.
//! The only normalisation is indentation: a whitespace run that starts a
//! line and precedes code is re-rendered in the requested
//! [`IndentationStyle`] at the same width. Runs on blank lines and at the end
//! of the file are left alone. The same line walk converts trivia between
//! styles for [`SyntaxTree::reindented`].

use crate::indentation::IndentationStyle;
use crate::tree::SyntaxTree;

/// Prints `tree` as source text using `style` for line indentation.
///
/// Printing is pure: equal trees and styles always produce equal text, and
/// the text parses back to a tree with the same tokens.
#[must_use]
pub fn print(tree: &SyntaxTree, style: IndentationStyle) -> String {
    let mut out = String::new();
    let render = |run: &str| style.render(run);
    for token in tree.root().tokens() {
        push_trivia(&mut out, token.leading(), &render, true);
        out.push_str(token.text());
    }
    push_trivia(&mut out, tree.trailing_trivia(), &render, false);
    out
}

/// Converts the indentation runs of `trivia` from `from` to `to`, level for
/// level, leaving every other character alone.
pub(crate) fn reindent_trivia(
    trivia: &str,
    from: IndentationStyle,
    to: IndentationStyle,
    precedes_token: bool,
) -> String {
    let mut out = String::with_capacity(trivia.len());
    push_trivia(&mut out, trivia, &|run: &str| from.convert(run, to), precedes_token);
    out
}

/// Appends `trivia`, re-rendering the indentation that follows each newline.
///
/// `precedes_token` says whether the end of `trivia` is immediately followed
/// by a token, which makes a final run real indentation.
fn push_trivia<R>(out: &mut String, trivia: &str, render: &R, precedes_token: bool)
where
    R: Fn(&str) -> String,
{
    let mut rest = trivia;
    while let Some(newline) = rest.find('\n') {
        let (line, tail) = rest.split_at(newline.saturating_add(1));
        out.push_str(line);

        let run_len = tail
            .find(|ch: char| ch != ' ' && ch != '\t')
            .unwrap_or(tail.len());
        let (run, after) = tail.split_at(run_len);
        let indents_code = if after.is_empty() {
            precedes_token
        } else {
            !after.starts_with(['\n', '\r'])
        };

        if indents_code && !run.is_empty() {
            out.push_str(&render(run));
        } else {
            out.push_str(run);
        }
        rest = after;
    }
    out.push_str(rest);
}
