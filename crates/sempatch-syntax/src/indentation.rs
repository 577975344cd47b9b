//! Indentation style detection and rendering.
//!
//! The detected style only configures how the printer renders indentation
//! runs; it plays no part in diffing or patching.

use std::collections::BTreeMap;

/// Tab width assumed when nothing better can be inferred.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// How indentation is rendered by the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentationStyle {
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
    /// Columns per indentation level (and per tab).
    pub tab_width: usize,
}

impl Default for IndentationStyle {
    fn default() -> Self {
        Self {
            use_tabs: false,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

impl IndentationStyle {
    /// Creates a tab-indented style.
    #[must_use]
    pub const fn tabs(tab_width: usize) -> Self {
        Self {
            use_tabs: true,
            tab_width,
        }
    }

    /// Creates a space-indented style.
    #[must_use]
    pub const fn spaces(tab_width: usize) -> Self {
        Self {
            use_tabs: false,
            tab_width,
        }
    }

    /// Width in columns of an indentation run made of spaces and tabs.
    #[must_use]
    pub fn width_of(&self, run: &str) -> usize {
        run.chars().fold(0usize, |width, ch| match ch {
            '\t' => width.saturating_add(self.tab_width),
            _ => width.saturating_add(1),
        })
    }

    /// Re-renders an indentation run in this style, keeping its width.
    ///
    /// A zero tab width cannot express any indentation, so the run is kept
    /// verbatim.
    #[must_use]
    pub fn render(&self, run: &str) -> String {
        let width = self.width_of(run);
        if !self.use_tabs {
            return if self.tab_width == 0 {
                run.to_owned()
            } else {
                " ".repeat(width)
            };
        }
        match (
            width.checked_div(self.tab_width),
            width.checked_rem(self.tab_width),
        ) {
            (Some(tabs), Some(spaces)) => {
                let mut out = "\t".repeat(tabs);
                out.push_str(&" ".repeat(spaces));
                out
            }
            _ => run.to_owned(),
        }
    }

    /// Re-renders a run written in this style in `target`, keeping its depth
    /// in indentation levels rather than in columns.
    ///
    /// Columns past the last whole level are kept as spaces, so alignment
    /// inside block comments survives.
    #[must_use]
    pub fn convert(&self, run: &str, target: Self) -> String {
        let width = self.width_of(run);
        let (Some(levels), Some(extra)) = (
            width.checked_div(self.tab_width),
            width.checked_rem(self.tab_width),
        ) else {
            return run.to_owned();
        };
        if target.use_tabs {
            let mut out = "\t".repeat(levels);
            out.push_str(&" ".repeat(extra));
            return out;
        }
        " ".repeat(levels.saturating_mul(target.tab_width).saturating_add(extra))
    }
}

/// Infers the indentation style of `source` by majority vote.
///
/// A line counts towards tabs when its leading whitespace contains a tab,
/// and towards spaces when that whitespace, with tabs removed, is longer than
/// one character. Tabs win only on a strict majority. Otherwise the most
/// frequent space-run width is used (the narrowest on ties), falling back to
/// [`DEFAULT_TAB_WIDTH`].
#[must_use]
pub fn detect_indentation_style(source: &str) -> IndentationStyle {
    let mut tab_lines = 0usize;
    let mut space_lines = 0usize;
    let mut widths: BTreeMap<usize, usize> = BTreeMap::new();

    for line in source.split('\n') {
        let run_end = line
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map_or(line.len(), |(index, _)| index);
        let Some(run) = line.get(..run_end) else {
            continue;
        };
        if run.is_empty() {
            continue;
        }
        if run.contains('\t') {
            tab_lines = tab_lines.saturating_add(1);
        }
        if run.contains(' ') {
            let width = run.chars().filter(|ch| *ch != '\t').count();
            if width > 1 {
                space_lines = space_lines.saturating_add(1);
                let count = widths.entry(width).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }

    if tab_lines > space_lines {
        return IndentationStyle::tabs(DEFAULT_TAB_WIDTH);
    }

    let mut best = None;
    for (width, count) in widths {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((width, count));
        }
    }

    IndentationStyle::spaces(best.map_or(DEFAULT_TAB_WIDTH, |(width, _)| width))
}
