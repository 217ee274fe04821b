//! Math delimiter normalization for markdown cells.
//!
//! Rewrites the LaTeX escape delimiters `\[ \]` (display) and `\( \)`
//! (inline) into the dollar convention `$$` and `$`. Matching is literal:
//! only the exact two-character sequences are touched, and only inside
//! markdown cells.

use crate::notebook::{Cell, Notebook, Source};
use serde::Serialize;
use std::borrow::Cow;
use std::ops::AddAssign;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    DisplayOpen,
    DisplayClose,
    InlineOpen,
    InlineClose,
}

impl Delimiter {
    /// Every delimiter, in the order rewrites are applied.
    pub const ALL: [Delimiter; 4] = [
        Delimiter::DisplayOpen,
        Delimiter::DisplayClose,
        Delimiter::InlineOpen,
        Delimiter::InlineClose,
    ];

    pub const fn pattern(self) -> &'static str {
        match self {
            Delimiter::DisplayOpen => r"\[",
            Delimiter::DisplayClose => r"\]",
            Delimiter::InlineOpen => r"\(",
            Delimiter::InlineClose => r"\)",
        }
    }

    pub const fn replacement(self) -> &'static str {
        match self {
            Delimiter::DisplayOpen | Delimiter::DisplayClose => "$$",
            Delimiter::InlineOpen | Delimiter::InlineClose => "$",
        }
    }
}

/// Occurrences of each delimiter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelimiterCounts {
    pub display_open: usize,
    pub display_close: usize,
    pub inline_open: usize,
    pub inline_close: usize,
}

impl DelimiterCounts {
    pub fn get(&self, delimiter: Delimiter) -> usize {
        match delimiter {
            Delimiter::DisplayOpen => self.display_open,
            Delimiter::DisplayClose => self.display_close,
            Delimiter::InlineOpen => self.inline_open,
            Delimiter::InlineClose => self.inline_close,
        }
    }

    fn get_mut(&mut self, delimiter: Delimiter) -> &mut usize {
        match delimiter {
            Delimiter::DisplayOpen => &mut self.display_open,
            Delimiter::DisplayClose => &mut self.display_close,
            Delimiter::InlineOpen => &mut self.inline_open,
            Delimiter::InlineClose => &mut self.inline_close,
        }
    }

    pub fn total(&self) -> usize {
        self.display_open + self.display_close + self.inline_open + self.inline_close
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for DelimiterCounts {
    fn add_assign(&mut self, other: Self) {
        for delimiter in Delimiter::ALL {
            *self.get_mut(delimiter) += other.get(delimiter);
        }
    }
}

/// Per-cell outcome of [`normalize_cell`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellReport {
    pub lines_changed: usize,
    pub replacements: DelimiterCounts,
}

impl CellReport {
    pub fn changed(&self) -> bool {
        self.lines_changed > 0
    }
}

/// Whole-notebook outcome of [`normalize`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub markdown_cells: usize,
    pub cells_changed: usize,
    pub lines_changed: usize,
    pub replacements: DelimiterCounts,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        self.cells_changed == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub notebook: Notebook,
    pub report: NormalizeReport,
}

/// Counts the delimiters [`normalize_line`] would rewrite.
///
/// Replacements never introduce a backslash, so counting on the input gives
/// the same numbers as counting during the sequential rewrite.
pub fn count_delimiters(line: &str) -> DelimiterCounts {
    let mut counts = DelimiterCounts::default();
    if !line.contains('\\') {
        return counts;
    }
    for delimiter in Delimiter::ALL {
        *counts.get_mut(delimiter) = line.matches(delimiter.pattern()).count();
    }
    counts
}

/// Rewrites every delimiter in `line`, borrowing when there is nothing to do.
pub fn normalize_line(line: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(line);
    if !line.contains('\\') {
        return out;
    }
    for delimiter in Delimiter::ALL {
        if out.contains(delimiter.pattern()) {
            out = Cow::Owned(out.replace(delimiter.pattern(), delimiter.replacement()));
        }
    }
    out
}

fn normalize_text(text: &str, report: &mut CellReport) -> String {
    let counts = count_delimiters(text);
    if counts.is_zero() {
        return text.to_string();
    }
    report.lines_changed += 1;
    report.replacements += counts;
    normalize_line(text).into_owned()
}

/// Rewrites a cell source.
///
/// A `Text` source is rewritten as one blob; no delimiter spans a newline,
/// so this matches rewriting it line by line. `lines_changed` counts
/// changed entries of a `Lines` source and changed `\n`-separated lines of
/// a `Text` source. A `Raw` source is not text and is returned unchanged.
pub fn normalize_source(source: &Source) -> (Source, CellReport) {
    let mut report = CellReport::default();
    let source = match source {
        Source::Lines(lines) => Source::Lines(
            lines
                .iter()
                .map(|line| normalize_text(line, &mut report))
                .collect(),
        ),
        Source::Text(text) => {
            for line in text.split('\n') {
                let counts = count_delimiters(line);
                if !counts.is_zero() {
                    report.lines_changed += 1;
                    report.replacements += counts;
                }
            }
            Source::Text(normalize_line(text).into_owned())
        }
        Source::Raw(value) => Source::Raw(value.clone()),
    };
    (source, report)
}

/// Rewrites a markdown cell. Any other cell is returned as-is without
/// looking at its source.
pub fn normalize_cell(cell: &Cell) -> (Cell, CellReport) {
    if !cell.is_markdown() {
        return (cell.clone(), CellReport::default());
    }
    let (source, report) = normalize_source(&cell.source);
    let mut out = cell.clone();
    out.source = source;
    (out, report)
}

/// Rewrites every markdown cell of `notebook` into a new notebook.
///
/// Cell count, order, types and all non-source fields are carried over
/// unchanged.
pub fn normalize(notebook: &Notebook) -> Normalized {
    let mut report = NormalizeReport::default();
    let cells = notebook
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let (cell, cell_report) = normalize_cell(cell);
            if cell.is_markdown() {
                report.markdown_cells += 1;
            }
            if cell_report.changed() {
                debug!(
                    cell = index,
                    lines = cell_report.lines_changed,
                    replacements = cell_report.replacements.total(),
                    "rewrote math delimiters"
                );
                report.cells_changed += 1;
                report.lines_changed += cell_report.lines_changed;
                report.replacements += cell_report.replacements;
            }
            cell
        })
        .collect();
    Normalized {
        notebook: notebook.with_cells(cells),
        report,
    }
}
