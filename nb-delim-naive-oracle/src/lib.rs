//! A naive, simple oracle implementation for differential testing.
//!
//! Scans characters one at a time instead of running substring replaces.
use nb_delim::{CellType, Notebook, Source};

pub fn normalize_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 1 < chars.len() {
            let replacement = match chars[i + 1] {
                '[' | ']' => Some("$$"),
                '(' | ')' => Some("$"),
                _ => None,
            };
            if let Some(replacement) = replacement {
                out.push_str(replacement);
                i += 2;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Number of two-character delimiters in `line`.
pub fn count_delimiters(line: &str) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut count = 0;
    let mut i = 0;
    while i + 1 < chars.len() {
        if chars[i] == '\\' && matches!(chars[i + 1], '[' | ']' | '(' | ')') {
            count += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    count
}

pub fn normalize_notebook(notebook: &Notebook) -> Notebook {
    let mut out = notebook.clone();
    for cell in &mut out.cells {
        if cell.cell_type != CellType::Markdown {
            continue;
        }
        cell.source = match &cell.source {
            Source::Lines(lines) => {
                Source::Lines(lines.iter().map(|line| normalize_line(line)).collect())
            }
            Source::Text(text) => Source::Text(
                text.split('\n')
                    .map(normalize_line)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Source::Raw(value) => Source::Raw(value.clone()),
        };
    }
    out
}
