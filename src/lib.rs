//! nb-delim: rewrite LaTeX escape math delimiters in notebook markdown cells.
//!
//! Notebook markdown written for LaTeX-aware renderers often uses `\[ ... \]`
//! and `\( ... \)` for math. This crate rewrites those delimiters to the
//! dollar convention (`$$ ... $$` and `$ ... $`) while leaving every other
//! part of the notebook untouched:
//!
//! - **Notebook model** - typed cells that keep unknown fields and key order
//! - **Normalizer** - pure rewrite of markdown cell sources, with a report
//! - **File I/O** - load from an explicit path, atomic save with 2-space indent
//!
//! # Quick Start
//!
//! ```rust
//! use nb_delim::{Cell, Notebook, normalize};
//!
//! let notebook = Notebook::new(vec![
//!     Cell::markdown(vec![r"Energy \(E\) satisfies \[E=mc^2\]"]),
//!     Cell::code(vec![r"print('\(kept\)')"]),
//! ]);
//!
//! let normalized = normalize(&notebook);
//! assert_eq!(normalized.report.cells_changed, 1);
//! assert_eq!(
//!     normalized.notebook.cells[0].source.text(),
//!     "Energy $E$ satisfies $$E=mc^2$$"
//! );
//! ```
//!
//! # Features
//!
//! - `cli` - Builds the `nb-delim` binary (clap and tracing-subscriber)

// Notebook document model and file I/O
pub mod notebook;

// Delimiter rewriting
pub mod normalize;

pub use normalize::{
    CellReport, Delimiter, DelimiterCounts, NormalizeReport, Normalized, count_delimiters,
    normalize, normalize_cell, normalize_line, normalize_source,
};

pub use notebook::io::{load, save};
pub use notebook::{Cell, CellType, Notebook, NotebookError, Source};
