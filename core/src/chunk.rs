//! Line Chunker: split a run sequence into lines at line-break runs
//!
//! Every line-break run closes the current line (excluding itself) and opens
//! the next one, so the line count is always the number of line-break runs
//! plus one. Empty lines hold a single zero-width sentinel run, which gives
//! the view a rendering target without occupying any flat index.
//!
//! # Example
//!
//! ```rust
//! use synckit_editor::chunk::chunk_lines;
//! use synckit_editor::model::AttributedRun;
//!
//! let lines = chunk_lines(&[AttributedRun::plain("aaaa"), AttributedRun::line_break()]);
//! assert_eq!(lines.len(), 2);
//! assert!(lines[1].is_blank());
//! ```

use crate::model::AttributedRun;

/// Runs between two line breaks (or the document edges)
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    runs: Vec<AttributedRun>,
    blank: bool,
}

impl Line {
    fn new(runs: Vec<AttributedRun>) -> Self {
        if runs.is_empty() {
            Self {
                runs: vec![AttributedRun::sentinel()],
                blank: true,
            }
        } else {
            Self { runs, blank: false }
        }
    }

    /// Runs to render; a blank line yields only the sentinel
    pub fn runs(&self) -> &[AttributedRun] {
        &self.runs
    }

    /// True when the line has no content and holds the sentinel run
    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// Flat length excluding the trailing break; 0 for a blank line
    pub fn len(&self) -> usize {
        if self.blank {
            0
        } else {
            self.runs.iter().map(AttributedRun::len).sum()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `runs` into lines
pub fn chunk_lines(runs: &[AttributedRun]) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Vec::new();

    for run in runs {
        if run.is_line_break() {
            lines.push(Line::new(std::mem::take(&mut current)));
        } else if !run.is_empty() {
            current.push(run.clone());
        }
    }
    lines.push(Line::new(current));

    lines
}
