//! Interpreter tuning parameters.

use crate::DEFAULT_LINE_WIDTH;

/// Parameters a host passes when constructing an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeParams {
    /// Visible line width for output wrapping, or `None` to disable
    /// wrapping (for non-terminal hosts).
    pub line_width: Option<usize>,
}

impl Default for RuntimeParams {
    fn default() -> Self {
        RuntimeParams {
            line_width: Some(DEFAULT_LINE_WIDTH),
        }
    }
}

impl RuntimeParams {
    /// Parameters without output wrapping.
    pub const fn unwrapped() -> Self {
        RuntimeParams { line_width: None }
    }
}
