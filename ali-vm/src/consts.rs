//! VM parameters.

/// Limit on the size of a story's execution stack.
///
/// Prevents runaway recursion; since every pending invocation keeps at
/// least its function-id slot on the value stack, this also bounds the
/// interpreter's own call depth.
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of words in a player command.
pub const MAX_COMMAND_WORDS: usize = 50;

/// Number of leading global variable slots reserved for the engine.
pub const NUM_RESERVED_GLOBALS: usize = 8;

/// Reserved global holding the story title string.
pub const VAR_TITLE: usize = 0;

/// Reserved global holding the story subtitle string.
pub const VAR_SUBTITLE: usize = 1;

/// Default visible line width used when wrapping output.
pub const DEFAULT_LINE_WIDTH: usize = 80;
