//! Command table entries.

use ali_asm::Value;

use crate::SymbolRef;

/// One command: a grammar symbol the player input must derive, an
/// optional guard function, and the body function to invoke.
///
/// A guard of `-1` means the command is always active; otherwise the
/// guard is invoked as a 1-result function and the command is active iff
/// the result is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    /// The symbol matched against the tokenized input.
    pub symbol: SymbolRef,
    /// Guard function identifier, or `-1` for none.
    pub guard: Value,
    /// Body function identifier.
    pub function: Value,
}

impl Command {
    /// Create a command record.
    pub const fn new(symbol: SymbolRef, guard: Value, function: Value) -> Self {
        Command {
            symbol,
            guard,
            function,
        }
    }
}
