use core::fmt;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
/// The built-in functions, in table order.
///
/// Built-ins are addressed from bytecode by negative function
/// identifiers: built-in `k` is called as function `-k - 1`. The order
/// below is part of the module ABI.
pub enum Builtin {
    /// Append a space and each argument's string to the output buffer.
    Write = 0,
    /// As [`Builtin::Write`], followed by a newline.
    Writeln = 1,
    /// Formatted write; the first argument is the format string.
    Writef = 2,
    /// Flush output and wait for the host to acknowledge.
    Pause = 3,
    /// Flush output and terminate the session with exit code 0.
    Quit = 4,
    /// Reset every variable to `nil`.
    Reset = 5,
}

impl Builtin {
    /// Number of built-in functions.
    pub const COUNT: usize = 6;

    /// Every built-in, in table order.
    pub const ALL: [Builtin; Builtin::COUNT] = [
        Builtin::Write,
        Builtin::Writeln,
        Builtin::Writef,
        Builtin::Pause,
        Builtin::Quit,
        Builtin::Reset,
    ];

    /// Source-level names, used by the compiler to pre-bind the
    /// built-ins into its function table.
    pub const fn name(&self) -> &'static str {
        match self {
            Builtin::Write => "write",
            Builtin::Writeln => "writeln",
            Builtin::Writef => "writef",
            Builtin::Pause => "pause",
            Builtin::Quit => "quit",
            Builtin::Reset => "reset",
        }
    }

    /// The negative function identifier this built-in is called by.
    pub const fn call_id(&self) -> Value {
        -(*self as u8 as Value) - 1
    }

    /// Resolve a negative function identifier to a built-in, if it is in
    /// range of the table.
    pub fn from_call_id(id: Value) -> Option<Builtin> {
        if id >= 0 {
            return None;
        }
        match -id - 1 {
            0 => Some(Builtin::Write),
            1 => Some(Builtin::Writeln),
            2 => Some(Builtin::Writef),
            3 => Some(Builtin::Pause),
            4 => Some(Builtin::Quit),
            5 => Some(Builtin::Reset),
            _ => None,
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
