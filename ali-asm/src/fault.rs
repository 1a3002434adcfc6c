use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
/// Fatal fault reasons raised by the interpreter.
///
/// A fault aborts the current session; the conditions the interpreter can
/// recover from (arity mismatches at call sites, `writef` argument
/// mismatches) are reported through the diagnostic sink instead and never
/// appear here.
pub enum Fault {
    /// A push would grow the stack beyond its limit.
    StackOverflow,
    /// A pop or frame access reached below the activation base.
    StackUnderflow,
    /// A local slot index is outside the current frame.
    LocalOutOfRange,
    /// A variable index is outside the variable store.
    GlobalOutOfRange,
    /// An entity/property address is outside the variable store.
    SlotOutOfRange,
    /// A jump target is outside the function's instruction list.
    JumpOutOfRange,
    /// The opcode byte is not assigned.
    UnknownOpcode,
    /// The operator identifier is not assigned for this arity.
    UnknownOperator,
    /// A call was made with fewer than one argument slot.
    InvalidCallArity,
    /// A call or return names a result count other than 0 or 1.
    InvalidResultCount,
    /// A negative function identifier is outside the built-in table.
    UnknownBuiltin,
    /// Execution ran past the last instruction without returning.
    MissingReturn,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for Fault {}
