use core::fmt;

use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(clippy::upper_case_acronyms)]
/// Operation codes of the Ali virtual machine.
///
/// The numeric codes are part of the module format and must not change.
/// Code `0` is reserved: a `(0, 0)` instruction terminates a function's
/// instruction list.
pub enum Opcode {
    /// Push the literal argument.
    LLI = 0x01,
    /// Discard the topmost `argument` stack elements.
    POP = 0x02,
    /// Push the local at `base + argument`.
    LDL = 0x03,
    /// Pop a value into the local at `base + argument`.
    STL = 0x04,
    /// Push the variable at index `argument`.
    LDG = 0x05,
    /// Pop a value into the variable at index `argument`.
    STG = 0x06,
    /// Pop an entity number; push the property slot at offset `argument`.
    LDI = 0x07,
    /// Pop a value and an entity number; store into the property slot at
    /// offset `argument`.
    STI = 0x08,
    /// Unconditional jump, relative to the following instruction.
    JMP = 0x09,
    /// Pop a value; jump iff it is not true.
    JNP = 0x0a,
    /// Apply the unary operator identified by the argument.
    OP1 = 0x0b,
    /// Apply the binary operator identified by the argument.
    OP2 = 0x0c,
    /// Apply the ternary operator identified by the argument. No ternary
    /// operators are currently defined.
    OP3 = 0x0d,
    /// Call with `argument % 256` arguments, expecting `argument / 256`
    /// results.
    CAL = 0x0e,
    /// Return `argument` values (0 or 1) to the caller.
    RET = 0x0f,
}

impl Opcode {
    /// The highest assigned operation code.
    pub const MAX: u8 = Opcode::RET as u8;

    /// Three-letter mnemonic, as printed by the module inspector.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::LLI => "LLI",
            Opcode::POP => "POP",
            Opcode::LDL => "LDL",
            Opcode::STL => "STL",
            Opcode::LDG => "LDG",
            Opcode::STG => "STG",
            Opcode::LDI => "LDI",
            Opcode::STI => "STI",
            Opcode::JMP => "JMP",
            Opcode::JNP => "JNP",
            Opcode::OP1 => "OP1",
            Opcode::OP2 => "OP2",
            Opcode::OP3 => "OP3",
            Opcode::CAL => "CAL",
            Opcode::RET => "RET",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = crate::Fault;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        use Opcode::*;
        match b {
            0x01 => Ok(LLI),
            0x02 => Ok(POP),
            0x03 => Ok(LDL),
            0x04 => Ok(STL),
            0x05 => Ok(LDG),
            0x06 => Ok(STG),
            0x07 => Ok(LDI),
            0x08 => Ok(STI),
            0x09 => Ok(JMP),
            0x0a => Ok(JNP),
            0x0b => Ok(OP1),
            0x0c => Ok(OP2),
            0x0d => Ok(OP3),
            0x0e => Ok(CAL),
            0x0f => Ok(RET),
            _ => Err(crate::Fault::UnknownOpcode),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
/// Unary operator identifiers used as the argument of [`Opcode::OP1`].
pub enum UnaryOp {
    /// Logical negation: pushes `true` iff the popped value is not true.
    Not = 1,
}

impl TryFrom<Value> for UnaryOp {
    type Error = crate::Fault;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(UnaryOp::Not),
            _ => Err(crate::Fault::UnknownOperator),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
/// Binary operator identifiers used as the argument of [`Opcode::OP2`].
pub enum BinaryOp {
    /// Boolean conjunction.
    And = 2,
    /// Boolean disjunction.
    Or = 3,
    /// Equality by value.
    Eq = 4,
    /// Inequality by value.
    Neq = 5,
}

impl TryFrom<Value> for BinaryOp {
    type Error = crate::Fault;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            2 => Ok(BinaryOp::And),
            3 => Ok(BinaryOp::Or),
            4 => Ok(BinaryOp::Eq),
            5 => Ok(BinaryOp::Neq),
            _ => Err(crate::Fault::UnknownOperator),
        }
    }
}
