//! Runtime interpreter error implementation.

use ali_asm::{Fault, Value};
use ali_module::ModuleError;
use thiserror::Error;

/// Fatal interpreter errors.
///
/// Recoverable conditions (call-site arity mismatches, `writef` argument
/// mismatches, invoking a non-existent function) never surface here; they
/// are reported to the diagnostic sink and execution continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// An instruction could not be executed. Carries the full context the
    /// diagnostic needs: the function, the instruction index within it,
    /// the raw opcode and argument, and the frame height at the fault.
    #[error(
        "instruction {pc} of function {function} (opcode {opcode}, argument {argument}) \
         could not be executed: {fault}; frame height was {frame_height}"
    )]
    Fault {
        /// The underlying fault reason.
        fault: Fault,
        /// Identifier of the function being executed.
        function: Value,
        /// Index of the offending instruction within the function.
        pc: usize,
        /// Raw opcode byte of the offending instruction.
        opcode: u8,
        /// Argument of the offending instruction.
        argument: i32,
        /// Stack height above the activation base at the fault.
        frame_height: usize,
    },
    /// An invocation failed outside of any instruction, e.g. while
    /// seeding the stack for a guard or the initialization function.
    #[error("invocation failed: {0}")]
    Invocation(Fault),
    /// The module was malformed.
    #[error(transparent)]
    Module(#[from] ModuleError),
}

impl VmError {
    /// The underlying fault reason, if any.
    pub const fn fault(&self) -> Option<Fault> {
        match self {
            VmError::Fault { fault, .. } => Some(*fault),
            VmError::Invocation(fault) => Some(*fault),
            VmError::Module(_) => None,
        }
    }
}

impl From<Fault> for VmError {
    fn from(fault: Fault) -> Self {
        VmError::Invocation(fault)
    }
}
