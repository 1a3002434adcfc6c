//! The opcode dispatch loop for a single activation.

use ali_asm::{
    bool_value, is_truthy, BinaryOp, Fault, Instruction, Opcode, UnaryOp, Value, VAL_NIL,
};
use ali_module::Function;

use crate::{Host, Interpreter, VmError, MAX_STACK_SIZE};

/// What an instruction did to the control flow.
enum Flow {
    Advance,
    Jump(usize),
    Return(Value),
    Call { nargs: usize, nret: usize },
}

impl<H> Interpreter<H> {
    /// Push a value, enforcing the stack limit.
    pub(crate) fn push(&mut self, value: Value) -> Result<(), Fault> {
        if self.stack.len() >= MAX_STACK_SIZE {
            return Err(Fault::StackOverflow);
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop a value, never reaching below the activation base.
    fn pop_above(&mut self, base: usize) -> Result<Value, Fault> {
        if self.stack.len() <= base {
            return Err(Fault::StackUnderflow);
        }
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }

    fn fault_at(
        &self,
        fault: Fault,
        function: Value,
        pc: usize,
        instruction: Instruction,
        base: usize,
    ) -> VmError {
        VmError::Fault {
            fault,
            function,
            pc,
            opcode: instruction.opcode_raw(),
            argument: instruction.argument(),
            frame_height: self.stack.len().saturating_sub(base),
        }
    }
}

impl<H: Host> Interpreter<H> {
    /// Execute one function activation until it returns.
    ///
    /// `base` is the stack height on entry; argument slots are locals
    /// `0..nparam`. The frame above `base` is left for the caller to
    /// clean up.
    pub(crate) fn exec_function(
        &mut self,
        function: &Function,
        func_id: Value,
        base: usize,
    ) -> Result<Value, VmError> {
        let code = function.code();
        let mut pc = 0usize;

        loop {
            let Some(&instruction) = code.get(pc) else {
                return Err(self.fault_at(
                    Fault::MissingReturn,
                    func_id,
                    pc,
                    Instruction::TERMINATOR,
                    base,
                ));
            };

            let flow = self
                .step(instruction, pc, code.len(), base)
                .map_err(|fault| self.fault_at(fault, func_id, pc, instruction, base))?;

            match flow {
                Flow::Advance => pc += 1,
                Flow::Jump(target) => pc = target,
                Flow::Return(value) => return Ok(value),
                Flow::Call { nargs, nret } => {
                    self.invoke(nargs, nret).map_err(|e| match e {
                        VmError::Invocation(fault) => {
                            self.fault_at(fault, func_id, pc, instruction, base)
                        }
                        nested => nested,
                    })?;
                    pc += 1;
                }
            }
        }
    }

    fn step(
        &mut self,
        instruction: Instruction,
        pc: usize,
        code_len: usize,
        base: usize,
    ) -> Result<Flow, Fault> {
        let argument = instruction.argument();

        match instruction.opcode()? {
            Opcode::LLI => {
                self.push(argument)?;
                Ok(Flow::Advance)
            }

            Opcode::POP => {
                let count = usize::try_from(argument).map_err(|_| Fault::StackUnderflow)?;
                if self.stack.len() - base < count {
                    return Err(Fault::StackUnderflow);
                }
                self.stack.truncate(self.stack.len() - count);
                Ok(Flow::Advance)
            }

            Opcode::LDL => {
                let slot = local_slot(argument, base, self.stack.len())?;
                self.push(self.stack[slot])?;
                Ok(Flow::Advance)
            }

            Opcode::STL => {
                let value = self.pop_above(base)?;
                let slot = local_slot(argument, base, self.stack.len())?;
                self.stack[slot] = value;
                Ok(Flow::Advance)
            }

            Opcode::LDG => {
                let value = global_index(argument)
                    .and_then(|index| self.vars.get(index))
                    .ok_or(Fault::GlobalOutOfRange)?;
                self.push(value)?;
                Ok(Flow::Advance)
            }

            Opcode::STG => {
                let value = self.pop_above(base)?;
                global_index(argument)
                    .and_then(|index| self.vars.set(index, value))
                    .ok_or(Fault::GlobalOutOfRange)?;
                Ok(Flow::Advance)
            }

            Opcode::LDI => {
                let entity = self.pop_above(base)?;
                let value = self
                    .vars
                    .slot_index(entity, argument)
                    .and_then(|index| self.vars.get(index))
                    .ok_or(Fault::SlotOutOfRange)?;
                self.push(value)?;
                Ok(Flow::Advance)
            }

            Opcode::STI => {
                if self.stack.len() - base < 2 {
                    return Err(Fault::StackUnderflow);
                }
                let value = self.stack[self.stack.len() - 1];
                let entity = self.stack[self.stack.len() - 2];
                let index = self
                    .vars
                    .slot_index(entity, argument)
                    .ok_or(Fault::SlotOutOfRange)?;
                self.vars.set(index, value).ok_or(Fault::SlotOutOfRange)?;
                self.stack.truncate(self.stack.len() - 2);
                Ok(Flow::Advance)
            }

            Opcode::JMP => jump_target(pc, argument, code_len).map(Flow::Jump),

            Opcode::JNP => {
                let value = self.pop_above(base)?;
                if is_truthy(value) {
                    Ok(Flow::Advance)
                } else {
                    jump_target(pc, argument, code_len).map(Flow::Jump)
                }
            }

            Opcode::OP1 => {
                let value = self.pop_above(base)?;
                let result = match UnaryOp::try_from(argument)? {
                    UnaryOp::Not => bool_value(!is_truthy(value)),
                };
                self.push(result)?;
                Ok(Flow::Advance)
            }

            Opcode::OP2 => {
                let rhs = self.pop_above(base)?;
                let lhs = self.pop_above(base)?;
                let result = match BinaryOp::try_from(argument)? {
                    BinaryOp::And => bool_value(is_truthy(rhs) && is_truthy(lhs)),
                    BinaryOp::Or => bool_value(is_truthy(rhs) || is_truthy(lhs)),
                    BinaryOp::Eq => bool_value(rhs == lhs),
                    BinaryOp::Neq => bool_value(rhs != lhs),
                };
                self.push(result)?;
                Ok(Flow::Advance)
            }

            Opcode::OP3 => {
                if self.stack.len() - base < 3 {
                    return Err(Fault::StackUnderflow);
                }
                // No ternary operators are defined.
                Err(Fault::UnknownOperator)
            }

            Opcode::CAL => {
                if argument < 0 {
                    return Err(Fault::InvalidCallArity);
                }
                let nargs = (argument % 256) as usize;
                let nret = (argument / 256) as usize;
                if self.stack.len() - base < nargs {
                    return Err(Fault::StackUnderflow);
                }
                Ok(Flow::Call { nargs, nret })
            }

            Opcode::RET => match argument {
                0 => Ok(Flow::Return(VAL_NIL)),
                1 => self.pop_above(base).map(Flow::Return),
                _ => Err(Fault::InvalidResultCount),
            },
        }
    }
}

/// Resolve a local slot, which must lie inside the current frame.
fn local_slot(argument: i32, base: usize, height: usize) -> Result<usize, Fault> {
    let slot = usize::try_from(argument)
        .ok()
        .and_then(|offset| base.checked_add(offset))
        .ok_or(Fault::LocalOutOfRange)?;
    if slot >= height {
        return Err(Fault::LocalOutOfRange);
    }
    Ok(slot)
}

/// Resolve a variable index from an instruction argument.
fn global_index(argument: i32) -> Option<usize> {
    usize::try_from(argument).ok()
}

/// Jump offsets are relative to the instruction after the jump.
fn jump_target(pc: usize, argument: i32, code_len: usize) -> Result<usize, Fault> {
    let target = pc as i64 + 1 + argument as i64;
    if (0..code_len as i64).contains(&target) {
        Ok(target as usize)
    } else {
        Err(Fault::JumpOutOfRange)
    }
}
