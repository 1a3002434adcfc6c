//! Bytecode emission: per-function state, jump patching and the call
//! protocol as seen from the compiler.

use ali_asm::{Instruction, Opcode, Value, VAL_NIL};
use ali_module::Function;

use crate::{CompileError, CompilerContext};

/// State of the function currently being emitted.
#[derive(Debug, Default)]
pub(crate) struct FunctionState {
    name: Option<String>,
    params: Vec<String>,
    nlocals: usize,
    returns_value: bool,
    body: Vec<Instruction>,
    pending_calls: Vec<usize>,
}

impl CompilerContext {
    /// Open a function definition. Command guards and bodies pass no
    /// name; named functions become callable and `initialize` becomes
    /// the module entry point.
    pub fn begin_function(
        &mut self,
        name: Option<&str>,
        returns_value: bool,
    ) -> Result<(), CompileError> {
        if self.current_function.is_some() {
            return Err(CompileError::FunctionAlreadyOpen);
        }
        self.current_function = Some(FunctionState {
            name: name.map(str::to_owned),
            returns_value,
            ..FunctionState::default()
        });
        Ok(())
    }

    /// Declare a formal parameter of the open function.
    pub fn add_parameter(&mut self, name: &str) -> Result<(), CompileError> {
        let state = self.open_function()?;
        state.params.push(name.to_owned());
        Ok(())
    }

    /// Slot of a local variable, creating a fresh local on first use.
    ///
    /// Parameters occupy the leading slots; locals found during the body
    /// extend the frame and are materialized as `LLI -1` prologue
    /// instructions when the function ends.
    pub fn resolve_local(&mut self, name: &str) -> Result<usize, CompileError> {
        let state = self.open_function()?;
        if let Some(slot) = state.params.iter().position(|param| param == name) {
            return Ok(slot);
        }
        state.params.push(name.to_owned());
        state.nlocals += 1;
        Ok(state.params.len() - 1)
    }

    /// Append one instruction to the open function.
    pub fn emit(&mut self, opcode: Opcode, argument: i32) -> Result<(), CompileError> {
        let instruction = Instruction::new(opcode, argument)?;
        self.open_function()?.body.push(instruction);
        Ok(())
    }

    /// Patch the most recent unpatched `JMP`/`JNP` so it lands at the
    /// end of the current instruction list. The back-scan starts
    /// `skip_last` instructions before the end.
    pub fn patch_jump(&mut self, skip_last: usize) -> Result<(), CompileError> {
        let state = self.open_function()?;
        let end = state.body.len();
        let start = end
            .checked_sub(skip_last)
            .ok_or(CompileError::UnmatchedJumpPatch)?;
        for pos in (0..start).rev() {
            let instruction = state.body[pos];
            let opcode = if instruction.opcode_raw() == Opcode::JMP as u8 {
                Opcode::JMP
            } else if instruction.opcode_raw() == Opcode::JNP as u8 {
                Opcode::JNP
            } else {
                continue;
            };
            if instruction.argument() == -1 {
                state.body[pos] = Instruction::new(opcode, (end - pos - 1) as i32)?;
                return Ok(());
            }
        }
        Err(CompileError::UnmatchedJumpPatch)
    }

    /// Resolve a function name in the requested context, checking the
    /// value/procedure distinction.
    pub fn resolve_function(
        &mut self,
        name: &str,
        want_result: bool,
    ) -> Result<Value, CompileError> {
        let (id, returns_value) = if let Some(&id) = self.function_names.get(name) {
            let returns_value = if id < 0 {
                false
            } else {
                self.functions
                    .get(id as usize)
                    .map(|f| f.nret() == 1)
                    .unwrap_or(false)
            };
            (id, returns_value)
        } else if let Some(state) = self
            .current_function
            .as_ref()
            .filter(|state| state.name.as_deref() == Some(name))
        {
            // A recursive call to the function being defined.
            (self.functions.len() as Value, state.returns_value)
        } else {
            return Err(CompileError::UndeclaredFunction {
                name: name.to_owned(),
            });
        };

        if returns_value && !want_result {
            return Err(CompileError::FunctionInStatement {
                name: name.to_owned(),
            });
        }
        if !returns_value && want_result {
            return Err(CompileError::ProcedureInExpression {
                name: name.to_owned(),
            });
        }
        Ok(id)
    }

    /// Open a call: push the callee identifier and start counting
    /// arguments.
    pub fn begin_call(&mut self, name: &str, want_result: bool) -> Result<(), CompileError> {
        let id = self.resolve_function(name, want_result)?;
        self.emit(Opcode::LLI, id)?;
        self.open_function()?.pending_calls.push(0);
        Ok(())
    }

    /// Note one emitted argument of the innermost open call.
    pub fn count_arg(&mut self) -> Result<(), CompileError> {
        let state = self.open_function()?;
        let count = state
            .pending_calls
            .last_mut()
            .ok_or(CompileError::NoOpenCall)?;
        *count += 1;
        Ok(())
    }

    /// Close the innermost call and emit its `CAL`.
    pub fn end_call(&mut self, want_result: bool) -> Result<(), CompileError> {
        let state = self.open_function()?;
        let nargs = state
            .pending_calls
            .pop()
            .ok_or(CompileError::NoOpenCall)?;
        let argument = 256 * i32::from(want_result) + 1 + nargs as i32;
        self.emit(Opcode::CAL, argument)
    }

    /// Emit a `write` of a literal string.
    pub fn emit_write_literal(&mut self, text: &str) -> Result<(), CompileError> {
        self.begin_call("write", false)?;
        let index = self.intern_string(text) as i32;
        self.emit(Opcode::LLI, index)?;
        self.count_arg()?;
        self.end_call(false)
    }

    /// Close the open function: append its return, materialize locals,
    /// and register it in the function table. Returns the function id.
    pub fn end_function(&mut self) -> Result<usize, CompileError> {
        let state = self
            .current_function
            .take()
            .ok_or(CompileError::NoOpenFunction)?;

        let nret = u8::from(state.returns_value);
        let nparam = u8::try_from(state.params.len() - state.nlocals)
            .map_err(|_| CompileError::TooManyParameters)?;

        let mut code = Vec::with_capacity(state.nlocals + state.body.len() + 1);
        for _ in 0..state.nlocals {
            code.push(Instruction::new(Opcode::LLI, VAL_NIL)?);
        }
        code.extend(state.body);
        code.push(Instruction::new(Opcode::RET, i32::from(nret))?);

        let id = self.functions.len();
        if let Some(name) = state.name {
            if self.function_names.contains_key(&name) {
                return Err(CompileError::Redefinition { name });
            }
            self.function_names.insert(name, id as Value);
        }
        self.functions.push(Function::new(nret, nparam, code)?);
        Ok(id)
    }

    pub(crate) fn open_function(&mut self) -> Result<&mut FunctionState, CompileError> {
        self.current_function
            .as_mut()
            .ok_or(CompileError::NoOpenFunction)
    }

    pub(crate) fn force_returns_value(&mut self) -> Result<(), CompileError> {
        self.open_function()?.returns_value = true;
        Ok(())
    }
}
