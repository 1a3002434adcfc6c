//! The invocation protocol: stack layout, arity coercion and result
//! placement for both user functions and built-ins.

use ali_asm::{Builtin, Fault, Value, VAL_NIL};

use crate::{Host, Interpreter, VmError};

impl<H: Host> Interpreter<H> {
    /// Invoke the function whose identifier sits `nargs` slots below the
    /// top of the stack, with the `nargs - 1` slots above it as
    /// arguments.
    ///
    /// On return the whole `[id, args...]` region has been replaced by
    /// `nret` (0 or 1) result values. Argument-count mismatches are
    /// coerced with a warning; a non-existent function identifier is
    /// reported and yields `nil`.
    pub(crate) fn invoke(&mut self, nargs: usize, nret: usize) -> Result<(), VmError> {
        if nargs < 1 {
            return Err(VmError::Invocation(Fault::InvalidCallArity));
        }
        if nret > 1 {
            return Err(VmError::Invocation(Fault::InvalidResultCount));
        }
        if nargs > self.stack.len() {
            return Err(VmError::Invocation(Fault::StackUnderflow));
        }

        let func_id = self.stack[self.stack.len() - nargs];
        let mut args = nargs - 1;
        let base = self.stack.len() - args;

        let result = if func_id < 0 {
            let builtin = Builtin::from_call_id(func_id)
                .ok_or(VmError::Invocation(Fault::UnknownBuiltin))?;
            let arguments: Vec<Value> = self.stack[base..].to_vec();
            self.run_builtin(builtin, &arguments)
        } else {
            let module = self.module_handle();
            match module.function(func_id) {
                None => {
                    tracing::error!(function = func_id, "non-existent function invoked");
                    VAL_NIL
                }
                Some(function) => {
                    let nparam = function.nparam() as usize;
                    if args != nparam {
                        tracing::warn!(
                            function = func_id,
                            parameters = nparam,
                            arguments = args,
                            "argument count adjusted at call site"
                        );
                        while args < nparam {
                            self.push(VAL_NIL).map_err(VmError::Invocation)?;
                            args += 1;
                        }
                        while args > nparam {
                            self.stack.pop();
                            args -= 1;
                        }
                    }

                    let result = self.exec_function(function, func_id, base)?;

                    if nret != function.nret() as usize {
                        tracing::warn!(
                            function = func_id,
                            returns = function.nret(),
                            expected = nret,
                            "return count mismatch at call site"
                        );
                    }
                    result
                }
            }
        };

        // Replace the function id and arguments by the results.
        self.stack.truncate(base - 1);
        if nret == 1 {
            self.push(result).map_err(VmError::Invocation)?;
        }
        Ok(())
    }

    /// Push `id` and `args` and invoke, returning the result value when
    /// one is requested (and `nil` otherwise).
    ///
    /// This is the entry point used for guards, command bodies and the
    /// initialization function; it is also convenient for embedding.
    pub fn call_function(
        &mut self,
        id: Value,
        args: &[Value],
        want_result: bool,
    ) -> Result<Value, VmError> {
        self.push(id).map_err(VmError::Invocation)?;
        for &arg in args {
            self.push(arg).map_err(VmError::Invocation)?;
        }
        self.invoke(1 + args.len(), usize::from(want_result))?;
        if want_result {
            Ok(self.stack.pop().unwrap_or(VAL_NIL))
        } else {
            Ok(VAL_NIL)
        }
    }
}
