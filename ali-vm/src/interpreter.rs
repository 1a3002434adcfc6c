//! [`Interpreter`] implementation.

use std::sync::Arc;

use ali_asm::Value;
use ali_module::Module;

use crate::output::OutputBuffer;
use crate::{Host, RuntimeParams, Variables};

mod builtins;
mod command;
mod executor;
mod initialization;
mod invoke;

/// The Ali virtual machine.
///
/// Owns the loaded module, the session's variables, the execution stack
/// and the output buffer. The module is immutable and outlives any
/// single command; variables persist across commands; the stack and the
/// output buffer are reset between commands.
#[derive(Debug)]
pub struct Interpreter<H> {
    module: Arc<Module>,
    vars: Variables,
    stack: Vec<Value>,
    output: OutputBuffer,
    host: H,
    params: RuntimeParams,
}

impl<H> Interpreter<H> {
    /// Create an interpreter for a loaded module. All variables start as
    /// `nil`; call [`Interpreter::reinitialize`] to run the module's
    /// initialization function.
    pub fn new(module: Module, params: RuntimeParams, host: H) -> Self {
        Self::with_shared(Arc::new(module), params, host)
    }

    /// As [`Interpreter::new`], for a module shared between sessions.
    pub fn with_shared(module: Arc<Module>, params: RuntimeParams, host: H) -> Self {
        let vars = Variables::new(module.header());
        Interpreter {
            module,
            vars,
            stack: Vec::new(),
            output: OutputBuffer::new(),
            host,
            params,
        }
    }

    /// The loaded module.
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub(crate) fn module_handle(&self) -> Arc<Module> {
        Arc::clone(&self.module)
    }

    /// The session's variables.
    pub const fn variables(&self) -> &Variables {
        &self.vars
    }

    /// The interpreter parameters.
    pub const fn params(&self) -> &RuntimeParams {
        &self.params
    }

    /// The host, for inspection after a session.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. for transcript bookkeeping
    /// between commands. Must not be used to re-enter the interpreter.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the interpreter, yielding the host.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Current stack height.
    pub fn stack_height(&self) -> usize {
        self.stack.len()
    }

    /// Filter and take the pending output. Non-empty output gains the
    /// trailing blank line the formatter guarantees between turns.
    pub fn take_output(&mut self) -> String {
        let mut text = self.output.take_filtered(self.params.line_width);
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text
    }

    pub(crate) fn vars_mut(&mut self) -> &mut Variables {
        &mut self.vars
    }
}

impl<H: Host> Interpreter<H> {
    /// Present pending output to the host. Used by the `pause` and
    /// `quit` built-ins before their callbacks, and by session drivers
    /// after each command.
    pub fn flush_to_host(&mut self) {
        let text = self.take_output();
        self.host.flush(&text);
    }
}

impl<H> AsRef<Module> for Interpreter<H> {
    fn as_ref(&self) -> &Module {
        &self.module
    }
}
