//! Session (re)initialization.

use crate::{Host, Interpreter, VmError};

impl<H: Host> Interpreter<H> {
    /// Reset every variable to `nil` and, if the module names an
    /// initialization function, invoke it with no arguments and no
    /// expected results.
    ///
    /// Called at session start and on an explicit restart; output the
    /// initialization function produces stays in the buffer for the
    /// driver to flush.
    pub fn reinitialize(&mut self) -> Result<(), VmError> {
        self.vars.clear();

        let init = self.module.init_func();
        if init >= 0 {
            self.stack.clear();
            self.call_function(init, &[], false)?;
        }
        Ok(())
    }
}
