//! The built-in function table.

use ali_asm::{Builtin, Value, VAL_NIL};
use ali_module::Module;

use crate::{Host, Interpreter};

/// Resolve a value to its output string: `nil` renders as `(nil)`, an
/// out-of-range index as `(err)`.
fn resolve_string(module: &Module, value: Value) -> &str {
    if value == VAL_NIL {
        return "(nil)";
    }
    usize::try_from(value)
        .ok()
        .and_then(|index| module.strings().get(index))
        .map(String::as_str)
        .unwrap_or("(err)")
}

impl<H: Host> Interpreter<H> {
    /// Dispatch a built-in. Built-ins never fault; argument problems are
    /// reported through the diagnostic sink and execution continues.
    pub(crate) fn run_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Value {
        match builtin {
            Builtin::Write => self.builtin_write(args),
            Builtin::Writeln => {
                self.builtin_write(args);
                self.output.push_char('\n');
            }
            Builtin::Writef => self.builtin_writef(args),
            Builtin::Pause => {
                if !args.is_empty() {
                    tracing::warn!("arguments to pause() ignored");
                }
                self.flush_to_host();
                self.host.pause();
            }
            Builtin::Quit => {
                if !args.is_empty() {
                    tracing::warn!("arguments to quit() ignored");
                }
                self.flush_to_host();
                self.host.quit(0);
            }
            Builtin::Reset => {
                if !args.is_empty() {
                    tracing::warn!("arguments to reset() ignored");
                }
                self.vars.clear();
            }
        }
        VAL_NIL
    }

    fn builtin_write(&mut self, args: &[Value]) {
        let module = self.module_handle();
        for &arg in args {
            self.output.push_char(' ');
            self.output.push_str(resolve_string(&module, arg));
        }
    }

    fn builtin_writef(&mut self, args: &[Value]) {
        let Some((&format_arg, rest)) = args.split_first() else {
            tracing::error!("writef() called without arguments");
            return;
        };

        let module = self.module_handle();
        let format = resolve_string(&module, format_arg);
        let mut next = rest.iter();
        let mut chars = format.chars();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                self.output.push_char(ch);
                continue;
            }
            match chars.next() {
                // A single % at the end of the string is written as-is.
                None => self.output.push_char('%'),
                Some('%') => self.output.push_char('%'),
                Some('d') | Some('i') => match next.next() {
                    Some(value) => self.output.push_str(&value.to_string()),
                    None => tracing::warn!("too few arguments in call to writef()"),
                },
                Some('s') => match next.next() {
                    Some(&value) => self.output.push_str(resolve_string(&module, value)),
                    None => tracing::warn!("too few arguments in call to writef()"),
                },
                // Unknown formatting characters produce no output.
                Some(_) => {}
            }
        }

        if next.next().is_some() {
            tracing::warn!("too many arguments in call to writef()");
        }
    }
}
