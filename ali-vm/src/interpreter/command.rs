//! The command dispatcher: tokenization, grammar matching, guard
//! evaluation and ambiguity resolution.

use ali_asm::{is_truthy, Value};
use ali_module::normalize;

use crate::{CommandOutcome, Host, Interpreter, VmError, MAX_COMMAND_WORDS};

impl<H: Host> Interpreter<H> {
    /// Dispatch one player command line.
    ///
    /// The line is normalized and tokenized against the word table, then
    /// matched against every command record; all guards of matching
    /// records are evaluated before the outcome is decided, so ambiguity
    /// detection does not depend on command order. The outcome's
    /// user-visible message (if any) is written to the output buffer.
    pub fn perform_command(&mut self, line: &str) -> Result<CommandOutcome, VmError> {
        self.stack.clear();
        self.output.clear();

        let tokens = match self.tokenize(line) {
            Ok(tokens) => tokens,
            Err(outcome) => return Ok(outcome),
        };
        if tokens.is_empty() {
            return Ok(CommandOutcome::Empty);
        }

        let module = self.module_handle();
        let mut num_matched = 0usize;
        let mut num_active = 0usize;
        let mut body: Option<Value> = None;

        for command in module.commands() {
            if !module.grammar().derives(command.symbol, &tokens) {
                continue;
            }
            num_matched += 1;

            let active = command.guard < 0 || self.evaluate_guard(command.guard)?;
            if active {
                num_active += 1;
                if body.is_none() {
                    body = Some(command.function);
                }
            }
        }

        tracing::debug!(tokens = tokens.len(), num_matched, num_active, "command dispatched");

        if num_matched == 0 {
            self.output.push_str("You can't do that in this game.\n");
            return Ok(CommandOutcome::NoMatch);
        }
        if num_active == 0 {
            self.output.push_str("That's not possible right now.\n");
            return Ok(CommandOutcome::Inactive);
        }
        if num_active > 1 {
            self.output.push_str("That command is ambiguous.\n");
            return Ok(CommandOutcome::Ambiguous);
        }

        if let Some(function) = body {
            self.call_function(function, &[], false)?;
        }
        Ok(CommandOutcome::Executed)
    }

    /// Map a raw line to word indices. On failure the refusal message is
    /// already in the output buffer and the outcome is returned as the
    /// error.
    fn tokenize(&mut self, line: &str) -> Result<Vec<usize>, CommandOutcome> {
        let mut tokens = Vec::new();
        for raw in line.split_whitespace() {
            let canonical = normalize(raw);
            if canonical.is_empty() {
                continue;
            }
            match self.module.words().lookup(&canonical) {
                Some(index) => tokens.push(index),
                None => {
                    self.output.push_str("Unknown word: ");
                    self.output.push_str(raw);
                    self.output.push_char('\n');
                    return Err(CommandOutcome::UnknownWord);
                }
            }
        }
        if tokens.len() > MAX_COMMAND_WORDS {
            self.output.push_str("That command is too long.\n");
            return Err(CommandOutcome::TooManyWords);
        }
        Ok(tokens)
    }

    /// A guard of `-1` (or any identifier outside the function table)
    /// never blocks loading the command list; out-of-range guards simply
    /// leave the command inactive.
    fn evaluate_guard(&mut self, guard: Value) -> Result<bool, VmError> {
        if self.module.function(guard).is_none() {
            return Ok(false);
        }
        let result = self.call_function(guard, &[], true)?;
        Ok(is_truthy(result))
    }
}
