//! The terminal host: prints flushed output, echoes it to the
//! transcript, and services the `pause` and `quit` callbacks.

use std::fs::File;
use std::io::{self, BufRead, Write};

use ali_vm::Host;

/// Host implementation for an interactive terminal session.
pub struct TerminalHost {
    transcript: Option<File>,
}

impl TerminalHost {
    /// A host that appends every flushed block to `transcript`.
    pub fn new(transcript: Option<File>) -> Self {
        TerminalHost { transcript }
    }

    /// Record a player's input line in the transcript.
    pub fn log_input(&mut self, line: &str) {
        if let Some(file) = &mut self.transcript {
            let _ = writeln!(file, "> {line}\n");
        }
    }
}

impl Host for TerminalHost {
    fn flush(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        print!("{text}");
        let _ = io::stdout().flush();
        if let Some(file) = &mut self.transcript {
            let _ = file.write_all(text.as_bytes());
            let _ = file.flush();
        }
    }

    fn pause(&mut self) {
        println!("Press Enter to continue...");
        let _ = io::stdout().flush();
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }

    fn quit(&mut self, code: i32) {
        std::process::exit(code);
    }
}
