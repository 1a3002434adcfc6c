//! Host callback contract.

/// Callbacks the interpreter makes into its embedding host.
///
/// The interpreter guarantees the output buffer has been filtered and
/// presented through [`Host::flush`] before [`Host::pause`] or
/// [`Host::quit`] is called. The host must not call back into the
/// interpreter from within these callbacks.
pub trait Host {
    /// Receive a block of filtered output. May be called with an empty
    /// string when a flush point produced no text.
    fn flush(&mut self, text: &str);

    /// The `pause` built-in: return once the player has acknowledged.
    fn pause(&mut self);

    /// The `quit` built-in: end the session. A terminal host typically
    /// terminates the process here; a host that returns instead should
    /// stop its command loop.
    fn quit(&mut self, code: i32);
}

/// A host that records every callback, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    /// Every non-empty block flushed so far, in order.
    pub flushed: Vec<String>,
    /// Number of `pause` callbacks received.
    pub pauses: usize,
    /// Exit code of the first `quit` callback, if any.
    pub quit: Option<i32>,
}

impl Host for RecordingHost {
    fn flush(&mut self, text: &str) {
        if !text.is_empty() {
            self.flushed.push(text.to_owned());
        }
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn quit(&mut self, code: i32) {
        if self.quit.is_none() {
            self.quit = Some(code);
        }
    }
}
