//! Numbered play sessions.
//!
//! Each session slot `N` owns a pair of files next to the module: the
//! persistent variables in `savedgame-N.bin` (little-endian 32-bit
//! values, see `ali-vm`'s snapshot format) and a UTF-8 transcript
//! appended to `transcript-N.txt`.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use anyhow::Context;
use ali_vm::{Host, Interpreter};

/// Saved-variables file of a session slot.
pub fn save_path(slot: u32) -> PathBuf {
    PathBuf::from(format!("savedgame-{slot}.bin"))
}

/// Transcript file of a session slot.
pub fn transcript_path(slot: u32) -> PathBuf {
    PathBuf::from(format!("transcript-{slot}.txt"))
}

/// Open the slot's transcript for appending.
pub fn open_transcript(slot: u32) -> anyhow::Result<File> {
    let path = transcript_path(slot);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("unable to open transcript {}", path.display()))
}

/// Restore the slot's saved variables, or start a fresh session when no
/// saved game exists yet.
pub fn restore_or_initialize<H: Host>(
    vm: &mut Interpreter<H>,
    slot: u32,
) -> anyhow::Result<()> {
    let path = save_path(slot);
    if path.exists() {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("unable to read saved game {}", path.display()))?;
        vm.restore(&bytes)
            .with_context(|| format!("corrupt saved game {}", path.display()))?;
        tracing::debug!(slot, "session restored");
    } else {
        vm.reinitialize().context("initialization failed")?;
        tracing::debug!(slot, "session initialized");
    }
    Ok(())
}

/// Persist the session's variables to its slot.
pub fn persist<H: Host>(vm: &Interpreter<H>, slot: u32) -> anyhow::Result<()> {
    let path = save_path(slot);
    std::fs::write(&path, vm.snapshot())
        .with_context(|| format!("unable to write saved game {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_file_names() {
        assert_eq!(save_path(0), PathBuf::from("savedgame-0.bin"));
        assert_eq!(save_path(12), PathBuf::from("savedgame-12.bin"));
        assert_eq!(transcript_path(3), PathBuf::from("transcript-3.txt"));
    }
}
