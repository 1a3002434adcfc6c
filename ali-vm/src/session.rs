//! Session snapshots: the byte-level form of the variable vector used by
//! saved-game files.
//!
//! A snapshot is the flat variable vector serialized as little-endian
//! 32-bit integers, nothing more; the byte order is fixed here and is
//! independent of the (big-endian) module format. Reading and writing the
//! actual files is the host's job.

use ali_asm::Value;
use thiserror::Error;

use crate::{Interpreter, Variables};

/// Errors raised when decoding a session snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot is not a whole number of 32-bit values.
    #[error("snapshot length {len} is not a multiple of 4")]
    RaggedLength {
        /// The offending byte length.
        len: usize,
    },
    /// The snapshot holds a different number of variables than the
    /// module defines.
    #[error("snapshot holds {found} variables, module defines {expected}")]
    LengthMismatch {
        /// Variables the module defines.
        expected: usize,
        /// Variables found in the snapshot.
        found: usize,
    },
}

/// Serialize a variable store to snapshot bytes.
pub fn encode_variables(vars: &Variables) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vars.len() * 4);
    for value in vars.as_slice() {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode snapshot bytes into a variable vector of the expected length.
pub fn decode_variables(bytes: &[u8], expected: usize) -> Result<Vec<Value>, SnapshotError> {
    if bytes.len() % 4 != 0 {
        return Err(SnapshotError::RaggedLength { len: bytes.len() });
    }
    let found = bytes.len() / 4;
    if found != expected {
        return Err(SnapshotError::LengthMismatch { expected, found });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| Value::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

impl<H> Interpreter<H> {
    /// Snapshot the current variables.
    pub fn snapshot(&self) -> Vec<u8> {
        encode_variables(self.variables())
    }

    /// Restore variables from a snapshot taken against the same module.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let expected = self.variables().len();
        let vals = decode_variables(bytes, expected)?;
        self.vars_mut().replace_all(vals);
        Ok(())
    }
}
