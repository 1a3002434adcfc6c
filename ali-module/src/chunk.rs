//! IFF-style chunk framing.
//!
//! Every chunk is a 4-byte ASCII id, a big-endian `u32` payload size
//! (payload bytes only), the payload, and a single zero byte of padding
//! iff the size is odd.

use core::fmt;

use crate::{ByteReader, ByteWriter, ModuleError};

/// A four-byte chunk identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    /// Outer container chunk.
    pub const FORM: ChunkId = ChunkId(*b"FORM");
    /// Form sub-type identifying an Ali module.
    pub const ALI: ChunkId = ChunkId(*b"ALI ");
    /// Module header chunk.
    pub const MOD: ChunkId = ChunkId(*b"MOD ");
    /// String table chunk.
    pub const STR: ChunkId = ChunkId(*b"STR ");
    /// Function table chunk.
    pub const FUN: ChunkId = ChunkId(*b"FUN ");
    /// Word table chunk.
    pub const WRD: ChunkId = ChunkId(*b"WRD ");
    /// Grammar table chunk.
    pub const GRM: ChunkId = ChunkId(*b"GRM ");
    /// Command table chunk.
    pub const CMD: ChunkId = ChunkId(*b"CMD ");
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

/// Read the chunk required at this position, yielding a reader over its
/// payload. Consumes the padding byte of odd-sized chunks and requires it
/// to be zero.
pub(crate) fn read_chunk<'a>(
    r: &mut ByteReader<'a>,
    expected: ChunkId,
) -> Result<ByteReader<'a>, ModuleError> {
    let found = ChunkId(r.read_tag()?);
    if found != expected {
        return Err(ModuleError::UnexpectedChunk { expected, found });
    }
    let size = r.read_u32()?;
    let payload = r
        .take(size as usize)
        .map_err(|_| ModuleError::BadChunkSize { id: expected, size })?;
    if size % 2 == 1 {
        let pad = r.read_u8().map_err(|_| ModuleError::BadChunkSize { id: expected, size })?;
        if pad != 0 {
            return Err(ModuleError::BadPadding { id: expected });
        }
    }
    Ok(ByteReader::new(payload))
}

/// Append a chunk: id, size, payload, and the pad byte when needed.
pub(crate) fn write_chunk(w: &mut ByteWriter, id: ChunkId, payload: &[u8]) {
    w.write_tag(id.0);
    w.write_u32(payload.len() as u32);
    w.write_bytes(payload);
    if payload.len() % 2 == 1 {
        w.write_u8(0);
    }
}

/// Size a chunk occupies in its container, including header and padding.
pub(crate) fn padded_size(payload_len: usize) -> usize {
    8 + payload_len + payload_len % 2
}
