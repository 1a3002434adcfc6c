//! Module load and write error variants.

use crate::ChunkId;
use thiserror::Error;

/// Errors raised while reading or assembling a module.
///
/// Loading never returns a partial module: the first malformed field
/// aborts the whole load with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModuleError {
    /// The data ended before a field could be read.
    #[error("unexpected end of module data")]
    UnexpectedEof,
    /// The outer chunk is not `FORM` with sub-type `ALI `.
    #[error("not an Ali module (missing FORM/ALI signature)")]
    BadSignature,
    /// An inner chunk appeared out of the fixed order.
    #[error("unexpected chunk: expected {expected}, found {found}")]
    UnexpectedChunk {
        /// The chunk id required at this position.
        expected: ChunkId,
        /// The chunk id actually present.
        found: ChunkId,
    },
    /// A chunk's declared size disagrees with its content.
    #[error("chunk {id} has malformed size {size}")]
    BadChunkSize {
        /// The offending chunk.
        id: ChunkId,
        /// The declared payload size.
        size: u32,
    },
    /// A chunk with an odd payload size is not padded with a zero byte.
    #[error("chunk {id} has a malformed padding byte")]
    BadPadding {
        /// The offending chunk.
        id: ChunkId,
    },
    /// The module major version is unsupported.
    #[error("invalid module version: {major}.{minor} (expected: 1.x)")]
    UnsupportedVersion {
        /// Major version found in the header.
        major: u8,
        /// Minor version found in the header.
        minor: u8,
    },
    /// A table count or header field is negative.
    #[error("chunk {id} has a negative count or size field")]
    NegativeCount {
        /// The offending chunk.
        id: ChunkId,
    },
    /// A reserved header field holds a non-zero value.
    #[error("reserved field in chunk {id} is not zero")]
    ReservedField {
        /// The offending chunk.
        id: ChunkId,
    },
    /// A table entry was not zero-terminated within its chunk.
    #[error("string table entry {index} is not zero-terminated")]
    UnterminatedString {
        /// Index of the offending entry.
        index: usize,
    },
    /// A table entry is not valid UTF-8.
    #[error("string table entry {index} is not valid UTF-8")]
    InvalidUtf8 {
        /// Index of the offending entry.
        index: usize,
    },
    /// A word table entry is empty or not in canonical form.
    #[error("word {index} is empty or not canonical")]
    MalformedWord {
        /// Index of the offending word.
        index: usize,
    },
    /// A function header declares a result count other than 0 or 1.
    #[error("function {index} declares {nret} results (expected 0 or 1)")]
    InvalidResultCount {
        /// Index of the offending function.
        index: usize,
        /// The declared result count.
        nret: u8,
    },
    /// The function instruction stream has too few `(0, 0)` terminators,
    /// or instructions remain after the last one.
    #[error("malformed function instruction stream")]
    MalformedCode,
    /// A symbol reference targets a word or rule set that does not exist.
    #[error("symbol reference {reference} is out of range")]
    SymbolOutOfRange {
        /// The encoded reference.
        reference: i32,
    },
    /// A rule set references itself or a higher-indexed rule set.
    #[error("rule set {index} references rule set {target} (grammar must be non-recursive)")]
    ForwardReference {
        /// The referencing rule set.
        index: usize,
        /// The referenced rule set.
        target: usize,
    },
    /// The redundant totals in the grammar chunk do not match its rules.
    #[error("grammar chunk totals disagree with its contents")]
    CountMismatch,
    /// The initialization function identifier is out of range.
    #[error("initialization function {id} does not exist")]
    InitFuncOutOfRange {
        /// The offending identifier.
        id: i32,
    },
    /// The command chunk declares zero command sets.
    #[error("command chunk must contain at least one command set")]
    NoCommandSets,
    /// Data remains after the structure that should consume it.
    #[error("trailing bytes after {context}")]
    TrailingBytes {
        /// What was being read when the extra bytes were found.
        context: &'static str,
    },
}
