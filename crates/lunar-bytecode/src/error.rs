//! Bytecode errors

use std::fmt;

use thiserror::Error;

/// Native width declared in the chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeField {
    /// C `int`
    Int,
    /// C `size_t`
    SizeT,
    /// VM instruction word
    Instruction,
    /// Lua integer
    Integer,
    /// Lua float
    Float,
}

impl SizeField {
    /// Header fields in on-disk order
    pub const ALL: [SizeField; 5] = [
        SizeField::Int,
        SizeField::SizeT,
        SizeField::Instruction,
        SizeField::Integer,
        SizeField::Float,
    ];

    /// Name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::SizeT => "size_t",
            Self::Instruction => "instruction",
            Self::Integer => "lua integer",
            Self::Float => "lua number",
        }
    }
}

impl fmt::Display for SizeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur while loading a chunk or decoding an instruction
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// First four bytes are not the precompiled chunk signature
    #[error("not a precompiled chunk")]
    BadSignature,

    /// Chunk was produced by a different VM version
    #[error("version mismatch: expected {expected:#04x}, found {found:#04x}")]
    VersionMismatch {
        /// Version this loader accepts
        expected: u8,
        /// Version stored in the chunk
        found: u8,
    },

    /// Chunk uses a non-official format
    #[error("format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        /// Format this loader accepts
        expected: u8,
        /// Format stored in the chunk
        found: u8,
    },

    /// Conversion-detection marker was altered
    #[error("corrupted chunk")]
    CorruptedMarker,

    /// Producer declared a native width this loader cannot use
    #[error("{field} size mismatch: expected {expected}, found {found}")]
    SizeMismatch {
        /// Which width disagreed
        field: SizeField,
        /// Width this loader accepts
        expected: u8,
        /// Width stored in the chunk
        found: u8,
    },

    /// Sample integer did not decode to the expected value
    #[error("endianness mismatch")]
    EndiannessMismatch,

    /// Sample float did not decode to the expected value
    #[error("float format mismatch")]
    FloatFormatMismatch,

    /// Constant pool entry carries an unknown type tag
    #[error("unknown constant tag: {0:#04x}")]
    UnknownConstantTag(u8),

    /// Read past the end of the input
    #[error("truncated chunk: need {needed} bytes at offset {offset}, {remaining} remaining")]
    BufferUnderrun {
        /// Cursor position when the read was attempted
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// Opcode has no entry in the opcode table
    #[error("invalid opcode: {0}")]
    InvalidOpcode(u8),

    /// IO error while buffering a chunk
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Payload-free discriminant of [`BytecodeError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`BytecodeError::BadSignature`]
    BadSignature,
    /// See [`BytecodeError::VersionMismatch`]
    VersionMismatch,
    /// See [`BytecodeError::FormatMismatch`]
    FormatMismatch,
    /// See [`BytecodeError::CorruptedMarker`]
    CorruptedMarker,
    /// See [`BytecodeError::SizeMismatch`]
    SizeMismatch(SizeField),
    /// See [`BytecodeError::EndiannessMismatch`]
    EndiannessMismatch,
    /// See [`BytecodeError::FloatFormatMismatch`]
    FloatFormatMismatch,
    /// See [`BytecodeError::UnknownConstantTag`]
    UnknownConstantTag,
    /// See [`BytecodeError::BufferUnderrun`]
    BufferUnderrun,
    /// See [`BytecodeError::InvalidOpcode`]
    InvalidOpcode,
    /// See [`BytecodeError::Io`]
    Io,
}

impl BytecodeError {
    /// The error's kind, without payload
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadSignature => ErrorKind::BadSignature,
            Self::VersionMismatch { .. } => ErrorKind::VersionMismatch,
            Self::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            Self::CorruptedMarker => ErrorKind::CorruptedMarker,
            Self::SizeMismatch { field, .. } => ErrorKind::SizeMismatch(*field),
            Self::EndiannessMismatch => ErrorKind::EndiannessMismatch,
            Self::FloatFormatMismatch => ErrorKind::FloatFormatMismatch,
            Self::UnknownConstantTag(_) => ErrorKind::UnknownConstantTag,
            Self::BufferUnderrun { .. } => ErrorKind::BufferUnderrun,
            Self::InvalidOpcode(_) => ErrorKind::InvalidOpcode,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message() {
        let err = BytecodeError::SizeMismatch {
            field: SizeField::SizeT,
            expected: 8,
            found: 4,
        };
        assert_eq!(err.to_string(), "size_t size mismatch: expected 8, found 4");
        assert_eq!(err.kind(), ErrorKind::SizeMismatch(SizeField::SizeT));
    }

    #[test]
    fn test_unknown_tag_message() {
        let err = BytecodeError::UnknownConstantTag(0x02);
        assert_eq!(err.to_string(), "unknown constant tag: 0x02");
    }
}
