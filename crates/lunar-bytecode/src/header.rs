//! Chunk header verification
//!
//! The header is a capability check: it lets the loader refuse chunks built
//! for other word sizes, byte orders or float encodings before trusting any
//! structural data. Nothing from it is kept after verification.

use tracing::debug;

use crate::error::{BytecodeError, Result, SizeField};
use crate::reader::ChunkReader;

/// Encoded size of the header in bytes
pub const HEADER_SIZE: usize = 4 + 1 + 1 + 6 + 5 + 8 + 8;

/// Reference values a chunk header must match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkFormat {
    /// Escape-prefixed signature
    pub signature: [u8; 4],
    /// `major * 16 + minor`
    pub version: u8,
    /// 0 for the official format
    pub format: u8,
    /// Bytes that catch newline and EOF conversions
    pub data: [u8; 6],
    /// Widths of int, size_t, instruction, integer and float, in header order
    pub sizes: [u8; 5],
    /// Sample integer; catches byte order mismatches
    pub sample_integer: i64,
    /// Sample float; catches non-IEEE-754 producers
    pub sample_float: f64,
}

impl ChunkFormat {
    /// Lua 5.3 on a 64-bit little-endian host
    pub const LUA53: ChunkFormat = ChunkFormat {
        signature: *b"\x1bLUA",
        version: 0x53,
        format: 0,
        data: *b"\x19\x93\r\n\x1a\n",
        sizes: [4, 8, 4, 8, 8],
        sample_integer: 0x5678,
        sample_float: 370.5,
    };

    /// [`ChunkFormat::LUA53`] with the `\x1bLua` signature written by stock `luac`
    pub const LUAC53: ChunkFormat = ChunkFormat {
        signature: *b"\x1bLua",
        ..ChunkFormat::LUA53
    };

    /// Expected width for one header size field
    pub fn size_of(&self, field: SizeField) -> u8 {
        match field {
            SizeField::Int => self.sizes[0],
            SizeField::SizeT => self.sizes[1],
            SizeField::Instruction => self.sizes[2],
            SizeField::Integer => self.sizes[3],
            SizeField::Float => self.sizes[4],
        }
    }

    /// Consume and check a header, stopping at the first mismatching field
    pub fn verify(&self, reader: &mut ChunkReader<'_>) -> Result<()> {
        if reader.read_bytes(4)? != self.signature {
            return Err(BytecodeError::BadSignature);
        }

        let version = reader.read_byte()?;
        if version != self.version {
            return Err(BytecodeError::VersionMismatch {
                expected: self.version,
                found: version,
            });
        }

        let format = reader.read_byte()?;
        if format != self.format {
            return Err(BytecodeError::FormatMismatch {
                expected: self.format,
                found: format,
            });
        }

        if reader.read_bytes(6)? != self.data {
            return Err(BytecodeError::CorruptedMarker);
        }

        for field in SizeField::ALL {
            let expected = self.size_of(field);
            let found = reader.read_byte()?;
            if found != expected {
                return Err(BytecodeError::SizeMismatch {
                    field,
                    expected,
                    found,
                });
            }
        }

        if reader.read_integer()? != self.sample_integer {
            return Err(BytecodeError::EndiannessMismatch);
        }

        // Bitwise, so NaN payloads and signed zeros are exact.
        if reader.read_float()?.to_bits() != self.sample_float.to_bits() {
            return Err(BytecodeError::FloatFormatMismatch);
        }

        debug!(version = self.version, "chunk header verified");
        Ok(())
    }
}

impl Default for ChunkFormat {
    fn default() -> Self {
        Self::LUA53
    }
}
