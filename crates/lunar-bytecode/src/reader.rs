//! Primitive stream decoding over an in-memory chunk

use crate::error::{BytecodeError, Result};
use crate::string::LuaString;

/// Size byte announcing an 8-byte length prefix
pub const LONG_STRING_MARKER: u8 = 0xFF;

/// Cursor over the bytes of a chunk
///
/// Every read either consumes exactly the bytes it decodes or fails with
/// [`BytecodeError::BufferUnderrun`] and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if the whole buffer was consumed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume the next `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(BytecodeError::BufferUnderrun {
                offset: self.pos,
                needed: n,
                remaining,
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_array_of<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    /// Consume one byte
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        let [b] = self.read_array_of::<1>()?;
        Ok(b)
    }

    /// Consume a little-endian `u32`
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array_of::<4>().map(u32::from_le_bytes)
    }

    /// Consume a little-endian `u64`
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array_of::<8>().map(u64::from_le_bytes)
    }

    /// Consume a Lua integer (8 bytes, two's complement)
    #[inline]
    pub fn read_integer(&mut self) -> Result<i64> {
        self.read_array_of::<8>().map(i64::from_le_bytes)
    }

    /// Consume a Lua number (8 bytes, IEEE-754 binary64)
    #[inline]
    pub fn read_float(&mut self) -> Result<f64> {
        self.read_array_of::<8>().map(f64::from_le_bytes)
    }

    /// Consume a size-prefixed string
    ///
    /// The stored size counts a trailing terminator that is not stored, so
    /// size `s` is followed by `s - 1` bytes. Size 0 is the empty string and
    /// [`LONG_STRING_MARKER`] switches to an 8-byte size.
    pub fn read_string(&mut self) -> Result<LuaString> {
        let start = self.pos;
        self.read_string_inner().inspect_err(|_| self.pos = start)
    }

    fn read_string_inner(&mut self) -> Result<LuaString> {
        let size = match self.read_byte()? {
            0 => return Ok(LuaString::default()),
            LONG_STRING_MARKER => self.read_u64()?,
            short => u64::from(short),
        };
        // A long size of 0 wraps to an unsatisfiable length.
        let len = usize::try_from(size.wrapping_sub(1)).unwrap_or(usize::MAX);
        self.read_bytes(len).map(LuaString::from)
    }

    /// Consume a `u32` element count followed by that many elements
    ///
    /// `min_size` is the smallest encoded size of one element; it caps the
    /// up-front allocation so a bogus count fails on underrun instead of
    /// reserving memory the input cannot back.
    pub fn read_vec<T>(
        &mut self,
        min_size: usize,
        read_one: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let start = self.pos;
        self.read_vec_inner(min_size, read_one).inspect_err(|_| self.pos = start)
    }

    fn read_vec_inner<T>(
        &mut self,
        min_size: usize,
        mut read_one: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        let mut items = Vec::with_capacity(count.min(self.remaining() / min_size.max(1)));
        for _ in 0..count {
            items.push(read_one(self)?);
        }
        Ok(items)
    }
}
