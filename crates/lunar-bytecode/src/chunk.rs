//! Precompiled chunk loading

use std::io::Read;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::header::ChunkFormat;
use crate::prototype::Prototype;
use crate::reader::ChunkReader;
use crate::string::LuaString;

/// A loaded chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// Number of upvalues of the main closure
    pub upvalue_count: u8,
    /// Main function
    pub main: Prototype,
}

impl Chunk {
    /// Load a Lua 5.3 chunk
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &ChunkFormat::LUA53)
    }

    /// Load a chunk whose header must match `format`
    pub fn from_bytes_with(bytes: &[u8], format: &ChunkFormat) -> Result<Self> {
        let mut reader = ChunkReader::new(bytes);
        format.verify(&mut reader)?;
        let upvalue_count = reader.read_byte()?;
        let main = Prototype::decode(&mut reader, &LuaString::default())?;

        debug!(
            source = %main.source,
            functions = main.function_count(),
            trailing = reader.remaining(),
            "chunk loaded"
        );

        Ok(Self {
            upvalue_count,
            main,
        })
    }

    /// Read a chunk to the end of `reader` and load it
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Take the main function
    pub fn into_main(self) -> Prototype {
        self.main
    }
}
