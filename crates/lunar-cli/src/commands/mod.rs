//! CLI command implementations.

pub mod check;
pub mod dump;
pub mod list;

use anyhow::{Context, Result};
use lunar_bytecode::Chunk;
use std::path::Path;

/// Read and load a chunk, naming the file in any error.
pub fn load_chunk(path: &Path) -> Result<Chunk> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Chunk::from_bytes(&bytes).with_context(|| format!("Failed to load {}", path.display()))
}
