//! Check command - verify and load a chunk.

use anyhow::Result;
use clap::Args;
use lunar_bytecode::Chunk;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Args)]
pub struct CheckCommand {
    /// Precompiled chunk to check
    pub file: PathBuf,
}

impl CheckCommand {
    pub fn run(&self, _config: &Config) -> Result<()> {
        let chunk = super::load_chunk(&self.file)?;
        println!("{}: {}", self.file.display(), summary(&chunk));
        Ok(())
    }
}

/// One-line description of a loaded chunk
fn summary(chunk: &Chunk) -> String {
    let mut instructions = 0;
    let mut constants = 0;
    chunk.main.walk(&mut |proto, _| {
        instructions += proto.code.len();
        constants += proto.constants.len();
    });

    let name = chunk.main.source_lossy();
    let source = if name.is_empty() { "?" } else { name.as_ref() };
    format!(
        "ok, Lua 5.3 chunk from {source}, {} functions, {instructions} instructions, {constants} constants",
        chunk.main.function_count()
    )
}
