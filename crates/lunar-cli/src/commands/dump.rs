//! Dump command - write the loaded chunk as JSON.

use anyhow::Result;
use clap::Args;
use lunar_bytecode::Chunk;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Args)]
pub struct DumpCommand {
    /// Precompiled chunk to dump
    pub file: PathBuf,

    /// Indent the output
    #[arg(long)]
    pub pretty: bool,
}

impl DumpCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let chunk = super::load_chunk(&self.file)?;
        println!("{}", to_json(&chunk, self.pretty || config.dump.pretty)?);
        Ok(())
    }
}

fn to_json(chunk: &Chunk, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(chunk)
    } else {
        serde_json::to_string(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunar_bytecode::{Constant, Instruction, Prototype};

    fn chunk() -> Chunk {
        Chunk {
            upvalue_count: 1,
            main: Prototype {
                source: "=stdin".into(),
                code: vec![Instruction(0x0080_0026)],
                constants: vec![Constant::Integer(3), Constant::String("x".into())].into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_compact_is_single_line() {
        let json = to_json(&chunk(), false).unwrap();
        assert!(!json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["main"]["source"], "=stdin");
        assert_eq!(value["main"]["code"][0], 0x0080_0026);
        assert_eq!(value["main"]["constants"][0]["type"], "integer");
        assert_eq!(value["main"]["constants"][1]["value"], "x");
    }

    #[test]
    fn test_pretty_is_indented() {
        let json = to_json(&chunk(), true).unwrap();
        assert!(json.contains("\n  \"main\""));
    }
}
