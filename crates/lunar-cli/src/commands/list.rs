//! List command - print a `luac -l` style listing.

use anyhow::{Context, Result};
use clap::Args;
use lunar_bytecode::instruction::{constant_index, is_constant};
use lunar_bytecode::{
    Constant, DecodedInstruction, LuaString, OPCODES, OpArgMode, Operands, Prototype,
};
use std::fmt::Write;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Args)]
pub struct ListCommand {
    /// Precompiled chunk to list
    pub file: PathBuf,

    /// Print each function's constant pool
    #[arg(long)]
    pub constants: bool,

    /// Print each function's local variables
    #[arg(long)]
    pub locals: bool,

    /// Print each function's upvalues
    #[arg(long)]
    pub upvalues: bool,
}

/// Detail sections to print after each function's code
#[derive(Debug, Clone, Copy, Default)]
struct Sections {
    constants: bool,
    locals: bool,
    upvalues: bool,
}

impl ListCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let chunk = super::load_chunk(&self.file)?;
        let sections = Sections {
            constants: self.constants || config.listing.constants,
            locals: self.locals || config.listing.locals,
            upvalues: self.upvalues || config.listing.upvalues,
        };
        let listing = list_chunk(&chunk.main, sections)
            .with_context(|| format!("Failed to list {}", self.file.display()))?;
        print!("{listing}");
        Ok(())
    }
}

fn list_chunk(main: &Prototype, sections: Sections) -> Result<String> {
    let mut out = String::new();
    let mut result = Ok(());
    main.walk(&mut |proto, _| {
        if result.is_ok() {
            result = list_function(&mut out, proto, sections);
        }
    });
    result.map(|()| out)
}

fn list_function(out: &mut String, proto: &Prototype, sections: Sections) -> Result<()> {
    let source = short_source(&proto.source);
    let kind = if proto.is_main() { "main" } else { "function" };
    let n = proto.code.len();
    writeln!(
        out,
        "\n{kind} <{source}:{},{}> ({n} instruction{})",
        proto.line_defined,
        proto.last_line_defined,
        plural(n)
    )?;
    writeln!(
        out,
        "{}{} param{}, {} slot{}, {} upvalue{}, {} local{}, {} constant{}, {} function{}",
        proto.num_params,
        if proto.is_vararg() { "+" } else { "" },
        plural(usize::from(proto.num_params)),
        proto.max_stack_size,
        plural(usize::from(proto.max_stack_size)),
        proto.upvalues.len(),
        plural(proto.upvalues.len()),
        proto.local_vars.len(),
        plural(proto.local_vars.len()),
        proto.constants.len(),
        plural(proto.constants.len()),
        proto.protos.len(),
        plural(proto.protos.len()),
    )?;

    for (pc, ins) in proto.code.iter().enumerate() {
        let decoded = ins
            .decode(&OPCODES)
            .with_context(|| format!("{source}:{} at pc {}", proto.line_defined, pc + 1))?;
        let line = proto
            .line_at(pc)
            .map_or_else(|| "-".to_string(), |line| line.to_string());
        write!(
            out,
            "\t{}\t[{line}]\t{:<9}\t{}",
            pc + 1,
            decoded.name(),
            operands(&decoded)
        )?;
        if let Some(comment) = comment(proto, &decoded) {
            write!(out, "\t; {comment}")?;
        }
        out.push('\n');
    }

    if sections.constants {
        writeln!(out, "constants ({}):", proto.constants.len())?;
        for (i, k) in proto.constants.iter().enumerate() {
            writeln!(out, "\t{}\t{}", i + 1, constant(k))?;
        }
    }
    if sections.locals {
        writeln!(out, "locals ({}):", proto.local_vars.len())?;
        for (i, var) in proto.local_vars.iter().enumerate() {
            writeln!(
                out,
                "\t{i}\t{}\t{}\t{}",
                var.name,
                var.start_pc + 1,
                var.end_pc + 1
            )?;
        }
    }
    if sections.upvalues {
        writeln!(out, "upvalues ({}):", proto.upvalues.len())?;
        for (i, up) in proto.upvalues.iter().enumerate() {
            let name = proto
                .upvalue_name(i)
                .map_or_else(|| "-".into(), |name| name.to_string_lossy());
            writeln!(
                out,
                "\t{i}\t{name}\t{}\t{}",
                u8::from(up.in_stack()),
                up.index()
            )?;
        }
    }
    Ok(())
}

/// Operand text, with constant references shown as `-1-index`
fn operands(decoded: &DecodedInstruction<'_>) -> String {
    let info = decoded.info;
    match decoded.operands {
        Operands::Abc { a, b, c } => {
            let mut text = a.to_string();
            for (mode, value) in [(info.b_mode, b), (info.c_mode, c)] {
                if mode != OpArgMode::N {
                    text.push(' ');
                    text.push_str(&rk(value));
                }
            }
            text
        }
        Operands::ABx { a, bx } => match info.b_mode {
            OpArgMode::K => format!("{a} {}", -1 - i64::from(bx)),
            OpArgMode::U => format!("{a} {bx}"),
            _ => a.to_string(),
        },
        Operands::AsBx { a, sbx } => format!("{a} {sbx}"),
        Operands::Ax { ax } => (-1 - i64::from(ax)).to_string(),
    }
}

fn rk(operand: u16) -> String {
    if is_constant(operand) {
        (-1 - i32::from(constant_index(operand))).to_string()
    } else {
        operand.to_string()
    }
}

/// Constants referenced by the instruction
fn comment(proto: &Prototype, decoded: &DecodedInstruction<'_>) -> Option<String> {
    let info = decoded.info;
    match decoded.operands {
        Operands::Abc { b, c, .. } => {
            let parts: Vec<String> = [(info.b_mode, b), (info.c_mode, c)]
                .into_iter()
                .filter(|&(mode, value)| mode == OpArgMode::K && is_constant(value))
                .map(|(_, value)| {
                    proto
                        .constants
                        .get(u32::from(constant_index(value)))
                        .map_or_else(|| "?".to_string(), constant)
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        Operands::ABx { bx, .. } if info.b_mode == OpArgMode::K => {
            proto.constants.get(bx).map(constant)
        }
        _ => None,
    }
}

fn constant(k: &Constant) -> String {
    match k {
        Constant::Nil => "nil".to_string(),
        Constant::Boolean(b) => b.to_string(),
        Constant::Integer(i) => i.to_string(),
        Constant::Float(f) => format!("{f:?}"),
        Constant::String(s) => quote(s.as_bytes()),
    }
}

/// Double-quoted with C-style escapes for control and non-ASCII bytes
fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x07 => out.push_str("\\a"),
            0x08 => out.push_str("\\b"),
            0x0B => out.push_str("\\v"),
            0x0C => out.push_str("\\f"),
            0x20..=0x7E => out.push(char::from(b)),
            _ => {
                let _ = write!(out, "\\{b:03}");
            }
        }
    }
    out.push('"');
    out
}

/// Display name of a chunk source: `@file` and `=name` lose their prefix
fn short_source(source: &LuaString) -> String {
    match source.as_bytes() {
        [] => "?".to_string(),
        [b'@' | b'=', rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => "[string]".to_string(),
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
