//! # Lunar Bytecode
//!
//! Loader for Lua 5.3 precompiled chunks (`luac` output) and decoder for the
//! packed 32-bit instruction words they contain.
//!
//! ## Design Principles
//!
//! - **Strict**: every header field is checked, and any malformed byte fails
//!   the whole load with a specific [`BytecodeError`]
//! - **Owned tree**: the result is a plain tree of [`Prototype`]s with no
//!   borrow of the input, safe to share read-only across threads
//! - **Table-driven decoding**: operand layouts come from an [`OpcodeTable`],
//!   with the Lua 5.3 table shipped as [`OPCODES`]
//!
//! ```no_run
//! use lunar_bytecode::{Chunk, OPCODES};
//!
//! let bytes = std::fs::read("luac.out")?;
//! let chunk = Chunk::from_bytes(&bytes)?;
//! for ins in &chunk.main.code {
//!     let decoded = ins.decode(&OPCODES)?;
//!     println!("{} {:?}", decoded.name(), decoded.operands);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod chunk;
pub mod constant;
pub mod error;
pub mod header;
pub mod instruction;
pub mod opcode;
pub mod prototype;
pub mod reader;
pub mod string;

pub use chunk::Chunk;
pub use constant::{Constant, ConstantPool};
pub use error::{BytecodeError, ErrorKind, Result, SizeField};
pub use header::{ChunkFormat, HEADER_SIZE};
pub use instruction::{
    DecodedInstruction, Instruction, OpArgMode, OpMode, OpcodeInfo, OpcodeTable, Operands,
};
pub use opcode::{OPCODES, Opcode};
pub use prototype::{LocalVar, Prototype, Upvalue};
pub use reader::ChunkReader;
pub use string::LuaString;

/// Load a Lua 5.3 chunk and return its main function
pub fn undump(bytes: &[u8]) -> Result<Prototype> {
    Chunk::from_bytes(bytes).map(Chunk::into_main)
}
