//! Function prototypes

use serde::Serialize;
use tracing::trace;

use crate::constant::ConstantPool;
use crate::error::Result;
use crate::instruction::Instruction;
use crate::reader::ChunkReader;
use crate::string::LuaString;

/// Where a closure finds one of its upvalues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "from", content = "index", rename_all = "lowercase")]
pub enum Upvalue {
    /// A register of the enclosing function
    Register(u8),
    /// An upvalue of the enclosing function
    Upvalue(u8),
}

impl Upvalue {
    fn decode(reader: &mut ChunkReader<'_>) -> Result<Self> {
        let in_stack = reader.read_byte()?;
        let index = reader.read_byte()?;
        Ok(if in_stack != 0 {
            Self::Register(index)
        } else {
            Self::Upvalue(index)
        })
    }

    /// Check if the value is captured from the enclosing register frame
    #[inline]
    pub fn in_stack(&self) -> bool {
        matches!(self, Self::Register(_))
    }

    /// Register or upvalue index in the enclosing function
    #[inline]
    pub fn index(&self) -> u8 {
        match *self {
            Self::Register(i) | Self::Upvalue(i) => i,
        }
    }
}

/// Debug record of a local variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalVar {
    /// Variable name
    pub name: LuaString,
    /// First instruction where the variable is live
    pub start_pc: u32,
    /// First instruction where the variable is dead
    pub end_pc: u32,
}

impl LocalVar {
    fn decode(reader: &mut ChunkReader<'_>) -> Result<Self> {
        Ok(Self {
            name: reader.read_string()?,
            start_pc: reader.read_u32()?,
            end_pc: reader.read_u32()?,
        })
    }

    /// Check if the variable is live at `pc`
    #[inline]
    pub fn is_live_at(&self, pc: u32) -> bool {
        self.start_pc <= pc && pc < self.end_pc
    }
}

/// A compiled function
///
/// The main chunk is the root; nested functions are owned by their parent in
/// `protos`, so the whole program is a tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Prototype {
    /// Chunk name, inherited from the parent when not stored
    pub source: LuaString,
    /// Line where the function starts; 0 for the main chunk
    pub line_defined: u32,
    /// Line where the function ends; 0 for the main chunk
    pub last_line_defined: u32,
    /// Number of fixed parameters
    pub num_params: u8,
    /// Vararg flag as stored
    pub is_vararg: u8,
    /// Number of registers needed
    pub max_stack_size: u8,
    /// Instructions
    pub code: Vec<Instruction>,
    /// Constant pool
    pub constants: ConstantPool,
    /// Upvalue descriptors
    pub upvalues: Vec<Upvalue>,
    /// Nested functions
    pub protos: Vec<Prototype>,
    /// Source line of each instruction
    pub line_info: Vec<u32>,
    /// Local variable debug records
    pub local_vars: Vec<LocalVar>,
    /// Upvalue names, parallel to `upvalues`
    pub upvalue_names: Vec<LuaString>,
}

impl Prototype {
    /// Decode a prototype and all of its nested functions
    ///
    /// An empty stored source name is replaced by `parent_source`.
    pub fn decode(reader: &mut ChunkReader<'_>, parent_source: &LuaString) -> Result<Self> {
        let start = reader.position();
        let mut source = reader.read_string()?;
        if source.is_empty() {
            source = parent_source.clone();
        }

        let line_defined = reader.read_u32()?;
        let last_line_defined = reader.read_u32()?;
        let num_params = reader.read_byte()?;
        let is_vararg = reader.read_byte()?;
        let max_stack_size = reader.read_byte()?;
        let code = reader.read_vec(4, |r| r.read_u32().map(Instruction))?;
        let constants = ConstantPool::decode(reader)?;
        let upvalues = reader.read_vec(2, Upvalue::decode)?;
        let protos = reader.read_vec(1, |r| Prototype::decode(r, &source))?;
        let line_info = reader.read_vec(4, ChunkReader::read_u32)?;
        let local_vars = reader.read_vec(9, LocalVar::decode)?;
        let upvalue_names = reader.read_vec(1, ChunkReader::read_string)?;

        trace!(
            source = %source,
            line_defined,
            offset = start,
            instructions = code.len(),
            constants = constants.len(),
            protos = protos.len(),
            "decoded prototype"
        );

        Ok(Self {
            source,
            line_defined,
            last_line_defined,
            num_params,
            is_vararg,
            max_stack_size,
            code,
            constants,
            upvalues,
            protos,
            line_info,
            local_vars,
            upvalue_names,
        })
    }

    /// Check if this is a main chunk function
    #[inline]
    pub fn is_main(&self) -> bool {
        self.line_defined == 0
    }

    /// Check if the function takes `...`
    #[inline]
    pub fn is_vararg(&self) -> bool {
        self.is_vararg != 0
    }

    /// Source name for display
    pub fn source_lossy(&self) -> std::borrow::Cow<'_, str> {
        self.source.to_string_lossy()
    }

    /// Source line of the instruction at `pc`, if recorded
    #[inline]
    pub fn line_at(&self, pc: usize) -> Option<u32> {
        self.line_info.get(pc).copied()
    }

    /// Name of the `n`th local variable live at `pc` (0-based)
    ///
    /// Locals are numbered in register order, so `n` is the register holding
    /// the variable.
    pub fn local_name(&self, n: usize, pc: u32) -> Option<&LuaString> {
        self.local_vars
            .iter()
            .take_while(|var| var.start_pc <= pc)
            .filter(|var| pc < var.end_pc)
            .nth(n)
            .map(|var| &var.name)
    }

    /// Name of upvalue `index`, if recorded
    #[inline]
    pub fn upvalue_name(&self, index: usize) -> Option<&LuaString> {
        self.upvalue_names.get(index)
    }

    /// Number of functions in this subtree, including this one
    pub fn function_count(&self) -> usize {
        1 + self.protos.iter().map(Prototype::function_count).sum::<usize>()
    }

    /// Visit this prototype and its descendants in pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Prototype, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Prototype, usize)) {
        visit(self, depth);
        for child in &self.protos {
            child.walk_at(depth + 1, visit);
        }
    }
}
