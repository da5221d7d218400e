//! Lua 5.3 opcodes and their operand modes

use serde::Serialize;

use crate::instruction::{Instruction, OpArgMode, OpMode, OpcodeInfo};

use OpArgMode::{K, N, R, U};
use OpMode::{IABC, IABx, IAsBx, IAx};

/// Lua 5.3 opcodes, numbered as in the instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    // ==================== Loads ====================
    Move = 0,
    LoadK,
    LoadKx,
    LoadBool,
    LoadNil,

    // ==================== Upvalues and tables ====================
    GetUpval,
    GetTabUp,
    GetTable,
    SetTabUp,
    SetUpval,
    SetTable,
    NewTable,
    SelfOp,

    // ==================== Arithmetic ====================
    Add,
    Sub,
    Mul,
    Mod,
    Pow,
    Div,
    IDiv,
    BAnd,
    BOr,
    BXor,
    Shl,
    Shr,
    Unm,
    BNot,
    Not,
    Len,
    Concat,

    // ==================== Control Flow ====================
    Jmp,
    Eq,
    Lt,
    Le,
    Test,
    TestSet,
    Call,
    TailCall,
    Return,
    ForLoop,
    ForPrep,
    TForCall,
    TForLoop,
    SetList,
    Closure,
    VarArg,
    ExtraArg,
}

impl Opcode {
    /// Every opcode, in numeric order
    pub const ALL: [Opcode; 47] = [
        Self::Move,
        Self::LoadK,
        Self::LoadKx,
        Self::LoadBool,
        Self::LoadNil,
        Self::GetUpval,
        Self::GetTabUp,
        Self::GetTable,
        Self::SetTabUp,
        Self::SetUpval,
        Self::SetTable,
        Self::NewTable,
        Self::SelfOp,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Mod,
        Self::Pow,
        Self::Div,
        Self::IDiv,
        Self::BAnd,
        Self::BOr,
        Self::BXor,
        Self::Shl,
        Self::Shr,
        Self::Unm,
        Self::BNot,
        Self::Not,
        Self::Len,
        Self::Concat,
        Self::Jmp,
        Self::Eq,
        Self::Lt,
        Self::Le,
        Self::Test,
        Self::TestSet,
        Self::Call,
        Self::TailCall,
        Self::Return,
        Self::ForLoop,
        Self::ForPrep,
        Self::TForCall,
        Self::TForLoop,
        Self::SetList,
        Self::Closure,
        Self::VarArg,
        Self::ExtraArg,
    ];

    /// Convert from raw opcode number
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Opcode of an instruction word
    #[inline]
    pub fn of(instruction: Instruction) -> Option<Self> {
        Self::from_byte(instruction.opcode())
    }

    /// Convert to raw opcode number
    #[inline]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Table entry for this opcode
    #[inline]
    pub fn info(self) -> &'static OpcodeInfo {
        &OPCODES[self as usize]
    }

    /// Mnemonic, as printed by `luac -l`
    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }
}

const fn op(
    name: &'static str,
    test_flag: bool,
    set_a_flag: bool,
    b_mode: OpArgMode,
    c_mode: OpArgMode,
    mode: OpMode,
) -> OpcodeInfo {
    OpcodeInfo {
        name,
        mode,
        b_mode,
        c_mode,
        test_flag,
        set_a_flag,
    }
}

/// Operand modes of every Lua 5.3 opcode, indexed by opcode number
pub static OPCODES: [OpcodeInfo; 47] = [
    //  name        T      A      B  C  mode
    op("MOVE", false, true, R, N, IABC),
    op("LOADK", false, true, K, N, IABx),
    op("LOADKX", false, true, N, N, IABx),
    op("LOADBOOL", false, true, U, U, IABC),
    op("LOADNIL", false, true, U, N, IABC),
    op("GETUPVAL", false, true, U, N, IABC),
    op("GETTABUP", false, true, U, K, IABC),
    op("GETTABLE", false, true, R, K, IABC),
    op("SETTABUP", false, false, K, K, IABC),
    op("SETUPVAL", false, false, U, N, IABC),
    op("SETTABLE", false, false, K, K, IABC),
    op("NEWTABLE", false, true, U, U, IABC),
    op("SELF", false, true, R, K, IABC),
    op("ADD", false, true, K, K, IABC),
    op("SUB", false, true, K, K, IABC),
    op("MUL", false, true, K, K, IABC),
    op("MOD", false, true, K, K, IABC),
    op("POW", false, true, K, K, IABC),
    op("DIV", false, true, K, K, IABC),
    op("IDIV", false, true, K, K, IABC),
    op("BAND", false, true, K, K, IABC),
    op("BOR", false, true, K, K, IABC),
    op("BXOR", false, true, K, K, IABC),
    op("SHL", false, true, K, K, IABC),
    op("SHR", false, true, K, K, IABC),
    op("UNM", false, true, R, N, IABC),
    op("BNOT", false, true, R, N, IABC),
    op("NOT", false, true, R, N, IABC),
    op("LEN", false, true, R, N, IABC),
    op("CONCAT", false, true, R, R, IABC),
    op("JMP", false, false, R, N, IAsBx),
    op("EQ", true, false, K, K, IABC),
    op("LT", true, false, K, K, IABC),
    op("LE", true, false, K, K, IABC),
    op("TEST", true, false, N, U, IABC),
    op("TESTSET", true, true, R, U, IABC),
    op("CALL", false, true, U, U, IABC),
    op("TAILCALL", false, true, U, U, IABC),
    op("RETURN", false, false, U, N, IABC),
    op("FORLOOP", false, true, R, N, IAsBx),
    op("FORPREP", false, true, R, N, IAsBx),
    op("TFORCALL", false, false, N, U, IABC),
    op("TFORLOOP", false, true, R, N, IAsBx),
    op("SETLIST", false, false, U, U, IABC),
    op("CLOSURE", false, true, U, N, IABx),
    op("VARARG", false, true, U, N, IABC),
    op("EXTRAARG", false, false, U, U, IAx),
];
