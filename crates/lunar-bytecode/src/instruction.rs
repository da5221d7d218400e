//! Instruction words and operand decoding
//!
//! Every instruction is one 32-bit word with a 6-bit opcode in the low bits.
//! The remaining 26 bits are split according to the opcode's [`OpMode`]:
//!
//! ```text
//!  31       23       14        6      0
//! |    C    |    B    |    A   |  op  |   iABC
//! |        Bx         |    A   |  op  |   iABx / iAsBx
//! |             Ax             |  op  |   iAx
//! ```
//!
//! Which layout applies is not encoded in the word itself; it comes from an
//! [`OpcodeTable`] supplied by the caller.

use serde::Serialize;

use crate::error::{BytecodeError, Result};

/// Largest value of the 18-bit `Bx` field; also the `sBx` bias
pub const MAXARG_BX: u32 = (1 << 18) - 1;
/// Largest value of the 26-bit `Ax` field
pub const MAXARG_AX: u32 = (1 << 26) - 1;
/// High bit of a 9-bit `B`/`C` operand selecting the constant pool
pub const BITRK: u16 = 1 << 8;

const OPCODE_MASK: u32 = 0x3F;
const A_MASK: u32 = 0xFF;
const BC_MASK: u32 = 0x1FF;

/// Operand layout of an instruction
///
/// Variant names follow Lua's `iABC`, `iABx`, `iAsBx` and `iAx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum OpMode {
    /// A: 8 bits, B: 9 bits, C: 9 bits
    IABC,
    /// A: 8 bits, Bx: 18 bits unsigned
    IABx,
    /// A: 8 bits, sBx: 18 bits with bias
    IAsBx,
    /// Ax: 26 bits unsigned
    IAx,
}

/// How an instruction uses its B or C operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpArgMode {
    /// Not used
    N,
    /// Used as a plain value
    U,
    /// Register or jump offset
    R,
    /// Constant, or register/constant (RK)
    K,
}

/// Static description of one opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpcodeInfo {
    /// Mnemonic
    pub name: &'static str,
    /// Operand layout
    pub mode: OpMode,
    /// Use of operand B
    pub b_mode: OpArgMode,
    /// Use of operand C
    pub c_mode: OpArgMode,
    /// Instruction is a test; the next one is a jump
    pub test_flag: bool,
    /// Instruction writes register A
    pub set_a_flag: bool,
}

/// Opcode metadata lookup used to decode instructions
///
/// Implementations are immutable after construction; the codec only reads.
pub trait OpcodeTable {
    /// Metadata for `opcode`, or `None` if the table has no such entry
    fn info(&self, opcode: u8) -> Option<&OpcodeInfo>;
}

impl OpcodeTable for [OpcodeInfo] {
    #[inline]
    fn info(&self, opcode: u8) -> Option<&OpcodeInfo> {
        self.get(opcode as usize)
    }
}

impl<const N: usize> OpcodeTable for [OpcodeInfo; N] {
    #[inline]
    fn info(&self, opcode: u8) -> Option<&OpcodeInfo> {
        self.as_slice().info(opcode)
    }
}

/// A packed 32-bit instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Instruction(pub u32);

impl Instruction {
    /// Wrap a raw word
    #[inline]
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    /// Raw word
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Opcode number (low 6 bits)
    #[inline]
    pub const fn opcode(self) -> u8 {
        (self.0 & OPCODE_MASK) as u8
    }

    /// Operand A, shared by iABC, iABx and iAsBx
    #[inline]
    pub const fn a(self) -> u8 {
        ((self.0 >> 6) & A_MASK) as u8
    }

    /// Operands under the iABC layout
    #[inline]
    pub const fn abc(self) -> (u8, u16, u16) {
        let b = ((self.0 >> 14) & BC_MASK) as u16;
        let c = ((self.0 >> 23) & BC_MASK) as u16;
        (self.a(), b, c)
    }

    /// Operands under the iABx layout
    #[inline]
    pub const fn abx(self) -> (u8, u32) {
        (self.a(), self.0 >> 14)
    }

    /// Operands under the iAsBx layout
    #[inline]
    pub const fn asbx(self) -> (u8, i32) {
        let (a, bx) = self.abx();
        (a, bx as i32 - MAXARG_BX as i32)
    }

    /// Operand under the iAx layout
    #[inline]
    pub const fn ax(self) -> u32 {
        self.0 >> 6
    }

    /// Project the operands for `mode`
    pub const fn operands(self, mode: OpMode) -> Operands {
        match mode {
            OpMode::IABC => {
                let (a, b, c) = self.abc();
                Operands::Abc { a, b, c }
            }
            OpMode::IABx => {
                let (a, bx) = self.abx();
                Operands::ABx { a, bx }
            }
            OpMode::IAsBx => {
                let (a, sbx) = self.asbx();
                Operands::AsBx { a, sbx }
            }
            OpMode::IAx => Operands::Ax { ax: self.ax() },
        }
    }

    /// Look up the opcode and project the operands it uses
    pub fn decode<T: OpcodeTable + ?Sized>(self, table: &T) -> Result<DecodedInstruction<'_>> {
        let info = self.info(table)?;
        Ok(DecodedInstruction {
            opcode: self.opcode(),
            info,
            operands: self.operands(info.mode),
        })
    }

    /// Opcode metadata for this instruction
    pub fn info<T: OpcodeTable + ?Sized>(self, table: &T) -> Result<&OpcodeInfo> {
        let op = self.opcode();
        table.info(op).ok_or(BytecodeError::InvalidOpcode(op))
    }

    /// Mnemonic of this instruction's opcode
    pub fn op_name<T: OpcodeTable + ?Sized>(self, table: &T) -> Result<&'static str> {
        self.info(table).map(|info| info.name)
    }

    /// How this instruction uses operand B
    pub fn b_mode<T: OpcodeTable + ?Sized>(self, table: &T) -> Result<OpArgMode> {
        self.info(table).map(|info| info.b_mode)
    }

    /// How this instruction uses operand C
    pub fn c_mode<T: OpcodeTable + ?Sized>(self, table: &T) -> Result<OpArgMode> {
        self.info(table).map(|info| info.c_mode)
    }
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

/// Operand values of a decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operands {
    /// iABC operands
    Abc {
        /// 8-bit A
        a: u8,
        /// 9-bit B
        b: u16,
        /// 9-bit C
        c: u16,
    },
    /// iABx operands
    ABx {
        /// 8-bit A
        a: u8,
        /// 18-bit unsigned Bx
        bx: u32,
    },
    /// iAsBx operands
    AsBx {
        /// 8-bit A
        a: u8,
        /// Bias-corrected Bx
        sbx: i32,
    },
    /// iAx operand
    Ax {
        /// 26-bit unsigned Ax
        ax: u32,
    },
}

impl Operands {
    /// Operand A, if the layout has one
    pub fn a(&self) -> Option<u8> {
        match *self {
            Self::Abc { a, .. } | Self::ABx { a, .. } | Self::AsBx { a, .. } => Some(a),
            Self::Ax { .. } => None,
        }
    }
}

/// An instruction together with its opcode metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedInstruction<'t> {
    /// Opcode number
    pub opcode: u8,
    /// Table entry for `opcode`
    pub info: &'t OpcodeInfo,
    /// Operands projected by `info.mode`
    pub operands: Operands,
}

impl DecodedInstruction<'_> {
    /// Mnemonic
    #[inline]
    pub fn name(&self) -> &'static str {
        self.info.name
    }
}

/// Check if a B/C operand refers to the constant pool
#[inline]
pub const fn is_constant(operand: u16) -> bool {
    operand & BITRK != 0
}

/// Constant pool index of an RK operand
#[inline]
pub const fn constant_index(operand: u16) -> u16 {
    operand & !BITRK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const TABLE: [OpcodeInfo; 2] = [
        OpcodeInfo {
            name: "ZERO",
            mode: OpMode::IABC,
            b_mode: OpArgMode::R,
            c_mode: OpArgMode::N,
            test_flag: false,
            set_a_flag: true,
        },
        OpcodeInfo {
            name: "ONE",
            mode: OpMode::IAsBx,
            b_mode: OpArgMode::R,
            c_mode: OpArgMode::N,
            test_flag: false,
            set_a_flag: false,
        },
    ];

    fn abc(op: u32, a: u32, b: u32, c: u32) -> Instruction {
        assert!(op < 64 && a < 256 && b < 512 && c < 512, "iABC field out of range");
        Instruction(op | a << 6 | b << 14 | c << 23)
    }

    #[test]
    fn test_abc_fields() {
        let ins = abc(0x2A, 0xFF, 0x1FF, 0x100);
        assert_eq!(ins.opcode(), 0x2A);
        assert_eq!(ins.abc(), (0xFF, 0x1FF, 0x100));
    }

    #[test]
    fn test_abx_and_asbx_share_bits() {
        let ins = Instruction(1 | 3 << 6 | MAXARG_BX << 14);
        assert_eq!(ins.abx(), (3, MAXARG_BX));
        assert_eq!(ins.asbx(), (3, 0));

        let ins = Instruction(1 | 3 << 6);
        assert_eq!(ins.asbx(), (3, -(MAXARG_BX as i32)));
    }

    #[test]
    fn test_ax() {
        let ins = Instruction(u32::MAX);
        assert_eq!(ins.opcode(), 63);
        assert_eq!(ins.ax(), MAXARG_AX);
    }

    #[test]
    fn test_decode_uses_table_mode() {
        let ins = Instruction(1 | 2 << 6 | (MAXARG_BX - 4) << 14);
        let decoded = ins.decode(&TABLE).unwrap();
        assert_eq!(decoded.name(), "ONE");
        assert_eq!(decoded.operands, Operands::AsBx { a: 2, sbx: -4 });
        assert_eq!(decoded.operands.a(), Some(2));
    }

    #[test]
    fn test_decode_out_of_table() {
        let err = abc(2, 0, 0, 0).decode(&TABLE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOpcode);
        assert!(matches!(err, BytecodeError::InvalidOpcode(2)));
    }

    #[test]
    fn test_mode_lookups() {
        let ins = abc(0, 1, 2, 3);
        assert_eq!(ins.op_name(&TABLE).unwrap(), "ZERO");
        assert_eq!(ins.b_mode(&TABLE).unwrap(), OpArgMode::R);
        assert_eq!(ins.c_mode(&TABLE).unwrap(), OpArgMode::N);
    }

    #[test]
    fn test_mode_names_match_lua() {
        let names: Vec<String> = [OpMode::IABC, OpMode::IABx, OpMode::IAsBx, OpMode::IAx]
            .iter()
            .map(|mode| serde_json::to_value(mode).unwrap().as_str().unwrap().to_owned())
            .collect();
        assert_eq!(names, ["IABC", "IABx", "IAsBx", "IAx"]);
    }

    #[test]
    fn test_rk_helpers() {
        assert!(is_constant(0x100));
        assert!(!is_constant(0xFF));
        assert_eq!(constant_index(0x105), 5);
    }
}
