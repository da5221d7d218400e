//! Property tests for the instruction codec and string decoding

mod common;

use lunar_bytecode::instruction::MAXARG_BX;
use lunar_bytecode::{ChunkReader, ErrorKind, Instruction, OPCODES, OpMode, Operands};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_field_ranges(word in any::<u32>()) {
        let ins = Instruction(word);
        prop_assert_eq!(u32::from(ins.opcode()), word & 0x3F);
        prop_assert!(ins.opcode() <= 63);

        let (a, b, c) = ins.abc();
        prop_assert!(b <= 511);
        prop_assert!(c <= 511);
        // Fields tile the word exactly.
        let packed = u32::from(ins.opcode())
            | u32::from(a) << 6
            | u32::from(b) << 14
            | u32::from(c) << 23;
        prop_assert_eq!(packed, word);

        let (a2, bx) = ins.abx();
        prop_assert_eq!(a, a2);
        prop_assert!(bx <= MAXARG_BX);
        prop_assert_eq!(ins.asbx(), (a, bx as i32 - MAXARG_BX as i32));
        // The bias equals the largest Bx, so every jump offset is non-positive.
        let (_, sbx) = ins.asbx();
        prop_assert!((-(MAXARG_BX as i32)..=0).contains(&sbx));
        prop_assert_eq!(ins.ax(), word >> 6);
    }

    #[test]
    fn prop_decode_follows_table(word in any::<u32>()) {
        let ins = Instruction(word);
        match ins.decode(&OPCODES) {
            Ok(decoded) => {
                prop_assert!(usize::from(ins.opcode()) < OPCODES.len());
                let expected = ins.operands(decoded.info.mode);
                prop_assert_eq!(decoded.operands, expected);
                let layout_matches = matches!(
                    (decoded.info.mode, decoded.operands),
                    (OpMode::IABC, Operands::Abc { .. })
                        | (OpMode::IABx, Operands::ABx { .. })
                        | (OpMode::IAsBx, Operands::AsBx { .. })
                        | (OpMode::IAx, Operands::Ax { .. })
                );
                prop_assert!(layout_matches);
            }
            Err(err) => {
                prop_assert_eq!(err.kind(), ErrorKind::InvalidOpcode);
                prop_assert!(usize::from(ins.opcode()) >= OPCODES.len());
            }
        }
    }

    #[test]
    fn prop_string_cursor_advance(payload in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut bytes = Vec::new();
        common::put_string(&mut bytes, &payload);
        bytes.push(0xEE);

        let mut reader = ChunkReader::new(&bytes);
        let s = reader.read_string().unwrap();
        prop_assert_eq!(s.as_bytes(), payload.as_slice());

        let expected = match payload.len() {
            0 => 1,
            n if n + 1 < 0xFF => 1 + n,
            n => 1 + 8 + n,
        };
        prop_assert_eq!(reader.position(), expected);
        prop_assert_eq!(reader.read_byte().unwrap(), 0xEE);
    }
}
