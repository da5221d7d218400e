//! Byte-level chunk assembly for loader tests

#![allow(dead_code)]

/// Offsets of the checked header fields
pub const SIGNATURE: std::ops::Range<usize> = 0..4;
pub const VERSION: usize = 4;
pub const FORMAT: usize = 5;
pub const DATA: std::ops::Range<usize> = 6..12;
pub const SIZES: std::ops::Range<usize> = 12..17;
pub const SAMPLE_INT: std::ops::Range<usize> = 17..25;
pub const SAMPLE_FLOAT: std::ops::Range<usize> = 25..33;

/// Valid Lua 5.3 header
pub fn header() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"\x1bLUA");
    bytes.push(0x53);
    bytes.push(0);
    bytes.extend_from_slice(b"\x19\x93\r\n\x1a\n");
    bytes.extend_from_slice(&[4, 8, 4, 8, 8]);
    bytes.extend_from_slice(&0x5678i64.to_le_bytes());
    bytes.extend_from_slice(&370.5f64.to_le_bytes());
    bytes
}

/// A constant as it appears on disk
#[derive(Debug, Clone)]
pub enum K {
    Nil,
    Bool(bool),
    Int(i64),
    Num(f64),
    Str(Vec<u8>),
    LongStr(Vec<u8>),
    /// Raw tag byte with no payload
    Tag(u8),
}

/// Prototype fields in on-disk form
#[derive(Debug, Clone, Default)]
pub struct Proto {
    pub source: Option<Vec<u8>>,
    pub line_defined: u32,
    pub last_line_defined: u32,
    pub num_params: u8,
    pub is_vararg: u8,
    pub max_stack_size: u8,
    pub code: Vec<u32>,
    pub constants: Vec<K>,
    pub upvalues: Vec<(u8, u8)>,
    pub protos: Vec<Proto>,
    pub line_info: Vec<u32>,
    pub local_vars: Vec<(Vec<u8>, u32, u32)>,
    pub upvalue_names: Vec<Vec<u8>>,
}

impl Proto {
    pub fn main(source: &str) -> Self {
        Self {
            source: Some(source.as_bytes().to_vec()),
            is_vararg: 1,
            max_stack_size: 2,
            ..Default::default()
        }
    }

    pub fn nested(line: u32) -> Self {
        Self {
            line_defined: line,
            last_line_defined: line + 1,
            max_stack_size: 2,
            ..Default::default()
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        match &self.source {
            Some(s) if !s.is_empty() => put_string(out, s),
            _ => out.push(0),
        }
        put_u32(out, self.line_defined);
        put_u32(out, self.last_line_defined);
        out.extend_from_slice(&[self.num_params, self.is_vararg, self.max_stack_size]);

        put_u32(out, self.code.len() as u32);
        for word in &self.code {
            put_u32(out, *word);
        }

        put_u32(out, self.constants.len() as u32);
        for k in &self.constants {
            match k {
                K::Nil => out.push(0x00),
                K::Bool(b) => out.extend_from_slice(&[0x01, *b as u8]),
                K::Int(i) => {
                    out.push(0x13);
                    out.extend_from_slice(&i.to_le_bytes());
                }
                K::Num(n) => {
                    out.push(0x03);
                    out.extend_from_slice(&n.to_le_bytes());
                }
                K::Str(s) => {
                    out.push(0x04);
                    put_string(out, s);
                }
                K::LongStr(s) => {
                    out.push(0x14);
                    put_string(out, s);
                }
                K::Tag(tag) => out.push(*tag),
            }
        }

        put_u32(out, self.upvalues.len() as u32);
        for (in_stack, idx) in &self.upvalues {
            out.extend_from_slice(&[*in_stack, *idx]);
        }

        put_u32(out, self.protos.len() as u32);
        for child in &self.protos {
            child.encode(out);
        }

        put_u32(out, self.line_info.len() as u32);
        for line in &self.line_info {
            put_u32(out, *line);
        }

        put_u32(out, self.local_vars.len() as u32);
        for (name, start, end) in &self.local_vars {
            put_string(out, name);
            put_u32(out, *start);
            put_u32(out, *end);
        }

        put_u32(out, self.upvalue_names.len() as u32);
        for name in &self.upvalue_names {
            put_string(out, name);
        }
    }
}

/// Header, upvalue count and main prototype
pub fn chunk(main: &Proto) -> Vec<u8> {
    let mut bytes = header();
    bytes.push(main.upvalues.len() as u8);
    main.encode(&mut bytes);
    bytes
}

pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

/// Size-prefixed string, switching to the long form past 253 bytes
pub fn put_string(out: &mut Vec<u8>, s: &[u8]) {
    if s.is_empty() {
        out.push(0);
        return;
    }
    let size = s.len() + 1;
    if size < 0xFF {
        out.push(size as u8);
    } else {
        out.push(0xFF);
        out.extend_from_slice(&(size as u64).to_le_bytes());
    }
    out.extend_from_slice(s);
}

/// Pack an iABC instruction
pub fn abc(op: u32, a: u32, b: u32, c: u32) -> u32 {
    assert!(op < 64 && a < 256 && b < 512 && c < 512, "iABC field out of range");
    op | a << 6 | b << 14 | c << 23
}

/// Pack an iABx instruction
pub fn abx(op: u32, a: u32, bx: u32) -> u32 {
    assert!(op < 64 && a < 256 && bx < 1 << 18, "iABx field out of range");
    op | a << 6 | bx << 14
}
