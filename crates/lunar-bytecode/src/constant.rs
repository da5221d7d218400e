//! Constant pool for function prototypes

use serde::Serialize;

use crate::error::{BytecodeError, Result};
use crate::reader::ChunkReader;
use crate::string::LuaString;

/// Tag byte for `nil`
pub const TAG_NIL: u8 = 0x00;
/// Tag byte for booleans
pub const TAG_BOOLEAN: u8 = 0x01;
/// Tag byte for floats
pub const TAG_NUMBER: u8 = 0x03;
/// Tag byte for integers
pub const TAG_INTEGER: u8 = 0x13;
/// Tag byte for strings the compiler kept short
pub const TAG_SHORT_STRING: u8 = 0x04;
/// Tag byte for long strings
pub const TAG_LONG_STRING: u8 = 0x14;

/// A constant value in the constant pool
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Constant {
    /// `nil`
    Nil,
    /// `true` / `false`
    Boolean(bool),
    /// 64-bit integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(LuaString),
}

impl Constant {
    /// Decode one tagged constant
    pub fn decode(reader: &mut ChunkReader<'_>) -> Result<Self> {
        match reader.read_byte()? {
            TAG_NIL => Ok(Self::Nil),
            TAG_BOOLEAN => Ok(Self::Boolean(reader.read_byte()? != 0)),
            TAG_INTEGER => reader.read_integer().map(Self::Integer),
            TAG_NUMBER => reader.read_float().map(Self::Float),
            // The two string tags only differ in how the compiler stored them.
            TAG_SHORT_STRING | TAG_LONG_STRING => reader.read_string().map(Self::String),
            tag => Err(BytecodeError::UnknownConstantTag(tag)),
        }
    }

    /// Lua type name of this constant
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// Check if this is `nil`
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Check if this is a string
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Get as integer if this is an integer constant
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a float constant
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string if this is a string constant
    #[inline]
    pub fn as_string(&self) -> Option<&LuaString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered constants of one prototype
///
/// Instructions address constants by position, so the pool keeps on-disk
/// order and never merges duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConstantPool {
    constants: Vec<Constant>,
}

impl ConstantPool {
    /// Decode a count-prefixed constant array
    pub fn decode(reader: &mut ChunkReader<'_>) -> Result<Self> {
        let constants = reader.read_vec(1, Constant::decode)?;
        Ok(Self { constants })
    }

    /// Get a constant by index
    #[inline]
    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// Number of constants in the pool
    #[inline]
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if the pool is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// Iterate over constants
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }

    /// Constants as a slice
    #[inline]
    pub fn as_slice(&self) -> &[Constant] {
        &self.constants
    }
}

impl From<Vec<Constant>> for ConstantPool {
    fn from(constants: Vec<Constant>) -> Self {
        Self { constants }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn decode(bytes: &[u8]) -> (Result<Constant>, usize) {
        let mut reader = ChunkReader::new(bytes);
        let result = Constant::decode(&mut reader);
        (result, reader.position())
    }

    #[test]
    fn test_nil_and_boolean() {
        assert_eq!(decode(&[TAG_NIL]).0.unwrap(), Constant::Nil);
        assert_eq!(decode(&[TAG_BOOLEAN, 0]).0.unwrap(), Constant::Boolean(false));
        assert_eq!(decode(&[TAG_BOOLEAN, 7]).0.unwrap(), Constant::Boolean(true));
    }

    #[test]
    fn test_numbers() {
        let mut bytes = vec![TAG_INTEGER];
        bytes.extend_from_slice(&i64::MIN.to_le_bytes());
        assert_eq!(decode(&bytes).0.unwrap(), Constant::Integer(i64::MIN));

        let mut bytes = vec![TAG_NUMBER];
        bytes.extend_from_slice(&3.25f64.to_le_bytes());
        assert_eq!(decode(&bytes).0.unwrap(), Constant::Float(3.25));
    }

    #[test]
    fn test_string_tags_decode_alike() {
        let short = decode(b"\x04\x04abc").0.unwrap();
        let long = decode(b"\x14\x04abc").0.unwrap();
        assert_eq!(short, long);
        assert_eq!(short.as_string().unwrap(), "abc");
    }

    #[test]
    fn test_unknown_tag_consumes_only_tag() {
        let (result, consumed) = decode(&[0x02, 0xAA, 0xBB]);
        assert!(matches!(result, Err(BytecodeError::UnknownConstantTag(0x02))));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_truncated_integer() {
        let (result, _) = decode(&[TAG_INTEGER, 1, 2, 3]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::BufferUnderrun);
    }

    #[test]
    fn test_pool_keeps_duplicates() {
        let bytes = [3, 0, 0, 0, TAG_NIL, TAG_BOOLEAN, 1, TAG_NIL];
        let mut reader = ChunkReader::new(&bytes);
        let pool = ConstantPool::decode(&mut reader).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(0), Some(&Constant::Nil));
        assert_eq!(pool.get(1), Some(&Constant::Boolean(true)));
        assert_eq!(pool.get(2), Some(&Constant::Nil));
        assert_eq!(pool.get(3), None);
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_string(&Constant::Integer(5)).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":5}"#);
        let json = serde_json::to_string(&Constant::Nil).unwrap();
        assert_eq!(json, r#"{"type":"nil"}"#);
    }
}
