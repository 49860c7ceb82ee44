//! GGUF header decoding
//!
//! Bounds-checked little-endian reads over the metadata section. Every read
//! is checked against the declared file length before any allocation, so a
//! corrupt count or length field cannot trigger a huge buffer.

use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;

/// "GGUF" as it appears on disk
pub const GGUF_MAGIC: [u8; 4] = *b"GGUF";

/// Oldest and newest header versions with 64-bit counts
pub const SUPPORTED_VERSIONS: std::ops::RangeInclusive<u32> = 2..=3;

/// Upper bound for a decoded string value or key
pub const MAX_STRING_LEN: u64 = 1 << 20;

/// Upper bound for the element count of a decoded (not skipped) array
pub const MAX_ARRAY_LEN: u64 = 1 << 16;

/// Arrays of arrays deeper than this are treated as corrupt
const MAX_NESTING: u32 = 8;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("missing GGUF magic")]
    BadMagic,
    #[error("unsupported GGUF version {0}")]
    UnsupportedVersion(u32),
    #[error("header truncated at byte {0}")]
    Truncated(u64),
    #[error("declared string length {0} is out of bounds")]
    StringTooLong(u64),
    #[error("declared array length {0} is out of bounds")]
    ArrayTooLong(u64),
    #[error("arrays nested too deeply")]
    TooDeep,
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown value type tag {0}")]
    UnknownType(u32),
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

/// Value type tags of metadata entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Float32,
    Bool,
    String,
    Array,
    Uint64,
    Int64,
    Float64,
}

impl ValueType {
    pub fn from_tag(tag: u32) -> Result<Self, HeaderError> {
        Ok(match tag {
            0 => ValueType::Uint8,
            1 => ValueType::Int8,
            2 => ValueType::Uint16,
            3 => ValueType::Int16,
            4 => ValueType::Uint32,
            5 => ValueType::Int32,
            6 => ValueType::Float32,
            7 => ValueType::Bool,
            8 => ValueType::String,
            9 => ValueType::Array,
            10 => ValueType::Uint64,
            11 => ValueType::Int64,
            12 => ValueType::Float64,
            other => return Err(HeaderError::UnknownType(other)),
        })
    }

    /// Encoded size for scalar types, `None` for strings and arrays
    pub fn fixed_width(&self) -> Option<u64> {
        match self {
            ValueType::Uint8 | ValueType::Int8 | ValueType::Bool => Some(1),
            ValueType::Uint16 | ValueType::Int16 => Some(2),
            ValueType::Uint32 | ValueType::Int32 | ValueType::Float32 => Some(4),
            ValueType::Uint64 | ValueType::Int64 | ValueType::Float64 => Some(8),
            ValueType::String | ValueType::Array => None,
        }
    }
}

/// A decoded metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum GgufValue {
    Uint8(u8),
    Int8(i8),
    Uint16(u16),
    Int16(i16),
    Uint32(u32),
    Int32(i32),
    Float32(f32),
    Bool(bool),
    String(String),
    Uint64(u64),
    Int64(i64),
    Float64(f64),
    Array(Vec<GgufValue>),
}

impl GgufValue {
    /// Non-negative integer of any width
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            GgufValue::Uint8(v) => Some(u64::from(*v)),
            GgufValue::Uint16(v) => Some(u64::from(*v)),
            GgufValue::Uint32(v) => Some(u64::from(*v)),
            GgufValue::Uint64(v) => Some(*v),
            GgufValue::Int8(v) => u64::try_from(*v).ok(),
            GgufValue::Int16(v) => u64::try_from(*v).ok(),
            GgufValue::Int32(v) => u64::try_from(*v).ok(),
            GgufValue::Int64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GgufValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Fixed-size prefix of a GGUF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPrefix {
    pub version: u32,
    pub tensor_count: u64,
    pub metadata_count: u64,
}

/// Sequential reader over a GGUF header of known total length
pub struct HeaderReader<R> {
    inner: R,
    len: u64,
    pos: u64,
}

impl<R: Read + Seek> HeaderReader<R> {
    /// `len` is the total size of the underlying file
    pub fn new(inner: R, len: u64) -> Self {
        Self { inner, len, pos: 0 }
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    fn ensure(&self, n: u64) -> Result<(), HeaderError> {
        if n > self.remaining() {
            Err(HeaderError::Truncated(self.pos))
        } else {
            Ok(())
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), HeaderError> {
        self.ensure(buf.len() as u64)?;
        self.inner.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HeaderError::Truncated(self.pos),
            _ => HeaderError::Io(e),
        })?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], HeaderError> {
        let mut buf = [0u8; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    fn skip(&mut self, n: u64) -> Result<(), HeaderError> {
        self.ensure(n)?;
        let offset = i64::try_from(n).map_err(|_| HeaderError::Truncated(self.pos))?;
        self.inner.seek(SeekFrom::Current(offset))?;
        self.pos += n;
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32, HeaderError> {
        Ok(u32::from_le_bytes(self.read_bytes()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, HeaderError> {
        Ok(u64::from_le_bytes(self.read_bytes()?))
    }

    /// Magic, version and the two section counts
    pub fn read_prefix(&mut self) -> Result<HeaderPrefix, HeaderError> {
        let magic: [u8; 4] = self.read_bytes()?;
        if magic != GGUF_MAGIC {
            return Err(HeaderError::BadMagic);
        }
        let version = self.read_u32()?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(HeaderError::UnsupportedVersion(version));
        }
        let tensor_count = self.read_u64()?;
        let metadata_count = self.read_u64()?;
        Ok(HeaderPrefix {
            version,
            tensor_count,
            metadata_count,
        })
    }

    /// Length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String, HeaderError> {
        let len = self.read_u64()?;
        if len > MAX_STRING_LEN {
            return Err(HeaderError::StringTooLong(len));
        }
        self.ensure(len)?;
        let mut buf = vec![0u8; len as usize];
        self.fill(&mut buf)?;
        String::from_utf8(buf).map_err(|_| HeaderError::InvalidUtf8)
    }

    pub fn read_type(&mut self) -> Result<ValueType, HeaderError> {
        ValueType::from_tag(self.read_u32()?)
    }

    /// Decode a value of the given type
    pub fn read_value(&mut self, ty: ValueType) -> Result<GgufValue, HeaderError> {
        self.read_value_at(ty, 0)
    }

    fn read_value_at(&mut self, ty: ValueType, depth: u32) -> Result<GgufValue, HeaderError> {
        Ok(match ty {
            ValueType::Uint8 => GgufValue::Uint8(u8::from_le_bytes(self.read_bytes()?)),
            ValueType::Int8 => GgufValue::Int8(i8::from_le_bytes(self.read_bytes()?)),
            ValueType::Uint16 => GgufValue::Uint16(u16::from_le_bytes(self.read_bytes()?)),
            ValueType::Int16 => GgufValue::Int16(i16::from_le_bytes(self.read_bytes()?)),
            ValueType::Uint32 => GgufValue::Uint32(self.read_u32()?),
            ValueType::Int32 => GgufValue::Int32(i32::from_le_bytes(self.read_bytes()?)),
            ValueType::Float32 => GgufValue::Float32(f32::from_le_bytes(self.read_bytes()?)),
            ValueType::Bool => GgufValue::Bool(u8::from_le_bytes(self.read_bytes()?) != 0),
            ValueType::String => GgufValue::String(self.read_string()?),
            ValueType::Uint64 => GgufValue::Uint64(self.read_u64()?),
            ValueType::Int64 => GgufValue::Int64(i64::from_le_bytes(self.read_bytes()?)),
            ValueType::Float64 => GgufValue::Float64(f64::from_le_bytes(self.read_bytes()?)),
            ValueType::Array => {
                if depth >= MAX_NESTING {
                    return Err(HeaderError::TooDeep);
                }
                let elem = self.read_type()?;
                let count = self.read_u64()?;
                if count > MAX_ARRAY_LEN {
                    return Err(HeaderError::ArrayTooLong(count));
                }
                self.ensure_elements(elem, count)?;
                let mut items = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    items.push(self.read_value_at(elem, depth + 1)?);
                }
                GgufValue::Array(items)
            }
        })
    }

    /// Advance past a value without decoding it
    pub fn skip_value(&mut self, ty: ValueType) -> Result<(), HeaderError> {
        self.skip_value_at(ty, 0)
    }

    fn skip_value_at(&mut self, ty: ValueType, depth: u32) -> Result<(), HeaderError> {
        if let Some(width) = ty.fixed_width() {
            return self.skip(width);
        }
        match ty {
            ValueType::String => {
                let len = self.read_u64()?;
                self.skip(len)
            }
            _ => {
                if depth >= MAX_NESTING {
                    return Err(HeaderError::TooDeep);
                }
                let elem = self.read_type()?;
                let count = self.read_u64()?;
                self.ensure_elements(elem, count)?;
                match elem.fixed_width() {
                    Some(width) => self.skip(count * width),
                    None => {
                        for _ in 0..count {
                            self.skip_value_at(elem, depth + 1)?;
                        }
                        Ok(())
                    }
                }
            }
        }
    }

    /// Reject element counts that cannot fit in the rest of the file
    fn ensure_elements(&self, elem: ValueType, count: u64) -> Result<(), HeaderError> {
        // strings carry an 8-byte length, nested arrays a 12-byte prefix
        let min_width = elem.fixed_width().unwrap_or(match elem {
            ValueType::String => 8,
            _ => 12,
        });
        match count.checked_mul(min_width) {
            Some(total) if total <= self.remaining() => Ok(()),
            _ => Err(HeaderError::ArrayTooLong(count)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: Vec<u8>) -> HeaderReader<Cursor<Vec<u8>>> {
        let len = bytes.len() as u64;
        HeaderReader::new(Cursor::new(bytes), len)
    }

    fn string_bytes(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u64).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn test_read_prefix() {
        let mut bytes = b"GGUF".to_vec();
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&7u64.to_le_bytes());
        bytes.extend_from_slice(&2u64.to_le_bytes());
        let prefix = reader(bytes).read_prefix().unwrap();
        assert_eq!(
            prefix,
            HeaderPrefix {
                version: 3,
                tensor_count: 7,
                metadata_count: 2
            }
        );
    }

    #[test]
    fn test_bad_magic_and_version() {
        let bytes = b"GGML\x03\x00\x00\x00".to_vec();
        assert!(matches!(reader(bytes).read_prefix(), Err(HeaderError::BadMagic)));

        let mut bytes = b"GGUF".to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            reader(bytes).read_prefix(),
            Err(HeaderError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn test_oversized_string_rejected_before_allocation() {
        let bytes = u64::MAX.to_le_bytes().to_vec();
        assert!(matches!(
            reader(bytes).read_string(),
            Err(HeaderError::StringTooLong(u64::MAX))
        ));

        // within the global bound but past end of file
        let mut bytes = 100u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"short");
        assert!(matches!(reader(bytes).read_string(), Err(HeaderError::Truncated(8))));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut bytes = 2u64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        assert!(matches!(reader(bytes).read_string(), Err(HeaderError::InvalidUtf8)));
    }

    #[test]
    fn test_decode_array() {
        let mut bytes = 4u32.to_le_bytes().to_vec(); // u32 elements
        bytes.extend_from_slice(&3u64.to_le_bytes());
        for v in [1u32, 2, 3] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let value = reader(bytes).read_value(ValueType::Array).unwrap();
        assert_eq!(
            value,
            GgufValue::Array(vec![
                GgufValue::Uint32(1),
                GgufValue::Uint32(2),
                GgufValue::Uint32(3)
            ])
        );
    }

    #[test]
    fn test_skip_string_array() {
        let mut bytes = 8u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&2u64.to_le_bytes());
        bytes.extend(string_bytes("<s>"));
        bytes.extend(string_bytes("</s>"));
        bytes.extend_from_slice(&42u32.to_le_bytes());

        let mut r = reader(bytes);
        r.skip_value(ValueType::Array).unwrap();
        assert_eq!(r.read_u32().unwrap(), 42);
    }

    #[test]
    fn test_skip_rejects_impossible_count() {
        let mut bytes = 10u32.to_le_bytes().to_vec(); // u64 elements
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            reader(bytes).skip_value(ValueType::Array),
            Err(HeaderError::ArrayTooLong(u64::MAX))
        ));
    }

    #[test]
    fn test_nested_arrays_bounded() {
        // array of arrays of arrays ... each declaring one element
        let mut bytes = Vec::new();
        for _ in 0..(MAX_NESTING + 2) {
            bytes.extend_from_slice(&9u32.to_le_bytes());
            bytes.extend_from_slice(&1u64.to_le_bytes());
        }
        bytes.extend_from_slice(&[0u8; 64]);
        let result = reader(bytes).skip_value(ValueType::Array);
        assert!(matches!(
            result,
            Err(HeaderError::TooDeep) | Err(HeaderError::ArrayTooLong(_))
        ));
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(GgufValue::Uint32(32).as_u64(), Some(32));
        assert_eq!(GgufValue::Int64(4096).as_u64(), Some(4096));
        assert_eq!(GgufValue::Int32(-1).as_u64(), None);
        assert_eq!(GgufValue::Float32(1.0).as_u64(), None);
        assert_eq!(GgufValue::String("llama".into()).as_str(), Some("llama"));
    }

    #[test]
    fn test_unknown_type_tag() {
        assert!(matches!(ValueType::from_tag(13), Err(HeaderError::UnknownType(13))));
    }
}
