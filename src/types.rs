//! Wire format catalog: tag byte to storage class to semantic type.

/// Storage classes of the wire format.
///
/// A storage class is fixed by the leading tag byte alone and determines the
/// exact byte layout of the value that follows. Bytes `0x00..=0x7f` are all
/// [`StorageClass::PositiveFixint`]; bytes `0x80..=0xff` are mapped one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// `0x00..=0x7f`, value is the tag itself.
    PositiveFixint,
    /// `0xe0..=0xff`, value is the tag minus 256.
    NegativeFixint,
    /// `0x90..=0x9f`, low 4 bits are the element count.
    FixArray,
    /// `0x80..=0x8f`, low 4 bits are the pair count.
    FixMap,
    /// `0xa0..=0xbf`, low 5 bits are the byte length.
    FixStr,
    /// `0xc0`.
    Nil,
    /// `0xc1` is never emitted.
    Unused,
    /// `0xc2`.
    False,
    /// `0xc3`.
    True,
    /// `0xc4`, 1-byte length then raw bytes.
    Bin8,
    /// `0xc5`, 2-byte length then raw bytes.
    Bin16,
    /// `0xc6`, 4-byte length then raw bytes.
    Bin32,
    /// `0xd4`, type byte then 1 data byte.
    FixExt1,
    /// `0xd5`, type byte then 2 data bytes.
    FixExt2,
    /// `0xd6`, type byte then 4 data bytes.
    FixExt4,
    /// `0xd7`, type byte then 8 data bytes.
    FixExt8,
    /// `0xd8`, type byte then 16 data bytes.
    FixExt16,
    /// `0xc7`, 1-byte length, type byte, data.
    Ext8,
    /// `0xc8`, 2-byte length, type byte, data.
    Ext16,
    /// `0xc9`, 4-byte length, type byte, data.
    Ext32,
    /// `0xca`, IEEE-754 single.
    Float32,
    /// `0xcb`, IEEE-754 double.
    Float64,
    /// `0xcc`.
    Uint8,
    /// `0xcd`.
    Uint16,
    /// `0xce`.
    Uint32,
    /// `0xcf`.
    Uint64,
    /// `0xd0`.
    Int8,
    /// `0xd1`.
    Int16,
    /// `0xd2`.
    Int32,
    /// `0xd3`.
    Int64,
    /// `0xd9`, 1-byte length then UTF-8 bytes.
    Str8,
    /// `0xda`, 2-byte length then UTF-8 bytes.
    Str16,
    /// `0xdb`, 4-byte length then UTF-8 bytes.
    Str32,
    /// `0xdc`, 2-byte element count.
    Array16,
    /// `0xdd`, 4-byte element count.
    Array32,
    /// `0xde`, 2-byte pair count.
    Map16,
    /// `0xdf`, 4-byte pair count.
    Map32,
}

use self::StorageClass as S;

#[rustfmt::skip]
static HIGH_TAGS: [StorageClass; 128] = [
    /* 0x80 */ S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap,
    /* 0x88 */ S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap, S::FixMap,
    /* 0x90 */ S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray,
    /* 0x98 */ S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray, S::FixArray,
    /* 0xa0 */ S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr,
    /* 0xa8 */ S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr,
    /* 0xb0 */ S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr,
    /* 0xb8 */ S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr, S::FixStr,
    /* 0xc0 */ S::Nil, S::Unused, S::False, S::True, S::Bin8, S::Bin16, S::Bin32, S::Ext8,
    /* 0xc8 */ S::Ext16, S::Ext32, S::Float32, S::Float64, S::Uint8, S::Uint16, S::Uint32, S::Uint64,
    /* 0xd0 */ S::Int8, S::Int16, S::Int32, S::Int64, S::FixExt1, S::FixExt2, S::FixExt4, S::FixExt8,
    /* 0xd8 */ S::FixExt16, S::Str8, S::Str16, S::Str32, S::Array16, S::Array32, S::Map16, S::Map32,
    /* 0xe0 */ S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
               S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
    /* 0xe8 */ S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
               S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
    /* 0xf0 */ S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
               S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
    /* 0xf8 */ S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
               S::NegativeFixint, S::NegativeFixint, S::NegativeFixint, S::NegativeFixint,
];

impl StorageClass {
    /// Returns the storage class identified by a tag byte.
    #[inline]
    pub fn from_tag(tag: u8) -> Self {
        if tag <= 0x7f {
            StorageClass::PositiveFixint
        } else {
            HIGH_TAGS[(tag - 0x80) as usize]
        }
    }

    /// Returns the semantic type surfaced to callers for this storage class.
    pub fn semantic_type(self) -> SemanticType {
        match self {
            S::PositiveFixint | S::NegativeFixint | S::Int8 => SemanticType::Int8,
            S::Int16 => SemanticType::Int16,
            S::Int32 => SemanticType::Int32,
            S::Int64 => SemanticType::Int64,
            S::Uint8 => SemanticType::Uint8,
            S::Uint16 => SemanticType::Uint16,
            S::Uint32 => SemanticType::Uint32,
            S::Uint64 => SemanticType::Uint64,
            S::Float32 => SemanticType::Float32,
            S::Float64 => SemanticType::Float64,
            S::Nil => SemanticType::Null,
            S::True | S::False => SemanticType::Boolean,
            S::FixStr | S::Str8 | S::Str16 | S::Str32 => SemanticType::String,
            S::Bin8 | S::Bin16 | S::Bin32 => SemanticType::Binary,
            S::FixExt1
            | S::FixExt2
            | S::FixExt4
            | S::FixExt8
            | S::FixExt16
            | S::Ext8
            | S::Ext16
            | S::Ext32 => SemanticType::Extension,
            S::FixArray | S::Array16 | S::Array32 => SemanticType::Array,
            S::FixMap | S::Map16 | S::Map32 => SemanticType::Map,
            S::Unused => SemanticType::Unknown,
        }
    }

    /// Size in bytes of the value, tag included, when it is fixed by the tag.
    ///
    /// Returns `None` for classes carrying a length or count field.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            S::PositiveFixint | S::NegativeFixint | S::Nil | S::Unused | S::True | S::False => {
                Some(1)
            }
            S::Uint8 | S::Int8 => Some(2),
            S::Uint16 | S::Int16 => Some(3),
            S::Uint32 | S::Int32 | S::Float32 => Some(5),
            S::Uint64 | S::Int64 | S::Float64 => Some(9),
            S::FixExt1 => Some(3),
            S::FixExt2 => Some(4),
            S::FixExt4 => Some(6),
            S::FixExt8 => Some(10),
            S::FixExt16 => Some(18),
            _ => None,
        }
    }

    /// Width in bytes of the explicit length or count field following the tag.
    ///
    /// Zero for the fix-classes whose length lives in the tag itself and for
    /// classes without a length.
    pub fn length_width(self) -> usize {
        match self {
            S::Str8 | S::Bin8 | S::Ext8 => 1,
            S::Str16 | S::Bin16 | S::Ext16 | S::Array16 | S::Map16 => 2,
            S::Str32 | S::Bin32 | S::Ext32 | S::Array32 | S::Map32 => 4,
            _ => 0,
        }
    }
}

/// Logical types exposed to callers by [`Decoder::classify`](crate::Decoder::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    /// Tag `0xc1`, which is never emitted.
    Unknown,
    Boolean,
    Null,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Binary,
    Extension,
    Array,
    Map,
}

impl SemanticType {
    /// Returns true for any integer type, signed or unsigned.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            SemanticType::Int8
                | SemanticType::Int16
                | SemanticType::Int32
                | SemanticType::Int64
                | SemanticType::Uint8
                | SemanticType::Uint16
                | SemanticType::Uint32
                | SemanticType::Uint64
        )
    }
}

/// Tag bytes emitted by the encoder.
pub mod tag {
    /// Nil.
    pub const NIL: u8 = 0xc0;
    /// Boolean false.
    pub const FALSE: u8 = 0xc2;
    /// Boolean true.
    pub const TRUE: u8 = 0xc3;
    /// 32-bit float, 4 payload bytes.
    pub const FLOAT32: u8 = 0xca;
    /// 64-bit float, 8 payload bytes.
    pub const FLOAT64: u8 = 0xcb;
    /// Unsigned 8-bit integer.
    pub const UINT8: u8 = 0xcc;
    /// Unsigned 16-bit integer.
    pub const UINT16: u8 = 0xcd;
    /// Unsigned 32-bit integer.
    pub const UINT32: u8 = 0xce;
    /// Unsigned 64-bit integer.
    pub const UINT64: u8 = 0xcf;
    /// Signed 8-bit integer.
    pub const INT8: u8 = 0xd0;
    /// Signed 16-bit integer.
    pub const INT16: u8 = 0xd1;
    /// Signed 32-bit integer.
    pub const INT32: u8 = 0xd2;
    /// Signed 64-bit integer.
    pub const INT64: u8 = 0xd3;
    /// String with a 1-byte length.
    pub const STR8: u8 = 0xd9;
    /// String with a 2-byte length.
    pub const STR16: u8 = 0xda;
    /// String with a 4-byte length.
    pub const STR32: u8 = 0xdb;
    /// Array with a 2-byte count.
    pub const ARRAY16: u8 = 0xdc;
    /// Array with a 4-byte count.
    pub const ARRAY32: u8 = 0xdd;
    /// Map with a 2-byte count.
    pub const MAP16: u8 = 0xde;
    /// Map with a 4-byte count.
    pub const MAP32: u8 = 0xdf;

    /// Fixmap base; the pair count is OR-ed into the low 4 bits.
    pub const FIXMAP: u8 = 0x80;
    /// Fixarray base; the element count is OR-ed into the low 4 bits.
    pub const FIXARRAY: u8 = 0x90;
    /// Fixstr base; the byte length is OR-ed into the low 5 bits.
    pub const FIXSTR: u8 = 0xa0;

    /// Largest length held by a fixstr tag.
    pub const FIXSTR_MAX: usize = 31;
    /// Largest count held by a fixarray or fixmap tag.
    pub const FIXCONTAINER_MAX: usize = 15;
}
