//! Tagpack decoder.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;

use crate::endian::WireNumeric;
use crate::error::{Error, Result};
use crate::render;
use crate::types::{SemanticType, StorageClass};
use crate::types::StorageClass as S;

/// Default limit on container nesting for skip, collection reads and render.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Decoder reads tagged values from a shared, immutable byte buffer.
///
/// The buffer is a [`Bytes`] handle, so cloning a decoder or taking a
/// [`sub_view`](Decoder::sub_view) never copies payload: every view holds a
/// reference to the same allocation, which lives until the last view is
/// dropped. A view never reads past the end it was created with.
#[derive(Debug, Clone)]
pub struct Decoder {
    data: Bytes,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Decoder {
    /// Creates a decoder that takes ownership of `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Creates a decoder over a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Sets the container nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the container nesting limit.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Returns the container nesting limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the current position within this view.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if the cursor has reached the end of the view.
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Returns the unread bytes of this view.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Checks if there are enough bytes available.
    fn check_available(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::underflow(needed, self.remaining()));
        }
        Ok(())
    }

    fn peek_tag(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::underflow(1, 0))
    }

    /// Reads the big-endian payload following the tag, consuming both.
    fn read_payload<T: WireNumeric>(&mut self) -> Result<T> {
        self.check_available(1 + T::WIDTH)?;
        let value = T::get(&self.data[self.pos + 1..]);
        self.pos += 1 + T::WIDTH;
        Ok(value)
    }

    /// Returns the storage class at the cursor without consuming it.
    pub fn storage_class(&self) -> Result<StorageClass> {
        Ok(StorageClass::from_tag(self.peek_tag()?))
    }

    /// Returns the semantic type at the cursor without consuming it.
    pub fn classify(&self) -> Result<SemanticType> {
        Ok(self.storage_class()?.semantic_type())
    }

    /// Reads nil.
    pub fn read_nil(&mut self) -> Result<()> {
        let tag = self.peek_tag()?;
        match StorageClass::from_tag(tag) {
            S::Nil => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(Error::Conversion(tag)),
        }
    }

    /// Reads a boolean.
    pub fn read_bool(&mut self) -> Result<bool> {
        let tag = self.peek_tag()?;
        let value = match StorageClass::from_tag(tag) {
            S::True => true,
            S::False => false,
            _ => return Err(Error::Conversion(tag)),
        };
        self.pos += 1;
        Ok(value)
    }

    /// Reads a signed integer stored in at most `width` bytes.
    fn read_signed(&mut self, width: usize) -> Result<i64> {
        let tag = self.peek_tag()?;
        let value = match StorageClass::from_tag(tag) {
            S::PositiveFixint | S::NegativeFixint => {
                self.pos += 1;
                i64::from(tag as i8)
            }
            S::Int8 => i64::from(self.read_payload::<i8>()?),
            S::Int16 if width >= 2 => i64::from(self.read_payload::<i16>()?),
            S::Int32 if width >= 4 => i64::from(self.read_payload::<i32>()?),
            S::Int64 if width >= 8 => self.read_payload::<i64>()?,
            _ => return Err(Error::Conversion(tag)),
        };
        Ok(value)
    }

    /// Reads an unsigned integer stored in at most `width` bytes.
    fn read_unsigned(&mut self, width: usize) -> Result<u64> {
        let tag = self.peek_tag()?;
        let value = match StorageClass::from_tag(tag) {
            S::PositiveFixint => {
                self.pos += 1;
                u64::from(tag)
            }
            S::Uint8 => u64::from(self.read_payload::<u8>()?),
            S::Uint16 if width >= 2 => u64::from(self.read_payload::<u16>()?),
            S::Uint32 if width >= 4 => u64::from(self.read_payload::<u32>()?),
            S::Uint64 if width >= 8 => self.read_payload::<u64>()?,
            _ => return Err(Error::Conversion(tag)),
        };
        Ok(value)
    }

    /// Reads an 8-bit signed integer.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_signed(1)? as i8)
    }

    /// Reads a 16-bit signed integer, accepting any narrower signed encoding.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_signed(2)? as i16)
    }

    /// Reads a 32-bit signed integer, accepting any narrower signed encoding.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_signed(4)? as i32)
    }

    /// Reads a 64-bit signed integer, accepting any narrower signed encoding.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_signed(8)
    }

    /// Reads an 8-bit unsigned integer.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_unsigned(1)? as u8)
    }

    /// Reads a 16-bit unsigned integer, accepting any narrower unsigned encoding.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.read_unsigned(2)? as u16)
    }

    /// Reads a 32-bit unsigned integer, accepting any narrower unsigned encoding.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.read_unsigned(4)? as u32)
    }

    /// Reads a 64-bit unsigned integer, accepting any narrower unsigned encoding.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_unsigned(8)
    }

    /// Reads a 32-bit float.
    pub fn read_f32(&mut self) -> Result<f32> {
        let tag = self.peek_tag()?;
        match StorageClass::from_tag(tag) {
            S::Float32 => self.read_payload::<f32>(),
            _ => Err(Error::Conversion(tag)),
        }
    }

    /// Reads a 64-bit float; a stored 32-bit float is widened.
    pub fn read_f64(&mut self) -> Result<f64> {
        let tag = self.peek_tag()?;
        match StorageClass::from_tag(tag) {
            S::Float64 => self.read_payload::<f64>(),
            S::Float32 => Ok(f64::from(self.read_payload::<f32>()?)),
            _ => Err(Error::Conversion(tag)),
        }
    }

    /// Reads the explicit length field of `class`, consuming tag and field.
    fn read_length(&mut self, class: StorageClass) -> Result<usize> {
        let len = match class.length_width() {
            1 => usize::from(self.read_payload::<u8>()?),
            2 => usize::from(self.read_payload::<u16>()?),
            _ => self.read_payload::<u32>()? as usize,
        };
        Ok(len)
    }

    fn read_str_len(&mut self) -> Result<usize> {
        let tag = self.peek_tag()?;
        match StorageClass::from_tag(tag) {
            S::FixStr => {
                self.pos += 1;
                Ok(usize::from(tag & 0x1f))
            }
            class @ (S::Str8 | S::Str16 | S::Str32) => self.read_length(class),
            _ => Err(Error::Conversion(tag)),
        }
    }

    /// Reads a string payload without copying or validating it.
    pub fn read_str_bytes(&mut self) -> Result<Bytes> {
        let len = self.read_str_len()?;
        self.check_available(len)?;
        let bytes = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a UTF-8 string.
    pub fn read_str(&mut self) -> Result<String> {
        let bytes = self.read_str_bytes()?;
        std::str::from_utf8(&bytes)
            .map(str::to_owned)
            .map_err(|_| Error::InvalidUtf8)
    }

    /// Reads an array header and returns the element count.
    pub fn read_array_len(&mut self) -> Result<usize> {
        let tag = self.peek_tag()?;
        match StorageClass::from_tag(tag) {
            S::FixArray => {
                self.pos += 1;
                Ok(usize::from(tag & 0x0f))
            }
            class @ (S::Array16 | S::Array32) => self.read_length(class),
            _ => Err(Error::Conversion(tag)),
        }
    }

    /// Reads a map header and returns the pair count.
    pub fn read_map_len(&mut self) -> Result<usize> {
        let tag = self.peek_tag()?;
        match StorageClass::from_tag(tag) {
            S::FixMap => {
                self.pos += 1;
                Ok(usize::from(tag & 0x0f))
            }
            class @ (S::Map16 | S::Map32) => self.read_length(class),
            _ => Err(Error::Conversion(tag)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Reads an array of `T`, in encoding order.
    pub fn read_array<T: Decode>(&mut self) -> Result<Vec<T>> {
        let len = self.read_array_len()?;
        self.enter()?;
        let mut values = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            values.push(T::decode(self)?);
        }
        self.leave();
        Ok(values)
    }

    fn read_entries<K, V>(&mut self, mut insert: impl FnMut(K, V)) -> Result<()>
    where
        K: Decode,
        V: Decode,
    {
        let len = self.read_map_len()?;
        self.enter()?;
        for _ in 0..len {
            let key = K::decode(self)?;
            let value = V::decode(self)?;
            insert(key, value);
        }
        self.leave();
        Ok(())
    }

    /// Reads a map. A repeated key keeps the last value.
    pub fn read_map<K, V>(&mut self) -> Result<BTreeMap<K, V>>
    where
        K: Decode + Ord,
        V: Decode,
    {
        let mut map = BTreeMap::new();
        self.read_entries(|k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }

    /// Reads any decodable value.
    pub fn decode<T: Decode>(&mut self) -> Result<T> {
        T::decode(self)
    }

    /// Advances past one complete value without decoding it.
    pub fn skip(&mut self) -> Result<()> {
        self.pos = self.value_end(self.pos, self.depth)?;
        Ok(())
    }

    /// Splits off the next value as a decoder sharing this buffer.
    ///
    /// The returned view covers exactly one value; this decoder advances past it.
    pub fn sub_view(&mut self) -> Result<Decoder> {
        let start = self.pos;
        let end = self.value_end(start, self.depth)?;
        self.pos = end;
        Ok(Decoder {
            data: self.data.slice(start..end),
            pos: 0,
            depth: 0,
            max_depth: self.max_depth.saturating_sub(self.depth),
        })
    }

    /// Renders the remaining values as text without moving this cursor.
    pub fn to_debug_string(&self) -> Result<String> {
        render::render(&mut self.clone())
    }

    /// End offset of `size` bytes starting at `start`, bounds-checked.
    fn span(&self, start: usize, size: usize) -> Result<usize> {
        let available = self.data.len() - start;
        if size > available {
            return Err(Error::underflow(size, available));
        }
        Ok(start + size)
    }

    /// Header size and length/count of the variable-size value at `start`.
    fn header_at(&self, start: usize, tag: u8, class: StorageClass) -> Result<(usize, usize)> {
        let len = match class {
            S::FixStr => usize::from(tag & 0x1f),
            S::FixArray | S::FixMap => usize::from(tag & 0x0f),
            _ => {
                let width = class.length_width();
                self.span(start, 1 + width)?;
                let field = &self.data[start + 1..];
                match width {
                    1 => usize::from(field[0]),
                    2 => usize::from(u16::get(field)),
                    _ => u32::get(field) as usize,
                }
            }
        };
        Ok((1 + class.length_width(), len))
    }

    /// Offset just past the value starting at `start`.
    fn value_end(&self, start: usize, depth: usize) -> Result<usize> {
        let tag = self
            .data
            .get(start)
            .copied()
            .ok_or_else(|| Error::underflow(1, 0))?;
        let class = StorageClass::from_tag(tag);
        match class {
            S::FixStr | S::Str8 | S::Str16 | S::Str32 | S::Bin8 | S::Bin16 | S::Bin32 => {
                let (header, len) = self.header_at(start, tag, class)?;
                self.span(start, header.saturating_add(len))
            }
            S::Ext8 | S::Ext16 | S::Ext32 => {
                // one extension type byte sits between length and data
                let (header, len) = self.header_at(start, tag, class)?;
                self.span(start, (header + 1).saturating_add(len))
            }
            S::FixArray | S::Array16 | S::Array32 => {
                let (header, len) = self.header_at(start, tag, class)?;
                self.items_end(start + header, len, depth)
            }
            S::FixMap | S::Map16 | S::Map32 => {
                let (header, len) = self.header_at(start, tag, class)?;
                self.items_end(start + header, len.saturating_mul(2), depth)
            }
            S::PositiveFixint
            | S::NegativeFixint
            | S::Nil
            | S::Unused
            | S::True
            | S::False
            | S::Float32
            | S::Float64
            | S::Uint8
            | S::Uint16
            | S::Uint32
            | S::Uint64
            | S::Int8
            | S::Int16
            | S::Int32
            | S::Int64
            | S::FixExt1
            | S::FixExt2
            | S::FixExt4
            | S::FixExt8
            | S::FixExt16 => match class.fixed_size() {
                Some(size) => self.span(start, size),
                None => Err(Error::Conversion(tag)),
            },
        }
    }

    fn items_end(&self, mut pos: usize, count: usize, depth: usize) -> Result<usize> {
        if depth >= self.max_depth {
            return Err(Error::DepthLimitExceeded(self.max_depth));
        }
        for _ in 0..count {
            pos = self.value_end(pos, depth + 1)?;
        }
        Ok(pos)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Bytes::new())
    }
}

impl From<Vec<u8>> for Decoder {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<Bytes> for Decoder {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

/// Values that can be read from a [`Decoder`].
pub trait Decode: Sized {
    /// Reads one value at the cursor.
    fn decode(decoder: &mut Decoder) -> Result<Self>;
}

macro_rules! decode_with {
    ($($t:ty => $method:ident),* $(,)?) => {
        $(
            impl Decode for $t {
                fn decode(decoder: &mut Decoder) -> Result<Self> {
                    decoder.$method()
                }
            }
        )*
    };
}

decode_with! {
    () => read_nil,
    bool => read_bool,
    i8 => read_i8,
    i16 => read_i16,
    i32 => read_i32,
    i64 => read_i64,
    u8 => read_u8,
    u16 => read_u16,
    u32 => read_u32,
    u64 => read_u64,
    f32 => read_f32,
    f64 => read_f64,
    String => read_str,
    Bytes => read_str_bytes,
    Decoder => sub_view,
}

impl<T: Decode> Decode for Option<T> {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        if decoder.storage_class()? == S::Nil {
            decoder.read_nil()?;
            return Ok(None);
        }
        T::decode(decoder).map(Some)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_array()
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        decoder.read_map()
    }
}

impl<K, V, H> Decode for HashMap<K, V, H>
where
    K: Decode + Eq + Hash,
    V: Decode,
    H: BuildHasher + Default,
{
    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut map = HashMap::with_hasher(H::default());
        decoder.read_entries(|k, v| {
            map.insert(k, v);
        })?;
        Ok(map)
    }
}

/// Decodes the first value held in `data`.
pub fn decode_from<T: Decode>(data: impl Into<Bytes>) -> Result<T> {
    Decoder::new(data).decode()
}
