//! Tagpack encoder.

use std::collections::{BTreeMap, HashMap};

use crate::endian::WireNumeric;
use crate::types::tag;

const INITIAL_CAPACITY: usize = 256;

/// Encoder appends tagged values to an owned, growable buffer.
///
/// Every append picks the smallest encoding for the value and returns the
/// encoder, so calls chain:
///
/// ```rust
/// use tagpack::Encoder;
///
/// let mut enc = Encoder::new();
/// enc.write_i32(1).write_i32(-31).write_i32(-63);
/// assert_eq!(enc.as_bytes(), &[0x01, 0xe1, 0xd0, 0xc1]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    /// Creates a new encoder with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been encoded yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the encoded bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns a copy of the encoded bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// Consumes the encoder and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Resets the encoder for reuse.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    fn put_tagged<T: WireNumeric>(&mut self, tag: u8, value: T) {
        self.buffer.push(tag);
        value.put(&mut self.buffer);
    }

    /// Writes nil.
    pub fn write_nil(&mut self) -> &mut Self {
        self.buffer.push(tag::NIL);
        self
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buffer.push(if value { tag::TRUE } else { tag::FALSE });
        self
    }

    /// Writes a signed 32-bit integer in its most compact form.
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        if (-32..=0x7f).contains(&value) {
            self.buffer.push(value as u8);
        } else if let Ok(v) = i8::try_from(value) {
            self.put_tagged(tag::INT8, v);
        } else if let Ok(v) = i16::try_from(value) {
            self.put_tagged(tag::INT16, v);
        } else {
            self.put_tagged(tag::INT32, value);
        }
        self
    }

    /// Writes a signed 64-bit integer in its most compact form.
    pub fn write_i64(&mut self, value: i64) -> &mut Self {
        match i32::try_from(value) {
            Ok(v) => self.write_i32(v),
            Err(_) => {
                self.put_tagged(tag::INT64, value);
                self
            }
        }
    }

    /// Writes an unsigned 32-bit integer in its most compact form.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        if value <= 0x7f {
            self.buffer.push(value as u8);
        } else if let Ok(v) = u8::try_from(value) {
            self.put_tagged(tag::UINT8, v);
        } else if let Ok(v) = u16::try_from(value) {
            self.put_tagged(tag::UINT16, v);
        } else {
            self.put_tagged(tag::UINT32, value);
        }
        self
    }

    /// Writes an unsigned 64-bit integer in its most compact form.
    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        match u32::try_from(value) {
            Ok(v) => self.write_u32(v),
            Err(_) => {
                self.put_tagged(tag::UINT64, value);
                self
            }
        }
    }

    /// Writes a 32-bit float. Floats are never compacted.
    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.put_tagged(tag::FLOAT32, value);
        self
    }

    /// Writes a 64-bit float.
    pub fn write_f64(&mut self, value: f64) -> &mut Self {
        self.put_tagged(tag::FLOAT64, value);
        self
    }

    /// Writes a string.
    ///
    /// # Panics
    ///
    /// Panics if the string is longer than `u32::MAX` bytes.
    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.write_str_bytes(value.as_bytes())
    }

    /// Writes raw bytes as a string value without checking their encoding.
    ///
    /// # Panics
    ///
    /// Panics if `value` is longer than `u32::MAX` bytes.
    pub fn write_str_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.write_str_len(value.len());
        self.buffer.extend_from_slice(value);
        self
    }

    fn write_str_len(&mut self, length: usize) {
        if length <= tag::FIXSTR_MAX {
            self.buffer.push(tag::FIXSTR | length as u8);
        } else if let Ok(len) = u8::try_from(length) {
            self.put_tagged(tag::STR8, len);
        } else if let Ok(len) = u16::try_from(length) {
            self.put_tagged(tag::STR16, len);
        } else {
            self.put_tagged(tag::STR32, wire_length(length));
        }
    }

    /// Writes an array header for `length` elements.
    ///
    /// The caller appends exactly `length` values afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `length` exceeds `u32::MAX`.
    pub fn write_array_len(&mut self, length: usize) -> &mut Self {
        if length <= tag::FIXCONTAINER_MAX {
            self.buffer.push(tag::FIXARRAY | length as u8);
        } else if let Ok(len) = u16::try_from(length) {
            self.put_tagged(tag::ARRAY16, len);
        } else {
            self.put_tagged(tag::ARRAY32, wire_length(length));
        }
        self
    }

    /// Writes a map header for `length` key/value pairs.
    ///
    /// The caller appends exactly `length` keys, each followed by its value.
    ///
    /// # Panics
    ///
    /// Panics if `length` exceeds `u32::MAX`.
    pub fn write_map_len(&mut self, length: usize) -> &mut Self {
        if length <= tag::FIXCONTAINER_MAX {
            self.buffer.push(tag::FIXMAP | length as u8);
        } else if let Ok(len) = u16::try_from(length) {
            self.put_tagged(tag::MAP16, len);
        } else {
            self.put_tagged(tag::MAP32, wire_length(length));
        }
        self
    }

    /// Writes a slice as an array.
    pub fn write_array<T: Encode>(&mut self, values: &[T]) -> &mut Self {
        self.write_array_len(values.len());
        for value in values {
            value.encode(self);
        }
        self
    }

    /// Writes key/value pairs as a map, in iteration order.
    pub fn write_map<K, V, I>(&mut self, entries: I) -> &mut Self
    where
        K: Encode,
        V: Encode,
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let entries = entries.into_iter();
        self.write_map_len(entries.len());
        for (key, value) in entries {
            key.encode(self);
            value.encode(self);
        }
        self
    }

    /// Appends the bytes of another encoder verbatim.
    pub fn append(&mut self, other: &Encoder) -> &mut Self {
        self.append_raw(other.as_bytes())
    }

    /// Appends already-encoded bytes verbatim.
    pub fn append_raw(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    /// Writes any encodable value.
    pub fn pack<T: Encode + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.encode(self);
        self
    }
}

fn wire_length(length: usize) -> u32 {
    match u32::try_from(length) {
        Ok(len) => len,
        Err(_) => panic!("length {length} exceeds the u32 wire format limit"),
    }
}

impl From<Encoder> for Vec<u8> {
    fn from(encoder: Encoder) -> Self {
        encoder.into_bytes()
    }
}

impl AsRef<[u8]> for Encoder {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Values that know how to append themselves to an [`Encoder`].
pub trait Encode {
    /// Appends the encoding of `self`.
    fn encode(&self, encoder: &mut Encoder);
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_bool(*self);
    }
}

impl Encode for () {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_nil();
    }
}

macro_rules! encode_via {
    ($method:ident as $wide:ty: $($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode(&self, encoder: &mut Encoder) {
                    encoder.$method(<$wide>::from(*self));
                }
            }
        )*
    };
}

encode_via!(write_i32 as i32: i8, i16, i32);
encode_via!(write_i64 as i64: i64);
encode_via!(write_u32 as u32: u8, u16, u32);
encode_via!(write_u64 as u64: u64);
encode_via!(write_f32 as f32: f32);
encode_via!(write_f64 as f64: f64);

impl Encode for isize {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_i64(*self as i64);
    }
}

impl Encode for usize {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_u64(*self as u64);
    }
}

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_str(self);
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_str(self);
    }
}

impl Encode for Encoder {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.append(self);
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder) {
        (**self).encode(encoder);
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, encoder: &mut Encoder) {
        (**self).encode(encoder);
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) {
        match self {
            Some(value) => value.encode(encoder),
            None => {
                encoder.write_nil();
            }
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_array(self);
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_array(self);
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_array(self);
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_map(self.iter());
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode(&self, encoder: &mut Encoder) {
        encoder.write_map(self.iter());
    }
}

/// Encodes a single value into a fresh byte vector.
pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
    let mut encoder = Encoder::new();
    encoder.pack(value);
    encoder.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(f: impl FnOnce(&mut Encoder)) -> Vec<u8> {
        let mut encoder = Encoder::new();
        f(&mut encoder);
        encoder.into_bytes()
    }

    #[test]
    fn test_write_bool_and_nil() {
        let mut encoder = Encoder::new();
        encoder.write_bool(true).write_bool(false).write_nil();
        assert_eq!(encoder.as_bytes(), &[0xc3, 0xc2, 0xc0]);
    }

    #[test]
    fn test_write_i32_thresholds() {
        assert_eq!(encoded(|e| { e.write_i32(0); }), [0x00]);
        assert_eq!(encoded(|e| { e.write_i32(127); }), [0x7f]);
        assert_eq!(encoded(|e| { e.write_i32(128); }), [0xd1, 0x00, 0x80]);
        assert_eq!(encoded(|e| { e.write_i32(-32); }), [0xe0]);
        assert_eq!(encoded(|e| { e.write_i32(-33); }), [0xd0, 0xdf]);
        assert_eq!(encoded(|e| { e.write_i32(-128); }), [0xd0, 0x80]);
        assert_eq!(encoded(|e| { e.write_i32(-129); }), [0xd1, 0xff, 0x7f]);
        assert_eq!(encoded(|e| { e.write_i32(300); }), [0xd1, 0x01, 0x2c]);
        assert_eq!(encoded(|e| { e.write_i32(32768); }), [0xd2, 0x00, 0x00, 0x80, 0x00]);
    }

    #[test]
    fn test_write_i64() {
        assert_eq!(encoded(|e| { e.write_i64(-1); }), [0xff]);
        assert_eq!(
            encoded(|e| { e.write_i64(i32::MIN as i64); }),
            [0xd2, 0x80, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encoded(|e| { e.write_i64(1 << 32); }),
            [0xd3, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_write_unsigned() {
        assert_eq!(encoded(|e| { e.write_u32(127); }), [0x7f]);
        assert_eq!(encoded(|e| { e.write_u32(255); }), [0xcc, 0xff]);
        assert_eq!(encoded(|e| { e.write_u32(256); }), [0xcd, 0x01, 0x00]);
        assert_eq!(encoded(|e| { e.write_u32(65536); }), [0xce, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(encoded(|e| { e.write_u64(u32::MAX as u64); }), [0xce, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(
            encoded(|e| { e.write_u64(u64::MAX); }),
            [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_write_floats() {
        assert_eq!(encoded(|e| { e.write_f32(1.0); }), [0xca, 0x3f, 0x80, 0x00, 0x00]);
        assert_eq!(
            encoded(|e| { e.write_f64(1.0); }),
            [0xcb, 0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_write_str_widths() {
        assert_eq!(encoded(|e| { e.write_str("test"); }), [0xa4, b't', b'e', b's', b't']);
        assert_eq!(encoded(|e| { e.write_str(""); }), [0xa0]);

        let s31 = "a".repeat(31);
        assert_eq!(encoded(|e| { e.write_str(&s31); })[0], 0xbf);

        let s32 = "a".repeat(32);
        let out = encoded(|e| { e.write_str(&s32); });
        assert_eq!(&out[..2], &[0xd9, 32]);
        assert_eq!(out.len(), 34);

        let s256 = "a".repeat(256);
        let out = encoded(|e| { e.write_str(&s256); });
        assert_eq!(&out[..3], &[0xda, 0x01, 0x00]);

        let s64k = "a".repeat(65536);
        let out = encoded(|e| { e.write_str(&s64k); });
        assert_eq!(&out[..5], &[0xdb, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(out.len(), 65541);
    }

    #[test]
    fn test_container_headers() {
        assert_eq!(encoded(|e| { e.write_array_len(0); }), [0x90]);
        assert_eq!(encoded(|e| { e.write_array_len(15); }), [0x9f]);
        assert_eq!(encoded(|e| { e.write_array_len(16); }), [0xdc, 0x00, 0x10]);
        assert_eq!(encoded(|e| { e.write_array_len(70000); }), [0xdd, 0x00, 0x01, 0x11, 0x70]);
        assert_eq!(encoded(|e| { e.write_map_len(3); }), [0x83]);
        assert_eq!(encoded(|e| { e.write_map_len(16); }), [0xde, 0x00, 0x10]);
        assert_eq!(encoded(|e| { e.write_map_len(65536); }), [0xdf, 0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_pack_collections() {
        let v: Vec<i8> = vec![1, 2, 3, 4, -5];
        assert_eq!(to_vec(&v), [0x95, 0x01, 0x02, 0x03, 0x04, 0xfb]);

        let m: BTreeMap<i32, i32> = [(1, 10), (2, 20), (3, 30)].into_iter().collect();
        assert_eq!(to_vec(&m), [0x83, 0x01, 0x0a, 0x02, 0x14, 0x03, 0x1e]);

        let arr = [true, false];
        assert_eq!(to_vec(&arr), [0x92, 0xc3, 0xc2]);

        let opt: Option<u8> = None;
        assert_eq!(to_vec(&opt), [0xc0]);
        assert_eq!(to_vec("hi"), [0xa2, b'h', b'i']);
    }

    #[test]
    fn test_append_encoder() {
        let mut inner = Encoder::new();
        inner.write_i32(2);

        let mut encoder = Encoder::new();
        encoder.write_i32(1).append(&inner).write_i32(3);
        assert_eq!(encoder.as_bytes(), &[0x01, 0x02, 0x03]);

        let parts = vec![inner.clone(), inner];
        assert_eq!(to_vec(&parts), [0x92, 0x02, 0x02]);
    }

    #[test]
    fn test_reset() {
        let mut encoder = Encoder::with_capacity(4);
        encoder.write_str("hello");
        assert!(!encoder.is_empty());
        encoder.reset();
        assert!(encoder.is_empty());
        assert_eq!(encoder.len(), 0);
    }
}
