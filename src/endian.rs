//! Byte-order adapter between host order and big-endian wire order.
//!
//! [`host_to_wire`] and [`wire_to_host`] are a standalone public utility for
//! callers that move fixed-width numerics in and out of tagpack payloads by
//! hand, such as extension or binary bodies. Both are involutions and compile
//! to the identity on big-endian hosts.
//!
//! The encoder and decoder never hold a swapped value in memory. They write
//! and read big-endian bytes directly with `byteorder` through a crate-internal
//! trait, which yields the same bytes as `host_to_wire(v).to_ne_bytes()`.

use byteorder::{BigEndian, ByteOrder};

/// Fixed-width numerics that can be swapped between host and wire order.
pub trait WireOrder: Copy {
    /// Converts a host-order value to wire (big-endian) order.
    fn host_to_wire(self) -> Self;

    /// Converts a wire-order value back to host order.
    fn wire_to_host(self) -> Self;
}

macro_rules! wire_order_int {
    ($($t:ty),*) => {
        $(
            impl WireOrder for $t {
                #[inline]
                fn host_to_wire(self) -> Self {
                    self.to_be()
                }

                #[inline]
                fn wire_to_host(self) -> Self {
                    <$t>::from_be(self)
                }
            }
        )*
    };
}

wire_order_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl WireOrder for f32 {
    #[inline]
    fn host_to_wire(self) -> Self {
        f32::from_bits(self.to_bits().to_be())
    }

    #[inline]
    fn wire_to_host(self) -> Self {
        f32::from_bits(u32::from_be(self.to_bits()))
    }
}

impl WireOrder for f64 {
    #[inline]
    fn host_to_wire(self) -> Self {
        f64::from_bits(self.to_bits().to_be())
    }

    #[inline]
    fn wire_to_host(self) -> Self {
        f64::from_bits(u64::from_be(self.to_bits()))
    }
}

/// Converts a host-order value to wire order.
#[inline]
pub fn host_to_wire<T: WireOrder>(value: T) -> T {
    value.host_to_wire()
}

/// Converts a wire-order value to host order.
#[inline]
pub fn wire_to_host<T: WireOrder>(value: T) -> T {
    value.wire_to_host()
}

/// Numerics with a fixed big-endian wire representation.
pub(crate) trait WireNumeric: Sized + Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Appends the big-endian bytes of `self`.
    fn put(self, out: &mut Vec<u8>);

    /// Reads a value from the first `WIDTH` bytes of `src`.
    fn get(src: &[u8]) -> Self;
}

impl WireNumeric for u8 {
    const WIDTH: usize = 1;

    fn put(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    fn get(src: &[u8]) -> Self {
        src[0]
    }
}

impl WireNumeric for i8 {
    const WIDTH: usize = 1;

    fn put(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn get(src: &[u8]) -> Self {
        src[0] as i8
    }
}

macro_rules! wire_numeric {
    ($t:ty, $width:expr, $read:ident, $write:ident) => {
        impl WireNumeric for $t {
            const WIDTH: usize = $width;

            #[inline]
            fn put(self, out: &mut Vec<u8>) {
                let mut buf = [0u8; $width];
                BigEndian::$write(&mut buf, self);
                out.extend_from_slice(&buf);
            }

            #[inline]
            fn get(src: &[u8]) -> Self {
                BigEndian::$read(src)
            }
        }
    };
}

wire_numeric!(u16, 2, read_u16, write_u16);
wire_numeric!(u32, 4, read_u32, write_u32);
wire_numeric!(u64, 8, read_u64, write_u64);
wire_numeric!(i16, 2, read_i16, write_i16);
wire_numeric!(i32, 4, read_i32, write_i32);
wire_numeric!(i64, 8, read_i64, write_i64);
wire_numeric!(f32, 4, read_f32, write_f32);
wire_numeric!(f64, 8, read_f64, write_f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_to_wire_is_big_endian() {
        assert_eq!(host_to_wire(0x0102u16).to_ne_bytes(), [0x01, 0x02]);
        assert_eq!(
            host_to_wire(0x0102_0304u32).to_ne_bytes(),
            [0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(
            host_to_wire(-2i64).to_ne_bytes(),
            [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]
        );
    }

    #[test]
    fn test_involution() {
        assert_eq!(wire_to_host(host_to_wire(0xdead_beefu32)), 0xdead_beef);
        assert_eq!(wire_to_host(host_to_wire(-12345i16)), -12345);
        assert_eq!(wire_to_host(host_to_wire(7u8)), 7);
        assert_eq!(wire_to_host(host_to_wire(1.5f32)), 1.5);
        assert_eq!(wire_to_host(host_to_wire(-2.25f64)), -2.25);
    }

    #[test]
    fn test_wire_numeric_layout() {
        let mut out = Vec::new();
        0x0102u16.put(&mut out);
        (-1i32).put(&mut out);
        1.0f32.put(&mut out);
        assert_eq!(out, [0x01, 0x02, 0xff, 0xff, 0xff, 0xff, 0x3f, 0x80, 0x00, 0x00]);

        assert_eq!(u16::get(&out[0..2]), 0x0102);
        assert_eq!(i32::get(&out[2..6]), -1);
        assert_eq!(f32::get(&out[6..10]), 1.0);
        assert_eq!(<i8 as WireNumeric>::get(&[0xc1]), -63);
    }

    #[test]
    fn test_adapter_matches_codec_bytes() {
        let mut out = Vec::new();
        0xbeefu16.put(&mut out);
        assert_eq!(out, host_to_wire(0xbeefu16).to_ne_bytes());

        let mut out = Vec::new();
        (-300i64).put(&mut out);
        assert_eq!(out, host_to_wire(-300i64).to_ne_bytes());

        let mut out = Vec::new();
        2.5f64.put(&mut out);
        assert_eq!(out, host_to_wire(2.5f64).to_bits().to_ne_bytes());
    }
}
