//! JSON-like debug rendering of encoded values.
//!
//! The renderer treats a decoder as holding zero or more successive top-level
//! values and wraps them all in one outer pair of braces:
//!
//! ```rust
//! use tagpack::{render, Decoder, Encoder};
//!
//! let mut enc = Encoder::new();
//! enc.write_i32(1).write_str("test").pack(&[1u8, 2]);
//! let mut dec = Decoder::new(enc.into_bytes());
//! assert_eq!(render(&mut dec).unwrap(), r#"{1,"test",[1,2]}"#);
//! ```
//!
//! Map keys keep their rendered form, so `1` and `"1"` stay distinct. Entries
//! are sorted with integer keys in numeric order first, then string keys, then
//! any other key. Binary payloads render as a quoted hex string, extensions as
//! `"ext:<type>:<hex>"`. Non-finite floats render as `null`.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::types::SemanticType;

/// Renders every value left in `decoder`, consuming them.
pub fn render(decoder: &mut Decoder) -> Result<String> {
    render_at(decoder, 0)
}

fn render_at(decoder: &mut Decoder, depth: usize) -> Result<String> {
    if depth == 0 {
        let mut values = Vec::new();
        while !decoder.is_empty() {
            values.push(render_at(decoder, 1)?);
        }
        return Ok(format!("{{{}}}", values.join(",")));
    }

    let text = match decoder.classify()? {
        SemanticType::Null => {
            decoder.skip()?;
            "null".to_string()
        }
        SemanticType::Boolean => decoder.read_bool()?.to_string(),
        SemanticType::Int8 | SemanticType::Int16 | SemanticType::Int32 | SemanticType::Int64 => {
            decoder.read_i64()?.to_string()
        }
        SemanticType::Uint8
        | SemanticType::Uint16
        | SemanticType::Uint32
        | SemanticType::Uint64 => decoder.read_u64()?.to_string(),
        SemanticType::Float32 => {
            let value = decoder.read_f32()?;
            finite_or_null(value.is_finite(), value)
        }
        SemanticType::Float64 => {
            let value = decoder.read_f64()?;
            finite_or_null(value.is_finite(), value)
        }
        SemanticType::String => quote(&String::from_utf8_lossy(&decoder.read_str_bytes()?)),
        SemanticType::Binary => quote(&hex::encode(raw_payload(decoder)?)),
        SemanticType::Extension => {
            // type byte, then data
            let payload = raw_payload(decoder)?;
            let ext_type = payload.first().copied().unwrap_or_default() as i8;
            let data = payload.get(1..).unwrap_or_default();
            quote(&format!("ext:{}:{}", ext_type, hex::encode(data)))
        }
        SemanticType::Array => {
            let len = decoder.read_array_len()?;
            check_depth(decoder, depth)?;
            let mut items = Vec::with_capacity(len.min(decoder.remaining()));
            for _ in 0..len {
                items.push(render_at(decoder, depth + 1)?);
            }
            format!("[{}]", items.join(","))
        }
        SemanticType::Map => {
            let len = decoder.read_map_len()?;
            check_depth(decoder, depth)?;
            let mut entries = BTreeMap::new();
            for _ in 0..len {
                let key = MapKey::read(decoder, depth + 1)?;
                let value = render_at(decoder, depth + 1)?;
                entries.insert(key, value);
            }
            let mut out = String::from("{");
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                key.write_to(&mut out);
                out.push(':');
                out.push_str(value);
            }
            out.push('}');
            out
        }
        SemanticType::Unknown => {
            let tag = decoder.as_bytes().first().copied().unwrap_or_default();
            return Err(Error::Conversion(tag));
        }
    };
    Ok(text)
}

/// Rendered map key. Integers sort numerically ahead of strings, and
/// any other key sorts last by its rendered text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum MapKey {
    Integer(i128),
    String(String),
    Other(String),
}

impl MapKey {
    fn read(decoder: &mut Decoder, depth: usize) -> Result<Self> {
        let key = match decoder.classify()? {
            SemanticType::String => {
                MapKey::String(String::from_utf8_lossy(&decoder.read_str_bytes()?).into_owned())
            }
            SemanticType::Uint8
            | SemanticType::Uint16
            | SemanticType::Uint32
            | SemanticType::Uint64 => MapKey::Integer(i128::from(decoder.read_u64()?)),
            kind if kind.is_integer() => MapKey::Integer(i128::from(decoder.read_i64()?)),
            _ => MapKey::Other(render_at(decoder, depth)?),
        };
        Ok(key)
    }

    fn write_to(&self, out: &mut String) {
        match self {
            MapKey::Integer(n) => {
                let _ = write!(out, "{n}");
            }
            MapKey::String(s) => out.push_str(&quote(s)),
            MapKey::Other(text) => out.push_str(text),
        }
    }
}

/// NaN and the infinities have no JSON number form.
fn finite_or_null(finite: bool, value: impl std::fmt::Display) -> String {
    if finite {
        value.to_string()
    } else {
        "null".to_string()
    }
}

fn check_depth(decoder: &Decoder, depth: usize) -> Result<()> {
    if depth > decoder.max_depth() {
        return Err(Error::DepthLimitExceeded(decoder.max_depth()));
    }
    Ok(())
}

/// Splits off the value at the cursor and returns the bytes after its header.
fn raw_payload(decoder: &mut Decoder) -> Result<Vec<u8>> {
    let header = 1 + decoder.storage_class()?.length_width();
    let view = decoder.sub_view()?;
    Ok(view.as_bytes().get(header..).unwrap_or_default().to_vec())
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;

    fn rendered(f: impl FnOnce(&mut Encoder)) -> String {
        let mut encoder = Encoder::new();
        f(&mut encoder);
        render(&mut Decoder::new(encoder.into_bytes())).unwrap()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&mut Decoder::default()).unwrap(), "{}");
    }

    #[test]
    fn test_render_scalars() {
        let text = rendered(|e| {
            e.write_nil()
                .write_bool(true)
                .write_i32(-63)
                .write_u64(u64::MAX)
                .write_f64(2.5)
                .write_f32(-0.5);
        });
        assert_eq!(text, "{null,true,-63,18446744073709551615,2.5,-0.5}");
    }

    #[test]
    fn test_render_string_escapes() {
        let text = rendered(|e| {
            e.write_str("a\"b\\c\n\u{1}");
        });
        assert_eq!(text, r#"{"a\"b\\c\n\u0001"}"#);
    }

    #[test]
    fn test_render_nested() {
        let text = rendered(|e| {
            e.write_array_len(3).write_i32(1).write_str("x");
            e.write_map([("b", vec![1u8, 2]), ("a", vec![])]);
        });
        assert_eq!(text, r#"{[1,"x",{"a":[],"b":[1,2]}]}"#);
    }

    #[test]
    fn test_render_map_non_string_keys_sorted() {
        let text = rendered(|e| {
            e.write_map([(2, true), (1, false)]);
        });
        assert_eq!(text, "{{1:false,2:true}}");
    }

    #[test]
    fn test_render_map_keys_keep_their_type() {
        let text = rendered(|e| {
            e.write_map_len(3)
                .write_i32(1)
                .write_bool(true)
                .write_str("1")
                .write_bool(false)
                .write_i32(10)
                .write_nil();
        });
        assert_eq!(text, r#"{{1:true,10:null,"1":false}}"#);
    }

    #[test]
    fn test_render_map_integer_keys_sort_numerically() {
        let text = rendered(|e| {
            e.write_map([(2, 0), (10, 1)]);
        });
        assert_eq!(text, "{{2:0,10:1}}");

        let text = rendered(|e| {
            e.write_map_len(3)
                .write_u64(u64::MAX)
                .write_nil()
                .write_i32(-5)
                .write_nil()
                .write_u32(200)
                .write_nil();
        });
        assert_eq!(text, "{{-5:null,200:null,18446744073709551615:null}}");
    }

    #[test]
    fn test_render_map_duplicate_key_keeps_last() {
        let mut decoder = Decoder::new(vec![0x82, 0x01, 0x0a, 0x01, 0x0b]);
        assert_eq!(render(&mut decoder).unwrap(), "{{1:11}}");
    }

    #[test]
    fn test_render_invalid_utf8_is_lossy() {
        let mut decoder = Decoder::new(vec![0xa2, 0xff, b'a']);
        assert_eq!(render(&mut decoder).unwrap(), "{\"\u{fffd}a\"}");
    }

    #[test]
    fn test_render_non_finite_floats() {
        let text = rendered(|e| {
            e.write_f64(f64::NAN)
                .write_f32(f32::INFINITY)
                .write_f64(f64::NEG_INFINITY)
                .write_f32(0.25);
        });
        assert_eq!(text, "{null,null,null,0.25}");
    }

    #[test]
    fn test_render_binary_and_extension() {
        let mut decoder = Decoder::new(vec![0xc4, 0x02, 0xde, 0xad, 0xd4, 0x05, 0xff]);
        assert_eq!(render(&mut decoder).unwrap(), r#"{"dead","ext:5:ff"}"#);

        let mut decoder = Decoder::new(vec![0xc7, 0x01, 0xfe, 0x0a]);
        assert_eq!(render(&mut decoder).unwrap(), r#"{"ext:-2:0a"}"#);
    }

    #[test]
    fn test_render_consumes_decoder() {
        let mut decoder = Decoder::new(vec![0x01, 0x02]);
        assert_eq!(decoder.to_debug_string().unwrap(), "{1,2}");
        assert_eq!(decoder.remaining(), 2);
        assert_eq!(render(&mut decoder).unwrap(), "{1,2}");
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_render_errors() {
        let mut decoder = Decoder::new(vec![0xc1]);
        assert_eq!(render(&mut decoder), Err(Error::Conversion(0xc1)));

        let mut decoder = Decoder::new(vec![0x92, 0x01]);
        assert!(render(&mut decoder).unwrap_err().is_underflow());

        let mut decoder = Decoder::new(vec![0x91, 0x91, 0x91, 0x00]).with_max_depth(2);
        assert_eq!(render(&mut decoder), Err(Error::DepthLimitExceeded(2)));
    }
}
