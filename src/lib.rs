//! Tagpack - compact, self-describing binary serialization for Rust
//!
//! Every value on the wire starts with a tag byte naming its storage class,
//! so a buffer can be classified, skipped or rendered without a schema. The
//! byte layout is the MessagePack format.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use tagpack::{Decoder, Encoder, Result, SemanticType};
//!
//! fn main() -> Result<()> {
//!     // Encoding
//!     let mut encoder = Encoder::new();
//!     encoder.write_i32(42).write_str("hello");
//!     encoder.write_map([("a", 1u32), ("b", 300)]);
//!     let data = encoder.into_bytes();
//!
//!     // Decoding
//!     let mut decoder = Decoder::new(data);
//!     assert_eq!(decoder.classify()?, SemanticType::Int8);
//!     assert_eq!(decoder.read_i32()?, 42);
//!     assert_eq!(decoder.read_str()?, "hello");
//!
//!     let map: BTreeMap<String, u32> = decoder.read_map()?;
//!     assert_eq!(map["b"], 300);
//!     assert!(decoder.is_empty());
//!     Ok(())
//! }
//! ```

mod decoder;
mod encoder;
pub mod endian;
mod error;
mod render;
mod types;

pub use decoder::{decode_from, Decode, Decoder, DEFAULT_MAX_DEPTH};
pub use encoder::{to_vec, Encode, Encoder};
pub use error::{Error, Result};
pub use render::render;
pub use types::{tag, SemanticType, StorageClass};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Encodes a value using a custom encoder function.
pub fn marshal<T, F>(value: &T, encode: F) -> Vec<u8>
where
    T: ?Sized,
    F: FnOnce(&mut Encoder, &T),
{
    let mut encoder = Encoder::new();
    encode(&mut encoder, value);
    encoder.into_bytes()
}

/// Decodes a value using a custom decoder function.
pub fn unmarshal<T, F>(data: &[u8], decode: F) -> Result<T>
where
    F: FnOnce(&mut Decoder) -> Result<T>,
{
    let mut decoder = Decoder::from_slice(data);
    decode(&mut decoder)
}
