//! LEON binary encoding and decoding.
//!
//! Every value starts with a one-byte tag. Small integers, short strings and
//! short lists carry their value or length inside the tag; everything larger
//! is followed by an integer length prefix.

pub mod decode;
pub mod encodable;
pub mod encode;
pub mod options;
pub mod tag;
pub mod varint;

pub use decode::{Decoder, Values};
pub use encodable::Encodable;
pub use encode::Encoder;
pub use options::{DecoderOptions, DuplicateKeys};
pub use tag::{Kind, Tag};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::LeonError;
use crate::types::Value;

/// Encodes a value into a new byte vector.
pub fn to_vec<T: Encodable + ?Sized>(value: &T) -> Result<Vec<u8>, LeonError> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(value)?;
    encoder.into_inner()
}

/// Encodes a value into a frozen `Bytes` buffer.
pub fn to_bytes<T: Encodable + ?Sized>(value: &T) -> Result<Bytes, LeonError> {
    let mut encoder = Encoder::new(BytesMut::new().writer());
    encoder.encode(value)?;
    Ok(encoder.into_inner()?.into_inner().freeze())
}

/// Decodes exactly one value from `data`.
///
/// Bytes left over after the value fail with [`LeonError::TrailingData`].
pub fn from_slice(data: &[u8]) -> Result<Value, LeonError> {
    let mut decoder = Decoder::new(data);
    let value = decoder.decode_value()?;
    let offset = decoder.position();
    if !decoder.into_inner().is_empty() {
        return Err(LeonError::TrailingData { offset });
    }
    Ok(value)
}
