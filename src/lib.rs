//! LEON: a compact, self-describing binary serialization format.
//!
//! This crate encodes and decodes LEON values over any `std::io` byte stream.
//! Values are dynamically typed: null, booleans, 64-bit integers, 32/64-bit
//! floats, UTF-8 strings, byte strings, lists and maps with arbitrary keys.
//!
//! # Architecture
//!
//! - **`codec`**: Tag table, integer encoding, `Encoder`, `Decoder` and the `Encodable` trait
//! - **`stream`**: Offset-tracking byte readers and writers
//! - **`types`**: The dynamic `Value` model and its `Map` container
//! - **`error`**: `LeonError`, the single error type for every operation
//!
//! ```
//! use leon::{Decoder, Encoder, Value};
//!
//! let mut enc = Encoder::new(Vec::new());
//! enc.encode_string("Hello!")?.encode_integer(-741)?.encode_null()?;
//! let bytes = enc.into_inner()?;
//!
//! let mut dec = Decoder::new(&bytes[..]);
//! assert_eq!(dec.decode_string()?, "Hello!");
//! assert_eq!(dec.decode_integer()?, -741);
//! assert_eq!(dec.decode_value()?, Value::Null);
//! assert_eq!(dec.next_value()?, None);
//! # Ok::<(), leon::LeonError>(())
//! ```

pub mod codec;
pub mod error;
pub mod stream;
pub mod types;

pub use codec::{Decoder, Encodable, Encoder, from_slice, to_bytes, to_vec};
pub use error::LeonError;
pub use types::{Map, Value};
