//! The `Encodable` extension point and its implementations for common types.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::io::Write;

use super::Encoder;
use crate::error::LeonError;
use crate::types::{Map, Value};

/// A type that knows how to write itself with an [`Encoder`].
///
/// Implementations call the encoder's public operations and hand the encoder
/// back, so user types can sit anywhere a built-in value can:
///
/// ```
/// use std::io::Write;
/// use leon::codec::{Encodable, Encoder};
/// use leon::error::LeonError;
///
/// struct Point { x: i64, y: i64 }
///
/// impl Encodable for Point {
///     fn encode_to<'e, W: Write>(
///         &self,
///         encoder: &'e mut Encoder<W>,
///     ) -> Result<&'e mut Encoder<W>, LeonError> {
///         encoder.encode_list_tag(2)?.encode_integer(self.x)?.encode_integer(self.y)
///     }
/// }
///
/// let bytes = leon::codec::to_vec(&vec![Point { x: 1, y: -1 }])?;
/// assert_eq!(bytes, [0x51, 0x52, 0x01, 0x3F]);
/// # Ok::<(), LeonError>(())
/// ```
pub trait Encodable {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError>;
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        (**self).encode_to(encoder)
    }
}

impl<T: Encodable + ?Sized> Encodable for Box<T> {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        (**self).encode_to(encoder)
    }
}

impl Encodable for Value {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_value(self)
    }
}

impl Encodable for Map {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_map(self)
    }
}

impl Encodable for bool {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_bool(*self)
    }
}

impl Encodable for f32 {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_float32(*self)
    }
}

impl Encodable for f64 {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_double(*self)
    }
}

// Integers that always fit in an i64.
macro_rules! encodable_lossless_int {
    ($($t:ty),*) => {$(
        impl Encodable for $t {
            fn encode_to<'e, W: Write>(
                &self,
                encoder: &'e mut Encoder<W>,
            ) -> Result<&'e mut Encoder<W>, LeonError> {
                encoder.encode_integer(i64::from(*self))
            }
        }
    )*};
}

// Integers that may fall outside the i64 range.
macro_rules! encodable_checked_int {
    ($($t:ty),*) => {$(
        impl Encodable for $t {
            fn encode_to<'e, W: Write>(
                &self,
                encoder: &'e mut Encoder<W>,
            ) -> Result<&'e mut Encoder<W>, LeonError> {
                let value = i64::try_from(*self).map_err(|_| {
                    LeonError::unrepresentable(format!(
                        "{} integer {} exceeds the i64 range",
                        stringify!($t),
                        self,
                    ))
                })?;
                encoder.encode_integer(value)
            }
        }
    )*};
}

// u8 is deliberately absent so that byte buffers are never mistaken for lists.
encodable_lossless_int!(i8, i16, i32, i64, u16, u32);
encodable_checked_int!(isize, usize, u64, i128, u128);

impl Encodable for str {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_string(self)
    }
}

impl Encodable for String {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_string(self)
    }
}

impl Encodable for bytes::Bytes {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_bytes(self)
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        match self {
            Some(v) => v.encode_to(encoder),
            None => encoder.encode_null(),
        }
    }
}

impl<T: Encodable> Encodable for [T] {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_list(self)
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_list(self)
    }
}

impl<K: Encodable, V: Encodable, S: BuildHasher> Encodable for HashMap<K, V, S> {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_map(self)
    }
}

impl<K: Encodable, V: Encodable> Encodable for BTreeMap<K, V> {
    fn encode_to<'e, W: Write>(
        &self,
        encoder: &'e mut Encoder<W>,
    ) -> Result<&'e mut Encoder<W>, LeonError> {
        encoder.encode_map(self)
    }
}
