//! LEON encoding: values → bytes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bytes::{BufMut, BytesMut};

use super::encodable::Encodable;
use super::tag;
use super::varint;
use crate::error::LeonError;
use crate::stream::ByteWriter;
use crate::types::Value;

/// Serializes values into a byte sink.
///
/// Every operation returns the encoder again so calls can be chained:
///
/// ```
/// use leon::codec::Encoder;
///
/// let mut enc = Encoder::new(Vec::new());
/// enc.encode_string("LEON is simple")?
///     .encode_list_tag(2)?
///     .encode_bool(true)?
///     .encode_integer(945)?;
/// let bytes = enc.into_inner()?;
/// assert_eq!(bytes[0], 0x60 | 14);
/// # Ok::<(), leon::error::LeonError>(())
/// ```
///
/// A failed call may leave a partially written value in the sink; the output
/// should be discarded after any error.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    writer: ByteWriter<W>,
    scratch: BytesMut,
}

impl Encoder<BufWriter<File>> {
    /// Creates (or truncates) a file and encodes into it through a buffer.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LeonError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: ByteWriter::new(writer),
            scratch: BytesMut::with_capacity(varint::MAX_INTEGER_LEN + 1),
        }
    }

    /// Total bytes written to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.writer.written()
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Writes out whatever has been staged in the scratch buffer.
    fn emit(&mut self) -> Result<&mut Self, LeonError> {
        let result = self.writer.write_all(&self.scratch);
        self.scratch.clear();
        result?;
        Ok(self)
    }

    pub fn encode_null(&mut self) -> Result<&mut Self, LeonError> {
        self.scratch.put_u8(tag::NULL);
        self.emit()
    }

    pub fn encode_bool(&mut self, value: bool) -> Result<&mut Self, LeonError> {
        self.scratch.put_u8(if value { tag::TRUE } else { tag::FALSE });
        self.emit()
    }

    pub fn encode_float32(&mut self, value: f32) -> Result<&mut Self, LeonError> {
        self.scratch.put_u8(tag::FLOAT_32);
        self.scratch.put_f32_le(value);
        self.emit()
    }

    pub fn encode_double(&mut self, value: f64) -> Result<&mut Self, LeonError> {
        self.scratch.put_u8(tag::FLOAT_64);
        self.scratch.put_f64_le(value);
        self.emit()
    }

    /// Encodes an integer; `-32..=31` takes a single byte.
    pub fn encode_integer(&mut self, value: i64) -> Result<&mut Self, LeonError> {
        varint::put_integer(&mut self.scratch, value);
        self.emit()
    }

    /// Encodes a string (length = UTF-8 byte count, not char count).
    pub fn encode_string(&mut self, value: &str) -> Result<&mut Self, LeonError> {
        let len = value.len();
        if len <= tag::MAX_SMALL_STRING_LEN {
            self.scratch.put_u8(tag::small_string_tag(len));
        } else {
            self.scratch.put_u8(tag::STRING);
            varint::put_integer(&mut self.scratch, length_to_i64(len)?);
        }
        self.emit()?;
        self.writer.write_all(value.as_bytes())?;
        Ok(self)
    }

    /// Writes only a list header; the caller encodes `len` elements next.
    pub fn encode_list_tag(&mut self, len: usize) -> Result<&mut Self, LeonError> {
        if len <= tag::MAX_SMALL_LIST_LEN {
            self.scratch.put_u8(tag::small_list_tag(len));
        } else {
            self.scratch.put_u8(tag::LIST);
            varint::put_integer(&mut self.scratch, length_to_i64(len)?);
        }
        self.emit()
    }

    pub fn encode_list<T: Encodable>(&mut self, items: &[T]) -> Result<&mut Self, LeonError> {
        self.encode_list_tag(items.len())?;
        for item in items {
            item.encode_to(self)?;
        }
        Ok(self)
    }

    /// Writes only a bytes header; the caller streams `len` raw bytes next
    /// with [`encode_raw_bytes`](Self::encode_raw_bytes).
    pub fn encode_bytes_tag(&mut self, len: usize) -> Result<&mut Self, LeonError> {
        self.scratch.put_u8(tag::BYTES);
        varint::put_integer(&mut self.scratch, length_to_i64(len)?);
        self.emit()
    }

    pub fn encode_bytes(&mut self, value: &[u8]) -> Result<&mut Self, LeonError> {
        self.encode_bytes_tag(value.len())?;
        self.writer.write_all(value)?;
        Ok(self)
    }

    /// Writes payload bytes with no header.
    pub fn encode_raw_bytes(&mut self, data: &[u8]) -> Result<&mut Self, LeonError> {
        self.writer.write_all(data)?;
        Ok(self)
    }

    /// Writes only a map header; the caller encodes `size` key/value pairs next.
    pub fn encode_map_tag(&mut self, size: usize) -> Result<&mut Self, LeonError> {
        self.scratch.put_u8(tag::MAP);
        varint::put_integer(&mut self.scratch, length_to_i64(size)?);
        self.emit()
    }

    /// Encodes key/value pairs in the iteration order given.
    pub fn encode_map<'a, K, V, I>(&mut self, pairs: I) -> Result<&mut Self, LeonError>
    where
        K: Encodable + ?Sized + 'a,
        V: Encodable + ?Sized + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let pairs = pairs.into_iter();
        self.encode_map_tag(pairs.len())?;
        for (key, value) in pairs {
            key.encode_to(self)?;
            value.encode_to(self)?;
        }
        Ok(self)
    }

    /// Encodes a `Value` tree.
    pub fn encode_value(&mut self, value: &Value) -> Result<&mut Self, LeonError> {
        match value {
            Value::Null => self.encode_null(),
            Value::Bool(b) => self.encode_bool(*b),
            Value::Integer(i) => self.encode_integer(*i),
            Value::Float32(f) => self.encode_float32(*f),
            Value::Float64(f) => self.encode_double(*f),
            Value::String(s) => self.encode_string(s),
            Value::Bytes(b) => self.encode_bytes(b),
            Value::List(items) => self.encode_list(items),
            Value::Map(map) => self.encode_map(map),
        }
    }

    /// Encodes anything implementing [`Encodable`], including user types.
    pub fn encode<T: Encodable + ?Sized>(&mut self, value: &T) -> Result<&mut Self, LeonError> {
        value.encode_to(self)
    }

    pub fn flush(&mut self) -> Result<&mut Self, LeonError> {
        self.writer.flush()?;
        Ok(self)
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(self) -> Result<W, LeonError> {
        self.writer.into_inner()
    }

    /// Flushes, then releases the sink. A flush failure is returned, not dropped.
    pub fn close(self) -> Result<(), LeonError> {
        let written = self.bytes_written();
        let sink = self.into_inner()?;
        drop(sink);
        tracing::trace!(bytes = written, "LEON encoder closed");
        Ok(())
    }
}

fn length_to_i64(len: usize) -> Result<i64, LeonError> {
    i64::try_from(len)
        .map_err(|_| LeonError::unrepresentable(format!("length {len} exceeds the i64 range")))
}
