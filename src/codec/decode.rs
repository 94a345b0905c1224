//! LEON decoding: bytes → values, with tag-level streaming and skipping.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bytes::Buf;

use super::options::{DecoderOptions, DuplicateKeys};
use super::tag::{self, Kind, Tag};
use super::varint::{IntegerAccumulator, IntegerError, Step};
use crate::error::LeonError;
use crate::stream::ByteReader;
use crate::types::{Map, Value};

/// Reads values from a byte source.
///
/// Besides whole-value decoding there is a tag-level API: [`peek_tag`]
/// consumes one tag byte, and the caller passes that tag to one of the
/// `*_with_tag` methods to decode the payload, or to [`skip`] to discard it.
///
/// ```
/// use leon::codec::{to_vec, Decoder};
/// use leon::types::Value;
///
/// let bytes = to_vec(&vec![Value::from("skip me"), Value::from(42)])?;
/// let mut dec = Decoder::new(&bytes[..]);
/// let tag = dec.peek_tag()?;
/// assert_eq!(dec.decode_list_length_with_tag(tag)?, 2);
/// let tag = dec.peek_tag()?;
/// dec.skip(tag)?;
/// assert_eq!(dec.decode_integer()?, 42);
/// assert!(dec.peek_tag()?.is_eof());
/// # Ok::<(), leon::error::LeonError>(())
/// ```
///
/// After any error the stream position is indeterminate; the decoder should
/// be dropped rather than reused.
///
/// [`peek_tag`]: Self::peek_tag
/// [`skip`]: Self::skip
#[derive(Debug)]
pub struct Decoder<R> {
    reader: ByteReader<R>,
    options: DecoderOptions,
}

impl Decoder<BufReader<File>> {
    /// Opens a file and decodes from it through a buffer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LeonError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecoderOptions::default())
    }

    pub fn with_options(reader: R, options: DecoderOptions) -> Self {
        Self {
            reader: ByteReader::new(reader),
            options,
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Number of bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.reader.offset()
    }

    pub fn get_ref(&self) -> &R {
        self.reader.get_ref()
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Releases the source.
    pub fn close(self) -> Result<(), LeonError> {
        tracing::trace!(bytes = self.position(), "LEON decoder closed");
        drop(self.into_inner());
        Ok(())
    }

    // -- Tag level --

    /// Reads the next tag byte, leaving its payload unread.
    ///
    /// End of input yields [`Tag::Eof`]; a reserved byte fails with
    /// [`LeonError::InvalidTag`].
    pub fn peek_tag(&mut self) -> Result<Tag, LeonError> {
        match self.reader.read_byte()? {
            None => Ok(Tag::Eof),
            Some(byte) => self.validate(byte),
        }
    }

    /// Reads a tag that must be present because an enclosing value is not
    /// finished yet.
    fn inner_tag(&mut self, context: &'static str) -> Result<Tag, LeonError> {
        let byte = self.required_byte(context)?;
        self.validate(byte)
    }

    fn validate(&self, byte: u8) -> Result<Tag, LeonError> {
        if tag::is_valid(byte) {
            return Ok(Tag::Byte(byte));
        }
        let offset = self.last_offset();
        tracing::debug!(offset, byte, "invalid LEON tag");
        Err(LeonError::InvalidTag { byte, offset })
    }

    fn required_byte(&mut self, context: &'static str) -> Result<u8, LeonError> {
        match self.reader.read_byte()? {
            Some(byte) => Ok(byte),
            None => Err(self.reader.truncated(context, 1, 0)),
        }
    }

    /// Offset of the byte most recently read.
    fn last_offset(&self) -> u64 {
        self.reader.offset().saturating_sub(1)
    }

    /// Checks that `tag` introduces a value of `kind` and returns its byte.
    fn expect_kind(&self, tag: Tag, kind: Kind) -> Result<u8, LeonError> {
        match tag {
            Tag::Eof => Err(self.reader.truncated(kind.name(), 1, 0)),
            Tag::Byte(byte) if tag::classify(byte) == Some(kind) => Ok(byte),
            Tag::Byte(_) => Err(self.malformed(kind.name(), tag)),
        }
    }

    fn malformed(&self, expected: &'static str, found: Tag) -> LeonError {
        LeonError::MalformedDecode {
            expected,
            found,
            offset: self.last_offset(),
        }
    }

    fn descend(&self, depth: usize) -> Result<usize, LeonError> {
        let limit = self.options.get_max_depth();
        if depth >= limit {
            tracing::debug!(limit, offset = self.reader.offset(), "LEON nesting limit exceeded");
            return Err(LeonError::NestingTooDeep { limit });
        }
        Ok(depth + 1)
    }

    // -- Scalars --

    pub fn decode_null_with_tag(&mut self, tag: Tag) -> Result<(), LeonError> {
        self.expect_kind(tag, Kind::Null).map(drop)
    }

    pub fn decode_bool_with_tag(&mut self, tag: Tag) -> Result<bool, LeonError> {
        match tag {
            Tag::Byte(tag::TRUE) => Ok(true),
            Tag::Byte(tag::FALSE) => Ok(false),
            Tag::Eof => Err(self.reader.truncated("boolean", 1, 0)),
            Tag::Byte(_) => Err(self.malformed("boolean", tag)),
        }
    }

    pub fn decode_float32_with_tag(&mut self, tag: Tag) -> Result<f32, LeonError> {
        self.expect_kind(tag, Kind::Float32)?;
        self.read_float32()
    }

    pub fn decode_double_with_tag(&mut self, tag: Tag) -> Result<f64, LeonError> {
        self.expect_kind(tag, Kind::Float64)?;
        self.read_float64()
    }

    fn read_float32(&mut self) -> Result<f32, LeonError> {
        let raw = self.reader.read_array::<4>("float32 payload")?;
        let mut payload = &raw[..];
        Ok(payload.get_f32_le())
    }

    fn read_float64(&mut self) -> Result<f64, LeonError> {
        let raw = self.reader.read_array::<8>("float64 payload")?;
        let mut payload = &raw[..];
        Ok(payload.get_f64_le())
    }

    pub fn decode_integer_with_tag(&mut self, tag: Tag) -> Result<i64, LeonError> {
        let byte = self.expect_kind(tag, Kind::Integer)?;
        self.read_integer_from(byte)
    }

    /// Finishes an integer whose first byte has already been read.
    fn read_integer_from(&mut self, first: u8) -> Result<i64, LeonError> {
        let mut acc = IntegerAccumulator::new();
        let mut byte = first;
        loop {
            match acc.push(byte) {
                Ok(Step::Done(value)) => return Ok(value),
                Ok(Step::More) => {}
                Err(IntegerError::Overflow) => {
                    return Err(LeonError::IntegerOverflow {
                        offset: self.last_offset(),
                    });
                }
                Err(IntegerError::UnexpectedByte(b)) => {
                    return Err(self.malformed("integer continuation", Tag::Byte(b)));
                }
            }
            byte = self.required_byte("integer")?;
        }
    }

    /// Reads a length or size prefix, which is itself an integer value.
    fn read_length(&mut self, context: &'static str) -> Result<usize, LeonError> {
        let byte = self.required_byte(context)?;
        if !tag::is_int(byte) {
            return Err(self.malformed(context, Tag::Byte(byte)));
        }
        let length = self.read_integer_from(byte)?;
        usize::try_from(length).map_err(|_| LeonError::InvalidLength {
            length,
            offset: self.last_offset(),
        })
    }

    // -- Strings and bytes --

    fn string_length(&mut self, byte: u8) -> Result<usize, LeonError> {
        if tag::is_small_string(byte) {
            Ok(tag::small_string_len(byte))
        } else if tag::is_big_string(byte) {
            self.read_length("string size")
        } else {
            Err(LeonError::InternalInvariant(format!(
                "tag 0x{byte:02X} classified as string but matches neither string form"
            )))
        }
    }

    pub fn decode_string_with_tag(&mut self, tag: Tag) -> Result<String, LeonError> {
        let byte = self.expect_kind(tag, Kind::String)?;
        let len = self.string_length(byte)?;
        let start = self.reader.offset();
        let data = self.reader.read_vec(len, "string payload")?;
        String::from_utf8(data).map_err(|source| LeonError::InvalidUtf8 {
            offset: start,
            source,
        })
    }

    pub fn decode_bytes_size_with_tag(&mut self, tag: Tag) -> Result<usize, LeonError> {
        self.expect_kind(tag, Kind::Bytes)?;
        self.read_length("bytes size")
    }

    pub fn decode_bytes_with_tag(&mut self, tag: Tag) -> Result<Vec<u8>, LeonError> {
        let len = self.decode_bytes_size_with_tag(tag)?;
        self.reader.read_vec(len, "bytes payload")
    }

    /// Reads raw payload bytes into `buf` after a bytes header.
    ///
    /// Performs a single read and returns how many bytes arrived, which may
    /// be fewer than `buf.len()`; the caller loops until the declared size
    /// has been consumed.
    pub fn decode_raw_bytes(&mut self, buf: &mut [u8]) -> Result<usize, LeonError> {
        self.reader.read_some(buf)
    }

    // -- Containers --

    pub fn decode_list_length_with_tag(&mut self, tag: Tag) -> Result<usize, LeonError> {
        let byte = self.expect_kind(tag, Kind::List)?;
        if tag::is_small_list(byte) {
            Ok(tag::small_list_len(byte))
        } else if tag::is_big_list(byte) {
            self.read_length("list length")
        } else {
            Err(LeonError::InternalInvariant(format!(
                "tag 0x{byte:02X} classified as list but matches neither list form"
            )))
        }
    }

    pub fn decode_list_with_tag(&mut self, tag: Tag) -> Result<Vec<Value>, LeonError> {
        self.decode_list_at(tag, 0)
    }

    fn decode_list_at(&mut self, tag: Tag, depth: usize) -> Result<Vec<Value>, LeonError> {
        let len = self.decode_list_length_with_tag(tag)?;
        let depth = self.descend(depth)?;
        let mut items = Vec::with_capacity(len.min(self.options.get_max_preallocation()));
        for _ in 0..len {
            let tag = self.inner_tag("list element")?;
            items.push(self.decode_value_at(tag, depth)?);
        }
        Ok(items)
    }

    pub fn decode_map_size_with_tag(&mut self, tag: Tag) -> Result<usize, LeonError> {
        self.expect_kind(tag, Kind::Map)?;
        self.read_length("map size")
    }

    /// Decodes a map. Repeated keys follow the configured [`DuplicateKeys`] policy.
    pub fn decode_map_with_tag(&mut self, tag: Tag) -> Result<Map, LeonError> {
        self.decode_map_at(tag, 0)
    }

    fn decode_map_at(&mut self, tag: Tag, depth: usize) -> Result<Map, LeonError> {
        let size = self.decode_map_size_with_tag(tag)?;
        let depth = self.descend(depth)?;
        let mut map = Map::with_capacity(size.min(self.options.get_max_preallocation()));
        for _ in 0..size {
            let key_offset = self.reader.offset();
            let key_tag = self.inner_tag("map key")?;
            let key = self.decode_value_at(key_tag, depth)?;
            let value_tag = self.inner_tag("map value")?;
            let value = self.decode_value_at(value_tag, depth)?;
            match self.options.get_duplicate_keys() {
                DuplicateKeys::LastWins => {
                    if map.insert(key, value).is_some() {
                        tracing::trace!(offset = key_offset, "duplicate LEON map key overwritten");
                    }
                }
                DuplicateKeys::Reject => {
                    if map.contains_key(&key) {
                        return Err(LeonError::DuplicateKey {
                            key: key.to_string(),
                            offset: key_offset,
                        });
                    }
                    map.insert(key, value);
                }
            }
        }
        Ok(map)
    }

    // -- Generic values --

    /// Decodes the payload of any valid tag into a `Value`.
    pub fn decode_value_with_tag(&mut self, tag: Tag) -> Result<Value, LeonError> {
        self.decode_value_at(tag, 0)
    }

    fn decode_value_at(&mut self, tag: Tag, depth: usize) -> Result<Value, LeonError> {
        let byte = match tag {
            Tag::Eof => return Err(self.reader.truncated("value", 1, 0)),
            Tag::Byte(byte) => byte,
        };
        match tag::classify(byte) {
            Some(Kind::Integer) => self.read_integer_from(byte).map(Value::Integer),
            Some(Kind::Null) => Ok(Value::Null),
            Some(Kind::True) => Ok(Value::Bool(true)),
            Some(Kind::False) => Ok(Value::Bool(false)),
            Some(Kind::Float32) => self.read_float32().map(Value::Float32),
            Some(Kind::Float64) => self.read_float64().map(Value::Float64),
            Some(Kind::String) => self.decode_string_with_tag(tag).map(Value::String),
            Some(Kind::Bytes) => self.decode_bytes_with_tag(tag).map(Value::Bytes),
            Some(Kind::List) => self.decode_list_at(tag, depth).map(Value::List),
            Some(Kind::Map) => self.decode_map_at(tag, depth).map(Value::Map),
            None => Err(LeonError::InvalidTag {
                byte,
                offset: self.last_offset(),
            }),
        }
    }

    /// Decodes one complete value. End of input here is a truncation error.
    pub fn decode_value(&mut self) -> Result<Value, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_value_with_tag(tag)
    }

    /// Decodes one value, or returns `None` at a clean end of input.
    pub fn next_value(&mut self) -> Result<Option<Value>, LeonError> {
        match self.peek_tag()? {
            Tag::Eof => Ok(None),
            tag => self.decode_value_with_tag(tag).map(Some),
        }
    }

    /// Iterates over the remaining values until end of input or the first error.
    pub fn values(&mut self) -> Values<'_, R> {
        Values {
            decoder: self,
            done: false,
        }
    }

    // -- Tag-less conveniences --

    pub fn decode_null(&mut self) -> Result<(), LeonError> {
        let tag = self.peek_tag()?;
        self.decode_null_with_tag(tag)
    }

    pub fn decode_bool(&mut self) -> Result<bool, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_bool_with_tag(tag)
    }

    pub fn decode_float32(&mut self) -> Result<f32, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_float32_with_tag(tag)
    }

    pub fn decode_double(&mut self) -> Result<f64, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_double_with_tag(tag)
    }

    pub fn decode_integer(&mut self) -> Result<i64, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_integer_with_tag(tag)
    }

    pub fn decode_string(&mut self) -> Result<String, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_string_with_tag(tag)
    }

    pub fn decode_bytes(&mut self) -> Result<Vec<u8>, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_bytes_with_tag(tag)
    }

    pub fn decode_list(&mut self) -> Result<Vec<Value>, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_list_with_tag(tag)
    }

    pub fn decode_map(&mut self) -> Result<Map, LeonError> {
        let tag = self.peek_tag()?;
        self.decode_map_with_tag(tag)
    }

    // -- Skipping --

    /// Discards the payload introduced by `tag` without building any value.
    ///
    /// Consumes exactly the bytes the matching decode would. String contents
    /// are not checked for valid UTF-8. `Tag::Eof` is a no-op.
    pub fn skip(&mut self, tag: Tag) -> Result<(), LeonError> {
        self.skip_at(tag, 0)
    }

    /// Reads one tag and skips its value. Returns `false` at end of input.
    pub fn skip_value(&mut self) -> Result<bool, LeonError> {
        match self.peek_tag()? {
            Tag::Eof => Ok(false),
            tag => self.skip(tag).map(|()| true),
        }
    }

    fn skip_at(&mut self, tag: Tag, depth: usize) -> Result<(), LeonError> {
        let byte = match tag {
            Tag::Eof => return Ok(()),
            Tag::Byte(byte) => byte,
        };
        let Some(kind) = tag::classify(byte) else {
            return Err(LeonError::InvalidTag {
                byte,
                offset: self.last_offset(),
            });
        };
        tracing::trace!(%kind, offset = self.last_offset(), "skipping LEON value");
        match kind {
            Kind::Integer => self.read_integer_from(byte).map(drop),
            Kind::Null | Kind::True | Kind::False => Ok(()),
            Kind::Float32 => self.reader.discard(4, "float32 payload"),
            Kind::Float64 => self.reader.discard(8, "float64 payload"),
            Kind::String => {
                let len = self.string_length(byte)?;
                self.reader.discard(len as u64, "string payload")
            }
            Kind::Bytes => {
                let len = self.read_length("bytes size")?;
                self.reader.discard(len as u64, "bytes payload")
            }
            Kind::List => {
                let len = self.decode_list_length_with_tag(tag)?;
                let depth = self.descend(depth)?;
                for _ in 0..len {
                    let tag = self.inner_tag("list element")?;
                    self.skip_at(tag, depth)?;
                }
                Ok(())
            }
            Kind::Map => {
                let size = self.read_length("map size")?;
                let depth = self.descend(depth)?;
                for _ in 0..size {
                    let key = self.inner_tag("map key")?;
                    self.skip_at(key, depth)?;
                    let value = self.inner_tag("map value")?;
                    self.skip_at(value, depth)?;
                }
                Ok(())
            }
        }
    }
}

/// Iterator returned by [`Decoder::values`].
#[derive(Debug)]
pub struct Values<'a, R> {
    decoder: &'a mut Decoder<R>,
    done: bool,
}

impl<R: Read> Iterator for Values<'_, R> {
    type Item = Result<Value, LeonError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.next_value() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Values<'_, R> {}
