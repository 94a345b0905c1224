//! Signed variable-length integers.
//!
//! Values in `-32..=31` are a single terminal byte `00xxxxxx`. Anything else
//! is emitted as 7-bit groups, least significant first, in continuation bytes
//! `1xxxxxxx`, followed by a terminal byte. The value is shifted with sign
//! extension, so bit 5 of the terminal byte carries the sign of the whole
//! number. This is not zig-zag encoding.

use bytes::BufMut;

use super::tag::{
    self, CONTINUATION_BIT, CONTINUATION_PAYLOAD_MASK, SMALL_INT_MAX, SMALL_INT_MIN,
    SMALL_INT_PAYLOAD_MASK,
};

/// Longest encoding of an `i64`: nine continuation bytes and a terminal byte.
pub const MAX_INTEGER_LEN: usize = 10;

const MAX_CONTINUATIONS: u32 = MAX_INTEGER_LEN as u32 - 1;

fn fits_terminal(value: i64) -> bool {
    (SMALL_INT_MIN..=SMALL_INT_MAX).contains(&value)
}

/// Appends the encoding of `value` to `buf`.
pub fn put_integer(buf: &mut impl BufMut, mut value: i64) {
    while !fits_terminal(value) {
        buf.put_u8((value as u8 & CONTINUATION_PAYLOAD_MASK) | CONTINUATION_BIT);
        value >>= 7;
    }
    buf.put_u8(value as u8 & SMALL_INT_PAYLOAD_MASK);
}

/// Number of bytes [`put_integer`] emits for `value`.
pub fn encoded_len(mut value: i64) -> usize {
    let mut len = 1;
    while !fits_terminal(value) {
        value >>= 7;
        len += 1;
    }
    len
}

/// Outcome of feeding one byte to an [`IntegerAccumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    More,
    Done(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerError {
    /// More continuation bytes than an `i64` needs, or a result outside `i64`.
    Overflow,
    /// A byte in `0x40..=0x7F`, which is neither a continuation nor a terminal byte.
    UnexpectedByte(u8),
}

/// Reassembles an integer one byte at a time.
#[derive(Debug, Default)]
pub struct IntegerAccumulator {
    low: u64,
    shift: u32,
    continuations: u32,
}

impl IntegerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) -> Result<Step, IntegerError> {
        if tag::is_continuation(byte) {
            if self.continuations == MAX_CONTINUATIONS {
                return Err(IntegerError::Overflow);
            }
            self.low |= u64::from(byte & CONTINUATION_PAYLOAD_MASK) << self.shift;
            self.shift += 7;
            self.continuations += 1;
            return Ok(Step::More);
        }
        if !tag::is_small_int(byte) {
            return Err(IntegerError::UnexpectedByte(byte));
        }
        let high = i128::from(tag::small_int_value(byte)) << self.shift;
        let value = i128::from(self.low) + high;
        i64::try_from(value)
            .map(Step::Done)
            .map_err(|_| IntegerError::Overflow)
    }
}
