//! LEON tag byte constants and classification.
//!
//! Every encoded value starts with a single tag byte:
//!
//! | Pattern      | Meaning                                          |
//! |--------------|--------------------------------------------------|
//! | `00xxxxxx`   | integer, 6-bit signed payload (-32..=31)         |
//! | `1xxxxxxx`   | integer continuation byte, 7-bit payload          |
//! | `0x40`       | null                                             |
//! | `0x41`       | true                                             |
//! | `0x42`       | false                                            |
//! | `0x43`       | float32, 4 bytes little-endian                   |
//! | `0x44`       | float64, 8 bytes little-endian                   |
//! | `0x45`       | list, varint length, elements                    |
//! | `0x46`       | string, varint byte length, UTF-8 bytes          |
//! | `0x47`       | bytes, varint length, raw bytes                  |
//! | `0x48`       | map, varint pair count, key/value pairs          |
//! | `0x49..0x4F` | reserved                                         |
//! | `0101xxxx`   | small list, inline length 0..=15                 |
//! | `011xxxxx`   | small string, inline byte length 0..=31          |

use std::fmt;

// Fixed control block 0x40..=0x4F
pub const NULL: u8 = 0x40;
pub const TRUE: u8 = 0x41;
pub const FALSE: u8 = 0x42;
pub const FLOAT_32: u8 = 0x43;
pub const FLOAT_64: u8 = 0x44;
pub const LIST: u8 = 0x45;
pub const STRING: u8 = 0x46;
pub const BYTES: u8 = 0x47;
pub const MAP: u8 = 0x48;

pub const RESERVED_FIRST: u8 = 0x49;
pub const RESERVED_LAST: u8 = 0x4F;

// Integers
const SMALL_INT_MASK: u8 = 0xC0;
const SMALL_INT_PREFIX: u8 = 0x00;
pub const SMALL_INT_PAYLOAD_MASK: u8 = 0x3F;
const SMALL_INT_SIGN_BIT: u8 = 0x20;
pub const SMALL_INT_MIN: i64 = -32;
pub const SMALL_INT_MAX: i64 = 31;

pub const CONTINUATION_BIT: u8 = 0x80;
pub const CONTINUATION_PAYLOAD_MASK: u8 = 0x7F;

// Small list: 0101xxxx
const SMALL_LIST_MASK: u8 = 0xF0;
pub const SMALL_LIST_NIBBLE: u8 = 0x50;
pub const SMALL_LIST_LEN_MASK: u8 = 0x0F;
pub const MAX_SMALL_LIST_LEN: usize = 15;

// Small string: 011xxxxx
const SMALL_STRING_MASK: u8 = 0xE0;
pub const SMALL_STRING_PREFIX: u8 = 0x60;
pub const SMALL_STRING_LEN_MASK: u8 = 0x1F;
pub const MAX_SMALL_STRING_LEN: usize = 31;

/// The kind of value a valid tag byte introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Null,
    True,
    False,
    Float32,
    Float64,
    List,
    String,
    Bytes,
    Map,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::List => "list",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_small_int(byte: u8) -> bool {
    byte & SMALL_INT_MASK == SMALL_INT_PREFIX
}

pub fn is_continuation(byte: u8) -> bool {
    byte & CONTINUATION_BIT == CONTINUATION_BIT
}

pub fn is_int(byte: u8) -> bool {
    is_small_int(byte) || is_continuation(byte)
}

pub fn is_null(byte: u8) -> bool {
    byte == NULL
}

pub fn is_bool(byte: u8) -> bool {
    byte == TRUE || byte == FALSE
}

pub fn is_float32(byte: u8) -> bool {
    byte == FLOAT_32
}

pub fn is_float64(byte: u8) -> bool {
    byte == FLOAT_64
}

pub fn is_big_list(byte: u8) -> bool {
    byte == LIST
}

pub fn is_small_list(byte: u8) -> bool {
    byte & SMALL_LIST_MASK == SMALL_LIST_NIBBLE
}

pub fn is_list(byte: u8) -> bool {
    is_big_list(byte) || is_small_list(byte)
}

pub fn is_big_string(byte: u8) -> bool {
    byte == STRING
}

pub fn is_small_string(byte: u8) -> bool {
    byte & SMALL_STRING_MASK == SMALL_STRING_PREFIX
}

pub fn is_string(byte: u8) -> bool {
    is_big_string(byte) || is_small_string(byte)
}

pub fn is_bytes(byte: u8) -> bool {
    byte == BYTES
}

pub fn is_map(byte: u8) -> bool {
    byte == MAP
}

pub fn is_reserved(byte: u8) -> bool {
    (RESERVED_FIRST..=RESERVED_LAST).contains(&byte)
}

/// Classifies a tag byte. Returns `None` for reserved bytes.
///
/// Integer patterns are checked first, then the fixed control block, then
/// the inline-length list and string blocks.
pub fn classify(byte: u8) -> Option<Kind> {
    if is_int(byte) {
        return Some(Kind::Integer);
    }
    match byte {
        NULL => Some(Kind::Null),
        TRUE => Some(Kind::True),
        FALSE => Some(Kind::False),
        FLOAT_32 => Some(Kind::Float32),
        FLOAT_64 => Some(Kind::Float64),
        LIST => Some(Kind::List),
        STRING => Some(Kind::String),
        BYTES => Some(Kind::Bytes),
        MAP => Some(Kind::Map),
        _ if is_small_list(byte) => Some(Kind::List),
        _ if is_small_string(byte) => Some(Kind::String),
        _ => None,
    }
}

pub fn is_valid(byte: u8) -> bool {
    classify(byte).is_some()
}

/// Sign-extends the 6-bit payload of a terminal integer byte (bit 5 is the sign).
pub fn small_int_value(byte: u8) -> i64 {
    i64::from(byte & (SMALL_INT_SIGN_BIT - 1)) - i64::from(byte & SMALL_INT_SIGN_BIT)
}

pub fn small_list_len(byte: u8) -> usize {
    usize::from(byte & SMALL_LIST_LEN_MASK)
}

pub fn small_string_len(byte: u8) -> usize {
    usize::from(byte & SMALL_STRING_LEN_MASK)
}

/// Tag byte of a small list. `len` must be at most [`MAX_SMALL_LIST_LEN`].
pub fn small_list_tag(len: usize) -> u8 {
    debug_assert!(len <= MAX_SMALL_LIST_LEN, "small list length must be <= 15");
    SMALL_LIST_NIBBLE | len as u8
}

/// Tag byte of a small string. `len` must be at most [`MAX_SMALL_STRING_LEN`].
pub fn small_string_tag(len: usize) -> u8 {
    debug_assert!(len <= MAX_SMALL_STRING_LEN, "small string length must be <= 31");
    SMALL_STRING_PREFIX | len as u8
}

/// A tag as read from a stream: either a tag byte or the end of input.
///
/// A `Tag` obtained from [`Decoder::peek_tag`](crate::codec::Decoder::peek_tag)
/// is either `Eof` or a byte that passed [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Eof,
    Byte(u8),
}

impl Tag {
    pub fn is_eof(self) -> bool {
        matches!(self, Self::Eof)
    }

    pub fn byte(self) -> Option<u8> {
        match self {
            Self::Eof => None,
            Self::Byte(b) => Some(b),
        }
    }

    /// The kind this tag introduces, or `None` for EOF and reserved bytes.
    pub fn kind(self) -> Option<Kind> {
        self.byte().and_then(classify)
    }

    pub fn is_int(self) -> bool {
        self.byte().is_some_and(is_int)
    }

    pub fn is_list(self) -> bool {
        self.byte().is_some_and(is_list)
    }

    pub fn is_string(self) -> bool {
        self.byte().is_some_and(is_string)
    }

    pub fn is_bytes(self) -> bool {
        self.byte().is_some_and(is_bytes)
    }

    pub fn is_map(self) -> bool {
        self.byte().is_some_and(is_map)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => write!(f, "end of input"),
            Self::Byte(b) => match classify(*b) {
                Some(kind) => write!(f, "0x{b:02X} ({kind})"),
                None => write!(f, "0x{b:02X} (reserved)"),
            },
        }
    }
}
