//! Reads LEON payload bytes from a blocking byte source.

use std::io::{self, Read};

use crate::error::LeonError;

/// Upper bound on the buffer reserved before a length-prefixed payload is read.
const PREALLOC_LIMIT: usize = 64 * 1024;

/// Wraps a `Read` source and counts the bytes consumed from it.
///
/// End of input is reported as `Ok(None)` by [`read_byte`](Self::read_byte);
/// every other method treats a short read as [`LeonError::TruncatedInput`].
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads one byte, or `None` at end of input.
    pub fn read_byte(&mut self) -> Result<Option<u8>, LeonError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reads exactly `N` bytes.
    pub fn read_array<const N: usize>(
        &mut self,
        context: &'static str,
    ) -> Result<[u8; N], LeonError> {
        let mut buf = [0u8; N];
        let mut filled = 0;
        while filled < N {
            match self.read(&mut buf[filled..]) {
                Ok(0) => return Err(self.truncated(context, N as u64, filled as u64)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(buf)
    }

    /// Reads exactly `len` bytes into a new vector.
    ///
    /// The buffer grows as data arrives, so a bogus length prefix on a short
    /// stream fails without allocating `len` bytes up front.
    pub fn read_vec(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>, LeonError> {
        let mut data = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        let got = self.by_ref().take(len as u64).read_to_end(&mut data)?;
        if got < len {
            return Err(self.truncated(context, len as u64, got as u64));
        }
        Ok(data)
    }

    /// Consumes and drops exactly `len` bytes without buffering them.
    pub fn discard(&mut self, len: u64, context: &'static str) -> Result<(), LeonError> {
        let got = io::copy(&mut self.by_ref().take(len), &mut io::sink())?;
        if got < len {
            return Err(self.truncated(context, len, got));
        }
        Ok(())
    }

    /// Performs a single read into `buf`, returning how many bytes arrived.
    pub fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, LeonError> {
        loop {
            match self.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn truncated(&self, context: &'static str, needed: u64, available: u64) -> LeonError {
        LeonError::TruncatedInput {
            context,
            offset: self.offset,
            needed,
            available,
        }
    }
}

impl<R: Read> Read for ByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.offset += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_bytes_until_eof() {
        let mut reader = ByteReader::new(Cursor::new(vec![0x01u8, 0x02]));
        assert_eq!(reader.read_byte().unwrap(), Some(0x01));
        assert_eq!(reader.read_byte().unwrap(), Some(0x02));
        assert_eq!(reader.read_byte().unwrap(), None);
        assert_eq!(reader.offset(), 2);
    }

    #[test]
    fn read_array_short() {
        let mut reader = ByteReader::new(&[0xAAu8, 0xBB, 0xCC][..]);
        let err = reader.read_array::<4>("float32 payload").unwrap_err();
        match err {
            LeonError::TruncatedInput {
                context,
                needed,
                available,
                offset,
            } => {
                assert_eq!(context, "float32 payload");
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_vec_exact() {
        let mut reader = ByteReader::new(&b"hello world"[..]);
        assert_eq!(reader.read_vec(5, "string payload").unwrap(), b"hello");
        assert_eq!(reader.offset(), 5);
    }

    #[test]
    fn read_vec_huge_length_on_short_input() {
        let mut reader = ByteReader::new(&[1u8, 2, 3][..]);
        let err = reader.read_vec(usize::MAX / 2, "bytes payload").unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn discard_counts_bytes() {
        let mut reader = ByteReader::new(&[0u8; 100][..]);
        reader.discard(60, "bytes payload").unwrap();
        assert_eq!(reader.offset(), 60);
        assert!(reader.discard(41, "bytes payload").unwrap_err().is_truncated());
    }

    /// A source that hands out one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn read_array_across_short_reads() {
        let mut reader = ByteReader::new(Trickle(&[1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(reader.read_array::<8>("float64 payload").unwrap(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn read_some_may_be_short() {
        let mut reader = ByteReader::new(Trickle(&[9, 9, 9]));
        let mut buf = [0u8; 3];
        assert_eq!(reader.read_some(&mut buf).unwrap(), 1);
    }
}
