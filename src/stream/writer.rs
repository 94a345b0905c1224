//! Writes encoded LEON bytes to a blocking byte sink.

use std::io::Write;

use crate::error::LeonError;

/// Wraps a `Write` sink and counts the bytes written to it.
#[derive(Debug)]
pub struct ByteWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Number of bytes handed to the sink so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), LeonError> {
        self.inner.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), LeonError> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flushes the sink and hands it back.
    pub fn into_inner(mut self) -> Result<W, LeonError> {
        self.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn counts_written_bytes() {
        let mut writer = ByteWriter::new(Vec::new());
        writer.write_all(&[0x01, 0x02, 0x03]).unwrap();
        writer.write_all(&[]).unwrap();
        assert_eq!(writer.written(), 3);
        assert_eq!(writer.into_inner().unwrap(), vec![0x01, 0x02, 0x03]);
    }

    struct FailingFlush;

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("flush failed"))
        }
    }

    #[test]
    fn into_inner_propagates_flush_failure() {
        let mut writer = ByteWriter::new(FailingFlush);
        writer.write_all(b"abc").unwrap();
        assert!(matches!(writer.into_inner(), Err(LeonError::Io(_))));
    }
}
