//! Read adapter that never returns short reads
//!
//! Scanners primed with a fixed-size block need that block filled
//! completely. Plain `Read::read` may legally return fewer bytes than asked
//! for (pipes, sockets, chunked bodies), so [`ReadFull`] keeps pulling until
//! the buffer is full, the source is exhausted, or the source fails.

use std::io::{self, ErrorKind, Read};

/// A failed fill: the bytes placed before the error are still in the buffer
#[derive(Debug)]
pub struct ShortRead {
    /// Bytes successfully written to the front of the buffer
    pub read: usize,
    pub source: io::Error,
}

/// Wraps a reader so that every read fills the whole buffer unless the
/// source ends or errors
#[derive(Debug)]
pub struct ReadFull<R> {
    inner: R,
    /// Error hit after a partial fill, reported by the next `read`
    deferred: Option<io::Error>,
}

impl<R: Read> ReadFull<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            deferred: None,
        }
    }

    /// Fill `buf` completely.
    ///
    /// Returns fewer than `buf.len()` bytes only at end of input. On error
    /// the count of bytes already placed in `buf` travels with it.
    pub fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, ShortRead> {
        if let Some(source) = self.deferred.take() {
            return Err(ShortRead { read: 0, source });
        }

        let mut offset = 0;
        while offset < buf.len() {
            match self.inner.read(&mut buf[offset..]) {
                Ok(0) => break,
                Ok(n) => offset += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ShortRead {
                        read: offset,
                        source,
                    })
                }
            }
        }

        Ok(offset)
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ReadFull<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_full(buf) {
            Ok(n) => Ok(n),
            // Hand back what we have; the error surfaces on the next call
            Err(ShortRead { read, source }) if read > 0 => {
                self.deferred = Some(source);
                Ok(read)
            }
            Err(ShortRead { source, .. }) => Err(source),
        }
    }
}
