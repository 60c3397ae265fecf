//! src/stream.rs
//! Byte-stream abstraction consumed and exposed by the transformers.
//!
//! Every transformer in this crate implements [`ByteStream`] and wraps a
//! source that also implements it. Sources are not owned in any deep sense:
//! dropping a transformer never closes its source, and the blanket impl for
//! `&mut S` lets callers keep ownership and lend the source out.

use crate::consts::COPY_CHUNK_SIZE;
use crate::error::CipherStreamError;
use std::io::{Cursor, Read, Seek, SeekFrom};

/// A byte-granular stream with optional seeking and a known-or-unknown size.
///
/// `read` may return fewer bytes than requested; a return of `0` for a
/// non-empty buffer means end of stream. `tell` reports the number of bytes
/// already returned to the caller.
pub trait ByteStream {
    /// Read up to `buf.len()` bytes into `buf`, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError>;

    /// Reposition the stream. Which positions are legal depends on the
    /// implementation; illegal combinations fail with
    /// [`CipherStreamError::UnsupportedSeek`].
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError>;

    /// Number of bytes already returned to the caller.
    fn tell(&self) -> u64;

    /// True once the stream has no further bytes to return.
    fn eof(&self) -> bool;

    /// Total stream size in bytes, or `None` when it cannot be known ahead
    /// of time.
    fn size(&self) -> Option<u64>;

    /// Whether any form of seeking is available.
    fn is_seekable(&self) -> bool;

    /// Transformers are read-only.
    fn is_writable(&self) -> bool {
        false
    }

    /// Equivalent to `seek(SeekFrom::Start(0))`.
    fn rewind(&mut self) -> Result<(), CipherStreamError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Read the remainder of the stream to EOF.
    fn contents(&mut self) -> Result<Vec<u8>, CipherStreamError> {
        let mut out = Vec::new();
        let mut chunk = [0u8; COPY_CHUNK_SIZE];
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }
}

impl<S: ByteStream + ?Sized> ByteStream for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        (**self).read(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        (**self).seek(pos)
    }

    fn tell(&self) -> u64 {
        (**self).tell()
    }

    fn eof(&self) -> bool {
        (**self).eof()
    }

    fn size(&self) -> Option<u64> {
        (**self).size()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }

    fn rewind(&mut self) -> Result<(), CipherStreamError> {
        (**self).rewind()
    }

    fn contents(&mut self) -> Result<Vec<u8>, CipherStreamError> {
        (**self).contents()
    }
}

/// Fill `buf` from `source`, looping over short reads until `buf` is full
/// or the source is exhausted. Returns the number of bytes filled.
pub(crate) fn read_full<S>(source: &mut S, buf: &mut [u8]) -> Result<usize, CipherStreamError>
where
    S: ByteStream + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Seekable in-memory byte stream.
///
/// The reference [`ByteStream`] source: a read-only view over an owned
/// byte buffer, fully seekable, with a known size.
pub struct MemoryStream {
    inner: Cursor<Vec<u8>>,
}

impl MemoryStream {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Cursor::new(data.into()),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl ByteStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        self.inner.read(buf).map_err(CipherStreamError::Io)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        self.inner.seek(pos).map_err(CipherStreamError::Io)
    }

    fn tell(&self) -> u64 {
        self.inner.position()
    }

    fn eof(&self) -> bool {
        self.inner.position() >= self.inner.get_ref().len() as u64
    }

    fn size(&self) -> Option<u64> {
        Some(self.inner.get_ref().len() as u64)
    }

    fn is_seekable(&self) -> bool {
        true
    }
}
