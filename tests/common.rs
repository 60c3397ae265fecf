//! tests/common.rs
//! Shared constants and source-stream wrappers for the transformer tests.

use cipherstream::error::CipherStreamError;
use cipherstream::stream::ByteStream;
use std::io::SeekFrom;

/// Standard 256-bit test key.
#[allow(dead_code)] // Used across multiple test files
pub const TEST_KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

/// Standard 128-bit test key.
#[allow(dead_code)]
pub const TEST_KEY_128: &[u8] = b"0123456789abcdef";

/// Fixed IV for deterministic tests; random IVs are for round-trips only.
#[allow(dead_code)]
pub const TEST_IV: &[u8; 16] = b"fedcba9876543210";

/// Read `chunk` bytes at a time until EOF, concatenating everything.
#[allow(dead_code)]
pub fn drain_in_chunks<S: ByteStream>(stream: &mut S, chunk: usize) -> Vec<u8> {
    assert!(chunk > 0);
    let mut out = Vec::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let n = stream.read(&mut buf).expect("read failed");
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

/// Source wrapper that stops serving bytes after `limit`.
#[allow(dead_code)]
pub struct LimitStream<S> {
    inner: S,
    limit: u64,
    consumed: u64,
}

#[allow(dead_code)]
impl<S: ByteStream> LimitStream<S> {
    pub fn new(inner: S, limit: u64) -> Self {
        Self {
            inner,
            limit,
            consumed: 0,
        }
    }
}

impl<S: ByteStream> ByteStream for LimitStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        let remaining = (self.limit - self.consumed) as usize;
        let want = buf.len().min(remaining);
        let n = self.inner.read(&mut buf[..want])?;
        self.consumed += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        match pos {
            SeekFrom::Start(0) => {
                self.inner.rewind()?;
                self.consumed = 0;
                Ok(0)
            }
            other => Err(CipherStreamError::UnsupportedSeek(format!(
                "limit stream cannot seek to {other:?}"
            ))),
        }
    }

    fn tell(&self) -> u64 {
        self.consumed
    }

    fn eof(&self) -> bool {
        self.consumed >= self.limit || self.inner.eof()
    }

    fn size(&self) -> Option<u64> {
        self.inner.size().map(|s| s.min(self.limit))
    }

    fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }
}

/// Source wrapper that hides its size and refuses to seek.
#[allow(dead_code)]
pub struct UnsizedStream<S> {
    inner: S,
}

#[allow(dead_code)]
impl<S: ByteStream> UnsizedStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: ByteStream> ByteStream for UnsizedStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        self.inner.read(buf)
    }

    fn seek(&mut self, _pos: SeekFrom) -> Result<u64, CipherStreamError> {
        Err(CipherStreamError::UnsupportedSeek(
            "stream is not seekable".into(),
        ))
    }

    fn tell(&self) -> u64 {
        self.inner.tell()
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }

    fn size(&self) -> Option<u64> {
        None
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

/// Source wrapper that records the largest single read request it sees.
///
/// The transformers pull one cipher block per production step; this makes
/// that observable without measuring allocations.
#[allow(dead_code)]
pub struct RecordingStream<S> {
    inner: S,
    pub max_request: usize,
}

#[allow(dead_code)]
impl<S: ByteStream> RecordingStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            max_request: 0,
        }
    }
}

impl<S: ByteStream> ByteStream for RecordingStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        self.max_request = self.max_request.max(buf.len());
        self.inner.read(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        self.inner.seek(pos)
    }

    fn tell(&self) -> u64 {
        self.inner.tell()
    }

    fn eof(&self) -> bool {
        self.inner.eof()
    }

    fn size(&self) -> Option<u64> {
        self.inner.size()
    }

    fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }
}
