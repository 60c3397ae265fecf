//! src/hasher.rs
//! Transparent pass-through stream that accumulates a digest.

use crate::aliases::HmacKey;
use crate::crypto::hash::{HashAlgorithm, HashContext};
use crate::error::CipherStreamError;
use crate::stream::ByteStream;
use secure_gate::RevealSecret;
use std::io::SeekFrom;

type CompletionCallback = Box<dyn FnMut(&[u8])>;

/// Forwards every byte of its source unchanged while feeding a running
/// digest (or HMAC, when a key is supplied).
///
/// The digest is finalized on the first read that observes the source at
/// EOF; the completion callback fires exactly once per pass. Rewinding
/// resets the context, so the callback fires again at the next EOF.
pub struct HashStream<S> {
    source: S,
    algorithm: HashAlgorithm,
    key: Option<HmacKey>,
    context: HashContext,
    digest: Option<Vec<u8>>,
    callback: Option<CompletionCallback>,
    callback_fired: bool,
    position: u64,
}

impl<S: ByteStream> HashStream<S> {
    /// Plain digest over everything read from `source`.
    pub fn new(source: S, algorithm: HashAlgorithm) -> Self {
        Self {
            source,
            algorithm,
            key: None,
            context: HashContext::new(algorithm, None),
            digest: None,
            callback: None,
            callback_fired: false,
            position: 0,
        }
    }

    /// Keyed (HMAC) digest over everything read from `source`.
    pub fn with_key(source: S, algorithm: HashAlgorithm, key: &[u8]) -> Self {
        Self {
            source,
            algorithm,
            key: Some(HmacKey::new(key.to_vec())),
            context: HashContext::new(algorithm, Some(key)),
            digest: None,
            callback: None,
            callback_fired: false,
            position: 0,
        }
    }

    /// Attach a callback invoked with the digest when EOF is reached.
    pub fn on_complete(mut self, callback: impl FnMut(&[u8]) + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// The final digest; `None` until the stream has been read to EOF.
    pub fn digest(&self) -> Option<&[u8]> {
        self.digest.as_deref()
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn reset_context(&mut self) {
        self.context = match &self.key {
            Some(key) => HashContext::new(self.algorithm, Some(key.expose_secret().as_slice())),
            None => HashContext::new(self.algorithm, None),
        };
    }
}

impl<S: ByteStream> ByteStream for HashStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        let n = self.source.read(buf)?;
        self.context.update(&buf[..n]);
        self.position += n as u64;

        if n < buf.len() && self.source.eof() && self.digest.is_none() {
            let digest = self.context.finalize_reset();
            if !self.callback_fired {
                if let Some(callback) = self.callback.as_mut() {
                    callback(&digest);
                }
                self.callback_fired = true;
            }
            self.digest = Some(digest);
        }
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        match pos {
            SeekFrom::Start(0) => {
                self.source.rewind()?;
                self.reset_context();
                self.digest = None;
                self.callback_fired = false;
                self.position = 0;
                Ok(0)
            }
            other => Err(CipherStreamError::UnsupportedSeek(format!(
                "hash stream cannot seek to {other:?}"
            ))),
        }
    }

    fn tell(&self) -> u64 {
        self.position
    }

    fn eof(&self) -> bool {
        self.source.eof()
    }

    fn size(&self) -> Option<u64> {
        self.source.size()
    }

    fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}
