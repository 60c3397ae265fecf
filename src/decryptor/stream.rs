//! src/decryptor/stream.rs
//! Streaming decryption with one-block lookahead for padded modes.
//!
//! PKCS#7 stripping must be applied exactly once, to the final block only.
//! The decrypter therefore holds one ciphertext chunk back from the
//! primitive until the next read proves whether more input follows —
//! without the lookahead, trailing bytes of intermediate blocks would be
//! misread as padding.

use crate::aliases::CipherKey;
use crate::cipher::CipherMethod;
use crate::consts::BLOCK_SIZE;
use crate::crypto::aes::{self, Padding};
use crate::error::CipherStreamError;
use crate::stream::{read_full, ByteStream};
use std::collections::VecDeque;
use secure_gate::RevealSecret;
use std::io::SeekFrom;

/// Emits the plaintext of everything read from a ciphertext source.
///
/// Output equals the original plaintext iff the ciphertext was produced
/// with the same key, IV and mode. Padded modes strip PKCS#7 from the
/// final block; stream modes decrypt length-preserving and detect no
/// integrity errors.
pub struct DecryptStream<S> {
    source: S,
    key: CipherKey,
    method: CipherMethod,
    buffer: VecDeque<u8>,
    /// Next unprocessed ciphertext chunk (padded modes only).
    lookahead: Option<Vec<u8>>,
    finalized: bool,
    poisoned: Option<u64>,
    position: u64,
    blocks: u64,
}

impl<S: ByteStream> DecryptStream<S> {
    /// Wrap `source`, owning `method` and a copy of `key`.
    pub fn new(source: S, key: &[u8], method: CipherMethod) -> Self {
        Self {
            source,
            key: CipherKey::new(key.to_vec()),
            method,
            buffer: VecDeque::new(),
            lookahead: None,
            finalized: false,
            poisoned: None,
            position: 0,
            blocks: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn produce_block(&mut self) -> Result<(), CipherStreamError> {
        if self.method.requires_padding() {
            self.produce_padded()
        } else {
            self.produce_unpadded()
        }
    }

    /// Padded-mode production: decrypt the held chunk as an intermediate
    /// block if another chunk follows, as the final padded block otherwise.
    fn produce_padded(&mut self) -> Result<(), CipherStreamError> {
        let current = match self.lookahead.take() {
            Some(chunk) => chunk,
            None => self.read_chunk()?,
        };
        if current.is_empty() {
            // Empty source: nothing to strip, nothing to emit.
            self.finalized = true;
            return Ok(());
        }

        let next = self.read_chunk()?;
        if next.is_empty() {
            let plain = self.decrypt_chunk(&current, Padding::Pkcs7)?;
            self.buffer.extend(plain);
            self.finalized = true;
        } else {
            let plain = self.decrypt_chunk(&current, Padding::None)?;
            self.method.update(&current);
            self.buffer.extend(plain);
            self.lookahead = Some(next);
        }
        Ok(())
    }

    /// Stream-mode production: every chunk decrypts as-is; a short chunk
    /// means the source is exhausted.
    fn produce_unpadded(&mut self) -> Result<(), CipherStreamError> {
        let chunk = self.read_chunk()?;
        if chunk.is_empty() {
            self.finalized = true;
            return Ok(());
        }
        let plain = self.decrypt_chunk(&chunk, Padding::None)?;
        self.method.update(&chunk);
        self.buffer.extend(plain);
        if chunk.len() < BLOCK_SIZE {
            self.finalized = true;
        }
        Ok(())
    }

    /// Read up to one block of ciphertext from the source.
    fn read_chunk(&mut self) -> Result<Vec<u8>, CipherStreamError> {
        let mut block = [0u8; BLOCK_SIZE];
        let n = read_full(&mut self.source, &mut block)?;
        Ok(block[..n].to_vec())
    }

    fn decrypt_chunk(
        &mut self,
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CipherStreamError> {
        let block = self.blocks;
        let iv = *self.method.current_iv();
        let name = self.method.openssl_name();
        match aes::decrypt(data, &name, self.key.expose_secret(), &iv, padding) {
            Ok(out) => {
                self.blocks += 1;
                Ok(out)
            }
            Err(err) => {
                self.poisoned = Some(block);
                Err(CipherStreamError::DecryptionFailed {
                    block,
                    reason: err.to_string(),
                })
            }
        }
    }

    fn reset(&mut self) -> Result<(), CipherStreamError> {
        if !self.source.is_seekable() {
            return Err(CipherStreamError::UnsupportedSeek(
                "source stream is not seekable".into(),
            ));
        }
        self.source.rewind()?;
        self.method.seek(SeekFrom::Start(0))?;
        self.buffer.clear();
        self.lookahead = None;
        self.finalized = false;
        self.poisoned = None;
        self.position = 0;
        self.blocks = 0;
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for DecryptStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        if let Some(block) = self.poisoned {
            return Err(CipherStreamError::DecryptionFailed {
                block,
                reason: "stream poisoned by an earlier failure".into(),
            });
        }
        while self.buffer.len() < buf.len() && !self.finalized {
            self.produce_block()?;
        }
        let n = buf.len().min(self.buffer.len());
        for (dst, byte) in buf.iter_mut().zip(self.buffer.drain(..n)) {
            *dst = byte;
        }
        self.position += n as u64;
        Ok(n)
    }

    /// Only a full rewind is supported; callers needing arbitrary
    /// positioning wrap the decrypter in an external positional stream.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        match pos {
            SeekFrom::Start(0) => {
                self.reset()?;
                Ok(0)
            }
            other => Err(CipherStreamError::UnsupportedSeek(format!(
                "decrypt stream cannot seek to {other:?}"
            ))),
        }
    }

    fn tell(&self) -> u64 {
        self.position
    }

    fn eof(&self) -> bool {
        self.finalized && self.buffer.is_empty()
    }

    /// Unknown for padded modes: the final plaintext length is not known
    /// until the pad is stripped.
    fn size(&self) -> Option<u64> {
        if self.method.requires_padding() {
            None
        } else {
            self.source.size()
        }
    }

    fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}
