//! src/encryptor/stream.rs
//! Streaming encryption: byte-granular ciphertext reads over a plaintext
//! source, one cipher block per production step.

use crate::aliases::CipherKey;
use crate::cipher::CipherMethod;
use crate::consts::{BLOCK_SIZE, COPY_CHUNK_SIZE};
use crate::crypto::aes::{self, Padding};
use crate::error::CipherStreamError;
use crate::stream::{read_full, ByteStream};
use std::collections::VecDeque;
use secure_gate::RevealSecret;
use std::io::SeekFrom;

/// Emits the ciphertext of everything read from a plaintext source.
///
/// The concatenation of all bytes returned by successive `read`s equals a
/// one-shot encryption of the whole source under the same key, IV and mode.
/// Intermediate blocks go through the AES primitive unpadded; the short
/// (possibly empty) tail is encrypted once, with PKCS#7 for padded modes.
///
/// Memory use is bounded by the caller's read window, independent of the
/// source size.
pub struct EncryptStream<S> {
    source: S,
    key: CipherKey,
    method: CipherMethod,
    buffer: VecDeque<u8>,
    finalized: bool,
    /// Block index of the first primitive failure, once poisoned.
    poisoned: Option<u64>,
    position: u64,
    blocks: u64,
}

impl<S: ByteStream> EncryptStream<S> {
    /// Wrap `source`, owning `method` and a copy of `key`.
    pub fn new(source: S, key: &[u8], method: CipherMethod) -> Self {
        Self {
            source,
            key: CipherKey::new(key.to_vec()),
            method,
            buffer: VecDeque::new(),
            finalized: false,
            poisoned: None,
            position: 0,
            blocks: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Read one block of plaintext and append its ciphertext to the buffer.
    ///
    /// A full block is encrypted unpadded and chained into the method; a
    /// short read means the source is exhausted and the tail finalizes the
    /// stream.
    fn produce_block(&mut self) -> Result<(), CipherStreamError> {
        let mut block = [0u8; BLOCK_SIZE];
        let n = read_full(&mut self.source, &mut block)?;

        if n == BLOCK_SIZE {
            let cipher_block = self.encrypt_chunk(&block, Padding::None)?;
            self.method.update(&cipher_block);
            self.buffer.extend(cipher_block);
            return Ok(());
        }

        let tail = &block[..n];
        if self.method.requires_padding() {
            // Even an empty tail yields one full pad block.
            let final_block = self.encrypt_chunk(tail, Padding::Pkcs7)?;
            self.buffer.extend(final_block);
        } else if !tail.is_empty() {
            let final_chunk = self.encrypt_chunk(tail, Padding::None)?;
            self.buffer.extend(final_chunk);
        }
        self.finalized = true;
        Ok(())
    }

    fn encrypt_chunk(
        &mut self,
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CipherStreamError> {
        let block = self.blocks;
        let iv = *self.method.current_iv();
        let name = self.method.openssl_name();
        match aes::encrypt(data, &name, self.key.expose_secret(), &iv, padding) {
            Ok(out) => {
                self.blocks += 1;
                Ok(out)
            }
            Err(err) => {
                self.poisoned = Some(block);
                Err(CipherStreamError::EncryptionFailed {
                    block,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Rewind source and cipher method, dropping all produced state.
    fn reset(&mut self) -> Result<(), CipherStreamError> {
        if !self.source.is_seekable() {
            return Err(CipherStreamError::UnsupportedSeek(
                "source stream is not seekable".into(),
            ));
        }
        self.source.rewind()?;
        self.method.seek(SeekFrom::Start(0))?;
        self.buffer.clear();
        self.finalized = false;
        self.poisoned = None;
        self.position = 0;
        self.blocks = 0;
        Ok(())
    }

    /// Read and drop `count` bytes of output.
    fn discard(&mut self, mut count: u64) -> Result<(), CipherStreamError> {
        let mut scratch = [0u8; COPY_CHUNK_SIZE];
        while count > 0 {
            let want = scratch.len().min(count as usize);
            let n = ByteStream::read(self, &mut scratch[..want])?;
            if n == 0 {
                break;
            }
            count -= n as u64;
        }
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for EncryptStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CipherStreamError> {
        if let Some(block) = self.poisoned {
            return Err(CipherStreamError::EncryptionFailed {
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

    /// `Start(0)` rewinds everything. `Current(n)` is legal only on methods
    /// that are block-addressable (CTR) and is implemented by recomputing
    /// from the start, so any byte offset with a non-negative target works.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, CipherStreamError> {
        match pos {
            SeekFrom::Start(0) => {
                self.reset()?;
                Ok(0)
            }
            SeekFrom::Current(offset) if self.method.supports_relative_seek() => {
                let target = self.position as i64 + offset;
                if target < 0 {
                    return Err(CipherStreamError::UnsupportedSeek(format!(
                        "cannot seek to negative position {target}"
                    )));
                }
                self.reset()?;
                self.discard(target as u64)?;
                Ok(self.position)
            }
            other => Err(CipherStreamError::UnsupportedSeek(format!(
                "encrypt stream cannot seek to {other:?}"
            ))),
        }
    }

    fn tell(&self) -> u64 {
        self.position
    }

    fn eof(&self) -> bool {
        self.finalized && self.buffer.is_empty()
    }

    /// Ciphertext size, computable only when the source size is known:
    /// next block multiple past the plaintext for padded modes, identical
    /// for stream modes.
    fn size(&self) -> Option<u64> {
        let src = self.source.size()?;
        let block = BLOCK_SIZE as u64;
        Some(if self.method.requires_padding() {
            (src / block + 1) * block
        } else {
            src
        })
    }

    fn is_seekable(&self) -> bool {
        self.source.is_seekable()
    }
}
