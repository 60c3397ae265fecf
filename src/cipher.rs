//! src/cipher.rs
//! Cipher-method strategies: the IV state machines behind the transformers.
//!
//! A [`CipherMethod`] tracks the IV to hand the AES primitive for the next
//! block, declares whether the mode pads, and constrains which seeks are
//! legal. The two variants differ exactly where the modes differ:
//!
//! - **CBC** chains each ciphertext block into the next block's IV, so its
//!   only legal seek is a reset to the initial IV.
//! - **CTR** encrypts an incrementing counter, so it is addressable at
//!   block granularity: the keystream for block `k` depends only on
//!   `IV + k`.
//!
//! Methods are plain values: cloning duplicates all IV state, so an
//! encrypter and a decrypter can be handed clones of one method without
//! aliasing.

use crate::consts::{BLOCK_SIZE, IV_SIZE};
use crate::error::CipherStreamError;
use std::io::SeekFrom;

#[derive(Debug, Clone)]
pub enum CipherMethod {
    Cbc {
        key_size: u32,
        iv: [u8; IV_SIZE],
        initial_iv: [u8; IV_SIZE],
    },
    Ctr {
        key_size: u32,
        counter: [u8; IV_SIZE],
        initial_counter: [u8; IV_SIZE],
    },
}

impl CipherMethod {
    /// CBC method with the given initial IV. `key_size` is in bits.
    ///
    /// Fails unless `iv` is exactly 16 bytes. The key size is not checked
    /// here — the AES primitive rejects sizes it has no cipher for.
    pub fn cbc(iv: &[u8], key_size: u32) -> Result<Self, CipherStreamError> {
        let iv = check_iv(iv)?;
        Ok(Self::Cbc {
            key_size,
            iv,
            initial_iv: iv,
        })
    }

    /// CTR method with the given initial counter block. `key_size` is in bits.
    pub fn ctr(iv: &[u8], key_size: u32) -> Result<Self, CipherStreamError> {
        let counter = check_iv(iv)?;
        Ok(Self::Ctr {
            key_size,
            counter,
            initial_counter: counter,
        })
    }

    /// The 16-byte IV (or counter block) to use for the next primitive call.
    pub fn current_iv(&self) -> &[u8; IV_SIZE] {
        match self {
            Self::Cbc { iv, .. } => iv,
            Self::Ctr { counter, .. } => counter,
        }
    }

    /// OpenSSL-style cipher name, e.g. `aes-256-cbc`.
    pub fn openssl_name(&self) -> String {
        match self {
            Self::Cbc { key_size, .. } => format!("aes-{key_size}-cbc"),
            Self::Ctr { key_size, .. } => format!("aes-{key_size}-ctr"),
        }
    }

    pub fn key_size(&self) -> u32 {
        match self {
            Self::Cbc { key_size, .. } | Self::Ctr { key_size, .. } => *key_size,
        }
    }

    /// Whether the mode needs PKCS#7 padding to reach a block multiple.
    pub fn requires_padding(&self) -> bool {
        matches!(self, Self::Cbc { .. })
    }

    /// Whether relative (`SeekFrom::Current`) seeks are legal on this method.
    pub fn supports_relative_seek(&self) -> bool {
        matches!(self, Self::Ctr { .. })
    }

    /// Advance the IV state past one processed chunk of ciphertext.
    ///
    /// CBC takes the last 16 bytes of `ciphertext` as the next IV. CTR adds
    /// `ceil(len / 16)` to the counter, treated as a 128-bit big-endian
    /// integer over the entire block — carries propagate across all 16
    /// bytes.
    pub fn update(&mut self, ciphertext: &[u8]) {
        match self {
            Self::Cbc { iv, .. } => {
                if ciphertext.len() >= BLOCK_SIZE {
                    iv.copy_from_slice(&ciphertext[ciphertext.len() - BLOCK_SIZE..]);
                }
            }
            Self::Ctr { counter, .. } => {
                counter_add(counter, ciphertext.len().div_ceil(BLOCK_SIZE) as u128);
            }
        }
    }

    /// Reposition the IV state machine.
    ///
    /// `Start(0)` restores the initial IV on either variant. CTR also
    /// accepts `Current(n)` for non-negative block-aligned `n`, advancing
    /// the counter by `n / 16`. Every other combination is a logic error.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<(), CipherStreamError> {
        match self {
            Self::Cbc { iv, initial_iv, .. } => match pos {
                SeekFrom::Start(0) => {
                    *iv = *initial_iv;
                    Ok(())
                }
                other => Err(CipherStreamError::UnsupportedSeek(format!(
                    "cbc supports only a reset to the start, got {other:?}"
                ))),
            },
            Self::Ctr {
                counter,
                initial_counter,
                ..
            } => match pos {
                SeekFrom::Start(0) => {
                    *counter = *initial_counter;
                    Ok(())
                }
                SeekFrom::Current(offset) if offset >= 0 && offset % BLOCK_SIZE as i64 == 0 => {
                    counter_add(counter, (offset / BLOCK_SIZE as i64) as u128);
                    Ok(())
                }
                SeekFrom::Current(offset) => Err(CipherStreamError::UnsupportedSeek(format!(
                    "ctr relative seek must be a non-negative multiple of {BLOCK_SIZE}, got {offset}"
                ))),
                other => Err(CipherStreamError::UnsupportedSeek(format!(
                    "ctr supports only start-reset and relative seeks, got {other:?}"
                ))),
            },
        }
    }
}

/// 128-bit big-endian addition over the whole counter block.
fn counter_add(counter: &mut [u8; IV_SIZE], blocks: u128) {
    let value = u128::from_be_bytes(*counter).wrapping_add(blocks);
    *counter = value.to_be_bytes();
}

fn check_iv(iv: &[u8]) -> Result<[u8; IV_SIZE], CipherStreamError> {
    <[u8; IV_SIZE]>::try_from(iv).map_err(|_| {
        CipherStreamError::InvalidArgument(format!(
            "iv must be exactly {IV_SIZE} bytes, got {}",
            iv.len()
        ))
    })
}
