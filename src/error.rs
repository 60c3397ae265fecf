//! # Error Types
//!
//! This module defines the error types used throughout the library.
//! All operations return [`Result<T, CipherStreamError>`](CipherStreamError).

use thiserror::Error;

/// The error type for all cipher stream operations.
///
/// This enum covers I/O errors from the underlying source, construction
/// misuse, illegal seeks, and cryptographic failures.
#[derive(Error, Debug)]
pub enum CipherStreamError {
    /// I/O error surfaced unchanged from the underlying source stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A constructor argument was rejected.
    ///
    /// Raised when an IV is not exactly 16 bytes, or a hash algorithm
    /// name is unknown.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An illegal seek combination was requested.
    ///
    /// Covers every seek a stream or cipher method does not support:
    /// non-zero offsets from the start on CBC/decrypt/hash streams,
    /// any end-relative seek, negative or unaligned relative seeks on CTR.
    #[error("unsupported seek: {0}")]
    UnsupportedSeek(String),

    /// A cryptographic primitive rejected its input.
    ///
    /// Used for errors at the one-shot primitive layer:
    /// - Unknown cipher name
    /// - Key longer than the cipher's key size
    /// - Data not aligned to the block size without padding
    /// - Invalid or corrupt PKCS#7 padding
    #[error("crypto error: {0}")]
    Crypto(String),

    /// The AES primitive returned an error while producing ciphertext.
    ///
    /// `block` identifies the zero-based block index at which the
    /// primitive failed; `reason` carries its diagnostic.
    #[error("encryption failed at block {block}: {reason}")]
    EncryptionFailed { block: u64, reason: String },

    /// The AES primitive returned an error while producing plaintext.
    ///
    /// Most commonly an invalid PKCS#7 pad on the final block: wrong key,
    /// truncated ciphertext, or garbage input in a padded mode.
    #[error("decryption failed at block {block}: {reason}")]
    DecryptionFailed { block: u64, reason: String },
}

impl From<&'static str> for CipherStreamError {
    fn from(msg: &'static str) -> Self {
        CipherStreamError::Crypto(msg.to_string())
    }
}
