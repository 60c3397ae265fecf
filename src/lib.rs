// src/lib.rs

//! Streaming transformers over a byte-stream abstraction: AES-encrypted,
//! AES-decrypted, or hashed output produced lazily from an underlying
//! plaintext/ciphertext source, in constant memory, byte-for-byte equal to
//! a one-shot transformation of the whole payload.

pub mod aliases;
pub mod cipher;
pub mod consts;
pub mod crypto;
pub mod decryptor;
pub mod encryptor;
pub mod error;
pub mod hasher;
pub mod stream;
pub mod utils;

// High-level API — this is what 99% of users import
pub use cipher::CipherMethod;
pub use decryptor::DecryptStream;
pub use encryptor::EncryptStream;
pub use error::CipherStreamError;
pub use hasher::HashStream;
pub use stream::{ByteStream, MemoryStream};

// Low-level primitives — public at the root for custom one-shot flows
pub use crypto::aes::Padding;
pub use crypto::hash::HashAlgorithm;
