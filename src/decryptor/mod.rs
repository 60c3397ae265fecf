// src/decryptor/mod.rs

//! Decrypting stream transformer.
//!
//! Core API: [`DecryptStream`] — wraps a ciphertext source, emits plaintext.

pub(crate) mod stream;

pub use stream::DecryptStream;
