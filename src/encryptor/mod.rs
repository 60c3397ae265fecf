// src/encryptor/mod.rs

//! Encrypting stream transformer.
//!
//! Core API: [`EncryptStream`] — wraps a plaintext source, emits ciphertext.

pub(crate) mod stream;

pub use stream::EncryptStream;
