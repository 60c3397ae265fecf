// src/aliases.rs

//! Global secure type aliases for key material.
//!
//! Key bytes are wrapped from construction and auto-zeroed on drop.

use secure_gate::{dynamic_alias, fixed_alias};

// ─────────────────────────────────────────────────────────────────────────────
// Fixed-size key buffers — the padded keys handed to the AES primitive
// ─────────────────────────────────────────────────────────────────────────────
fixed_alias!(pub(crate) Aes128Key, 16);
fixed_alias!(pub(crate) Aes256Key, 32);

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic secrets — caller-supplied keys of arbitrary length
// ─────────────────────────────────────────────────────────────────────────────
dynamic_alias!(pub(crate) CipherKey, Vec<u8>); // Held by EncryptStream / DecryptStream
dynamic_alias!(pub(crate) HmacKey, Vec<u8>); // Held by keyed HashStream

// Re-exported crypto primitives — users get them from the same `aliases::*` import
pub use crate::crypto::hash::{HmacSha256, HmacSha512};
