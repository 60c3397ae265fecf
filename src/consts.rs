//! Global constants for the streaming cipher engine.
//!
//! Includes block geometry and default key parameters.

/// AES block size in bytes, regardless of key size.
pub const BLOCK_SIZE: usize = 16;

/// Initialization vector size in bytes.
///
/// Both CBC and CTR consume a full-block IV; CTR treats it as the
/// initial 128-bit counter value.
pub const IV_SIZE: usize = 16;

/// Default cipher key size in bits.
pub const DEFAULT_KEY_SIZE: u32 = 256;

/// Read granularity for drain-to-EOF operations (`contents`, discard reads).
pub const COPY_CHUNK_SIZE: usize = 8192;
