//! src/crypto/hash.rs
//! Digest and HMAC primitives for the hashing transformer.

use crate::error::CipherStreamError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

pub type HmacSha256 = Hmac<Sha256>;
pub type HmacSha512 = Hmac<Sha512>;

/// Digest algorithms the hashing transformer can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Parse a lowercase algorithm name (`sha256`, `sha512`).
    pub fn from_name(name: &str) -> Result<Self, CipherStreamError> {
        match name {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(CipherStreamError::InvalidArgument(format!(
                "unknown hash algorithm '{other}'"
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes.
    pub fn digest_size(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

/// Incremental digest context, plain or keyed.
///
/// One context spans an entire pass over a stream; `finalize_reset` yields
/// the digest and leaves the context ready for another pass.
pub struct HashContext {
    inner: ContextInner,
}

enum ContextInner {
    Sha256(Sha256),
    Sha512(Sha512),
    HmacSha256(HmacSha256),
    HmacSha512(HmacSha512),
}

impl HashContext {
    /// Plain digest context, or HMAC when a key is supplied.
    pub fn new(algorithm: HashAlgorithm, key: Option<&[u8]>) -> Self {
        let inner = match (algorithm, key) {
            (HashAlgorithm::Sha256, None) => ContextInner::Sha256(Sha256::new()),
            (HashAlgorithm::Sha512, None) => ContextInner::Sha512(Sha512::new()),
            (HashAlgorithm::Sha256, Some(key)) => ContextInner::HmacSha256(
                <HmacSha256 as Mac>::new_from_slice(key).expect("hmac accepts keys of any length"),
            ),
            (HashAlgorithm::Sha512, Some(key)) => ContextInner::HmacSha512(
                <HmacSha512 as Mac>::new_from_slice(key).expect("hmac accepts keys of any length"),
            ),
        };
        Self { inner }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.inner {
            ContextInner::Sha256(ctx) => Digest::update(ctx, data),
            ContextInner::Sha512(ctx) => Digest::update(ctx, data),
            ContextInner::HmacSha256(ctx) => Mac::update(ctx, data),
            ContextInner::HmacSha512(ctx) => Mac::update(ctx, data),
        }
    }

    /// Produce the digest of everything fed so far and reset the context.
    pub fn finalize_reset(&mut self) -> Vec<u8> {
        match &mut self.inner {
            ContextInner::Sha256(ctx) => ctx.finalize_reset().to_vec(),
            ContextInner::Sha512(ctx) => ctx.finalize_reset().to_vec(),
            ContextInner::HmacSha256(ctx) => ctx.finalize_reset().into_bytes().to_vec(),
            ContextInner::HmacSha512(ctx) => ctx.finalize_reset().into_bytes().to_vec(),
        }
    }
}

/// One-shot digest of `data`.
pub fn hash(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut ctx = HashContext::new(algorithm, None);
    ctx.update(data);
    ctx.finalize_reset()
}

/// One-shot HMAC of `data` under `key`.
pub fn hmac(algorithm: HashAlgorithm, data: &[u8], key: &[u8]) -> Vec<u8> {
    let mut ctx = HashContext::new(algorithm, Some(key));
    ctx.update(data);
    ctx.finalize_reset()
}
