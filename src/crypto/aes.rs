//! src/crypto/aes.rs
//! One-shot AES encrypt/decrypt, addressed by OpenSSL-style cipher name.
//!
//! This is the primitive the stream transformers call once per block: raw
//! bytes in, raw bytes out, explicit IV, padding controlled by the caller.
//! Supported names are `aes-{128|256}-{cbc|ctr}`.
//!
//! Key handling follows OpenSSL: keys shorter than the cipher's key size
//! are right-padded with zero bytes; longer keys are rejected.

use crate::aliases::{Aes128Key, Aes256Key};
use crate::consts::{BLOCK_SIZE, IV_SIZE};
use crate::error::CipherStreamError;
use crate::utils::xor_blocks;
use aes::cipher::consts::U16;
use aes::cipher::{BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit};
use aes::{Aes128, Aes128Dec, Aes128Enc, Aes256, Aes256Dec, Aes256Enc, Block as AesBlock};
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use secure_gate::{RevealSecret, RevealSecretMut};

// Full-width big-endian counters: carries propagate across all 16 IV bytes.
type Aes128Ctr = Ctr128BE<Aes128>;
type Aes256Ctr = Ctr128BE<Aes256>;

/// Padding behavior for a single primitive call.
///
/// The transformers call the primitive with `None` on every intermediate
/// block and with `Pkcs7` exactly once, on the final call of a padded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    None,
    Pkcs7,
}

#[derive(Clone, Copy)]
enum KeyBits {
    Aes128,
    Aes256,
}

#[derive(Clone, Copy)]
enum Mode {
    Cbc,
    Ctr,
}

/// Encrypt `data` under `cipher_name` with an explicit IV.
///
/// CBC with [`Padding::Pkcs7`] always appends 1..=16 pad bytes (an empty
/// input yields one full pad block); with [`Padding::None`] the input must
/// be a multiple of 16 bytes. CTR output has the same length as the input
/// and ignores `padding`.
pub fn encrypt(
    data: &[u8],
    cipher_name: &str,
    key: &[u8],
    iv: &[u8; IV_SIZE],
    padding: Padding,
) -> Result<Vec<u8>, CipherStreamError> {
    let (bits, mode) = parse_cipher_name(cipher_name)?;
    match (bits, mode) {
        (KeyBits::Aes128, Mode::Cbc) => {
            let key = pad_key_128(key, cipher_name)?;
            cbc_encrypt(
                &Aes128Enc::new(key.expose_secret().into()),
                iv,
                data,
                padding,
            )
        }
        (KeyBits::Aes256, Mode::Cbc) => {
            let key = pad_key_256(key, cipher_name)?;
            cbc_encrypt(
                &Aes256Enc::new(key.expose_secret().into()),
                iv,
                data,
                padding,
            )
        }
        (KeyBits::Aes128, Mode::Ctr) => {
            let key = pad_key_128(key, cipher_name)?;
            ctr_apply::<Aes128Ctr>(key.expose_secret(), iv, data)
        }
        (KeyBits::Aes256, Mode::Ctr) => {
            let key = pad_key_256(key, cipher_name)?;
            ctr_apply::<Aes256Ctr>(key.expose_secret(), iv, data)
        }
    }
}

/// Decrypt `data` under `cipher_name` with an explicit IV.
///
/// CBC input must be a multiple of 16 bytes; with [`Padding::Pkcs7`] the
/// final block's padding is validated and stripped. CTR decryption is the
/// same keystream XOR as encryption.
pub fn decrypt(
    data: &[u8],
    cipher_name: &str,
    key: &[u8],
    iv: &[u8; IV_SIZE],
    padding: Padding,
) -> Result<Vec<u8>, CipherStreamError> {
    let (bits, mode) = parse_cipher_name(cipher_name)?;
    match (bits, mode) {
        (KeyBits::Aes128, Mode::Cbc) => {
            let key = pad_key_128(key, cipher_name)?;
            cbc_decrypt(
                &Aes128Dec::new(key.expose_secret().into()),
                iv,
                data,
                padding,
            )
        }
        (KeyBits::Aes256, Mode::Cbc) => {
            let key = pad_key_256(key, cipher_name)?;
            cbc_decrypt(
                &Aes256Dec::new(key.expose_secret().into()),
                iv,
                data,
                padding,
            )
        }
        (KeyBits::Aes128, Mode::Ctr) => {
            let key = pad_key_128(key, cipher_name)?;
            ctr_apply::<Aes128Ctr>(key.expose_secret(), iv, data)
        }
        (KeyBits::Aes256, Mode::Ctr) => {
            let key = pad_key_256(key, cipher_name)?;
            ctr_apply::<Aes256Ctr>(key.expose_secret(), iv, data)
        }
    }
}

fn parse_cipher_name(name: &str) -> Result<(KeyBits, Mode), CipherStreamError> {
    let unknown = || CipherStreamError::Crypto(format!("unknown cipher '{name}'"));
    let mut parts = name.split('-');
    let (Some("aes"), Some(bits), Some(mode), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(unknown());
    };
    let bits = match bits {
        "128" => KeyBits::Aes128,
        "256" => KeyBits::Aes256,
        _ => return Err(unknown()),
    };
    let mode = match mode {
        "cbc" => Mode::Cbc,
        "ctr" => Mode::Ctr,
        _ => return Err(unknown()),
    };
    Ok((bits, mode))
}

fn pad_key_128(key: &[u8], cipher_name: &str) -> Result<Aes128Key, CipherStreamError> {
    if key.len() > 16 {
        return Err(CipherStreamError::Crypto(format!(
            "key length {} exceeds 16 bytes for cipher '{cipher_name}'",
            key.len()
        )));
    }
    let mut padded = Aes128Key::new([0u8; 16]);
    padded.expose_secret_mut()[..key.len()].copy_from_slice(key);
    Ok(padded)
}

fn pad_key_256(key: &[u8], cipher_name: &str) -> Result<Aes256Key, CipherStreamError> {
    if key.len() > 32 {
        return Err(CipherStreamError::Crypto(format!(
            "key length {} exceeds 32 bytes for cipher '{cipher_name}'",
            key.len()
        )));
    }
    let mut padded = Aes256Key::new([0u8; 32]);
    padded.expose_secret_mut()[..key.len()].copy_from_slice(key);
    Ok(padded)
}

fn cbc_encrypt<C>(
    cipher: &C,
    iv: &[u8; IV_SIZE],
    data: &[u8],
    padding: Padding,
) -> Result<Vec<u8>, CipherStreamError>
where
    C: BlockEncrypt + BlockSizeUser<BlockSize = U16>,
{
    let mut input = data.to_vec();
    match padding {
        Padding::Pkcs7 => {
            let pad = (BLOCK_SIZE - input.len() % BLOCK_SIZE) as u8;
            input.resize(input.len() + pad as usize, pad);
        }
        Padding::None if input.len() % BLOCK_SIZE != 0 => {
            return Err(CipherStreamError::Crypto(format!(
                "data length {} is not a multiple of the {BLOCK_SIZE}-byte block size",
                data.len()
            )));
        }
        Padding::None => {}
    }

    let mut out = Vec::with_capacity(input.len());
    let mut prev = *iv;
    for chunk in input.chunks_exact(BLOCK_SIZE) {
        let mut xored = [0u8; BLOCK_SIZE];
        xor_blocks(chunk, &prev, &mut xored);
        let mut block = AesBlock::from(xored);
        cipher.encrypt_block(&mut block);
        prev.copy_from_slice(block.as_slice());
        out.extend_from_slice(block.as_slice());
    }
    Ok(out)
}

fn cbc_decrypt<C>(
    cipher: &C,
    iv: &[u8; IV_SIZE],
    data: &[u8],
    padding: Padding,
) -> Result<Vec<u8>, CipherStreamError>
where
    C: BlockDecrypt + BlockSizeUser<BlockSize = U16>,
{
    if data.len() % BLOCK_SIZE != 0 {
        return Err(CipherStreamError::Crypto(format!(
            "ciphertext length {} is not a multiple of the {BLOCK_SIZE}-byte block size",
            data.len()
        )));
    }
    if padding == Padding::Pkcs7 && data.is_empty() {
        return Err(CipherStreamError::Crypto(
            "cannot strip padding from empty ciphertext".into(),
        ));
    }

    let mut out = Vec::with_capacity(data.len());
    let mut prev = *iv;
    for chunk in data.chunks_exact(BLOCK_SIZE) {
        let mut block = AesBlock::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        let mut plain = [0u8; BLOCK_SIZE];
        xor_blocks(block.as_slice(), &prev, &mut plain);
        out.extend_from_slice(&plain);
        prev.copy_from_slice(chunk);
    }

    if padding == Padding::Pkcs7 {
        pkcs7_strip(&mut out)?;
    }
    Ok(out)
}

fn ctr_apply<C>(key: &[u8], iv: &[u8; IV_SIZE], data: &[u8]) -> Result<Vec<u8>, CipherStreamError>
where
    C: KeyIvInit + StreamCipher,
{
    let mut cipher = C::new_from_slices(key, iv)
        .map_err(|e| CipherStreamError::Crypto(format!("ctr init failed: {e}")))?;
    let mut out = data.to_vec();
    cipher.apply_keystream(&mut out);
    Ok(out)
}

/// Validate and strip the PKCS#7 pad run from the final block.
fn pkcs7_strip(out: &mut Vec<u8>) -> Result<(), CipherStreamError> {
    let pad = *out
        .last()
        .ok_or_else(|| CipherStreamError::Crypto("missing final padding block".to_string()))?;
    if pad == 0 || pad as usize > BLOCK_SIZE {
        return Err(CipherStreamError::Crypto(format!(
            "invalid pkcs7 padding byte {pad:#04x}"
        )));
    }
    let start = out.len() - pad as usize;
    if out[start..].iter().any(|&b| b != pad) {
        return Err(CipherStreamError::Crypto("corrupt pkcs7 padding".into()));
    }
    out.truncate(start);
    Ok(())
}
