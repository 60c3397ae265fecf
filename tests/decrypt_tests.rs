//! tests/decrypt_tests.rs
//! Decrypting transformer tests: round-trips, padding strip, failure
//! surfacing, and the seek contract.

mod common;

use cipherstream::crypto::aes;
use cipherstream::{
    ByteStream, CipherMethod, CipherStreamError, DecryptStream, EncryptStream, MemoryStream,
    Padding,
};
use common::{drain_in_chunks, LimitStream};
use std::io::SeekFrom;

const KEY: &[u8] = common::TEST_KEY;
const IV: &[u8; 16] = common::TEST_IV;

fn cbc_ciphertext(plaintext: &[u8]) -> Vec<u8> {
    aes::encrypt(plaintext, "aes-256-cbc", KEY, IV, Padding::Pkcs7).unwrap()
}

fn ctr_ciphertext(plaintext: &[u8]) -> Vec<u8> {
    aes::encrypt(plaintext, "aes-256-ctr", KEY, IV, Padding::None).unwrap()
}

fn cbc_decrypter(ciphertext: Vec<u8>) -> DecryptStream<MemoryStream> {
    let method = CipherMethod::cbc(IV, 256).unwrap();
    DecryptStream::new(MemoryStream::new(ciphertext), KEY, method)
}

fn ctr_decrypter(ciphertext: Vec<u8>) -> DecryptStream<MemoryStream> {
    let method = CipherMethod::ctr(IV, 256).unwrap();
    DecryptStream::new(MemoryStream::new(ciphertext), KEY, method)
}

#[test]
fn padded_roundtrip_byte_at_a_time() {
    // Encrypter and decrypter run off clones of one method: no IV aliasing.
    let iv: [u8; 16] = rand::random();
    let method = CipherMethod::cbc(&iv, 256).unwrap();

    let plaintext = vec![b'0'; 100];
    let mut encrypter = EncryptStream::new(
        MemoryStream::new(plaintext.clone()),
        KEY,
        method.clone(),
    );
    let ciphertext = encrypter.contents().unwrap();

    let mut decrypter = DecryptStream::new(MemoryStream::new(ciphertext), KEY, method);
    let recovered = drain_in_chunks(&mut decrypter, 1);
    assert_eq!(recovered, plaintext);

    let mut byte = [0u8; 1];
    assert_eq!(decrypter.read(&mut byte).unwrap(), 0);
    assert!(decrypter.eof());
}

#[test]
fn cbc_roundtrip_every_tail_length() {
    for len in [0usize, 1, 15, 16, 17, 31, 32, 100, 1000] {
        let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let recovered = cbc_decrypter(cbc_ciphertext(&plaintext)).contents().unwrap();
        assert_eq!(recovered, plaintext, "len {len}");
    }
}

#[test]
fn ctr_roundtrip_every_tail_length() {
    for len in [0usize, 1, 15, 16, 17, 100, 999] {
        let plaintext: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
        let recovered = ctr_decrypter(ctr_ciphertext(&plaintext)).contents().unwrap();
        assert_eq!(recovered, plaintext, "len {len}");
    }
}

#[test]
fn read_size_does_not_change_output() {
    let plaintext: Vec<u8> = (0..=255u8).cycle().take(777).collect();
    let ciphertext = cbc_ciphertext(&plaintext);

    for chunk in [1usize, 5, 16, 100, 4096] {
        let mut decrypter = cbc_decrypter(ciphertext.clone());
        assert_eq!(drain_in_chunks(&mut decrypter, chunk), plaintext, "chunk {chunk}");
    }
}

#[test]
fn size_is_unknown_for_padded_modes() {
    let decrypter = cbc_decrypter(cbc_ciphertext(&[0u8; 100]));
    assert_eq!(decrypter.size(), None);
}

#[test]
fn size_follows_source_for_stream_modes() {
    let decrypter = ctr_decrypter(ctr_ciphertext(&[0u8; 100]));
    assert_eq!(decrypter.size(), Some(100));
}

#[test]
fn truncated_ciphertext_raises_decryption_failed() {
    // Dropping the pad block leaves a final block whose plaintext ends in
    // 0x41 — never a valid pad byte.
    let ciphertext = cbc_ciphertext(&[0x41u8; 32]);
    let mut decrypter = cbc_decrypter(ciphertext[..32].to_vec());

    let err = decrypter.contents().unwrap_err();
    assert!(matches!(err, CipherStreamError::DecryptionFailed { .. }));
}

#[test]
fn unaligned_ciphertext_raises_decryption_failed() {
    let mut decrypter = cbc_decrypter(vec![0u8; 33]);
    let err = decrypter.contents().unwrap_err();
    assert!(matches!(err, CipherStreamError::DecryptionFailed { .. }));
}

#[test]
fn failed_stream_stays_poisoned() {
    let mut decrypter = cbc_decrypter(vec![0u8; 33]);
    assert!(decrypter.contents().is_err());

    let mut buf = [0u8; 16];
    let err = decrypter.read(&mut buf).unwrap_err();
    assert!(matches!(err, CipherStreamError::DecryptionFailed { .. }));
}

#[test]
fn empty_source_decrypts_to_nothing() {
    let mut decrypter = cbc_decrypter(Vec::new());
    assert!(decrypter.contents().unwrap().is_empty());
    assert!(decrypter.eof());

    let mut decrypter = ctr_decrypter(Vec::new());
    assert!(decrypter.contents().unwrap().is_empty());
}

#[test]
fn only_rewind_is_a_legal_seek() {
    // Even CTR: positional access wraps the decrypter externally.
    let mut decrypter = ctr_decrypter(ctr_ciphertext(&[0u8; 100]));
    for illegal in [
        SeekFrom::Start(16),
        SeekFrom::Current(16),
        SeekFrom::Current(-1),
        SeekFrom::End(0),
    ] {
        let err = decrypter.seek(illegal).unwrap_err();
        assert!(
            matches!(err, CipherStreamError::UnsupportedSeek(_)),
            "accepted {illegal:?}"
        );
    }
    decrypter.seek(SeekFrom::Start(0)).unwrap();
}

#[test]
fn rewind_reproduces_the_plaintext() {
    let plaintext: Vec<u8> = (0..150u8).collect();
    let mut decrypter = cbc_decrypter(cbc_ciphertext(&plaintext));

    let mut prefix = [0u8; 40];
    decrypter.read(&mut prefix).unwrap();

    decrypter.rewind().unwrap();
    assert_eq!(decrypter.tell(), 0);
    assert_eq!(decrypter.contents().unwrap(), plaintext);
}

#[test]
fn tell_after_bounded_read() {
    let plaintext = vec![0x77u8; 64 * 1024];
    let mut decrypter = cbc_decrypter(cbc_ciphertext(&plaintext));

    let mut window = vec![0u8; 8192];
    let n = decrypter.read(&mut window).unwrap();
    assert_eq!(n, 8192);
    assert_eq!(decrypter.tell(), 8192);
}

#[test]
fn byte_limit_wrapper_caps_the_copy() {
    let plaintext = vec![0x21u8; 64 * 1024];
    let decrypter = ctr_decrypter(ctr_ciphertext(&plaintext));

    let mut limited = LimitStream::new(decrypter, 4096);
    assert_eq!(limited.size(), Some(4096));

    let copied = limited.contents().unwrap();
    assert_eq!(copied.len(), 4096);
    assert_eq!(copied, &plaintext[..4096]);
}

#[test]
fn wrong_iv_still_decrypts_middle_blocks_under_ctr() {
    // CTR never detects integrity errors: any input decrypts to something.
    let ciphertext = ctr_ciphertext(&[0x10u8; 64]);
    let method = CipherMethod::ctr(&[0x01u8; 16], 256).unwrap();
    let mut decrypter = DecryptStream::new(MemoryStream::new(ciphertext), KEY, method);

    let garbage = decrypter.contents().unwrap();
    assert_eq!(garbage.len(), 64);
    assert_ne!(garbage, vec![0x10u8; 64]);
}
