//! Strkey encoding for account ids and secret seeds.
//!
//! Layout: `version byte ‖ 32-byte payload ‖ CRC16-XModem (little endian)`,
//! base32-encoded with the RFC 4648 alphabet and no padding. 35 bytes encode to
//! exactly 56 characters.
//!
//! Version bytes: `6 << 3` for account ids (renders as `G…`), `18 << 3` for
//! secret seeds (renders as `S…`).

use anchor_types::{AccountId, PublicKey};
use thiserror::Error;
use zeroize::Zeroizing;

/// RFC 4648 base32 alphabet.
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const VERSION_ACCOUNT_ID: u8 = 6 << 3;
const VERSION_SEED: u8 = 18 << 3;

/// Version byte + payload + checksum.
const RAW_LEN: usize = 35;
/// Encoded length of a 35-byte strkey.
const ENCODED_LEN: usize = 56;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrKeyError {
    #[error("strkey must be 56 characters, got {0}")]
    InvalidLength(usize),

    #[error("strkey contains characters outside the base32 alphabet")]
    InvalidCharacter,

    #[error("unexpected strkey version byte")]
    InvalidVersion,

    #[error("strkey checksum mismatch")]
    InvalidChecksum,
}

/// CRC16-XModem (poly 0x1021, init 0).
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

fn decode_base32_fixed<const N: usize>(s: &str) -> Result<[u8; N], StrKeyError> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        if c >= 128 {
            return Err(StrKeyError::InvalidCharacter);
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return Err(StrKeyError::InvalidCharacter);
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos < N {
                result[pos] = (buffer >> bits_in_buffer) as u8;
                pos += 1;
            }
        }
    }

    if pos < N {
        return Err(StrKeyError::InvalidLength(s.len()));
    }
    Ok(result)
}

fn encode_check(version: u8, payload: &[u8; 32]) -> String {
    let mut raw = Zeroizing::new([0u8; RAW_LEN]);
    raw[0] = version;
    raw[1..33].copy_from_slice(payload);
    let crc = crc16_xmodem(&raw[..33]);
    raw[33..].copy_from_slice(&crc.to_le_bytes());
    encode_base32(&raw[..])
}

fn decode_check(version: u8, encoded: &str) -> Result<Zeroizing<[u8; 32]>, StrKeyError> {
    if encoded.len() != ENCODED_LEN {
        return Err(StrKeyError::InvalidLength(encoded.len()));
    }
    let raw = Zeroizing::new(decode_base32_fixed::<RAW_LEN>(encoded)?);
    if raw[0] != version {
        return Err(StrKeyError::InvalidVersion);
    }
    let expected = crc16_xmodem(&raw[..33]);
    if raw[33..] != expected.to_le_bytes() {
        return Err(StrKeyError::InvalidChecksum);
    }
    let mut payload = Zeroizing::new([0u8; 32]);
    payload.copy_from_slice(&raw[1..33]);
    Ok(payload)
}

/// Encode a public key as a `G…` account id.
pub fn account_id(public_key: &PublicKey) -> AccountId {
    AccountId::new(encode_check(VERSION_ACCOUNT_ID, public_key.as_bytes()))
}

/// Extract the public key bytes from an account id string.
pub fn decode_account_id(address: &str) -> Result<PublicKey, StrKeyError> {
    decode_check(VERSION_ACCOUNT_ID, address).map(|bytes| PublicKey(*bytes))
}

/// Parse and checksum-verify an account id.
pub fn parse_account_id(address: &str) -> Result<AccountId, StrKeyError> {
    decode_account_id(address)?;
    Ok(AccountId::new(address))
}

/// Validate that an account id is well-formed and its checksum is correct.
pub fn validate_account_id(address: &str) -> bool {
    decode_account_id(address).is_ok()
}

/// Encode a 32-byte ed25519 seed as an `S…` secret string.
///
/// The returned string is itself secret material; it is wrapped so it is wiped on drop.
pub fn encode_secret_seed(seed: &[u8; 32]) -> Zeroizing<String> {
    Zeroizing::new(encode_check(VERSION_SEED, seed))
}

/// Decode an `S…` secret string into the 32-byte seed.
pub fn decode_secret_seed(secret: &str) -> Result<Zeroizing<[u8; 32]>, StrKeyError> {
    decode_check(VERSION_SEED, secret)
}
