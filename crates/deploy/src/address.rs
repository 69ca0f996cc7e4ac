//! Stacks address encoding.
//!
//! A standard (single-sig) Stacks address is the c32check encoding of the
//! hash160 of the account's compressed public key, tagged with a network
//! version byte.

use derive_more::{Deref, Display};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Version byte for mainnet single-sig addresses (`SP...`).
pub const MAINNET_SINGLESIG_VERSION: u8 = 22;
/// Version byte for testnet and devnet single-sig addresses (`ST...`).
pub const TESTNET_SINGLESIG_VERSION: u8 = 26;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// A c32check-encoded Stacks principal, e.g. `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref)]
pub struct StacksAddress(String);

impl StacksAddress {
    /// Encode a hash160 under the given version byte.
    pub fn from_hash160(version: u8, hash160: &[u8; 20]) -> Self {
        Self(c32check_encode(version, hash160))
    }

    /// The fully qualified identifier of a contract published by this address.
    pub fn contract_id(&self, contract_name: &str) -> String {
        format!("{}.{}", self.0, contract_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// RIPEMD160(SHA256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

fn c32check_encode(version: u8, data: &[u8]) -> String {
    let mut check_input = Vec::with_capacity(data.len() + 1);
    check_input.push(version);
    check_input.extend_from_slice(data);
    let checksum = Sha256::digest(Sha256::digest(&check_input));

    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum[..4]);

    format!(
        "S{}{}",
        C32_ALPHABET[usize::from(version & 0x1f)] as char,
        c32_encode(&payload)
    )
}

/// Crockford-style base32 over a big-endian byte string, preserving leading zero bytes.
fn c32_encode(input: &[u8]) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(input.len() * 8 / 5 + 1);
    let mut carry: u16 = 0;
    let mut carry_bits: u32 = 0;

    for &byte in input.iter().rev() {
        carry |= u16::from(byte) << carry_bits;
        carry_bits += 8;
        while carry_bits >= 5 {
            out.push(C32_ALPHABET[usize::from(carry & 0x1f)]);
            carry >>= 5;
            carry_bits -= 5;
        }
    }
    if carry_bits > 0 {
        out.push(C32_ALPHABET[usize::from(carry & 0x1f)]);
    }

    // Digits were produced least significant first.
    while out.last() == Some(&C32_ALPHABET[0]) {
        out.pop();
    }
    for _ in input.iter().take_while(|b| **b == 0) {
        out.push(C32_ALPHABET[0]);
    }

    out.iter().rev().map(|&c| c as char).collect()
}
