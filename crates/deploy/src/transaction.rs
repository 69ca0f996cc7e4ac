//! Contract-deploy transactions in the Stacks wire format.
//!
//! Only what the deployer needs is implemented: a single-signature,
//! standard-authorization transaction carrying a smart-contract payload, with
//! no post-conditions.

use k256::ecdsa::SigningKey;
use sha2::{Digest, Sha512_256};

use crate::{
    error::{DeployError, Result},
    keys::DeployerKey,
    network::NetworkProfile,
};

const AUTH_STANDARD: u8 = 0x04;
const HASH_MODE_P2PKH: u8 = 0x00;
const KEY_ENCODING_COMPRESSED: u8 = 0x00;
const ANCHOR_MODE_ANY: u8 = 0x03;
const POST_CONDITION_MODE_ALLOW: u8 = 0x01;
const PAYLOAD_SMART_CONTRACT: u8 = 0x01;

/// Recovery id followed by the 64-byte compact signature.
pub const SIGNATURE_LEN: usize = 65;

/// An unsigned smart-contract deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDeploy {
    pub transaction_version: u8,
    pub chain_id: u32,
    pub signer: [u8; 20],
    pub nonce: u64,
    pub fee: u64,
    pub contract_name: String,
    pub code_body: String,
}

impl ContractDeploy {
    /// A deployment of `code_body` as `contract_name` from `key` on `profile`.
    pub fn new(
        profile: &NetworkProfile,
        key: &DeployerKey,
        contract_name: &str,
        code_body: &str,
        nonce: u64,
    ) -> Self {
        Self {
            transaction_version: profile.transaction_version,
            chain_id: profile.chain_id,
            signer: key.hash160(),
            nonce,
            fee: profile.deploy_fee,
            contract_name: contract_name.to_string(),
            code_body: code_body.to_string(),
        }
    }

    /// Sign the transaction with the origin key.
    pub fn sign(self, key: &DeployerKey) -> Result<SignedTransaction> {
        // The initial sighash commits to the transaction with its spending
        // condition cleared.
        let cleared = self.serialize(0, 0, &[0u8; SIGNATURE_LEN]);
        let initial_sighash = sha512_256(&cleared);

        let mut presign = Vec::with_capacity(32 + 1 + 8 + 8);
        presign.extend_from_slice(&initial_sighash);
        presign.push(AUTH_STANDARD);
        presign.extend_from_slice(&self.fee.to_be_bytes());
        presign.extend_from_slice(&self.nonce.to_be_bytes());
        let presign_sighash = sha512_256(&presign);

        let signature = sign_recoverable(key.signing_key(), &presign_sighash)?;
        let bytes = self.serialize(self.nonce, self.fee, &signature);
        let txid = hex::encode(sha512_256(&bytes));

        Ok(SignedTransaction {
            contract_name: self.contract_name,
            nonce: self.nonce,
            fee: self.fee,
            presign_sighash,
            signature,
            txid,
            bytes,
        })
    }

    fn serialize(&self, nonce: u64, fee: u64, signature: &[u8; SIGNATURE_LEN]) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.contract_name.len() + self.code_body.len());

        out.push(self.transaction_version);
        out.extend_from_slice(&self.chain_id.to_be_bytes());

        out.push(AUTH_STANDARD);
        out.push(HASH_MODE_P2PKH);
        out.extend_from_slice(&self.signer);
        out.extend_from_slice(&nonce.to_be_bytes());
        out.extend_from_slice(&fee.to_be_bytes());
        out.push(KEY_ENCODING_COMPRESSED);
        out.extend_from_slice(signature);

        out.push(ANCHOR_MODE_ANY);
        out.push(POST_CONDITION_MODE_ALLOW);
        out.extend_from_slice(&0u32.to_be_bytes());

        out.push(PAYLOAD_SMART_CONTRACT);
        // Contract names are validated to at most 128 ASCII characters.
        out.push(self.contract_name.len() as u8);
        out.extend_from_slice(self.contract_name.as_bytes());
        out.extend_from_slice(&(self.code_body.len() as u32).to_be_bytes());
        out.extend_from_slice(self.code_body.as_bytes());

        out
    }
}

/// A signed, broadcast-ready transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    contract_name: String,
    nonce: u64,
    fee: u64,
    presign_sighash: [u8; 32],
    signature: [u8; SIGNATURE_LEN],
    txid: String,
    bytes: Vec<u8>,
}

impl SignedTransaction {
    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// The hash the origin signed.
    pub fn presign_sighash(&self) -> &[u8; 32] {
        &self.presign_sighash
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }

    /// Hex txid computed locally; the node reports the same value on acceptance.
    pub fn txid(&self) -> &str {
        &self.txid
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn sha512_256(data: &[u8]) -> [u8; 32] {
    Sha512_256::digest(data).into()
}

fn sign_recoverable(key: &SigningKey, prehash: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN]> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(prehash)
        .map_err(|e| DeployError::InvalidKey(format!("signing failed: {e}")))?;

    let mut out = [0u8; SIGNATURE_LEN];
    out[0] = recovery_id.to_byte();
    out[1..].copy_from_slice(&signature.to_bytes());
    Ok(out)
}
