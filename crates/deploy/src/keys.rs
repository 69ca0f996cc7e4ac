//! Resolution of the operator's secret into a Stacks signing key.
//!
//! The secret is either a raw hex private key or a BIP-39 mnemonic. Either way
//! it ends up in the canonical Stacks form: 64 hex characters followed by the
//! `01` suffix that marks the key as producing a compressed public key.

use std::fmt;

use alloy_signer_local::{MnemonicBuilder, coins_bip39::English};
use k256::ecdsa::SigningKey;

use crate::{
    address::StacksAddress,
    error::{DeployError, Result},
    network::NetworkProfile,
};

/// BIP-44 derivation path of the first Stacks account (coin type 5757).
pub const STACKS_DERIVATION_PATH: &str = "m/44'/5757'/0'/0/0";

/// Suffix marking a private key as compressed.
const COMPRESSED_SUFFIX: &str = "01";

/// Inputs with at least this many words are treated as a mnemonic.
const MNEMONIC_MIN_WORDS: usize = 12;
/// Inputs longer than this are treated as a mnemonic regardless of word count.
const MNEMONIC_MIN_CHARS: usize = 100;

/// Which kind of secret the operator supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Mnemonic,
    HexKey,
}

/// Strip whitespace and one layer of surrounding quotes from a configured secret.
fn normalize_input(input: &str) -> &str {
    let trimmed = input.trim();
    let unquoted = trimmed
        .strip_prefix(['"', '\''])
        .unwrap_or(trimmed);
    unquoted.strip_suffix(['"', '\'']).unwrap_or(unquoted).trim()
}

/// Decide whether a (normalized) secret is a mnemonic or a raw key.
pub fn classify_secret(secret: &str) -> SecretKind {
    let words = secret.split_whitespace().count();
    if words >= MNEMONIC_MIN_WORDS || secret.len() > MNEMONIC_MIN_CHARS {
        SecretKind::Mnemonic
    } else {
        SecretKind::HexKey
    }
}

/// Resolve operator input into the canonical 66-character hex signing key.
pub fn resolve_secret(input: &str) -> Result<String> {
    let secret = normalize_input(input);
    if secret.is_empty() {
        return Err(DeployError::MissingSecret);
    }

    match classify_secret(secret) {
        SecretKind::Mnemonic => {
            tracing::info!("Detected mnemonic phrase, deriving private key...");
            let key = derive_from_mnemonic(secret)?;
            tracing::info!("Derived private key from mnemonic");
            Ok(key)
        }
        SecretKind::HexKey => normalize_hex_key(secret),
    }
}

/// Derive the canonical key at [`STACKS_DERIVATION_PATH`] from a mnemonic phrase.
pub fn derive_from_mnemonic(phrase: &str) -> Result<String> {
    let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");

    let signer = MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .derivation_path(STACKS_DERIVATION_PATH)
        .map_err(|e| DeployError::InvalidMnemonic(e.to_string()))?
        .build()
        .map_err(|e| DeployError::InvalidMnemonic(e.to_string()))?;

    let scalar = signer.credential().to_bytes();
    Ok(format!("{}{}", hex::encode(scalar), COMPRESSED_SUFFIX))
}

/// Validate a raw hex key and append the compression suffix if missing.
pub fn normalize_hex_key(input: &str) -> Result<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let key = compact.strip_prefix("0x").unwrap_or(&compact);

    let well_formed = key.chars().all(|c| c.is_ascii_hexdigit())
        && (key.len() == 64 || (key.len() == 66 && key.ends_with(COMPRESSED_SUFFIX)));
    if !well_formed {
        return Err(DeployError::InvalidKeyFormat { length: key.len() });
    }

    if key.len() == 64 {
        Ok(format!("{key}{COMPRESSED_SUFFIX}"))
    } else {
        Ok(key.to_string())
    }
}

/// The deployer's secp256k1 key, resolved once per run and held only in memory.
#[derive(Clone)]
pub struct DeployerKey {
    signing_key: SigningKey,
}

impl DeployerKey {
    /// Resolve operator input (hex key or mnemonic) into a usable key.
    pub fn resolve(input: &str) -> Result<Self> {
        Self::from_canonical_hex(&resolve_secret(input)?)
    }

    /// Parse a canonical 66-character key as produced by [`resolve_secret`].
    pub fn from_canonical_hex(canonical: &str) -> Result<Self> {
        let scalar_hex = canonical
            .strip_suffix(COMPRESSED_SUFFIX)
            .filter(|s| s.len() == 64)
            .ok_or(DeployError::InvalidKeyFormat {
                length: canonical.len(),
            })?;

        let bytes = hex::decode(scalar_hex).map_err(|e| DeployError::InvalidKey(e.to_string()))?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|e| DeployError::InvalidKey(e.to_string()))?;

        Ok(Self { signing_key })
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The 33-byte SEC1 compressed public key.
    pub fn compressed_public_key(&self) -> [u8; 33] {
        let point = self.signing_key.verifying_key().to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// The signer hash embedded in transactions and addresses.
    pub fn hash160(&self) -> [u8; 20] {
        crate::address::hash160(&self.compressed_public_key())
    }

    /// The deployer's address on the given network.
    pub fn address(&self, profile: &NetworkProfile) -> StacksAddress {
        StacksAddress::from_hash160(profile.address_version, &self.hash160())
    }
}

impl fmt::Debug for DeployerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployerKey")
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::network::{Network, NetworkProfile};

    /// Default deployer account of a Clarinet devnet.
    const DEVNET_MNEMONIC: &str = "twice kind fence tip hidden tilt action fragile skin nothing glory cousin green tomorrow spring wrist shed math olympic multiply hip blue scout claw";
    const DEVNET_KEY: &str = "753b7cc01a1a2e86221266a154af739463fce51219d97e4f856cd7200c3bd2a601";
    const DEVNET_ADDRESS: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[test]
    fn test_hex_key_gets_suffix() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let bytes: [u8; 32] = rng.random();
            let mut key = hex::encode(bytes);
            if rng.random_bool(0.5) {
                key = key.to_uppercase();
            }
            let resolved = resolve_secret(&key).unwrap();
            assert_eq!(resolved, format!("{key}01"));
            assert_eq!(resolve_secret(&key).unwrap(), resolved);
        }
    }

    #[test]
    fn test_hex_key_with_suffix_is_unchanged() {
        assert_eq!(resolve_secret(DEVNET_KEY).unwrap(), DEVNET_KEY);
    }

    #[test]
    fn test_hex_key_prefix_quotes_and_whitespace() {
        let raw = &DEVNET_KEY[..64];
        let input = format!("  \"0x{} {}\"\n", &raw[..32], &raw[32..]);
        assert_eq!(resolve_secret(&input).unwrap(), DEVNET_KEY);
    }

    #[test]
    fn test_invalid_hex_reports_length() {
        match resolve_secret("abc123") {
            Err(DeployError::InvalidKeyFormat { length }) => assert_eq!(length, 6),
            other => panic!("unexpected result: {other:?}"),
        }

        let wrong_suffix = format!("{}02", &DEVNET_KEY[..64]);
        assert!(matches!(
            resolve_secret(&wrong_suffix),
            Err(DeployError::InvalidKeyFormat { length: 66 })
        ));

        let not_hex = "g".repeat(64);
        assert!(matches!(
            resolve_secret(&not_hex),
            Err(DeployError::InvalidKeyFormat { length: 64 })
        ));
    }

    #[test]
    fn test_empty_secret_is_missing() {
        assert!(matches!(resolve_secret("   "), Err(DeployError::MissingSecret)));
        assert!(matches!(resolve_secret("\"\""), Err(DeployError::MissingSecret)));
    }

    #[test]
    fn test_classify_secret() {
        assert_eq!(classify_secret(DEVNET_MNEMONIC), SecretKind::Mnemonic);
        assert_eq!(classify_secret(DEVNET_KEY), SecretKind::HexKey);
        assert_eq!(classify_secret(&"a".repeat(101)), SecretKind::Mnemonic);
        assert_eq!(classify_secret("one two three"), SecretKind::HexKey);
    }

    #[test]
    fn test_mnemonic_derivation_is_stable() {
        let first = resolve_secret(DEVNET_MNEMONIC).unwrap();
        let spaced = format!("  {}  ", DEVNET_MNEMONIC.replace(' ', "   "));
        let second = resolve_secret(&spaced).unwrap();
        assert_eq!(first, DEVNET_KEY);
        assert_eq!(first, second);
    }

    #[test]
    fn test_twelve_word_mnemonic() {
        let phrase = format!("{} about", ["abandon"; 11].join(" "));
        assert_eq!(classify_secret(&phrase), SecretKind::Mnemonic);
        assert_eq!(
            resolve_secret(&phrase).unwrap(),
            "47382d0211f3bbb11812b5e60b696a93d7ad0a91cdeb2162f7d69d4adef48b5d01"
        );
    }

    #[test]
    fn test_invalid_mnemonic_checksum() {
        // Valid words, broken checksum.
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(matches!(
            resolve_secret(phrase),
            Err(DeployError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_zero_scalar_is_rejected() {
        let zero = "0".repeat(64);
        assert!(matches!(
            DeployerKey::resolve(&zero),
            Err(DeployError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_devnet_address() {
        let key = DeployerKey::resolve(DEVNET_KEY).unwrap();
        let devnet = NetworkProfile::new(Network::Devnet, None).unwrap();
        let mainnet = NetworkProfile::new(Network::Mainnet, None).unwrap();

        assert_eq!(key.address(&devnet).as_str(), DEVNET_ADDRESS);
        assert!(key.address(&mainnet).starts_with("SP"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = DeployerKey::resolve(DEVNET_KEY).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains(&DEVNET_KEY[..16]));
        assert!(debug.contains("redacted"));
    }
}
