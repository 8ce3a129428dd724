//! Signer resolution from secret URIs.
//!
//! # Security
//! - Secret URIs are read from arguments or the environment, never from config files
//! - Secrets are never logged; only derived SS58 addresses are

use std::str::FromStr;

use subxt::utils::AccountId32;
use subxt_signer::sr25519::Keypair;
use subxt_signer::{ecdsa, SecretUri};

use crate::chain::types::{ChainError, ChainResult};

/// Environment variable holding the default signer's secret URI.
pub const SURI_ENV_VAR: &str = "EXTRINSIC_WATCH_SURI";

/// Derive an sr25519 keypair from a secret URI.
///
/// Accepts dev URIs (`//Alice`) and `"<mnemonic>//hard/soft"` forms; a URI
/// without a phrase derives from the well-known development phrase.
pub fn keypair_from_suri(suri: &str) -> ChainResult<Keypair> {
    let uri = SecretUri::from_str(suri)
        .map_err(|e| ChainError::Keyring(format!("Invalid secret URI: {}", e)))?;
    let pair = Keypair::from_uri(&uri)
        .map_err(|e| ChainError::Keyring(format!("Key derivation failed: {}", e)))?;

    tracing::debug!(address = %address_of(&pair), "Signer loaded");
    Ok(pair)
}

/// Load the signer from `EXTRINSIC_WATCH_SURI`.
pub fn keypair_from_env() -> ChainResult<Keypair> {
    let suri = std::env::var(SURI_ENV_VAR).map_err(|_| {
        ChainError::Keyring(format!("Environment variable {} not set", SURI_ENV_VAR))
    })?;
    keypair_from_suri(&suri)
}

pub fn account_id(pair: &Keypair) -> AccountId32 {
    pair.public_key().to_account_id()
}

/// SS58 address (generic substrate prefix).
pub fn address_of(pair: &Keypair) -> String {
    account_id(pair).to_string()
}

/// Resolve a destination given either as an SS58 address or a secret URI
/// (dev path, mnemonic or `0x` seed).
pub fn resolve_account(input: &str) -> ChainResult<AccountId32> {
    if let Ok(account) = AccountId32::from_str(input) {
        return Ok(account);
    }
    keypair_from_suri(input)
        .map(|pair| account_id(&pair))
        .map_err(|_| {
            ChainError::Keyring(format!("Invalid SS58 address or secret URI '{}'", input))
        })
}

/// Derive an ecdsa keypair from a secret URI. Service operators register
/// with this key.
pub fn ecdsa_keypair_from_suri(suri: &str) -> ChainResult<ecdsa::Keypair> {
    let uri = SecretUri::from_str(suri)
        .map_err(|e| ChainError::Keyring(format!("Invalid secret URI: {}", e)))?;
    ecdsa::Keypair::from_uri(&uri)
        .map_err(|e| ChainError::Keyring(format!("Key derivation failed: {}", e)))
}

/// Compressed (33-byte) ecdsa public key.
pub fn ecdsa_public_key(pair: &ecdsa::Keypair) -> [u8; 33] {
    pair.public_key().0
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const BOB_SS58: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";

    #[test]
    fn test_dev_uri() {
        let alice = keypair_from_suri("//Alice").unwrap();
        assert_eq!(address_of(&alice), ALICE_SS58);
    }

    #[test]
    fn test_resolve_account_from_uri_and_address() {
        assert_eq!(resolve_account("//Bob").unwrap().to_string(), BOB_SS58);
        assert_eq!(resolve_account(BOB_SS58).unwrap().to_string(), BOB_SS58);
    }

    #[test]
    fn test_invalid_address() {
        let err = resolve_account("not-an-address").unwrap_err();
        assert!(err.to_string().contains("Invalid SS58 address or secret URI"));
    }

    #[test]
    fn test_resolve_account_from_hex_seed() {
        let seed = format!("0x{}", "11".repeat(32));
        let expected = address_of(&keypair_from_suri(&seed).unwrap());
        assert_eq!(resolve_account(&seed).unwrap().to_string(), expected);
    }

    #[test]
    fn test_ecdsa_operator_keys() {
        let bob = ecdsa_keypair_from_suri("//Bob").unwrap();
        let charlie = ecdsa_keypair_from_suri("//Charlie").unwrap();
        let key = ecdsa_public_key(&bob);
        assert!(key[0] == 0x02 || key[0] == 0x03);
        assert_ne!(key, ecdsa_public_key(&charlie));
        assert_eq!(key, ecdsa_public_key(&ecdsa_keypair_from_suri("//Bob").unwrap()));
    }
}
