// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key pair abstraction consumed by the account manager.
//!
//! Key derivation and signing live in the ledger SDK; this module only models
//! what the account layer needs to know about a key pair: its public key and
//! whether (and with which seed) it can sign.

use std::fmt;

/// A ledger identity with a public key and, optionally, a signing secret.
pub trait KeyPair: Send + Sync {
    /// Public key in strkey form (G...).
    fn public_key(&self) -> String;

    /// Whether a signing secret is available.
    fn can_sign(&self) -> bool;

    /// Secret seed in strkey form (S...).
    ///
    /// Fails with [`KeyPairError::CannotSign`] when `can_sign()` is false.
    fn secret(&self) -> Result<String, KeyPairError>;
}

/// Errors raised by key pair construction and access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyPairError {
    #[error("Key pair cannot sign (no secret available)")]
    CannotSign,

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid secret seed")]
    InvalidSecret,
}

/// Encoded length of a Stellar strkey (ed25519 key + version byte + checksum).
const STRKEY_LEN: usize = 56;

/// Stellar key pair assembled from strkey-encoded parts.
///
/// Watch-only and hardware-backed accounts carry no secret.
#[derive(Clone, PartialEq, Eq)]
pub struct StellarKeyPair {
    public_key: String,
    secret: Option<String>,
}

impl StellarKeyPair {
    /// Key pair that can only be observed, never used for signing.
    pub fn from_public_key(public_key: impl Into<String>) -> Result<Self, KeyPairError> {
        Self::from_parts(public_key, None)
    }

    pub fn from_parts(
        public_key: impl Into<String>,
        secret: Option<String>,
    ) -> Result<Self, KeyPairError> {
        let public_key = public_key.into().trim().to_string();
        if !is_strkey(&public_key, 'G') {
            return Err(KeyPairError::InvalidPublicKey(public_key));
        }

        let secret = match secret.map(|s| s.trim().to_string()) {
            Some(s) if s.is_empty() => None,
            Some(s) if !is_strkey(&s, 'S') => return Err(KeyPairError::InvalidSecret),
            other => other,
        };

        Ok(Self { public_key, secret })
    }
}

impl KeyPair for StellarKeyPair {
    fn public_key(&self) -> String {
        self.public_key.clone()
    }

    fn can_sign(&self) -> bool {
        self.secret.is_some()
    }

    fn secret(&self) -> Result<String, KeyPairError> {
        self.secret.clone().ok_or(KeyPairError::CannotSign)
    }
}

impl fmt::Debug for StellarKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StellarKeyPair")
            .field("public_key", &self.public_key)
            .field("can_sign", &self.secret.is_some())
            .finish()
    }
}

/// Shape check for a strkey: length, version prefix and base32 alphabet.
///
/// The CRC16 checksum is verified by the ledger SDK, not here.
pub fn is_strkey(value: &str, prefix: char) -> bool {
    value.len() == STRKEY_LEN
        && value.starts_with(prefix)
        && value
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_only_pair_cannot_sign() {
        let pair = StellarKeyPair::from_public_key(test_keys::public_key(1)).unwrap();
        assert!(!pair.can_sign());
        assert_eq!(pair.secret(), Err(KeyPairError::CannotSign));
    }

    #[test]
    fn signing_pair_exposes_secret() {
        let pair =
            StellarKeyPair::from_parts(test_keys::public_key(2), Some(test_keys::secret(2)))
                .unwrap();
        assert!(pair.can_sign());
        assert_eq!(pair.secret().unwrap(), test_keys::secret(2));
        assert_eq!(pair.public_key(), test_keys::public_key(2));
    }

    #[test]
    fn empty_secret_means_watch_only() {
        let pair =
            StellarKeyPair::from_parts(test_keys::public_key(3), Some("  ".to_string())).unwrap();
        assert!(!pair.can_sign());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            StellarKeyPair::from_public_key("0x1234"),
            Err(KeyPairError::InvalidPublicKey(_))
        ));
        // A secret seed is not a public key
        assert!(StellarKeyPair::from_public_key(test_keys::secret(4)).is_err());
        assert_eq!(
            StellarKeyPair::from_parts(test_keys::public_key(4), Some(test_keys::public_key(5))),
            Err(KeyPairError::InvalidSecret)
        );
    }

    #[test]
    fn debug_output_hides_secret() {
        let pair =
            StellarKeyPair::from_parts(test_keys::public_key(6), Some(test_keys::secret(6)))
                .unwrap();
        assert!(!format!("{pair:?}").contains(&test_keys::secret(6)));
    }
}
