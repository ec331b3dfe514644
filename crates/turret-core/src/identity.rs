//! Validated identifiers: account keys, signer keys, and content hashes.
//!
//! Account and signer identities are 32-byte ed25519 public keys rendered as
//! 64 lowercase hex characters. Hashes are 32-byte SHA-256 digests rendered
//! the same way. Parsing is the syntactic validation required at every
//! request boundary; full curve-point validation happens only where a key is
//! actually used to verify a signature.

use crate::errors::TurretError;
use ed25519_dalek::VerifyingKey;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

fn parse_hex_32(kind: &str, s: &str) -> Result<[u8; 32], TurretError> {
    let bytes = hex::decode(s)
        .map_err(|_| TurretError::validation(format!("{kind} is not valid hex: {s}")))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| TurretError::validation(format!("{kind} must be 32 bytes: {s}")))?;
    Ok(bytes)
}

macro_rules! hex_identifier {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Raw byte view.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = TurretError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_32($kind, s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

hex_identifier!(
    /// Public key of a ledger account, including turret identity accounts.
    AccountId,
    "account id"
);

hex_identifier!(
    /// Public key of a dedicated signer installed on a control account.
    SignerKey,
    "signer key"
);

hex_identifier!(
    /// Content digest identifying an uploaded TxFunction.
    TxFunctionHash,
    "tx function hash"
);

hex_identifier!(
    /// Hash of a ledger transaction.
    TxHash,
    "transaction hash"
);

impl AccountId {
    /// Interpret this identity as an ed25519 verifying key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, TurretError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|_| TurretError::validation(format!("account id {self} is not a valid key")))
    }
}

impl SignerKey {
    /// Interpret this signer as an ed25519 verifying key.
    pub fn verifying_key(&self) -> Result<VerifyingKey, TurretError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|_| TurretError::validation(format!("signer key {self} is not a valid key")))
    }
}

impl From<VerifyingKey> for SignerKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

impl From<VerifyingKey> for AccountId {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}
