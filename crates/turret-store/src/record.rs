//! Persisted function record.

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use turret_core::{Amount, SignerKey, TxHash};
use zeroize::Zeroize;

/// A stored TxFunction: immutable code and fields plus billing and signer
/// metadata. Serialized with bincode into the key-value backend under the
/// function's digest.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredTxFunction {
    /// Function code bytes.
    pub code: Vec<u8>,
    /// Optional structured fields blob (empty when absent).
    pub fields: Vec<u8>,
    /// Upload cost charged for this function.
    pub cost: Amount,
    /// Hash of the fee payment transaction.
    pub payment: TxHash,
    /// Length of the code bytes alone.
    pub code_length: u64,
    /// Public key of the dedicated signer.
    pub signer_public_key: SignerKey,
    /// Secret key of the dedicated signer. Never exposed; see
    /// [`StoredTxFunction::signing_key`].
    signer_secret: [u8; 32],
}

impl StoredTxFunction {
    /// Assemble a record at upload time.
    pub fn new(
        code: Vec<u8>,
        fields: Vec<u8>,
        cost: Amount,
        payment: TxHash,
        signing_key: &SigningKey,
    ) -> Self {
        Self {
            code_length: code.len() as u64,
            code,
            fields,
            cost,
            payment,
            signer_public_key: SignerKey::from(signing_key.verifying_key()),
            signer_secret: signing_key.to_bytes(),
        }
    }

    /// Reconstruct the dedicated signing key.
    ///
    /// Crate-private: only the store's own co-signing path may touch the
    /// secret.
    pub(crate) fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.signer_secret)
    }
}

impl Drop for StoredTxFunction {
    fn drop(&mut self) {
        self.signer_secret.zeroize();
    }
}

impl fmt::Debug for StoredTxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredTxFunction")
            .field("code_length", &self.code_length)
            .field("fields_length", &self.fields.len())
            .field("cost", &self.cost)
            .field("payment", &self.payment)
            .field("signer_public_key", &self.signer_public_key)
            .field("signer_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn debug_redacts_the_secret() {
        let key = SigningKey::generate(&mut OsRng);
        let record = StoredTxFunction::new(
            b"code".to_vec(),
            Vec::new(),
            Amount::from_stroops(1),
            TxHash::from_bytes([0; 32]),
            &key,
        );
        let rendered = format!("{record:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&hex::encode(key.to_bytes())));
    }

    #[test]
    fn round_trips_through_bincode() {
        let key = SigningKey::generate(&mut OsRng);
        let record = StoredTxFunction::new(
            b"code".to_vec(),
            b"{}".to_vec(),
            Amount::from_stroops(7),
            TxHash::from_bytes([1; 32]),
            &key,
        );
        let bytes = bincode::serialize(&record).unwrap();
        let back: StoredTxFunction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.signer_public_key, record.signer_public_key);
        assert_eq!(back.code, b"code");
        assert_eq!(back.signing_key().to_bytes(), key.to_bytes());
    }
}
