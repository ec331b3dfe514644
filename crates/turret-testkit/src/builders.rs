//! Deterministic fixture builders.

use ed25519_dalek::SigningKey;
use std::collections::BTreeMap;
use turret_core::directory::entry_key;
use turret_core::{AccountId, Amount, Network, SignerKey};
use turret_ledger::{
    AccountRecord, Asset, Operation, SignerEntry, Thresholds, TransactionBuilder,
    TransactionEnvelope,
};

/// Deterministic signing key derived from a single seed byte.
pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

/// Account id of the deterministic keypair for `seed`.
pub fn account_id(seed: u8) -> AccountId {
    AccountId::from(signing_key(seed).verifying_key())
}

/// Signer key of the deterministic keypair for `seed`.
pub fn signer_key(seed: u8) -> SignerKey {
    SignerKey::from(signing_key(seed).verifying_key())
}

/// Trust document text listing `turrets`.
pub fn trust_document(turrets: &[AccountId]) -> String {
    turrets
        .iter()
        .map(|key| format!("[[TURRETS]]\nPUBLIC_KEY = \"{key}\"\n"))
        .collect()
}

/// A control account with the given signers and `turret.<signer> = owner`
/// directory entries.
pub fn control_account(
    id: AccountId,
    signers: &[(SignerKey, u8)],
    directory: &[(SignerKey, AccountId)],
) -> AccountRecord {
    AccountRecord {
        id,
        sequence: 100,
        signers: signers
            .iter()
            .map(|(key, weight)| SignerEntry {
                key: *key,
                weight: *weight,
            })
            .collect(),
        data: directory
            .iter()
            .map(|(signer, owner)| (entry_key(signer), owner.to_string().into_bytes()))
            .collect(),
        thresholds: Thresholds {
            low: 1,
            med: 1,
            high: 1,
        },
        home_domain: None,
    }
}

/// A turret identity account publishing `home_domain`.
pub fn turret_account(id: AccountId, home_domain: &str) -> AccountRecord {
    AccountRecord {
        id,
        sequence: 1,
        signers: Vec::new(),
        data: BTreeMap::new(),
        thresholds: Thresholds::default(),
        home_domain: Some(home_domain.to_string()),
    }
}

/// A signed native-asset fee payment envelope, as wire text.
///
/// `sequence` varies the transaction hash so tests can mint distinct
/// payments for the same amount.
pub fn fee_payment_envelope(
    payer: &SigningKey,
    destination: AccountId,
    amount: Amount,
    sequence: i64,
    network: Network,
) -> String {
    let tx = TransactionBuilder::new(AccountId::from(payer.verifying_key()), sequence, 100)
        .add_operation(Operation::Payment {
            destination,
            asset: Asset::Native,
            amount,
        })
        .build();
    let mut envelope = TransactionEnvelope::unsigned(tx);
    envelope.sign(payer, network).unwrap();
    envelope.to_base64().unwrap()
}
