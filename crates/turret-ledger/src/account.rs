//! Queried account state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use turret_core::{AccountId, OwnerDirectory, SignerKey};

/// One (signer key, weight) pair on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEntry {
    /// Signer public key.
    pub key: SignerKey,
    /// Signing weight. Weight zero means the signer is logically removed.
    pub weight: u8,
}

/// Operation thresholds configured on an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Threshold for low-security operations.
    pub low: u8,
    /// Threshold for medium-security operations.
    pub med: u8,
    /// Threshold for high-security operations.
    pub high: u8,
}

/// Snapshot of a ledger account as returned by the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account public key.
    pub id: AccountId,
    /// Sequence number of the last applied transaction.
    pub sequence: i64,
    /// Current signers with their weights.
    pub signers: Vec<SignerEntry>,
    /// Opaque key/value data entries.
    pub data: BTreeMap<String, Vec<u8>>,
    /// Operation thresholds.
    pub thresholds: Thresholds,
    /// Published home domain, if any.
    pub home_domain: Option<String>,
}

impl AccountRecord {
    /// Signer entry for `key`, if present.
    pub fn signer(&self, key: &SignerKey) -> Option<&SignerEntry> {
        self.signers.iter().find(|s| &s.key == key)
    }

    /// Whether `key` is currently listed as a signer.
    pub fn has_signer(&self, key: &SignerKey) -> bool {
        self.signer(key).is_some()
    }

    /// Sequence number the next transaction must carry.
    pub fn next_sequence(&self) -> i64 {
        self.sequence + 1
    }

    /// Parse the turret owner directory out of this account's data entries.
    pub fn directory(&self) -> OwnerDirectory {
        OwnerDirectory::from_data_entries(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turret_core::directory::entry_key;

    fn record() -> AccountRecord {
        let signer = SignerKey::from_bytes([7; 32]);
        let owner = AccountId::from_bytes([9; 32]);
        AccountRecord {
            id: AccountId::from_bytes([1; 32]),
            sequence: 41,
            signers: vec![SignerEntry { key: signer, weight: 1 }],
            data: [(entry_key(&signer), owner.to_string().into_bytes())].into(),
            thresholds: Thresholds { low: 1, med: 2, high: 2 },
            home_domain: Some("turret.example".into()),
        }
    }

    #[test]
    fn signer_lookup_and_sequence() {
        let record = record();
        assert!(record.has_signer(&SignerKey::from_bytes([7; 32])));
        assert!(!record.has_signer(&SignerKey::from_bytes([8; 32])));
        assert_eq!(record.next_sequence(), 42);
    }

    #[test]
    fn directory_is_parsed_from_data() {
        let dir = record().directory();
        assert_eq!(
            dir.owner_of(&SignerKey::from_bytes([7; 32])),
            Some(&AccountId::from_bytes([9; 32]))
        );
    }
}
