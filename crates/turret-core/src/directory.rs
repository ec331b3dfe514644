//! Typed owner directory over account data entries.
//!
//! Control accounts record which turret owns which installed signer as data
//! entries of the form `turret.<signerPublicKey> = <turretAccountId>`. That
//! convention is the on-chain source of truth for signer ownership,
//! independent of turret self-reporting. This module parses the opaque
//! attribute bag into a first-class map once, at the gateway boundary, so
//! protocol code never does ad hoc string matching.

use crate::identity::{AccountId, SignerKey};
use std::collections::BTreeMap;

/// Prefix of every directory data entry.
pub const TURRET_DATA_PREFIX: &str = "turret.";

/// Data entry key recording ownership of `signer`.
pub fn entry_key(signer: &SignerKey) -> String {
    format!("{TURRET_DATA_PREFIX}{signer}")
}

/// Map from installed signer key to the turret that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerDirectory {
    entries: BTreeMap<SignerKey, AccountId>,
}

impl OwnerDirectory {
    /// Parse the directory out of an account's raw data entries.
    ///
    /// Entries outside the `turret.` namespace are ignored; so are entries
    /// whose key or value does not parse, since the attribute bag is shared
    /// with arbitrary other applications.
    pub fn from_data_entries(data: &BTreeMap<String, Vec<u8>>) -> Self {
        let mut entries = BTreeMap::new();
        for (key, value) in data {
            let Some(signer) = key.strip_prefix(TURRET_DATA_PREFIX) else {
                continue;
            };
            let Ok(signer) = signer.parse::<SignerKey>() else {
                continue;
            };
            let Ok(turret) = std::str::from_utf8(value)
                .map_err(|_| ())
                .and_then(|s| s.parse::<AccountId>().map_err(|_| ()))
            else {
                continue;
            };
            entries.insert(signer, turret);
        }
        Self { entries }
    }

    /// Turret recorded as owner of `signer`, if any.
    pub fn owner_of(&self, signer: &SignerKey) -> Option<&AccountId> {
        self.entries.get(signer)
    }

    /// Signer recorded as owned by `turret`, if any.
    pub fn signer_owned_by(&self, turret: &AccountId) -> Option<&SignerKey> {
        self.entries
            .iter()
            .find(|(_, owner)| *owner == turret)
            .map(|(signer, _)| signer)
    }

    /// Whether any entry records `turret` as an owner.
    pub fn contains_owner(&self, turret: &AccountId) -> bool {
        self.signer_owned_by(turret).is_some()
    }

    /// Number of directory entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (signer, owner) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&SignerKey, &AccountId)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(byte: u8) -> SignerKey {
        SignerKey::from_bytes([byte; 32])
    }

    fn turret(byte: u8) -> AccountId {
        AccountId::from_bytes([byte; 32])
    }

    fn data_with(entries: &[(String, Vec<u8>)]) -> BTreeMap<String, Vec<u8>> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn parses_turret_entries_and_skips_foreign_keys() {
        let data = data_with(&[
            (entry_key(&signer(1)), turret(9).to_string().into_bytes()),
            ("app.color".into(), b"blue".to_vec()),
            ("turret.not-a-key".into(), turret(9).to_string().into_bytes()),
            (entry_key(&signer(2)), b"not-an-account".to_vec()),
        ]);

        let dir = OwnerDirectory::from_data_entries(&data);
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.owner_of(&signer(1)), Some(&turret(9)));
        assert_eq!(dir.owner_of(&signer(2)), None);
    }

    #[test]
    fn looks_up_by_owner() {
        let data = data_with(&[
            (entry_key(&signer(1)), turret(9).to_string().into_bytes()),
            (entry_key(&signer(2)), turret(8).to_string().into_bytes()),
        ]);
        let dir = OwnerDirectory::from_data_entries(&data);

        assert_eq!(dir.signer_owned_by(&turret(8)), Some(&signer(2)));
        assert!(dir.contains_owner(&turret(9)));
        assert!(!dir.contains_owner(&turret(7)));
    }

    #[test]
    fn entry_key_is_prefixed_hex() {
        let key = entry_key(&signer(0xab));
        assert!(key.starts_with("turret."));
        assert!(key.ends_with(&"ab".repeat(32)));
    }
}
