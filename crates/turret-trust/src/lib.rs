//! Quorum trust registry.
//!
//! Each node keeps a local trust document listing the peer turrets it
//! considers part of its quorum. The registry is loaded once per process and
//! is read-only afterwards; changing the quorum means editing the document
//! and restarting (or explicitly re-initializing).
//!
//! Trust queries fail closed: a document that cannot be parsed never yields
//! a registry at all, so nothing can accidentally default to "trusted".

#![forbid(unsafe_code)]

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use turret_core::{AccountId, Result, TurretError};

/// One entry of the trust document.
///
/// Only the public key participates in trust decisions; the descriptive
/// fields exist for operators and are ignored by the protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct TurretEntry {
    /// Public key of the trusted turret.
    #[serde(rename = "PUBLIC_KEY")]
    pub public_key: String,
    /// Where the turret publishes its TxFunctions.
    #[serde(rename = "HOME_DOMAIN", default)]
    pub home_domain: Option<String>,
    /// Free-form operator note.
    #[serde(rename = "NAME", default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrustDocument {
    #[serde(rename = "TURRETS", default)]
    turrets: Vec<TurretEntry>,
}

/// The set of peer turrets this node trusts.
#[derive(Debug, Clone)]
pub struct TrustRegistry {
    trusted: BTreeSet<AccountId>,
}

impl TrustRegistry {
    /// Load the registry from trust document text.
    ///
    /// Fails with a `Config` error when the document does not parse or any
    /// configured key is malformed. A malformed key could never match a
    /// query, and surfacing it at load keeps a misconfigured federation
    /// from silently shrinking its quorum.
    pub fn from_toml_str(doc: &str) -> Result<Self> {
        let document: TrustDocument = toml::from_str(doc)
            .map_err(|e| TurretError::config(format!("trust document did not parse: {e}")))?;

        let mut trusted = BTreeSet::new();
        for entry in &document.turrets {
            let key: AccountId = entry.public_key.parse().map_err(|_| {
                TurretError::config(format!(
                    "trust document lists malformed public key {}",
                    entry.public_key
                ))
            })?;
            trusted.insert(key);
        }

        tracing::info!(turrets = trusted.len(), "trust registry loaded");
        Ok(Self { trusted })
    }

    /// Load the registry from a trust document on disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|e| {
            TurretError::config(format!(
                "trust document {} unreadable: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&doc)
    }

    /// Whether `turret` is part of this node's quorum.
    pub fn is_trusted(&self, turret: &AccountId) -> bool {
        self.trusted.contains(turret)
    }

    /// Number of trusted turrets.
    pub fn len(&self) -> usize {
        self.trusted.len()
    }

    /// Whether the quorum is empty.
    pub fn is_empty(&self) -> bool {
        self.trusted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    const KEY_A: &str = "0101010101010101010101010101010101010101010101010101010101010101";
    const KEY_B: &str = "0202020202020202020202020202020202020202020202020202020202020202";

    fn doc(keys: &[&str]) -> String {
        keys.iter()
            .map(|k| format!("[[TURRETS]]\nPUBLIC_KEY = \"{k}\"\nNAME = \"peer\"\n"))
            .collect()
    }

    #[test]
    fn membership_is_exact_match() {
        let registry = TrustRegistry::from_toml_str(&doc(&[KEY_A])).unwrap();
        assert!(registry.is_trusted(&KEY_A.parse().unwrap()));
        assert!(!registry.is_trusted(&KEY_B.parse().unwrap()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_document_is_a_valid_empty_quorum() {
        let registry = TrustRegistry::from_toml_str("").unwrap();
        assert!(registry.is_empty());
        assert!(!registry.is_trusted(&KEY_A.parse().unwrap()));
    }

    #[test]
    fn unparseable_document_fails_closed() {
        assert_matches!(
            TrustRegistry::from_toml_str("TURRETS = not toml"),
            Err(TurretError::Config { .. })
        );
    }

    #[test]
    fn malformed_key_fails_at_load() {
        let doc = "[[TURRETS]]\nPUBLIC_KEY = \"not-a-key\"\n";
        assert_matches!(
            TrustRegistry::from_toml_str(doc),
            Err(TurretError::Config { .. })
        );
    }

    #[test]
    fn extra_descriptive_fields_are_tolerated() {
        let doc = format!(
            "[[TURRETS]]\nPUBLIC_KEY = \"{KEY_A}\"\nHOME_DOMAIN = \"turret.example\"\nFEE = 20\n"
        );
        let registry = TrustRegistry::from_toml_str(&doc).unwrap();
        assert!(registry.is_trusted(&KEY_A.parse().unwrap()));
    }

    #[test]
    fn loads_from_disk_and_reports_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", doc(&[KEY_A, KEY_B])).unwrap();
        let registry = TrustRegistry::load_from_path(file.path()).unwrap();
        assert_eq!(registry.len(), 2);

        assert_matches!(
            TrustRegistry::load_from_path("/nonexistent/turrets.toml"),
            Err(TurretError::Config { .. })
        );
    }
}
