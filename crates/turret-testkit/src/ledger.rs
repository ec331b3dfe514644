//! Scripted ledger gateway.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use turret_core::{AccountId, Network, Result, SignerKey, TurretError, TxFunctionHash, TxHash};
use turret_ledger::{AccountRecord, LedgerGateway, TransactionEnvelope};

/// In-memory [`LedgerGateway`] with scripted accounts, peer signers, and
/// failure injection.
#[derive(Debug)]
pub struct MockLedger {
    inner: Mutex<Inner>,
    /// Network used when hashing submitted transactions.
    pub network: Network,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountId, AccountRecord>,
    existing_txs: HashSet<TxHash>,
    submitted: Vec<TransactionEnvelope>,
    peer_signers: HashMap<(String, TxFunctionHash), SignerKey>,
    unavailable: bool,
    reject_submissions: Option<String>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Empty ledger on the test network.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            network: Network::Test,
        }
    }

    /// Install or replace an account record.
    pub fn put_account(&self, record: AccountRecord) {
        self.inner.lock().unwrap().accounts.insert(record.id, record);
    }

    /// Mark `hash` as already present on the ledger.
    pub fn seed_transaction(&self, hash: TxHash) {
        self.inner.lock().unwrap().existing_txs.insert(hash);
    }

    /// Script the signer a peer turret publishes for a function.
    pub fn publish_peer_signer(
        &self,
        home_domain: impl Into<String>,
        hash: TxFunctionHash,
        signer: SignerKey,
    ) {
        self.inner
            .lock()
            .unwrap()
            .peer_signers
            .insert((home_domain.into(), hash), signer);
    }

    /// Make every ledger call fail `Unavailable` until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    /// Make `submit` reject with a ledger failure reason.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        self.inner.lock().unwrap().reject_submissions = Some(reason.into());
    }

    /// Envelopes submitted so far.
    pub fn submitted(&self) -> Vec<TransactionEnvelope> {
        self.inner.lock().unwrap().submitted.clone()
    }

    fn check_available(inner: &Inner) -> Result<()> {
        if inner.unavailable {
            return Err(TurretError::unavailable("ledger unreachable"));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerGateway for MockLedger {
    async fn get_account(&self, id: &AccountId) -> Result<AccountRecord> {
        let inner = self.inner.lock().unwrap();
        Self::check_available(&inner)?;
        inner
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| TurretError::not_found(format!("account {id} not found")))
    }

    async fn transaction_exists(&self, hash: &TxHash) -> Result<bool> {
        let inner = self.inner.lock().unwrap();
        Self::check_available(&inner)?;
        Ok(inner.existing_txs.contains(hash))
    }

    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<TxHash> {
        let mut inner = self.inner.lock().unwrap();
        Self::check_available(&inner)?;
        if let Some(reason) = &inner.reject_submissions {
            return Err(TurretError::validation(reason.clone()));
        }
        let hash = envelope.tx.hash(self.network)?;
        inner.existing_txs.insert(hash);
        inner.submitted.push(envelope.clone());
        Ok(hash)
    }

    async fn resolve_tx_function_signer(
        &self,
        home_domain: &str,
        hash: &TxFunctionHash,
    ) -> Option<SignerKey> {
        let inner = self.inner.lock().unwrap();
        if inner.unavailable {
            return None;
        }
        inner
            .peer_signers
            .get(&(home_domain.to_string(), *hash))
            .copied()
    }
}
