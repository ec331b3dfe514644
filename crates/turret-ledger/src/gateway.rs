//! The ledger gateway seam.

use crate::account::AccountRecord;
use crate::tx::TransactionEnvelope;
use async_trait::async_trait;
use turret_core::{AccountId, Result, SignerKey, TxFunctionHash, TxHash};

/// Read/write access to the external ledger and to peer turret endpoints.
///
/// Every method is network-bound: transport failures and timeouts surface
/// as `Unavailable` (retryable), never as validation rejections.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch current account state. `NotFound` for unknown accounts.
    async fn get_account(&self, id: &AccountId) -> Result<AccountRecord>;

    /// Whether a transaction with `hash` already exists on the ledger.
    ///
    /// Used to detect a previously submitted payment being replayed as
    /// "proof" of a new one.
    async fn transaction_exists(&self, hash: &TxHash) -> Result<bool>;

    /// Submit a signed envelope. Ledger rejection is a `Validation` error
    /// carrying the failure reason.
    async fn submit(&self, envelope: &TransactionEnvelope) -> Result<TxHash>;

    /// Ask the turret publishing at `home_domain` which signer it assigns
    /// to `hash`.
    ///
    /// Resolves to `None` on any network or shape failure: an unreachable
    /// or non-conforming peer means "unknown", not a hard error, so the
    /// heal engine can report a precise "unable to find contract on new
    /// turret" condition.
    async fn resolve_tx_function_signer(
        &self,
        home_domain: &str,
        hash: &TxFunctionHash,
    ) -> Option<SignerKey>;
}
